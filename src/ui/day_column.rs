use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::date_math::{is_weekend, minutes_into_day, percent_of_range};
use crate::calendar::{AccountId, CalEvent};
use crate::timeline::TimelineIndex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayColumnConfig {
    pub expanded_threshold_px: f64,
    pub chip_cap: usize,
    pub hour_start: u32,
    pub hour_end: u32,
    pub min_height_pct: f64,
    pub lane_height_px: f64,
}

impl Default for DayColumnConfig {
    fn default() -> Self {
        Self {
            expanded_threshold_px: 80.0,
            chip_cap: 5,
            hour_start: 7,
            hour_end: 22,
            min_height_pct: 2.0,
            lane_height_px: 18.0,
        }
    }
}

impl DayColumnConfig {
    pub fn mode(&self, px_per_day: f64) -> ColumnMode {
        if px_per_day >= self.expanded_threshold_px {
            ColumnMode::Expanded
        } else {
            ColumnMode::Compact
        }
    }

    fn range_minutes(&self) -> (f64, f64) {
        let start = self.hour_start.min(24) as f64 * 60.0;
        let end = self.hour_end.min(24) as f64 * 60.0;
        (start, end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMode {
    Compact,
    Expanded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chip {
    pub event_id: String,
    pub title: String,
    pub color: String,
    pub account_id: AccountId,
    pub start_ts: i64,
}

impl Chip {
    fn from_event(event: &CalEvent) -> Self {
        Self {
            event_id: event.id.clone(),
            title: event.title.clone(),
            color: event.color.clone(),
            account_id: event.account_id,
            start_ts: event.start_ts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalPlacement {
    pub top_pct: f64,
    pub height_pct: f64,
    pub clipped_top: bool,
    pub clipped_bottom: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventBlock {
    pub event_id: String,
    pub title: String,
    pub color: String,
    pub account_id: AccountId,
    pub placement: VerticalPlacement,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourMark {
    pub hour: u32,
    pub top_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnBody {
    Compact { chips: Vec<Chip>, overflow: usize },
    Expanded { hours: Vec<HourMark>, blocks: Vec<EventBlock> },
}

impl ColumnBody {
    pub fn overflow_label(&self) -> Option<String> {
        match self {
            ColumnBody::Compact { overflow, .. } if *overflow > 0 => Some(format!("+{} more", overflow)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayColumn {
    pub index: usize,
    pub date: NaiveDate,
    pub left_px: f64,
    pub width_px: f64,
    pub is_today: bool,
    pub is_weekend: bool,
    pub grid_top_px: f64,
    pub all_day: Vec<Chip>,
    pub body: ColumnBody,
}

pub fn position_in_range(start_min: f64, end_min: f64, config: &DayColumnConfig) -> Option<VerticalPlacement> {
    let (range_start, range_end) = config.range_minutes();
    if range_end <= range_start {
        return None;
    }
    let end_min = end_min.max(start_min);

    if start_min >= range_end || end_min < range_start || (end_min == range_start && end_min > start_min) {
        return None;
    }

    let top = percent_of_range(start_min.max(range_start), range_start, range_end);
    let bottom = percent_of_range(end_min.min(range_end), range_start, range_end);
    let min_height = config.min_height_pct.clamp(0.0, 100.0);

    let height = (bottom - top).max(min_height);
    let top = top.min(100.0 - height).max(0.0);

    Some(VerticalPlacement {
        top_pct: top,
        height_pct: height,
        clipped_top: start_min < range_start,
        clipped_bottom: end_min > range_end,
    })
}

fn hour_marks(config: &DayColumnConfig) -> Vec<HourMark> {
    let (range_start, range_end) = config.range_minutes();
    (config.hour_start..=config.hour_end.min(24))
        .map(|hour| HourMark {
            hour,
            top_pct: percent_of_range(hour as f64 * 60.0, range_start, range_end),
        })
        .collect()
}

pub struct ColumnContext<'a> {
    pub index: &'a TimelineIndex,
    pub px_per_day: f64,
    pub grid_top_px: f64,
    pub today: NaiveDate,
    pub config: &'a DayColumnConfig,
}

pub fn render_day_column(ctx: &ColumnContext<'_>, day: usize, date: NaiveDate) -> DayColumn {
    let config = ctx.config;
    let all_day = ctx
        .index
        .all_day_events_for_day(day)
        .into_iter()
        .map(Chip::from_event)
        .collect();
    let timed = ctx.index.timed_events_for_day(day);

    let body = match config.mode(ctx.px_per_day) {
        ColumnMode::Compact => {
            let chips = timed.iter().take(config.chip_cap).map(|e| Chip::from_event(e)).collect();
            ColumnBody::Compact {
                chips,
                overflow: timed.len().saturating_sub(config.chip_cap),
            }
        }
        ColumnMode::Expanded => {
            let day_start = ctx.index.day_start_ms(day).unwrap_or_default();
            let blocks = timed
                .iter()
                .filter_map(|event| {
                    let placement = position_in_range(
                        minutes_into_day(day_start, event.start_ts),
                        minutes_into_day(day_start, event.end_ts),
                        config,
                    )?;
                    Some(EventBlock {
                        event_id: event.id.clone(),
                        title: event.title.clone(),
                        color: event.color.clone(),
                        account_id: event.account_id,
                        placement,
                    })
                })
                .collect();
            ColumnBody::Expanded {
                hours: hour_marks(config),
                blocks,
            }
        }
    };

    DayColumn {
        index: day,
        date,
        left_px: day as f64 * ctx.px_per_day,
        width_px: ctx.px_per_day,
        is_today: date == ctx.today,
        is_weekend: is_weekend(date),
        grid_top_px: ctx.grid_top_px,
        all_day,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::date_math::{midnight_ms, MINUTE_MS};
    use crate::timeline::LogicalTimeline;
    use chrono::Utc;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn timed_event(id: &str, day: NaiveDate, start_min: i64, end_min: i64) -> CalEvent {
        let midnight = midnight_ms(&Utc, day);
        CalEvent {
            id: id.to_string(),
            account_id: AccountId::Work,
            title: id.to_string(),
            all_day: false,
            start_ts: midnight + start_min * MINUTE_MS,
            end_ts: midnight + end_min * MINUTE_MS,
            is_time_span: false,
            rsvp_status: None,
            color: CalEvent::resolve_color(AccountId::Work, false),
        }
    }

    fn column_for(events: &[CalEvent], px_per_day: f64) -> DayColumn {
        let day = date(2025, 1, 15);
        let timeline = LogicalTimeline::new(day, 1, 1);
        let index = TimelineIndex::build(&timeline, events, &Utc);
        let config = DayColumnConfig::default();
        let ctx = ColumnContext {
            index: &index,
            px_per_day,
            grid_top_px: 36.0,
            today: day,
            config: &config,
        };
        render_day_column(&ctx, 1, day)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn event_is_positioned_in_hour_range() {
        let placement = position_in_range(9.0 * 60.0, 10.5 * 60.0, &DayColumnConfig::default()).unwrap();

        assert!(approx(placement.top_pct, 120.0 / 900.0 * 100.0));
        assert!(approx(placement.height_pct, 10.0));
        assert!(!placement.clipped_top);
        assert!(!placement.clipped_bottom);
    }

    #[test]
    fn events_outside_range_are_omitted() {
        let config = DayColumnConfig::default();

        assert_eq!(position_in_range(5.0 * 60.0, 7.0 * 60.0, &config), None);
        assert_eq!(position_in_range(22.0 * 60.0, 23.0 * 60.0, &config), None);
    }

    #[test]
    fn event_starting_before_range_is_clipped_at_top() {
        let placement = position_in_range(6.0 * 60.0, 8.5 * 60.0, &DayColumnConfig::default()).unwrap();

        assert_eq!(placement.top_pct, 0.0);
        assert!(approx(placement.height_pct, 10.0));
        assert!(placement.clipped_top);
    }

    #[test]
    fn event_ending_after_range_is_clipped_at_bottom() {
        let placement = position_in_range(21.0 * 60.0, 23.5 * 60.0, &DayColumnConfig::default()).unwrap();

        assert!(approx(placement.top_pct + placement.height_pct, 100.0));
        assert!(placement.clipped_bottom);
    }

    #[test]
    fn short_event_gets_minimum_height() {
        let placement = position_in_range(12.0 * 60.0, 12.0 * 60.0 + 5.0, &DayColumnConfig::default()).unwrap();

        assert_eq!(placement.height_pct, 2.0);
    }

    #[test]
    fn minimum_height_never_pushes_past_bottom() {
        let placement = position_in_range(22.0 * 60.0 - 1.0, 22.0 * 60.0, &DayColumnConfig::default()).unwrap();

        assert!(placement.top_pct >= 0.0);
        assert!(placement.top_pct + placement.height_pct <= 100.0 + 1e-9);
        assert_eq!(placement.height_pct, 2.0);
    }

    #[test]
    fn zero_duration_event_has_floor_height() {
        let placement = position_in_range(600.0, 600.0, &DayColumnConfig::default()).unwrap();

        assert_eq!(placement.height_pct, 2.0);
    }

    #[test]
    fn compact_mode_caps_chips_and_reports_overflow() {
        let day = date(2025, 1, 15);
        let events: Vec<CalEvent> = (0..7)
            .map(|i| timed_event(&format!("e{}", i), day, 8 * 60 + i * 60, 8 * 60 + i * 60 + 30))
            .collect();

        let column = column_for(&events, 40.0);

        match &column.body {
            ColumnBody::Compact { chips, overflow } => {
                assert_eq!(chips.len(), 5);
                assert_eq!(*overflow, 2);
                assert_eq!(chips[0].event_id, "e0");
            }
            other => panic!("expected compact body, got {:?}", other),
        }
        assert_eq!(column.body.overflow_label(), Some("+2 more".to_string()));
    }

    #[test]
    fn compact_mode_without_overflow_has_no_label() {
        let day = date(2025, 1, 15);
        let column = column_for(&[timed_event("e1", day, 600, 660)], 40.0);

        assert_eq!(column.body.overflow_label(), None);
    }

    #[test]
    fn expanded_mode_positions_blocks() {
        let day = date(2025, 1, 15);
        let column = column_for(&[timed_event("review", day, 9 * 60, 10 * 60 + 30)], 120.0);

        match &column.body {
            ColumnBody::Expanded { hours, blocks } => {
                assert_eq!(hours.len(), 16);
                assert_eq!(hours[0].top_pct, 0.0);
                assert_eq!(hours[15].top_pct, 100.0);
                assert_eq!(blocks.len(), 1);
                assert!(approx(blocks[0].placement.height_pct, 10.0));
            }
            other => panic!("expected expanded body, got {:?}", other),
        }
        assert_eq!(column.grid_top_px, 36.0);
    }

    #[test]
    fn mode_switches_at_threshold() {
        let config = DayColumnConfig::default();

        assert_eq!(config.mode(79.9), ColumnMode::Compact);
        assert_eq!(config.mode(80.0), ColumnMode::Expanded);
    }

    #[test]
    fn all_day_strip_is_present_in_both_modes() {
        let day = date(2025, 1, 15);
        let midnight = midnight_ms(&Utc, day);
        let holiday = CalEvent {
            id: "holiday".to_string(),
            account_id: AccountId::Private,
            title: "Holiday".to_string(),
            all_day: true,
            start_ts: midnight,
            end_ts: midnight + 24 * 60 * MINUTE_MS,
            is_time_span: false,
            rsvp_status: None,
            color: CalEvent::resolve_color(AccountId::Private, false),
        };

        let compact = column_for(std::slice::from_ref(&holiday), 40.0);
        let expanded = column_for(&[holiday], 200.0);

        assert_eq!(compact.all_day.len(), 1);
        assert_eq!(expanded.all_day.len(), 1);
        assert!(matches!(compact.body, ColumnBody::Compact { ref chips, .. } if chips.is_empty()));
    }

    #[test]
    fn today_and_weekend_flags_come_from_date() {
        let column = column_for(&[], 100.0);

        assert!(column.is_today);
        assert!(!column.is_weekend);
        assert_eq!(column.left_px, 100.0);
    }
}
