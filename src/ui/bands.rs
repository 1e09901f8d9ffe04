use chrono::NaiveDate;

use crate::calendar::date_math::{iso_week_key, month_key, BandKey};
use crate::calendar::AccountId;
use crate::timeline::{LogicalTimeline, TimelineIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandKind {
    Month,
    Week,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandSegment {
    pub key: BandKey,
    pub start_index: usize,
    pub end_index: usize,
}

pub fn segment_days(days: &[NaiveDate], kind: BandKind) -> Vec<BandSegment> {
    let key_of = |d: NaiveDate| match kind {
        BandKind::Month => month_key(d),
        BandKind::Week => iso_week_key(d),
    };

    let mut segments: Vec<BandSegment> = Vec::new();
    for (index, day) in days.iter().enumerate() {
        let key = key_of(*day);
        match segments.last_mut() {
            Some(current) if current.key == key => current.end_index = index,
            _ => segments.push(BandSegment {
                key,
                start_index: index,
                end_index: index,
            }),
        }
    }
    segments
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimelineBands {
    pub months: Vec<BandSegment>,
    pub weeks: Vec<BandSegment>,
}

impl TimelineBands {
    pub fn compute(timeline: &LogicalTimeline) -> Self {
        Self {
            months: segment_days(timeline.days(), BandKind::Month),
            weeks: segment_days(timeline.days(), BandKind::Week),
        }
    }
}

pub fn band_label(key: BandKey) -> String {
    match key {
        BandKey::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", year, month)),
        BandKey::Week { week, .. } => format!("W{:02}", week),
    }
}

pub fn clip_interval(start: i64, end: i64, window_start: usize, window_end: usize) -> Option<(usize, usize)> {
    if window_end <= window_start {
        return None;
    }
    let from = start.max(window_start as i64);
    let to = end.min(window_end as i64 - 1);
    if from > to {
        return None;
    }
    Some((from as usize, to as usize))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandBar {
    pub key: BandKey,
    pub label: String,
    pub start_index: usize,
    pub end_index: usize,
    pub left_px: f64,
    pub width_px: f64,
}

pub fn band_bars(segments: &[BandSegment], window_start: usize, window_end: usize, px_per_day: f64) -> Vec<BandBar> {
    segments
        .iter()
        .filter_map(|segment| {
            let (start, end) = clip_interval(
                segment.start_index as i64,
                segment.end_index as i64,
                window_start,
                window_end,
            )?;
            Some(BandBar {
                key: segment.key,
                label: band_label(segment.key),
                start_index: start,
                end_index: end,
                left_px: start as f64 * px_per_day,
                width_px: (end - start + 1) as f64 * px_per_day,
            })
        })
        .collect()
}

/// Greedy interval packing. Returns the row of each input interval, in input
/// order. Intervals are closed day ranges.
pub fn pack_rows(intervals: &[(i64, i64)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..intervals.len()).collect();
    order.sort_by_key(|&i| intervals[i].0);

    let mut rows: Vec<Vec<(i64, i64)>> = Vec::new();
    let mut assignment = vec![0; intervals.len()];

    for i in order {
        let (start, end) = intervals[i];
        let free_row = rows.iter().position(|members| {
            members
                .iter()
                .all(|&(other_start, other_end)| start > other_end || end < other_start)
        });

        let row = match free_row {
            Some(row) => row,
            None => {
                rows.push(Vec::new());
                rows.len() - 1
            }
        };
        rows[row].push((start, end));
        assignment[i] = row;
    }

    assignment
}

/// Row per time span of a [`TimelineIndex`], aligned with
/// `TimelineIndex::span_intervals`. Packed on unclipped intervals so rows do
/// not change while scrolling.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpanLanes {
    rows: Vec<usize>,
}

impl SpanLanes {
    pub fn assign(index: &TimelineIndex) -> Self {
        let intervals: Vec<(i64, i64)> = index
            .span_intervals()
            .iter()
            .map(|s| (s.start_day, s.end_day))
            .collect();
        Self {
            rows: pack_rows(&intervals),
        }
    }

    pub fn row(&self, span: usize) -> Option<usize> {
        self.rows.get(span).copied()
    }

    pub fn row_count(&self) -> usize {
        self.rows.iter().max().map(|r| r + 1).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpanBar {
    pub event_id: String,
    pub title: String,
    pub color: String,
    pub account_id: AccountId,
    pub row: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub left_px: f64,
    pub width_px: f64,
    pub top_px: f64,
    pub clipped_left: bool,
    pub clipped_right: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpanLayout {
    pub bars: Vec<SpanBar>,
    pub row_count: usize,
}

impl SpanLayout {
    pub fn reserved_height(&self, lane_height_px: f64) -> f64 {
        self.row_count as f64 * lane_height_px
    }
}

pub fn layout_spans(
    index: &TimelineIndex,
    lanes: &SpanLanes,
    window_start: usize,
    window_end: usize,
    px_per_day: f64,
    lane_height_px: f64,
) -> SpanLayout {
    let mut bars = Vec::new();

    for (i, span) in index.time_spans().into_iter().enumerate() {
        let Some((start, end)) = clip_interval(span.start_day, span.end_day, window_start, window_end) else {
            continue;
        };
        let row = lanes.row(i).unwrap_or(0);

        bars.push(SpanBar {
            event_id: span.event.id.clone(),
            title: span.event.title.clone(),
            color: span.event.color.clone(),
            account_id: span.event.account_id,
            row,
            start_index: start,
            end_index: end,
            left_px: start as f64 * px_per_day,
            width_px: (end - start + 1) as f64 * px_per_day,
            top_px: row as f64 * lane_height_px,
            clipped_left: span.start_day < start as i64,
            clipped_right: span.end_day > end as i64,
        });
    }

    let row_count = bars.iter().map(|b| b.row + 1).max().unwrap_or(0);
    SpanLayout { bars, row_count }
}
