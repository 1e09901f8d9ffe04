use chrono::TimeZone;

use crate::calendar::date_math::{date_of, midnight_ms};
use crate::calendar::CalEvent;
use crate::timeline::days::LogicalTimeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanInterval {
    pub event: usize,
    pub start_day: i64,
    pub end_day: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan<'a> {
    pub event: &'a CalEvent,
    pub start_day: i64,
    pub end_day: i64,
}

#[derive(Debug, Clone, Default)]
pub struct TimelineIndex {
    events: Vec<CalEvent>,
    day_bounds: Vec<i64>,
    day_buckets: Vec<Vec<usize>>,
    spans: Vec<SpanInterval>,
}

impl TimelineIndex {
    pub fn build<Tz: TimeZone>(timeline: &LogicalTimeline, events: &[CalEvent], tz: &Tz) -> Self {
        let mut visible: Vec<CalEvent> = events.iter().filter(|e| !e.is_declined()).cloned().collect();
        visible.sort_by_key(|e| e.start_ts);

        let mut day_bounds: Vec<i64> = timeline.days().iter().map(|d| midnight_ms(tz, *d)).collect();
        if let Some(next) = timeline.last_date().and_then(|d| d.succ_opt()) {
            day_bounds.push(midnight_ms(tz, next));
        }

        let len = timeline.len();
        let mut day_buckets = vec![Vec::new(); len];
        let mut spans = Vec::new();

        for (idx, event) in visible.iter().enumerate() {
            let (Some(start_date), Some(end_date)) = (date_of(tz, event.start_ts), date_of(tz, event.end_ts))
            else {
                tracing::warn!("Event {} has out-of-range timestamps", event.id);
                continue;
            };
            let first = timeline.offset_of(start_date);

            if event.is_time_span {
                let end_day = (timeline.offset_of(end_date) - 1).max(first);
                spans.push(SpanInterval {
                    event: idx,
                    start_day: first,
                    end_day,
                });
                continue;
            }

            let last = if event.all_day {
                (timeline.offset_of(end_date) - 1).max(first)
            } else if event.end_ts > event.start_ts {
                date_of(tz, event.end_ts - 1)
                    .map(|d| timeline.offset_of(d))
                    .unwrap_or(first)
                    .max(first)
            } else {
                first
            };

            if last < 0 || first >= len as i64 {
                continue;
            }
            let from = first.max(0) as usize;
            let to = (last as usize).min(len - 1);
            for bucket in &mut day_buckets[from..=to] {
                bucket.push(idx);
            }
        }

        Self {
            events: visible,
            day_bounds,
            day_buckets,
            spans,
        }
    }

    pub fn len(&self) -> usize {
        self.day_buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.day_buckets.is_empty()
    }

    pub fn events(&self) -> &[CalEvent] {
        &self.events
    }

    pub fn day_start_ms(&self, day: usize) -> Option<i64> {
        self.day_bounds.get(day).copied()
    }

    pub fn day_end_ms(&self, day: usize) -> Option<i64> {
        self.day_bounds.get(day + 1).copied()
    }

    pub fn events_for_day(&self, day: usize) -> Vec<&CalEvent> {
        self.day_buckets
            .get(day)
            .map(|bucket| bucket.iter().map(|&i| &self.events[i]).collect())
            .unwrap_or_default()
    }

    pub fn all_day_events_for_day(&self, day: usize) -> Vec<&CalEvent> {
        self.events_for_day(day).into_iter().filter(|e| e.all_day).collect()
    }

    pub fn timed_events_for_day(&self, day: usize) -> Vec<&CalEvent> {
        self.events_for_day(day).into_iter().filter(|e| !e.all_day).collect()
    }

    pub fn span_intervals(&self) -> &[SpanInterval] {
        &self.spans
    }

    pub fn time_spans(&self) -> Vec<TimeSpan<'_>> {
        self.spans
            .iter()
            .map(|s| TimeSpan {
                event: &self.events[s.event],
                start_day: s.start_day,
                end_day: s.end_day,
            })
            .collect()
    }

    pub fn spans_in_window(&self, start: usize, end: usize) -> Vec<TimeSpan<'_>> {
        self.time_spans()
            .into_iter()
            .filter(|s| s.end_day >= start as i64 && s.start_day < end as i64)
            .collect()
    }
}
