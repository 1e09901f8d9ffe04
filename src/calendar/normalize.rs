use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::calendar::date_math::{date_of, day_count, midnight_ms};
use crate::calendar::event::{AccountId, CalEvent, RsvpStatus, UNTITLED_EVENT};

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("Event has no id")]
    MissingId,
    #[error("Event {0} has no start date or dateTime")]
    MissingStart(String),
    #[error("Event {0} has no end date or dateTime")]
    MissingEnd(String),
    #[error("Event {id} has an invalid timestamp: {value}")]
    InvalidTimestamp { id: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub start: Option<RawEventTime>,
    pub end: Option<RawEventTime>,
    #[serde(default)]
    pub attendees: Vec<RawAttendee>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttendee {
    pub email: Option<String>,
    #[serde(rename = "self", default)]
    pub is_self: bool,
    pub response_status: Option<String>,
}

impl RawEvent {
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }

    fn own_rsvp(&self) -> Option<RsvpStatus> {
        self.attendees
            .iter()
            .find(|a| a.is_self)
            .and_then(|a| a.response_status.as_deref())
            .and_then(RsvpStatus::from_provider)
    }
}

enum ParsedTime {
    Date(NaiveDate, i64),
    DateTime(i64),
}

impl ParsedTime {
    fn ts(&self) -> i64 {
        match self {
            ParsedTime::Date(_, ts) | ParsedTime::DateTime(ts) => *ts,
        }
    }
}

fn parse_instant<Tz: TimeZone>(
    time: Option<&RawEventTime>,
    id: &str,
    tz: &Tz,
) -> Result<Option<ParsedTime>, NormalizeError> {
    let Some(time) = time else {
        return Ok(None);
    };

    if let Some(value) = &time.date_time {
        let parsed = DateTime::parse_from_rfc3339(value).map_err(|_| {
            NormalizeError::InvalidTimestamp {
                id: id.to_string(),
                value: value.clone(),
            }
        })?;
        return Ok(Some(ParsedTime::DateTime(parsed.timestamp_millis())));
    }

    if let Some(value) = &time.date {
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            NormalizeError::InvalidTimestamp {
                id: id.to_string(),
                value: value.clone(),
            }
        })?;
        return Ok(Some(ParsedTime::Date(date, midnight_ms(tz, date))));
    }

    Ok(None)
}

pub fn normalize_event<Tz: TimeZone>(
    raw: &RawEvent,
    account: AccountId,
    tz: &Tz,
) -> Result<CalEvent, NormalizeError> {
    let provider_id = raw.id.as_deref().ok_or(NormalizeError::MissingId)?;

    let start = parse_instant(raw.start.as_ref(), provider_id, tz)?
        .ok_or_else(|| NormalizeError::MissingStart(provider_id.to_string()))?;
    let end = parse_instant(raw.end.as_ref(), provider_id, tz)?
        .ok_or_else(|| NormalizeError::MissingEnd(provider_id.to_string()))?;

    let all_day = matches!(start, ParsedTime::Date(..));
    let start_ts = start.ts();
    let mut end_ts = end.ts();

    if end_ts < start_ts {
        tracing::warn!("Event {} ends before it starts, clamping to zero duration", provider_id);
        end_ts = start_ts;
    }

    let days = match (&start, &end) {
        (ParsedTime::Date(s, _), ParsedTime::Date(e, _)) => day_count(*s, *e),
        _ => match (date_of(tz, start_ts), date_of(tz, end_ts)) {
            (Some(s), Some(e)) => day_count(s, e),
            _ => 0,
        },
    };
    let is_time_span = all_day && days >= 2;

    let title = raw
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNTITLED_EVENT)
        .to_string();

    Ok(CalEvent {
        id: CalEvent::composite_id(account, provider_id),
        account_id: account,
        title,
        all_day,
        start_ts,
        end_ts,
        is_time_span,
        rsvp_status: raw.own_rsvp(),
        color: CalEvent::resolve_color(account, is_time_span),
    })
}

pub fn normalize_all<Tz: TimeZone>(raw_events: &[RawEvent], account: AccountId, tz: &Tz) -> Vec<CalEvent> {
    raw_events
        .iter()
        .filter(|raw| !raw.is_cancelled())
        .filter_map(|raw| match normalize_event(raw, account, tz) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!("Dropping {} event: {}", account, e);
                None
            }
        })
        .collect()
}

/// Merges per-account event lists into one list sorted by start, keeping the
/// first occurrence of each id.
pub fn merge_events(batches: impl IntoIterator<Item = Vec<CalEvent>>) -> Vec<CalEvent> {
    let mut seen = HashSet::new();
    let mut merged: Vec<CalEvent> = batches
        .into_iter()
        .flatten()
        .filter(|event| seen.insert(event.id.clone()))
        .collect();

    merged.sort_by_key(|event| event.start_ts);
    merged
}
