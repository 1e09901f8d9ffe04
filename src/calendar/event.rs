use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const UNTITLED_EVENT: &str = "(No title)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountId {
    Work,
    Private,
}

impl AccountId {
    pub const ALL: [AccountId; 2] = [AccountId::Work, AccountId::Private];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountId::Work => "work",
            AccountId::Private => "private",
        }
    }

    pub fn event_color(&self) -> &'static str {
        match self {
            AccountId::Work => "#1a73e8",
            AccountId::Private => "#33b679",
        }
    }

    pub fn span_color(&self) -> &'static str {
        match self {
            AccountId::Work => "#7986cb",
            AccountId::Private => "#f6bf26",
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "work" => Ok(AccountId::Work),
            "private" => Ok(AccountId::Private),
            other => Err(format!("Unknown account: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsvpStatus {
    NeedsAction,
    Declined,
    Tentative,
    Accepted,
}

impl RsvpStatus {
    pub fn from_provider(value: &str) -> Option<Self> {
        match value {
            "needsAction" => Some(RsvpStatus::NeedsAction),
            "declined" => Some(RsvpStatus::Declined),
            "tentative" => Some(RsvpStatus::Tentative),
            "accepted" => Some(RsvpStatus::Accepted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalEvent {
    pub id: String,
    pub account_id: AccountId,
    pub title: String,
    pub all_day: bool,
    pub start_ts: i64,
    pub end_ts: i64,
    pub is_time_span: bool,
    pub rsvp_status: Option<RsvpStatus>,
    pub color: String,
}

impl CalEvent {
    pub fn composite_id(account: AccountId, provider_id: &str) -> String {
        format!("{}:{}", account, provider_id)
    }

    pub fn resolve_color(account: AccountId, is_time_span: bool) -> String {
        if is_time_span {
            account.span_color().to_string()
        } else {
            account.event_color().to_string()
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_ts - self.start_ts).max(0) / 60_000
    }

    pub fn is_declined(&self) -> bool {
        self.rsvp_status == Some(RsvpStatus::Declined)
    }

    pub fn overlaps(&self, range_start_ts: i64, range_end_ts: i64) -> bool {
        if self.end_ts <= self.start_ts {
            return self.start_ts >= range_start_ts && self.start_ts < range_end_ts;
        }
        self.start_ts < range_end_ts && range_start_ts < self.end_ts
    }
}
