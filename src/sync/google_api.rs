use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::calendar::date_math::midnight_ms;
use crate::calendar::{AccountId, RawEvent};
use crate::storage::config::{AccountsConfig, DEFAULT_CALENDAR_ID};
use crate::timeline::LogicalTimeline;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_PAGE_SIZE: u32 = 250;
pub const MAX_PAGES: usize = 100;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request failed with status {status}: {body}")]
    RequestError { status: u16, body: String },
    #[error("Calendar not found: {0}")]
    NotFound(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Pagination did not terminate: {0}")]
    PaginationError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Self {
        Self { time_min, time_max }
    }

    pub fn for_timeline<Tz: TimeZone>(timeline: &LogicalTimeline, tz: &Tz) -> Option<Self> {
        let first = timeline.first_date()?;
        let after_last = timeline.last_date()?.succ_opt()?;
        Some(Self {
            time_min: DateTime::from_timestamp_millis(midnight_ms(tz, first))?,
            time_max: DateTime::from_timestamp_millis(midnight_ms(tz, after_last))?,
        })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn list_events(
        &self,
        token: &str,
        account: AccountId,
        window: &TimeWindow,
    ) -> Result<Vec<RawEvent>, FetchError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    items: Option<Vec<RawEvent>>,
    next_page_token: Option<String>,
}

pub struct GoogleCalendarClient {
    base_url: String,
    page_size: u32,
    calendar_ids: HashMap<AccountId, String>,
    client: reqwest::Client,
}

impl GoogleCalendarClient {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            calendar_ids: HashMap::new(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_accounts(accounts: &AccountsConfig, page_size: u32) -> Self {
        AccountId::ALL
            .into_iter()
            .fold(Self::new().with_page_size(page_size), |client, account| {
                client.with_calendar(account, accounts.get(account).calendar_id.clone())
            })
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }

    pub fn with_calendar(mut self, account: AccountId, calendar_id: String) -> Self {
        self.calendar_ids.insert(account, calendar_id);
        self
    }

    fn calendar_id(&self, account: AccountId) -> &str {
        self.calendar_ids
            .get(&account)
            .map(String::as_str)
            .unwrap_or(DEFAULT_CALENDAR_ID)
    }

    async fn fetch_page(
        &self,
        token: &str,
        calendar_id: &str,
        window: &TimeWindow,
        page_token: Option<&str>,
    ) -> Result<EventListResponse, FetchError> {
        let url = format!("{}/calendars/{}/events", self.base_url, urlencoding::encode(calendar_id));
        let time_min = window.time_min.to_rfc3339();
        let time_max = window.time_max.to_rfc3339();
        let max_results = self.page_size.to_string();

        let mut query = vec![
            ("timeMin", time_min.as_str()),
            ("timeMax", time_max.as_str()),
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(page_token) = page_token {
            query.push(("pageToken", page_token));
        }

        let response = self.client.get(&url).bearer_auth(token).query(&query).send().await?;

        let status = response.status();
        tracing::debug!("Fetch events response status: {}", status);

        if status == 401 {
            tracing::error!("Authentication failed when fetching events");
            return Err(FetchError::AuthenticationFailed);
        }

        if status == 404 {
            tracing::error!("Calendar not found: {}", calendar_id);
            return Err(FetchError::NotFound(calendar_id.to_string()));
        }

        if status == 429 {
            tracing::warn!("Rate limit exceeded");
            return Err(FetchError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Failed to fetch events. Status: {}, Body: {}", status, body);
            return Err(FetchError::RequestError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::ParseError(e.to_string()))
    }
}

impl Default for GoogleCalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSource for GoogleCalendarClient {
    async fn list_events(
        &self,
        token: &str,
        account: AccountId,
        window: &TimeWindow,
    ) -> Result<Vec<RawEvent>, FetchError> {
        let calendar_id = self.calendar_id(account);
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;

        loop {
            let page = self
                .fetch_page(token, calendar_id, window, page_token.as_deref())
                .await?;
            pages += 1;
            events.extend(page.items.unwrap_or_default());

            match page.next_page_token {
                Some(next) if !next.is_empty() => {
                    if page_token.as_deref() == Some(next.as_str()) {
                        tracing::error!("Server repeated page token {} for {}", next, account);
                        return Err(FetchError::PaginationError(format!("page token {} repeated", next)));
                    }
                    if pages >= MAX_PAGES {
                        tracing::error!("Giving up on {} after {} pages", account, pages);
                        return Err(FetchError::PaginationError(format!("more than {} pages", MAX_PAGES)));
                    }
                    page_token = Some(next);
                }
                _ => break,
            }
        }

        tracing::info!("Fetched {} raw events for {} in {} page(s)", events.len(), account, pages);
        Ok(events)
    }
}
