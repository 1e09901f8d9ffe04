use chrono::{Local, NaiveDate, TimeZone};
use std::collections::{BTreeMap, BTreeSet};

use crate::calendar::{merge_events, AccountId, CalEvent};
use crate::storage::config::Config;
use crate::sync::{RequestTicket, RequestTracker, SyncOutcome, TimeWindow};
use crate::timeline::{LogicalTimeline, TimelineIndex};
use crate::ui::layout::{build_layout, LayoutDescription, LayoutInputs};
use crate::ui::theme::Theme;
use crate::ui::{DayColumnConfig, SpanLanes, TimelineBands};
use crate::viewport::ViewportController;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Synced,
    Syncing,
    Offline,
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Sync,
    Disconnect(AccountId),
    Quit,
}

pub struct AppState<Tz: TimeZone = Local> {
    pub mode: Mode,
    pub sync_status: SyncStatus,
    pub command_buffer: String,
    pub status_message: Option<String>,
    pub show_help: bool,
    pub theme: Theme,
    pub cell_width_px: f64,
    pub viewport: ViewportController,
    today: NaiveDate,
    tz: Tz,
    timeline: LogicalTimeline,
    day_column: DayColumnConfig,
    account_events: BTreeMap<AccountId, Vec<CalEvent>>,
    reconnect_needed: BTreeSet<AccountId>,
    index: TimelineIndex,
    bands: TimelineBands,
    lanes: SpanLanes,
    tracker: RequestTracker,
}

impl AppState<Local> {
    pub fn new(config: &Config) -> Self {
        Self::with_timezone(config, Local::now().date_naive(), Local)
    }
}

impl<Tz: TimeZone> AppState<Tz> {
    pub fn with_timezone(config: &Config, today: NaiveDate, tz: Tz) -> Self {
        let timeline = LogicalTimeline::new(today, config.timeline.days_before, config.timeline.days_after);
        let viewport = ViewportController::new(config.zoom.clone(), timeline.len(), timeline.anchor_index());
        let index = TimelineIndex::build(&timeline, &[], &tz);
        let bands = TimelineBands::compute(&timeline);

        Self {
            mode: Mode::Normal,
            sync_status: SyncStatus::Offline,
            command_buffer: String::new(),
            status_message: None,
            show_help: false,
            theme: Theme::get_by_name(&config.ui.theme),
            cell_width_px: config.ui.cell_width_px.max(1.0),
            viewport,
            today,
            tz,
            timeline,
            day_column: config.day_column.clone(),
            account_events: BTreeMap::new(),
            reconnect_needed: BTreeSet::new(),
            index,
            bands,
            lanes: SpanLanes::default(),
            tracker: RequestTracker::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn timeline(&self) -> &LogicalTimeline {
        &self.timeline
    }

    pub fn index(&self) -> &TimelineIndex {
        &self.index
    }

    pub fn day_column(&self) -> &DayColumnConfig {
        &self.day_column
    }

    pub fn fetch_window(&self) -> Option<TimeWindow> {
        TimeWindow::for_timeline(&self.timeline, &self.tz)
    }

    pub fn events(&self) -> Vec<CalEvent> {
        merge_events(self.account_events.values().cloned())
    }

    pub fn account_event_count(&self, account: AccountId) -> usize {
        self.account_events.get(&account).map(Vec::len).unwrap_or(0)
    }

    pub fn reconnect_needed(&self) -> Vec<AccountId> {
        self.reconnect_needed.iter().copied().collect()
    }

    pub fn mark_reconnect_needed(&mut self, account: AccountId) {
        self.reconnect_needed.insert(account);
    }

    fn rebuild(&mut self) {
        let events = self.events();
        self.index = TimelineIndex::build(&self.timeline, &events, &self.tz);
        self.lanes = SpanLanes::assign(&self.index);
    }

    pub fn set_account_events(&mut self, account: AccountId, events: Vec<CalEvent>) {
        self.account_events.insert(account, events);
        self.reconnect_needed.remove(&account);
        self.rebuild();
    }

    /// Drops the account's events and invalidates any fetch still in flight.
    /// Returns true when a sync was interrupted and should be issued again
    /// for the accounts still connected.
    pub fn disconnect(&mut self, account: AccountId) -> bool {
        self.tracker.begin();
        let interrupted = self.sync_status == SyncStatus::Syncing;
        if interrupted {
            self.sync_status = SyncStatus::Offline;
        }
        self.account_events.remove(&account);
        self.reconnect_needed.insert(account);
        self.rebuild();
        tracing::info!("Cleared {} events after disconnect", account);
        interrupted
    }

    pub fn begin_sync(&mut self) -> RequestTicket {
        self.sync_status = SyncStatus::Syncing;
        self.tracker.begin()
    }

    /// Applies a fetch round unless a newer one was started since. Accounts
    /// that failed keep their previous events.
    pub fn apply_sync(&mut self, ticket: RequestTicket, outcome: SyncOutcome) -> bool {
        if !self.tracker.is_current(ticket) {
            tracing::debug!("Discarding stale sync result {:?}", ticket);
            return false;
        }

        let reconnect = outcome.needs_reconnect();
        for (account, events) in outcome.fetched {
            self.account_events.insert(account, events);
            self.reconnect_needed.remove(&account);
        }
        self.reconnect_needed.extend(reconnect.iter().copied());

        self.sync_status = match outcome
            .errors
            .iter()
            .find(|e| !reconnect.contains(&e.account()))
        {
            None => SyncStatus::Synced,
            Some(e) => SyncStatus::Error(e.to_string()),
        };
        self.rebuild();
        true
    }

    pub fn layout(&mut self, container_width_px: f64) -> LayoutDescription {
        self.viewport.observe_layout(container_width_px);
        let inputs = LayoutInputs {
            timeline: &self.timeline,
            index: &self.index,
            bands: &self.bands,
            lanes: &self.lanes,
            day_column: &self.day_column,
            today: self.today,
        };
        build_layout(&inputs, self.viewport.state())
    }

    pub fn goto(&mut self, date: NaiveDate) -> Result<(), String> {
        let index = self.timeline.index_of(date).ok_or_else(|| {
            format!(
                "{} is outside {} .. {}",
                date,
                self.timeline.first_date().map(|d| d.to_string()).unwrap_or_default(),
                self.timeline.last_date().map(|d| d.to_string()).unwrap_or_default()
            )
        })?;
        self.viewport.center_on(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::date_math::{midnight_ms, MINUTE_MS};
    use crate::sync::{FetchError, SyncError};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 1, 15)
    }

    fn state() -> AppState<Utc> {
        AppState::with_timezone(&Config::default(), today(), Utc)
    }

    fn meeting(account: AccountId, id: &str, day: NaiveDate) -> CalEvent {
        let midnight = midnight_ms(&Utc, day);
        CalEvent {
            id: CalEvent::composite_id(account, id),
            account_id: account,
            title: id.to_string(),
            all_day: false,
            start_ts: midnight + 9 * 60 * MINUTE_MS,
            end_ts: midnight + 10 * 60 * MINUTE_MS,
            is_time_span: false,
            rsvp_status: None,
            color: CalEvent::resolve_color(account, false),
        }
    }

    fn ids(state: &AppState<Utc>) -> Vec<String> {
        state.events().into_iter().map(|e| e.id).collect()
    }

    #[test]
    fn new_state_starts_empty_and_offline() {
        let state = state();

        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.sync_status, SyncStatus::Offline);
        assert!(state.events().is_empty());
        assert_eq!(state.timeline().len(), 121);
    }

    #[test]
    fn first_layout_mounts_with_today_near_left_edge() {
        let mut state = state();

        let layout = state.layout(800.0);

        assert_eq!(layout.viewport.scroll_offset_px, 59.5 * 100.0);
        assert!(layout.column_for_date(today()).is_some());
    }

    #[test]
    fn events_from_both_accounts_are_merged() {
        let mut state = state();
        state.set_account_events(AccountId::Work, vec![meeting(AccountId::Work, "standup", today())]);
        state.set_account_events(AccountId::Private, vec![meeting(AccountId::Private, "gym", today())]);

        assert_eq!(state.events().len(), 2);
        assert_eq!(state.index().events_for_day(60).len(), 2);
    }

    #[test]
    fn current_sync_replaces_account_events() {
        let mut state = state();
        let ticket = state.begin_sync();
        let outcome = SyncOutcome {
            fetched: vec![(AccountId::Work, vec![meeting(AccountId::Work, "standup", today())])],
            errors: vec![],
        };

        assert!(state.apply_sync(ticket, outcome));
        assert_eq!(state.sync_status, SyncStatus::Synced);
        assert_eq!(ids(&state), vec!["work:standup"]);
    }

    #[test]
    fn stale_sync_is_discarded() {
        let mut state = state();
        let stale = state.begin_sync();
        let fresh = state.begin_sync();

        let fresh_outcome = SyncOutcome {
            fetched: vec![(AccountId::Work, vec![meeting(AccountId::Work, "new", today())])],
            errors: vec![],
        };
        let stale_outcome = SyncOutcome {
            fetched: vec![(AccountId::Work, vec![meeting(AccountId::Work, "old", today())])],
            errors: vec![],
        };

        assert!(state.apply_sync(fresh, fresh_outcome));
        assert!(!state.apply_sync(stale, stale_outcome));
        assert_eq!(ids(&state), vec!["work:new"]);
    }

    #[test]
    fn failed_account_keeps_last_known_events() {
        let mut state = state();
        state.set_account_events(AccountId::Private, vec![meeting(AccountId::Private, "gym", today())]);

        let ticket = state.begin_sync();
        let outcome = SyncOutcome {
            fetched: vec![(AccountId::Work, vec![meeting(AccountId::Work, "standup", today())])],
            errors: vec![SyncError::Fetch {
                account: AccountId::Private,
                source: FetchError::RateLimited,
            }],
        };
        state.apply_sync(ticket, outcome);

        assert_eq!(state.account_event_count(AccountId::Private), 1);
        assert_eq!(state.events().len(), 2);
        assert!(matches!(state.sync_status, SyncStatus::Error(_)));
    }

    #[test]
    fn reconnect_needed_is_tracked_per_account() {
        let mut state = state();
        let ticket = state.begin_sync();
        let outcome = SyncOutcome {
            fetched: vec![],
            errors: vec![SyncError::ReconnectNeeded(AccountId::Work)],
        };

        state.apply_sync(ticket, outcome);

        assert_eq!(state.reconnect_needed(), vec![AccountId::Work]);
        assert_eq!(state.sync_status, SyncStatus::Synced);
    }

    #[test]
    fn mixed_outcome_applies_events_and_flags_reconnect() {
        let mut state = state();
        state.mark_reconnect_needed(AccountId::Work);
        let ticket = state.begin_sync();
        let outcome = SyncOutcome {
            fetched: vec![(AccountId::Work, vec![meeting(AccountId::Work, "standup", today())])],
            errors: vec![SyncError::ReconnectNeeded(AccountId::Private)],
        };

        assert!(state.apply_sync(ticket, outcome));

        assert_eq!(ids(&state), vec!["work:standup"]);
        assert_eq!(state.reconnect_needed(), vec![AccountId::Private]);
        assert_eq!(state.sync_status, SyncStatus::Synced);
    }

    #[test]
    fn disconnect_clears_account_events() {
        let mut state = state();
        state.set_account_events(AccountId::Work, vec![meeting(AccountId::Work, "standup", today())]);

        let interrupted = state.disconnect(AccountId::Work);

        assert!(!interrupted);
        assert!(state.events().is_empty());
        assert_eq!(state.reconnect_needed(), vec![AccountId::Work]);
    }

    #[test]
    fn disconnect_discards_fetch_in_flight() {
        let mut state = state();
        let ticket = state.begin_sync();

        assert!(state.disconnect(AccountId::Work));
        let outcome = SyncOutcome {
            fetched: vec![(AccountId::Work, vec![meeting(AccountId::Work, "standup", today())])],
            errors: vec![],
        };

        assert!(!state.apply_sync(ticket, outcome));
        assert!(state.events().is_empty());
        assert_eq!(state.sync_status, SyncStatus::Offline);
    }

    #[test]
    fn reissued_sync_after_disconnect_keeps_other_account() {
        let mut state = state();
        state.begin_sync();
        assert!(state.disconnect(AccountId::Work));

        let retry = state.begin_sync();
        let outcome = SyncOutcome {
            fetched: vec![(AccountId::Private, vec![meeting(AccountId::Private, "gym", today())])],
            errors: vec![SyncError::ReconnectNeeded(AccountId::Work)],
        };

        assert!(state.apply_sync(retry, outcome));
        assert_eq!(ids(&state), vec!["private:gym"]);
        assert_eq!(state.reconnect_needed(), vec![AccountId::Work]);
    }

    #[test]
    fn goto_centres_on_date_inside_timeline() {
        let mut state = state();
        state.layout(1000.0);

        state.goto(date(2025, 2, 1)).unwrap();

        let centre = state.viewport.center_index();
        assert_eq!(centre, 77.5);
    }

    #[test]
    fn goto_outside_timeline_is_rejected() {
        let mut state = state();

        assert!(state.goto(date(2026, 1, 1)).is_err());
    }
}
