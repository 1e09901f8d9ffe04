use chrono::TimeZone;
use thiserror::Error;

use crate::calendar::{normalize_all, AccountId, CalEvent};
use crate::sync::google_api::{EventSource, FetchError, TimeWindow};
use crate::sync::google_auth::AuthProvider;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0} account needs to reconnect")]
    ReconnectNeeded(AccountId),
    #[error("Fetching {account} events failed: {source}")]
    Fetch {
        account: AccountId,
        #[source]
        source: FetchError,
    },
}

impl SyncError {
    pub fn account(&self) -> AccountId {
        match self {
            SyncError::ReconnectNeeded(account) => *account,
            SyncError::Fetch { account, .. } => *account,
        }
    }
}

#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub fetched: Vec<(AccountId, Vec<CalEvent>)>,
    pub errors: Vec<SyncError>,
}

impl SyncOutcome {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn needs_reconnect(&self) -> Vec<AccountId> {
        self.errors
            .iter()
            .filter(|e| matches!(e, SyncError::ReconnectNeeded(_)))
            .map(SyncError::account)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Hands out increasing tickets so that a fetch resolving after a newer one
/// was issued can be recognised and discarded.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }
}

pub struct SyncEngine<S> {
    source: S,
    accounts: Vec<AccountId>,
}

impl<S: EventSource> SyncEngine<S> {
    pub fn new(source: S, accounts: Vec<AccountId>) -> Self {
        Self { source, accounts }
    }

    pub async fn fetch_account<A, Tz>(
        &self,
        auth: &A,
        account: AccountId,
        window: &TimeWindow,
        tz: &Tz,
    ) -> Result<Vec<CalEvent>, SyncError>
    where
        A: AuthProvider + ?Sized,
        Tz: TimeZone + Sync,
    {
        let token = auth.get_token(account).ok_or(SyncError::ReconnectNeeded(account))?;

        match self.source.list_events(&token, account, window).await {
            Ok(raw) => Ok(normalize_all(&raw, account, tz)),
            Err(FetchError::AuthenticationFailed) => Err(SyncError::ReconnectNeeded(account)),
            Err(source) => Err(SyncError::Fetch { account, source }),
        }
    }

    pub async fn fetch_all<A, Tz>(&self, auth: &A, window: &TimeWindow, tz: &Tz) -> SyncOutcome
    where
        A: AuthProvider + ?Sized,
        Tz: TimeZone + Sync,
    {
        let mut outcome = SyncOutcome::default();

        for &account in &self.accounts {
            match self.fetch_account(auth, account, window, tz).await {
                Ok(events) => {
                    tracing::info!("Synced {} events for {}", events.len(), account);
                    outcome.fetched.push((account, events));
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    outcome.errors.push(e);
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::normalize::{RawEvent, RawEventTime};
    use crate::sync::google_api::MockEventSource;
    use crate::sync::google_auth::MockAuthProvider;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        )
    }

    fn raw(id: &str) -> RawEvent {
        RawEvent {
            id: Some(id.to_string()),
            summary: Some(id.to_string()),
            start: Some(RawEventTime {
                date_time: Some("2025-01-15T09:00:00Z".to_string()),
                date: None,
            }),
            end: Some(RawEventTime {
                date_time: Some("2025-01-15T10:00:00Z".to_string()),
                date: None,
            }),
            ..RawEvent::default()
        }
    }

    fn auth_with(tokens: &'static [(AccountId, &'static str)]) -> MockAuthProvider {
        let mut auth = MockAuthProvider::new();
        auth.expect_get_token().returning(move |account| {
            tokens
                .iter()
                .find(|(a, _)| *a == account)
                .map(|(_, token)| token.to_string())
        });
        auth
    }

    #[tokio::test]
    async fn fetches_and_normalizes_both_accounts() {
        let mut source = MockEventSource::new();
        source
            .expect_list_events()
            .with(eq("work-token"), eq(AccountId::Work), eq(window()))
            .returning(|_, _, _| Ok(vec![raw("standup")]));
        source
            .expect_list_events()
            .with(eq("private-token"), eq(AccountId::Private), eq(window()))
            .returning(|_, _, _| Ok(vec![raw("dentist")]));
        let auth = auth_with(&[(AccountId::Work, "work-token"), (AccountId::Private, "private-token")]);
        let engine = SyncEngine::new(source, AccountId::ALL.to_vec());

        let outcome = engine.fetch_all(&auth, &window(), &Utc).await;

        assert!(outcome.is_complete());
        assert_eq!(outcome.fetched.len(), 2);
        assert_eq!(outcome.fetched[0].1[0].id, "work:standup");
        assert_eq!(outcome.fetched[1].1[0].id, "private:dentist");
    }

    #[tokio::test]
    async fn missing_token_skips_fetch_and_asks_for_reconnect() {
        let mut source = MockEventSource::new();
        source
            .expect_list_events()
            .with(eq("work-token"), eq(AccountId::Work), eq(window()))
            .times(1)
            .returning(|_, _, _| Ok(vec![]));
        let auth = auth_with(&[(AccountId::Work, "work-token")]);
        let engine = SyncEngine::new(source, AccountId::ALL.to_vec());

        let outcome = engine.fetch_all(&auth, &window(), &Utc).await;

        assert_eq!(outcome.needs_reconnect(), vec![AccountId::Private]);
        assert_eq!(outcome.fetched.len(), 1);
    }

    #[tokio::test]
    async fn rejected_token_asks_for_reconnect() {
        let mut source = MockEventSource::new();
        source
            .expect_list_events()
            .returning(|_, _, _| Err(FetchError::AuthenticationFailed));
        let auth = auth_with(&[(AccountId::Work, "expired")]);
        let engine = SyncEngine::new(source, vec![AccountId::Work]);

        let outcome = engine.fetch_all(&auth, &window(), &Utc).await;

        assert_eq!(outcome.needs_reconnect(), vec![AccountId::Work]);
    }

    #[tokio::test]
    async fn transport_failure_is_reported_per_account() {
        let mut source = MockEventSource::new();
        source
            .expect_list_events()
            .with(eq("work-token"), eq(AccountId::Work), eq(window()))
            .returning(|_, _, _| Err(FetchError::RateLimited));
        source
            .expect_list_events()
            .with(eq("private-token"), eq(AccountId::Private), eq(window()))
            .returning(|_, _, _| Ok(vec![raw("gym")]));
        let auth = auth_with(&[(AccountId::Work, "work-token"), (AccountId::Private, "private-token")]);
        let engine = SyncEngine::new(source, AccountId::ALL.to_vec());

        let outcome = engine.fetch_all(&auth, &window(), &Utc).await;

        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors[0],
            SyncError::Fetch { account: AccountId::Work, source: FetchError::RateLimited }
        ));
        assert_eq!(outcome.fetched.len(), 1);
        assert_eq!(outcome.fetched[0].0, AccountId::Private);
        assert!(outcome.needs_reconnect().is_empty());
    }

    #[test]
    fn single_account_fetch_runs_on_a_plain_executor() {
        let mut source = MockEventSource::new();
        source.expect_list_events().returning(|_, _, _| Ok(vec![raw("a"), raw("b")]));
        let auth = auth_with(&[(AccountId::Private, "token")]);
        let engine = SyncEngine::new(source, vec![AccountId::Private]);

        let events = tokio_test::block_on(engine.fetch_account(&auth, AccountId::Private, &window(), &Utc)).unwrap();

        assert_eq!(events.len(), 2);
    }

    #[test]
    fn only_latest_ticket_is_current() {
        let mut tracker = RequestTracker::new();

        let first = tracker.begin();
        assert!(tracker.is_current(first));

        let second = tracker.begin();
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
        assert!(second > first);
    }
}
