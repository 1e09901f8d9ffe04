pub mod google_api;
pub mod google_auth;
pub mod sync_engine;

pub use google_api::{EventSource, FetchError, GoogleCalendarClient, TimeWindow};
pub use google_auth::{AuthError, AuthProvider, GoogleAuthenticator, SessionTokens, TokenInfo};
pub use sync_engine::{RequestTicket, RequestTracker, SyncEngine, SyncError, SyncOutcome};
