mod authentication;
mod session;
mod presentation;
mod sample_events;
mod timeline_view;
mod dialogs;

pub use authentication::connect_accounts;
pub use session::run_tui;
