pub mod app;
pub mod calendar;
pub mod input;
pub mod storage;
pub mod sync;
pub mod timeline;
pub mod ui;
pub mod viewport;

pub use app::{AppState, Effect, Mode, SyncStatus};
pub use calendar::{AccountId, CalEvent};
pub use ui::{build_layout, LayoutDescription};
pub use viewport::{ViewportController, ZoomPolicy};
