pub mod date_math;
pub mod event;
pub mod normalize;

pub use event::{AccountId, CalEvent, RsvpStatus, UNTITLED_EVENT};
pub use normalize::{merge_events, normalize_all, normalize_event, NormalizeError, RawEvent};
