pub mod days;
pub mod index;

pub use days::LogicalTimeline;
pub use index::{SpanInterval, TimeSpan, TimelineIndex};
