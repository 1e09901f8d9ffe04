pub mod bands;
pub mod day_column;
pub mod layout;
pub mod theme;

pub use bands::{BandBar, BandKind, SpanBar, SpanLanes, TimelineBands};
pub use day_column::{ColumnBody, ColumnMode, DayColumn, DayColumnConfig};
pub use layout::{build_layout, LayoutDescription, LayoutInputs};
pub use theme::Theme;
