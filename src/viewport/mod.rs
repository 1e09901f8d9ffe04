pub mod controller;
pub mod zoom;

pub use controller::{
    anchor_zoom_change, compute_visible_range, SettleOutcome, ViewportController, ViewportState,
};
pub use zoom::{WheelGesture, ZoomPolicy, ZoomPreset};
