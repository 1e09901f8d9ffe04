pub mod command_mode;
pub mod normal_mode;

use chrono::TimeZone;
use crossterm::event::KeyCode;

use crate::app::{AppState, Effect, Mode};

pub fn handle_key<Tz: TimeZone>(key: KeyCode, state: &mut AppState<Tz>) -> Effect {
    match state.mode {
        Mode::Normal => normal_mode::handle_key(key, state),
        Mode::Command => command_mode::handle_key(key, state),
    }
}
