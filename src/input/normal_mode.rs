use chrono::TimeZone;
use crossterm::event::KeyCode;

use crate::app::{AppState, Effect, Mode};
use crate::viewport::ZoomPreset;

pub fn handle_key<Tz: TimeZone>(key: KeyCode, state: &mut AppState<Tz>) -> Effect {
    if state.show_help {
        return handle_help_key(key, state);
    }
    state.status_message = None;

    match key {
        KeyCode::Char('h') | KeyCode::Left => state.viewport.scroll_days(-1),
        KeyCode::Char('l') | KeyCode::Right => state.viewport.scroll_days(1),
        KeyCode::Char('H') | KeyCode::PageUp => state.viewport.scroll_page(false),
        KeyCode::Char('L') | KeyCode::PageDown => state.viewport.scroll_page(true),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            state.viewport.zoom_in();
        }
        KeyCode::Char('-') => {
            state.viewport.zoom_out();
        }
        KeyCode::Char('1') => apply_preset(state, ZoomPreset::Day),
        KeyCode::Char('2') => apply_preset(state, ZoomPreset::Week),
        KeyCode::Char('3') => apply_preset(state, ZoomPreset::Month),
        KeyCode::Char('t') => state.viewport.jump_to_today(),
        KeyCode::Char('r') => return Effect::Sync,
        KeyCode::Char(':') => enter_command_mode(state),
        KeyCode::Char('?') => state.show_help = true,
        KeyCode::Char('q') => return Effect::Quit,
        _ => {}
    }
    Effect::None
}

fn handle_help_key<Tz: TimeZone>(key: KeyCode, state: &mut AppState<Tz>) -> Effect {
    match key {
        KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Esc => state.show_help = false,
        _ => {}
    }
    Effect::None
}

fn apply_preset<Tz: TimeZone>(state: &mut AppState<Tz>, preset: ZoomPreset) {
    state.viewport.apply_preset(preset);
}

fn enter_command_mode<Tz: TimeZone>(state: &mut AppState<Tz>) {
    state.mode = Mode::Command;
    state.command_buffer.clear();
    state.command_buffer.push(':');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::config::Config;
    use chrono::{NaiveDate, Utc};

    fn state() -> AppState<Utc> {
        let mut state = AppState::with_timezone(&Config::default(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(), Utc);
        state.layout(800.0);
        state
    }

    #[test]
    fn l_and_h_scroll_one_day() {
        let mut state = state();
        let start = state.viewport.state().scroll_offset_px;

        handle_key(KeyCode::Char('l'), &mut state);
        assert_eq!(state.viewport.state().scroll_offset_px, start + 100.0);

        handle_key(KeyCode::Char('h'), &mut state);
        assert_eq!(state.viewport.state().scroll_offset_px, start);
    }

    #[test]
    fn shifted_keys_scroll_a_page() {
        let mut state = state();
        let start = state.viewport.state().scroll_offset_px;

        handle_key(KeyCode::Char('L'), &mut state);

        assert_eq!(state.viewport.state().scroll_offset_px, start + 800.0);
    }

    #[test]
    fn plus_and_minus_step_zoom() {
        let mut state = state();

        handle_key(KeyCode::Char('+'), &mut state);
        assert_eq!(state.viewport.px_per_day(), 110.0);

        handle_key(KeyCode::Char('-'), &mut state);
        handle_key(KeyCode::Char('-'), &mut state);
        assert_eq!(state.viewport.px_per_day(), 90.0);
    }

    #[test]
    fn number_keys_select_presets() {
        let mut state = state();

        handle_key(KeyCode::Char('3'), &mut state);
        assert_eq!(state.viewport.px_per_day(), 40.0);

        handle_key(KeyCode::Char('1'), &mut state);
        assert_eq!(state.viewport.px_per_day(), 200.0);
    }

    #[test]
    fn colon_enters_command_mode() {
        let mut state = state();

        handle_key(KeyCode::Char(':'), &mut state);

        assert_eq!(state.mode, Mode::Command);
        assert_eq!(state.command_buffer, ":");
    }

    #[test]
    fn r_and_q_are_host_effects() {
        let mut state = state();

        assert_eq!(handle_key(KeyCode::Char('r'), &mut state), Effect::Sync);
        assert_eq!(handle_key(KeyCode::Char('q'), &mut state), Effect::Quit);
    }

    #[test]
    fn help_swallows_keys_until_closed() {
        let mut state = state();
        handle_key(KeyCode::Char('?'), &mut state);
        let scroll = state.viewport.state().scroll_offset_px;

        assert_eq!(handle_key(KeyCode::Char('q'), &mut state), Effect::None);
        assert!(!state.show_help);
        handle_key(KeyCode::Char('?'), &mut state);
        handle_key(KeyCode::Char('l'), &mut state);
        assert_eq!(state.viewport.state().scroll_offset_px, scroll);
    }

    #[test]
    fn t_returns_to_today_after_scrolling() {
        let mut state = state();
        let home = state.viewport.state().scroll_offset_px;

        handle_key(KeyCode::PageDown, &mut state);
        handle_key(KeyCode::Char('t'), &mut state);

        assert_eq!(state.viewport.state().scroll_offset_px, home);
    }
}
