use chrono::{NaiveDate, TimeZone};
use crossterm::event::KeyCode;

use crate::app::{AppState, Effect, Mode};
use crate::calendar::AccountId;
use crate::ui::theme::Theme;
use crate::viewport::ZoomPreset;

#[derive(Debug, PartialEq)]
pub enum Command {
    Quit,
    Sync,
    Zoom(f64),
    Preset(ZoomPreset),
    Goto(NaiveDate),
    Today,
    Disconnect(AccountId),
    Theme(String),
    Help,
    Error(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();

    let Some(command_text) = trimmed.strip_prefix(':') else {
        return Command::Error("Commands must start with ':'".to_string());
    };
    let parts: Vec<&str> = command_text.split_whitespace().collect();

    let Some(&name) = parts.first() else {
        return Command::Error("Empty command".to_string());
    };
    let argument = parts.get(1).copied();

    match (name, argument) {
        ("q" | "quit", _) => Command::Quit,
        ("w" | "sync", _) => Command::Sync,
        ("help", _) => Command::Help,
        ("today", _) => Command::Today,
        ("zoom", Some(value)) => match value.parse::<f64>() {
            Ok(px) if px.is_finite() && px > 0.0 => Command::Zoom(px),
            _ => Command::Error(format!("Invalid zoom value: {}", value)),
        },
        ("preset", Some(value)) => match value.parse::<ZoomPreset>() {
            Ok(preset) => Command::Preset(preset),
            Err(e) => Command::Error(e),
        },
        ("goto", Some(value)) => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => Command::Goto(date),
            Err(_) => Command::Error(format!("Invalid date format: {}", value)),
        },
        ("disconnect", Some(value)) => match value.parse::<AccountId>() {
            Ok(account) => Command::Disconnect(account),
            Err(e) => Command::Error(e),
        },
        ("theme", Some(value)) => Command::Theme(value.to_string()),
        ("zoom" | "preset" | "goto" | "disconnect" | "theme", None) => {
            Command::Error(format!("{} requires an argument", name))
        }
        _ => Command::Error(format!("Unknown command: {}", name)),
    }
}

pub fn execute_command<Tz: TimeZone>(command: Command, state: &mut AppState<Tz>) -> Effect {
    match command {
        Command::Quit => return Effect::Quit,
        Command::Sync => return Effect::Sync,
        Command::Zoom(px) => {
            state.viewport.set_zoom(px);
        }
        Command::Preset(preset) => {
            state.viewport.apply_preset(preset);
        }
        Command::Goto(date) => {
            if let Err(message) = state.goto(date) {
                state.status_message = Some(message);
            }
        }
        Command::Today => state.viewport.jump_to_today(),
        Command::Disconnect(account) => return Effect::Disconnect(account),
        Command::Theme(name) => {
            if Theme::available_themes().contains(&name.to_lowercase().as_str()) {
                state.theme = Theme::get_by_name(&name);
            } else {
                state.status_message = Some(format!("Unknown theme: {}", name));
            }
        }
        Command::Help => state.show_help = true,
        Command::Error(message) => state.status_message = Some(message),
    }
    Effect::None
}

pub fn handle_key<Tz: TimeZone>(key: KeyCode, state: &mut AppState<Tz>) -> Effect {
    match key {
        KeyCode::Esc => {
            state.command_buffer.clear();
            state.mode = Mode::Normal;
        }
        KeyCode::Enter => {
            let input = std::mem::take(&mut state.command_buffer);
            state.mode = Mode::Normal;
            return execute_command(parse_command(&input), state);
        }
        KeyCode::Backspace => {
            state.command_buffer.pop();
            if state.command_buffer.is_empty() {
                state.mode = Mode::Normal;
            }
        }
        KeyCode::Char(c) => state.command_buffer.push(c),
        _ => {}
    }
    Effect::None
}
