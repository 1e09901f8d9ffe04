use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use calstrip::app::{AppState, Mode, SyncStatus};
use calstrip::calendar::AccountId;
use crate::tui::{dialogs, timeline_view::TimelineWidget};

pub fn ui(f: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    let title_text = format!(
        "calstrip - {:.0}px/day - {} .. {}",
        app.viewport.px_per_day(),
        app.timeline().first_date().map(|d| d.to_string()).unwrap_or_default(),
        app.timeline().last_date().map(|d| d.to_string()).unwrap_or_default(),
    );
    let title = Paragraph::new(title_text)
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let content = chunks[1];
    let layout = app.layout(content.width as f64 * app.cell_width_px);
    f.render_widget(
        TimelineWidget {
            layout: &layout,
            theme: &app.theme,
            cell_width_px: app.cell_width_px,
        },
        content,
    );

    let (status_text, status_color) = if matches!(app.mode, Mode::Command) {
        (app.command_buffer.clone(), app.theme.command_mode)
    } else if let Some(message) = &app.status_message {
        (message.clone(), app.theme.error)
    } else {
        (status_line(app), sync_color(app))
    };

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(status_color))
        .alignment(if matches!(app.mode, Mode::Command) { Alignment::Left } else { Alignment::Center })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[2]);

    if app.show_help {
        dialogs::help::render(f, app);
    }
}

fn status_line(app: &AppState) -> String {
    let counts: Vec<String> = AccountId::ALL
        .iter()
        .map(|account| format!("{}: {}", account, app.account_event_count(*account)))
        .collect();
    let sync = match &app.sync_status {
        SyncStatus::Synced => "synced".to_string(),
        SyncStatus::Syncing => "syncing…".to_string(),
        SyncStatus::Offline => "offline".to_string(),
        SyncStatus::Error(e) => format!("error: {} (r to retry)", e),
    };

    let mut line = format!("{} | Sync: {}", counts.join(" "), sync);
    let reconnect = app.reconnect_needed();
    if !reconnect.is_empty() {
        let names: Vec<&str> = reconnect.iter().map(|a| a.as_str()).collect();
        line.push_str(&format!(" | Reconnect needed: {}", names.join(", ")));
    }
    line.push_str(" | '?' for help");
    line
}

fn sync_color(app: &AppState) -> ratatui::style::Color {
    match app.sync_status {
        SyncStatus::Error(_) => app.theme.error,
        SyncStatus::Synced if app.reconnect_needed().is_empty() => app.theme.success,
        _ => app.theme.status_bar,
    }
}
