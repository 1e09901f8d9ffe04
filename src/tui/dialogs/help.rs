use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use calstrip::app::AppState;

pub fn render(f: &mut Frame, app: &AppState) {
    let area = f.size();
    let help_width = 60.min(area.width);
    let help_height = 27.min(area.height);
    let x = (area.width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = ratatui::layout::Rect {
        x,
        y,
        width: help_width,
        height: help_height,
    };

    f.render_widget(Clear, help_area);

    let section = Style::default().fg(app.theme.help_section);
    let help_text = vec![
        Line::from(vec![Span::styled("calstrip Help", Style::default().fg(app.theme.help_title).add_modifier(Modifier::BOLD))]),
        Line::from(""),
        Line::from(vec![Span::styled("Scrolling:", section)]),
        Line::from("  h/l      - Previous/next day"),
        Line::from("  H/L      - Previous/next page"),
        Line::from("  t        - Back to today"),
        Line::from("  wheel    - Shift+wheel or tilt scrolls sideways"),
        Line::from(""),
        Line::from(vec![Span::styled("Zoom:", section)]),
        Line::from("  +/-      - Zoom in/out one step"),
        Line::from("  1/2/3    - Day/Week/Month preset"),
        Line::from("  wheel    - Vertical wheel zooms around the centre"),
        Line::from(""),
        Line::from(vec![Span::styled("Commands:", section)]),
        Line::from("  :q          - Quit"),
        Line::from("  :sync / r   - Fetch both calendars again"),
        Line::from("  :zoom N     - Set pixels per day"),
        Line::from("  :preset P   - day, week or month"),
        Line::from("  :goto DATE  - Centre on date (:goto 2025-12-25)"),
        Line::from("  :disconnect - Forget an account (:disconnect work)"),
        Line::from("  :theme NAME - default, gruvbox or nord"),
        Line::from("  :help       - Show this help"),
        Line::from(""),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(" Help (q to close) ")
            .style(Style::default().bg(Color::Black)))
        .alignment(Alignment::Left);

    f.render_widget(help_paragraph, help_area);
}
