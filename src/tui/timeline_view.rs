use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use calstrip::{
    ui::{theme::hex_to_color, BandBar, ColumnBody, DayColumn, LayoutDescription, Theme},
};

const HEADER_ROWS: u16 = 3;

pub struct TimelineWidget<'a> {
    pub layout: &'a LayoutDescription,
    pub theme: &'a Theme,
    pub cell_width_px: f64,
}

impl TimelineWidget<'_> {
    fn column_of(&self, px: f64) -> i64 {
        ((px - self.layout.viewport.scroll_offset_px) / self.cell_width_px).floor() as i64
    }

    fn span_cells(&self, left_px: f64, width_px: f64) -> (i64, i64) {
        let start = self.column_of(left_px);
        let end = self.column_of(left_px + width_px).max(start + 1);
        (start, end)
    }

    fn draw_segment(&self, buf: &mut Buffer, area: Rect, cells: (i64, i64), y: u16, text: &str, style: Style) {
        let start = cells.0.max(0);
        let end = cells.1.min(area.width as i64);
        if start >= end || y >= area.bottom() {
            return;
        }
        let rect = Rect::new(area.x + start as u16, y, (end - start) as u16, 1);
        buf.set_style(rect, style);
        buf.set_stringn(rect.x, y, text, rect.width as usize, style);
    }

    fn draw_bands(&self, buf: &mut Buffer, area: Rect, bands: &[BandBar], y: u16, color: Color) {
        for (i, band) in bands.iter().enumerate() {
            let style = Style::default().fg(color).add_modifier(if i % 2 == 0 {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
            let cells = self.span_cells(band.left_px, band.width_px);
            self.draw_segment(buf, area, cells, y, &format!("│{}", band.label), style);
        }
    }

    fn event_style(&self, color: &str) -> Style {
        let bg = hex_to_color(color).unwrap_or(self.theme.title);
        Style::default().bg(bg).fg(Color::Black)
    }

    fn draw_column(&self, buf: &mut Buffer, area: Rect, column: &DayColumn, top: u16) {
        let cells = self.span_cells(column.left_px, column.width_px);
        let header_style = if column.is_today {
            Style::default().fg(self.theme.today).add_modifier(Modifier::BOLD)
        } else if column.is_weekend {
            Style::default().fg(self.theme.weekend)
        } else {
            Style::default().fg(self.theme.day_header)
        };
        let header = format!("{} {}", column.date.format("%a"), column.date.format("%d"));
        self.draw_segment(buf, area, cells, area.y + 2, &header, header_style);

        let mut y = top;
        for chip in &column.all_day {
            self.draw_segment(buf, area, cells, y, &chip.title, self.event_style(&chip.color));
            y += 1;
        }
        let body_top = y.max(top + 1);
        if body_top >= area.bottom() {
            return;
        }
        let body_height = area.bottom() - body_top;

        match &column.body {
            ColumnBody::Compact { chips, .. } => {
                let mut y = body_top;
                for chip in chips {
                    self.draw_segment(buf, area, cells, y, &chip.title, self.event_style(&chip.color));
                    y += 1;
                }
                if let Some(label) = column.body.overflow_label() {
                    self.draw_segment(buf, area, cells, y, &label, Style::default().fg(self.theme.overflow));
                }
            }
            ColumnBody::Expanded { hours, blocks } => {
                let row_at = |pct: f64| body_top + ((pct / 100.0) * (body_height.saturating_sub(1)) as f64).round() as u16;
                for hour in hours {
                    self.draw_segment(
                        buf,
                        area,
                        (cells.0, cells.0 + 2),
                        row_at(hour.top_pct),
                        &format!("{:02}", hour.hour),
                        Style::default().fg(self.theme.hour_line),
                    );
                }
                for block in blocks {
                    let first = row_at(block.placement.top_pct);
                    let last = row_at(block.placement.top_pct + block.placement.height_pct).max(first + 1);
                    let style = self.event_style(&block.color);
                    for row in first..last {
                        let text = if row == first { block.title.as_str() } else { "" };
                        self.draw_segment(buf, area, (cells.0 + 2, cells.1), row, text, style);
                    }
                }
            }
        }
    }
}

impl Widget for TimelineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height <= HEADER_ROWS || self.cell_width_px <= 0.0 {
            return;
        }

        self.draw_bands(buf, area, &self.layout.month_bands, area.y, self.theme.month_band);
        self.draw_bands(buf, area, &self.layout.week_bands, area.y + 1, self.theme.week_band);

        let span_top = area.y + HEADER_ROWS;
        for bar in &self.layout.span_bars {
            let y = span_top + bar.row as u16;
            let mut label = String::new();
            if bar.clipped_left {
                label.push('‹');
            }
            label.push_str(&bar.title);
            let cells = self.span_cells(bar.left_px, bar.width_px);
            self.draw_segment(buf, area, cells, y, &label, self.event_style(&bar.color));
            if bar.clipped_right {
                self.draw_segment(buf, area, (cells.1 - 1, cells.1), y, "›", self.event_style(&bar.color));
            }
        }

        let grid_top = span_top + self.layout.span_row_count as u16;
        for column in &self.layout.columns {
            self.draw_column(buf, area, column, grid_top);
        }
    }
}
