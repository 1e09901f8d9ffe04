use chrono::NaiveDate;

use crate::timeline::{LogicalTimeline, TimelineIndex};
use crate::ui::bands::{band_bars, layout_spans, BandBar, SpanBar, SpanLanes, TimelineBands};
use crate::ui::day_column::{render_day_column, ColumnContext, DayColumn, DayColumnConfig};
use crate::viewport::ViewportState;

pub struct LayoutInputs<'a> {
    pub timeline: &'a LogicalTimeline,
    pub index: &'a TimelineIndex,
    pub bands: &'a TimelineBands,
    pub lanes: &'a SpanLanes,
    pub day_column: &'a DayColumnConfig,
    pub today: NaiveDate,
}

/// Everything a front end needs to draw one frame. Positions are in content
/// pixels; subtract `viewport.scroll_offset_px` to get screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDescription {
    pub viewport: ViewportState,
    pub content_width_px: f64,
    pub month_bands: Vec<BandBar>,
    pub week_bands: Vec<BandBar>,
    pub span_bars: Vec<SpanBar>,
    pub span_row_count: usize,
    pub grid_offset_px: f64,
    pub columns: Vec<DayColumn>,
}

impl LayoutDescription {
    pub fn column_for_date(&self, date: NaiveDate) -> Option<&DayColumn> {
        self.columns.iter().find(|c| c.date == date)
    }
}

pub fn build_layout(inputs: &LayoutInputs<'_>, viewport: ViewportState) -> LayoutDescription {
    let px_per_day = viewport.px_per_day;
    let start = viewport.visible_start.min(inputs.timeline.len());
    let end = viewport.visible_end.clamp(start, inputs.timeline.len());
    let lane_height = inputs.day_column.lane_height_px;

    let spans = layout_spans(inputs.index, inputs.lanes, start, end, px_per_day, lane_height);
    let grid_offset_px = spans.reserved_height(lane_height);

    let ctx = ColumnContext {
        index: inputs.index,
        px_per_day,
        grid_top_px: grid_offset_px,
        today: inputs.today,
        config: inputs.day_column,
    };
    let columns = (start..end)
        .filter_map(|day| inputs.timeline.date_at(day).map(|date| render_day_column(&ctx, day, date)))
        .collect();

    LayoutDescription {
        viewport,
        content_width_px: inputs.timeline.len() as f64 * px_per_day,
        month_bands: band_bars(&inputs.bands.months, start, end, px_per_day),
        week_bands: band_bars(&inputs.bands.weeks, start, end, px_per_day),
        span_bars: spans.bars,
        span_row_count: spans.row_count,
        grid_offset_px,
        columns,
    }
}
