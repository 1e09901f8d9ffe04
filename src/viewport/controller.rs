use crate::viewport::zoom::{WheelGesture, ZoomPolicy, ZoomPreset};

pub const MAX_SETTLE_RETRIES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub visible_start: usize,
    pub visible_end: usize,
    pub px_per_day: f64,
    pub scroll_offset_px: f64,
}

/// Visible day window `[start, end)` widened by `buffer_days` on both sides.
pub fn compute_visible_range(
    scroll_offset_px: f64,
    container_width_px: f64,
    px_per_day: f64,
    buffer_days: usize,
    timeline_len: usize,
) -> (usize, usize) {
    if !px_per_day.is_finite() || px_per_day <= 0.0 {
        return (0, 0);
    }
    let scroll = scroll_offset_px.max(0.0);
    let width = container_width_px.max(0.0);
    let buffer = buffer_days as i64;

    let first = (scroll / px_per_day).floor() as i64 - buffer;
    let last = ((scroll + width) / px_per_day).ceil() as i64 + buffer;

    let end = last.clamp(0, timeline_len as i64) as usize;
    let start = first.clamp(0, end as i64) as usize;
    (start, end)
}

pub fn center_index(scroll_offset_px: f64, container_width_px: f64, px_per_day: f64) -> f64 {
    (scroll_offset_px + container_width_px / 2.0) / px_per_day
}

/// Scroll offset keeping the fractional day at the viewport centre fixed
/// across a scale change. `None` while the container has no width yet.
pub fn anchor_zoom_change(
    old_px_per_day: f64,
    new_px_per_day: f64,
    scroll_offset_px: f64,
    container_width_px: f64,
) -> Option<f64> {
    if container_width_px <= 0.0 || old_px_per_day <= 0.0 || new_px_per_day <= 0.0 {
        return None;
    }
    let center = center_index(scroll_offset_px, container_width_px, old_px_per_day);
    Some((center * new_px_per_day - container_width_px / 2.0).max(0.0))
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingAnchor {
    old_px_per_day: f64,
    scroll_offset_px: f64,
    container_width_px: f64,
    deferred_passes: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Idle,
    Mounted,
    Applied,
    Deferred,
    Dropped,
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    policy: ZoomPolicy,
    timeline_len: usize,
    today_index: usize,
    state: ViewportState,
    container_width_px: f64,
    mounted: bool,
    pending: Option<PendingAnchor>,
}

impl ViewportController {
    pub fn new(policy: ZoomPolicy, timeline_len: usize, today_index: usize) -> Self {
        let px_per_day = policy.clamp(policy.initial_px_per_day);
        Self {
            policy,
            timeline_len,
            today_index,
            state: ViewportState {
                visible_start: 0,
                visible_end: 0,
                px_per_day,
                scroll_offset_px: 0.0,
            },
            container_width_px: 0.0,
            mounted: false,
            pending: None,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn policy(&self) -> &ZoomPolicy {
        &self.policy
    }

    pub fn px_per_day(&self) -> f64 {
        self.state.px_per_day
    }

    pub fn is_settled(&self) -> bool {
        self.mounted && self.pending.is_none()
    }

    pub fn content_width(&self) -> f64 {
        self.timeline_len as f64 * self.state.px_per_day
    }

    pub fn center_index(&self) -> f64 {
        center_index(self.state.scroll_offset_px, self.container_width_px, self.state.px_per_day)
    }

    fn max_scroll(&self) -> f64 {
        (self.content_width() - self.container_width_px).max(0.0)
    }

    fn refresh_range(&mut self) {
        let (start, end) = compute_visible_range(
            self.state.scroll_offset_px,
            self.container_width_px,
            self.state.px_per_day,
            self.policy.buffer_days,
            self.timeline_len,
        );
        self.state.visible_start = start;
        self.state.visible_end = end;
    }

    fn set_scroll(&mut self, offset_px: f64) {
        let offset = if offset_px.is_finite() { offset_px } else { 0.0 };
        self.state.scroll_offset_px = offset.clamp(0.0, self.max_scroll());
        self.refresh_range();
    }

    pub fn observe_layout(&mut self, container_width_px: f64) -> SettleOutcome {
        if !container_width_px.is_finite() || container_width_px <= 0.0 {
            let Some(pending) = self.pending.as_mut() else {
                return if self.mounted { SettleOutcome::Idle } else { SettleOutcome::Deferred };
            };
            pending.deferred_passes += 1;
            if pending.deferred_passes > MAX_SETTLE_RETRIES {
                tracing::warn!("Dropping zoom anchor after {} layout passes without width", MAX_SETTLE_RETRIES);
                self.pending = None;
                return SettleOutcome::Dropped;
            }
            return SettleOutcome::Deferred;
        }

        self.container_width_px = container_width_px;

        if !self.mounted {
            self.mounted = true;
            self.pending = None;
            let offset = self.policy.initial_scroll_offset(self.today_index, self.state.px_per_day);
            self.set_scroll(offset);
            tracing::debug!("Viewport mounted at {:.0}px, {:.0}px/day", offset, self.state.px_per_day);
            return SettleOutcome::Mounted;
        }

        match self.pending.take() {
            Some(pending) => {
                // Same centre day under the old scale, measured at the new width.
                let resized_offset =
                    pending.scroll_offset_px + (pending.container_width_px - container_width_px) / 2.0;
                let offset = anchor_zoom_change(
                    pending.old_px_per_day,
                    self.state.px_per_day,
                    resized_offset,
                    container_width_px,
                )
                .unwrap_or(pending.scroll_offset_px);
                self.set_scroll(offset);
                SettleOutcome::Applied
            }
            None => {
                self.set_scroll(self.state.scroll_offset_px);
                SettleOutcome::Idle
            }
        }
    }

    pub fn set_zoom(&mut self, px_per_day: f64) -> bool {
        let new_px = self.policy.clamp(px_per_day);
        if new_px == self.state.px_per_day {
            return false;
        }

        if self.mounted && self.pending.is_none() {
            self.pending = Some(PendingAnchor {
                old_px_per_day: self.state.px_per_day,
                scroll_offset_px: self.state.scroll_offset_px,
                container_width_px: self.container_width_px,
                deferred_passes: 0,
            });
        }

        self.state.px_per_day = new_px;
        self.refresh_range();
        true
    }

    pub fn apply_preset(&mut self, preset: ZoomPreset) -> bool {
        let px = self.policy.preset(preset);
        self.set_zoom(px)
    }

    pub fn zoom_in(&mut self) -> bool {
        let px = self.policy.keyboard_zoom(self.state.px_per_day, true);
        self.set_zoom(px)
    }

    pub fn zoom_out(&mut self) -> bool {
        let px = self.policy.keyboard_zoom(self.state.px_per_day, false);
        self.set_zoom(px)
    }

    pub fn handle_wheel(&mut self, delta_x: f64, delta_y: f64) -> WheelGesture {
        let gesture = WheelGesture::classify(delta_x, delta_y);
        match gesture {
            WheelGesture::Zoom { delta_y } => {
                let px = self.policy.wheel_zoom_step(self.state.px_per_day, delta_y);
                self.set_zoom(px);
            }
            WheelGesture::Scroll { delta_x } => self.scroll_by(delta_x),
        }
        gesture
    }

    pub fn scroll_to(&mut self, offset_px: f64) {
        self.pending = None;
        self.set_scroll(offset_px);
    }

    /// Scrolling before a pending zoom settles moves its anchor too, converted
    /// back to the scale the anchor was captured at.
    pub fn scroll_by(&mut self, delta_px: f64) {
        if let Some(pending) = self.pending.as_mut() {
            pending.scroll_offset_px += delta_px * pending.old_px_per_day / self.state.px_per_day;
        }
        self.set_scroll(self.state.scroll_offset_px + delta_px);
    }

    pub fn scroll_days(&mut self, days: i64) {
        self.scroll_by(days as f64 * self.state.px_per_day);
    }

    pub fn scroll_page(&mut self, forward: bool) {
        let page = self.container_width_px;
        self.scroll_by(if forward { page } else { -page });
    }

    pub fn jump_to_today(&mut self) {
        self.pending = None;
        let offset = self.policy.initial_scroll_offset(self.today_index, self.state.px_per_day);
        self.set_scroll(offset);
    }

    pub fn center_on(&mut self, day_index: usize) {
        self.pending = None;
        let center = (day_index as f64 + 0.5) * self.state.px_per_day;
        self.set_scroll(center - self.container_width_px / 2.0);
    }
}
