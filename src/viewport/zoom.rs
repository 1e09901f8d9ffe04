use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomPreset {
    Day,
    Week,
    Month,
}

impl FromStr for ZoomPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "d" => Ok(ZoomPreset::Day),
            "week" | "w" => Ok(ZoomPreset::Week),
            "month" | "m" => Ok(ZoomPreset::Month),
            other => Err(format!("Unknown zoom preset: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelGesture {
    Zoom { delta_y: f64 },
    Scroll { delta_x: f64 },
}

impl WheelGesture {
    pub fn classify(delta_x: f64, delta_y: f64) -> Self {
        if delta_y.abs() > delta_x.abs() {
            WheelGesture::Zoom { delta_y }
        } else {
            WheelGesture::Scroll { delta_x }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodayOffsetPolicy {
    pub high_zoom_threshold: f64,
    pub mid_zoom_threshold: f64,
    pub high_zoom_offset_days: f64,
    pub mid_zoom_offset_days: f64,
    pub low_zoom_offset_days: f64,
}

impl Default for TodayOffsetPolicy {
    fn default() -> Self {
        Self {
            high_zoom_threshold: 150.0,
            mid_zoom_threshold: 60.0,
            high_zoom_offset_days: 1.5,
            mid_zoom_offset_days: 0.5,
            low_zoom_offset_days: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomPresets {
    pub day: f64,
    pub week: f64,
    pub month: f64,
}

impl Default for ZoomPresets {
    fn default() -> Self {
        Self {
            day: 200.0,
            week: 100.0,
            month: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomPolicy {
    pub min_px_per_day: f64,
    pub max_px_per_day: f64,
    pub initial_px_per_day: f64,
    pub buffer_days: usize,
    pub wheel_step_ratio: f64,
    pub min_wheel_step: f64,
    pub keyboard_step: f64,
    pub today_offset: TodayOffsetPolicy,
    pub presets: ZoomPresets,
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self {
            min_px_per_day: 30.0,
            max_px_per_day: 250.0,
            initial_px_per_day: 100.0,
            buffer_days: 10,
            wheel_step_ratio: 0.02,
            min_wheel_step: 1.0,
            keyboard_step: 10.0,
            today_offset: TodayOffsetPolicy::default(),
            presets: ZoomPresets::default(),
        }
    }
}

impl ZoomPolicy {
    pub fn clamp(&self, px_per_day: f64) -> f64 {
        let min = self.min_px_per_day.max(1.0);
        let max = self.max_px_per_day.max(min);
        if !px_per_day.is_finite() {
            return min;
        }
        px_per_day.clamp(min, max)
    }

    pub fn preset(&self, preset: ZoomPreset) -> f64 {
        let px = match preset {
            ZoomPreset::Day => self.presets.day,
            ZoomPreset::Week => self.presets.week,
            ZoomPreset::Month => self.presets.month,
        };
        self.clamp(px)
    }

    pub fn wheel_zoom_step(&self, current_px_per_day: f64, wheel_delta_y: f64) -> f64 {
        let current = self.clamp(current_px_per_day);
        let step = (current * self.wheel_step_ratio).round().max(self.min_wheel_step);

        let next = if wheel_delta_y > 0.0 {
            current - step
        } else if wheel_delta_y < 0.0 {
            current + step
        } else {
            current
        };
        self.clamp(next)
    }

    pub fn keyboard_zoom(&self, current_px_per_day: f64, zoom_in: bool) -> f64 {
        let delta = if zoom_in { self.keyboard_step } else { -self.keyboard_step };
        self.clamp(current_px_per_day + delta)
    }

    pub fn today_offset_days(&self, px_per_day: f64) -> f64 {
        let policy = &self.today_offset;
        if px_per_day >= policy.high_zoom_threshold {
            policy.high_zoom_offset_days
        } else if px_per_day >= policy.mid_zoom_threshold {
            policy.mid_zoom_offset_days
        } else {
            policy.low_zoom_offset_days
        }
    }

    pub fn initial_scroll_offset(&self, today_index: usize, px_per_day: f64) -> f64 {
        let px = self.clamp(px_per_day);
        let offset_days = self.today_offset_days(px);
        ((today_index as f64 - offset_days) * px).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_bounds_zoom() {
        let policy = ZoomPolicy::default();

        assert_eq!(policy.clamp(10.0), 30.0);
        assert_eq!(policy.clamp(400.0), 250.0);
        assert_eq!(policy.clamp(120.0), 120.0);
    }

    #[test]
    fn clamp_rejects_zero_negative_and_nan() {
        let policy = ZoomPolicy::default();

        assert_eq!(policy.clamp(0.0), 30.0);
        assert_eq!(policy.clamp(-50.0), 30.0);
        assert_eq!(policy.clamp(f64::NAN), 30.0);
    }

    #[test]
    fn wheel_down_zooms_out_by_two_percent() {
        let policy = ZoomPolicy::default();

        assert_eq!(policy.wheel_zoom_step(200.0, 120.0), 196.0);
    }

    #[test]
    fn wheel_up_zooms_in() {
        let policy = ZoomPolicy::default();

        assert_eq!(policy.wheel_zoom_step(100.0, -3.0), 102.0);
    }

    #[test]
    fn wheel_step_is_at_least_one_pixel() {
        let policy = ZoomPolicy::default();

        assert_eq!(policy.wheel_zoom_step(30.0, -1.0), 31.0);
        assert_eq!(policy.wheel_zoom_step(40.0, 1.0), 39.0);
    }

    #[test]
    fn wheel_step_stays_within_bounds() {
        let policy = ZoomPolicy::default();

        assert_eq!(policy.wheel_zoom_step(30.0, 1.0), 30.0);
        assert_eq!(policy.wheel_zoom_step(250.0, -1.0), 250.0);
    }

    #[test]
    fn vertical_dominant_wheel_is_zoom() {
        assert_eq!(WheelGesture::classify(1.0, 5.0), WheelGesture::Zoom { delta_y: 5.0 });
        assert_eq!(WheelGesture::classify(5.0, 1.0), WheelGesture::Scroll { delta_x: 5.0 });
        assert_eq!(WheelGesture::classify(-3.0, 3.0), WheelGesture::Scroll { delta_x: -3.0 });
    }

    #[test]
    fn today_offset_follows_zoom_thresholds() {
        let policy = ZoomPolicy::default();

        assert_eq!(policy.today_offset_days(150.0), 1.5);
        assert_eq!(policy.today_offset_days(149.0), 0.5);
        assert_eq!(policy.today_offset_days(60.0), 0.5);
        assert_eq!(policy.today_offset_days(59.0), 5.0);
    }

    #[test]
    fn initial_scroll_places_today_near_left_edge() {
        let policy = ZoomPolicy::default();

        assert_eq!(policy.initial_scroll_offset(60, 200.0), (60.0 - 1.5) * 200.0);
        assert_eq!(policy.initial_scroll_offset(60, 100.0), 59.5 * 100.0);
        assert_eq!(policy.initial_scroll_offset(60, 40.0), 55.0 * 40.0);
    }

    #[test]
    fn initial_scroll_is_never_negative() {
        let policy = ZoomPolicy::default();

        assert_eq!(policy.initial_scroll_offset(2, 40.0), 0.0);
    }

    #[test]
    fn presets_parse_and_resolve() {
        let policy = ZoomPolicy::default();

        assert_eq!("week".parse::<ZoomPreset>(), Ok(ZoomPreset::Week));
        assert_eq!(policy.preset(ZoomPreset::Month), 40.0);
        assert!("year".parse::<ZoomPreset>().is_err());
    }

    #[test]
    fn partial_policy_toml_uses_defaults() {
        let policy: ZoomPolicy = toml::from_str("max_px_per_day = 300.0").unwrap();

        assert_eq!(policy.max_px_per_day, 300.0);
        assert_eq!(policy.min_px_per_day, 30.0);
        assert_eq!(policy.today_offset, TodayOffsetPolicy::default());
    }
}
