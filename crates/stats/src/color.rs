use crate::error::{Result, StatsError};
use serde::{Serialize, Serializer};
use std::fmt;

pub const MIN_DURATION: f64 = 0.0;
pub const MAX_DURATION: f64 = 10.0;
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// Positions of the fixed green and red control points
const GREEN_UNTIL: f64 = 2.0;
const RED_FROM: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const GREEN: Rgb = Rgb { r: 0, g: 128, b: 0 };
    pub const YELLOW: Rgb = Rgb { r: 255, g: 255, b: 0 };
    pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

    /// Channel-wise interpolation, `t` in [0, 1]
    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Clamped piecewise-linear severity scale over durations.
///
/// Control points: `0 → green, 2 → green, threshold → yellow, 4 → red,
/// 10 → red`, ordered by position. At a shared position the later control
/// point wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    threshold: f64,
    stops: Vec<(f64, Rgb)>,
}

impl ColorScale {
    pub fn new(threshold: f64) -> Result<Self> {
        if !(MIN_DURATION..=MAX_DURATION).contains(&threshold) {
            return Err(StatsError::ThresholdOutOfRange {
                value: threshold,
                min: MIN_DURATION,
                max: MAX_DURATION,
            });
        }

        log::debug!("Color scale rebuilt for threshold {threshold:.2}");
        Ok(Self {
            threshold,
            stops: control_points(threshold),
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Color for a duration; `None` for NaN
    pub fn color(&self, value: f64) -> Option<Rgb> {
        if value.is_nan() {
            return None;
        }
        let x = value.clamp(MIN_DURATION, MAX_DURATION);

        // Last segment whose start is <= x
        let last = self.stops.len() - 1;
        let upper = (1..last)
            .find(|&idx| self.stops[idx].0 > x)
            .unwrap_or(last);
        let (x0, c0) = self.stops[upper - 1];
        let (x1, c1) = self.stops[upper];

        let span = x1 - x0;
        let t = if span > 0.0 {
            ((x - x0) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Some(c0.lerp(c1, t))
    }

    /// Color for an optional ("no data" aware) duration
    pub fn color_for(&self, value: Option<f64>) -> Option<Rgb> {
        value.and_then(|v| self.color(v))
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            stops: control_points(DEFAULT_THRESHOLD),
        }
    }
}

fn control_points(threshold: f64) -> Vec<(f64, Rgb)> {
    let mut stops = vec![
        (MIN_DURATION, Rgb::GREEN),
        (GREEN_UNTIL, Rgb::GREEN),
        (threshold, Rgb::YELLOW),
        (RED_FROM, Rgb::RED),
        (MAX_DURATION, Rgb::RED),
    ];
    // Stable: a threshold equal to a fixed point stays after it
    stops.sort_by(|a, b| a.0.total_cmp(&b.0));
    stops
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn control_points_map_exactly() {
        let scale = ColorScale::new(3.0).unwrap();
        assert_eq!(scale.color(0.0), Some(Rgb::GREEN));
        assert_eq!(scale.color(2.0), Some(Rgb::GREEN));
        assert_eq!(scale.color(3.0), Some(Rgb::YELLOW));
        assert_eq!(scale.color(4.0), Some(Rgb::RED));
        assert_eq!(scale.color(10.0), Some(Rgb::RED));
    }

    #[test]
    fn out_of_range_values_clamp_to_endpoints() {
        let scale = ColorScale::new(3.0).unwrap();
        assert_eq!(scale.color(-5.0), scale.color(0.0));
        assert_eq!(scale.color(42.0), scale.color(10.0));
        assert_eq!(scale.color(f64::INFINITY), Some(Rgb::RED));
        assert_eq!(scale.color(f64::NAN), None);
    }

    #[test]
    fn interpolates_between_stops() {
        let scale = ColorScale::new(3.0).unwrap();
        assert_eq!(scale.color(2.5), Some(Rgb { r: 128, g: 192, b: 0 }));
        assert_eq!(scale.color(3.5), Some(Rgb { r: 255, g: 128, b: 0 }));
    }

    #[test]
    fn threshold_moves_the_yellow_point() {
        let scale = ColorScale::new(2.5).unwrap();
        assert_eq!(scale.color(2.5), Some(Rgb::YELLOW));
        assert_ne!(scale.color(3.0), ColorScale::new(3.0).unwrap().color(3.0));
    }

    #[test]
    fn thresholds_outside_the_duration_domain_are_rejected() {
        assert!(ColorScale::new(-0.1).is_err());
        assert!(ColorScale::new(10.5).is_err());
        assert!(ColorScale::new(f64::NAN).is_err());
        assert!(ColorScale::new(0.0).is_ok());
        assert!(ColorScale::new(10.0).is_ok());
    }

    #[test]
    fn maximum_threshold_keeps_red_endpoint() {
        let scale = ColorScale::new(10.0).unwrap();
        assert_eq!(scale.color(10.0), Some(Rgb::RED));
        assert_eq!(scale.color(4.0), Some(Rgb::RED));
    }

    #[test]
    fn low_threshold_reorders_control_points() {
        let scale = ColorScale::new(1.0).unwrap();
        assert_eq!(scale.color(1.0), Some(Rgb::YELLOW));
        assert_eq!(scale.color(2.0), Some(Rgb::GREEN));
    }

    #[test]
    fn serializes_as_css_color() {
        let raw = serde_json::to_string(&Rgb::GREEN).unwrap();
        assert_eq!(raw, "\"rgb(0, 128, 0)\"");
    }

    #[test]
    fn default_matches_default_threshold() {
        assert_eq!(ColorScale::default(), ColorScale::new(DEFAULT_THRESHOLD).unwrap());
    }
}
