use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::config::StageRules;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Source of the device viewport. The browser reads the window; tests and
/// the CLI pass a fixed size.
pub trait ViewportProvider {
    fn viewport_size(&self) -> ViewportSize;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedViewport(pub ViewportSize);

impl ViewportProvider for FixedViewport {
    fn viewport_size(&self) -> ViewportSize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageGeometry {
    pub stage_size: f32,
    pub stage_center: Point,
    pub guide_radius: f32,
    /// Stage origin in viewport coordinates.
    pub offset_x: f32,
    pub offset_y: f32,
    pub bead_scale: f32,
}

impl StageGeometry {
    pub fn viewport_to_stage(&self, point: Point) -> Point {
        Point::new(point.x - self.offset_x, point.y - self.offset_y)
    }

    pub fn stage_to_viewport(&self, point: Point) -> Point {
        Point::new(point.x + self.offset_x, point.y + self.offset_y)
    }
}

/// `f32::clamp` without its `min <= max` assertion. An inverted band settles
/// on `max`; a NaN bound is ignored.
pub(crate) fn clamp_band(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

pub fn compute_stage_geometry(viewport_width: f32, rules: &StageRules) -> StageGeometry {
    let viewport_width = if viewport_width.is_finite() {
        viewport_width.max(0.0)
    } else {
        0.0
    };
    let rails = rules.rail_left_px + rules.rail_right_px;
    let available = clamp_band(viewport_width - rails, rules.stage_min_px, rules.stage_max_px);
    let stage_size = available * rules.stage_overscan;
    let half = stage_size * 0.5;
    let guide_radius = clamp_band(
        stage_size * rules.guide_radius_ratio,
        rules.guide_radius_min_px,
        rules.guide_radius_max_px,
    );
    let bead_scale = stage_size / rules.reference_stage_px.max(1.0);
    StageGeometry {
        stage_size,
        stage_center: Point::new(half, half),
        guide_radius,
        offset_x: rules.rail_left_px + (available - stage_size) * 0.5,
        offset_y: rules.stage_top_px,
        bead_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_viewport_clamps_to_min_stage() {
        let rules = StageRules::default();
        let geometry = compute_stage_geometry(200.0, &rules);
        let expected = rules.stage_min_px * rules.stage_overscan;
        assert!((geometry.stage_size - expected).abs() < 1e-4);
        assert!(geometry.guide_radius >= rules.guide_radius_min_px);
    }

    #[test]
    fn wide_viewport_clamps_to_max_stage_and_radius() {
        let rules = StageRules::default();
        let geometry = compute_stage_geometry(4000.0, &rules);
        let expected = rules.stage_max_px * rules.stage_overscan;
        assert!((geometry.stage_size - expected).abs() < 1e-4);
        assert_eq!(geometry.guide_radius, rules.guide_radius_max_px);
    }

    #[test]
    fn mid_viewport_uses_ratio_and_scale() {
        let rules = StageRules::default();
        let geometry = compute_stage_geometry(428.0, &rules);
        let available = 428.0 - rules.rail_left_px - rules.rail_right_px;
        let stage = available * rules.stage_overscan;
        assert!((geometry.stage_size - stage).abs() < 1e-4);
        assert!((geometry.guide_radius - stage * rules.guide_radius_ratio).abs() < 1e-4);
        assert!((geometry.bead_scale - stage / rules.reference_stage_px).abs() < 1e-6);
        assert_eq!(geometry.stage_center, Point::new(stage * 0.5, stage * 0.5));
    }

    #[test]
    fn stage_is_centred_over_available_band() {
        let rules = StageRules::default();
        let geometry = compute_stage_geometry(428.0, &rules);
        let available = 428.0 - rules.rail_left_px - rules.rail_right_px;
        let left_pad = geometry.offset_x - rules.rail_left_px;
        let right_pad = (rules.rail_left_px + available) - (geometry.offset_x + geometry.stage_size);
        assert!((left_pad - right_pad).abs() < 1e-4);
        assert_eq!(geometry.offset_y, rules.stage_top_px);
    }

    #[test]
    fn non_finite_width_is_treated_as_zero() {
        let rules = StageRules::default();
        assert_eq!(
            compute_stage_geometry(f32::NAN, &rules),
            compute_stage_geometry(0.0, &rules)
        );
    }

    #[test]
    fn inverted_or_nan_bands_settle_without_panicking() {
        let rules = StageRules {
            stage_min_px: 500.0,
            guide_radius_min_px: 200.0,
            guide_radius_max_px: f32::NAN,
            ..StageRules::default()
        };
        let geometry = compute_stage_geometry(390.0, &rules);
        assert!((geometry.stage_size - rules.stage_max_px * rules.stage_overscan).abs() < 1e-4);
        assert_eq!(geometry.guide_radius, 200.0);
        assert!(geometry.bead_scale.is_finite());
    }

    #[test]
    fn viewport_stage_roundtrip() {
        let geometry = compute_stage_geometry(390.0, &StageRules::default());
        let point = Point::new(120.0, 300.0);
        let back = geometry.stage_to_viewport(geometry.viewport_to_stage(point));
        assert!((back - point).length() < 1e-4);
    }
}
