//! Weighted full-circle bead layout.
//!
//! Every bead owns an arc proportional to its diameter plus one trailing gap,
//! so the ring is always closed no matter how few or how many beads are
//! placed. The layout is a pure function of bead order, gap and stage
//! geometry and is recomputed wholesale after any change.

use std::f32::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use crate::bead::Bead;
use crate::config::BeadRules;
use crate::stage::{clamp_band, Point, StageGeometry};

/// Angle of 12 o'clock; angles grow clockwise in screen space.
pub const RING_START_ANGLE: f32 = -FRAC_PI_2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedBead {
    /// Centre in stage coordinates.
    pub position: Point,
    pub visual_diameter_px: f32,
    pub angle_rad: f32,
    /// Full arc owned by the bead, trailing gap included.
    pub span_rad: f32,
}

pub fn layout_ring(
    beads: &[Bead],
    gap_mm: f32,
    geometry: &StageGeometry,
    rules: &BeadRules,
) -> Vec<PlacedBead> {
    if beads.is_empty() {
        return Vec::new();
    }
    let gap_mm = if gap_mm.is_finite() { gap_mm.max(0.0) } else { 0.0 };
    let count = beads.len() as f32;
    let total_weight: f32 = beads.iter().map(|bead| bead.diameter_mm).sum::<f32>() + count * gap_mm;
    let weighted = total_weight.is_finite() && total_weight > 0.0;

    let min_px = rules.min_px * geometry.bead_scale;
    let max_px = (rules.max_px * geometry.bead_scale).max(min_px);
    let mut running = RING_START_ANGLE;
    let mut placed = Vec::with_capacity(beads.len());
    for bead in beads {
        let (span, bead_span) = if weighted {
            (
                (bead.diameter_mm + gap_mm) / total_weight * TAU,
                bead.diameter_mm / total_weight * TAU,
            )
        } else {
            (TAU / count, TAU / count)
        };
        // a lone bead owns the whole ring and is pinned to 12 o'clock
        let angle = if beads.len() == 1 {
            RING_START_ANGLE
        } else {
            running + bead_span * 0.5
        };
        let (sin, cos) = angle.sin_cos();
        let position = Point::new(
            geometry.stage_center.x + geometry.guide_radius * cos,
            geometry.stage_center.y + geometry.guide_radius * sin,
        );
        let arc_px = bead_span * geometry.guide_radius * rules.visual_shrink;
        placed.push(PlacedBead {
            position,
            visual_diameter_px: clamp_band(arc_px, min_px, max_px),
            angle_rad: angle,
            span_rad: span,
        });
        running += span;
    }
    placed
}

/// Wraps an angle into `[0, 2π)`.
pub fn normalize_radians(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Distance between two angles along the shorter arc, in `[0, π]`.
pub fn shorter_arc(a: f32, b: f32) -> f32 {
    let delta = normalize_radians(a - b);
    delta.min(TAU - delta)
}

pub fn angle_from(center: Point, point: Point) -> f32 {
    (point.y - center.y).atan2(point.x - center.x)
}

/// Index of the bead whose rendered disc contains `point` (stage
/// coordinates). Later beads are drawn on top and win overlaps.
pub fn bead_at_point(placed: &[PlacedBead], point: Point) -> Option<usize> {
    placed
        .iter()
        .enumerate()
        .rev()
        .find(|(_, bead)| {
            let radius = bead.visual_diameter_px * 0.5;
            let delta = point - bead.position;
            delta.x * delta.x + delta.y * delta.y <= radius * radius
        })
        .map(|(index, _)| index)
}
