use std::f32::consts::{FRAC_PI_2, TAU};

use beadring_core::ring::layout_ring;
use beadring_core::{
    compute_stage_geometry, Bead, BeadRules, Composition, InstanceId, StageGeometry, StageRules,
};

fn bead(id: u64, diameter_mm: f32) -> Bead {
    Bead {
        instance_id: InstanceId(id),
        catalog_id: format!("bead-{diameter_mm}"),
        name: format!("{diameter_mm} mm"),
        price_cents: 100,
        diameter_mm,
        color: "#808080".to_string(),
        in_stock: true,
    }
}

fn geometry() -> StageGeometry {
    compute_stage_geometry(390.0, &StageRules::default())
}

fn mixed() -> Composition {
    Composition::from_beads(vec![
        bead(1, 8.0),
        bead(2, 12.0),
        bead(3, 6.0),
        bead(4, 10.0),
        bead(5, 4.0),
        bead(6, 14.0),
    ])
}

#[test]
fn spans_cover_full_circle() {
    let geometry = geometry();
    for gap_mm in [0.0, 0.5, 2.0, 5.0] {
        for count in 1..=6 {
            let beads = mixed().beads()[..count].to_vec();
            let placed = layout_ring(&beads, gap_mm, &geometry, &BeadRules::default());
            let total: f32 = placed.iter().map(|bead| bead.span_rad).sum();
            assert!(
                (total - TAU).abs() < 1e-4,
                "gap {gap_mm} count {count}: spans sum to {total}"
            );
        }
    }
}

#[test]
fn empty_composition_places_nothing() {
    let placed = layout_ring(&[], 1.0, &geometry(), &BeadRules::default());
    assert!(placed.is_empty());
}

#[test]
fn single_bead_sits_at_twelve_oclock() {
    let geometry = geometry();
    for diameter in [2.0, 8.0, 25.0] {
        let placed = layout_ring(&[bead(1, diameter)], 1.0, &geometry, &BeadRules::default());
        assert_eq!(placed.len(), 1);
        assert!((placed[0].span_rad - TAU).abs() < 1e-5);
        assert!((placed[0].angle_rad + FRAC_PI_2).abs() < 1e-6);
        assert!((placed[0].position.x - geometry.stage_center.x).abs() < 1e-3);
        assert!(
            (placed[0].position.y - (geometry.stage_center.y - geometry.guide_radius)).abs() < 1e-3
        );
    }
}

#[test]
fn layout_follows_composition_order() {
    let geometry = geometry();
    let rules = BeadRules::default();
    let mut composition = mixed();
    let before = layout_ring(composition.beads(), 1.0, &geometry, &rules);
    for (placed, bead) in before.iter().zip(composition.iter()) {
        let expected_share = (bead.diameter_mm + 1.0) / (54.0 + 6.0) * TAU;
        assert!((placed.span_rad - expected_share).abs() < 1e-5);
    }

    composition.swap(0, 5);
    let after = layout_ring(composition.beads(), 1.0, &geometry, &rules);
    // the 14 mm bead now leads, so it owns the first arc
    assert!((after[0].span_rad - before[5].span_rad).abs() < 1e-6);
    assert!((after[5].span_rad - before[0].span_rad).abs() < 1e-6);
    for index in 1..5 {
        assert_eq!(after[index].span_rad, before[index].span_rad);
    }
}

#[test]
fn layout_is_bit_identical_across_runs() {
    let geometry = geometry();
    let rules = BeadRules::default();
    let composition = mixed();
    let first = layout_ring(composition.beads(), 1.5, &geometry, &rules);
    let second = layout_ring(composition.beads(), 1.5, &geometry, &rules);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.position.x.to_bits(), b.position.x.to_bits());
        assert_eq!(a.position.y.to_bits(), b.position.y.to_bits());
        assert_eq!(a.angle_rad.to_bits(), b.angle_rad.to_bits());
        assert_eq!(a.visual_diameter_px.to_bits(), b.visual_diameter_px.to_bits());
        assert_eq!(a.span_rad.to_bits(), b.span_rad.to_bits());
    }
}

#[test]
fn angles_increase_clockwise_from_top() {
    let placed = layout_ring(mixed().beads(), 1.0, &geometry(), &BeadRules::default());
    assert!(placed[0].angle_rad > -FRAC_PI_2);
    for pair in placed.windows(2) {
        assert!(pair[1].angle_rad > pair[0].angle_rad);
    }
    assert!(placed[placed.len() - 1].angle_rad < -FRAC_PI_2 + TAU);
}
