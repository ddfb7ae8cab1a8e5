use serde::Serialize;
use tracing::debug;

use crate::bead::{Bead, Composition, InstanceId};
use crate::catalog::CatalogLookup;
use crate::config::{clamp_gap_mm, clamp_wrist_size_cm, clamp_wrist_tolerance_mm, DesignerRules};
use crate::fit::{check_fit, check_fit_diameters, FitStatus};
use crate::gesture::{
    DeleteZone, GestureMachine, GestureOutcome, GestureVisual, RingFrame,
};
use crate::ring::{bead_at_point, layout_ring, PlacedBead};
use crate::stage::{compute_stage_geometry, Point, StageGeometry, ViewportProvider, ViewportSize};
use crate::timer::{LongPressScheduler, TimerTicket};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DesignError {
    #[error("unknown bead '{0}'")]
    UnknownBead(String),
    #[error("bead '{catalog_id}' has invalid diameter {diameter_mm} mm")]
    InvalidDiameter { catalog_id: String, diameter_mm: f32 },
    #[error("{}", .0.message())]
    WouldOverflow(FitStatus),
    #[error("bead index {index} is out of range for {len} beads")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub instance_id: InstanceId,
    pub catalog_id: String,
    pub name: String,
    pub price_cents: u64,
    pub diameter_mm: f32,
    pub color: String,
}

/// What the surrounding application persists or checks out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompositionSummary {
    pub beads: Vec<SummaryEntry>,
    pub total_price_cents: u64,
    pub fit: FitStatus,
    pub out_of_stock: Vec<InstanceId>,
}

/// One designer page: the composition it owns plus everything derived from it.
pub struct DesignerSession<C, S: LongPressScheduler> {
    catalog: C,
    rules: DesignerRules,
    composition: Composition,
    viewport: ViewportSize,
    geometry: StageGeometry,
    panel_top: Option<f32>,
    placed: Vec<PlacedBead>,
    gestures: GestureMachine<S>,
    next_instance: u64,
}

impl<C: CatalogLookup, S: LongPressScheduler> DesignerSession<C, S> {
    pub fn new(
        catalog: C,
        rules: DesignerRules,
        scheduler: S,
        viewport: &impl ViewportProvider,
    ) -> Self {
        let viewport = viewport.viewport_size();
        let geometry = compute_stage_geometry(viewport.width, &rules.stage);
        Self {
            catalog,
            rules,
            composition: Composition::new(),
            viewport,
            geometry,
            panel_top: None,
            placed: Vec::new(),
            gestures: GestureMachine::new(rules.gesture, scheduler),
            next_instance: 1,
        }
    }

    pub fn rules(&self) -> &DesignerRules {
        &self.rules
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn placed(&self) -> &[PlacedBead] {
        &self.placed
    }

    pub fn geometry(&self) -> &StageGeometry {
        &self.geometry
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn gestures(&self) -> &GestureMachine<S> {
        &self.gestures
    }

    pub fn gap_mm(&self) -> f32 {
        self.rules.gap_mm
    }

    pub fn wrist_size_cm(&self) -> f32 {
        self.rules.wrist_size_cm
    }

    pub fn delete_zone(&self) -> DeleteZone {
        match self.panel_top {
            Some(top_y) => DeleteZone::from_panel_top(top_y),
            None => DeleteZone::from_viewport(self.viewport, self.rules.gesture.delete_zone_fraction),
        }
    }

    pub fn set_viewport(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
        self.geometry = compute_stage_geometry(viewport.width, &self.rules.stage);
        self.relayout();
    }

    /// Pins the delete zone to the rendered panel's top edge (viewport
    /// coordinates). `None` falls back to the configured viewport fraction.
    pub fn set_delete_panel_top(&mut self, top_y: Option<f32>) {
        self.panel_top = top_y.filter(|value| value.is_finite());
    }

    pub fn set_gap_mm(&mut self, gap_mm: f32) {
        self.rules.gap_mm = clamp_gap_mm(gap_mm);
        self.relayout();
    }

    pub fn set_wrist_size_cm(&mut self, wrist_size_cm: f32) {
        self.rules.wrist_size_cm = clamp_wrist_size_cm(wrist_size_cm);
    }

    pub fn set_wrist_tolerance_mm(&mut self, tolerance_mm: f32) {
        self.rules.wrist_tolerance_mm = clamp_wrist_tolerance_mm(tolerance_mm);
    }

    pub fn fit(&self) -> FitStatus {
        check_fit(
            self.composition.beads(),
            self.rules.gap_mm,
            self.rules.wrist_size_cm,
            self.rules.wrist_tolerance_mm,
        )
    }

    pub fn total_price_cents(&self) -> u64 {
        self.composition.total_price_cents()
    }

    /// Places a catalog item at the end of the ring. Declined without any
    /// change when the result would overflow the wrist target.
    pub fn append(&mut self, catalog_id: &str) -> Result<FitStatus, DesignError> {
        let item = self
            .catalog
            .lookup(catalog_id)
            .ok_or_else(|| DesignError::UnknownBead(catalog_id.to_string()))?;
        if !item.diameter_mm.is_finite() || item.diameter_mm <= 0.0 {
            return Err(DesignError::InvalidDiameter {
                catalog_id: item.id,
                diameter_mm: item.diameter_mm,
            });
        }
        let projected = check_fit_diameters(
            self.composition
                .iter()
                .map(|bead| bead.diameter_mm)
                .chain(std::iter::once(item.diameter_mm)),
            self.rules.gap_mm,
            self.rules.wrist_size_cm,
            self.rules.wrist_tolerance_mm,
        );
        if projected.is_overflow() {
            debug!(
                catalog_id = %item.id,
                length_mm = projected.current_length_mm,
                "append declined, ring would overflow"
            );
            return Err(DesignError::WouldOverflow(projected));
        }
        let instance_id = InstanceId(self.next_instance);
        self.next_instance += 1;
        self.composition.append(Bead::from_catalog(instance_id, &item));
        self.relayout();
        Ok(projected)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Bead, DesignError> {
        let len = self.composition.len();
        let bead = self
            .composition
            .remove_at(index)
            .ok_or(DesignError::IndexOutOfRange { index, len })?;
        self.gestures.teardown();
        self.gestures.follow_removal(index);
        self.relayout();
        Ok(bead)
    }

    pub fn swap(&mut self, i: usize, j: usize) -> Result<(), DesignError> {
        let len = self.composition.len();
        if !self.composition.swap(i, j) {
            let index = if i >= len { i } else { j };
            return Err(DesignError::IndexOutOfRange { index, len });
        }
        self.gestures.teardown();
        self.gestures.follow_swap(i, j);
        self.relayout();
        Ok(())
    }

    /// Toolbox delete: removes the selected bead, if any.
    pub fn remove_selected(&mut self) -> Option<Bead> {
        let index = self.gestures.selected()?;
        self.remove_at(index).ok()
    }

    /// Toolbox clear: empties the ring.
    pub fn clear(&mut self) {
        self.gestures.teardown();
        self.gestures.clear_selection();
        self.composition.clear();
        self.relayout();
    }

    /// Index of the bead under a viewport-space point.
    pub fn hit_test(&self, viewport_point: Point) -> Option<usize> {
        bead_at_point(&self.placed, self.geometry.viewport_to_stage(viewport_point))
    }

    pub fn gesture_start(&mut self, index: usize, pointer: Point) -> GestureOutcome {
        if index >= self.composition.len() {
            return GestureOutcome::Ignored;
        }
        self.gestures.on_gesture_start(index, pointer)
    }

    pub fn long_press(&mut self, ticket: TimerTicket) -> GestureOutcome {
        self.gestures.on_long_press(ticket)
    }

    pub fn gesture_move(&mut self, pointer: Point) -> GestureOutcome {
        let frame = RingFrame {
            placed: &self.placed,
            center: self.geometry.stage_center,
            delete_zone: self.delete_zone(),
        };
        self.gestures.on_gesture_move(pointer, &frame)
    }

    /// Resolves the gesture and applies a committed swap or delete.
    pub fn gesture_end(&mut self) -> GestureOutcome {
        let outcome = self.gestures.on_gesture_end();
        match outcome {
            GestureOutcome::Swap { from, to } => {
                if self.composition.swap(from, to) {
                    self.gestures.follow_swap(from, to);
                    self.relayout();
                }
            }
            GestureOutcome::Delete { index } => {
                if self.composition.remove_at(index).is_some() {
                    self.gestures.follow_removal(index);
                    self.relayout();
                }
            }
            _ => {}
        }
        outcome
    }

    pub fn stage_tap(&mut self) -> GestureOutcome {
        self.gestures.on_stage_tap()
    }

    pub fn teardown(&mut self) {
        self.gestures.teardown();
    }

    pub fn visual_state(&self) -> GestureVisual {
        self.gestures.visual_state()
    }

    pub fn summary(&self) -> CompositionSummary {
        let beads = self
            .composition
            .iter()
            .map(|bead| SummaryEntry {
                instance_id: bead.instance_id,
                catalog_id: bead.catalog_id.clone(),
                name: bead.name.clone(),
                price_cents: bead.price_cents,
                diameter_mm: bead.diameter_mm,
                color: bead.color.clone(),
            })
            .collect();
        let out_of_stock = self
            .composition
            .iter()
            .filter(|bead| !bead.in_stock)
            .map(|bead| bead.instance_id)
            .collect();
        CompositionSummary {
            beads,
            total_price_cents: self.total_price_cents(),
            fit: self.fit(),
            out_of_stock,
        }
    }

    fn relayout(&mut self) {
        self.placed = layout_ring(
            self.composition.beads(),
            self.rules.gap_mm,
            &self.geometry,
            &self.rules.bead,
        );
    }
}
