use std::cell::RefCell;
use std::rc::Rc;

use beadring_core::{
    ActionOutcome, CatalogMap, CompositionSummary, DesignError, DesignerAction, DesignerRules,
    DesignerSession, FitStatus, GestureOutcome, GestureVisual, InstanceId, LongPressScheduler,
    Point, StageGeometry, TimerTicket, ViewportProvider, ViewportSize,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::input::{ClickGesture, InputEvent, InputEventKind, PointerPolicy};

pub type AppSubscriber = Rc<dyn Fn()>;

pub type AppSession<S> = DesignerSession<CatalogMap, S>;

/// Owns the designer session for one page and hands out immutable snapshots
/// to whatever renders it.
pub struct AppCore<S: LongPressScheduler> {
    state: RefCell<AppState<S>>,
    snapshots: RefCell<SnapshotBuffer>,
    subscribers: Rc<RefCell<Vec<AppSubscriber>>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Declined,
    Removed,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

/// A placed bead in viewport coordinates, ready to draw.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BeadView {
    pub instance_id: InstanceId,
    pub catalog_id: String,
    pub color: String,
    pub x: f32,
    pub y: f32,
    pub diameter_px: f32,
    pub angle_rad: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppSnapshot {
    /// Bumped whenever anything besides `visual` changes. Drag frames keep
    /// it steady so renderers can skip redrawing the ring.
    pub revision: u64,
    pub viewport: ViewportSize,
    pub geometry: StageGeometry,
    pub delete_zone_top: f32,
    pub beads: Vec<BeadView>,
    pub visual: GestureVisual,
    pub summary: CompositionSummary,
    pub toast: Option<Toast>,
}

struct SnapshotBuffer {
    front: AppSnapshot,
    back: AppSnapshot,
    revision: u64,
}

/// How much of the snapshot an update invalidated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Refresh {
    Skip,
    Visual,
    Full,
}

impl Refresh {
    fn from_gesture(outcome: GestureOutcome) -> Self {
        match outcome {
            GestureOutcome::Ignored => Refresh::Skip,
            GestureOutcome::Swap { .. } | GestureOutcome::Delete { .. } => Refresh::Full,
            _ => Refresh::Visual,
        }
    }
}

impl SnapshotBuffer {
    fn new<S: LongPressScheduler>(state: &AppState<S>) -> Self {
        let snapshot = build_snapshot_from_state(state);
        Self {
            front: snapshot.clone(),
            back: snapshot,
            revision: 0,
        }
    }

    fn refresh_from_state<S: LongPressScheduler>(&mut self, state: &AppState<S>) {
        self.revision += 1;
        fill_snapshot_from_state(state, &mut self.back);
        self.back.revision = self.revision;
        std::mem::swap(&mut self.front, &mut self.back);
    }

    fn refresh_visual(&mut self, visual: GestureVisual) {
        self.front.visual = visual;
    }
}

struct AppState<S: LongPressScheduler> {
    session: AppSession<S>,
    pointers: PointerPolicy,
    stage_click: ClickGesture,
    toast: Option<Toast>,
}

impl<S: LongPressScheduler> AppState<S> {
    fn new(session: AppSession<S>) -> Self {
        Self {
            session,
            pointers: PointerPolicy::new(),
            stage_click: ClickGesture::new_default(),
            toast: None,
        }
    }

    fn pointer_down(&mut self, event: &InputEvent) -> Refresh {
        let point = event.point();
        match self.session.hit_test(point) {
            Some(index) => {
                self.stage_click.clear();
                Refresh::from_gesture(self.session.gesture_start(index, point))
            }
            None => {
                self.stage_click.arm(point, event.time_ms);
                Refresh::Skip
            }
        }
    }

    fn pointer_move(&mut self, event: &InputEvent) -> Refresh {
        let point = event.point();
        self.stage_click.update(point);
        Refresh::from_gesture(self.session.gesture_move(point))
    }

    fn pointer_up(&mut self, event: &InputEvent) -> Refresh {
        if self.stage_click.is_active() {
            let tapped = self.stage_click.is_click(event.time_ms);
            self.stage_click.clear();
            if !tapped {
                return Refresh::Skip;
            }
            return Refresh::from_gesture(self.session.stage_tap());
        }
        let dragged_name = self
            .session
            .gestures()
            .session()
            .and_then(|drag| self.session.composition().get(drag.active_index()))
            .map(|bead| bead.name.clone());
        let outcome = self.session.gesture_end();
        if let (GestureOutcome::Delete { .. }, Some(name)) = (outcome, dragged_name) {
            self.toast = Some(Toast {
                kind: ToastKind::Removed,
                message: format!("Removed {name}"),
            });
        }
        Refresh::from_gesture(outcome)
    }

    fn pointer_cancel(&mut self) -> Refresh {
        self.stage_click.clear();
        let was_active = !self.session.gestures().is_idle();
        self.session.teardown();
        if was_active {
            Refresh::Visual
        } else {
            Refresh::Skip
        }
    }

    fn record_append(&mut self, catalog_id: &str, result: &Result<FitStatus, DesignError>) {
        match result {
            Ok(_) => self.toast = None,
            Err(DesignError::WouldOverflow(status)) => {
                self.toast = Some(Toast {
                    kind: ToastKind::Declined,
                    message: status.message(),
                });
            }
            Err(err) => {
                warn!(catalog_id, error = %err, "append rejected");
                self.toast = Some(Toast {
                    kind: ToastKind::Declined,
                    message: err.to_string(),
                });
            }
        }
    }
}

impl<S: LongPressScheduler> AppCore<S> {
    pub fn new(
        catalog: CatalogMap,
        rules: DesignerRules,
        scheduler: S,
        viewport: &impl ViewportProvider,
    ) -> Rc<Self> {
        let session = DesignerSession::new(catalog, rules, scheduler, viewport);
        let state = AppState::new(session);
        let snapshots = SnapshotBuffer::new(&state);
        Rc::new(Self {
            state: RefCell::new(state),
            snapshots: RefCell::new(snapshots),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        })
    }

    pub fn subscribe(&self, subscriber: AppSubscriber) -> AppSubscription {
        self.subscribers.borrow_mut().push(subscriber.clone());
        AppSubscription {
            subscriber,
            subscribers: Rc::clone(&self.subscribers),
        }
    }

    fn notify(&self) {
        self.refresh(Refresh::Full);
    }

    fn refresh(&self, refresh: Refresh) {
        match refresh {
            Refresh::Skip => return,
            Refresh::Visual => {
                let visual = self.state.borrow().session.visual_state();
                self.snapshots.borrow_mut().refresh_visual(visual);
            }
            Refresh::Full => self.refresh_snapshot_from_state(),
        }
        let subscribers = self.subscribers.borrow().clone();
        for subscriber in subscribers {
            (subscriber)();
        }
    }

    fn refresh_snapshot_from_state(&self) {
        let state = self.state.borrow();
        let mut snapshots = self.snapshots.borrow_mut();
        snapshots.refresh_from_state(&state);
    }

    pub fn snapshot(&self) -> AppSnapshot {
        self.snapshots.borrow().front.clone()
    }

    /// The drag overlay alone; what a renderer needs on every pointer frame.
    pub fn visual(&self) -> GestureVisual {
        self.snapshots.borrow().front.visual
    }

    pub fn revision(&self) -> u64 {
        self.snapshots.borrow().front.revision
    }

    /// Read access to the live session, e.g. for hit testing from the host.
    pub fn with_session<R>(&self, reader: impl FnOnce(&AppSession<S>) -> R) -> R {
        reader(&self.state.borrow().session)
    }

    pub fn set_viewport(&self, viewport: ViewportSize) {
        self.state.borrow_mut().session.set_viewport(viewport);
        self.notify();
    }

    pub fn set_delete_panel_top(&self, top_y: Option<f32>) {
        self.state.borrow_mut().session.set_delete_panel_top(top_y);
        self.notify();
    }

    pub fn append(&self, catalog_id: &str) -> Result<FitStatus, DesignError> {
        let result = {
            let mut state = self.state.borrow_mut();
            let result = state.session.append(catalog_id);
            state.record_append(catalog_id, &result);
            result
        };
        self.notify();
        result
    }

    pub fn handle_input(&self, event: InputEvent) {
        let refresh = {
            let mut state = self.state.borrow_mut();
            if !state.pointers.admit(&event) {
                return;
            }
            match event.kind {
                InputEventKind::Down => state.pointer_down(&event),
                InputEventKind::Move => state.pointer_move(&event),
                InputEventKind::Up => state.pointer_up(&event),
                InputEventKind::Cancel => state.pointer_cancel(),
            }
        };
        self.refresh(refresh);
    }

    /// Called by the scheduler when a long-press timer fires.
    pub fn long_press(&self, ticket: TimerTicket) {
        let outcome = self.state.borrow_mut().session.long_press(ticket);
        if outcome == GestureOutcome::Ignored {
            debug!(ticket = ticket.0, "stale long-press ticket");
            return;
        }
        self.refresh(Refresh::Visual);
    }

    pub fn remove_selected(&self) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            let removed = state.session.remove_selected();
            if let Some(bead) = &removed {
                state.toast = Some(Toast {
                    kind: ToastKind::Removed,
                    message: format!("Removed {}", bead.name),
                });
            }
            removed.is_some()
        };
        if removed {
            self.notify();
        }
        removed
    }

    pub fn clear(&self) {
        self.state.borrow_mut().session.clear();
        self.notify();
    }

    pub fn set_gap_mm(&self, gap_mm: f32) {
        self.state.borrow_mut().session.set_gap_mm(gap_mm);
        self.notify();
    }

    pub fn set_wrist_size_cm(&self, wrist_size_cm: f32) {
        self.state.borrow_mut().session.set_wrist_size_cm(wrist_size_cm);
        self.notify();
    }

    pub fn dismiss_toast(&self) {
        let had_toast = self.state.borrow_mut().toast.take().is_some();
        if had_toast {
            self.notify();
        }
    }

    /// Drops any in-flight gesture and its pending timer.
    pub fn teardown(&self) {
        let mut state = self.state.borrow_mut();
        state.pointers.clear_active();
        state.stage_click.clear();
        state.session.teardown();
    }

    pub fn apply_action(&self, action: DesignerAction) -> ActionOutcome {
        let outcome = {
            let mut state = self.state.borrow_mut();
            let catalog_id = match &action {
                DesignerAction::Append { catalog_id } => Some(catalog_id.clone()),
                _ => None,
            };
            let outcome = state.session.apply_action(action);
            if let (Some(catalog_id), ActionOutcome::Appended(result)) = (catalog_id, &outcome) {
                state.record_append(&catalog_id, result);
            }
            outcome
        };
        self.notify();
        outcome
    }
}

pub struct AppSubscription {
    subscriber: AppSubscriber,
    subscribers: Rc<RefCell<Vec<AppSubscriber>>>,
}

impl Drop for AppSubscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|item| !Rc::ptr_eq(item, &self.subscriber));
    }
}

fn build_snapshot_from_state<S: LongPressScheduler>(state: &AppState<S>) -> AppSnapshot {
    let session = &state.session;
    let mut snapshot = AppSnapshot {
        revision: 0,
        viewport: session.viewport(),
        geometry: *session.geometry(),
        delete_zone_top: session.delete_zone().top_y(),
        beads: Vec::with_capacity(session.placed().len()),
        visual: session.visual_state(),
        summary: session.summary(),
        toast: state.toast.clone(),
    };
    fill_beads(session, &mut snapshot.beads);
    snapshot
}

fn fill_snapshot_from_state<S: LongPressScheduler>(state: &AppState<S>, snapshot: &mut AppSnapshot) {
    let session = &state.session;
    snapshot.viewport = session.viewport();
    snapshot.geometry = *session.geometry();
    snapshot.delete_zone_top = session.delete_zone().top_y();
    snapshot.visual = session.visual_state();
    snapshot.summary = session.summary();
    snapshot.toast.clone_from(&state.toast);
    fill_beads(session, &mut snapshot.beads);
}

fn fill_beads<S: LongPressScheduler>(session: &AppSession<S>, out: &mut Vec<BeadView>) {
    out.clear();
    let geometry = session.geometry();
    for (bead, placed) in session.composition().iter().zip(session.placed()) {
        let Point { x, y } = geometry.stage_to_viewport(placed.position);
        out.push(BeadView {
            instance_id: bead.instance_id,
            catalog_id: bead.catalog_id.clone(),
            color: bead.color.clone(),
            x,
            y,
            diameter_px: placed.visual_diameter_px,
            angle_rad: placed.angle_rad,
        });
    }
}
