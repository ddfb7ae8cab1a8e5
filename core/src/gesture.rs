//! Touch gesture interpretation for placed beads.
//!
//! A touch on a bead selects it and arms a long-press timer. Moving past the
//! jitter threshold before the timer fires turns the touch back into a plain
//! tap. Once the timer fires the bead follows the pointer as a translate
//! offset only; the ring itself is not re-laid-out until release. Release
//! resolves to a delete (pointer inside the delete zone), a swap (a bead
//! within angular reach of the dragged bead) or a cancel.
//!
//! The machine only emits intents. Applying them to the composition is the
//! caller's job.

use serde::Serialize;
use tracing::debug;

use crate::config::GestureRules;
use crate::ring::{angle_from, shorter_arc, PlacedBead};
use crate::stage::{Point, ViewportSize};
use crate::timer::{LongPressScheduler, TimerTicket};

/// Screen region where releasing a dragged bead deletes it. Everything at or
/// below `top_y` (viewport coordinates) is inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeleteZone {
    top_y: f32,
}

impl DeleteZone {
    pub fn from_viewport(viewport: ViewportSize, fraction: f32) -> Self {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.5
        };
        Self {
            top_y: viewport.height * fraction,
        }
    }

    /// Uses the rendered panel's top edge instead of a viewport fraction.
    pub fn from_panel_top(top_y: f32) -> Self {
        Self { top_y }
    }

    pub fn top_y(&self) -> f32 {
        self.top_y
    }

    pub fn contains(&self, pointer: Point) -> bool {
        pointer.y >= self.top_y
    }
}

/// The latest layout a drag is evaluated against.
#[derive(Clone, Copy, Debug)]
pub struct RingFrame<'a> {
    pub placed: &'a [PlacedBead],
    /// Ring centre in stage coordinates, same space as `placed`.
    pub center: Point,
    pub delete_zone: DeleteZone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Armed,
    Dragging,
}

#[derive(Debug)]
pub struct DragSession<H> {
    active_index: usize,
    start_pointer: Point,
    current_offset: Point,
    phase: DragPhase,
    swap_target_index: Option<usize>,
    over_delete_zone: bool,
    ticket: TimerTicket,
    timer: Option<H>,
}

impl<H> DragSession<H> {
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn start_pointer(&self) -> Point {
        self.start_pointer
    }

    pub fn current_offset(&self) -> Point {
        self.current_offset
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn swap_target_index(&self) -> Option<usize> {
        self.swap_target_index
    }

    pub fn over_delete_zone(&self) -> bool {
        self.over_delete_zone
    }

    pub fn timer_pending(&self) -> bool {
        self.timer.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureOutcome {
    Selected {
        index: usize,
    },
    DragStarted {
        index: usize,
    },
    DragMoved {
        index: usize,
        offset: Point,
        swap_target: Option<usize>,
        over_delete_zone: bool,
    },
    Swap {
        from: usize,
        to: usize,
    },
    Delete {
        index: usize,
    },
    Cancelled {
        index: usize,
    },
    SelectionCleared,
    Ignored,
}

/// Ephemeral state the rendering layer applies on top of the ring layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct GestureVisual {
    pub selected: Option<usize>,
    pub dragging_index: Option<usize>,
    pub swap_target: Option<usize>,
    pub over_delete_zone: bool,
    pub offset: Point,
}

pub struct GestureMachine<S: LongPressScheduler> {
    rules: GestureRules,
    scheduler: S,
    session: Option<DragSession<S::Handle>>,
    selected: Option<usize>,
    next_ticket: u64,
}

impl<S: LongPressScheduler> GestureMachine<S> {
    pub fn new(rules: GestureRules, scheduler: S) -> Self {
        Self {
            rules,
            scheduler,
            session: None,
            selected: None,
            next_ticket: 1,
        }
    }

    pub fn rules(&self) -> &GestureRules {
        &self.rules
    }

    pub fn set_rules(&mut self, rules: GestureRules) {
        self.rules = rules;
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn session(&self) -> Option<&DragSession<S::Handle>> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> Option<DragPhase> {
        self.session.as_ref().map(|session| session.phase)
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn on_gesture_start(&mut self, index: usize, pointer: Point) -> GestureOutcome {
        if let Some(stale) = self.session.take() {
            debug!(
                index = stale.active_index,
                phase = ?stale.phase,
                "gesture restarted, dropping previous session"
            );
        }
        let ticket = TimerTicket(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);
        let timer = self.scheduler.schedule(ticket, self.rules.long_press_ms);
        self.session = Some(DragSession {
            active_index: index,
            start_pointer: pointer,
            current_offset: Point::ZERO,
            phase: DragPhase::Armed,
            swap_target_index: None,
            over_delete_zone: false,
            ticket,
            timer: Some(timer),
        });
        self.selected = Some(index);
        GestureOutcome::Selected { index }
    }

    pub fn on_long_press(&mut self, ticket: TimerTicket) -> GestureOutcome {
        let Some(session) = self.session.as_mut() else {
            return GestureOutcome::Ignored;
        };
        if session.phase != DragPhase::Armed || session.ticket != ticket {
            return GestureOutcome::Ignored;
        }
        session.timer = None;
        session.phase = DragPhase::Dragging;
        session.current_offset = Point::ZERO;
        debug!(index = session.active_index, "long press, drag started");
        GestureOutcome::DragStarted {
            index: session.active_index,
        }
    }

    pub fn on_gesture_move(&mut self, pointer: Point, frame: &RingFrame<'_>) -> GestureOutcome {
        let Some(session) = self.session.as_mut() else {
            return GestureOutcome::Ignored;
        };
        match session.phase {
            DragPhase::Armed => {
                let delta = pointer - session.start_pointer;
                let jitter = self.rules.jitter_px;
                if delta.x.abs() > jitter || delta.y.abs() > jitter {
                    let index = session.active_index;
                    self.session = None;
                    debug!(index, "moved before long press, drag cancelled");
                    GestureOutcome::Cancelled { index }
                } else {
                    GestureOutcome::Ignored
                }
            }
            DragPhase::Dragging => {
                session.current_offset = pointer - session.start_pointer;
                if frame.delete_zone.contains(pointer) {
                    session.over_delete_zone = true;
                    session.swap_target_index = None;
                } else {
                    session.over_delete_zone = false;
                    session.swap_target_index = find_swap_target(
                        frame,
                        session.active_index,
                        session.current_offset,
                        self.rules.swap_threshold_rad,
                    );
                }
                GestureOutcome::DragMoved {
                    index: session.active_index,
                    offset: session.current_offset,
                    swap_target: session.swap_target_index,
                    over_delete_zone: session.over_delete_zone,
                }
            }
        }
    }

    pub fn on_gesture_end(&mut self) -> GestureOutcome {
        let Some(session) = self.session.take() else {
            return GestureOutcome::Ignored;
        };
        let index = session.active_index;
        let outcome = match session.phase {
            DragPhase::Armed => GestureOutcome::Cancelled { index },
            DragPhase::Dragging if session.over_delete_zone => GestureOutcome::Delete { index },
            DragPhase::Dragging => match session.swap_target_index {
                Some(to) if to != index => GestureOutcome::Swap { from: index, to },
                _ => GestureOutcome::Cancelled { index },
            },
        };
        debug!(?outcome, "gesture ended");
        outcome
    }

    /// A tap on the stage outside every bead.
    pub fn on_stage_tap(&mut self) -> GestureOutcome {
        if self.session.is_some() {
            return GestureOutcome::Ignored;
        }
        match self.selected.take() {
            Some(_) => GestureOutcome::SelectionCleared,
            None => GestureOutcome::Ignored,
        }
    }

    /// Ends any live session without an outcome, e.g. when the view goes away.
    pub fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(index = session.active_index, "gesture torn down");
        }
    }

    pub fn visual_state(&self) -> GestureVisual {
        let mut visual = GestureVisual {
            selected: self.selected,
            ..GestureVisual::default()
        };
        if let Some(session) = self
            .session
            .as_ref()
            .filter(|session| session.phase == DragPhase::Dragging)
        {
            visual.dragging_index = Some(session.active_index);
            visual.swap_target = session.swap_target_index;
            visual.over_delete_zone = session.over_delete_zone;
            visual.offset = session.current_offset;
        }
        visual
    }

    /// Keeps the selection on the same bead after a committed swap.
    pub fn follow_swap(&mut self, from: usize, to: usize) {
        self.selected = self.selected.map(|selected| {
            if selected == from {
                to
            } else if selected == to {
                from
            } else {
                selected
            }
        });
    }

    /// Keeps the selection on the same bead after a removal; drops it when
    /// the selected bead itself was removed.
    pub fn follow_removal(&mut self, index: usize) {
        self.selected = match self.selected {
            Some(selected) if selected == index => None,
            Some(selected) if selected > index => Some(selected - 1),
            other => other,
        };
    }
}

fn find_swap_target(
    frame: &RingFrame<'_>,
    active_index: usize,
    offset: Point,
    threshold_rad: f32,
) -> Option<usize> {
    let active = frame.placed.get(active_index)?;
    let angle = angle_from(frame.center, active.position + offset);
    let mut best: Option<(usize, f32)> = None;
    for (index, bead) in frame.placed.iter().enumerate() {
        if index == active_index {
            continue;
        }
        let distance = shorter_arc(angle, bead.angle_rad);
        if distance > threshold_rad {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}
