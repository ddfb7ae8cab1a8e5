use beadring_core::{
    CatalogItem, CatalogMap, DesignerRules, DesignerSession, DragPhase, FixedViewport,
    GestureOutcome, InstanceId, ManualScheduler, Point, ViewportSize,
};

type Session = DesignerSession<CatalogMap, ManualScheduler>;

fn catalog() -> CatalogMap {
    ["agate", "jasper", "onyx"]
        .into_iter()
        .map(|id| CatalogItem {
            id: id.to_string(),
            name: id.to_string(),
            price_cents: 1000,
            diameter_mm: 10.0,
            color: "#445566".to_string(),
            in_stock: true,
        })
        .collect()
}

fn session_with(count: usize) -> (Session, ManualScheduler) {
    let scheduler = ManualScheduler::new();
    let mut session = DesignerSession::new(
        catalog(),
        DesignerRules::default(),
        scheduler.clone(),
        &FixedViewport(ViewportSize::new(390.0, 844.0)),
    );
    let ids = ["agate", "jasper", "onyx"];
    for index in 0..count {
        session.append(ids[index % ids.len()]).expect("bead fits");
    }
    (session, scheduler)
}

/// Viewport position of a placed bead's centre.
fn bead_pointer(session: &Session, index: usize) -> Point {
    session
        .geometry()
        .stage_to_viewport(session.placed()[index].position)
}

fn advance(session: &mut Session, scheduler: &ManualScheduler, ms: u64) -> Vec<GestureOutcome> {
    scheduler
        .advance(ms)
        .into_iter()
        .map(|ticket| session.long_press(ticket))
        .collect()
}

fn begin_drag(session: &mut Session, scheduler: &ManualScheduler, index: usize) -> Point {
    let start = bead_pointer(session, index);
    assert_eq!(
        session.gesture_start(index, start),
        GestureOutcome::Selected { index }
    );
    let delay_ms = u64::from(session.rules().gesture.long_press_ms);
    let fired = advance(session, scheduler, delay_ms);
    assert_eq!(fired, vec![GestureOutcome::DragStarted { index }]);
    start
}

#[test]
fn swap_commit_exchanges_two_entries() {
    let (mut session, scheduler) = session_with(5);
    let before = session.composition().instance_ids();
    begin_drag(&mut session, &scheduler, 2);

    let target = bead_pointer(&session, 4);
    let outcome = session.gesture_move(target);
    assert!(matches!(
        outcome,
        GestureOutcome::DragMoved {
            index: 2,
            swap_target: Some(4),
            over_delete_zone: false,
            ..
        }
    ));
    assert_eq!(session.visual_state().swap_target, Some(4));
    // highlight only: nothing moved yet
    assert_eq!(session.composition().instance_ids(), before);

    assert_eq!(session.gesture_end(), GestureOutcome::Swap { from: 2, to: 4 });
    let after = session.composition().instance_ids();
    assert_eq!(after[2], before[4]);
    assert_eq!(after[4], before[2]);
    for index in [0, 1, 3] {
        assert_eq!(after[index], before[index]);
    }
    assert!(session.gestures().is_idle());
    assert_eq!(session.gestures().selected(), Some(4));
}

#[test]
fn delete_commit_removes_exactly_one_entry() {
    for dragged in 0..4 {
        let (mut session, scheduler) = session_with(4);
        let before = session.composition().instance_ids();
        let start = begin_drag(&mut session, &scheduler, dragged);

        let outcome = session.gesture_move(Point::new(start.x, 700.0));
        assert!(matches!(
            outcome,
            GestureOutcome::DragMoved {
                over_delete_zone: true,
                swap_target: None,
                ..
            }
        ));
        assert_eq!(
            session.gesture_end(),
            GestureOutcome::Delete { index: dragged }
        );

        let mut expected = before.clone();
        expected.remove(dragged);
        assert_eq!(session.composition().instance_ids(), expected);
        assert_eq!(session.placed().len(), 3);
        assert_eq!(session.gestures().selected(), None);
    }
}

#[test]
fn leaving_delete_zone_restores_swap_detection() {
    let (mut session, scheduler) = session_with(5);
    let start = begin_drag(&mut session, &scheduler, 0);
    session.gesture_move(Point::new(start.x, 800.0));
    assert!(session.visual_state().over_delete_zone);
    let outcome = session.gesture_move(bead_pointer(&session, 1));
    assert!(matches!(
        outcome,
        GestureOutcome::DragMoved {
            swap_target: Some(1),
            over_delete_zone: false,
            ..
        }
    ));
    assert_eq!(session.gesture_end(), GestureOutcome::Swap { from: 0, to: 1 });
}

#[test]
fn jitter_before_long_press_never_drags() {
    let (mut session, scheduler) = session_with(3);
    let start = bead_pointer(&session, 1);
    session.gesture_start(1, start);
    assert!(advance(&mut session, &scheduler, 100).is_empty());

    let outcome = session.gesture_move(Point::new(start.x + 8.0, start.y));
    assert_eq!(outcome, GestureOutcome::Cancelled { index: 1 });
    assert_eq!(scheduler.pending_count(), 0);

    // holding still for a long time afterwards changes nothing
    assert!(advance(&mut session, &scheduler, 5_000).is_empty());
    assert_eq!(session.gestures().phase(), None);
    assert_eq!(session.gesture_move(start), GestureOutcome::Ignored);
    assert_eq!(session.gesture_end(), GestureOutcome::Ignored);
    assert_eq!(session.visual_state().dragging_index, None);
    // the tap selection survives the cancelled drag
    assert_eq!(session.gestures().selected(), Some(1));
}

#[test]
fn vertical_jitter_also_cancels() {
    let (mut session, scheduler) = session_with(3);
    let start = bead_pointer(&session, 0);
    session.gesture_start(0, start);
    let outcome = session.gesture_move(Point::new(start.x, start.y - 7.0));
    assert_eq!(outcome, GestureOutcome::Cancelled { index: 0 });
    assert!(advance(&mut session, &scheduler, 1_000).is_empty());
}

#[test]
fn release_without_target_is_a_no_op() {
    let (mut session, scheduler) = session_with(3);
    let before = session.composition().clone();
    let start = begin_drag(&mut session, &scheduler, 0);

    let outcome = session.gesture_move(Point::new(start.x + 3.0, start.y + 2.0));
    assert!(matches!(
        outcome,
        GestureOutcome::DragMoved {
            swap_target: None,
            over_delete_zone: false,
            ..
        }
    ));
    assert_eq!(session.gestures().phase(), Some(DragPhase::Dragging));
    assert_eq!(session.gesture_end(), GestureOutcome::Cancelled { index: 0 });
    assert_eq!(session.composition(), &before);
}

#[test]
fn new_touch_replaces_a_stale_session() {
    let (mut session, scheduler) = session_with(3);
    session.gesture_start(0, bead_pointer(&session, 0));
    advance(&mut session, &scheduler, 100);
    session.gesture_start(2, bead_pointer(&session, 2));
    assert_eq!(scheduler.pending_count(), 1);

    // first timer would have been due at 280ms; only the second one fires
    assert!(advance(&mut session, &scheduler, 180).is_empty());
    let fired = advance(&mut session, &scheduler, 100);
    assert_eq!(fired, vec![GestureOutcome::DragStarted { index: 2 }]);
}

#[test]
fn drag_does_not_relayout_until_release() {
    let (mut session, scheduler) = session_with(4);
    let placed_before = session.placed().to_vec();
    let start = begin_drag(&mut session, &scheduler, 1);
    for step in 1..10 {
        let offset = step as f32 * 5.0;
        session.gesture_move(Point::new(start.x + offset, start.y + offset));
        assert_eq!(session.placed(), placed_before.as_slice());
    }
    session.teardown();
    assert!(session.gestures().is_idle());
}

#[test]
fn stage_tap_clears_selection() {
    let (mut session, _scheduler) = session_with(2);
    session.gesture_start(1, bead_pointer(&session, 1));
    session.gesture_end();
    assert_eq!(session.gestures().selected(), Some(1));
    assert_eq!(session.stage_tap(), GestureOutcome::SelectionCleared);
    assert_eq!(session.gestures().selected(), None);
}

#[test]
fn instance_ids_survive_reordering() {
    let (mut session, scheduler) = session_with(3);
    let ids = session.composition().instance_ids();
    assert_eq!(ids, vec![InstanceId(1), InstanceId(2), InstanceId(3)]);
    begin_drag(&mut session, &scheduler, 0);
    session.gesture_move(bead_pointer(&session, 2));
    session.gesture_end();
    assert_eq!(
        session.composition().instance_ids(),
        vec![InstanceId(3), InstanceId(2), InstanceId(1)]
    );
}
