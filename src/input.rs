use std::collections::HashMap;

use beadring_core::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
    Unknown,
}

impl PointerKind {
    pub fn from_pointer_type(value: &str) -> Self {
        match value {
            "mouse" => PointerKind::Mouse,
            "touch" => PointerKind::Touch,
            "pen" => PointerKind::Pen,
            _ => PointerKind::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerId(pub i32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEventKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// A pointer event already translated into viewport coordinates.
#[derive(Clone, Copy, Debug)]
pub struct InputEvent {
    pub kind: InputEventKind,
    pub pointer_id: PointerId,
    pub pointer_kind: PointerKind,
    pub is_primary: bool,
    pub view_x: f32,
    pub view_y: f32,
    pub time_ms: f32,
}

impl InputEvent {
    pub fn point(&self) -> Point {
        Point::new(self.view_x, self.view_y)
    }
}

pub const INPUT_KIND_COOLDOWN_MS: f32 = 2000.0;


/// Decides which pointer drives the designer. Only one pointer at a time may
/// own a gesture; extra fingers are tracked so their release is not mistaken
/// for the owner's, but they never reach the gesture machine.
#[derive(Debug, Default)]
pub struct PointerPolicy {
    last_kind: Option<PointerKind>,
    last_ts: f32,
    owner: Option<PointerId>,
    active_pointers: HashMap<PointerId, Point>,
}

impl PointerPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self) -> Option<PointerId> {
        self.owner
    }

    pub fn active_count(&self) -> usize {
        self.active_pointers.len()
    }

    /// Emulated mouse events trail a touch by a few hundred ms on mobile
    /// browsers; a kind switch inside the cooldown is dropped.
    fn accept_kind(&mut self, kind: PointerKind, now_ms: f32) -> bool {
        if let Some(last) = self.last_kind {
            if last != kind && (now_ms - self.last_ts) < INPUT_KIND_COOLDOWN_MS {
                return false;
            }
        }
        self.last_kind = Some(kind);
        self.last_ts = now_ms;
        true
    }

    /// Returns true when the event should be routed to the designer.
    pub fn admit(&mut self, event: &InputEvent) -> bool {
        match event.kind {
            InputEventKind::Down => {
                if !self.accept_kind(event.pointer_kind, event.time_ms) {
                    return false;
                }
                self.active_pointers.insert(event.pointer_id, event.point());
                if self.owner.is_some() || !event.is_primary {
                    return false;
                }
                self.owner = Some(event.pointer_id);
                true
            }
            InputEventKind::Move => {
                if let Some(last) = self.active_pointers.get_mut(&event.pointer_id) {
                    *last = event.point();
                }
                self.owner == Some(event.pointer_id)
            }
            InputEventKind::Up | InputEventKind::Cancel => {
                self.active_pointers.remove(&event.pointer_id);
                if self.owner == Some(event.pointer_id) {
                    self.owner = None;
                    if event.pointer_kind == PointerKind::Touch {
                        self.last_ts = event.time_ms;
                    }
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn last_position(&self, id: PointerId) -> Option<Point> {
        self.active_pointers.get(&id).copied()
    }

    pub fn clear_active(&mut self) {
        self.active_pointers.clear();
        self.owner = None;
    }
}

pub const CLICK_MAX_DURATION_MS: f32 = 240.0;
pub const CLICK_QUICK_TAP_MS: f32 = 120.0;
pub const CLICK_DEFAULT_SLOP_PX: f32 = 4.0;

/// Tap recogniser for touches that land on empty stage.
#[derive(Clone, Copy, Debug)]
pub struct ClickGesture {
    start: Point,
    start_ms: f32,
    max_slop: f32,
    moved: bool,
    active: bool,
}

impl ClickGesture {
    pub fn new_default() -> Self {
        Self::new_with_slop(CLICK_DEFAULT_SLOP_PX)
    }

    pub fn new_with_slop(max_slop: f32) -> Self {
        Self {
            start: Point::ZERO,
            start_ms: 0.0,
            max_slop,
            moved: false,
            active: false,
        }
    }

    pub fn arm(&mut self, at: Point, now_ms: f32) {
        self.start = at;
        self.start_ms = now_ms;
        self.moved = false;
        self.active = true;
    }

    pub fn update(&mut self, at: Point) {
        if !self.active || self.moved {
            return;
        }
        if (at - self.start).length() > self.max_slop {
            self.moved = true;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_click(&self, now_ms: f32) -> bool {
        if !self.active {
            return false;
        }
        let elapsed = (now_ms - self.start_ms).max(0.0);
        if CLICK_QUICK_TAP_MS > 0.0 && elapsed <= CLICK_QUICK_TAP_MS {
            return true;
        }
        if self.moved {
            return false;
        }
        elapsed <= CLICK_MAX_DURATION_MS
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.moved = false;
    }
}

/// Bounding box of the host element in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClientRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ClientRect {
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Maps a client-space point into the host element's local space. The
/// designer's viewport is measured from the same rect, so this is a pure
/// translation.
pub fn client_to_viewport(client: Point, rect: ClientRect) -> Option<Point> {
    if rect.is_empty() {
        return None;
    }
    Some(Point::new(client.x - rect.left, client.y - rect.top))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: InputEventKind, id: i32, primary: bool, time_ms: f32) -> InputEvent {
        InputEvent {
            kind,
            pointer_id: PointerId(id),
            pointer_kind: PointerKind::Touch,
            is_primary: primary,
            view_x: 10.0,
            view_y: 20.0,
            time_ms,
        }
    }

    #[test]
    fn second_finger_is_tracked_but_not_routed() {
        let mut policy = PointerPolicy::new();
        assert!(policy.admit(&event(InputEventKind::Down, 1, true, 0.0)));
        assert!(!policy.admit(&event(InputEventKind::Down, 2, false, 10.0)));
        assert_eq!(policy.active_count(), 2);
        assert!(!policy.admit(&event(InputEventKind::Move, 2, false, 20.0)));
        assert!(!policy.admit(&event(InputEventKind::Up, 2, false, 30.0)));
        assert!(policy.admit(&event(InputEventKind::Move, 1, true, 40.0)));
        assert!(policy.admit(&event(InputEventKind::Up, 1, true, 50.0)));
        assert_eq!(policy.owner(), None);
    }

    #[test]
    fn emulated_mouse_after_touch_is_dropped() {
        let mut policy = PointerPolicy::new();
        policy.admit(&event(InputEventKind::Down, 1, true, 0.0));
        policy.admit(&event(InputEventKind::Up, 1, true, 80.0));
        let mut mouse = event(InputEventKind::Down, 7, true, 300.0);
        mouse.pointer_kind = PointerKind::Mouse;
        assert!(!policy.admit(&mouse));
        mouse.time_ms = 80.0 + INPUT_KIND_COOLDOWN_MS + 1.0;
        assert!(policy.admit(&mouse));
    }

    #[test]
    fn click_gesture_rejects_slow_moved_touch() {
        let mut click = ClickGesture::new_default();
        click.arm(Point::new(0.0, 0.0), 0.0);
        click.update(Point::new(1.0, 1.0));
        assert!(click.is_click(200.0));
        click.update(Point::new(12.0, 0.0));
        assert!(click.is_click(100.0));
        assert!(!click.is_click(200.0));
    }

    #[test]
    fn client_to_viewport_translates_without_stretching() {
        // host shorter than the window: y must stay 1:1 with the finger
        let rect = ClientRect {
            left: 50.0,
            top: 10.0,
            width: 390.0,
            height: 400.0,
        };
        let point = client_to_viewport(Point::new(150.0, 210.0), rect);
        assert_eq!(point, Some(Point::new(100.0, 200.0)));
        let collapsed = ClientRect { width: 0.0, ..rect };
        assert_eq!(client_to_viewport(Point::ZERO, collapsed), None);
    }
}
