use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Identifies one scheduled long-press timer. A fired ticket that no longer
/// matches the live gesture session is stale and ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerTicket(pub u64);

/// Schedules the long-press timer. Dropping the returned handle cancels the
/// timer, so whoever owns the handle owns the timer's lifetime.
pub trait LongPressScheduler {
    type Handle;

    fn schedule(&mut self, ticket: TimerTicket, delay_ms: u32) -> Self::Handle;
}

/// Virtual clock for tests and scripted replays. Clones share one queue.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<ManualQueue>>,
}

#[derive(Debug, Default)]
struct ManualQueue {
    now_ms: u64,
    pending: Vec<PendingTimer>,
}

#[derive(Clone, Copy, Debug)]
struct PendingTimer {
    ticket: TimerTicket,
    due_ms: u64,
}

#[derive(Debug)]
pub struct ManualTimer {
    ticket: TimerTicket,
    queue: Weak<RefCell<ManualQueue>>,
}

impl ManualTimer {
    pub fn ticket(&self) -> TimerTicket {
        self.ticket
    }
}

impl Drop for ManualTimer {
    fn drop(&mut self) {
        if let Some(queue) = self.queue.upgrade() {
            let ticket = self.ticket;
            queue
                .borrow_mut()
                .pending
                .retain(|timer| timer.ticket != ticket);
        }
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.queue.borrow().now_ms
    }

    pub fn pending_count(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Moves the clock forward and returns the tickets that came due, in
    /// firing order. Fired timers leave the queue.
    pub fn advance(&self, ms: u64) -> Vec<TimerTicket> {
        let mut queue = self.queue.borrow_mut();
        queue.now_ms = queue.now_ms.saturating_add(ms);
        let now = queue.now_ms;
        let mut due: Vec<PendingTimer> = queue
            .pending
            .iter()
            .copied()
            .filter(|timer| timer.due_ms <= now)
            .collect();
        queue.pending.retain(|timer| timer.due_ms > now);
        due.sort_by_key(|timer| (timer.due_ms, timer.ticket));
        due.into_iter().map(|timer| timer.ticket).collect()
    }
}

impl LongPressScheduler for ManualScheduler {
    type Handle = ManualTimer;

    fn schedule(&mut self, ticket: TimerTicket, delay_ms: u32) -> ManualTimer {
        let mut queue = self.queue.borrow_mut();
        let due_ms = queue.now_ms.saturating_add(u64::from(delay_ms));
        queue.pending.push(PendingTimer { ticket, due_ms });
        ManualTimer {
            ticket,
            queue: Rc::downgrade(&self.queue),
        }
    }
}
