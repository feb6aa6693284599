//! Cooperative timer scheduler over a virtual millisecond clock.
//!
//! The scheduler does not use internal threads - the caller is responsible
//! for advancing the clock with [`Scheduler::advance`] (tests) or by sleeping
//! to [`Scheduler::next_deadline_ms`] and advancing (wall-clock playback).
//!
//! All timers armed through one [`RunScope`] belong to one logical run and
//! are cancelled together by `stop_all()`. That is the mechanism that keeps
//! a dismissed or restarted screen from mutating state through a leftover
//! timer.
//!
//! ## Ordering
//!
//! Entries fire in `(deadline, arm order)` order. Within one run, callbacks
//! therefore fire in the order their delays were scheduled. Cancellation is
//! checked immediately before each invocation, so a cancel performed by an
//! earlier callback in the same `advance` batch suppresses later entries.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;

/// Identifier for an armed timer. Safe to cancel after firing (no-op).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

enum TimerKind {
    Once(Option<Box<dyn FnOnce()>>),
    Repeating {
        interval_ms: u64,
        callback: Box<dyn FnMut()>,
    },
}

struct Entry {
    fire_at_ms: u64,
    seq: u64,
    id: u64,
    cancelled: Rc<Cell<bool>>,
    kind: TimerKind,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at_ms == other.fire_at_ms && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // BinaryHeap is a max-heap; reverse so the earliest deadline pops first,
    // ties broken by arm order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at_ms
            .cmp(&self.fire_at_ms)
            .then(other.seq.cmp(&self.seq))
    }
}

struct Inner {
    now_ms: u64,
    next_id: u64,
    next_seq: u64,
    queue: BinaryHeap<Entry>,
    /// Cancellation flags for timers that have not fired (or, for repeating
    /// timers, not been cancelled). Removed on cancel and on one-shot fire.
    live: HashMap<u64, Rc<Cell<bool>>>,
}

/// Single-threaded cooperative scheduler. Cloning yields another handle to
/// the same clock and timer queue, so callbacks may arm and cancel timers on
/// the scheduler that is currently dispatching them.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<Inner>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                now_ms: 0,
                next_id: 0,
                next_seq: 0,
                queue: BinaryHeap::new(),
                live: HashMap::new(),
            })),
        }
    }

    /// Current virtual time in milliseconds since scheduler creation.
    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    /// Arm a one-shot timer `delay_ms` from now.
    pub fn arm_once(&self, delay_ms: u64, callback: impl FnOnce() + 'static) -> TimerHandle {
        self.arm(delay_ms, TimerKind::Once(Some(Box::new(callback))))
    }

    /// Arm a repeating timer firing every `interval_ms`. A zero interval is
    /// coerced to 1 ms so a run of ticks always terminates within one
    /// `advance` call.
    pub fn arm_repeating(
        &self,
        interval_ms: u64,
        callback: impl FnMut() + 'static,
    ) -> TimerHandle {
        let interval_ms = interval_ms.max(1);
        self.arm(
            interval_ms,
            TimerKind::Repeating {
                interval_ms,
                callback: Box::new(callback),
            },
        )
    }

    fn arm(&self, delay_ms: u64, kind: TimerKind) -> TimerHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let cancelled = Rc::new(Cell::new(false));
        inner.live.insert(id, Rc::clone(&cancelled));
        let fire_at_ms = inner.now_ms.saturating_add(delay_ms);
        inner.queue.push(Entry {
            fire_at_ms,
            seq,
            id,
            cancelled,
            kind,
        });
        TimerHandle(id)
    }

    /// Cancel a timer. Idempotent; a no-op for handles that already fired
    /// (one-shot) or were already cancelled. A cancelled callback never
    /// fires, even if the cancel races with a pending fire in the current
    /// `advance` batch.
    pub fn cancel(&self, handle: TimerHandle) {
        let mut inner = self.inner.borrow_mut();
        if let Some(flag) = inner.live.remove(&handle.0) {
            flag.set(true);
        }
    }

    /// Deadline of the earliest pending timer, if any. Cancelled entries are
    /// drained lazily here so a wall-clock driver never sleeps toward a dead
    /// timer.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        let mut inner = self.inner.borrow_mut();
        while let Some(entry) = inner.queue.peek() {
            if entry.cancelled.get() {
                inner.queue.pop();
                continue;
            }
            return Some(entry.fire_at_ms);
        }
        None
    }

    /// Advance the clock by `delta_ms`, firing every due callback in order.
    pub fn advance(&self, delta_ms: u64) {
        let target = self.inner.borrow().now_ms.saturating_add(delta_ms);
        self.advance_to(target);
    }

    /// Advance the clock to an absolute time. Timers armed by callbacks
    /// during the advance fire in the same call if they fall within it.
    pub fn advance_to(&self, target_ms: u64) {
        loop {
            let mut entry = {
                let mut inner = self.inner.borrow_mut();
                match inner.queue.peek() {
                    Some(e) if e.fire_at_ms <= target_ms => {
                        let e = inner.queue.pop().expect("peeked entry");
                        if e.fire_at_ms > inner.now_ms {
                            inner.now_ms = e.fire_at_ms;
                        }
                        e
                    }
                    _ => {
                        if target_ms > inner.now_ms {
                            inner.now_ms = target_ms;
                        }
                        return;
                    }
                }
            };
            if entry.cancelled.get() {
                continue;
            }
            // The queue borrow is released here so the callback may arm or
            // cancel timers on this scheduler.
            let rearm_interval = match entry.kind {
                TimerKind::Once(ref mut callback) => {
                    self.inner.borrow_mut().live.remove(&entry.id);
                    if let Some(callback) = callback.take() {
                        callback();
                    }
                    None
                }
                TimerKind::Repeating {
                    interval_ms,
                    ref mut callback,
                } => {
                    callback();
                    (!entry.cancelled.get()).then_some(interval_ms)
                }
            };
            if let Some(interval_ms) = rearm_interval {
                let mut inner = self.inner.borrow_mut();
                entry.fire_at_ms = entry.fire_at_ms.saturating_add(interval_ms);
                entry.seq = inner.next_seq;
                inner.next_seq += 1;
                inner.queue.push(entry);
            }
        }
    }
}

/// Timer handles for one logical run, cancelled together.
///
/// Every screen-level operation (cutscene, progress ramp, countdown) arms its
/// timers through its own scope; `stop_all()` then guarantees no further
/// callback fires for that run. A stopped scope refuses to arm, so a run can
/// never resurrect itself from one of its own callbacks.
#[derive(Clone)]
pub struct RunScope {
    scheduler: Scheduler,
    handles: Rc<RefCell<Vec<TimerHandle>>>,
    stopped: Rc<Cell<bool>>,
}

impl RunScope {
    pub fn new(scheduler: &Scheduler) -> Self {
        Self {
            scheduler: scheduler.clone(),
            handles: Rc::new(RefCell::new(Vec::new())),
            stopped: Rc::new(Cell::new(false)),
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    /// Arm a one-shot timer owned by this run. Returns `None` once stopped.
    pub fn arm_once(
        &self,
        delay_ms: u64,
        callback: impl FnOnce() + 'static,
    ) -> Option<TimerHandle> {
        if self.stopped.get() {
            return None;
        }
        let handle = self.scheduler.arm_once(delay_ms, callback);
        self.handles.borrow_mut().push(handle);
        Some(handle)
    }

    /// Arm a repeating timer owned by this run. Returns `None` once stopped.
    pub fn arm_repeating(
        &self,
        interval_ms: u64,
        callback: impl FnMut() + 'static,
    ) -> Option<TimerHandle> {
        if self.stopped.get() {
            return None;
        }
        let handle = self.scheduler.arm_repeating(interval_ms, callback);
        self.handles.borrow_mut().push(handle);
        Some(handle)
    }

    /// Cancel every timer this run armed. Idempotent.
    pub fn stop_all(&self) {
        if self.stopped.replace(true) {
            return;
        }
        for handle in self.handles.borrow_mut().drain(..) {
            self.scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn once_fires_at_deadline_not_before() {
        let scheduler = Scheduler::new();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        scheduler.arm_once(100, move || f.set(true));

        scheduler.advance(99);
        assert!(!fired.get());
        scheduler.advance(1);
        assert!(fired.get());
    }

    #[test]
    fn repeating_fires_once_per_interval() {
        let scheduler = Scheduler::new();
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let handle = scheduler.arm_repeating(50, move || c.set(c.get() + 1));

        scheduler.advance(249);
        assert_eq!(count.get(), 4);
        scheduler.cancel(handle);
        scheduler.advance(1000);
        assert_eq!(count.get(), 4);
    }

    #[test]
    fn cancelled_once_never_fires() {
        let scheduler = Scheduler::new();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        let handle = scheduler.arm_once(100, move || f.set(true));

        scheduler.cancel(handle);
        scheduler.advance(1000);
        assert!(!fired.get());
    }

    #[test]
    fn cancel_is_idempotent_and_safe_after_fire() {
        let scheduler = Scheduler::new();
        let handle = scheduler.arm_once(10, || {});
        scheduler.advance(10);
        scheduler.cancel(handle);
        scheduler.cancel(handle);
    }

    #[test]
    fn equal_deadlines_fire_in_arm_order() {
        let scheduler = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for label in ["a", "b", "c"] {
            let o = Rc::clone(&order);
            scheduler.arm_once(100, move || o.borrow_mut().push(label));
        }
        scheduler.advance(100);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn callback_can_cancel_a_pending_timer_in_same_batch() {
        let scheduler = Scheduler::new();
        let fired = Rc::new(Cell::new(false));

        let f = Rc::clone(&fired);
        let victim = scheduler.arm_once(100, move || f.set(true));
        let s = scheduler.clone();
        scheduler.arm_once(50, move || s.cancel(victim));

        scheduler.advance(1000);
        assert!(!fired.get());
    }

    #[test]
    fn callback_can_arm_within_same_advance() {
        let scheduler = Scheduler::new();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        let s = scheduler.clone();
        scheduler.arm_once(10, move || {
            s.arm_once(10, move || f.set(true));
        });

        scheduler.advance(20);
        assert!(fired.get());
    }

    #[test]
    fn next_deadline_skips_cancelled_entries() {
        let scheduler = Scheduler::new();
        let first = scheduler.arm_once(10, || {});
        scheduler.arm_once(30, || {});
        scheduler.cancel(first);
        assert_eq!(scheduler.next_deadline_ms(), Some(30));
    }

    #[test]
    fn scope_stop_all_silences_every_timer() {
        let scheduler = Scheduler::new();
        let scope = RunScope::new(&scheduler);
        let count = Rc::new(Cell::new(0u32));

        for delay in [10, 20, 30] {
            let c = Rc::clone(&count);
            scope.arm_once(delay, move || c.set(c.get() + 1));
        }
        let c = Rc::clone(&count);
        scope.arm_repeating(5, move || c.set(c.get() + 1));

        scheduler.advance(7);
        assert_eq!(count.get(), 1);
        scope.stop_all();
        scheduler.advance(10_000);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn stopped_scope_refuses_to_arm() {
        let scheduler = Scheduler::new();
        let scope = RunScope::new(&scheduler);
        scope.stop_all();
        assert!(scope.arm_once(10, || {}).is_none());
        assert!(scope.arm_repeating(10, || {}).is_none());
        assert_eq!(scheduler.next_deadline_ms(), None);
    }

    #[test]
    fn scope_can_be_stopped_from_inside_its_own_callback() {
        let scheduler = Scheduler::new();
        let scope = RunScope::new(&scheduler);
        let count = Rc::new(Cell::new(0u32));

        let c = Rc::clone(&count);
        let s = scope.clone();
        scope.arm_repeating(10, move || {
            c.set(c.get() + 1);
            if c.get() == 3 {
                s.stop_all();
            }
        });

        scheduler.advance(1000);
        assert_eq!(count.get(), 3);
    }
}
