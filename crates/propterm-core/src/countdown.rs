//! Session-expiry countdown.
//!
//! Counts down once per second from a configured initial value. At zero the
//! run enters the `Expired` terminal state immediately (so the renderer can
//! flash its warning), then after a fixed grace delay delivers `on_expire`
//! exactly once. `reset()` replaces the run's timers and counters as a unit;
//! there is never a window where two tickers for the same logical session
//! are armed. `cancel()` is idempotent and guarantees `on_expire` never
//! fires.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::clock::{RunScope, Scheduler, TimerHandle};
use crate::events::Event;

/// Pause between the expiry warning becoming visible and `on_expire` firing.
pub const DEFAULT_GRACE_MS: u64 = 3000;

const TICK_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Active,
    Expired,
    Cancelled,
}

struct CountdownRun {
    remaining_seconds: u32,
    state: CountdownState,
    scope: RunScope,
}

struct CountdownShared {
    scheduler: Scheduler,
    grace_ms: u64,
    initial_seconds: u32,
    run: RefCell<CountdownRun>,
    on_event: RefCell<Box<dyn FnMut(&Event)>>,
    on_expire: RefCell<Box<dyn FnMut()>>,
}

/// Control handle for a mounted session countdown.
#[derive(Clone)]
pub struct CountdownControl {
    shared: Rc<CountdownShared>,
}

impl CountdownControl {
    pub fn remaining_seconds(&self) -> u32 {
        self.shared.run.borrow().remaining_seconds
    }

    pub fn state(&self) -> CountdownState {
        self.shared.run.borrow().state
    }

    pub fn snapshot(&self) -> Event {
        let run = self.shared.run.borrow();
        Event::CountdownSnapshot {
            remaining_seconds: run.remaining_seconds,
            state: run.state,
            at: chrono::Utc::now(),
        }
    }

    /// Restart from the original initial value. The old run's timers are
    /// cancelled before the new ticker is armed, so the old expiry can never
    /// fire afterwards.
    pub fn reset(&self) {
        let scope = {
            let mut run = self.shared.run.borrow_mut();
            run.scope.stop_all();
            run.scope = RunScope::new(&self.shared.scheduler);
            run.remaining_seconds = self.shared.initial_seconds;
            run.state = CountdownState::Active;
            run.scope.clone()
        };
        arm_ticker(&self.shared, &scope);
    }

    /// Enter the `Cancelled` terminal state and stop all timers. Idempotent;
    /// `on_expire` never fires after this.
    pub fn cancel(&self) {
        let mut run = self.shared.run.borrow_mut();
        if run.state == CountdownState::Cancelled {
            return;
        }
        run.state = CountdownState::Cancelled;
        run.scope.stop_all();
    }
}

/// Factory for session countdowns on one scheduler. Owns at most one live
/// session; mounting a new one cancels the previous.
pub struct CountdownSession {
    scheduler: Scheduler,
    grace_ms: u64,
    active: RefCell<Option<CountdownControl>>,
}

impl CountdownSession {
    pub fn new(scheduler: Scheduler) -> Self {
        Self::with_grace(scheduler, DEFAULT_GRACE_MS)
    }

    pub fn with_grace(scheduler: Scheduler, grace_ms: u64) -> Self {
        Self {
            scheduler,
            grace_ms,
            active: RefCell::new(None),
        }
    }

    /// Mount a countdown of `initial_seconds`. A previously mounted session
    /// is cancelled first.
    pub fn start(
        &self,
        initial_seconds: u32,
        on_expire: impl FnMut() + 'static,
    ) -> CountdownControl {
        self.start_observed(initial_seconds, |_| {}, on_expire)
    }

    /// Mount a countdown with an observer receiving every
    /// [`Event::CountdownTick`] and the final [`Event::CountdownExpired`].
    pub fn start_observed(
        &self,
        initial_seconds: u32,
        on_event: impl FnMut(&Event) + 'static,
        on_expire: impl FnMut() + 'static,
    ) -> CountdownControl {
        if let Some(previous) = self.active.borrow_mut().take() {
            previous.cancel();
        }

        let scope = RunScope::new(&self.scheduler);
        let shared = Rc::new(CountdownShared {
            scheduler: self.scheduler.clone(),
            grace_ms: self.grace_ms,
            initial_seconds,
            run: RefCell::new(CountdownRun {
                remaining_seconds: initial_seconds,
                state: CountdownState::Active,
                scope: scope.clone(),
            }),
            on_event: RefCell::new(Box::new(on_event)),
            on_expire: RefCell::new(Box::new(on_expire)),
        });
        arm_ticker(&shared, &scope);

        let control = CountdownControl { shared };
        *self.active.borrow_mut() = Some(control.clone());
        control
    }
}

fn arm_ticker(shared: &Rc<CountdownShared>, scope: &RunScope) {
    let ticker: Rc<Cell<Option<TimerHandle>>> = Rc::new(Cell::new(None));
    let tick_handle = Rc::clone(&ticker);
    let tick_scope = scope.clone();
    let r = Rc::clone(shared);

    let handle = scope.arm_repeating(TICK_MS, move || {
        let (remaining, expired) = {
            let mut run = r.run.borrow_mut();
            if run.state != CountdownState::Active {
                return;
            }
            run.remaining_seconds = run.remaining_seconds.saturating_sub(1);
            if run.remaining_seconds == 0 {
                run.state = CountdownState::Expired;
            }
            (run.remaining_seconds, run.remaining_seconds == 0)
        };
        (r.on_event.borrow_mut())(&Event::countdown_tick(remaining));
        if expired {
            if let Some(h) = tick_handle.take() {
                r.scheduler.cancel(h);
            }
            let expire_shared = Rc::clone(&r);
            tick_scope.arm_once(r.grace_ms, move || {
                (expire_shared.on_event.borrow_mut())(&Event::countdown_expired());
                (expire_shared.on_expire.borrow_mut())();
            });
        }
    });
    ticker.set(handle);
}
