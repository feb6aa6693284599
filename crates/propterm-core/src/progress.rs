//! Stepped progress simulator.
//!
//! Ramps a value from 0 to a target in a fixed number of equal steps, one
//! `on_step` callback per tick. The value at tick `i` is computed as
//! `target * i / step_count` so the final tick lands exactly on the target
//! with no accumulated float drift. Used to fake "processing" before a
//! pass/fail outcome is revealed.
//!
//! Chaining several ramps is the caller's job; each ramp must settle (reach
//! its target) before the next begins if the composed display is to stay
//! monotonic.

use std::cell::Cell;
use std::rc::Rc;

use crate::clock::{RunScope, Scheduler};
use crate::events::Event;

/// Steps per ramp unless the caller overrides it.
pub const DEFAULT_STEP_COUNT: u32 = 20;

/// Control handle for one progress ramp.
#[derive(Clone)]
pub struct ProgressControl {
    scope: RunScope,
    value: Rc<Cell<f64>>,
    settled: Rc<Cell<bool>>,
}

impl ProgressControl {
    /// Cancel remaining ticks without resetting the value reached so far.
    pub fn stop(&self) {
        self.scope.stop_all();
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }

    /// True once the final tick has delivered the exact target value.
    pub fn is_settled(&self) -> bool {
        self.settled.get()
    }
}

/// Factory for progress ramps on one scheduler.
pub struct ProgressSimulator {
    scheduler: Scheduler,
}

impl ProgressSimulator {
    pub fn new(scheduler: Scheduler) -> Self {
        Self { scheduler }
    }

    /// Ramp to `target`, delivering each step as a [`Event::ProgressStepped`].
    pub fn run_to_observed(
        &self,
        target: f64,
        duration_ms: u64,
        mut on_event: impl FnMut(&Event) + 'static,
    ) -> ProgressControl {
        self.run_to_with_steps(
            target,
            duration_ms,
            move |value| on_event(&Event::progress_stepped(value)),
            DEFAULT_STEP_COUNT,
        )
    }

    /// Ramp to `target` over `duration_ms` in [`DEFAULT_STEP_COUNT`] steps.
    pub fn run_to(
        &self,
        target: f64,
        duration_ms: u64,
        on_step: impl FnMut(f64) + 'static,
    ) -> ProgressControl {
        self.run_to_with_steps(target, duration_ms, on_step, DEFAULT_STEP_COUNT)
    }

    /// Ramp to `target` over `duration_ms` in `step_count` equal steps.
    pub fn run_to_with_steps(
        &self,
        target: f64,
        duration_ms: u64,
        mut on_step: impl FnMut(f64) + 'static,
        step_count: u32,
    ) -> ProgressControl {
        let step_count = step_count.max(1);
        let step_delay_ms = duration_ms / u64::from(step_count);

        let scope = RunScope::new(&self.scheduler);
        let value = Rc::new(Cell::new(0.0));
        let settled = Rc::new(Cell::new(false));
        let tick = Rc::new(Cell::new(0u32));

        let run_scope = scope.clone();
        let run_value = Rc::clone(&value);
        let run_settled = Rc::clone(&settled);
        scope.arm_repeating(step_delay_ms, move || {
            let i = tick.get() + 1;
            tick.set(i);
            let next = if i >= step_count {
                target
            } else {
                (target * f64::from(i) / f64::from(step_count)).min(target)
            };
            // Clamped and non-decreasing, whatever the arithmetic above did.
            let next = next.max(run_value.get());
            run_value.set(next);
            on_step(next);
            if i >= step_count {
                run_settled.set(true);
                run_scope.stop_all();
            }
        });

        ProgressControl {
            scope,
            value,
            settled,
        }
    }
}
