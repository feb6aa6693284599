//! Stage sequencer: plays an ordered list of scripted stages.
//!
//! Each stage reveals its log lines at their configured offsets, then after
//! the stage duration the sequencer clears the revealed lines and enters the
//! next stage. Past the last stage the run is complete; the completion
//! callback fires exactly once after a fixed post-completion delay so the
//! presentation layer can show the terminal state first.
//!
//! `stop()` at any point cancels every pending timer for the run - no further
//! state mutation, no completion callback. Starting a new run on the same
//! sequencer stops the live one first, so two runs never mutate the same
//! visible state concurrently.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::clock::{RunScope, Scheduler};
use crate::events::Event;

/// Delay between the final stage ending and the completion callback.
pub const DEFAULT_COMPLETION_DELAY_MS: u64 = 1000;

/// One log line of a stage, revealed `offset_ms` after stage entry.
/// Offsets are strictly increasing within a stage; the first may be 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    pub text: String,
    pub offset_ms: u64,
}

impl LogLine {
    pub fn new(text: impl Into<String>, offset_ms: u64) -> Self {
        Self {
            text: text.into(),
            offset_ms,
        }
    }
}

/// An immutable scripted stage from the content catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub title: String,
    #[serde(default)]
    pub log_lines: Vec<LogLine>,
    pub duration_ms: u64,
    /// Opaque effect tags for the presentation layer ("tunnel", "firewall",
    /// "map"). The sequencer passes them through unmodified.
    #[serde(default)]
    pub effects: Vec<String>,
}

impl Stage {
    pub fn total_duration_ms(stages: &[Stage]) -> u64 {
        stages.iter().map(|s| s.duration_ms).sum()
    }
}

/// Mutable session state of one sequence run.
#[derive(Debug, Clone, Default)]
pub struct SequenceState {
    /// Index of the current stage, clamped to the last stage once complete.
    pub current_stage: usize,
    /// Log lines of the current stage revealed so far.
    pub revealed_logs: Vec<String>,
    /// True once the run has advanced past the last stage.
    pub complete: bool,
}

struct SequenceRun {
    scope: RunScope,
    stages: Vec<Stage>,
    state: Rc<RefCell<SequenceState>>,
    on_event: RefCell<Box<dyn FnMut(&Event)>>,
    on_complete: RefCell<Option<Box<dyn FnOnce()>>>,
    completion_delay_ms: u64,
}

/// Control handle for a live sequence run.
#[derive(Clone)]
pub struct SequenceControl {
    scope: RunScope,
    state: Rc<RefCell<SequenceState>>,
}

impl SequenceControl {
    /// Cancel all pending timers for this run. Idempotent; guarantees no
    /// further state mutation and no completion callback.
    pub fn stop(&self) {
        self.scope.stop_all();
    }

    pub fn state(&self) -> SequenceState {
        self.state.borrow().clone()
    }

    pub fn current_stage(&self) -> usize {
        self.state.borrow().current_stage
    }

    pub fn revealed_logs(&self) -> Vec<String> {
        self.state.borrow().revealed_logs.clone()
    }

    pub fn is_complete(&self) -> bool {
        self.state.borrow().complete
    }

    pub fn snapshot(&self) -> Event {
        let state = self.state.borrow();
        Event::SequenceSnapshot {
            current_stage: state.current_stage,
            revealed_logs: state.revealed_logs.clone(),
            complete: state.complete,
            at: chrono::Utc::now(),
        }
    }
}

/// Factory for sequence runs on one scheduler. Owns at most one live run.
pub struct StageSequencer {
    scheduler: Scheduler,
    completion_delay_ms: u64,
    active: RefCell<Option<SequenceControl>>,
}

impl StageSequencer {
    pub fn new(scheduler: Scheduler) -> Self {
        Self::with_completion_delay(scheduler, DEFAULT_COMPLETION_DELAY_MS)
    }

    pub fn with_completion_delay(scheduler: Scheduler, completion_delay_ms: u64) -> Self {
        Self {
            scheduler,
            completion_delay_ms,
            active: RefCell::new(None),
        }
    }

    /// Start a run. Any previous run on this sequencer is stopped first.
    pub fn start(
        &self,
        stages: Vec<Stage>,
        on_complete: impl FnOnce() + 'static,
    ) -> SequenceControl {
        self.start_observed(stages, |_| {}, on_complete)
    }

    /// Start a run with an observer receiving every state-transition event.
    pub fn start_observed(
        &self,
        stages: Vec<Stage>,
        on_event: impl FnMut(&Event) + 'static,
        on_complete: impl FnOnce() + 'static,
    ) -> SequenceControl {
        if let Some(previous) = self.active.borrow_mut().take() {
            previous.stop();
        }

        let scope = RunScope::new(&self.scheduler);
        let state = Rc::new(RefCell::new(SequenceState::default()));
        let run = Rc::new(SequenceRun {
            scope: scope.clone(),
            stages,
            state: Rc::clone(&state),
            on_event: RefCell::new(Box::new(on_event)),
            on_complete: RefCell::new(Some(Box::new(on_complete))),
            completion_delay_ms: self.completion_delay_ms,
        });
        enter_stage(&run, 0);

        let control = SequenceControl { scope, state };
        *self.active.borrow_mut() = Some(control.clone());
        control
    }
}

fn enter_stage(run: &Rc<SequenceRun>, index: usize) {
    {
        let mut state = run.state.borrow_mut();
        // Past the final stage the index clamps rather than overflowing.
        state.current_stage = index.min(run.stages.len().saturating_sub(1));
        state.revealed_logs.clear();
    }

    let Some(stage) = run.stages.get(index) else {
        run.state.borrow_mut().complete = true;
        let r = Rc::clone(run);
        run.scope.arm_once(run.completion_delay_ms, move || {
            (r.on_event.borrow_mut())(&Event::sequence_completed());
            if let Some(on_complete) = r.on_complete.borrow_mut().take() {
                on_complete();
            }
            r.scope.stop_all();
        });
        return;
    };

    (run.on_event.borrow_mut())(&Event::stage_entered(index, &stage.title, &stage.effects));

    for line in &stage.log_lines {
        let text = line.text.clone();
        let r = Rc::clone(run);
        run.scope.arm_once(line.offset_ms, move || {
            r.state.borrow_mut().revealed_logs.push(text.clone());
            (r.on_event.borrow_mut())(&Event::log_revealed(index, &text));
        });
    }

    let r = Rc::clone(run);
    run.scope
        .arm_once(stage.duration_ms, move || enter_stage(&r, index + 1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn stage(title: &str, logs: &[(&str, u64)], duration_ms: u64) -> Stage {
        Stage {
            title: title.into(),
            log_lines: logs
                .iter()
                .map(|(text, offset)| LogLine::new(*text, *offset))
                .collect(),
            duration_ms,
            effects: Vec::new(),
        }
    }

    #[test]
    fn reveals_logs_at_offsets_then_advances() {
        let scheduler = Scheduler::new();
        let sequencer = StageSequencer::new(scheduler.clone());
        let control = sequencer.start(
            vec![
                stage("IGNITION", &[("> boot", 0), ("> link", 400)], 2000),
                stage("TUNNEL", &[("> render", 0)], 3000),
            ],
            || {},
        );

        scheduler.advance(0);
        assert_eq!(control.revealed_logs(), vec!["> boot"]);
        scheduler.advance(400);
        assert_eq!(control.revealed_logs(), vec!["> boot", "> link"]);
        assert_eq!(control.current_stage(), 0);

        scheduler.advance(1600);
        assert_eq!(control.current_stage(), 1);
        assert_eq!(control.revealed_logs(), vec!["> render"]);
        assert!(!control.is_complete());
    }

    #[test]
    fn completes_exactly_once_after_total_duration_plus_delay() {
        let scheduler = Scheduler::new();
        let sequencer = StageSequencer::new(scheduler.clone());
        let completions = Rc::new(Cell::new(0u32));

        let c = Rc::clone(&completions);
        let control = sequencer.start(
            vec![stage("A", &[], 2000), stage("B", &[], 500)],
            move || c.set(c.get() + 1),
        );

        scheduler.advance(2500 + DEFAULT_COMPLETION_DELAY_MS - 1);
        assert_eq!(completions.get(), 0);
        assert!(control.is_complete());
        scheduler.advance(1);
        assert_eq!(completions.get(), 1);
        scheduler.advance(1_000_000);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn two_stage_scenario_state_at_1600ms() {
        let scheduler = Scheduler::new();
        let sequencer = StageSequencer::new(scheduler.clone());
        let completions = Rc::new(Cell::new(0u32));

        let c = Rc::clone(&completions);
        let control = sequencer.start(
            vec![stage("one", &[("A", 0)], 1000), stage("two", &[], 500)],
            move || c.set(c.get() + 1),
        );

        scheduler.advance(1600);
        assert_eq!(control.current_stage(), 1);
        assert_eq!(control.revealed_logs(), Vec::<String>::new());
        assert!(control.is_complete());
        assert_eq!(completions.get(), 0);

        scheduler.advance(DEFAULT_COMPLETION_DELAY_MS);
        assert_eq!(completions.get(), 1);
        scheduler.advance(100_000);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn stop_freezes_state_and_suppresses_completion() {
        let scheduler = Scheduler::new();
        let sequencer = StageSequencer::new(scheduler.clone());
        let completions = Rc::new(Cell::new(0u32));

        let c = Rc::clone(&completions);
        let control = sequencer.start(
            vec![stage("A", &[("x", 0), ("y", 300)], 1000)],
            move || c.set(c.get() + 1),
        );

        scheduler.advance(100);
        control.stop();
        let frozen = control.state();
        scheduler.advance(1_000_000);

        let after = control.state();
        assert_eq!(after.current_stage, frozen.current_stage);
        assert_eq!(after.revealed_logs, frozen.revealed_logs);
        assert!(!after.complete);
        assert_eq!(completions.get(), 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let scheduler = Scheduler::new();
        let sequencer = StageSequencer::new(scheduler.clone());
        let control = sequencer.start(vec![stage("A", &[], 100)], || {});
        control.stop();
        control.stop();
    }

    #[test]
    fn empty_stage_list_completes_after_delay() {
        let scheduler = Scheduler::new();
        let sequencer = StageSequencer::new(scheduler.clone());
        let completions = Rc::new(Cell::new(0u32));

        let c = Rc::clone(&completions);
        let control = sequencer.start(Vec::new(), move || c.set(c.get() + 1));

        assert!(control.is_complete());
        scheduler.advance(DEFAULT_COMPLETION_DELAY_MS - 1);
        assert_eq!(completions.get(), 0);
        scheduler.advance(1);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn empty_log_stage_still_honors_duration() {
        let scheduler = Scheduler::new();
        let sequencer = StageSequencer::new(scheduler.clone());
        let control = sequencer.start(
            vec![stage("quiet", &[], 700), stage("loud", &[("z", 0)], 700)],
            || {},
        );

        scheduler.advance(699);
        assert_eq!(control.current_stage(), 0);
        scheduler.advance(1);
        assert_eq!(control.current_stage(), 1);
    }

    #[test]
    fn restart_stops_previous_run() {
        let scheduler = Scheduler::new();
        let sequencer = StageSequencer::new(scheduler.clone());
        let completions = Rc::new(Cell::new(0u32));

        let c = Rc::clone(&completions);
        let first = sequencer.start(vec![stage("A", &[("old", 0)], 500)], move || {
            c.set(c.get() + 1)
        });
        scheduler.advance(100);

        let c = Rc::clone(&completions);
        let second = sequencer.start(vec![stage("B", &[("new", 0)], 500)], move || {
            c.set(c.get() + 1)
        });
        scheduler.advance(500 + DEFAULT_COMPLETION_DELAY_MS);

        // Only the second run completed; the first was torn down mid-flight.
        assert_eq!(completions.get(), 1);
        assert!(second.is_complete());
        assert!(!first.is_complete());
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let scheduler = Scheduler::new();
        let sequencer = StageSequencer::new(scheduler.clone());
        let control = sequencer.start(vec![stage("A", &[("x", 0)], 1000)], || {});
        scheduler.advance(100);

        match control.snapshot() {
            Event::SequenceSnapshot {
                current_stage,
                revealed_logs,
                complete,
                ..
            } => {
                assert_eq!(current_stage, 0);
                assert_eq!(revealed_logs, vec!["x"]);
                assert!(!complete);
            }
            _ => panic!("Expected SequenceSnapshot"),
        }
    }

    #[test]
    fn observer_sees_stage_entries_and_reveals_in_order() {
        let scheduler = Scheduler::new();
        let sequencer = StageSequencer::new(scheduler.clone());
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

        let s = Rc::clone(&seen);
        sequencer.start_observed(
            vec![
                stage("ONE", &[("a", 0), ("b", 100)], 300),
                stage("TWO", &[("c", 0)], 300),
            ],
            move |event| {
                let label = match event {
                    Event::StageEntered { title, .. } => format!("enter:{title}"),
                    Event::LogRevealed { line, .. } => format!("log:{line}"),
                    Event::SequenceCompleted { .. } => "done".to_string(),
                    _ => return,
                };
                s.borrow_mut().push(label);
            },
            || {},
        );

        scheduler.advance(600 + DEFAULT_COMPLETION_DELAY_MS);
        assert_eq!(
            *seen.borrow(),
            vec!["enter:ONE", "log:a", "log:b", "enter:TWO", "log:c", "done"]
        );
    }
}
