use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::countdown::CountdownState;

/// Every visible state change in the timing core produces an Event.
/// The presentation layer (CLI renderer) consumes them; tests assert on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A new stage of a scripted sequence became current.
    StageEntered {
        stage_index: usize,
        title: String,
        /// Opaque effect tags, passed through from the stage unmodified.
        effects: Vec<String>,
        at: DateTime<Utc>,
    },
    /// One log line of the current stage became visible.
    LogRevealed {
        stage_index: usize,
        line: String,
        at: DateTime<Utc>,
    },
    /// The sequence ran past its final stage and the completion delay elapsed.
    SequenceCompleted {
        at: DateTime<Utc>,
    },
    /// One step of a progress ramp fired.
    ProgressStepped {
        value: f64,
        at: DateTime<Utc>,
    },
    /// One second elapsed on a session countdown.
    CountdownTick {
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    /// The session countdown reached zero and its grace delay elapsed.
    CountdownExpired {
        at: DateTime<Utc>,
    },
    /// Full sequence state, for `status`-style output.
    SequenceSnapshot {
        current_stage: usize,
        revealed_logs: Vec<String>,
        complete: bool,
        at: DateTime<Utc>,
    },
    /// Full countdown state, for `status`-style output.
    CountdownSnapshot {
        remaining_seconds: u32,
        state: CountdownState,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn stage_entered(stage_index: usize, title: &str, effects: &[String]) -> Self {
        Event::StageEntered {
            stage_index,
            title: title.to_string(),
            effects: effects.to_vec(),
            at: Utc::now(),
        }
    }

    pub fn log_revealed(stage_index: usize, line: &str) -> Self {
        Event::LogRevealed {
            stage_index,
            line: line.to_string(),
            at: Utc::now(),
        }
    }

    pub fn sequence_completed() -> Self {
        Event::SequenceCompleted { at: Utc::now() }
    }

    pub fn progress_stepped(value: f64) -> Self {
        Event::ProgressStepped {
            value,
            at: Utc::now(),
        }
    }

    pub fn countdown_tick(remaining_seconds: u32) -> Self {
        Event::CountdownTick {
            remaining_seconds,
            at: Utc::now(),
        }
    }

    pub fn countdown_expired() -> Self {
        Event::CountdownExpired { at: Utc::now() }
    }
}
