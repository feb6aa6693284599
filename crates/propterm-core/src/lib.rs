//! # Propterm Core Library
//!
//! Core logic for Propterm, a themed, non-functional "hacker terminal" prop.
//! Everything visible is scripted or randomly generated; the engineering
//! substance is the timed event scheduling that drives the scripted screens.
//!
//! ## Architecture
//!
//! - **Scheduler**: a single-threaded cooperative clock. No internal threads;
//!   the caller advances virtual time (tests) or sleeps to the next deadline
//!   and advances (wall-clock playback in the CLI)
//! - **Stage Sequencer**: plays an ordered stage script, revealing log lines
//!   at staggered offsets, with exactly-once completion
//! - **Progress Simulator**: fixed-step monotonic progress ramps
//! - **Countdown Session**: per-second session-expiry countdown with a grace
//!   delay before the one-shot expiry callback
//! - **Catalog / Intel**: the scripted content and seeded mock-data
//!   generators the screens consume
//!
//! All three timed components arm their timers through a per-run
//! [`clock::RunScope`], so stopping a run structurally guarantees that no
//! stale timer ever mutates a dismissed screen's state.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod error;
pub mod events;
pub mod intel;
pub mod progress;
pub mod sequence;

pub use clock::{RunScope, Scheduler, TimerHandle};
pub use config::TimingConfig;
pub use countdown::{CountdownControl, CountdownSession, CountdownState};
pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use intel::{MockIntel, YearSummary};
pub use progress::{ProgressControl, ProgressSimulator, DEFAULT_STEP_COUNT};
pub use sequence::{LogLine, SequenceControl, SequenceState, Stage, StageSequencer};
