//! Workout session execution.
//!
//! # Architecture: single writer
//!
//! ```text
//! user intents ─┐
//!               ├─► Command ─► reduce(state, command, now) ─► SessionState ─► presentation
//! clock ticks ──┘
//! ```
//!
//! [`Session`] owns the one live [`SessionState`] and is the only thing that
//! replaces it. Callers never mutate the state directly; they send commands.
//! The type is not thread-safe; hosts that share it wrap it themselves.
//!
//! # Module Structure
//!
//! - [`state`]: the serializable execution state
//! - [`reducer`]: `Command` and the pure transition function
//! - [`log`]: the per-set ledger (`weight_data`)

pub mod log;
pub mod reducer;
pub mod state;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{CadenceError, Result};
use crate::history::WorkoutReport;
use crate::types::{SessionStatus, Side, Workout};

pub use log::{parse_numeric_input, SetData, SetLogEntry};
pub use reducer::{reduce, Command};
pub use state::SessionState;

/// Handle owning the live session state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    /// An idle session for `workout` (the INIT transition).
    pub fn new(workout: Workout) -> Self {
        Session {
            state: SessionState::new(workout),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Applies `command` stamped with the current wall-clock time.
    pub fn dispatch(&mut self, command: Command) -> &SessionState {
        self.dispatch_at(command, Utc::now())
    }

    /// Applies `command` as if it happened at `now`.
    pub fn dispatch_at(&mut self, command: Command, now: DateTime<Utc>) -> &SessionState {
        let name = command.name();
        let current = std::mem::take(&mut self.state);
        let (from_status, from_phase) = (current.status, current.phase);

        self.state = reduce(current, command, now);

        if self.state.status != from_status {
            info!(
                command = name,
                from = ?from_status,
                to = ?self.state.status,
                "Session status changed"
            );
        }
        if self.state.phase != from_phase {
            debug!(
                command = name,
                from = ?from_phase,
                to = ?self.state.phase,
                exercise = self.state.exercise_index,
                set = self.state.set_number,
                "Phase changed"
            );
        }
        &self.state
    }

    pub fn init(&mut self, workout: Workout) {
        self.dispatch(Command::Init(workout));
    }

    /// Starts `workout` from its first exercise's prep countdown.
    pub fn start(&mut self, workout: Workout, initial_weights: HashMap<String, f64>) -> Result<()> {
        if workout.exercises.is_empty() {
            return Err(CadenceError::EmptyWorkout(workout.id));
        }
        self.dispatch(Command::Start {
            workout,
            initial_weights,
        });
        Ok(())
    }

    pub fn pause(&mut self) {
        self.dispatch(Command::Pause);
    }

    pub fn resume(&mut self) {
        self.dispatch(Command::Resume);
    }

    /// Pauses a running session or resumes a paused one.
    pub fn toggle_pause(&mut self) {
        match self.state.status {
            SessionStatus::Running => self.pause(),
            SessionStatus::Paused => self.resume(),
            _ => {}
        }
    }

    pub fn tick(&mut self, elapsed_secs: f64) {
        self.dispatch(Command::Tick(elapsed_secs));
    }

    pub fn skip(&mut self) {
        self.dispatch(Command::Skip);
    }

    pub fn register_failure(&mut self) {
        self.dispatch(Command::RegisterFailure);
    }

    pub fn log_set_data(&mut self, data: SetData) {
        self.dispatch(Command::LogSetData(data));
    }

    pub fn set_start_side(&mut self, side: Side) {
        self.dispatch(Command::SetStartSide(side));
    }

    pub fn finish_workout(&mut self) {
        self.dispatch(Command::FinishWorkout);
    }

    /// Replaces the live state with a snapshot taken before a crash. Elapsed
    /// wall-clock time during the outage is not applied.
    pub fn recover(&mut self, snapshot: SessionState) -> Result<()> {
        if !snapshot.status.is_recoverable() {
            return Err(CadenceError::NotRecoverable {
                status: snapshot.status,
            });
        }
        self.dispatch(Command::Recover(Box::new(snapshot)));
        Ok(())
    }

    /// A copy of the state worth persisting for crash recovery.
    pub fn snapshot(&self) -> Option<SessionState> {
        self.state.is_active().then(|| self.state.clone())
    }

    /// The finished log resolved for the history store.
    pub fn report(&self) -> Result<WorkoutReport> {
        if !self.state.is_finished() {
            return Err(CadenceError::SessionNotFinished);
        }
        Ok(WorkoutReport::from_state(&self.state))
    }
}
