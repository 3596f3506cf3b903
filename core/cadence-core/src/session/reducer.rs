//! Maps session commands to state transitions.
//!
//! `reduce` is the only function that produces a new [`SessionState`]. It is
//! pure apart from the `now` it is handed, never fails, and ignores commands
//! that make no sense in the current status.
//!
//! ```text
//! Init            → IDLE, empty log
//! Start           → RUNNING / PREP (first exercise's prep time)
//! Pause / Resume  → toggles RUNNING ⇄ PAUSED, phase frozen
//! Tick(dt)        → counts down; expiry hands over to the sequencer
//! Skip            → same transition as expiry
//! RegisterFailure → closes the current set now
//! LogSetData      → upsert into the set log
//! SetStartSide    → side for the next unilateral set
//! FinishWorkout   → FINISHED from anywhere
//! Recover         → wholesale replace with a RUNNING/PAUSED snapshot
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::sequencer::{self, enter, enter_exercise};
use crate::session::log::{self, SetData};
use crate::session::state::SessionState;
use crate::types::{Phase, SessionStatus, Side, Workout};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Init(Workout),
    Start {
        workout: Workout,
        initial_weights: HashMap<String, f64>,
    },
    Pause,
    Resume,
    /// Elapsed wall-clock seconds since the previous tick.
    Tick(f64),
    Skip,
    RegisterFailure,
    LogSetData(SetData),
    SetStartSide(Side),
    FinishWorkout,
    Recover(Box<SessionState>),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init(_) => "init",
            Command::Start { .. } => "start",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Tick(_) => "tick",
            Command::Skip => "skip",
            Command::RegisterFailure => "register_failure",
            Command::LogSetData(_) => "log_set_data",
            Command::SetStartSide(_) => "set_start_side",
            Command::FinishWorkout => "finish_workout",
            Command::Recover(_) => "recover",
        }
    }
}

pub fn reduce(state: SessionState, command: Command, now: DateTime<Utc>) -> SessionState {
    match command {
        Command::Init(workout) => SessionState::new(workout),
        Command::Start {
            workout,
            initial_weights,
        } => start(workout, initial_weights, now),
        Command::Pause => {
            if state.status == SessionStatus::Running {
                SessionState {
                    status: SessionStatus::Paused,
                    ..state
                }
            } else {
                state
            }
        }
        Command::Resume => {
            if state.status == SessionStatus::Paused {
                SessionState {
                    status: SessionStatus::Running,
                    ..state
                }
            } else {
                state
            }
        }
        Command::Tick(elapsed) => tick(state, elapsed, now),
        Command::Skip => {
            if state.is_active() {
                sequencer::expire_phase(state, now)
            } else {
                state
            }
        }
        Command::RegisterFailure => {
            if state.is_active() && (state.phase.is_work() || state.phase == Phase::Prep) {
                sequencer::finish_set(state, now)
            } else {
                debug!(phase = ?state.phase, "Ignoring failure outside a set");
                state
            }
        }
        Command::LogSetData(data) => {
            let mut state = state;
            log::upsert(&mut state, data);
            state
        }
        Command::SetStartSide(side) => SessionState {
            next_start_side: side,
            ..state
        },
        Command::FinishWorkout => {
            if state.is_finished() {
                state
            } else {
                sequencer::finish(state, now)
            }
        }
        Command::Recover(snapshot) => {
            if snapshot.status.is_recoverable() {
                info!(
                    workout = %snapshot.workout.id,
                    phase = ?snapshot.phase,
                    time_left = snapshot.time_left,
                    "Session recovered from snapshot"
                );
                *snapshot
            } else {
                warn!(status = ?snapshot.status, "Refusing to recover snapshot");
                state
            }
        }
    }
}

fn start(
    workout: Workout,
    initial_weights: HashMap<String, f64>,
    now: DateTime<Utc>,
) -> SessionState {
    let mut state = SessionState::new(workout);
    let Some(prep) = state.workout.exercise(0).map(|first| first.prep_seconds()) else {
        warn!(workout = %state.workout.id, "Cannot start a workout without exercises");
        return state;
    };

    state.initial_weights = initial_weights;
    state.status = SessionStatus::Running;
    state.start_time = Some(now);
    state = enter_exercise(state, 0);
    info!(workout = %state.workout.id, prep, "Workout started");
    enter(state, Phase::Prep, prep)
}

fn tick(mut state: SessionState, elapsed: f64, now: DateTime<Utc>) -> SessionState {
    if state.status != SessionStatus::Running || !elapsed.is_finite() || elapsed <= 0.0 {
        return state;
    }

    // Totals take the whole tick, even one that overshoots the phase.
    state.total_workout_time += elapsed;
    if state.phase == Phase::IsometricWork {
        state.isometric_time += elapsed;
    }

    let remaining = state.time_left - elapsed;
    if remaining > 0.0 {
        state.time_left = remaining;
        return state;
    }

    let from = state.phase;
    let next = sequencer::expire_phase(state, now);
    debug!(from = ?from, to = ?next.phase, time_left = next.time_left, "Phase expired");
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cadence, Exercise};

    fn workout() -> Workout {
        let mut exercise = Exercise::new("e1", "Ex 1", 1, 2);
        exercise.cadence = Cadence::new(2.0, 1.0, 1.0, 0.0);
        exercise.rest_set = 10.0;
        exercise.rest_exercise = 10.0;
        exercise.prep_time = 5.0;
        Workout::new("test", "Test Workout", vec![exercise])
    }

    fn started() -> SessionState {
        reduce(
            SessionState::default(),
            Command::Start {
                workout: workout(),
                initial_weights: HashMap::new(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn init_is_idle_with_empty_log() {
        let state = reduce(SessionState::default(), Command::Init(workout()), Utc::now());
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.workout.id, "test");
        assert!(state.weight_data.is_empty());
    }

    #[test]
    fn start_enters_prep_and_stamps_start_time() {
        let state = started();
        assert_eq!(state.status, SessionStatus::Running);
        assert_eq!(state.phase, Phase::Prep);
        assert_eq!(state.time_left, 5.0);
        assert_eq!(state.phase_duration, 5.0);
        assert!(state.start_time.is_some());
        assert_eq!(state.current_side, None);
    }

    #[test]
    fn start_without_exercises_stays_idle() {
        let state = reduce(
            SessionState::default(),
            Command::Start {
                workout: Workout::new("empty", "Empty", vec![]),
                initial_weights: HashMap::new(),
            },
            Utc::now(),
        );
        assert_eq!(state.status, SessionStatus::Idle);
    }

    #[test]
    fn tick_counts_down_and_accumulates_total() {
        let state = reduce(started(), Command::Tick(1.5), Utc::now());
        assert_eq!(state.phase, Phase::Prep);
        assert_eq!(state.time_left, 3.5);
        assert_eq!(state.total_workout_time, 1.5);
    }

    #[test]
    fn tick_expiry_does_not_carry_over_negative_time() {
        let state = reduce(started(), Command::Tick(5.1), Utc::now());
        assert_eq!(state.phase, Phase::Eccentric);
        assert_eq!(state.time_left, 2.0);
        assert!((state.total_workout_time - 5.1).abs() < 1e-9);
    }

    #[test]
    fn late_tick_counts_full_elapsed_time() {
        let state = reduce(started(), Command::Tick(30.0), Utc::now());
        assert_eq!(state.phase, Phase::Eccentric);
        assert_eq!(state.time_left, 2.0);
        assert_eq!(state.total_workout_time, 30.0);
    }

    #[test]
    fn tick_while_paused_is_ignored() {
        let paused = reduce(started(), Command::Pause, Utc::now());
        let after = reduce(paused.clone(), Command::Tick(3.0), Utc::now());
        assert_eq!(after, paused);
    }

    #[test]
    fn tick_ignores_non_finite_and_negative() {
        let state = started();
        assert_eq!(reduce(state.clone(), Command::Tick(f64::NAN), Utc::now()), state);
        assert_eq!(reduce(state.clone(), Command::Tick(-1.0), Utc::now()), state);
    }

    #[test]
    fn pause_resume_round_trip_keeps_phase() {
        let paused = reduce(started(), Command::Pause, Utc::now());
        assert_eq!(paused.status, SessionStatus::Paused);
        let resumed = reduce(paused, Command::Resume, Utc::now());
        assert_eq!(resumed.status, SessionStatus::Running);
        assert_eq!(resumed.phase, Phase::Prep);
        assert_eq!(resumed.time_left, 5.0);
    }

    #[test]
    fn resume_from_idle_is_ignored() {
        let state = reduce(SessionState::default(), Command::Resume, Utc::now());
        assert_eq!(state.status, SessionStatus::Idle);
    }

    #[test]
    fn skip_acts_like_expiry() {
        let state = reduce(started(), Command::Skip, Utc::now());
        assert_eq!(state.phase, Phase::Eccentric);
        assert_eq!(state.time_left, 2.0);
    }

    #[test]
    fn register_failure_during_rest_is_ignored() {
        let mut state = started();
        state.phase = Phase::RestSet;
        let after = reduce(state.clone(), Command::RegisterFailure, Utc::now());
        assert_eq!(after, state);
    }

    #[test]
    fn finish_workout_from_any_phase() {
        let state = reduce(started(), Command::FinishWorkout, Utc::now());
        assert_eq!(state.status, SessionStatus::Finished);
        assert_eq!(state.phase, Phase::Finished);
        assert!(state.finish_time.is_some());
    }

    #[test]
    fn set_start_side_is_not_retroactive() {
        let mut state = started();
        state.current_side = Some(Side::Left);
        let state = reduce(state, Command::SetStartSide(Side::Right), Utc::now());
        assert_eq!(state.next_start_side, Side::Right);
        assert_eq!(state.current_side, Some(Side::Left));
    }

    #[test]
    fn recover_rejects_finished_and_idle_snapshots() {
        let live = started();
        let mut finished = live.clone();
        finished.status = SessionStatus::Finished;
        let after = reduce(live.clone(), Command::Recover(Box::new(finished)), Utc::now());
        assert_eq!(after, live);

        let idle = SessionState::new(workout());
        let after = reduce(live.clone(), Command::Recover(Box::new(idle)), Utc::now());
        assert_eq!(after, live);
    }

    #[test]
    fn recover_replaces_state_wholesale() {
        let mut snapshot = started();
        snapshot.status = SessionStatus::Paused;
        snapshot.phase = Phase::RestSet;
        snapshot.time_left = 7.0;
        snapshot.set_number = 2;

        let state = reduce(
            SessionState::default(),
            Command::Recover(Box::new(snapshot.clone())),
            Utc::now(),
        );
        assert_eq!(state, snapshot);
    }
}
