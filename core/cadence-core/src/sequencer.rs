//! Phase sequencer: decides what comes after the current phase.
//!
//! Every function takes the session state by value and returns the next one.
//! Nothing here reads the clock except `finish`, which stamps the supplied
//! `now`.
//!
//! ```text
//! PREP ─► work ─► (cadence cycle)* ─► finish_set
//!                                      ├─ unilateral, first side  ─► PREP (side switch)
//!                                      ├─ bi-set, more partners   ─► PREP (next partner)
//!                                      ├─ last set, last exercise ─► FINISHED
//!                                      ├─ last set                ─► REST_EXERCISE
//!                                      └─ otherwise               ─► REST_SET
//! REST_SET      ─► work (loops back to the bi-set head when resting after a group)
//! REST_EXERCISE ─► work of the next exercise (no PREP)
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::session::log::record_finished_set;
use crate::session::state::SessionState;
use crate::types::{Phase, SessionStatus, Side};

/// Extra seconds granted each time an isometric hold in failure mode runs
/// past its target.
pub const ISOMETRIC_OVERTIME_SECS: f64 = 60.0;

/// Transition taken when the current phase's timer runs out (or is skipped).
pub fn expire_phase(state: SessionState, now: DateTime<Utc>) -> SessionState {
    match state.phase {
        Phase::Idle | Phase::Finished => state,
        Phase::Prep => enter_work(state),
        Phase::RestSet => after_set_rest(state),
        Phase::RestExercise => after_exercise_rest(state, now),
        Phase::IsometricWork => isometric_expired(state, now),
        step => {
            let Some(exercise) = state.current_exercise() else {
                return state;
            };
            let position = exercise
                .cycle()
                .iter()
                .position(|candidate| *candidate == step)
                .unwrap_or(0);
            advance_cycle(state, position + 1, now)
        }
    }
}

/// Closes the running set: records it, then picks the follow-up phase.
pub fn finish_set(mut state: SessionState, now: DateTime<Utc>) -> SessionState {
    let Some(exercise) = state.current_exercise().cloned() else {
        return finish(state, now);
    };
    let index = state.exercise_index;

    if exercise.is_unilateral && state.current_side.is_none() {
        state.current_side = Some(state.next_start_side);
    }
    record_finished_set(&mut state, &exercise);

    if let Some(finished_side) = state.current_side.filter(|_| exercise.is_unilateral) {
        // The first side of a set is the one whose partner side is not logged yet.
        if !side_logged(&state, &exercise.id, finished_side.opposite()) {
            debug!(exercise = %exercise.id, side = ?finished_side.opposite(), "Switching side");
            state.current_side = Some(finished_side.opposite());
            state.reset_rep_counters();
            return enter(state, Phase::Prep, exercise.transition_seconds());
        }
    }

    if state.workout.shares_bi_set(index, index + 1) {
        state = enter_exercise(state, index + 1);
        let prep = state
            .current_exercise()
            .map(|next| next.prep_seconds())
            .unwrap_or(0.0);
        return enter(state, Phase::Prep, prep);
    }

    state.current_side = None;
    state.reset_rep_counters();

    if state.set_number >= exercise.sets {
        if state.workout.is_last(index) {
            return finish(state, now);
        }
        info!(exercise = %exercise.id, "Exercise complete");
        return enter(state, Phase::RestExercise, non_negative(exercise.rest_exercise));
    }

    state.set_number += 1;
    enter(state, Phase::RestSet, non_negative(exercise.rest_set))
}

/// Marks the workout finished. Used for natural completion and manual stop.
pub fn finish(mut state: SessionState, now: DateTime<Utc>) -> SessionState {
    info!(
        workout = %state.workout.id,
        sets = state.weight_data.len(),
        total_secs = state.total_workout_time,
        "Workout finished"
    );
    state.status = SessionStatus::Finished;
    state.phase = Phase::Finished;
    state.time_left = 0.0;
    state.current_side = None;
    state.finish_time = Some(now);
    state
}

/// Points the session at exercise `index` and resets per-set counters. The
/// set number is left alone: bi-set partners share it.
pub(crate) fn enter_exercise(mut state: SessionState, index: usize) -> SessionState {
    state.exercise_index = index;
    state.reset_rep_counters();
    match state.workout.exercise(index) {
        Some(exercise) => {
            state.next_start_side = exercise.start_side;
            state.current_side = exercise.is_unilateral.then_some(exercise.start_side);
        }
        None => state.current_side = None,
    }
    state
}

/// First work phase of the current exercise: the hold for isometric
/// exercises, otherwise the first non-zero cadence step.
pub(crate) fn enter_work(mut state: SessionState) -> SessionState {
    let Some(exercise) = state.current_exercise() else {
        return state;
    };
    let is_unilateral = exercise.is_unilateral;
    let isometric_target = exercise.is_isometric.then_some(f64::from(exercise.reps));

    if is_unilateral && state.current_side.is_none() {
        state.current_side = Some(state.next_start_side);
    }
    state.reset_rep_counters();

    match isometric_target {
        Some(target) => enter(state, Phase::IsometricWork, target),
        None => start_rep(state),
    }
}

pub(crate) fn enter(mut state: SessionState, phase: Phase, duration: f64) -> SessionState {
    state.phase = phase;
    state.time_left = duration;
    state.phase_duration = duration;
    state
}

fn after_set_rest(state: SessionState) -> SessionState {
    let head = bi_set_head(&state, state.exercise_index);
    if head != state.exercise_index {
        debug!(from = state.exercise_index, to = head, "Bi-set loop back");
        return enter_work(enter_exercise(state, head));
    }
    enter_work(state)
}

fn after_exercise_rest(mut state: SessionState, now: DateTime<Utc>) -> SessionState {
    let next = state.exercise_index + 1;
    if state.workout.exercise(next).is_none() {
        return finish(state, now);
    }
    state.set_number = 1;
    enter_work(enter_exercise(state, next))
}

fn isometric_expired(mut state: SessionState, now: DateTime<Utc>) -> SessionState {
    let failure_mode = state
        .current_exercise()
        .map(|exercise| exercise.failure_mode)
        .unwrap_or(false);

    if !failure_mode {
        return finish_set(state, now);
    }

    state.time_left = ISOMETRIC_OVERTIME_SECS;
    state.phase_duration += ISOMETRIC_OVERTIME_SECS;
    state
}

/// Enters the first non-zero step at or after `from`, or completes the rep
/// when the rest of the cycle is empty.
fn advance_cycle(state: SessionState, from: usize, now: DateTime<Utc>) -> SessionState {
    let Some(exercise) = state.current_exercise() else {
        return state;
    };
    let next = exercise
        .cycle()
        .into_iter()
        .skip(from)
        .map(|step| (step, exercise.cadence.duration(step)))
        .find(|(_, seconds)| *seconds > 0.0);

    match next {
        Some((step, seconds)) => enter(state, step, seconds),
        None => complete_rep(state, now),
    }
}

fn complete_rep(mut state: SessionState, now: DateTime<Utc>) -> SessionState {
    let Some(exercise) = state.current_exercise() else {
        return state;
    };
    let target_reached = !exercise.failure_mode && state.rep_number + 1 >= exercise.reps;

    state.rep_number += 1;
    state.actual_reps += 1;

    if target_reached {
        return finish_set(state, now);
    }
    start_rep(state)
}

/// Enters the first non-zero step of a new repetition. An all-zero cadence
/// parks on a zero-length first step so the next tick completes the rep
/// instead of looping here.
fn start_rep(state: SessionState) -> SessionState {
    let Some(exercise) = state.current_exercise() else {
        return state;
    };
    let cycle = exercise.cycle();
    let first = cycle
        .into_iter()
        .map(|step| (step, exercise.cadence.duration(step)))
        .find(|(_, seconds)| *seconds > 0.0)
        .unwrap_or((cycle[0], 0.0));

    enter(state, first.0, first.1)
}

fn side_logged(state: &SessionState, exercise_id: &str, side: Side) -> bool {
    state.weight_data.iter().any(|entry| {
        entry.exercise_id == exercise_id
            && entry.set_number == state.set_number
            && entry.side == Some(side)
    })
}

/// Index of the first exercise of the bi-set group containing `index`.
fn bi_set_head(state: &SessionState, index: usize) -> usize {
    let mut head = index;
    while head > 0 && state.workout.shares_bi_set(head - 1, head) {
        head -= 1;
    }
    head
}

fn non_negative(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
