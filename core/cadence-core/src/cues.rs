//! Audio cues derived from state transitions.
//!
//! Cues are computed by diffing two consecutive states, so any host that
//! observes the session (terminal bell, speech, haptics) gets the same
//! sequence without hooking into the sequencer.

use crate::session::SessionState;
use crate::types::Phase;

/// Phases at least this long get a 3-2-1 countdown even when they are
/// work phases.
const COUNTDOWN_MIN_PHASE_SECS: f64 = 3.0;
const COUNTDOWN_FROM: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// A new phase began.
    Announce(Phase),
    /// Whole seconds left in the current phase (3, 2, 1).
    Countdown(u32),
    Finished,
}

impl Cue {
    /// Spoken text for the cue.
    pub fn phrase(&self) -> &'static str {
        match self {
            Cue::Announce(Phase::Prep) => "Get ready",
            Cue::Announce(Phase::Eccentric) => "Down",
            Cue::Announce(Phase::Concentric) => "Up",
            Cue::Announce(Phase::BottomHold | Phase::TopHold | Phase::IsometricWork) => "Hold",
            Cue::Announce(Phase::RestSet | Phase::RestExercise) => "Rest",
            Cue::Announce(Phase::Idle) => "",
            Cue::Announce(Phase::Finished) | Cue::Finished => "Workout complete",
            Cue::Countdown(3) => "three",
            Cue::Countdown(2) => "two",
            Cue::Countdown(1) => "one",
            Cue::Countdown(_) => "",
        }
    }
}

/// Cues to play when the session moves from `prev` to `next`.
pub fn detect(prev: &SessionState, next: &SessionState) -> Vec<Cue> {
    let mut cues = Vec::new();
    let phase_changed = prev.phase != next.phase;

    if phase_changed {
        match next.phase {
            Phase::Finished => {
                cues.push(Cue::Finished);
                return cues;
            }
            Phase::Idle => return cues,
            phase => cues.push(Cue::Announce(phase)),
        }
    }

    let counts_down = next.phase.is_rest()
        || next.phase == Phase::Prep
        || next.phase_duration > COUNTDOWN_MIN_PHASE_SECS;
    if !counts_down {
        return cues;
    }

    let current = whole_seconds(next.time_left);
    let previous = whole_seconds(prev.time_left);
    if (1..=COUNTDOWN_FROM).contains(&current) && (phase_changed || current != previous) {
        cues.push(Cue::Countdown(current as u32));
    }
    cues
}

fn whole_seconds(time_left: f64) -> i64 {
    if time_left.is_finite() {
        time_left.ceil() as i64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{reduce, Command};
    use crate::types::{Cadence, Exercise, Workout};
    use chrono::Utc;
    use std::collections::HashMap;

    fn started(prep_time: f64) -> SessionState {
        let mut exercise = Exercise::new("e", "E", 1, 1);
        exercise.cadence = Cadence::new(2.0, 0.0, 1.0, 0.0);
        exercise.prep_time = prep_time;
        reduce(
            SessionState::default(),
            Command::Start {
                workout: Workout::new("w", "W", vec![exercise]),
                initial_weights: HashMap::new(),
            },
            Utc::now(),
        )
    }

    fn tick(state: &SessionState, secs: f64) -> SessionState {
        reduce(state.clone(), Command::Tick(secs), Utc::now())
    }

    #[test]
    fn prep_counts_down_three_two_one() {
        let mut state = started(5.0);
        let mut heard = Vec::new();
        for _ in 0..10 {
            let next = tick(&state, 0.5);
            heard.extend(detect(&state, &next));
            state = next;
            if state.phase != Phase::Prep {
                break;
            }
        }
        assert_eq!(
            heard,
            vec![
                Cue::Countdown(3),
                Cue::Countdown(2),
                Cue::Countdown(1),
                Cue::Announce(Phase::Eccentric),
            ]
        );
    }

    #[test]
    fn short_work_phase_has_no_countdown() {
        let state = tick(&started(5.0), 5.0);
        assert_eq!(state.phase, Phase::Eccentric);
        let next = tick(&state, 0.5);
        assert!(detect(&state, &next).is_empty());
    }

    #[test]
    fn entering_short_rest_counts_immediately() {
        let state = started(3.0);
        let prev = SessionState {
            phase: Phase::Eccentric,
            time_left: 0.0,
            ..state.clone()
        };
        assert_eq!(
            detect(&prev, &state),
            vec![Cue::Announce(Phase::Prep), Cue::Countdown(3)]
        );
    }

    #[test]
    fn finish_emits_finished_only() {
        let state = started(5.0);
        let finished = reduce(state.clone(), Command::FinishWorkout, Utc::now());
        assert_eq!(detect(&state, &finished), vec![Cue::Finished]);
    }

    #[test]
    fn paused_state_is_silent() {
        let state = tick(&started(5.0), 2.5);
        let paused = reduce(state.clone(), Command::Pause, Utc::now());
        assert!(detect(&state, &paused).is_empty());
    }

    #[test]
    fn phrases_cover_holds() {
        assert_eq!(Cue::Announce(Phase::TopHold).phrase(), "Hold");
        assert_eq!(Cue::Announce(Phase::RestExercise).phrase(), "Rest");
        assert_eq!(Cue::Countdown(2).phrase(), "two");
    }
}
