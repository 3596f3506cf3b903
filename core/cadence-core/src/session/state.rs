//! Session execution state: the single value every command transforms.
//!
//! The whole struct is what gets written to the crash-recovery snapshot, so
//! every field other than `workout` has a serde default.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::session::log::{latest_weight, SetLogEntry};
use crate::types::{Exercise, Phase, SessionStatus, Side, Workout};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub phase: Phase,
    pub workout: Workout,
    /// During rest this still points at the exercise that was just finished.
    #[serde(default)]
    pub exercise_index: usize,
    /// 1-based. During REST_SET it already names the upcoming set.
    #[serde(default = "first_set")]
    pub set_number: u32,
    #[serde(default)]
    pub rep_number: u32,
    #[serde(default)]
    pub actual_reps: u32,
    #[serde(default)]
    pub isometric_time: f64,
    #[serde(default)]
    pub time_left: f64,
    #[serde(default)]
    pub phase_duration: f64,
    #[serde(default)]
    pub current_side: Option<Side>,
    #[serde(default)]
    pub next_start_side: Side,
    #[serde(default, deserialize_with = "timestamp_from_any")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp_from_any")]
    pub finish_time: Option<DateTime<Utc>>,
    /// Seconds spent running, excluding pauses.
    #[serde(default)]
    pub total_workout_time: f64,
    #[serde(default)]
    pub weight_data: Vec<SetLogEntry>,
    /// Advisory pre-fill values (exercise id → weight); never read by transitions.
    #[serde(default)]
    pub initial_weights: HashMap<String, f64>,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::new(Workout::default())
    }
}

impl SessionState {
    /// A fresh, idle session for `workout` with an empty log.
    pub fn new(workout: Workout) -> Self {
        SessionState {
            status: SessionStatus::Idle,
            phase: Phase::Idle,
            workout,
            exercise_index: 0,
            set_number: 1,
            rep_number: 0,
            actual_reps: 0,
            isometric_time: 0.0,
            time_left: 0.0,
            phase_duration: 0.0,
            current_side: None,
            next_start_side: Side::Left,
            start_time: None,
            finish_time: None,
            total_workout_time: 0.0,
            weight_data: Vec::new(),
            initial_weights: HashMap::new(),
        }
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.workout.exercise(self.exercise_index)
    }

    /// The exercise the next work phase will run, if any.
    pub fn upcoming_exercise(&self) -> Option<&Exercise> {
        match self.phase {
            Phase::RestExercise => self.workout.exercise(self.exercise_index + 1),
            Phase::Finished | Phase::Idle => None,
            _ => self.current_exercise(),
        }
    }

    /// Fraction of the current phase already elapsed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.phase_duration <= 0.0 || !self.phase_duration.is_finite() {
            return 0.0;
        }
        ((self.phase_duration - self.time_left) / self.phase_duration).clamp(0.0, 1.0)
    }

    /// Seconds held past the isometric target in failure mode.
    pub fn overtime(&self) -> Option<f64> {
        if self.phase != Phase::IsometricWork {
            return None;
        }
        let exercise = self.current_exercise()?;
        let over = self.isometric_time - f64::from(exercise.reps);
        if exercise.failure_mode && over > 0.0 {
            Some(over)
        } else {
            None
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_recoverable()
    }

    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    /// Pre-fill weight for an exercise: the latest logged value, falling back
    /// to the advisory initial weight.
    pub fn suggested_weight(&self, exercise_id: &str) -> Option<f64> {
        latest_weight(&self.weight_data, exercise_id)
            .or_else(|| self.initial_weights.get(exercise_id).copied())
    }

    /// Most recent log entry, i.e. the set the user is resting after.
    pub fn last_entry(&self) -> Option<&SetLogEntry> {
        self.weight_data.last()
    }

    /// Wall-clock duration in seconds, clamped at zero.
    pub fn duration_secs(&self) -> Option<i64> {
        match (self.start_time, self.finish_time) {
            (Some(start), Some(finish)) => Some((finish - start).num_seconds().max(0)),
            _ => None,
        }
    }

    pub(crate) fn reset_rep_counters(&mut self) {
        self.rep_number = 0;
        self.actual_reps = 0;
        self.isometric_time = 0.0;
    }
}

fn first_set() -> u32 {
    1
}

// Snapshots from earlier versions stored epoch milliseconds.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Rfc3339(DateTime<Utc>),
    Millis(i64),
}

fn timestamp_from_any<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<RawTimestamp>::deserialize(deserializer)?.and_then(|raw| match raw {
            RawTimestamp::Rfc3339(at) => Some(at),
            RawTimestamp::Millis(ms) => Utc.timestamp_millis_opt(ms).single(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Exercise;

    fn workout() -> Workout {
        Workout::new("w", "W", vec![Exercise::new("e1", "Ex 1", 2, 5)])
    }

    #[test]
    fn new_state_is_idle_with_first_set() {
        let state = SessionState::new(workout());
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.set_number, 1);
        assert!(state.weight_data.is_empty());
    }

    #[test]
    fn progress_guards_zero_duration() {
        let mut state = SessionState::new(workout());
        state.phase_duration = 0.0;
        state.time_left = 0.0;
        assert_eq!(state.progress(), 0.0);

        state.phase_duration = 4.0;
        state.time_left = 1.0;
        assert!((state.progress() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn overtime_only_in_failure_mode_isometric() {
        let mut exercise = Exercise::new("plank", "Plank", 1, 30);
        exercise.is_isometric = true;
        exercise.failure_mode = true;
        let mut state = SessionState::new(Workout::new("w", "W", vec![exercise]));
        state.phase = Phase::IsometricWork;
        state.isometric_time = 42.0;
        assert_eq!(state.overtime(), Some(12.0));

        state.isometric_time = 10.0;
        assert_eq!(state.overtime(), None);
    }

    #[test]
    fn snapshot_accepts_epoch_millis_and_missing_fields() {
        let json = r#"{
            "status": "PAUSED",
            "phase": "REST_SET",
            "workout": { "id": "w", "name": "W", "exercises": [
                { "id": "e1", "name": "Ex 1", "sets": 2, "reps": 5 }
            ] },
            "exerciseIndex": 0,
            "setNumber": 2,
            "timeLeft": 12.5,
            "phaseDuration": 60,
            "startTime": 1700000000000,
            "weightData": [
                { "exerciseId": "e1", "setNumber": 1, "reps": 5, "weight": 20, "time": 0 }
            ]
        }"#;

        let state: SessionState = serde_json::from_str(json).expect("parse snapshot");
        assert_eq!(state.status, SessionStatus::Paused);
        assert_eq!(state.phase, Phase::RestSet);
        assert_eq!(state.set_number, 2);
        assert_eq!(state.current_side, None);
        assert_eq!(state.next_start_side, Side::Left);
        assert_eq!(
            state.start_time.map(|at| at.timestamp_millis()),
            Some(1_700_000_000_000)
        );
        assert_eq!(state.weight_data[0].side, None);
        assert_eq!(state.weight_data[0].bi_set_id, None);
    }

    #[test]
    fn suggested_weight_prefers_log_over_initial() {
        let mut state = SessionState::new(workout());
        state.initial_weights.insert("e1".to_string(), 30.0);
        assert_eq!(state.suggested_weight("e1"), Some(30.0));

        state.weight_data.push(SetLogEntry {
            exercise_id: "e1".to_string(),
            set_number: 1,
            reps: 5,
            weight: 32.5,
            time: 0.0,
            side: None,
            bi_set_id: None,
        });
        assert_eq!(state.suggested_weight("e1"), Some(32.5));
        assert_eq!(state.suggested_weight("other"), None);
    }
}
