//! Set log accumulator.
//!
//! `weight_data` is the single record of performed work. Entries are appended
//! when a set finishes and may be corrected in place afterwards; they are never
//! removed during a session. The key of an entry is
//! `(exercise_id, set_number, side)`, with `side = None` as its own value.

use serde::{Deserialize, Serialize};

use crate::session::state::SessionState;
use crate::types::{opt_id_from_any, id_from_any, Exercise, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLogEntry {
    #[serde(deserialize_with = "id_from_any")]
    pub exercise_id: String,
    pub set_number: u32,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub weight: f64,
    /// Seconds held, for isometric exercises.
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default, deserialize_with = "opt_id_from_any")]
    pub bi_set_id: Option<String>,
}

impl SetLogEntry {
    fn matches(&self, exercise_id: &str, set_number: u32, side: Option<Side>) -> bool {
        self.exercise_id == exercise_id && self.set_number == set_number && self.side == side
    }
}

/// A correction from the presentation layer. `None` fields keep the value
/// already stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SetData {
    pub exercise_id: String,
    pub set_number: u32,
    pub reps: Option<u32>,
    pub weight: Option<f64>,
    pub time: Option<f64>,
    pub side: Option<Side>,
}

impl SetData {
    pub fn new(exercise_id: impl Into<String>, set_number: u32) -> Self {
        SetData {
            exercise_id: exercise_id.into(),
            set_number,
            reps: None,
            weight: None,
            time: None,
            side: None,
        }
    }

    /// Targets the same key as an existing entry.
    pub fn for_entry(entry: &SetLogEntry) -> Self {
        SetData {
            side: entry.side,
            ..SetData::new(entry.exercise_id.clone(), entry.set_number)
        }
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn reps(mut self, reps: u32) -> Self {
        self.reps = Some(reps);
        self
    }

    pub fn time(mut self, time: f64) -> Self {
        self.time = Some(time);
        self
    }

    pub fn side(mut self, side: Option<Side>) -> Self {
        self.side = side;
        self
    }
}

/// Parses user-typed numeric input. Empty, non-numeric, and non-finite text
/// yields `None` so callers fall back to the stored value.
pub fn parse_numeric_input(input: &str) -> Option<f64> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Weight of the most recent entry for `exercise_id`.
pub fn latest_weight(entries: &[SetLogEntry], exercise_id: &str) -> Option<f64> {
    entries
        .iter()
        .rev()
        .find(|entry| entry.exercise_id == exercise_id)
        .map(|entry| entry.weight)
}

/// Appends the entry for the set that just ended on `exercise`.
pub(crate) fn record_finished_set(state: &mut SessionState, exercise: &Exercise) {
    let weight = latest_weight(&state.weight_data, &exercise.id).unwrap_or(0.0);
    let (reps, time) = if exercise.is_isometric {
        (0, state.isometric_time.max(0.0))
    } else {
        (state.actual_reps, 0.0)
    };

    let entry = SetLogEntry {
        exercise_id: exercise.id.clone(),
        set_number: state.set_number,
        reps,
        weight,
        time,
        side: if exercise.is_unilateral {
            state.current_side
        } else {
            None
        },
        bi_set_id: exercise.bi_set_id.clone(),
    };

    tracing::info!(
        exercise = %entry.exercise_id,
        set = entry.set_number,
        reps = entry.reps,
        time = entry.time,
        side = ?entry.side,
        "Set recorded"
    );
    state.weight_data.push(entry);
}

/// Updates the newest entry with the same key, or appends a new one.
pub(crate) fn upsert(state: &mut SessionState, data: SetData) {
    let weight = data.weight.filter(|value| value.is_finite());
    let time = data.time.filter(|value| value.is_finite() && *value >= 0.0);

    let existing = state
        .weight_data
        .iter_mut()
        .rev()
        .find(|entry| entry.matches(&data.exercise_id, data.set_number, data.side));

    if let Some(entry) = existing {
        if let Some(reps) = data.reps {
            entry.reps = reps;
        }
        if let Some(weight) = weight {
            entry.weight = weight;
        }
        if let Some(time) = time {
            entry.time = time;
        }
        tracing::debug!(
            exercise = %entry.exercise_id,
            set = entry.set_number,
            weight = entry.weight,
            reps = entry.reps,
            "Set entry updated"
        );
        return;
    }

    let bi_set_id = state
        .workout
        .find_exercise(&data.exercise_id)
        .and_then(|exercise| exercise.bi_set_id.clone());
    tracing::debug!(
        exercise = %data.exercise_id,
        set = data.set_number,
        "Set entry appended from correction"
    );
    state.weight_data.push(SetLogEntry {
        exercise_id: data.exercise_id,
        set_number: data.set_number,
        reps: data.reps.unwrap_or(0),
        weight: weight.unwrap_or(0.0),
        time: time.unwrap_or(0.0),
        side: data.side,
        bi_set_id,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Workout;

    fn state() -> SessionState {
        let mut a = Exercise::new("a", "A", 3, 8);
        a.bi_set_id = Some("g1".to_string());
        let b = Exercise::new("b", "B", 3, 8);
        SessionState::new(Workout::new("w", "W", vec![a, b]))
    }

    fn entry(exercise_id: &str, set_number: u32, weight: f64, side: Option<Side>) -> SetLogEntry {
        SetLogEntry {
            exercise_id: exercise_id.to_string(),
            set_number,
            reps: 8,
            weight,
            time: 0.0,
            side,
            bi_set_id: None,
        }
    }

    #[test]
    fn parse_numeric_input_rejects_garbage() {
        assert_eq!(parse_numeric_input("12.5"), Some(12.5));
        assert_eq!(parse_numeric_input(" 20,5 "), Some(20.5));
        assert_eq!(parse_numeric_input(""), None);
        assert_eq!(parse_numeric_input("abc"), None);
        assert_eq!(parse_numeric_input("NaN"), None);
        assert_eq!(parse_numeric_input("inf"), None);
    }

    #[test]
    fn upsert_twice_keeps_single_entry_with_last_weight() {
        let mut state = state();
        upsert(&mut state, SetData::new("b", 1).weight(20.0).reps(8));
        upsert(&mut state, SetData::new("b", 1).weight(22.5));

        assert_eq!(state.weight_data.len(), 1);
        assert_eq!(state.weight_data[0].weight, 22.5);
        assert_eq!(state.weight_data[0].reps, 8);
    }

    #[test]
    fn upsert_nan_weight_keeps_previous_value() {
        let mut state = state();
        state.weight_data.push(entry("b", 1, 40.0, None));

        upsert(&mut state, SetData::new("b", 1).weight(f64::NAN).reps(6));

        assert_eq!(state.weight_data[0].weight, 40.0);
        assert_eq!(state.weight_data[0].reps, 6);
    }

    #[test]
    fn upsert_distinguishes_sides() {
        let mut state = state();
        state.weight_data.push(entry("b", 1, 10.0, Some(Side::Left)));
        state.weight_data.push(entry("b", 1, 10.0, Some(Side::Right)));

        upsert(
            &mut state,
            SetData::new("b", 1).side(Some(Side::Left)).weight(12.0),
        );

        assert_eq!(state.weight_data[0].weight, 12.0);
        assert_eq!(state.weight_data[1].weight, 10.0);

        upsert(&mut state, SetData::new("b", 1).weight(14.0));
        assert_eq!(state.weight_data.len(), 3);
        assert_eq!(state.weight_data[2].side, None);
    }

    #[test]
    fn upsert_updates_most_recent_duplicate() {
        let mut state = state();
        state.weight_data.push(entry("b", 1, 10.0, None));
        state.weight_data.push(entry("b", 1, 10.0, None));

        upsert(&mut state, SetData::new("b", 1).weight(15.0));

        assert_eq!(state.weight_data[0].weight, 10.0);
        assert_eq!(state.weight_data[1].weight, 15.0);
    }

    #[test]
    fn appended_entry_looks_up_bi_set_id() {
        let mut state = state();
        upsert(&mut state, SetData::new("a", 2).weight(5.0));
        upsert(&mut state, SetData::new("stale-id", 1).weight(5.0));

        assert_eq!(state.weight_data[0].bi_set_id.as_deref(), Some("g1"));
        assert_eq!(state.weight_data[1].bi_set_id, None);
        assert_eq!(state.weight_data[1].time, 0.0);
    }

    #[test]
    fn finished_set_inherits_latest_weight() {
        let mut state = state();
        state.weight_data.push(entry("b", 1, 27.5, None));
        state.set_number = 2;
        state.actual_reps = 7;
        let exercise = state.workout.exercises[1].clone();

        record_finished_set(&mut state, &exercise);

        let last = state.weight_data.last().expect("entry");
        assert_eq!(last.set_number, 2);
        assert_eq!(last.reps, 7);
        assert_eq!(last.weight, 27.5);
    }

    #[test]
    fn finished_isometric_set_records_time() {
        let mut plank = Exercise::new("p", "Plank", 1, 30);
        plank.is_isometric = true;
        let mut state = SessionState::new(Workout::new("w", "W", vec![plank.clone()]));
        state.isometric_time = 31.2;

        record_finished_set(&mut state, &plank);

        let last = state.weight_data.last().expect("entry");
        assert_eq!(last.reps, 0);
        assert!((last.time - 31.2).abs() < 1e-9);
        assert_eq!(last.weight, 0.0);
    }
}
