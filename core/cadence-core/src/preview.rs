//! Pre-workout advisory inputs derived from history.
//!
//! Nothing here feeds the state machine's transitions: initial weights only
//! pre-fill the log, and advice is shown to the user next to each exercise.

use std::collections::HashMap;

use crate::history::HistoryEntry;
use crate::types::{Exercise, Workout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightAdvice {
    Increase,
    Decrease,
    Maintain,
}

impl WeightAdvice {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightAdvice::Increase => "increase",
            WeightAdvice::Decrease => "decrease",
            WeightAdvice::Maintain => "maintain",
        }
    }
}

/// The last weight used for each exercise, keyed by exercise id.
///
/// Rows are matched by exercise id first, falling back to the exercise name
/// for history written before ids were stored. Exercises never performed are
/// left out.
pub fn initial_weights(workout: &Workout, history: &[HistoryEntry]) -> HashMap<String, f64> {
    workout
        .exercises
        .iter()
        .filter_map(|exercise| {
            history
                .iter()
                .rev()
                .find(|entry| matches_exercise(entry, exercise))
                .map(|entry| (exercise.id.clone(), entry.weight))
        })
        .collect()
}

/// Weight advice for a failure-mode exercise, judged from its most recent
/// set: below the rep range means too heavy, above means too light.
pub fn advise(exercise: &Exercise, history: &[HistoryEntry]) -> Option<WeightAdvice> {
    if !exercise.failure_mode {
        return None;
    }
    let last = history
        .iter()
        .rev()
        .find(|entry| entry.exercise_id.as_deref() == Some(exercise.id.as_str()))?;

    let performed = if exercise.is_isometric {
        last.time
    } else {
        f64::from(last.reps)
    };

    if performed < f64::from(exercise.reps_min()) {
        Some(WeightAdvice::Decrease)
    } else if performed > f64::from(exercise.reps_max()) {
        Some(WeightAdvice::Increase)
    } else {
        Some(WeightAdvice::Maintain)
    }
}

fn matches_exercise(entry: &HistoryEntry, exercise: &Exercise) -> bool {
    entry.exercise_id.as_deref() == Some(exercise.id.as_str()) || entry.exercise_name == exercise.name
}
