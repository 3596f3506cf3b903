//! Post-workout summary.
//!
//! Groups the finished log by exercise (bi-set partners together), formats the
//! session duration, and compares each set against the most recent earlier
//! session of the same workout.

use chrono::{DateTime, Utc};

use crate::history::HistoryEntry;
use crate::session::SetLogEntry;
use crate::types::{Exercise, Side, Workout};

/// Consecutive exercises performed as one block. Single exercises form a
/// group of one.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseGroup<'a> {
    pub exercises: Vec<&'a Exercise>,
}

impl ExerciseGroup<'_> {
    pub fn is_bi_set(&self) -> bool {
        self.exercises.len() > 1
    }
}

/// Splits the workout into runs of consecutive exercises sharing a bi-set id.
pub fn group_exercises(workout: &Workout) -> Vec<ExerciseGroup<'_>> {
    let mut groups: Vec<ExerciseGroup<'_>> = Vec::new();
    for (index, exercise) in workout.exercises.iter().enumerate() {
        let joins_previous = index > 0 && workout.shares_bi_set(index - 1, index);
        match groups.last_mut() {
            Some(group) if joins_previous => group.exercises.push(exercise),
            _ => groups.push(ExerciseGroup {
                exercises: vec![exercise],
            }),
        }
    }
    groups
}

/// Log entries belonging to `exercise` within its own bi-set context.
pub fn entries_for<'a>(
    exercise: &Exercise,
    log: &'a [SetLogEntry],
) -> impl Iterator<Item = &'a SetLogEntry> {
    let exercise_id = exercise.id.clone();
    let bi_set_id = exercise.bi_set_id.clone();
    log.iter()
        .filter(move |entry| entry.exercise_id == exercise_id && entry.bi_set_id == bi_set_id)
}

/// `HH:MM:SS` between two instants; zero when either is missing or the span
/// is negative.
pub fn format_duration(start: Option<DateTime<Utc>>, finish: Option<DateTime<Utc>>) -> String {
    let secs = match (start, finish) {
        (Some(start), Some(finish)) => (finish - start).num_seconds().max(0),
        _ => 0,
    };
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Change against the matching set of the previous session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub weight_diff: f64,
    /// Reps difference, or whole seconds for isometric sets.
    pub reps_diff: i64,
}

/// Entries of the most recent earlier session of `workout`, matched by id
/// or, for older history, by name.
pub fn previous_session<'a>(workout: &Workout, history: &'a [HistoryEntry]) -> Vec<&'a HistoryEntry> {
    let same_workout = |entry: &&HistoryEntry| {
        entry.workout_id.as_deref() == Some(workout.id.as_str()) || entry.workout_name == workout.name
    };
    let Some(last_date) = history.iter().filter(same_workout).map(|entry| entry.date).max() else {
        return Vec::new();
    };
    history
        .iter()
        .filter(same_workout)
        .filter(|entry| entry.date == last_date)
        .collect()
}

/// Compares one set of the current session with the previous session.
pub fn compare(
    workout: &Workout,
    current: &SetLogEntry,
    previous: &[&HistoryEntry],
) -> Option<Comparison> {
    let current_name = workout
        .find_exercise(&current.exercise_id)
        .map(|exercise| exercise.name.as_str());

    let prev = previous.iter().find(|prev| {
        let same_id = prev.exercise_id.as_deref() == Some(current.exercise_id.as_str());
        let same_name = current_name == Some(prev.exercise_name.as_str());
        prev.set_number == current.set_number && (same_id || same_name) && prev.side == current.side
    })?;

    Some(Comparison {
        weight_diff: current.weight - prev.weight,
        reps_diff: i64::from(performance(current.reps, current.time)) - i64::from(prev.performance()),
    })
}

fn performance(reps: u32, time: f64) -> u32 {
    if time > 0.0 {
        time.floor() as u32
    } else {
        reps
    }
}

/// Short label for a logged set, e.g. `Set 2 (RIGHT)`.
pub fn set_label(set_number: u32, side: Option<Side>) -> String {
    match side {
        Some(side) => format!("Set {set_number} ({})", side.as_str()),
        None => format!("Set {set_number}"),
    }
}
