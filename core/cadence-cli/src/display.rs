//! Plain-text rendering of sessions, summaries, catalog and history.

use std::fmt::Write as _;

use cadence_core::history::{sessions, HistoryEntry};
use cadence_core::preview::advise;
use cadence_core::summary::{
    compare, entries_for, format_duration, group_exercises, previous_session, set_label,
};
use cadence_core::{Phase, SessionState, SessionStatus, Workout};

pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "",
        Phase::Prep => "GET READY",
        Phase::Eccentric => "ECCENTRIC (down)",
        Phase::BottomHold | Phase::TopHold | Phase::IsometricWork => "HOLD",
        Phase::Concentric => "CONCENTRIC (up)",
        Phase::RestSet => "REST",
        Phase::RestExercise => "NEXT EXERCISE",
        Phase::Finished => "DONE",
    }
}

/// One-line view of the live session.
pub fn status_line(state: &SessionState) -> String {
    let mut line = String::new();
    let Some(exercise) = state.upcoming_exercise().or_else(|| state.current_exercise()) else {
        return phase_label(state.phase).to_string();
    };

    let _ = write!(
        line,
        "{} | set {}/{} | {}",
        exercise.name,
        state.set_number.min(exercise.sets),
        exercise.sets,
        phase_label(state.phase)
    );

    match state.overtime() {
        Some(over) => {
            let _ = write!(line, " +{}s", over.floor());
        }
        None => {
            let _ = write!(line, " {}s", state.time_left.max(0.0).ceil());
        }
    }

    if state.phase.is_cadence_step() {
        let _ = write!(line, " | rep {}/{}", state.rep_number + 1, exercise.reps);
    }
    if state.phase == Phase::IsometricWork {
        let _ = write!(line, " | held {:.0}s/{}s", state.isometric_time, exercise.reps);
    }
    if let Some(side) = state.current_side {
        let _ = write!(line, " | {}", side.as_str());
    }
    if state.phase.is_rest() {
        if let Some(entry) = state.last_entry() {
            let _ = write!(
                line,
                " | last: {} reps @ {}kg",
                entry.reps,
                entry.weight
            );
        }
    }
    if state.status == SessionStatus::Paused {
        line.push_str(" | PAUSED");
    }
    line
}

const PROGRESS_WIDTH: usize = 10;

/// Fixed-width bar for the elapsed share of the current phase.
pub fn progress_bar(progress: f64) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * PROGRESS_WIDTH as f64).round() as usize)
        .min(PROGRESS_WIDTH);
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    )
}

pub fn workouts(catalog: &[Workout], history: &[HistoryEntry]) -> String {
    if catalog.is_empty() {
        return "No workouts saved.\n".to_string();
    }
    let mut out = String::new();
    for workout in catalog {
        let _ = writeln!(out, "{}  {} ({} exercises)", workout.id, workout.name, workout.exercises.len());
        for group in group_exercises(workout) {
            let marker = if group.is_bi_set() { "  ┃ " } else { "    " };
            for exercise in group.exercises {
                let _ = write!(
                    out,
                    "{marker}{} {}x{}",
                    exercise.name, exercise.sets, exercise.reps
                );
                if let Some(advice) = advise(exercise, history) {
                    let _ = write!(out, " [{}]", advice.as_str());
                }
                out.push('\n');
            }
        }
    }
    out
}

pub fn history(entries: &[HistoryEntry]) -> String {
    let grouped = sessions(entries);
    if grouped.is_empty() {
        return "No workouts recorded.\n".to_string();
    }
    let mut out = String::new();
    for session in grouped {
        let _ = writeln!(
            out,
            "{} - {}",
            session.date.format("%Y-%m-%d %H:%M"),
            session.workout_name
        );
        for entry in session.entries {
            let _ = write!(
                out,
                "    {} {}: {}kg",
                entry.exercise_name,
                set_label(entry.set_number, entry.side),
                entry.weight
            );
            if entry.time > 0.0 {
                let _ = writeln!(out, " {:.0}s", entry.time);
            } else {
                let _ = writeln!(out, " x{}", entry.reps);
            }
        }
    }
    out
}

/// Post-workout summary, compared against the previous run of the workout.
pub fn summary(state: &SessionState, history: &[HistoryEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Workout \"{}\" finished in {}",
        state.workout.name,
        format_duration(state.start_time, state.finish_time)
    );

    let previous = previous_session(&state.workout, history);
    for group in group_exercises(&state.workout) {
        if group.is_bi_set() {
            out.push_str("BI-SET\n");
        }
        for exercise in group.exercises {
            let mut entries = entries_for(exercise, &state.weight_data).peekable();
            if entries.peek().is_none() {
                continue;
            }
            let _ = writeln!(out, "  {}", exercise.name);
            for entry in entries {
                let _ = write!(out, "    {}: {}kg", set_label(entry.set_number, entry.side), entry.weight);
                if entry.time > 0.0 {
                    let _ = write!(out, " {:.0}s", entry.time);
                } else {
                    let _ = write!(out, " x{}", entry.reps);
                }
                if let Some(diff) = compare(&state.workout, entry, &previous) {
                    let _ = write!(out, " ({} kg, {} reps)", signed(diff.weight_diff), signed(diff.reps_diff as f64));
                }
                out.push('\n');
            }
        }
    }
    out
}

fn signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{value}")
    } else {
        format!("{value}")
    }
}
