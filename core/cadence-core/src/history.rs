//! Workout history: the finished set logs of past sessions.
//!
//! History is a flat, append-only list of [`HistoryEntry`] rows, one per
//! logged set, each stamped with the date of the session it came from. All rows
//! written for one finished workout share the same `date`, which is how
//! sessions are told apart when reading the list back.
//!
//! Entries written by older versions may lack ids (matched by name instead),
//! sides, hold times and bi-set ids; every such field has a serde default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::session::SessionState;
use crate::storage::{read_json, remove_if_exists, write_json_atomic};
use crate::types::{opt_id_from_any, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    #[serde(default, deserialize_with = "opt_id_from_any")]
    pub workout_id: Option<String>,
    #[serde(default)]
    pub workout_name: String,
    #[serde(default, deserialize_with = "opt_id_from_any")]
    pub exercise_id: Option<String>,
    #[serde(default)]
    pub exercise_name: String,
    pub set_number: u32,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default, deserialize_with = "opt_id_from_any")]
    pub bi_set_id: Option<String>,
}

impl HistoryEntry {
    /// Reps for regular sets, whole seconds held for isometric ones.
    pub fn performance(&self) -> u32 {
        if self.time > 0.0 {
            self.time.floor() as u32
        } else {
            self.reps
        }
    }
}

/// The history rows of one finished workout.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutReport {
    pub workout_id: String,
    pub workout_name: String,
    pub date: DateTime<Utc>,
    pub duration_secs: i64,
    pub entries: Vec<HistoryEntry>,
}

impl WorkoutReport {
    /// Resolves the set log of `state` into history rows. Exercise ids that no
    /// longer exist in the workout get a placeholder name.
    pub fn from_state(state: &SessionState) -> Self {
        let workout = &state.workout;
        let date = state
            .finish_time
            .or(state.start_time)
            .unwrap_or_else(Utc::now);

        let entries = state
            .weight_data
            .iter()
            .map(|entry| HistoryEntry {
                date,
                workout_id: Some(workout.id.clone()),
                workout_name: workout.name.clone(),
                exercise_id: Some(entry.exercise_id.clone()),
                exercise_name: workout.exercise_name(&entry.exercise_id).to_string(),
                set_number: entry.set_number,
                reps: entry.reps,
                weight: entry.weight,
                time: entry.time,
                side: entry.side,
                bi_set_id: entry.bi_set_id.clone(),
            })
            .collect();

        WorkoutReport {
            workout_id: workout.id.clone(),
            workout_name: workout.name.clone(),
            date,
            duration_secs: state.duration_secs().unwrap_or(0),
            entries,
        }
    }
}

/// Where finished workouts go.
pub trait HistorySink {
    fn append(&mut self, report: &WorkoutReport) -> Result<()>;
}

/// In-memory sink, handy for hosts that persist elsewhere.
impl HistorySink for Vec<HistoryEntry> {
    fn append(&mut self, report: &WorkoutReport) -> Result<()> {
        self.extend(report.entries.iter().cloned());
        Ok(())
    }
}

/// History kept as a JSON array in a single file.
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: &Path) -> Self {
        JsonHistoryStore {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, oldest first. A missing file is an empty history.
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    pub fn clear(&self) -> Result<()> {
        remove_if_exists(&self.path)?;
        info!(path = %self.path.display(), "History cleared");
        Ok(())
    }
}

impl HistorySink for JsonHistoryStore {
    fn append(&mut self, report: &WorkoutReport) -> Result<()> {
        let mut entries = self.load()?;
        entries.extend(report.entries.iter().cloned());
        write_json_atomic(&self.path, &entries)?;
        info!(
            workout = %report.workout_id,
            sets = report.entries.len(),
            duration_secs = report.duration_secs,
            "Workout appended to history"
        );
        Ok(())
    }
}

/// One past session as read back from history.
#[derive(Debug, Clone, PartialEq)]
pub struct PastSession<'a> {
    pub date: DateTime<Utc>,
    pub workout_name: &'a str,
    pub entries: Vec<&'a HistoryEntry>,
}

/// Groups entries by session date and workout, newest session first.
pub fn sessions(entries: &[HistoryEntry]) -> Vec<PastSession<'_>> {
    let mut grouped: BTreeMap<(DateTime<Utc>, &str), Vec<&HistoryEntry>> = BTreeMap::new();
    for entry in entries {
        grouped
            .entry((entry.date, entry.workout_name.as_str()))
            .or_default()
            .push(entry);
    }
    grouped
        .into_iter()
        .rev()
        .map(|((date, workout_name), entries)| PastSession {
            date,
            workout_name,
            entries,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SetLogEntry;
    use crate::types::{Exercise, SessionStatus, Workout};
    use chrono::TimeZone;

    fn finished_state() -> SessionState {
        let mut state = SessionState::new(Workout::new(
            "w1",
            "Push",
            vec![Exercise::new("e1", "Bench", 2, 8)],
        ));
        state.status = SessionStatus::Finished;
        state.start_time = Utc.timestamp_opt(1_700_000_000, 0).single();
        state.finish_time = Utc.timestamp_opt(1_700_000_754, 0).single();
        state.weight_data = vec![
            SetLogEntry {
                exercise_id: "e1".into(),
                set_number: 1,
                reps: 8,
                weight: 60.0,
                time: 0.0,
                side: None,
                bi_set_id: None,
            },
            SetLogEntry {
                exercise_id: "gone".into(),
                set_number: 1,
                reps: 5,
                weight: 10.0,
                time: 0.0,
                side: Some(Side::Left),
                bi_set_id: Some("b".into()),
            },
        ];
        state
    }

    #[test]
    fn report_resolves_names_and_duration() {
        let report = WorkoutReport::from_state(&finished_state());
        assert_eq!(report.duration_secs, 754);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].exercise_name, "Bench");
        assert_eq!(report.entries[1].exercise_name, "Unknown");
        assert_eq!(report.entries[1].side, Some(Side::Left));
        assert_eq!(report.entries[1].bi_set_id.as_deref(), Some("b"));
        assert!(report.entries.iter().all(|e| e.date == report.date));
        assert_eq!(report.date, finished_state().finish_time.expect("finish time"));
    }

    #[test]
    fn negative_duration_clamps_to_zero() {
        let mut state = finished_state();
        std::mem::swap(&mut state.start_time, &mut state.finish_time);
        assert_eq!(WorkoutReport::from_state(&state).duration_secs, 0);
    }

    #[test]
    fn json_store_appends_across_sessions() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let mut store = JsonHistoryStore::new(&temp_dir.path().join("history.json"));
        assert!(store.load().expect("load").is_empty());

        let report = WorkoutReport::from_state(&finished_state());
        store.append(&report).expect("append");
        store.append(&report).expect("append again");

        let entries = store.load().expect("load");
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0], report.entries[0]);

        store.clear().expect("clear");
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn vec_sink_collects_entries() {
        let mut sink: Vec<HistoryEntry> = Vec::new();
        HistorySink::append(&mut sink, &WorkoutReport::from_state(&finished_state()))
            .expect("append");
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn legacy_entries_parse_with_defaults() {
        let raw = r#"[{
            "date": "2024-03-01T10:00:00.000Z",
            "workoutName": "Legs",
            "exerciseName": "Squat",
            "setNumber": 1,
            "reps": 6,
            "weight": 100
        }, {
            "date": "2024-03-01T10:00:00.000Z",
            "workoutId": 1709280000000,
            "workoutName": "Legs",
            "exerciseId": 1709280000001,
            "exerciseName": "Plank",
            "setNumber": 1,
            "time": 42.7,
            "biSetId": null
        }]"#;
        let entries: Vec<HistoryEntry> = serde_json::from_str(raw).expect("parse");
        assert_eq!(entries[0].exercise_id, None);
        assert_eq!(entries[0].time, 0.0);
        assert_eq!(entries[0].performance(), 6);
        assert_eq!(entries[1].workout_id.as_deref(), Some("1709280000000"));
        assert_eq!(entries[1].performance(), 42);
    }

    #[test]
    fn sessions_group_newest_first() {
        let older = WorkoutReport::from_state(&finished_state());
        let mut later_state = finished_state();
        later_state.finish_time = Utc.timestamp_opt(1_700_100_000, 0).single();
        let newer = WorkoutReport::from_state(&later_state);

        let mut entries = older.entries.clone();
        entries.extend(newer.entries.clone());

        let grouped = sessions(&entries);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].date, newer.date);
        assert_eq!(grouped[0].entries.len(), 2);
        assert_eq!(grouped[1].workout_name, "Push");
    }
}
