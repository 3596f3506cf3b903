//! Workout definition and the enums shared by the sequencer and the session.
//!
//! Field names serialize in camelCase so catalogs and snapshots written by
//! earlier versions keep loading. Every field introduced after the first
//! release carries a serde default.

use serde::{Deserialize, Deserializer, Serialize};

/// Prep countdown used when an exercise does not configure one.
pub const DEFAULT_PREP_TIME: f64 = 5.0;

/// Side-switch pause used when a unilateral exercise does not configure one.
pub const DEFAULT_UNILATERAL_TRANSITION: f64 = 5.0;

// ═══════════════════════════════════════════════════════════════════════════════
// Enums
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Side::Left),
            "right" | "r" => Some(Side::Right),
            _ => None,
        }
    }
}

/// The timed phase the session is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Idle,
    Prep,
    Eccentric,
    BottomHold,
    Concentric,
    TopHold,
    IsometricWork,
    RestSet,
    RestExercise,
    Finished,
}

impl Phase {
    pub fn is_rest(&self) -> bool {
        matches!(self, Phase::RestSet | Phase::RestExercise)
    }

    /// One of the four timed steps of a repetition.
    pub fn is_cadence_step(&self) -> bool {
        matches!(
            self,
            Phase::Eccentric | Phase::BottomHold | Phase::Concentric | Phase::TopHold
        )
    }

    pub fn is_work(&self) -> bool {
        self.is_cadence_step() || *self == Phase::IsometricWork
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::Prep => "PREP",
            Phase::Eccentric => "ECCENTRIC",
            Phase::BottomHold => "BOTTOM_HOLD",
            Phase::Concentric => "CONCENTRIC",
            Phase::TopHold => "TOP_HOLD",
            Phase::IsometricWork => "ISOMETRIC_WORK",
            Phase::RestSet => "REST_SET",
            Phase::RestExercise => "REST_EXERCISE",
            Phase::Finished => "FINISHED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

impl SessionStatus {
    /// Whether a snapshot in this status can be resumed after a crash.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionStatus::Running | SessionStatus::Paused)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Workout Definition
// ═══════════════════════════════════════════════════════════════════════════════

/// Seconds spent in each step of one repetition. A zero step is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cadence {
    #[serde(default)]
    pub eccentric: f64,
    #[serde(default)]
    pub eccentric_pause: f64,
    #[serde(default)]
    pub concentric: f64,
    #[serde(default)]
    pub concentric_pause: f64,
}

impl Cadence {
    pub fn new(eccentric: f64, eccentric_pause: f64, concentric: f64, concentric_pause: f64) -> Self {
        Cadence {
            eccentric,
            eccentric_pause,
            concentric,
            concentric_pause,
        }
    }

    /// Duration of a cadence step; zero for any non-step phase.
    pub fn duration(&self, phase: Phase) -> f64 {
        let seconds = match phase {
            Phase::Eccentric => self.eccentric,
            Phase::BottomHold => self.eccentric_pause,
            Phase::Concentric => self.concentric,
            Phase::TopHold => self.concentric_pause,
            _ => 0.0,
        };
        if seconds.is_finite() && seconds > 0.0 {
            seconds
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    pub name: String,
    pub sets: u32,
    /// Target reps, or target seconds when `is_isometric`.
    pub reps: u32,
    #[serde(default)]
    pub reps_min: Option<u32>,
    #[serde(default)]
    pub reps_max: Option<u32>,
    #[serde(default)]
    pub failure_mode: bool,
    #[serde(default)]
    pub is_isometric: bool,
    #[serde(default)]
    pub is_unilateral: bool,
    #[serde(default)]
    pub start_side: Side,
    #[serde(default = "default_unilateral_transition")]
    pub unilateral_transition: f64,
    #[serde(default)]
    pub start_concentric: bool,
    #[serde(default)]
    pub cadence: Cadence,
    #[serde(default)]
    pub rest_set: f64,
    #[serde(default)]
    pub rest_exercise: f64,
    #[serde(default = "default_prep_time")]
    pub prep_time: f64,
    #[serde(default, deserialize_with = "opt_id_from_any")]
    pub bi_set_id: Option<String>,
}

impl Exercise {
    /// A bilateral, non-isometric exercise with a 3-1-1-0 tempo.
    pub fn new(id: impl Into<String>, name: impl Into<String>, sets: u32, reps: u32) -> Self {
        Exercise {
            id: id.into(),
            name: name.into(),
            sets,
            reps,
            reps_min: None,
            reps_max: None,
            failure_mode: false,
            is_isometric: false,
            is_unilateral: false,
            start_side: Side::Left,
            unilateral_transition: DEFAULT_UNILATERAL_TRANSITION,
            start_concentric: false,
            cadence: Cadence::new(3.0, 1.0, 1.0, 0.0),
            rest_set: 60.0,
            rest_exercise: 90.0,
            prep_time: DEFAULT_PREP_TIME,
            bi_set_id: None,
        }
    }

    pub fn reps_min(&self) -> u32 {
        self.reps_min.unwrap_or(self.reps)
    }

    pub fn reps_max(&self) -> u32 {
        self.reps_max.unwrap_or(self.reps)
    }

    /// Prep countdown; a zero or invalid `prep_time` falls back to the default.
    pub fn prep_seconds(&self) -> f64 {
        match non_negative(self.prep_time) {
            seconds if seconds > 0.0 => seconds,
            _ => DEFAULT_PREP_TIME,
        }
    }

    pub fn transition_seconds(&self) -> f64 {
        non_negative(self.unilateral_transition)
    }

    /// The four steps of one repetition in execution order.
    pub fn cycle(&self) -> [Phase; 4] {
        if self.start_concentric {
            [
                Phase::Concentric,
                Phase::TopHold,
                Phase::Eccentric,
                Phase::BottomHold,
            ]
        } else {
            [
                Phase::Eccentric,
                Phase::BottomHold,
                Phase::Concentric,
                Phase::TopHold,
            ]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Workout {
    pub fn new(id: impl Into<String>, name: impl Into<String>, exercises: Vec<Exercise>) -> Self {
        Workout {
            id: id.into(),
            name: name.into(),
            exercises,
        }
    }

    pub fn exercise(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }

    pub fn find_exercise(&self, exercise_id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|exercise| exercise.id == exercise_id)
    }

    /// Display name for an exercise id, with a placeholder for stale ids.
    pub fn exercise_name(&self, exercise_id: &str) -> &str {
        self.find_exercise(exercise_id)
            .map(|exercise| exercise.name.as_str())
            .unwrap_or(UNKNOWN_EXERCISE)
    }

    /// True when the exercises at `a` and `b` belong to the same bi-set.
    pub fn shares_bi_set(&self, a: usize, b: usize) -> bool {
        match (self.exercise(a), self.exercise(b)) {
            (Some(first), Some(second)) => match (&first.bi_set_id, &second.bi_set_id) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
            _ => false,
        }
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.exercises.len()
    }
}

pub const UNKNOWN_EXERCISE: &str = "Unknown";

fn default_prep_time() -> f64 {
    DEFAULT_PREP_TIME
}

fn default_unilateral_transition() -> f64 {
    DEFAULT_UNILATERAL_TRANSITION
}

fn non_negative(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

// Older catalogs stored ids as numbers (creation timestamps).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> String {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

pub(crate) fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub(crate) fn opt_id_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}
