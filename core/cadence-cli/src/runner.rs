//! Interactive session runner.
//!
//! ```text
//! stdin thread ── Intent ──► mpsc ──► main loop ──► Session
//!                                        ▲
//!                      recv_timeout ─────┘ (ClockDriver tick)
//! ```
//!
//! The main loop is the only code that touches the [`Session`]. After every
//! change it diffs the old and new state to print cues, persist the snapshot
//! and pre-fill weights.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use cadence_core::cues::{self, Cue};
use cadence_core::history::{HistorySink, JsonHistoryStore};
use cadence_core::preview::initial_weights;
use cadence_core::{
    CadenceError, CatalogStore, ClockDriver, Result, Session, SessionState, SetData, Settings,
    SnapshotStore, StorageConfig,
};

use crate::awake::KeepAwake;
use crate::display;
use crate::intent::{self, Intent};

/// What to do with a recoverable snapshot found at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeChoice {
    Resume,
    Discard,
}

enum Input {
    Line(std::result::Result<Option<Intent>, String>),
    Closed,
}

pub fn run(
    storage: &StorageConfig,
    settings: &Settings,
    workout_id: Option<&str>,
    choice: Option<ResumeChoice>,
) -> Result<()> {
    let snapshots = SnapshotStore::new(&storage.snapshot_file());
    let mut history_store = JsonHistoryStore::new(&storage.history_file());
    let history = history_store.load()?;

    let mut session = Session::default();
    let resumed = match recoverable_snapshot(&snapshots) {
        Some(snapshot) => {
            let choice = match choice {
                Some(choice) => choice,
                None => ask_resume(&snapshot)?,
            };
            match choice {
                ResumeChoice::Resume => {
                    session.recover(snapshot)?;
                    true
                }
                ResumeChoice::Discard => {
                    snapshots.clear()?;
                    false
                }
            }
        }
        None => false,
    };

    if !resumed {
        let workout_id = workout_id.ok_or(CadenceError::NoWorkoutSelected)?;
        let workout = CatalogStore::new(&storage.workouts_file()).find(workout_id)?;
        let weights = initial_weights(&workout, &history);
        session.start(workout, weights)?;
    }

    let _keep_awake = if settings.keep_awake {
        match KeepAwake::acquire() {
            Ok(guard) => Some(guard),
            Err(err) => {
                tracing::warn!(error = %err, "Keep-awake unavailable, continuing without it");
                None
            }
        }
    } else {
        None
    };

    println!("{}", intent::HELP);
    println!("{}", display::status_line(session.state()));
    snapshots.save(session.state())?;

    let inputs = spawn_stdin_reader();
    let abandoned = drive(&mut session, settings, &snapshots, &inputs)?;

    if abandoned {
        snapshots.clear()?;
        println!("Workout abandoned.");
        return Ok(());
    }

    let report = session.report()?;
    print!("{}", display::summary(session.state(), &history));
    history_store.append(&report)?;
    snapshots.clear()?;
    Ok(())
}

/// Runs until the session finishes. Returns `true` when the user abandoned it.
fn drive(
    session: &mut Session,
    settings: &Settings,
    snapshots: &SnapshotStore,
    inputs: &Receiver<Input>,
) -> Result<bool> {
    let mut clock = ClockDriver::new(settings.tick_interval());
    let mut input_open = true;

    while !session.state().is_finished() {
        let before = session.state().clone();

        if input_open {
            match inputs.recv_timeout(clock.interval()) {
                Ok(Input::Line(Ok(Some(Intent::Abandon)))) => return Ok(true),
                Ok(Input::Line(Ok(Some(intent)))) => apply(session, intent),
                Ok(Input::Line(Ok(None))) => {}
                Ok(Input::Line(Err(message))) => println!("{message}"),
                Ok(Input::Closed) | Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("Input closed, timer keeps running");
                    input_open = false;
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
        } else {
            thread::sleep(clock.interval());
        }

        clock.drive(session, Instant::now());
        prefill_weight(session, &before);
        report_changes(&before, session.state(), settings, snapshots)?;
    }
    Ok(false)
}

fn apply(session: &mut Session, intent: Intent) {
    match intent {
        Intent::TogglePause => session.toggle_pause(),
        Intent::Skip => session.skip(),
        Intent::Failure => session.register_failure(),
        Intent::Weight(weight) => correct_last(session, |data| data.weight(weight)),
        Intent::Reps(reps) => correct_last(session, |data| data.reps(reps)),
        Intent::Time(secs) => correct_last(session, |data| data.time(secs)),
        Intent::StartSide(side) => session.set_start_side(side),
        Intent::Status => println!("{}", display::status_line(session.state())),
        Intent::Finish => session.finish_workout(),
        Intent::Abandon => {}
    }
}

/// Corrections always target the set that was logged last.
fn correct_last(session: &mut Session, edit: impl FnOnce(SetData) -> SetData) {
    let Some(entry) = session.state().last_entry() else {
        println!("No set logged yet.");
        return;
    };
    let data = edit(SetData::for_entry(entry));
    session.log_set_data(data);
}

/// The first set of an exercise has no earlier weight in this session; take
/// the suggestion the session held before the set was logged.
fn prefill_weight(session: &mut Session, before: &SessionState) {
    let state = session.state();
    if state.weight_data.len() <= before.weight_data.len() {
        return;
    }
    let Some(entry) = state.last_entry() else {
        return;
    };
    let Some(weight) = before
        .suggested_weight(&entry.exercise_id)
        .filter(|weight| *weight != entry.weight)
    else {
        return;
    };
    let data = SetData::for_entry(entry).weight(weight);
    session.log_set_data(data);
}

fn report_changes(
    before: &SessionState,
    after: &SessionState,
    settings: &Settings,
    snapshots: &SnapshotStore,
) -> Result<()> {
    if settings.cues {
        for cue in cues::detect(before, after) {
            match cue {
                Cue::Countdown(_) => print!("\x07"),
                cue => println!("» {}", cue.phrase()),
            }
        }
    }

    let phase_changed = before.phase != after.phase;
    let status_changed = before.status != after.status;
    let log_changed = before.weight_data != after.weight_data;
    let second_changed = before.time_left.ceil() != after.time_left.ceil();

    if phase_changed || status_changed {
        println!("{}", display::status_line(after));
    } else if second_changed {
        print!(
            "\r{} {}   ",
            display::status_line(after),
            display::progress_bar(after.progress())
        );
    }
    let _ = io::stdout().flush();

    // At most once per countdown second.
    if after.is_active() && (phase_changed || status_changed || log_changed || second_changed) {
        snapshots.save(after)?;
    }
    Ok(())
}

fn recoverable_snapshot(snapshots: &SnapshotStore) -> Option<SessionState> {
    match snapshots.load_recoverable() {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(error = %err, "Discarding unreadable snapshot");
            if let Err(err) = snapshots.clear() {
                tracing::warn!(error = %err, "Failed to remove unreadable snapshot");
            }
            None
        }
    }
}

fn ask_resume(snapshot: &SessionState) -> Result<ResumeChoice> {
    print!(
        "Unfinished workout \"{}\" found ({}). Resume? [Y/n] ",
        snapshot.workout.name,
        display::status_line(snapshot)
    );
    io::stdout()
        .flush()
        .map_err(|source| CadenceError::Io {
            context: "flush stdout".to_string(),
            source,
        })?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|source| CadenceError::Io {
            context: "read resume answer".to_string(),
            source,
        })?;
    Ok(parse_resume_answer(&answer))
}

fn parse_resume_answer(answer: &str) -> ResumeChoice {
    match answer.trim().to_ascii_lowercase().as_str() {
        "n" | "no" | "d" | "discard" => ResumeChoice::Discard,
        _ => ResumeChoice::Resume,
    }
}

fn spawn_stdin_reader() -> Receiver<Input> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(Input::Line(intent::parse(&line))).is_err() {
                return;
            }
        }
        let _ = tx.send(Input::Closed);
    });
    rx
}
