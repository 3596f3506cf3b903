//! User intents typed on stdin during a session.
//!
//! ```text
//! p            pause / resume
//! s            skip the current phase
//! f            end the current set now (failure)
//! w <kg>       weight of the last logged set
//! r <reps>     reps of the last logged set
//! t <secs>     hold time of the last logged set
//! side l|r     side for the next unilateral set
//! ?            print the current status
//! q            finish the workout and save it
//! x            abandon the workout without saving
//! ```

use cadence_core::{parse_numeric_input, Side};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    TogglePause,
    Skip,
    Failure,
    Weight(f64),
    Reps(u32),
    Time(f64),
    StartSide(Side),
    Status,
    Finish,
    Abandon,
}

pub const HELP: &str =
    "p pause/resume | s skip | f failure | w <kg> | r <reps> | t <secs> | side l|r | ? status | q finish | x abandon";

/// Parses one input line. Blank lines are `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Intent>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let argument = words.collect::<Vec<_>>().join(" ");

    let intent = match command.to_ascii_lowercase().as_str() {
        "p" | "pause" | "resume" => Intent::TogglePause,
        "s" | "skip" => Intent::Skip,
        "f" | "fail" | "failure" => Intent::Failure,
        "w" | "weight" => Intent::Weight(number(&argument, "weight")?),
        "r" | "reps" => Intent::Reps(whole(&argument, "reps")?),
        "t" | "time" => Intent::Time(number(&argument, "time")?),
        "side" => Intent::StartSide(
            Side::parse(&argument).ok_or_else(|| format!("unknown side '{argument}'"))?,
        ),
        "?" | "status" => Intent::Status,
        "q" | "quit" | "finish" => Intent::Finish,
        "x" | "abandon" => Intent::Abandon,
        other => return Err(format!("unknown command '{other}' ({HELP})")),
    };
    Ok(Some(intent))
}

fn number(argument: &str, what: &str) -> Result<f64, String> {
    parse_numeric_input(argument)
        .filter(|value| *value >= 0.0)
        .ok_or_else(|| format!("{what} must be a non-negative number, got '{argument}'"))
}

fn whole(argument: &str, what: &str) -> Result<u32, String> {
    let value = number(argument, what)?;
    if value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(format!("{what} must be a whole number, got '{argument}'"));
    }
    Ok(value as u32)
}
