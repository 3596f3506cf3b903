//! Best-effort "keep the machine awake" while a session runs.
//!
//! Holds an OS inhibitor process for as long as the guard lives. Failing to
//! acquire one is never fatal; callers log and carry on.

use std::process::{Child, Command, Stdio};

use cadence_core::{CadenceError, Result};

pub struct KeepAwake {
    child: Child,
}

impl KeepAwake {
    pub fn acquire() -> Result<Self> {
        let child = inhibitor_command()?
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CadenceError::Io {
                context: "spawn keep-awake inhibitor".to_string(),
                source,
            })?;
        tracing::debug!(pid = child.id(), "Keep-awake inhibitor started");
        Ok(KeepAwake { child })
    }
}

impl Drop for KeepAwake {
    fn drop(&mut self) {
        if let Err(err) = self.child.kill() {
            tracing::debug!(error = %err, "Keep-awake inhibitor already gone");
        }
        let _ = self.child.wait();
    }
}

#[cfg(target_os = "macos")]
fn inhibitor_command() -> Result<Command> {
    let mut command = Command::new("caffeinate");
    command.args(["-i", "-w", &std::process::id().to_string()]);
    Ok(command)
}

#[cfg(target_os = "linux")]
fn inhibitor_command() -> Result<Command> {
    let mut command = Command::new("systemd-inhibit");
    command.args([
        "--what=idle:sleep",
        "--who=cadence",
        "--why=Workout in progress",
        "sleep",
        "infinity",
    ]);
    Ok(command)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn inhibitor_command() -> Result<Command> {
    Err(CadenceError::Unsupported("keep-awake".to_string()))
}
