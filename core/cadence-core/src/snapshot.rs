//! Crash-recovery snapshot of the live session.
//!
//! The host writes the full [`SessionState`] here whenever something worth
//! keeping changes (phase change, pause, log correction). On the next launch a
//! snapshot in RUNNING or PAUSED status can be resumed; anything else is stale.
//!
//! Loading is lenient about shape (serde defaults fill fields added since the
//! snapshot was written) but strict about syntax: unparseable content is an
//! error the host answers by discarding the file.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::session::SessionState;
use crate::storage::{read_json, remove_if_exists, write_json_atomic};

pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: &Path) -> Self {
        SnapshotStore {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads whatever snapshot is on disk, recoverable or not.
    pub fn load(&self) -> Result<Option<SessionState>> {
        read_json(&self.path)
    }

    /// Reads the snapshot if it can be resumed.
    pub fn load_recoverable(&self) -> Result<Option<SessionState>> {
        Ok(self.load()?.filter(|state| {
            let recoverable = state.status.is_recoverable();
            if !recoverable {
                debug!(status = ?state.status, "Ignoring stale snapshot");
            }
            recoverable
        }))
    }

    pub fn save(&self, state: &SessionState) -> Result<()> {
        write_json_atomic(&self.path, state)?;
        debug!(
            path = %self.path.display(),
            phase = ?state.phase,
            set = state.set_number,
            "Snapshot saved"
        );
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        remove_if_exists(&self.path)?;
        info!(path = %self.path.display(), "Snapshot cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CadenceError;
    use crate::session::Session;
    use crate::types::{Exercise, Phase, SessionStatus, Workout};
    use std::collections::HashMap;

    fn store() -> (tempfile::TempDir, SnapshotStore) {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let store = SnapshotStore::new(&temp_dir.path().join("snapshot.json"));
        (temp_dir, store)
    }

    fn live_session() -> Session {
        let mut session = Session::default();
        session
            .start(
                Workout::new("w", "W", vec![Exercise::new("e", "E", 3, 8)]),
                HashMap::new(),
            )
            .expect("start");
        session.skip();
        session.tick(1.25);
        session
    }

    #[test]
    fn save_then_load_recoverable_round_trips() {
        let (_dir, store) = store();
        let session = live_session();
        store.save(session.state()).expect("save");

        let loaded = store
            .load_recoverable()
            .expect("load")
            .expect("recoverable snapshot");
        assert_eq!(&loaded, session.state());
        assert_eq!(loaded.phase, Phase::Eccentric);
    }

    #[test]
    fn finished_snapshot_is_not_recoverable() {
        let (_dir, store) = store();
        let mut session = live_session();
        session.finish_workout();
        store.save(session.state()).expect("save");

        assert!(store.load().expect("load").is_some());
        assert!(store.load_recoverable().expect("load").is_none());
    }

    #[test]
    fn missing_snapshot_is_none() {
        let (_dir, store) = store();
        assert!(store.load_recoverable().expect("load").is_none());
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let (_dir, store) = store();
        std::fs::write(store.path(), r#"{"status":"RUNNING"}"#).expect("write");
        let err = store.load().expect_err("workout is required");
        assert!(matches!(err, CadenceError::Json { .. }));
    }

    #[test]
    fn clear_removes_file_and_tolerates_repeat() {
        let (_dir, store) = store();
        store.save(live_session().state()).expect("save");
        store.clear().expect("clear");
        assert!(!store.path().exists());
        store.clear().expect("clear again");
    }

    #[test]
    fn recovered_snapshot_keeps_stale_time_left() {
        let (_dir, store) = store();
        let mut session = live_session();
        session.pause();
        store.save(session.state()).expect("save");

        let snapshot = store.load_recoverable().expect("load").expect("snapshot");
        let mut restored = Session::default();
        restored.recover(snapshot).expect("recover");
        assert_eq!(restored.state().status, SessionStatus::Paused);
        assert!((restored.state().time_left - 1.75).abs() < 1e-9);
    }
}
