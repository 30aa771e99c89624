//! Maintenance-mode marker — the application-state collaborator.
//!
//! While a rotation runs, a `maintenance` marker file sits next to the
//! store.  Anything that serves secrets is expected to check
//! `is_maintenance` and refuse reads/writes while it exists.  The
//! marker survives a crash, so a half-finished rotation leaves the
//! application visibly locked down until an operator intervenes.

use std::fs;
use std::path::PathBuf;

use super::ApplicationState;
use crate::errors::Result;

/// File-backed maintenance switch.
pub struct FileAppState {
    marker: PathBuf,
}

impl FileAppState {
    /// `marker` is the path of the marker file, conventionally
    /// `<store_dir>/<name>.maintenance`.
    pub fn new(marker: PathBuf) -> Self {
        Self { marker }
    }

    /// Returns the marker path (for display in `status`).
    pub fn marker_path(&self) -> &PathBuf {
        &self.marker
    }
}

impl ApplicationState for FileAppState {
    fn enter_maintenance(&mut self) -> Result<()> {
        fs::write(&self.marker, b"rotation in progress\n")?;
        Ok(())
    }

    fn exit_maintenance(&mut self) -> Result<()> {
        // Idempotent: exiting when not in maintenance is a no-op.
        match fs::remove_file(&self.marker) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn is_maintenance(&self) -> bool {
        self.marker.exists()
    }
}
