//! Progress storage: load and atomically save the progress snapshot.

use std::{fs, io};

use crate::model::ProgressState;

use super::{Result, Storage, write_atomic};

const PROGRESS_FILE: &str = "progress.json";

impl Storage {
    /// Loads the progress snapshot. A missing file is a fresh, zeroed state.
    pub fn load_progress(&self) -> Result<ProgressState> {
        match fs::read_to_string(self.path(PROGRESS_FILE)) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ProgressState::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Saves the progress snapshot, replacing the previous one atomically.
    pub fn save_progress(&self, progress: &ProgressState) -> Result<()> {
        let json = serde_json::to_string_pretty(progress)?;
        write_atomic(&self.path(PROGRESS_FILE), json.as_bytes())?;
        Ok(())
    }
}
