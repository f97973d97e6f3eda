//! Local persistence for the event log, progress and goal catalog.
//!
//! Everything lives in one data directory:
//!
//! ```text
//! <root>/
//!   events.jsonl     # Append-only event log, one event per line
//!   progress.json    # ProgressState snapshot, replaced atomically
//!   missions.json    # Main and sub mission definitions
//!   titles.json      # Title definitions
//! ```

mod catalog;
mod events;
mod progress;

pub use catalog::Catalog;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt data in {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Local file-based storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.questlog/data/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".questlog").join("data"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// Writes `contents` to `path` without ever exposing a half-written file.
///
/// The data goes to a sibling temp file first, which is then renamed over
/// the target.
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn new_creates_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("data");
        let storage = Storage::new(&root).unwrap();

        assert!(root.is_dir());
        assert_eq!(storage.root(), root);
    }

    #[test]
    fn write_atomic_replaces_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join("progress.json.tmp").exists());
    }
}
