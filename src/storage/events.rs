//! Event log storage: append and load events.

use std::{fs, io};

// Traits must be in scope for `.lines()` on BufReader and `.write_all()` on File.
use io::{BufRead, Write};

use crate::{event_log::EventLog, model::Event};

use super::{Result, Storage, StorageError};

const EVENTS_FILE: &str = "events.jsonl";

impl Storage {
    /// Appends an event to `events.jsonl`.
    pub fn append_event(&self, event: &Event) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(EVENTS_FILE))?;
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Loads the full event log. A missing file is an empty log.
    pub fn load_events(&self) -> Result<EventLog> {
        let path = self.path(EVENTS_FILE);
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(EventLog::new()),
            Err(e) => return Err(e.into()),
        };
        let reader = io::BufReader::new(file);
        let mut log = EventLog::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&line).map_err(|e| StorageError::Corrupt {
                path: path.clone(),
                reason: format!("line {}: {e}", n + 1),
            })?;
            log.append(event);
        }
        Ok(log)
    }
}
