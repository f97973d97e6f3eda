//! Progress state: counters, sums and streaks derived from the event log.

use std::collections::BTreeMap;

use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};

/// Everything the tracker remembers between runs besides the event log.
///
/// One value per tracker, passed by reference to whatever needs it and
/// saved as `progress.json` after each mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressState {
    /// Completed goal ids and when each was completed.
    pub completed: BTreeMap<String, Timestamp>,

    /// Lifetime event counts per action type.
    pub total_action_counts: BTreeMap<String, u64>,

    /// Lifetime sums per numeric metric.
    pub total_metric_sums: BTreeMap<String, f64>,

    /// Counts and sums scoped to a single calendar day.
    pub daily: DailyTally,

    /// Consecutive-day streaks per action type.
    pub streaks: BTreeMap<String, Streak>,
}

/// Day-scoped counters. Zeroed the first time a later day is observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DailyTally {
    /// The day these counters belong to. `None` before the first event.
    pub date: Option<Date>,
    pub action_counts: BTreeMap<String, u64>,
    pub metric_sums: BTreeMap<String, f64>,
}

/// A run of consecutive calendar days on which an action was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub days: u32,
    pub last_date: Date,
}

impl ProgressState {
    pub fn is_completed(&self, goal_id: &str) -> bool {
        self.completed.contains_key(goal_id)
    }
}
