//! Events: one timestamped activity record.

use std::collections::BTreeMap;

use jiff::{Timestamp, civil::Date, tz::TimeZone};
use serde::{Deserialize, Serialize};

use super::value::Value;

/// A single recorded activity, serialized as one line of JSONL.
///
/// Created by whatever recorded the activity (a finished mining session,
/// a plant design, an observation). Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// When the activity happened.
    pub timestamp: Timestamp,

    /// Canonical action type, e.g. `mining` or `advance_day`.
    pub action_type: String,

    /// Metrics reported with the activity.
    #[serde(default)]
    pub metrics: BTreeMap<String, Value>,
}

impl Event {
    pub fn new(timestamp: Timestamp, action_type: impl Into<String>) -> Self {
        Self {
            timestamp,
            action_type: action_type.into(),
            metrics: BTreeMap::new(),
        }
    }

    /// Adds a metric, builder style.
    #[must_use]
    pub fn with_metric(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metrics.insert(name.into(), value.into());
        self
    }

    pub fn metric(&self, name: &str) -> Option<&Value> {
        self.metrics.get(name)
    }

    /// The numeric reading of a metric, if present and numeric.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.metric(name).and_then(Value::as_f64)
    }

    /// The calendar date of this event in the given time zone.
    pub fn date(&self, tz: &TimeZone) -> Date {
        self.timestamp.to_zoned(tz.clone()).date()
    }
}
