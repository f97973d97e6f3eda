//! Condition: the typed predicate tree parsed from a condition sentence.

use serde::{Deserialize, Serialize};

use super::value::{Op, Value};

/// A parsed unlock condition.
///
/// Built once when a goal catalog is loaded and never changed afterwards.
/// Action fields hold canonical action types (see `parse::canonical_action`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// A metric on the triggering event compares against a literal.
    Simple {
        action: String,
        metric: String,
        op: Op,
        value: Value,
    },

    /// Lifetime number of times an action was recorded.
    TotalActionCount { action: String, op: Op, count: i64 },

    /// Lifetime number of events of an action whose `type` metric matches.
    TypeActionCount {
        action: String,
        kind: String,
        op: Op,
        count: i64,
    },

    /// Number of times an action was recorded today.
    DailyActionCount { action: String, op: Op, count: i64 },

    /// Lifetime sum of a metric across all events.
    TotalMetric { metric: String, op: Op, value: Value },

    /// Today's sum of a metric across all events.
    DailyTotalMetric { metric: String, op: Op, value: Value },

    /// Today's action count and today's metric sum must both hold.
    DailyCompound {
        action: String,
        action_op: Op,
        action_count: i64,
        metric: String,
        metric_op: Op,
        metric_value: Value,
    },

    /// The action has been performed with the free-text condition in mind.
    Completion { action: String, condition: String },

    /// A metric used on the triggering event compares against a literal.
    Usage {
        action: String,
        metric: String,
        op: Op,
        value: Value,
    },

    /// Every sub-condition holds.
    CompoundAnd { conditions: Vec<Condition> },

    /// The action was recorded on `days` consecutive calendar days.
    ConsecutiveDays { action: String, days: u32 },

    /// The daily best of a metric improved on each of the last `days` days.
    ConsecutiveImprovement {
        action: String,
        metric: String,
        days: u32,
    },

    /// The daily best of a metric stayed at or above `threshold` of its peak
    /// for the last `days` days.
    ConsecutiveMaintenance {
        action: String,
        metric: String,
        days: u32,
        threshold: f64,
    },

    /// The last `days` readings of a metric strictly increase.
    IncrementalIncrease { metric: String, days: u32 },

    /// Both actions were recorded today.
    SameDayBoth {
        actions: [String; 2],
        op: Op,
        count: i64,
    },

    /// Every reading of a metric within the last `days` days compares true.
    OverPeriod {
        action: Option<String>,
        metric: String,
        op: Op,
        value: Value,
        days: u32,
    },

    /// A metric expressed as a percentage.
    Percentage {
        action: String,
        metric: String,
        op: Op,
        percentage: f64,
    },

    /// A metric on the triggering event equals one of the listed values.
    RangeCheck {
        action: String,
        metric: String,
        values: Vec<Value>,
    },

    /// The quotient of two metrics on the triggering event compares true.
    Ratio {
        action: String,
        metric1: String,
        metric2: String,
        op: Op,
        value: Value,
    },

    /// Two metric clauses on the triggering event both hold.
    Multiplication {
        action: String,
        metric1: String,
        op1: Op,
        value1: Value,
        metric2: String,
        op2: Op,
        value2: Value,
    },

    /// An observation that included the moon.
    MoonObservation { action: String },

    /// A mining session run solo rather than through a pool.
    SoloMode { action: String },

    /// The sentence matched no template. Never satisfied.
    Unknown { text: String },
}

impl Condition {
    /// Short tag naming the variant, as it appears in serialized form.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Simple { .. } => "simple",
            Self::TotalActionCount { .. } => "total_action_count",
            Self::TypeActionCount { .. } => "type_action_count",
            Self::DailyActionCount { .. } => "daily_action_count",
            Self::TotalMetric { .. } => "total_metric",
            Self::DailyTotalMetric { .. } => "daily_total_metric",
            Self::DailyCompound { .. } => "daily_compound",
            Self::Completion { .. } => "completion",
            Self::Usage { .. } => "usage",
            Self::CompoundAnd { .. } => "compound_and",
            Self::ConsecutiveDays { .. } => "consecutive_days",
            Self::ConsecutiveImprovement { .. } => "consecutive_improvement",
            Self::ConsecutiveMaintenance { .. } => "consecutive_maintenance",
            Self::IncrementalIncrease { .. } => "incremental_increase",
            Self::SameDayBoth { .. } => "same_day_both",
            Self::OverPeriod { .. } => "over_period",
            Self::Percentage { .. } => "percentage",
            Self::RangeCheck { .. } => "range_check",
            Self::Ratio { .. } => "ratio",
            Self::Multiplication { .. } => "multiplication",
            Self::MoonObservation { .. } => "moon_observation",
            Self::SoloMode { .. } => "solo_mode",
            Self::Unknown { .. } => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }
}
