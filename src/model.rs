//! Core data model for questlog.
//!
//! These types describe what flows through the rule engine:
//! events and their metric values, parsed conditions, goals, and the
//! progress state derived from the event log.

mod condition;
mod event;
mod goal;
mod progress;
mod value;

pub use condition::Condition;
pub use event::Event;
pub use goal::{CompletedGoal, ConditionSource, Goal, GoalDefinition, GoalKind, GoalStatus, Reward};
pub use progress::{DailyTally, ProgressState, Streak};
pub use value::{Op, Value};
