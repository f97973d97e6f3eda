//! Questlog: missions and titles earned from an append-only activity log.
//!
//! Goals carry conditions written as short Japanese sentences, such as
//! ``1日内の `mine_log` 回数 ≥ 1 かつ `power_usage_W` ≤ 20``. They are parsed
//! once into [`Condition`](model::Condition) trees and re-checked by the
//! [`GoalTracker`] every time an event is recorded.

mod aggregate;
pub mod cli;
pub mod config;
pub mod evaluate;
pub mod event_log;
pub mod model;
pub mod parse;
pub mod storage;
pub mod tracker;

pub use parse::parse_condition;
pub use tracker::{GoalTracker, RecordError, RecordOutcome};
