//! CLI interface for questlog.
//!
//! Each subcommand is non-interactive: arguments in, plain text out.
//!
//! - `questlog record <action> --metric key=value` appends an event and
//!   prints whatever it completed.
//! - `questlog missions|titles|status` read the current state.
//! - `questlog parse <sentence>` shows how a condition sentence is understood.

mod format;

use clap::{Parser, Subcommand};
use jiff::Timestamp;

use crate::config::Config;
use crate::model::{Event, Value};
use crate::parse::parse_condition;
use crate::storage::Storage;
use crate::tracker::GoalTracker;

use format::{format_completed, format_goal, format_status};

/// Questlog: missions and titles earned from logged activity.
#[derive(Debug, Parser)]
#[command(name = "questlog", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow:
  1. Describe goals in missions.json and titles.json under the data directory
  2. questlog parse '1日内の `mine_log` 回数 ≥ 1 かつ `power_usage_W` ≤ 20'
     → check the sentence parses to the condition you meant
  3. questlog record mine_log --metric power_usage_W=15 --metric mode=solo
     → prints each mission or title the event completed
  4. questlog missions / questlog titles / questlog status";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record an event and report the goals it completed.
    Record {
        /// Action type, either the canonical name or a label like `mine_log`.
        action: String,

        /// Metric as `name=value`. Repeatable. Values are read as booleans,
        /// numbers or text.
        #[arg(long = "metric", short, value_parser = parse_metric)]
        metrics: Vec<(String, Value)>,

        /// When the event happened (RFC 3339). Defaults to now.
        #[arg(long)]
        at: Option<Timestamp>,
    },

    /// List missions still open for completion.
    Missions {
        /// Include completed missions.
        #[arg(long)]
        all: bool,
    },

    /// List unlocked titles.
    Titles,

    /// Parse a condition sentence and print it as JSON.
    Parse {
        /// The sentence, e.g. "`cea_run` 実行回数 ≥ 5".
        text: String,
    },

    /// Show lifetime totals, today's counters and streaks.
    Status,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    if let Command::Parse { text } = &cli.command {
        return cmd_parse(text);
    }

    let tz = config.time_zone().map_err(|e| e.to_string())?;
    let mut tracker = GoalTracker::open(storage.clone(), tz)
        .map_err(|e| format!("failed to load {}: {e}", storage.root().display()))?;

    match cli.command {
        Command::Record {
            action,
            metrics,
            at,
        } => cmd_record(&mut tracker, action, metrics, at),
        Command::Missions { all } => {
            cmd_missions(&tracker, all);
            Ok(())
        }
        Command::Titles => {
            cmd_titles(&tracker);
            Ok(())
        }
        Command::Status => {
            cmd_status(&tracker);
            Ok(())
        }
        Command::Parse { .. } => Ok(()),
    }
}

fn parse_metric(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("metric name is empty in {raw:?}"));
    }
    Ok((name.to_string(), Value::coerce(value)))
}

fn cmd_record(
    tracker: &mut GoalTracker,
    action: String,
    metrics: Vec<(String, Value)>,
    at: Option<Timestamp>,
) -> Result<(), String> {
    let mut event = Event::new(at.unwrap_or_else(Timestamp::now), action);
    event.metrics.extend(metrics);

    let (completed, failure) = match tracker.record(event) {
        Ok(outcome) => (outcome.completed, None),
        Err(e) => (e.completed, Some(e.source)),
    };

    if completed.is_empty() && failure.is_none() {
        println!("Recorded");
    }
    for goal in &completed {
        println!("{}", format_completed(goal, tracker.time_zone()));
    }
    match failure {
        Some(e) => Err(format!("event recorded in memory but not saved: {e}")),
        None => Ok(()),
    }
}

fn cmd_missions(tracker: &GoalTracker, all: bool) {
    let missions: Vec<_> = if all {
        tracker.goals().iter().filter(|g| g.kind.is_mission()).collect()
    } else {
        tracker.available_missions().collect()
    };

    if missions.is_empty() {
        println!("No missions");
        return;
    }
    for goal in missions {
        println!("{}", format_goal(goal));
    }
}

fn cmd_titles(tracker: &GoalTracker) {
    let mut titles = tracker.unlocked_titles().peekable();
    if titles.peek().is_none() {
        println!("No titles unlocked");
        return;
    }
    for goal in titles {
        println!("{}", format_goal(goal));
    }
}

fn cmd_parse(text: &str) -> Result<(), String> {
    let condition = parse_condition(text);
    let json = serde_json::to_string_pretty(&condition)
        .map_err(|e| format!("failed to serialize condition: {e}"))?;
    println!("{json}");
    if condition.is_unknown() {
        return Err("sentence matches no condition template".to_string());
    }
    Ok(())
}

fn cmd_status(tracker: &GoalTracker) {
    let today = Timestamp::now().to_zoned(tracker.time_zone().clone()).date();
    for line in format_status(tracker.progress(), today) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_metric_pairs() {
        assert_eq!(
            parse_metric("power_usage_W=15").unwrap(),
            ("power_usage_W".to_string(), Value::Int(15))
        );
        assert_eq!(
            parse_metric("category=moon").unwrap(),
            ("category".to_string(), Value::Str("moon".into()))
        );
        assert_eq!(
            parse_metric("success = true").unwrap(),
            ("success".to_string(), Value::Bool(true))
        );
    }

    #[test]
    fn rejects_malformed_metrics() {
        assert!(parse_metric("power_usage_W").is_err());
        assert!(parse_metric("=3").is_err());
    }

    #[test]
    fn record_accepts_repeated_metrics() {
        let cli = Cli::try_parse_from([
            "questlog",
            "record",
            "mine_log",
            "--metric",
            "power_usage_W=15",
            "-m",
            "mode=solo",
            "--at",
            "2026-04-01T09:00:00Z",
        ])
        .unwrap();

        let Command::Record {
            action,
            metrics,
            at,
        } = cli.command
        else {
            panic!("expected record");
        };
        assert_eq!(action, "mine_log");
        assert_eq!(metrics.len(), 2);
        assert_eq!(at, Some("2026-04-01T09:00:00Z".parse().unwrap()));
    }
}
