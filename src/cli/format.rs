//! Output formatting for CLI display.

use jiff::{civil::Date, tz::TimeZone};

use crate::model::{CompletedGoal, Goal, GoalKind, GoalStatus, ProgressState, Reward};

fn kind_label(kind: GoalKind) -> &'static str {
    match kind {
        GoalKind::MainMission => "main",
        GoalKind::SubMission => "sub",
        GoalKind::Title => "title",
    }
}

fn format_reward(reward: Reward) -> String {
    match (reward.experience, reward.currency) {
        (0, 0) => String::new(),
        (xp, 0) => format!("+{xp} xp"),
        (0, coins) => format!("+{coins} coins"),
        (xp, coins) => format!("+{xp} xp, +{coins} coins"),
    }
}

/// One line per goal: `[kind] [status] name (id)  reward`.
pub(super) fn format_goal(goal: &Goal) -> String {
    let status = match goal.status {
        GoalStatus::Locked => "locked",
        GoalStatus::Active => "active",
        GoalStatus::Completed => "done",
    };
    let line = format!(
        "[{}] [{status}] {} ({})",
        kind_label(goal.kind),
        goal.name,
        goal.id
    );
    let reward = format_reward(goal.reward);
    if reward.is_empty() {
        line
    } else {
        format!("{line}  {reward}")
    }
}

pub(super) fn format_completed(goal: &CompletedGoal, tz: &TimeZone) -> String {
    let verb = if goal.kind.is_mission() {
        "Completed"
    } else {
        "Unlocked"
    };
    let when = goal
        .completed_at
        .to_zoned(tz.clone())
        .strftime("%Y-%m-%d %H:%M")
        .to_string();
    let reward = format_reward(goal.reward);
    if reward.is_empty() {
        format!("{verb} {} at {when}", goal.name)
    } else {
        format!("{verb} {} at {when}  {reward}", goal.name)
    }
}

/// Lines for `questlog status`: totals, today's counters, then live streaks.
pub(super) fn format_status(state: &ProgressState, today: Date) -> Vec<String> {
    let mut lines = vec![format!("Completed goals: {}", state.completed.len())];

    if !state.total_action_counts.is_empty() {
        lines.push("Totals:".to_string());
        for (action, count) in &state.total_action_counts {
            lines.push(format!("  {action}: {count}"));
        }
    }

    let today_counts: Vec<_> = state
        .daily
        .action_counts
        .keys()
        .map(|action| (action, state.daily_count(action, today)))
        .filter(|(_, n)| *n > 0)
        .collect();
    if !today_counts.is_empty() {
        lines.push(format!("Today ({today}):"));
        for (action, count) in today_counts {
            lines.push(format!("  {action}: {count}"));
        }
    }

    let streaks: Vec<_> = state
        .streaks
        .keys()
        .map(|action| (action, state.streak_days(action, today)))
        .filter(|(_, days)| *days > 0)
        .collect();
    if !streaks.is_empty() {
        lines.push("Streaks:".to_string());
        for (action, days) in streaks {
            let unit = if days == 1 { "day" } else { "days" };
            lines.push(format!("  {action}: {days} {unit}"));
        }
    }

    lines
}
