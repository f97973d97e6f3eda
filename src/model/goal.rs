//! Goals: missions and titles unlocked by conditions.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::condition::Condition;

/// What a goal pays out when completed. Applied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    #[serde(default)]
    pub experience: u64,
    #[serde(default)]
    pub currency: u64,
}

/// Which list a goal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    MainMission,
    SubMission,
    Title,
}

impl GoalKind {
    pub fn is_mission(self) -> bool {
        matches!(self, Self::MainMission | Self::SubMission)
    }
}

/// Where a goal stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// A title that has not been earned yet.
    Locked,

    /// A mission that is open for completion.
    Active,

    /// Done. Never re-evaluated or reverted.
    Completed,
}

/// How a condition is written in a goal definition: as a sentence to parse,
/// or already in structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionSource {
    Text(String),
    Parsed(Condition),
}

/// A goal as declared in `missions.json` or `titles.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub condition: ConditionSource,
    #[serde(default)]
    pub reward: Reward,
}

/// A loaded goal with its parsed condition and current status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: GoalKind,
    pub condition: Condition,
    pub reward: Reward,
    pub status: GoalStatus,
    pub completion_time: Option<Timestamp>,
}

impl Goal {
    /// The status a goal starts with before it is completed.
    pub fn initial_status(kind: GoalKind) -> GoalStatus {
        if kind.is_mission() {
            GoalStatus::Active
        } else {
            GoalStatus::Locked
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == GoalStatus::Completed
    }
}

/// A goal that was completed by a `record` call, handed back for reward dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedGoal {
    pub id: String,
    pub name: String,
    pub kind: GoalKind,
    pub reward: Reward,
    pub completed_at: Timestamp,
}

impl From<&Goal> for CompletedGoal {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id.clone(),
            name: goal.name.clone(),
            kind: goal.kind,
            reward: goal.reward,
            completed_at: goal.completion_time.unwrap_or_else(Timestamp::now),
        }
    }
}
