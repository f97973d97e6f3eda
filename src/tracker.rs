//! Goal tracking: missions and titles completed by recorded events.
//!
//! The tracker owns the event log, the progress state and the loaded goals.
//! Every recorded event flows through the same loop: append, aggregate,
//! evaluate the open goals, mark what completed, persist.

use jiff::{Timestamp, tz::TimeZone};

use crate::evaluate::{EvalContext, evaluate};
use crate::event_log::EventLog;
use crate::model::{
    CompletedGoal, ConditionSource, Event, Goal, GoalDefinition, GoalKind, GoalStatus,
    ProgressState,
};
use crate::parse::{canonical_action, parse_condition};
use crate::storage::{self, Catalog, Storage, StorageError};

/// What a single `record` call produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordOutcome {
    /// Goals completed by this event, in catalog order.
    pub completed: Vec<CompletedGoal>,
}

/// Storage failed while recording or refreshing.
///
/// The in-memory log, progress and goal statuses were still updated, so the
/// goals completed by the call travel with the error and are not lost.
#[derive(Debug, thiserror::Error)]
#[error("progress updated in memory but not saved: {source}")]
pub struct RecordError {
    pub completed: Vec<CompletedGoal>,
    pub source: StorageError,
}

/// Tracks missions and titles against an event log.
#[derive(Debug)]
pub struct GoalTracker {
    goals: Vec<Goal>,
    catalog: Catalog,
    log: EventLog,
    state: ProgressState,
    tz: TimeZone,
    storage: Option<Storage>,
}

impl GoalTracker {
    /// Creates an in-memory tracker with a fresh progress state.
    pub fn new(catalog: Catalog, tz: TimeZone) -> Self {
        Self::assemble(catalog, EventLog::new(), ProgressState::default(), tz, None)
    }

    /// Opens a tracker backed by storage, loading the catalog, event log and
    /// progress snapshot. Goals already completed in the snapshot stay completed.
    pub fn open(storage: Storage, tz: TimeZone) -> storage::Result<Self> {
        let catalog = storage.load_catalog()?;
        let log = storage.load_events()?;
        let state = storage.load_progress()?;
        log::info!(
            "opened {} with {} goals and {} events",
            storage.root().display(),
            catalog.len(),
            log.len()
        );
        Ok(Self::assemble(catalog, log, state, tz, Some(storage)))
    }

    fn assemble(
        catalog: Catalog,
        log: EventLog,
        state: ProgressState,
        tz: TimeZone,
        storage: Option<Storage>,
    ) -> Self {
        let goals = catalog
            .iter()
            .map(|(kind, def)| load_goal(kind, def, &state))
            .collect();
        Self {
            goals,
            catalog,
            log,
            state,
            tz,
            storage,
        }
    }

    /// Records an event and returns the goals it completed.
    ///
    /// In-memory state is always updated. If writing to storage fails, the
    /// returned [`RecordError`] carries the goals this event completed.
    pub fn record(&mut self, mut event: Event) -> Result<RecordOutcome, RecordError> {
        event.action_type = canonical_action(&event.action_type);

        let mut failure = None;
        if let Some(storage) = &self.storage
            && let Err(e) = storage.append_event(&event)
        {
            log::error!("failed to append {} event: {e}", event.action_type);
            failure = Some(e);
        }

        self.state.apply(&event, &self.tz);
        let now = event.timestamp;
        self.log.append(event);

        let completed = self.evaluate_open(now, true);
        for goal in &completed {
            log::info!("completed {:?} {} ({})", goal.kind, goal.id, goal.name);
        }

        if let Err(e) = self.save_progress() {
            failure = failure.or(Some(e));
        }

        match failure {
            Some(source) => Err(RecordError { completed, source }),
            None => Ok(RecordOutcome { completed }),
        }
    }

    /// Re-evaluates open goals at `now` without a triggering event.
    ///
    /// Picks up goals whose conditions became true through the log alone,
    /// such as after a catalog change.
    pub fn refresh(&mut self, now: Timestamp) -> Result<Vec<CompletedGoal>, RecordError> {
        let completed = self.evaluate_open(now, false);
        if completed.is_empty() {
            return Ok(completed);
        }
        match self.save_progress() {
            Ok(()) => Ok(completed),
            Err(source) => Err(RecordError { completed, source }),
        }
    }

    /// Adds a goal to the catalog, persisting it when storage is attached.
    ///
    /// Ids must be unique across the whole catalog; a duplicate is ignored
    /// and `false` returned.
    pub fn add_goal(&mut self, kind: GoalKind, def: GoalDefinition) -> Result<bool, StorageError> {
        if self.catalog.contains(&def.id) {
            log::warn!("goal {} already exists", def.id);
            return Ok(false);
        }
        self.goals.push(load_goal(kind, &def, &self.state));
        self.catalog.push(kind, def);
        if let Some(storage) = &self.storage {
            storage.save_catalog(&self.catalog)?;
        }
        Ok(true)
    }

    /// Missions still open for completion.
    pub fn available_missions(&self) -> impl Iterator<Item = &Goal> {
        self.goals
            .iter()
            .filter(|g| g.kind.is_mission() && g.status == GoalStatus::Active)
    }

    /// Titles that have been earned.
    pub fn unlocked_titles(&self) -> impl Iterator<Item = &Goal> {
        self.goals
            .iter()
            .filter(|g| g.kind == GoalKind::Title && g.is_completed())
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn progress(&self) -> &ProgressState {
        &self.state
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn time_zone(&self) -> &TimeZone {
        &self.tz
    }

    fn evaluate_open(&mut self, now: Timestamp, with_trigger: bool) -> Vec<CompletedGoal> {
        let ctx = EvalContext {
            log: &self.log,
            state: &self.state,
            now,
            tz: &self.tz,
            trigger: if with_trigger { self.log.last() } else { None },
        };
        let satisfied: Vec<usize> = self
            .goals
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.is_completed() && evaluate(&g.condition, &ctx))
            .map(|(i, _)| i)
            .collect();

        let mut completed = Vec::with_capacity(satisfied.len());
        for i in satisfied {
            let goal = &mut self.goals[i];
            goal.status = GoalStatus::Completed;
            goal.completion_time = Some(now);
            self.state.completed.insert(goal.id.clone(), now);
            completed.push(CompletedGoal::from(&*goal));
        }
        completed
    }

    fn save_progress(&self) -> Result<(), StorageError> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        storage.save_progress(&self.state).inspect_err(|e| {
            log::error!("failed to save progress: {e}");
        })
    }
}

fn load_goal(kind: GoalKind, def: &GoalDefinition, state: &ProgressState) -> Goal {
    let condition = match &def.condition {
        ConditionSource::Text(text) => parse_condition(text),
        ConditionSource::Parsed(condition) => condition.clone(),
    };
    if condition.is_unknown() {
        log::warn!("goal {} has an unrecognized condition and can never complete", def.id);
    }
    let completion_time = state.completed.get(&def.id).copied();
    let status = if completion_time.is_some() {
        GoalStatus::Completed
    } else {
        Goal::initial_status(kind)
    };
    Goal {
        id: def.id.clone(),
        name: def.name.clone(),
        description: def.description.clone(),
        kind,
        condition,
        reward: def.reward,
        status,
        completion_time,
    }
}
