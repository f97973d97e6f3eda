//! Aggregation: keeping `ProgressState` in step with the event log.
//!
//! Day-scoped counters are reset lazily. Nothing runs at midnight; the first
//! event dated on a later day zeroes them before it is counted, and reads
//! for a later day see zero until that happens.

use jiff::{civil::Date, tz::TimeZone};

use crate::model::{DailyTally, Event, ProgressState, Streak};

impl ProgressState {
    /// Folds one recorded event into the counters, sums and streaks.
    pub fn apply(&mut self, event: &Event, tz: &TimeZone) {
        let date = event.date(tz);
        self.roll_day(date);

        let action = event.action_type.as_str();
        *self.total_action_counts.entry(action.to_string()).or_default() += 1;
        *self.daily.action_counts.entry(action.to_string()).or_default() += 1;

        for (name, value) in &event.metrics {
            if let Some(n) = value.as_f64() {
                *self.daily.metric_sums.entry(name.clone()).or_default() += n;
                *self.total_metric_sums.entry(name.clone()).or_default() += n;
            }
        }

        self.extend_streak(action, date);
    }

    /// Zeroes the daily tally if `date` is a later day than the one it holds.
    ///
    /// An event dated before the tally's day does not move it backwards.
    fn roll_day(&mut self, date: Date) {
        match self.daily.date {
            Some(current) if current >= date => {}
            Some(current) => {
                log::debug!("day changed from {current} to {date}, resetting daily tally");
                self.daily = DailyTally {
                    date: Some(date),
                    ..DailyTally::default()
                };
            }
            None => self.daily.date = Some(date),
        }
    }

    fn extend_streak(&mut self, action: &str, date: Date) {
        let days = match self.streaks.get(action) {
            Some(streak) if streak.last_date == date => streak.days,
            Some(streak) if streak.last_date.tomorrow().ok() == Some(date) => streak.days + 1,
            _ => 1,
        };
        self.streaks.insert(
            action.to_string(),
            Streak {
                days,
                last_date: date,
            },
        );
    }

    // ── Reads ──

    pub fn total_count(&self, action: &str) -> u64 {
        self.total_action_counts.get(action).copied().unwrap_or(0)
    }

    pub fn total_sum(&self, metric: &str) -> f64 {
        self.total_metric_sums.get(metric).copied().unwrap_or(0.0)
    }

    /// Today's count for an action. Zero if the tally belongs to another day.
    pub fn daily_count(&self, action: &str, today: Date) -> u64 {
        if self.daily.date != Some(today) {
            return 0;
        }
        self.daily.action_counts.get(action).copied().unwrap_or(0)
    }

    /// Today's sum for a metric. Zero if the tally belongs to another day.
    pub fn daily_sum(&self, metric: &str, today: Date) -> f64 {
        if self.daily.date != Some(today) {
            return 0.0;
        }
        self.daily.metric_sums.get(metric).copied().unwrap_or(0.0)
    }

    /// Length of the action's streak as of `today`.
    ///
    /// A streak whose last day is before yesterday is broken and reads as 0.
    pub fn streak_days(&self, action: &str, today: Date) -> u32 {
        let Some(streak) = self.streaks.get(action) else {
            return 0;
        };
        let alive = streak.last_date == today || streak.last_date.tomorrow().ok() == Some(today);
        if alive { streak.days } else { 0 }
    }

    /// Length of the action's run as of its last event, whether or not it
    /// is still going.
    pub fn recorded_streak(&self, action: &str) -> u32 {
        self.streaks.get(action).map_or(0, |s| s.days)
    }
}
