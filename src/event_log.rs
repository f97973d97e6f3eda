//! The event log: an append-only, ordered sequence of events.
//!
//! There is no way to edit or remove an entry. Queries return
//! borrowed events in recording order.

use jiff::{Timestamp, civil::Date, tz::TimeZone};

use crate::model::Event;

/// In-memory event log. Durable backing lives in `storage`.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event to the end of the log.
    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Event> {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Events matching a predicate, in order.
    pub fn filter<'a>(
        &'a self,
        predicate: impl Fn(&Event) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Event> {
        self.events.iter().filter(move |e| predicate(e))
    }

    /// The last `n` events of an action, oldest first.
    pub fn last_n(&self, action: &str, n: usize) -> Vec<&Event> {
        let mut recent: Vec<&Event> = self
            .events
            .iter()
            .rev()
            .filter(|e| e.action_type == action)
            .take(n)
            .collect();
        recent.reverse();
        recent
    }

    /// Events whose calendar date in `tz` is `date`.
    pub fn on_date<'a>(&'a self, date: Date, tz: &'a TimeZone) -> impl Iterator<Item = &'a Event> {
        self.events.iter().filter(move |e| e.date(tz) == date)
    }

    /// Events dated within the `n` calendar days ending on `now`'s date.
    ///
    /// `n = 1` is today only. `n = 0` is empty.
    pub fn since_days_ago<'a>(
        &'a self,
        n: u32,
        now: Timestamp,
        tz: &'a TimeZone,
    ) -> impl Iterator<Item = &'a Event> {
        let today = now.to_zoned(tz.clone()).date();
        let first = window_start(today, n);
        self.events.iter().filter(move |e| {
            let date = e.date(tz);
            first.is_some_and(|first| date >= first && date <= today)
        })
    }
}

/// First day of the `n`-day window ending on `today`. `None` for an empty window.
pub(crate) fn window_start(today: Date, n: u32) -> Option<Date> {
    let back = i64::from(n.checked_sub(1)?);
    let span = jiff::Span::new().try_days(back).ok()?;
    today.checked_sub(span).ok()
}

impl FromIterator<Event> for EventLog {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}
