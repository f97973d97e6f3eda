//! Condition evaluation against the event log and progress state.
//!
//! Evaluation is a pure function of its inputs: it reads the log, the
//! progress state, the clock reading it is given, and optionally the event
//! that triggered it. It never mutates anything. Goal status changes are the
//! tracker's job.

use std::collections::BTreeMap;

use jiff::{Timestamp, civil::Date, tz::TimeZone};

use crate::event_log::{EventLog, window_start};
use crate::model::{Condition, Event, Op, ProgressState, Value};

/// Metric naming the observed object on astronomy events.
const CATEGORY_METRIC: &str = "category";
const MOON: &str = "moon";

/// Metrics describing how a mining session was run.
const MODE_METRIC: &str = "mode";
const POOL_URL_METRIC: &str = "pool_url";

/// Metric that sub-classifies an action for typed counts.
const TYPE_METRIC: &str = "type";

/// Everything a condition is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub log: &'a EventLog,
    pub state: &'a ProgressState,
    pub now: Timestamp,
    pub tz: &'a TimeZone,

    /// The event just recorded, if evaluation was triggered by one.
    /// Conditions about "this event" are false without it.
    pub trigger: Option<&'a Event>,
}

impl EvalContext<'_> {
    fn today(&self) -> Date {
        self.now.to_zoned(self.tz.clone()).date()
    }

    /// The triggering event, if it is of the given action.
    fn trigger_of(&self, action: &str) -> Option<&Event> {
        self.trigger.filter(|e| e.action_type == action)
    }
}

/// Decides whether a condition holds.
pub fn evaluate(condition: &Condition, ctx: &EvalContext<'_>) -> bool {
    match condition {
        Condition::Simple {
            action,
            metric,
            op,
            value,
        }
        | Condition::Usage {
            action,
            metric,
            op,
            value,
        } => trigger_metric(ctx, action, metric, *op, value),

        Condition::TotalActionCount { action, op, count } => {
            count_holds(ctx.state.total_count(action), *op, *count)
        }

        Condition::TypeActionCount {
            action,
            kind,
            op,
            count,
        } => {
            let n = ctx
                .log
                .filter(|e| {
                    e.action_type == *action
                        && e.metric(TYPE_METRIC).and_then(Value::as_str) == Some(kind.as_str())
                })
                .count();
            count_holds(n as u64, *op, *count)
        }

        Condition::DailyActionCount { action, op, count } => {
            count_holds(ctx.state.daily_count(action, ctx.today()), *op, *count)
        }

        Condition::TotalMetric { metric, op, value } => {
            sum_holds(ctx.state.total_sum(metric), *op, value)
        }

        Condition::DailyTotalMetric { metric, op, value } => {
            sum_holds(ctx.state.daily_sum(metric, ctx.today()), *op, value)
        }

        Condition::DailyCompound {
            action,
            action_op,
            action_count,
            metric,
            metric_op,
            metric_value,
        } => {
            let today = ctx.today();
            count_holds(ctx.state.daily_count(action, today), *action_op, *action_count)
                && sum_holds(ctx.state.daily_sum(metric, today), *metric_op, metric_value)
        }

        Condition::Completion { action, .. } => ctx.state.total_count(action) >= 1,

        Condition::CompoundAnd { conditions } => conditions.iter().all(|c| evaluate(c, ctx)),

        Condition::ConsecutiveDays { action, days } => {
            ctx.state.recorded_streak(action) >= *days
        }

        Condition::ConsecutiveImprovement {
            action,
            metric,
            days,
        } => consecutive_improvement(ctx, action, metric, *days),

        Condition::ConsecutiveMaintenance {
            action,
            metric,
            days,
            threshold,
        } => consecutive_maintenance(ctx, action, metric, *days, *threshold),

        Condition::IncrementalIncrease { metric, days } => {
            incremental_increase(ctx.log, metric, *days)
        }

        Condition::SameDayBoth { actions, op, count } => {
            let today = ctx.today();
            let [a, b] = actions;
            let count_a = ctx.log.on_date(today, ctx.tz).filter(|e| e.action_type == *a).count();
            let count_b = ctx.log.on_date(today, ctx.tz).filter(|e| e.action_type == *b).count();
            count_holds(count_a.min(count_b) as u64, *op, *count)
        }

        Condition::OverPeriod {
            action,
            metric,
            op,
            value,
            days,
        } => over_period(ctx, action.as_deref(), metric, *op, value, *days),

        // No baseline to take the percentage of. Holds when the triggering
        // event is the action and reports the metric at all.
        Condition::Percentage { action, metric, .. } => ctx
            .trigger_of(action)
            .is_some_and(|e| e.metric(metric).is_some()),

        Condition::RangeCheck {
            action,
            metric,
            values,
        } => ctx
            .trigger_of(action)
            .and_then(|e| e.metric(metric))
            .is_some_and(|actual| values.iter().any(|v| Op::Eq.compare(actual, v))),

        Condition::Ratio {
            action,
            metric1,
            metric2,
            op,
            value,
        } => ratio(ctx, action, metric1, metric2, *op, value),

        Condition::Multiplication {
            action,
            metric1,
            op1,
            value1,
            metric2,
            op2,
            value2,
        } => {
            trigger_metric(ctx, action, metric1, *op1, value1)
                && trigger_metric(ctx, action, metric2, *op2, value2)
        }

        Condition::MoonObservation { action } => ctx.trigger_of(action).is_some_and(|e| {
            e.metric(CATEGORY_METRIC)
                .and_then(Value::as_str)
                .is_some_and(|c| c.eq_ignore_ascii_case(MOON))
        }),

        Condition::SoloMode { action } => ctx.trigger_of(action).is_some_and(is_solo),

        Condition::Unknown { .. } => false,
    }
}

/// Compares a metric on the triggering event. False when the trigger is
/// missing, of another action, or lacks the metric.
fn trigger_metric(
    ctx: &EvalContext<'_>,
    action: &str,
    metric: &str,
    op: Op,
    value: &Value,
) -> bool {
    ctx.trigger_of(action)
        .and_then(|e| e.metric(metric))
        .is_some_and(|actual| op.compare(actual, value))
}

fn count_holds(actual: u64, op: Op, expected: i64) -> bool {
    op.holds(actual as f64, expected as f64)
}

/// Compares an accumulated sum. A non-numeric literal never holds.
fn sum_holds(actual: f64, op: Op, expected: &Value) -> bool {
    expected.as_f64().is_some_and(|e| op.holds(actual, e))
}

fn ratio(
    ctx: &EvalContext<'_>,
    action: &str,
    numerator: &str,
    denominator: &str,
    op: Op,
    value: &Value,
) -> bool {
    let Some(e) = ctx.trigger_of(action) else {
        return false;
    };
    let (Some(n), Some(d), Some(expected)) =
        (e.number(numerator), e.number(denominator), value.as_f64())
    else {
        return false;
    };
    if d == 0.0 {
        return false;
    }
    op.holds(n / d, expected)
}

/// A mining session is solo when it says so, or when it names no pool.
fn is_solo(e: &Event) -> bool {
    if let Some(mode) = e.metric(MODE_METRIC).and_then(Value::as_str) {
        return mode.eq_ignore_ascii_case("solo");
    }
    e.metric(POOL_URL_METRIC)
        .and_then(Value::as_str)
        .is_none_or(|url| url.trim().is_empty())
}

/// The last `days` readings of the metric, across all actions, strictly increase.
fn incremental_increase(log: &EventLog, metric: &str, days: u32) -> bool {
    let want = days as usize;
    if want == 0 {
        return false;
    }
    let mut readings: Vec<f64> = log
        .iter()
        .rev()
        .filter_map(|e| e.number(metric))
        .take(want)
        .collect();
    if readings.len() < want {
        return false;
    }
    readings.reverse();
    readings.windows(2).all(|w| w[1] > w[0])
}

/// Every reading of the metric in the window satisfies the comparison, and
/// there is at least one reading.
fn over_period(
    ctx: &EvalContext<'_>,
    action: Option<&str>,
    metric: &str,
    op: Op,
    value: &Value,
    days: u32,
) -> bool {
    let mut readings = ctx
        .log
        .since_days_ago(days, ctx.now, ctx.tz)
        .filter(|e| action.is_none_or(|a| e.action_type == a))
        .filter_map(|e| e.metric(metric))
        .peekable();

    readings.peek().is_some() && readings.all(|actual| op.compare(actual, value))
}

/// Daily best (maximum) reading of the metric for the action, per calendar day.
fn daily_best(ctx: &EvalContext<'_>, action: &str, metric: &str) -> BTreeMap<Date, f64> {
    let mut best = BTreeMap::new();
    for e in ctx.log.filter(|e| e.action_type == action) {
        if let Some(n) = e.number(metric) {
            best.entry(e.date(ctx.tz))
                .and_modify(|b: &mut f64| *b = b.max(n))
                .or_insert(n);
        }
    }
    best
}

/// The `n` calendar days ending today, oldest first.
fn window_days(today: Date, n: u32) -> Vec<Date> {
    let Some(first) = window_start(today, n) else {
        return Vec::new();
    };
    first.series(jiff::Span::new().days(1)).take(n as usize).collect()
}

/// Each of the last `days` days beat the day before it, so `days + 1`
/// consecutive days with readings are required.
fn consecutive_improvement(ctx: &EvalContext<'_>, action: &str, metric: &str, days: u32) -> bool {
    if days == 0 {
        return false;
    }
    let Some(span) = days.checked_add(1) else {
        return false;
    };
    let best = daily_best(ctx, action, metric);
    let window = window_days(ctx.today(), span);
    if window.len() != span as usize {
        return false;
    }
    let Some(values) = window
        .iter()
        .map(|d| best.get(d).copied())
        .collect::<Option<Vec<f64>>>()
    else {
        return false;
    };
    values.windows(2).all(|w| w[1] > w[0])
}

/// Each of the last `days` days has a reading at or above `threshold`
/// times the all-time peak.
fn consecutive_maintenance(
    ctx: &EvalContext<'_>,
    action: &str,
    metric: &str,
    days: u32,
    threshold: f64,
) -> bool {
    if days == 0 {
        return false;
    }
    let best = daily_best(ctx, action, metric);
    let Some(peak) = best.values().copied().reduce(f64::max) else {
        return false;
    };
    let floor = peak * threshold;
    let window = window_days(ctx.today(), days);
    window.len() == days as usize
        && window
            .iter()
            .all(|d| best.get(d).is_some_and(|v| *v >= floor))
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::parse::parse_condition;

    fn at(day: i8, hour: i8) -> Timestamp {
        date(2026, 3, day)
            .at(hour, 0, 0, 0)
            .to_zoned(TimeZone::UTC)
            .unwrap()
            .timestamp()
    }

    /// Log and state built by applying every event in order.
    struct Fixture {
        log: EventLog,
        state: ProgressState,
        tz: TimeZone,
    }

    impl Fixture {
        fn new(events: Vec<Event>) -> Self {
            let tz = TimeZone::UTC;
            let mut log = EventLog::new();
            let mut state = ProgressState::default();
            for e in events {
                state.apply(&e, &tz);
                log.append(e);
            }
            Self { log, state, tz }
        }

        /// Evaluates with the last event as trigger and its timestamp as now.
        fn check(&self, condition: &Condition) -> bool {
            let trigger = self.log.last();
            let now = trigger.map_or_else(|| at(1, 0), |e| e.timestamp);
            self.check_at(condition, now, trigger)
        }

        fn check_at(&self, condition: &Condition, now: Timestamp, trigger: Option<&Event>) -> bool {
            let ctx = EvalContext {
                log: &self.log,
                state: &self.state,
                now,
                tz: &self.tz,
                trigger,
            };
            evaluate(condition, &ctx)
        }
    }

    fn mining(day: i8, hour: i8, watts: i64) -> Event {
        Event::new(at(day, hour), "mining").with_metric("power_usage_W", watts)
    }

    #[test]
    fn simple_checks_only_the_trigger() {
        let c = parse_condition("`design_plant` の `output_kwh` ≥ 1.0");
        let good = Event::new(at(1, 9), "power_plant").with_metric("output_kwh", 2.5);
        let other = Event::new(at(1, 10), "mining").with_metric("power_usage_W", 15);

        assert!(Fixture::new(vec![good.clone()]).check(&c));
        assert!(!Fixture::new(vec![good, other]).check(&c));
    }

    #[test]
    fn simple_missing_metric_is_false() {
        let c = parse_condition("`design_plant` の `output_kwh` ≥ 1.0");
        let f = Fixture::new(vec![Event::new(at(1, 9), "power_plant")]);
        assert!(!f.check(&c));
    }

    #[test]
    fn malformed_literal_never_holds_numerically() {
        let c = parse_condition("`design_plant` の `output_kwh` ≥ 1.2.3");
        let f = Fixture::new(vec![
            Event::new(at(1, 9), "power_plant").with_metric("output_kwh", 9.0),
        ]);
        assert!(!f.check(&c));
    }

    #[test]
    fn total_count_turns_true_on_third_event() {
        let c = parse_condition("`mine_log` 実行回数 ≥ 3");
        let mut events = Vec::new();
        for hour in 9..13 {
            events.push(mining(1, hour, 15));
            let satisfied = Fixture::new(events.clone()).check(&c);
            assert_eq!(satisfied, events.len() >= 3, "after {} events", events.len());
        }
    }

    #[test]
    fn daily_count_reads_zero_on_a_later_day() {
        let c = parse_condition("1日内の `mine_log` 回数 ≥ 1");
        let f = Fixture::new(vec![mining(1, 9, 15)]);

        assert!(f.check(&c));
        assert!(!f.check_at(&c, at(2, 9), None));
    }

    #[test]
    fn daily_compound_needs_both_clauses() {
        let c = parse_condition("1日内の `mine_log` 回数 ≥ 1 かつ `power_usage_W` ≤ 20");
        assert!(Fixture::new(vec![mining(1, 9, 15)]).check(&c));
        assert!(!Fixture::new(vec![mining(1, 9, 15), mining(1, 10, 15)]).check(&c));
    }

    #[test]
    fn total_and_daily_metric_sums() {
        let total = parse_condition("累計 `power_usage_W` ≥ 40");
        let daily = parse_condition("1日内の合計 `power_usage_W` ≥ 40");
        let f = Fixture::new(vec![mining(1, 9, 25), mining(2, 9, 20)]);

        assert!(f.check(&total));
        assert!(!f.check(&daily));
    }

    #[test]
    fn compound_and_requires_every_clause() {
        let c = parse_condition("`mine_log` の `power_usage_W` ≤ 20 かつ `threads` ≥ 4");
        let ok = mining(1, 9, 15).with_metric("threads", 4);
        let few = mining(1, 9, 15).with_metric("threads", 2);

        assert!(Fixture::new(vec![ok]).check(&c));
        assert!(!Fixture::new(vec![few]).check(&c));
    }

    #[test]
    fn consecutive_days_uses_streak() {
        let c = parse_condition("3日連続で `advance_day` を実行");
        let two: Vec<Event> = (1..=2).map(|d| Event::new(at(d, 8), "advance_day")).collect();
        let three: Vec<Event> = (1..=3).map(|d| Event::new(at(d, 8), "advance_day")).collect();

        assert!(!Fixture::new(two).check(&c));
        let done = Fixture::new(three);
        assert!(done.check(&c));
        // A streak that reached the target still counts after the days pass.
        assert!(done.check_at(&c, at(9, 8), None));
    }

    #[test]
    fn huge_day_counts_evaluate_to_false() {
        let improvement = parse_condition("`mine_log` の `hashrate_khps` が4294967295日連続で改善");
        let maintenance = parse_condition("`mine_log` の `hashrate_khps` が4294967295日連続で50%以上維持");
        let f = Fixture::new(vec![
            Event::new(at(1, 9), "mining").with_metric("hashrate_khps", 1.0),
            Event::new(at(2, 9), "mining").with_metric("hashrate_khps", 2.0),
        ]);

        assert!(matches!(improvement, Condition::ConsecutiveImprovement { days: u32::MAX, .. }));
        assert!(!f.check(&improvement));
        assert!(!f.check(&maintenance));
    }

    #[test]
    fn incremental_increase_needs_enough_rising_readings() {
        let c = parse_condition("累計 `mined_amount_XMR` の日次増分が3日連続で増加");
        let reading = |day, amount: f64| {
            Event::new(at(day, 9), "mining").with_metric("mined_amount_XMR", amount)
        };

        assert!(!Fixture::new(vec![reading(1, 0.1), reading(2, 0.2)]).check(&c));
        assert!(Fixture::new(vec![reading(1, 0.1), reading(2, 0.2), reading(3, 0.3)]).check(&c));
        assert!(!Fixture::new(vec![reading(1, 0.1), reading(2, 0.3), reading(3, 0.2)]).check(&c));
    }

    #[test]
    fn improvement_compares_daily_bests() {
        let c = parse_condition("`mine_log` の `hashrate_khps` が2日連続で改善");
        let rate = |day, khps: f64| {
            Event::new(at(day, 9), "mining").with_metric("hashrate_khps", khps)
        };

        assert!(Fixture::new(vec![rate(1, 1.0), rate(2, 1.5), rate(3, 2.0)]).check(&c));
        assert!(!Fixture::new(vec![rate(1, 1.0), rate(2, 2.5), rate(3, 2.0)]).check(&c));
        // A missing day breaks the run.
        assert!(!Fixture::new(vec![rate(1, 1.0), rate(3, 2.0)]).check(&c));
    }

    #[test]
    fn maintenance_holds_half_of_peak() {
        let c = parse_condition("`design_plant` の `output_kwh` が3日連続で50%以上維持");
        let out = |day, kwh: f64| {
            Event::new(at(day, 9), "power_plant").with_metric("output_kwh", kwh)
        };

        assert!(Fixture::new(vec![out(1, 10.0), out(2, 6.0), out(3, 5.0)]).check(&c));
        assert!(!Fixture::new(vec![out(1, 10.0), out(2, 4.0), out(3, 5.0)]).check(&c));
    }

    #[test]
    fn same_day_both_needs_both_actions_today() {
        let c = parse_condition("`mine_log` と `design_plant` を同日に両方実行 ≥ 1");
        let plant = |day| Event::new(at(day, 15), "power_plant");

        assert!(Fixture::new(vec![mining(1, 9, 15), plant(1)]).check(&c));
        assert!(!Fixture::new(vec![mining(1, 9, 15), plant(2)]).check(&c));
    }

    #[test]
    fn over_period_requires_every_reading() {
        let c = parse_condition("`mine_log` の `power_usage_W` ≤ 20 over 3 day");

        let within = Fixture::new(vec![mining(1, 9, 15), mining(2, 9, 18), mining(3, 9, 20)]);
        let over = Fixture::new(vec![mining(1, 9, 25), mining(2, 9, 18), mining(3, 9, 20)]);
        // Readings older than the window do not count against it.
        let aged_out = Fixture::new(vec![mining(1, 9, 99), mining(4, 9, 18), mining(5, 9, 20)]);

        assert!(within.check(&c));
        assert!(!over.check(&c));
        assert!(aged_out.check(&c));
    }

    #[test]
    fn percentage_is_satisfied_by_reporting_the_metric() {
        let c = parse_condition("`design_plant` の `efficiency` ≥ 30%");
        let with = Event::new(at(1, 9), "power_plant").with_metric("efficiency", 0.1);
        let without = Event::new(at(1, 9), "power_plant");

        assert!(Fixture::new(vec![with]).check(&c));
        assert!(!Fixture::new(vec![without]).check(&c));
    }

    #[test]
    fn range_check_matches_listed_values() {
        let c = parse_condition("`advance_day` の `day` in [7,14,21] のいずれかで起動");
        let day = |n: i64| Event::new(at(1, 9), "advance_day").with_metric("day", n);

        assert!(Fixture::new(vec![day(14)]).check(&c));
        assert!(!Fixture::new(vec![day(15)]).check(&c));
    }

    #[test]
    fn ratio_guards_against_zero_denominator() {
        let c = parse_condition("`mine_log` の `power_usage_W` / `hashrate_khps` ≤ 10");
        let e = |khps: f64| mining(1, 9, 15).with_metric("hashrate_khps", khps);

        assert!(Fixture::new(vec![e(2.0)]).check(&c));
        assert!(!Fixture::new(vec![e(1.0)]).check(&c));
        assert!(!Fixture::new(vec![e(0.0)]).check(&c));
    }

    #[test]
    fn multiplication_needs_both_metric_clauses() {
        let c = parse_condition("`design_plant` の `area_m2` ≥ 2 × `efficiency` ≥ 0.2");
        let plant = |area: i64, eff: f64| {
            Event::new(at(1, 9), "power_plant")
                .with_metric("area_m2", area)
                .with_metric("efficiency", eff)
        };

        assert!(Fixture::new(vec![plant(3, 0.25)]).check(&c));
        assert!(!Fixture::new(vec![plant(3, 0.1)]).check(&c));
    }

    #[test]
    fn moon_and_solo_flags() {
        let moon = parse_condition("`observe_optics` で月を含む観測1回完了");
        let solo = parse_condition("`mine_log` を Pool ではなく Solo モードで1回実行");

        let lunar = Event::new(at(1, 21), "astronomy").with_metric("category", "moon");
        let planet = Event::new(at(1, 21), "astronomy").with_metric("category", "planets");
        assert!(Fixture::new(vec![lunar]).check(&moon));
        assert!(!Fixture::new(vec![planet]).check(&moon));

        let pooled = mining(1, 9, 15).with_metric("pool_url", "pool.supportxmr.com:3333");
        let declared = pooled.clone().with_metric("mode", "Solo");
        assert!(!Fixture::new(vec![pooled]).check(&solo));
        assert!(Fixture::new(vec![declared]).check(&solo));
        assert!(Fixture::new(vec![mining(1, 9, 15)]).check(&solo));
    }

    #[test]
    fn typed_count_filters_on_type_metric() {
        let c = parse_condition("`build_module` 実行回数 for type=`engine` ≥ 2");
        let build = |kind: &str| Event::new(at(1, 9), "build").with_metric("type", kind);

        assert!(!Fixture::new(vec![build("engine"), build("hull")]).check(&c));
        assert!(Fixture::new(vec![build("engine"), build("hull"), build("engine")]).check(&c));
    }

    #[test]
    fn completion_holds_once_action_has_fired() {
        let c = parse_condition("`design_plant` で `風力発電設計` を1回完了");
        assert!(!Fixture::new(vec![mining(1, 9, 15)]).check(&c));
        assert!(Fixture::new(vec![Event::new(at(1, 9), "power_plant")]).check(&c));
    }

    #[test]
    fn unknown_is_never_satisfied() {
        let c = parse_condition("宇宙へ行く");
        assert!(!Fixture::new(vec![mining(1, 9, 15)]).check(&c));
    }

    #[test]
    fn evaluation_is_repeatable() {
        let conditions = [
            parse_condition("`mine_log` 実行回数 ≥ 1"),
            parse_condition("1日内の合計 `power_usage_W` ≤ 20"),
            parse_condition("`mine_log` の `power_usage_W` ≤ 20 over 3 day"),
        ];
        let f = Fixture::new(vec![mining(1, 9, 15)]);
        for c in &conditions {
            assert_eq!(f.check(c), f.check(c));
        }
    }
}
