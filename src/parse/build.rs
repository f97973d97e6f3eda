//! Turning a template match into a `Condition`.

use crate::model::{Condition, Op, Value};

use super::alias::canonical_action;
use super::template::{TemplateId, TemplateMatch};

/// Fraction of the peak a metric must hold for the maintenance template.
const MAINTENANCE_THRESHOLD: f64 = 0.5;

/// Builds the condition for a matched template.
///
/// Captures that cannot be read where the template needs an operator or a
/// whole number turn the whole sentence into `Unknown`.
pub fn build(m: &TemplateMatch, raw: &str) -> Condition {
    try_build(m).unwrap_or_else(|| {
        log::warn!("condition template {:?} matched with unusable captures: {raw}", m.id);
        Condition::Unknown {
            text: raw.to_string(),
        }
    })
}

fn try_build(m: &TemplateMatch) -> Option<Condition> {
    let c = Captures(&m.captures);

    let condition = match m.id {
        TemplateId::TypedCount => Condition::TypeActionCount {
            action: c.action(0)?,
            kind: c.text(1)?,
            op: c.op(2)?,
            count: c.int(3)?,
        },
        TemplateId::DailyCompound => Condition::DailyCompound {
            action: c.action(0)?,
            action_op: c.op(1)?,
            action_count: c.int(2)?,
            metric: c.text(3)?,
            metric_op: c.op(4)?,
            metric_value: c.value(5)?,
        },
        TemplateId::DailyCount | TemplateId::DailyRunCount => Condition::DailyActionCount {
            action: c.action(0)?,
            op: c.op(1)?,
            count: c.int(2)?,
        },
        TemplateId::DailyTotal | TemplateId::DailyMetricTotal => Condition::DailyTotalMetric {
            metric: c.text(0)?,
            op: c.op(1)?,
            value: c.value(2)?,
        },
        TemplateId::CumulativeCount | TemplateId::Count => Condition::TotalActionCount {
            action: c.action(0)?,
            op: c.op(1)?,
            count: c.int(2)?,
        },
        TemplateId::IncrementalIncrease => Condition::IncrementalIncrease {
            metric: c.text(0)?,
            days: c.days(1)?,
        },
        TemplateId::CumulativeOverPeriod => Condition::OverPeriod {
            action: None,
            metric: c.text(0)?,
            op: c.op(1)?,
            value: c.value(2)?,
            days: c.days(3)?,
        },
        TemplateId::CumulativeMetric => Condition::TotalMetric {
            metric: c.text(0)?,
            op: c.op(1)?,
            value: c.value(2)?,
        },
        TemplateId::Streak => Condition::ConsecutiveDays {
            days: c.days(0)?,
            action: c.action(1)?,
        },
        TemplateId::Improvement => Condition::ConsecutiveImprovement {
            action: c.action(0)?,
            metric: c.text(1)?,
            days: c.days(2)?,
        },
        TemplateId::Maintenance => Condition::ConsecutiveMaintenance {
            action: c.action(0)?,
            metric: c.text(1)?,
            days: c.days(2)?,
            threshold: MAINTENANCE_THRESHOLD,
        },
        TemplateId::SameDay => Condition::SameDayBoth {
            actions: [c.action(0)?, c.action(1)?],
            op: c.op(2)?,
            count: c.int(3)?,
        },
        TemplateId::MoonObservation => Condition::MoonObservation {
            action: c.action(0)?,
        },
        TemplateId::SoloMode => Condition::SoloMode {
            action: c.action(0)?,
        },
        TemplateId::Usage => Condition::Usage {
            action: c.action(0)?,
            metric: c.text(1)?,
            op: c.op(2)?,
            value: c.value(3)?,
        },
        TemplateId::MetricCompletion | TemplateId::Simple => Condition::Simple {
            action: c.action(0)?,
            metric: c.text(1)?,
            op: c.op(2)?,
            value: c.value(3)?,
        },
        TemplateId::Completion => Condition::Completion {
            action: c.action(0)?,
            condition: c.text(1)?,
        },
        TemplateId::AtCompound | TemplateId::AndCompound | TemplateId::KatsuCompound => {
            let action = c.action(0)?;
            Condition::CompoundAnd {
                conditions: vec![
                    Condition::Simple {
                        action: action.clone(),
                        metric: c.text(1)?,
                        op: c.op(2)?,
                        value: c.value(3)?,
                    },
                    Condition::Simple {
                        action,
                        metric: c.text(4)?,
                        op: c.op(5)?,
                        value: c.value(6)?,
                    },
                ],
            }
        }
        TemplateId::Multiplication => Condition::Multiplication {
            action: c.action(0)?,
            metric1: c.text(1)?,
            op1: c.op(2)?,
            value1: c.value(3)?,
            metric2: c.text(4)?,
            op2: c.op(5)?,
            value2: c.value(6)?,
        },
        TemplateId::OverPeriod => Condition::OverPeriod {
            action: Some(c.action(0)?),
            metric: c.text(1)?,
            op: c.op(2)?,
            value: c.value(3)?,
            days: c.days(4)?,
        },
        TemplateId::Percentage => Condition::Percentage {
            action: c.action(0)?,
            metric: c.text(1)?,
            op: c.op(2)?,
            percentage: c.get(3)?.trim().parse().ok()?,
        },
        TemplateId::Range => Condition::RangeCheck {
            action: c.action(0)?,
            metric: c.text(1)?,
            values: c.list(2)?,
        },
        TemplateId::Ratio => Condition::Ratio {
            action: c.action(0)?,
            metric1: c.text(1)?,
            metric2: c.text(2)?,
            op: c.op(3)?,
            value: c.value(4)?,
        },
    };

    Some(condition)
}

/// Typed access to capture groups by position.
struct Captures<'a>(&'a [String]);

impl Captures<'_> {
    fn get(&self, i: usize) -> Option<&str> {
        self.0.get(i).map(String::as_str)
    }

    fn text(&self, i: usize) -> Option<String> {
        self.get(i).map(str::to_string)
    }

    fn action(&self, i: usize) -> Option<String> {
        self.get(i).map(canonical_action)
    }

    fn op(&self, i: usize) -> Option<Op> {
        self.get(i).and_then(Op::parse)
    }

    fn value(&self, i: usize) -> Option<Value> {
        self.get(i).map(Value::coerce)
    }

    fn int(&self, i: usize) -> Option<i64> {
        self.get(i)?.trim().parse().ok()
    }

    fn days(&self, i: usize) -> Option<u32> {
        self.get(i)?.trim().parse().ok()
    }

    /// A comma-separated list of numbers. Empty or non-numeric members reject the list.
    fn list(&self, i: usize) -> Option<Vec<Value>> {
        self.get(i)?
            .split(',')
            .map(|member| {
                let value = Value::coerce(member);
                value.as_f64().map(|_| value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captures(id: TemplateId, caps: &[&str]) -> TemplateMatch {
        TemplateMatch {
            id,
            captures: caps.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn count_applies_action_alias() {
        let m = captures(TemplateId::Count, &["mine_log", "≥", "3"]);
        assert_eq!(
            build(&m, "raw"),
            Condition::TotalActionCount {
                action: "mining".into(),
                op: Op::Ge,
                count: 3,
            }
        );
    }

    #[test]
    fn maintenance_carries_half_threshold() {
        let m = captures(TemplateId::Maintenance, &["design_plant", "output_kwh", "3"]);
        let Condition::ConsecutiveMaintenance {
            threshold, days, ..
        } = build(&m, "raw")
        else {
            panic!("expected maintenance");
        };
        assert!((threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(days, 3);
    }

    #[test]
    fn compound_shares_action_across_clauses() {
        let m = captures(
            TemplateId::AtCompound,
            &["mine_log", "power_usage_W", "≤", "20", "hashrate_khps", "≥", "1.5"],
        );
        let Condition::CompoundAnd { conditions } = build(&m, "raw") else {
            panic!("expected compound");
        };
        assert_eq!(conditions.len(), 2);
        for c in &conditions {
            assert!(matches!(c, Condition::Simple { action, .. } if action == "mining"));
        }
    }

    #[test]
    fn unknown_operator_yields_unknown() {
        let m = captures(TemplateId::Count, &["mine_log", "=", "3"]);
        assert_eq!(
            build(&m, "raw text"),
            Condition::Unknown {
                text: "raw text".into()
            }
        );
    }

    #[test]
    fn malformed_value_is_kept_as_string() {
        let m = captures(TemplateId::Simple, &["design_plant", "output_kwh", "≥", "1.2.3"]);
        let Condition::Simple { value, .. } = build(&m, "raw") else {
            panic!("expected simple");
        };
        assert_eq!(value, Value::Str("1.2.3".into()));
    }

    #[test]
    fn range_reads_numbers_and_rejects_words() {
        let m = captures(TemplateId::Range, &["advance_day", "day", "7, 14,21"]);
        let Condition::RangeCheck { values, .. } = build(&m, "raw") else {
            panic!("expected range");
        };
        assert_eq!(values, vec![Value::Int(7), Value::Int(14), Value::Int(21)]);

        let m = captures(TemplateId::Range, &["advance_day", "day", "7,x"]);
        assert!(build(&m, "raw").is_unknown());
    }
}
