//! Condition parsing: sentence in, `Condition` out.
//!
//! Parsing never fails. A sentence that matches no template, or matches one
//! with captures that cannot be read, becomes `Condition::Unknown`, which
//! simply never completes.

mod alias;
mod build;
mod template;

pub use alias::canonical_action;
pub use template::{TemplateId, TemplateMatch, match_template};

use crate::model::Condition;

/// Parses a condition sentence.
pub fn parse_condition(text: &str) -> Condition {
    let text = text.trim();
    match match_template(text) {
        Some(m) => {
            log::debug!("condition {text:?} matched template {:?}", m.id);
            build::build(&m, text)
        }
        None => {
            log::warn!("no condition template matches {text:?}");
            Condition::Unknown {
                text: text.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Op, Value};

    #[test]
    fn documented_templates_parse_to_their_variants() {
        let cases = [
            ("`mine_log` 実行回数 ≥ 3", "total_action_count"),
            ("`design_plant` の `output_kwh` ≥ 1.0", "simple"),
            ("1日内の `mine_log` 回数 ≥ 1", "daily_action_count"),
            (
                "1日内の `mine_log` 回数 ≥ 1 かつ `power_usage_W` ≤ 0",
                "daily_compound",
            ),
            ("3日連続で `advance_day` を実行", "consecutive_days"),
            ("`a` と `b` を同日に両方実行 ≥ 1", "same_day_both"),
            ("`x` の `y` in [7,14,21] のいずれかで起動", "range_check"),
        ];
        for (text, kind) in cases {
            assert_eq!(parse_condition(text).kind(), kind, "{text}");
        }
    }

    #[test]
    fn remaining_templates_parse_to_their_variants() {
        let cases = [
            ("`build_module` 実行回数 for type=`engine` ≥ 2", "type_action_count"),
            ("1日内に `cea_run` 実行回数 ≥ 5", "daily_action_count"),
            ("1日内の合計 `power_usage_W` ≤ 100", "daily_total_metric"),
            ("1日内 `mined_amount_XMR` 合計 ≥ 0.001", "daily_total_metric"),
            ("累計 `cea_run` 実行回数 ≥ 10", "total_action_count"),
            ("累計 `mined_amount_XMR` の日次増分が3日連続で増加", "incremental_increase"),
            ("累計 `mined_amount_XMR` ≥ 0.01 over 7 day", "over_period"),
            ("累計 `mined_amount_XMR` ≥ 0.01", "total_metric"),
            ("`mine_log` の `hashrate_khps` が3日連続で改善", "consecutive_improvement"),
            ("`design_plant` の `output_kwh` が5日連続で50%以上維持", "consecutive_maintenance"),
            ("`observe_optics` で月を含む観測1回完了", "moon_observation"),
            ("`mine_log` を Pool ではなく Solo モードで1回実行", "solo_mode"),
            ("`cea_run` で `o_f_ratio` ≥ 2.5 を1回使用", "usage"),
            ("`cea_run` で `chamber_pressure` ≥ 10 を1回完了", "simple"),
            ("`design_plant` で `風力発電設計` を1回完了", "completion"),
            ("`mine_log` にて `threads` ≥ 4 かつ `power_usage_W` ≤ 30", "compound_and"),
            ("`mine_log` の `threads` ≥ 4 and `power_usage_W` ≤ 30", "compound_and"),
            ("`mine_log` の `threads` ≥ 4 かつ `power_usage_W` ≤ 30", "compound_and"),
            ("`design_plant` の `area_m2` ≥ 2 × `efficiency` ≥ 0.2", "multiplication"),
            ("`mine_log` の `power_usage_W` ≤ 20 over 7 day", "over_period"),
            ("`design_plant` の `efficiency` ≥ 30%", "percentage"),
            ("`mine_log` の `power_usage_W` / `hashrate_khps` ≤ 0.1", "ratio"),
        ];
        for (text, kind) in cases {
            assert_eq!(parse_condition(text).kind(), kind, "{text}");
        }
    }

    #[test]
    fn daily_compound_keeps_its_and_clause() {
        assert_eq!(
            parse_condition("1日内の `mine_log` 回数 ≥ 1 かつ `power_usage_W` ≤ 0"),
            Condition::DailyCompound {
                action: "mining".into(),
                action_op: Op::Ge,
                action_count: 1,
                metric: "power_usage_W".into(),
                metric_op: Op::Le,
                metric_value: Value::Int(0),
            }
        );
    }

    #[test]
    fn over_period_without_action_comes_from_cumulative_form() {
        let Condition::OverPeriod { action, days, .. } =
            parse_condition("累計 `mined_amount_XMR` ≥ 0.01 over 7 day")
        else {
            panic!("expected over_period");
        };
        assert_eq!(action, None);
        assert_eq!(days, 7);
    }

    #[test]
    fn unrecognized_sentence_is_unknown() {
        assert_eq!(
            parse_condition("  宇宙へ行く  "),
            Condition::Unknown {
                text: "宇宙へ行く".into()
            }
        );
    }
}
