//! Sentence templates and first-match-wins matching.
//!
//! Templates are tried top to bottom and the first that matches anywhere in
//! the sentence wins. Several templates are textual prefixes of others (the
//! plain metric compare is a prefix of every compound form, the plain count
//! occurs inside the `1日内に` daily count), so every specific template must
//! sit above the general one it would otherwise lose to.

use std::sync::LazyLock;

use regex::Regex;

/// Identifies which sentence shape matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateId {
    TypedCount,
    DailyCompound,
    DailyCount,
    DailyRunCount,
    DailyTotal,
    DailyMetricTotal,
    CumulativeCount,
    Count,
    IncrementalIncrease,
    CumulativeOverPeriod,
    CumulativeMetric,
    Streak,
    Improvement,
    Maintenance,
    SameDay,
    MoonObservation,
    SoloMode,
    Usage,
    MetricCompletion,
    Completion,
    AtCompound,
    AndCompound,
    KatsuCompound,
    Multiplication,
    OverPeriod,
    Percentage,
    Range,
    Ratio,
    Simple,
}

/// A successful template match: which template, and its capture groups in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch {
    pub id: TemplateId,
    pub captures: Vec<String>,
}

/// Operator class. Two-character ASCII forms come before their one-character prefixes.
const OP: &str = r"(≥|≤|>=|<=|==|!=|>|<)";

/// A literal operand: number, boolean or bare word.
const VAL: &str = r"(-?[\w.]+)";

/// Template patterns in priority order. `{op}` and `{val}` are expanded
/// before compiling.
const PATTERNS: &[(TemplateId, &str)] = &[
    (
        TemplateId::TypedCount,
        r"`(\w+)`\s+実行回数\s+for\s+type=`(\w+)`\s+{op}\s+(\d+)",
    ),
    (
        TemplateId::DailyCompound,
        r"1日内の\s+`(\w+)`\s+回数\s+{op}\s+(\d+)\s+かつ\s+`(\w+)`\s+{op}\s+{val}",
    ),
    (TemplateId::DailyCount, r"1日内の\s+`(\w+)`\s+回数\s+{op}\s+(\d+)"),
    (
        TemplateId::DailyRunCount,
        r"1日内に\s+`(\w+)`\s+実行回数\s+{op}\s+(\d+)",
    ),
    (TemplateId::DailyTotal, r"1日内の合計\s+`(\w+)`\s+{op}\s+{val}"),
    (
        TemplateId::DailyMetricTotal,
        r"1日内\s+`(\w+)`\s+合計\s+{op}\s+{val}",
    ),
    (
        TemplateId::CumulativeCount,
        r"累計\s+`(\w+)`\s+実行回数\s+{op}\s+(\d+)",
    ),
    (TemplateId::Count, r"`(\w+)`\s+実行回数\s+{op}\s+(\d+)"),
    (
        TemplateId::IncrementalIncrease,
        r"累計\s+`(\w+)`\s+の日次増分が(\d+)日連続で増加",
    ),
    (
        TemplateId::CumulativeOverPeriod,
        r"累計\s+`(\w+)`\s+{op}\s+{val}\s+over\s+(\d+)\s+days?",
    ),
    (TemplateId::CumulativeMetric, r"累計\s+`(\w+)`\s+{op}\s+{val}"),
    (TemplateId::Streak, r"(\d+)日連続で\s+`(\w+)`\s+を実行"),
    (
        TemplateId::Improvement,
        r"`(\w+)`\s+の\s+`(\w+)`\s+が(\d+)日連続で改善",
    ),
    (
        TemplateId::Maintenance,
        r"`(\w+)`\s+の\s+`(\w+)`\s+が(\d+)日連続で50%以上維持",
    ),
    (
        TemplateId::SameDay,
        r"`(\w+)`\s+と\s+`(\w+)`\s+を同日に両方実行\s+{op}\s+(\d+)",
    ),
    (TemplateId::MoonObservation, r"`(\w+)`\s+で月を含む観測1回完了"),
    (
        TemplateId::SoloMode,
        r"`(\w+)`\s+を\s+Pool\s+ではなく\s+Solo\s+モードで1回実行",
    ),
    (
        TemplateId::Usage,
        r"`(\w+)`\s+で\s+`(\w+)`\s+{op}\s+{val}\s+を1回使用",
    ),
    (
        TemplateId::MetricCompletion,
        r"`(\w+)`\s+で\s+`(\w+)`\s+{op}\s+{val}\s+を1回完了",
    ),
    (TemplateId::Completion, r"`(\w+)`\s+で\s+`([^`]+)`\s+を1回完了"),
    (
        TemplateId::AtCompound,
        r"`(\w+)`\s+にて\s+`(\w+)`\s+{op}\s+{val}\s+かつ\s+`(\w+)`\s+{op}\s+{val}",
    ),
    (
        TemplateId::AndCompound,
        r"`(\w+)`\s+の\s+`(\w+)`\s+{op}\s+{val}\s+and\s+`(\w+)`\s+{op}\s+{val}",
    ),
    (
        TemplateId::KatsuCompound,
        r"`(\w+)`\s+の\s+`(\w+)`\s+{op}\s+{val}\s+かつ\s+`(\w+)`\s+{op}\s+{val}",
    ),
    (
        TemplateId::Multiplication,
        r"`(\w+)`\s+の\s+`(\w+)`\s+{op}\s+{val}\s+×\s+`(\w+)`\s+{op}\s+{val}",
    ),
    (
        TemplateId::OverPeriod,
        r"`(\w+)`\s+の\s+`(\w+)`\s+{op}\s+{val}\s+over\s+(\d+)\s+days?",
    ),
    (
        TemplateId::Percentage,
        r"`(\w+)`\s+の\s+`(\w+)`\s+{op}\s+(\d+(?:\.\d+)?)%",
    ),
    (
        TemplateId::Range,
        r"`(\w+)`\s+の\s+`(\w+)`\s+in\s+\[([^\]]*)\]\s+のいずれかで起動",
    ),
    (
        TemplateId::Ratio,
        r"`(\w+)`\s+の\s+`(\w+)`\s+/\s+`(\w+)`\s+{op}\s+{val}",
    ),
    (TemplateId::Simple, r"`(\w+)`\s+の\s+`(\w+)`\s+{op}\s+{val}"),
];

static TEMPLATES: LazyLock<Vec<(TemplateId, Regex)>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .map(|(id, pattern)| {
            let expanded = pattern.replace("{op}", OP).replace("{val}", VAL);
            let re = Regex::new(&expanded).expect("valid condition template regex");
            (*id, re)
        })
        .collect()
});

/// Tries every template in priority order and returns the first match.
pub fn match_template(text: &str) -> Option<TemplateMatch> {
    TEMPLATES.iter().find_map(|(id, re)| {
        let caps = re.captures(text)?;
        let captures = caps
            .iter()
            .skip(1)
            .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
            .collect();
        Some(TemplateMatch { id: *id, captures })
    })
}
