//! Action labels as written in condition sentences, mapped to the canonical
//! action types events are recorded under.

/// Label → canonical action type.
const ALIASES: &[(&str, &str)] = &[
    ("design_plant", "power_plant"),
    ("mine_log", "mining"),
    ("cea_run", "cea"),
    ("observe_optics", "astronomy"),
    ("build_module", "build"),
    ("advance_day", "advance_day"),
    ("log_learning", "learning"),
    ("review_day", "review_day"),
];

/// Resolves an action label to its canonical action type.
///
/// Labels with no alias are already canonical and pass through unchanged.
pub fn canonical_action(label: &str) -> String {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == label)
        .map_or(label, |&(_, canonical)| canonical)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_labels() {
        assert_eq!(canonical_action("mine_log"), "mining");
        assert_eq!(canonical_action("design_plant"), "power_plant");
        assert_eq!(canonical_action("advance_day"), "advance_day");
    }

    #[test]
    fn canonical_names_pass_through() {
        assert_eq!(canonical_action("mining"), "mining");
        assert_eq!(canonical_action("stargazing"), "stargazing");
    }
}
