//! Built-in handball action tables.

use std::collections::BTreeMap;

use super::catalog::{ActionCategory, ActionKind, SubActionKind};

pub const SHOT_SUBCATEGORY: &str = "shot";
pub const TURNOVER_SUBCATEGORY: &str = "turnover";

fn kind(
    primary_type: &str,
    label: &str,
    category: ActionCategory,
    subcategory: Option<&str>,
    color_tag: &str,
) -> ActionKind {
    ActionKind {
        primary_type: primary_type.to_string(),
        label: label.to_string(),
        category,
        subcategory: subcategory.map(str::to_string),
        color_tag: color_tag.to_string(),
    }
}

fn subs(entries: &[(&str, &str)]) -> Vec<SubActionKind> {
    entries
        .iter()
        .map(|(sub_type, label)| SubActionKind {
            sub_type: (*sub_type).to_string(),
            label: (*label).to_string(),
        })
        .collect()
}

pub fn primaries() -> Vec<ActionKind> {
    vec![
        kind("goal", "Shot on goal", ActionCategory::Goal, Some(SHOT_SUBCATEGORY), "green"),
        kind("miss", "Shot missed", ActionCategory::Miss, Some(SHOT_SUBCATEGORY), "red"),
        kind(
            "turnover",
            "Turnover",
            ActionCategory::Turnover,
            Some(TURNOVER_SUBCATEGORY),
            "red",
        ),
        kind("save", "Save", ActionCategory::Save, None, "yellow"),
    ]
}

pub fn subcategories() -> BTreeMap<String, Vec<SubActionKind>> {
    let mut map = BTreeMap::new();
    map.insert(
        SHOT_SUBCATEGORY.to_string(),
        subs(&[
            ("wing", "Wing"),
            ("pivot", "Pivot"),
            ("backcourt_6m", "Backcourt (6m)"),
            ("backcourt_9m", "Backcourt (9m)"),
            ("fast_break", "Fast break"),
            ("second_wave", "Second wave"),
            ("seven_meter", "7 meter"),
        ]),
    );
    // Technical faults are booked as turnovers.
    map.insert(
        TURNOVER_SUBCATEGORY.to_string(),
        subs(&[
            ("bad_pass", "Bad pass"),
            ("double_dribble", "Double dribble"),
            ("foot", "Foot"),
            ("steps", "Steps"),
            ("offensive_foul", "Offensive foul"),
            ("passive_play", "Passive play"),
            ("technical_fault", "Technical fault"),
        ]),
    );
    map
}
