//! Practice plan payload validation
//!
//! Besides per-field checks this enforces the parallel-group rules inside
//! each section: every item of a group carries the same set of
//! `group_timelines`, each item's own `parallel_timeline` belongs to that set,
//! and a group never spans two sections.

use chrono::NaiveTime;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::payload::{Payload, BLANK};
use super::FieldErrors;
use crate::models::{
    Item, ItemKind, NewPracticePlan, ParallelTrack, Section, Visibility, PHASES_OF_SEASON,
};

const NAME_MAX: usize = 100;
const SHORT_MAX: usize = 50;
const GOAL_MAX: usize = 255;
const GROUP_ID_MAX: usize = 100;
const ITEM_TYPES: &str = "drill, formation, break, activity";
const PARALLEL_KEYS: [(&str, &str); 3] = [
    ("parallel_group_id", "parallel_group_id"),
    ("parallel_timeline", "parallel_timeline"),
    ("group_timelines", "groupTimelines"),
];

/// Validate a practice plan payload and normalize it for storage
///
/// Sections come back sorted by `order` and renumbered `0..n`.
pub fn validate_and_normalize_practice_plan(payload: &Value) -> Result<NewPracticePlan, FieldErrors> {
    let mut errors = FieldErrors::new();
    let Some(fields) = Payload::new(payload, "", &mut errors) else {
        return Err(errors);
    };

    let name = fields.required_str("name", NAME_MAX, &mut errors);
    let practice_goals = fields.optional_list(&["practice_goals"], GOAL_MAX, &mut errors);
    let phase_of_season = fields
        .optional_str(&["phase_of_season"], Some(SHORT_MAX), &mut errors)
        .and_then(|phase| {
            if PHASES_OF_SEASON.contains(&phase.as_str()) {
                Some(phase)
            } else {
                errors.add(
                    fields.path("phase_of_season"),
                    format!("Invalid phase of season. Must be one of: {}.", PHASES_OF_SEASON.join(", ")),
                );
                None
            }
        });
    let estimated_number_of_participants = fields.optional_count(
        &["estimated_number_of_participants", "number_of_participants"],
        1,
        &mut errors,
    );
    let level_of_experience = fields.optional_str(&["level_of_experience"], Some(SHORT_MAX), &mut errors);
    let description = fields.optional_str(&["description", "overview"], None, &mut errors);
    let start_time = fields
        .optional_str(&["start_time"], Some(8), &mut errors)
        .and_then(|text| match parse_time_of_day(&text) {
            Some(time) => Some(time),
            None => {
                errors.add(fields.path("start_time"), "Not a valid time: expected HH:MM.");
                None
            }
        });
    let visibility = fields
        .optional_str(&["visibility"], Some(SHORT_MAX), &mut errors)
        .and_then(|text| match Visibility::parse(&text) {
            Some(visibility) => Some(visibility),
            None => {
                errors.add(
                    fields.path("visibility"),
                    "Must be one of: public, unlisted, private.",
                );
                None
            }
        });
    let is_editable_by_others = fields.optional_bool("is_editable_by_others", &mut errors);

    let mut sections = Vec::new();
    if let Some(values) = fields.array("sections", &mut errors) {
        for (index, value) in values.iter().enumerate() {
            if let Some(section) = validate_section(value, index, &mut errors) {
                sections.push((index, section));
            }
        }
    }
    check_groups_stay_in_one_section(&sections, &mut errors);
    let sections = normalize_section_order(sections, &mut errors);

    let Some(name) = name else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewPracticePlan {
        name,
        practice_goals,
        phase_of_season,
        estimated_number_of_participants,
        level_of_experience,
        description,
        start_time,
        visibility,
        is_editable_by_others,
        sections,
    })
}

/// `HH:MM` or `HH:MM:SS`
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

fn validate_section(value: &Value, index: usize, errors: &mut FieldErrors) -> Option<Section> {
    let prefix = format!("sections[{}]", index);
    let fields = Payload::new(value, &prefix, errors)?;

    let name = fields.required_str("name", NAME_MAX, errors);
    // Missing order falls back to the payload position
    let order = fields
        .optional_count(&["order"], 0, errors)
        .or_else(|| (!fields.has(&["order"])).then_some(index as u32));
    let notes = fields.optional_str(&["notes"], None, errors);
    let goals = fields.optional_list(&["goals"], GOAL_MAX, errors).unwrap_or_default();

    let mut items = Vec::new();
    let mut items_valid = true;
    match fields.array("items", errors) {
        Some(values) => {
            for (position, value) in values.iter().enumerate() {
                let item_prefix = format!("{}.items[{}]", prefix, position);
                match validate_item(value, &item_prefix, errors) {
                    Some(item) => items.push(item),
                    None => items_valid = false,
                }
            }
        }
        None => items_valid = false,
    }
    check_parallel_groups(&items, &prefix, errors);

    let (Some(name), Some(order), true) = (name, order, items_valid) else {
        return None;
    };
    Some(Section {
        name,
        order,
        notes,
        goals,
        items,
    })
}

fn validate_item(value: &Value, prefix: &str, errors: &mut FieldErrors) -> Option<Item> {
    let fields = Payload::new(value, prefix, errors)?;

    let type_name = fields.required_str("type", SHORT_MAX, errors);
    let duration = fields.required_count(&["duration", "selected_duration"], 1, errors);

    let kind = match type_name.as_deref() {
        Some("drill") => fields
            .required_id("drill_id", errors)
            .map(|drill_id| ItemKind::Drill { drill_id }),
        Some("formation") => fields
            .required_id("formation_id", errors)
            .map(|formation_id| ItemKind::Formation { formation_id }),
        Some("break") => Some(ItemKind::Break),
        Some("activity") | Some("one-off") => Some(ItemKind::Activity),
        Some(other) => {
            errors.add(
                fields.path("type"),
                format!("Unknown item type '{}'. Must be one of: {}.", other, ITEM_TYPES),
            );
            None
        }
        None => None,
    };

    if let Some(kind) = &kind {
        for reference in ["drill_id", "formation_id"] {
            let allowed = match reference {
                "drill_id" => kind.drill_id().is_some(),
                _ => kind.formation_id().is_some(),
            };
            if !allowed && fields.has(&[reference]) {
                errors.add(
                    fields.path(reference),
                    format!("Not allowed for item type '{}'.", kind.type_name()),
                );
            }
        }
    }

    let name = match &kind {
        Some(ItemKind::Break) => Some(
            fields
                .optional_str(&["name"], Some(NAME_MAX), errors)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "Break".to_string()),
        ),
        _ => fields.required_str("name", NAME_MAX, errors),
    };

    let parallel = validate_parallel_track(&fields, errors);

    match (name, duration, kind, parallel) {
        (Some(name), Some(duration), Some(kind), Ok(parallel)) => Some(Item {
            name,
            duration,
            kind,
            parallel,
        }),
        _ => None,
    }
}

/// `Ok(None)` for an ordinary item, `Err(())` once a problem has been recorded
fn validate_parallel_track(
    fields: &Payload<'_>,
    errors: &mut FieldErrors,
) -> Result<Option<ParallelTrack>, ()> {
    let present: Vec<bool> = PARALLEL_KEYS
        .iter()
        .map(|(key, alias)| fields.has(&[*key, *alias]))
        .collect();
    if present.iter().all(|given| !given) {
        return Ok(None);
    }
    if !present.iter().all(|given| *given) {
        for ((key, _), given) in PARALLEL_KEYS.iter().zip(&present) {
            if !given {
                errors.add(
                    fields.path(key),
                    "Required when any parallel field is given: parallel_group_id, parallel_timeline and group_timelines go together.",
                );
            }
        }
        return Err(());
    }

    let group_id = fields.optional_str(&["parallel_group_id"], Some(GROUP_ID_MAX), errors);
    let timeline = fields.optional_str(&["parallel_timeline"], Some(SHORT_MAX), errors);
    let timelines = fields.optional_list(&["group_timelines", "groupTimelines"], SHORT_MAX, errors);
    let (Some(group_id), Some(timeline), Some(timelines)) = (group_id, timeline, timelines) else {
        return Err(());
    };

    let mut valid = true;
    if group_id.trim().is_empty() {
        errors.add(fields.path("parallel_group_id"), BLANK);
        valid = false;
    }
    if timelines.is_empty() {
        errors.add(fields.path("group_timelines"), "Must contain at least one entry.");
        valid = false;
    }
    let mut seen = BTreeSet::new();
    for entry in &timelines {
        if !seen.insert(entry.as_str()) {
            errors.add(
                fields.path("group_timelines"),
                format!("Contains duplicate timeline '{}'.", entry),
            );
            valid = false;
        }
    }
    if !timelines.is_empty() && !timelines.contains(&timeline) {
        errors.add(
            fields.path("parallel_timeline"),
            format!("'{}' is not one of the group_timelines.", timeline),
        );
        valid = false;
    }

    if !valid {
        return Err(());
    }
    Ok(Some(ParallelTrack {
        parallel_group_id: group_id,
        parallel_timeline: timeline,
        group_timelines: timelines,
    }))
}

/// Every member of a group must list the same timelines
///
/// A disagreement is reported against the group rather than resolved; there
/// is no "right" member to prefer.
fn check_parallel_groups(items: &[Item], prefix: &str, errors: &mut FieldErrors) {
    let mut groups: BTreeMap<&str, Vec<BTreeSet<&str>>> = BTreeMap::new();
    for track in items.iter().filter_map(|item| item.parallel.as_ref()) {
        let timelines = track.group_timelines.iter().map(String::as_str).collect();
        groups
            .entry(track.parallel_group_id.as_str())
            .or_default()
            .push(timelines);
    }

    for (group_id, sets) in groups {
        let mut distinct: Vec<&BTreeSet<&str>> = Vec::new();
        for set in &sets {
            if !distinct.contains(&set) {
                distinct.push(set);
            }
        }
        if distinct.len() > 1 {
            let variants: Vec<String> = distinct
                .iter()
                .map(|set| format!("[{}]", set.iter().copied().collect::<Vec<_>>().join(", ")))
                .collect();
            errors.add(
                format!("{}.parallel_groups.{}", prefix, group_id),
                format!("Items disagree on group_timelines: {}.", variants.join(" vs ")),
            );
        }
    }
}

fn check_groups_stay_in_one_section(sections: &[(usize, Section)], errors: &mut FieldErrors) {
    let mut owner: BTreeMap<&str, usize> = BTreeMap::new();
    for (index, section) in sections {
        let group_ids: BTreeSet<&str> = section
            .items
            .iter()
            .filter_map(Item::parallel_group_id)
            .collect();
        for group_id in group_ids {
            match owner.get(group_id) {
                Some(first) => errors.add(
                    format!("sections[{}].parallel_groups.{}", index, group_id),
                    format!("Parallel group is already used in sections[{}].", first),
                ),
                None => {
                    owner.insert(group_id, *index);
                }
            }
        }
    }
}

/// Reject duplicate orders, then sort and renumber contiguously from zero
fn normalize_section_order(mut sections: Vec<(usize, Section)>, errors: &mut FieldErrors) -> Vec<Section> {
    let mut taken: BTreeMap<u32, usize> = BTreeMap::new();
    for (index, section) in &sections {
        if let Some(first) = taken.insert(section.order, *index) {
            errors.add(
                format!("sections[{}].order", index),
                format!("Duplicate section order {} (also used by sections[{}]).", section.order, first),
            );
        }
    }

    sections.sort_by_key(|(_, section)| section.order);
    sections
        .into_iter()
        .enumerate()
        .map(|(position, (_, mut section))| {
            section.order = position as u32;
            section
        })
        .collect()
}
