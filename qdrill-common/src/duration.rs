//! Section and plan durations with parallel groups
//!
//! Items that share a `parallel_group_id` run at the same time on different
//! tracks, so a group adds the longest member duration to the section once
//! instead of the sum of its members.

use std::collections::{BTreeMap, HashSet};

use crate::models::{Item, NewPracticePlan};

/// Wall-clock minutes a section takes
///
/// One linear walk: ungrouped items add their own duration; the first item
/// seen from a group adds the group's maximum and marks the group counted;
/// later members add nothing. The result does not depend on item order.
pub fn section_duration(items: &[Item]) -> u32 {
    let group_max = group_durations(items);
    let mut counted: HashSet<&str> = HashSet::new();
    let mut total: u32 = 0;

    for item in items {
        let contribution = match item.parallel_group_id() {
            None => item.duration,
            Some(group_id) if counted.insert(group_id) => {
                group_max.get(group_id).copied().unwrap_or(item.duration)
            }
            Some(_) => 0,
        };
        total = total.saturating_add(contribution);
    }
    total
}

/// Longest member duration per parallel group
pub fn group_durations(items: &[Item]) -> BTreeMap<&str, u32> {
    let mut durations: BTreeMap<&str, u32> = BTreeMap::new();
    for item in items {
        if let Some(group_id) = item.parallel_group_id() {
            let longest = durations.entry(group_id).or_insert(0);
            *longest = (*longest).max(item.duration);
        }
    }
    durations
}

/// Sum of section durations
pub fn plan_duration(plan: &NewPracticePlan) -> u32 {
    plan.sections
        .iter()
        .map(|section| section_duration(&section.items))
        .fold(0, u32::saturating_add)
}
