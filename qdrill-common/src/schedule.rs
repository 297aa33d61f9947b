//! Wall-clock schedule of a practice plan's sections

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::duration::section_duration;
use crate::models::NewPracticePlan;

/// Timing of one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTiming {
    pub section: String,
    pub order: u32,
    /// Minutes, parallel groups counted once
    pub duration: u32,
    /// Only known when the plan has a `start_time`; wraps past midnight
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// Section timings in `order` sequence
pub fn section_timings(plan: &NewPracticePlan) -> Vec<SectionTiming> {
    let mut sections: Vec<_> = plan.sections.iter().collect();
    sections.sort_by_key(|section| section.order);

    let mut cursor = plan.start_time;
    sections
        .into_iter()
        .map(|section| {
            let duration = section_duration(&section.items);
            let start_time = cursor;
            let end_time = start_time.map(|start| add_minutes(start, duration));
            cursor = end_time;
            SectionTiming {
                section: section.name.clone(),
                order: section.order,
                duration,
                start_time,
                end_time,
            }
        })
        .collect()
}

/// Time of day `minutes` after `start`, wrapping at midnight
pub fn add_minutes(start: NaiveTime, minutes: u32) -> NaiveTime {
    let (time, _) = start.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
    time
}
