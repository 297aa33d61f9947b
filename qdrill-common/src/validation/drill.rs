//! Drill payload validation

use serde_json::Value;

use super::payload::Payload;
use super::{FieldErrors, ValidationRules};
use crate::models::drill::canonical_skill_level;
use crate::models::{NewDrill, PeopleCount, SuggestedLength, SKILL_LEVELS};

const NAME_MAX: usize = 100;
const BRIEF_MAX: usize = 255;
const SHORT_MAX: usize = 50;
const LIST_ENTRY_MAX: usize = 100;
const URL_MAX: usize = 255;

/// Validate a drill payload and normalize it for storage
///
/// Scalar `skill_level`, `skills_focused_on` and `positions_focused_on`
/// values become one-element lists. Optional fields that were not supplied
/// stay `None`.
pub fn validate_and_normalize_drill(
    payload: &Value,
    rules: &ValidationRules,
) -> Result<NewDrill, FieldErrors> {
    let mut errors = FieldErrors::new();
    let Some(fields) = Payload::new(payload, "", &mut errors) else {
        return Err(errors);
    };

    let name = fields.required_str("name", NAME_MAX, &mut errors);
    let brief_description = fields.required_str("brief_description", BRIEF_MAX, &mut errors);
    let detailed_description = fields.optional_str(&["detailed_description"], None, &mut errors);
    let complexity = fields.optional_str(&["complexity"], Some(SHORT_MAX), &mut errors);

    let skill_level = fields
        .required_list("skill_level", SHORT_MAX, &mut errors)
        .and_then(|levels| check_skill_levels(levels, rules, &fields.path("skill_level"), &mut errors));

    let suggested_length = fields
        .required_value::<SuggestedLength>(
            "suggested_length",
            "Not a valid length: expected text or {min, max} minutes.",
            &mut errors,
        )
        .and_then(|length| check_suggested_length(length, &fields.path("suggested_length"), &mut errors));

    let number_of_people = fields
        .optional_value::<PeopleCount>(
            &["number_of_people"],
            "Not a valid count: expected an integer or {min, max}.",
            &mut errors,
        )
        .and_then(|count| check_people_count(count, &fields.path("number_of_people"), &mut errors));

    let skills_focused_on = fields.required_list("skills_focused_on", LIST_ENTRY_MAX, &mut errors);
    let positions_focused_on =
        fields.required_list("positions_focused_on", LIST_ENTRY_MAX, &mut errors);

    let video_link = fields
        .optional_str(&["video_link"], Some(URL_MAX), &mut errors)
        .and_then(|link| check_url(link, &fields.path("video_link"), &mut errors));
    let images = fields.optional_list(&["images"], URL_MAX, &mut errors);

    let (
        Some(name),
        Some(brief_description),
        Some(skill_level),
        Some(suggested_length),
        Some(skills_focused_on),
        Some(positions_focused_on),
    ) = (
        name,
        brief_description,
        skill_level,
        suggested_length,
        skills_focused_on,
        positions_focused_on,
    )
    else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewDrill {
        name,
        brief_description,
        detailed_description,
        skill_level,
        complexity,
        suggested_length,
        number_of_people,
        skills_focused_on,
        positions_focused_on,
        video_link,
        images,
    })
}

/// Vocabulary check; when enforced, values are rewritten to canonical spelling
fn check_skill_levels(
    levels: Vec<String>,
    rules: &ValidationRules,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<Vec<String>> {
    if !rules.enforce_skill_levels {
        return Some(levels);
    }

    let mut canonical = Vec::with_capacity(levels.len());
    for level in &levels {
        match canonical_skill_level(level) {
            Some(known) => canonical.push(known.to_string()),
            None => errors.add(
                path,
                format!(
                    "Unknown skill level '{}'. Must be one of: {}.",
                    level,
                    SKILL_LEVELS.join(", ")
                ),
            ),
        }
    }
    (canonical.len() == levels.len()).then_some(canonical)
}

fn check_suggested_length(
    length: SuggestedLength,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<SuggestedLength> {
    match &length {
        SuggestedLength::Range(range) => {
            if let Some(problem) = range.check() {
                errors.add(path, problem);
                return None;
            }
        }
        SuggestedLength::Text(text) => {
            if text.trim().is_empty() {
                errors.add(path, "Field may not be blank.");
                return None;
            }
            if text.chars().count() > SHORT_MAX {
                errors.add(path, format!("Longer than maximum length {}.", SHORT_MAX));
                return None;
            }
        }
    }
    Some(length)
}

fn check_people_count(count: PeopleCount, path: &str, errors: &mut FieldErrors) -> Option<PeopleCount> {
    let problem = match &count {
        PeopleCount::Exact(0) => Some("Must be greater than or equal to 1.".to_string()),
        PeopleCount::Exact(_) => None,
        PeopleCount::Range(range) => range.check(),
    };
    match problem {
        Some(problem) => {
            errors.add(path, problem);
            None
        }
        None => Some(count),
    }
}

fn check_url(link: String, path: &str, errors: &mut FieldErrors) -> Option<String> {
    let trimmed = link.trim();
    let has_host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'));
    if has_host {
        Some(trimmed.to_string())
    } else {
        errors.add(path, "Not a valid URL.");
        None
    }
}
