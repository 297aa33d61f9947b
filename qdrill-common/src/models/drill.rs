//! Drill entity

use serde::{Deserialize, Serialize};

use super::wire::{PeopleCount, SuggestedLength};

/// Skill levels a drill may target, in canonical spelling
pub const SKILL_LEVELS: [&str; 4] = ["Beginner", "Intermediate", "Advanced", "Expert"];

/// Canonical spelling of a skill level, matched case-insensitively
pub fn canonical_skill_level(value: &str) -> Option<&'static str> {
    let value = value.trim();
    SKILL_LEVELS
        .iter()
        .copied()
        .find(|level| level.eq_ignore_ascii_case(value))
}

/// Validated drill that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDrill {
    pub name: String,
    pub brief_description: String,
    pub detailed_description: Option<String>,
    pub skill_level: Vec<String>,
    pub complexity: Option<String>,
    pub suggested_length: SuggestedLength,
    pub number_of_people: Option<PeopleCount>,
    pub skills_focused_on: Vec<String>,
    pub positions_focused_on: Vec<String>,
    pub video_link: Option<String>,
    pub images: Option<Vec<String>>,
}

impl NewDrill {
    /// Attach the id assigned by the persistence layer
    pub fn with_id(self, id: i64) -> Drill {
        Drill { id, details: self }
    }
}

/// Stored drill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drill {
    pub id: i64,
    #[serde(flatten)]
    pub details: NewDrill,
}
