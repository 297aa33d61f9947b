//! Practice plan entity with nested sections and items
//!
//! Items inside a section may run on parallel, position-specific tracks. Every
//! item of one track group carries the same `parallel_group_id` and the same
//! set of `group_timelines`; its own track is `parallel_timeline`.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Accepted values for `phase_of_season`
pub const PHASES_OF_SEASON: [&str; 5] = [
    "Offseason",
    "Early season, new players",
    "Mid season, skill building",
    "Tournament tuneup",
    "End of season, peaking",
];

/// Who can see a practice plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Unlisted,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Visibility::Public),
            "unlisted" => Some(Visibility::Unlisted),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

/// Validated practice plan that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPracticePlan {
    pub name: String,
    pub practice_goals: Option<Vec<String>>,
    pub phase_of_season: Option<String>,
    pub estimated_number_of_participants: Option<u32>,
    pub level_of_experience: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub visibility: Option<Visibility>,
    pub is_editable_by_others: Option<bool>,
    /// Sorted by `order`, numbered 0..n
    pub sections: Vec<Section>,
}

impl NewPracticePlan {
    /// Attach the id assigned by the persistence layer
    pub fn with_id(self, id: i64) -> PracticePlan {
        PracticePlan { id, details: self }
    }
}

/// Stored practice plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticePlan {
    pub id: i64,
    #[serde(flatten)]
    pub details: NewPracticePlan,
}

/// Ordered phase of a practice plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub order: u32,
    pub notes: Option<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Schedulable unit within a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Minutes
    pub duration: u32,
    #[serde(flatten)]
    pub kind: ItemKind,
    #[serde(flatten)]
    pub parallel: Option<ParallelTrack>,
}

impl Item {
    pub fn parallel_group_id(&self) -> Option<&str> {
        self.parallel
            .as_ref()
            .map(|track| track.parallel_group_id.as_str())
    }
}

/// Item variant; each variant carries only the reference it needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Drill { drill_id: i64 },
    Formation { formation_id: i64 },
    Break,
    Activity,
}

impl ItemKind {
    /// Wire/storage tag
    pub fn type_name(&self) -> &'static str {
        match self {
            ItemKind::Drill { .. } => "drill",
            ItemKind::Formation { .. } => "formation",
            ItemKind::Break => "break",
            ItemKind::Activity => "activity",
        }
    }

    pub fn drill_id(&self) -> Option<i64> {
        match self {
            ItemKind::Drill { drill_id } => Some(*drill_id),
            _ => None,
        }
    }

    pub fn formation_id(&self) -> Option<i64> {
        match self {
            ItemKind::Formation { formation_id } => Some(*formation_id),
            _ => None,
        }
    }

    /// Rebuild from stored columns
    pub fn from_parts(
        type_name: &str,
        drill_id: Option<i64>,
        formation_id: Option<i64>,
    ) -> Option<Self> {
        match (type_name, drill_id, formation_id) {
            ("drill", Some(drill_id), _) => Some(ItemKind::Drill { drill_id }),
            ("formation", _, Some(formation_id)) => Some(ItemKind::Formation { formation_id }),
            ("break", _, _) => Some(ItemKind::Break),
            ("activity", _, _) => Some(ItemKind::Activity),
            _ => None,
        }
    }
}

/// Track membership of an item that runs concurrently with other items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelTrack {
    pub parallel_group_id: String,
    /// This item's track, e.g. `BEATERS`
    pub parallel_timeline: String,
    /// Every track taking part in the group
    pub group_timelines: Vec<String>,
}
