//! Entity types for drills and practice plans
//!
//! `New*` types are validated, normalized entities that have not been stored
//! yet. The id-carrying types are what the persistence layer hands back.

pub mod drill;
pub mod practice_plan;
pub mod wire;

pub use drill::{Drill, NewDrill, SKILL_LEVELS};
pub use practice_plan::{
    Item, ItemKind, NewPracticePlan, ParallelTrack, PracticePlan, Section, Visibility,
    PHASES_OF_SEASON,
};
pub use wire::{PeopleCount, Range, StringOrList, SuggestedLength};
