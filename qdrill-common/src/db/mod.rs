//! Database initialization and repositories

pub mod drills;
pub mod init;
pub mod practice_plans;

pub use drills::DrillRepository;
pub use init::*;
pub use practice_plans::PracticePlanRepository;
