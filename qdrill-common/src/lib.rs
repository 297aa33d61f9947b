//! # QDrill Common Library
//!
//! Shared code for the QDrill services including:
//! - Drill and practice plan entity types
//! - Payload validation and normalization
//! - Parallel-group aware duration calculation and section scheduling
//! - SQLite persistence (repositories)
//! - Configuration loading

pub mod config;
pub mod db;
pub mod duration;
pub mod error;
pub mod models;
pub mod schedule;
pub mod validation;

pub use error::{Error, Result};
pub use validation::{FieldErrors, ValidationRules};
