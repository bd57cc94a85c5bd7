//! Shared utilities for automanage
//!
//! This crate provides:
//! - ID types (ResourceId, CycleId)
//! - Time utilities (evaluation instant, weekday indexing, snapshot stamps)
//! - Error types
//! - Default paths for the configuration file

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
