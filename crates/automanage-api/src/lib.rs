//! Shared types for automanage
//!
//! These types cross crate boundaries: the core engine produces them, the
//! host collaborators consume them, and the binary serializes them as NDJSON.

mod types;

pub use types::*;
