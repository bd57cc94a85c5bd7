//! Lifecycle policy decision engine for automanage
//!
//! This crate is the heart of automanage, containing:
//! - Policy tag parsing (`<kind>:<param>/<param>/...`)
//! - Schedule window evaluation, including overnight and weekly windows
//! - Running-time limit evaluation
//! - The per-resource decision (exactly one action per resource per cycle)
//! - The action gate for externally orchestrated resources

mod engine;
mod gate;
mod limit;
mod notification;
mod policy;
mod window;

pub use engine::*;
pub use gate::*;
pub use limit::*;
pub use notification::*;
pub use policy::*;
pub use window::*;
