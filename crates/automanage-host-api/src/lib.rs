//! Resource capability interface for automanage
//!
//! This crate defines the boundary between the decision core and the
//! collaborators that list resources and carry out actions. It contains no
//! provider SDK code itself.

mod capabilities;
mod mock;
mod resource;
mod traits;

pub use capabilities::*;
pub use mock::*;
pub use resource::*;
pub use traits::*;
