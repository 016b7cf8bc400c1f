//! Data model shared by the engine and host implementations.

mod content;
mod decision;
mod group;
mod tab;

pub use content::*;
pub use decision::*;
pub use group::*;
pub use tab::*;
