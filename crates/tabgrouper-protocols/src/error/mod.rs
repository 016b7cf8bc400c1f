//! Error types for the TabGrouper protocol layer.

mod host;
mod provider;

pub use host::*;
pub use provider::*;
