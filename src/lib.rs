//! Tri-state logic gates wired together in a [Scene], evaluated once per tick in dependency order.
pub mod data_structures;
#[macro_use]
pub mod graph;
pub mod devices;
pub use devices::*;
pub use graph::*;
