#[macro_use]
mod handles;
mod dependency_graph;
mod error;
mod gate;
mod pin;
mod scene;
pub use dependency_graph::*;
pub use error::*;
pub use gate::*;
pub use handles::*;
pub use pin::*;
pub use scene::*;
