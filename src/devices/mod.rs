//! Scene items that feed the circuit (sensors, beams) or act on it (kickers).
mod beam;
mod kicker;
mod product;
mod sensor;

pub use beam::*;
pub use kicker::*;
pub use product::*;
pub use sensor::*;
