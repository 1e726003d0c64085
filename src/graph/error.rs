use super::handles::{ItemIndex, PinIndex};
use thiserror::Error;

/// Errors reported by wiring and evaluation of a [Scene](super::Scene).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CircuitError {
    /// The gates could not be put in dependency order, the listed gates sit on or behind a
    /// feedback loop. No gate was evaluated.
    #[error("cycle detected: {} gate(s) could not be ordered", .unsorted.len())]
    CycleDetected { unsorted: Vec<ItemIndex> },
    #[error("cannot connect {from} to {to}: {reason}")]
    InvalidConnection {
        from: PinIndex,
        to: PinIndex,
        reason: &'static str,
    },
    #[error("{0} is not in the scene")]
    UnknownItem(ItemIndex),
    #[error("{0} is not in the scene")]
    UnknownPin(PinIndex),
    #[error("{item} is not a {expected}")]
    NotA {
        item: ItemIndex,
        expected: &'static str,
    },
}
