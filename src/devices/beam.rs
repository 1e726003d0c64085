use crate::graph::{PinIndex, PinState};

/// A light beam across the conveyor, its output reads [PinState::One] while a product crosses it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Beam {
    output: PinIndex,
}

impl Beam {
    pub(crate) fn new(output: PinIndex) -> Self {
        Beam { output }
    }

    pub fn output(&self) -> PinIndex {
        self.output
    }

    pub fn outputs(&self) -> &[PinIndex] {
        std::slice::from_ref(&self.output)
    }

    /// Returns the state of the output pin for a beam that is `crossed` or not.
    pub fn reading(crossed: bool) -> PinState {
        PinState::from_bool(crossed)
    }
}
