use crate::graph::{PinIndex, PinState};

/// Kicks products off the conveyor when its input rises to [PinState::One].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Kicker {
    input: PinIndex,
    previous: PinState,
}

impl Kicker {
    pub(crate) fn new(input: PinIndex) -> Self {
        Kicker {
            input,
            previous: PinState::Unknown,
        }
    }

    pub fn input(&self) -> PinIndex {
        self.input
    }

    pub fn inputs(&self) -> &[PinIndex] {
        std::slice::from_ref(&self.input)
    }

    /// Level seen by the previous call to [Kicker::poll].
    pub fn previous(&self) -> PinState {
        self.previous
    }

    /// Observes `level` on the input, returns true if the kicker fires.
    ///
    /// It fires once per rising level: `level` is [PinState::One] and the previous one was not.
    /// There is no cooldown between kicks.
    pub fn poll(&mut self, level: PinState) -> bool {
        let fires = level == PinState::One && self.previous != PinState::One;
        self.previous = level;
        fires
    }
}
