use crate::data_structures::SlabKey;
use std::fmt::{self, Display, Formatter};

/// Represents the index of a pin in a [Scene](super::Scene).
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct PinIndex {
    pub(super) idx: usize,
}

/// Represents the index of an item (gate or device) in a [Scene](super::Scene).
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct ItemIndex {
    pub(super) idx: usize,
}

/// Returns a new PinIndex from a provided usize.
#[allow(unused_macros)]
macro_rules! pi {
    ( $x:expr ) => {{
        PinIndex::new($x)
    }};
}

/// Returns a new ItemIndex from a provided usize.
#[allow(unused_macros)]
macro_rules! ii {
    ( $x:expr ) => {{
        ItemIndex::new($x)
    }};
}

impl PinIndex {
    /// Returns a new PinIndex from a provided usize.
    pub(super) const fn new(idx: usize) -> PinIndex {
        PinIndex { idx }
    }
}

impl ItemIndex {
    /// Returns a new ItemIndex from a provided usize.
    pub(super) const fn new(idx: usize) -> ItemIndex {
        ItemIndex { idx }
    }
}

impl SlabKey for PinIndex {
    fn from_slot(slot: usize) -> Self {
        pi!(slot)
    }
    fn slot(&self) -> usize {
        self.idx
    }
}

impl SlabKey for ItemIndex {
    fn from_slot(slot: usize) -> Self {
        ii!(slot)
    }
    fn slot(&self) -> usize {
        self.idx
    }
}

impl Display for PinIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "pin{}", self.idx)
    }
}

impl Display for ItemIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "item{}", self.idx)
    }
}
