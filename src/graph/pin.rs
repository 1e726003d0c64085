use super::error::CircuitError;
use super::handles::*;
use crate::data_structures::Slab;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use smallvec::SmallVec;
#[cfg(feature = "debug_gates")]
use std::collections::HashMap;
use strum_macros::{Display, EnumIter};

/// Direction of a pin relative to the item that owns it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum PinType {
    Input,
    Output,
}

/// Tri-state signal carried by a pin.
///
/// [PinState::Unknown] is an ordinary value, it propagates through gates like the other two.
///
/// # Example
/// ```
/// # use kickgates::PinState;
/// # use std::convert::TryFrom;
/// assert_eq!(PinState::One.and(PinState::Zero), PinState::Zero);
/// assert_eq!(PinState::One.and(PinState::Unknown), PinState::Unknown);
/// assert_eq!(!PinState::Zero, PinState::One);
///
/// assert_eq!(i8::from(PinState::Unknown), -1);
/// assert_eq!(PinState::try_from(1i8).ok(), Some(PinState::One));
/// assert!(PinState::try_from(2i8).is_err());
/// ```
#[repr(i8)]
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumIter, IntoPrimitive, TryFromPrimitive,
)]
pub enum PinState {
    Zero = 0,
    One = 1,
    Unknown = -1,
}
use PinState::*;

impl PinState {
    /// Returns [One] for true and [Zero] for false.
    pub fn from_bool(value: bool) -> PinState {
        if value {
            One
        } else {
            Zero
        }
    }

    /// Returns Some(bool) if `self` is [Zero] or [One], None if it is [Unknown].
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Zero => Some(false),
            One => Some(true),
            Unknown => None,
        }
    }

    /// Returns true if `self` is not [Unknown].
    pub fn is_known(self) -> bool {
        self != Unknown
    }

    /// Three-valued and. Both operands have to be known before the result is,
    /// a [Zero] on one side does not decide the result while the other side is [Unknown].
    pub fn and(self, other: PinState) -> PinState {
        match (self.to_bool(), other.to_bool()) {
            (Some(a), Some(b)) => PinState::from_bool(a && b),
            _ => Unknown,
        }
    }

    /// Three-valued or, with the same conservative treatment of [Unknown] as [PinState::and].
    pub fn or(self, other: PinState) -> PinState {
        match (self.to_bool(), other.to_bool()) {
            (Some(a), Some(b)) => PinState::from_bool(a || b),
            _ => Unknown,
        }
    }
}

impl std::ops::Not for PinState {
    type Output = PinState;
    fn not(self) -> PinState {
        match self {
            Zero => One,
            One => Zero,
            Unknown => Unknown,
        }
    }
}

/// Amount of peers kept inline for a pin.
/// An input has a single producer, outputs with more fan-out spill into the heap.
pub(super) const PIN_CONNECTIONS_TINYVEC_SIZE: usize = 2;

/// A signal terminal owned by a single item.
#[derive(Debug, Clone)]
pub struct Pin {
    ty: PinType,
    state: PinState,
    owner: ItemIndex,
    offset: (f64, f64),
    connected: SmallVec<[PinIndex; PIN_CONNECTIONS_TINYVEC_SIZE]>,
}

impl Pin {
    pub fn ty(&self) -> PinType {
        self.ty
    }

    pub fn state(&self) -> PinState {
        self.state
    }

    /// Returns the item that owns this pin.
    pub fn owner(&self) -> ItemIndex {
        self.owner
    }

    /// Position of the pin relative to its owner, only meaningful to renderers.
    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    /// Returns the peers of this pin in connection order.
    ///
    /// For an output these are the inputs it drives, for an input it is its producer.
    pub fn connected_pins(&self) -> &[PinIndex] {
        &self.connected
    }
}

/// Arena of every pin in a scene together with the connections between them.
///
/// Connections are stored on both ends, always run from an [PinType::Output] to an
/// [PinType::Input], and every input has at most one producer.
#[derive(Debug, Clone, Default)]
pub struct Wiring {
    pins: Slab<PinIndex, Pin>,
    #[cfg(feature = "debug_gates")]
    probes: HashMap<PinIndex, String>,
}

impl Wiring {
    /// Returns an empty [Wiring].
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a new unconnected pin owned by `owner` and returns its index.
    pub(super) fn insert(&mut self, ty: PinType, owner: ItemIndex, state: PinState) -> PinIndex {
        self.pins.insert(Pin {
            ty,
            state,
            owner,
            offset: (0., 0.),
            connected: SmallVec::new(),
        })
    }

    /// Disconnects `pin` from all of its peers and deletes it.
    pub(super) fn remove(&mut self, pin: PinIndex) -> Option<Pin> {
        self.clear_connections(pin).ok()?;
        #[cfg(feature = "debug_gates")]
        self.probes.remove(&pin);
        self.pins.remove(pin)
    }

    /// Deletes every pin.
    pub(super) fn clear(&mut self) {
        self.pins.clear();
        #[cfg(feature = "debug_gates")]
        self.probes.clear();
    }

    /// Returns the pin at `pin`, None if it has been removed.
    pub fn get(&self, pin: PinIndex) -> Option<&Pin> {
        self.pins.get(pin)
    }

    /// Returns true if `pin` is a live pin.
    pub fn contains(&self, pin: PinIndex) -> bool {
        self.pins.contains(pin)
    }

    /// Returns the cached state of `pin`, None if it has been removed.
    pub fn state(&self, pin: PinIndex) -> Option<PinState> {
        self.get(pin).map(Pin::state)
    }

    /// Returns the number of pins.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Returns true if there are no pins.
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Returns an iterator over all pins in index order.
    pub fn iter(&self) -> impl Iterator<Item = (PinIndex, &Pin)> + '_ {
        self.pins.iter()
    }

    /// Returns the output pin driving `input`, if any.
    pub fn producer(&self, input: PinIndex) -> Option<PinIndex> {
        let pin = self.get(input)?;
        if pin.ty != PinType::Input {
            return None;
        }
        pin.connected.first().copied()
    }

    /// Sets the state of `pin`.
    ///
    /// If `pin` is an output the new state is immediately copied onto every input it drives.
    /// The copy stops there, the gates owning those inputs only see it once they are calculated.
    pub fn set_state(&mut self, pin: PinIndex, state: PinState) -> Result<(), CircuitError> {
        if !self.contains(pin) {
            return Err(CircuitError::UnknownPin(pin));
        }
        self.drive(pin, state);
        Ok(())
    }

    /// [Wiring::set_state] without the existence check, removed pins are skipped.
    pub(super) fn drive(&mut self, pin: PinIndex, state: PinState) {
        let (changed, peers) = match self.pins.get_mut(pin) {
            Some(p) => {
                let changed = p.state != state;
                p.state = state;
                let peers = match p.ty {
                    PinType::Output => p.connected.clone(),
                    PinType::Input => SmallVec::new(),
                };
                (changed, peers)
            }
            None => return,
        };
        #[cfg(feature = "debug_gates")]
        if changed {
            self.report_probe(pin, state);
        }
        #[cfg(not(feature = "debug_gates"))]
        let _ = changed;
        for peer in peers {
            self.drive(peer, state);
        }
    }

    /// Connects output `from` to input `to`.
    ///
    /// Any previous producer of `to` is disconnected first, then `to` takes the state of `from`.
    ///
    /// # Example
    /// ```
    /// # use kickgates::{Scene, PinState};
    /// let mut scene = Scene::new();
    /// let beam = scene.beam("beam");
    /// let not = scene.not("not");
    ///
    /// let out = scene.output(beam, 0).unwrap();
    /// let a = scene.input(not, 0).unwrap();
    /// scene.wiring_mut().connect(out, a).unwrap();
    ///
    /// assert_eq!(scene.wiring().state(a), Some(PinState::Zero));
    /// assert_eq!(scene.wiring().producer(a), Some(out));
    /// ```
    pub fn connect(&mut self, from: PinIndex, to: PinIndex) -> Result<(), CircuitError> {
        if from == to {
            return Err(CircuitError::InvalidConnection {
                from,
                to,
                reason: "a pin cannot drive itself",
            });
        }
        let from_pin = self.get(from).ok_or(CircuitError::UnknownPin(from))?;
        let to_pin = self.get(to).ok_or(CircuitError::UnknownPin(to))?;
        if from_pin.ty != PinType::Output || to_pin.ty != PinType::Input {
            tracing::warn!(%from, %to, "rejected connection between pins of the wrong type");
            return Err(CircuitError::InvalidConnection {
                from,
                to,
                reason: "connections run from an output pin to an input pin",
            });
        }
        let state = from_pin.state;

        if !to_pin.connected.contains(&from) {
            self.clear_connections(to)?;
            if let Some(p) = self.pins.get_mut(from) {
                p.connected.push(to);
            }
            if let Some(p) = self.pins.get_mut(to) {
                p.connected.push(from);
            }
        }
        self.drive(to, state);
        Ok(())
    }

    /// Removes the connection between `a` and `b` in both directions.
    ///
    /// Returns Ok(false) if they were not connected. An input left without a producer
    /// becomes [Unknown].
    pub fn disconnect(&mut self, a: PinIndex, b: PinIndex) -> Result<bool, CircuitError> {
        if !self.contains(a) {
            return Err(CircuitError::UnknownPin(a));
        }
        if !self.contains(b) {
            return Err(CircuitError::UnknownPin(b));
        }
        let removed = self.unlink(a, b);
        self.unlink(b, a);
        Ok(removed)
    }

    /// Removes every connection of `pin` in both directions.
    pub fn clear_connections(&mut self, pin: PinIndex) -> Result<(), CircuitError> {
        let peers = match self.pins.get_mut(pin) {
            Some(p) => std::mem::take(&mut p.connected),
            None => return Err(CircuitError::UnknownPin(pin)),
        };
        if peers.is_empty() {
            return Ok(());
        }
        for peer in peers {
            self.unlink(peer, pin);
        }
        self.reset_if_orphaned(pin);
        Ok(())
    }

    /// Removes `peer` from the connection list of `pin`, returns true if it was there.
    fn unlink(&mut self, pin: PinIndex, peer: PinIndex) -> bool {
        let removed = match self.pins.get_mut(pin) {
            Some(p) => match p.connected.iter().position(|c| *c == peer) {
                Some(position) => {
                    p.connected.remove(position);
                    true
                }
                None => false,
            },
            None => false,
        };
        if removed {
            self.reset_if_orphaned(pin);
        }
        removed
    }

    /// An input without a producer reads [Unknown].
    fn reset_if_orphaned(&mut self, pin: PinIndex) {
        let orphaned = self
            .get(pin)
            .map_or(false, |p| p.ty == PinType::Input && p.connected.is_empty());
        if orphaned {
            self.drive(pin, Unknown);
        }
    }

    /// Sets the position of `pin` relative to its owner.
    pub fn set_offset(&mut self, pin: PinIndex, x: f64, y: f64) -> Result<(), CircuitError> {
        let unknown = CircuitError::UnknownPin(pin);
        let p = self.pins.get_mut(pin).ok_or(unknown)?;
        p.offset = (x, y);
        Ok(())
    }

    /// "Probes" `pin`, meaning that whenever its state changes the new state will be
    /// logged along with `name`.
    #[cfg(feature = "debug_gates")]
    pub fn probe<S: Into<String>>(&mut self, pin: PinIndex, name: S) -> Result<(), CircuitError> {
        if !self.contains(pin) {
            return Err(CircuitError::UnknownPin(pin));
        }
        self.probes.insert(pin, name.into());
        Ok(())
    }

    #[cfg(feature = "debug_gates")]
    fn report_probe(&self, pin: PinIndex, state: PinState) {
        if let Some(name) = self.probes.get(&pin) {
            tracing::info!(probe = %name, %pin, %state, "probe changed");
        }
    }
}
