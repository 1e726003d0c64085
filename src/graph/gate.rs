use super::handles::*;
use super::pin::{PinState, PinType, Wiring};
use smallvec::SmallVec;
use strum_macros::{Display, EnumIter};

use PinState::*;

/// Enum representing the different types of gates in a scene.
#[derive(Clone, Debug, Copy, Eq, PartialEq, Hash, Display, EnumIter)]
pub enum GateType {
    And,
    Or,
    Not,
    Nand,
    DFlipFlop,
    SrFlipFlop,
}
use GateType::*;

impl GateType {
    /// Number of input pins of a gate of this type.
    ///
    /// Flip-flops take (D, clock) and (S, R) respectively.
    pub fn input_count(&self) -> usize {
        match self {
            Not => 1,
            And | Or | Nand | DFlipFlop | SrFlipFlop => 2,
        }
    }

    /// Number of output pins of a gate of this type, flip-flops expose (Q, Q').
    pub fn output_count(&self) -> usize {
        match self {
            And | Or | Not | Nand => 1,
            DFlipFlop | SrFlipFlop => 2,
        }
    }

    /// Returns true if the outputs depend on previous calls to [Gate::calculate].
    pub fn is_stateful(&self) -> bool {
        matches!(self, DFlipFlop | SrFlipFlop)
    }

    /// Returns the state output pins hold before the first calculation.
    pub fn initial_outputs(&self) -> &'static [PinState] {
        match self {
            And | Or | Not | Nand => &[Unknown],
            DFlipFlop | SrFlipFlop => &[Zero, One],
        }
    }

    /// Calculates the output of a combinational gate from the state of its inputs.
    ///
    /// Any [Unknown] input makes the output [Unknown], there is no short circuiting.
    ///
    /// Returns None for flip-flops, which need their latched state, and for a wrong number of inputs.
    ///
    /// # Example
    /// ```
    /// # use kickgates::{GateType, PinState::*};
    /// assert_eq!(GateType::Nand.combine(&[One, One]), Some(Zero));
    /// assert_eq!(GateType::Or.combine(&[Unknown, One]), Some(Unknown));
    /// assert_eq!(GateType::DFlipFlop.combine(&[One, One]), None);
    /// ```
    pub fn combine(&self, inputs: &[PinState]) -> Option<PinState> {
        match (self, inputs) {
            (Not, [a]) => Some(!*a),
            (And, [a, b]) => Some(a.and(*b)),
            (Or, [a, b]) => Some(a.or(*b)),
            (Nand, [a, b]) => Some(!a.and(*b)),
            _ => None,
        }
    }
}

/// Amount of pins kept in the stack for each side of a gate.
pub(super) const GATE_PINS_TINYVEC_SIZE: usize = 2;

/// What a D flip-flop remembers between calculations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Latch {
    pub q: PinState,
    pub q_bar: PinState,
    /// Clock level seen by the previous calculation.
    pub clock: PinState,
}

impl Default for Latch {
    fn default() -> Self {
        Latch {
            q: Zero,
            q_bar: One,
            clock: Zero,
        }
    }
}

/// A logic gate: its type, the pins it owns and, for D flip-flops, its latch.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Gate {
    ty: GateType,
    inputs: SmallVec<[PinIndex; GATE_PINS_TINYVEC_SIZE]>,
    outputs: SmallVec<[PinIndex; GATE_PINS_TINYVEC_SIZE]>,
    latch: Option<Latch>,
}

impl Gate {
    /// Returns a new [Gate] of type `ty` owning `inputs` and `outputs`.
    pub(super) fn new(
        ty: GateType,
        inputs: SmallVec<[PinIndex; GATE_PINS_TINYVEC_SIZE]>,
        outputs: SmallVec<[PinIndex; GATE_PINS_TINYVEC_SIZE]>,
    ) -> Self {
        let latch = match ty {
            DFlipFlop => Some(Latch::default()),
            _ => None,
        };
        Gate {
            ty,
            inputs,
            outputs,
            latch,
        }
    }

    pub fn ty(&self) -> GateType {
        self.ty
    }

    pub fn inputs(&self) -> &[PinIndex] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PinIndex] {
        &self.outputs
    }

    /// Returns every pin of the gate, inputs first.
    pub fn pins(&self) -> impl Iterator<Item = PinIndex> + '_ {
        self.inputs.iter().chain(self.outputs.iter()).copied()
    }

    /// Returns the pins of the gate with the given direction.
    pub fn pins_of(&self, ty: PinType) -> &[PinIndex] {
        match ty {
            PinType::Input => self.inputs(),
            PinType::Output => self.outputs(),
        }
    }

    /// Returns the latched state of a D flip-flop, None for other gates.
    pub fn latch(&self) -> Option<&Latch> {
        self.latch.as_ref()
    }

    /// Recomputes the outputs of the gate from the current state of its inputs.
    ///
    /// Combinational gates write their single output every call.
    ///
    /// D flip-flops latch (D, !D) only on a rising clock edge (previous clock [Zero], current [One])
    /// and re-emit the latched pair on every call.
    ///
    /// SR flip-flops reset on R, set on S, go [Unknown] on both and leave their outputs untouched
    /// when neither input is [One].
    ///
    /// If any pin of the gate is missing from `wiring` the call does nothing.
    pub fn calculate(&mut self, wiring: &mut Wiring) {
        let mut states: SmallVec<[PinState; GATE_PINS_TINYVEC_SIZE]> = SmallVec::new();
        for pin in &self.inputs {
            match wiring.state(*pin) {
                Some(state) => states.push(state),
                None => return,
            }
        }
        if states.len() != self.ty.input_count()
            || self.outputs.len() != self.ty.output_count()
            || self.outputs.iter().any(|pin| !wiring.contains(*pin))
        {
            return;
        }

        match self.ty {
            And | Or | Not | Nand => {
                if let Some(state) = self.ty.combine(&states) {
                    wiring.drive(self.outputs[0], state);
                }
            }
            DFlipFlop => {
                let (d, clock) = (states[0], states[1]);
                let latch = self.latch.get_or_insert_with(Latch::default);
                if latch.clock == Zero && clock == One {
                    latch.q = d;
                    latch.q_bar = !d;
                }
                latch.clock = clock;
                let (q, q_bar) = (latch.q, latch.q_bar);
                wiring.drive(self.outputs[0], q);
                wiring.drive(self.outputs[1], q_bar);
            }
            SrFlipFlop => {
                let (q, q_bar) = match (states[0], states[1]) {
                    (One, One) => (Unknown, Unknown),
                    (_, One) => (Zero, One),
                    (One, _) => (One, Zero),
                    _ => return,
                };
                wiring.drive(self.outputs[0], q);
                wiring.drive(self.outputs[1], q_bar);
            }
        }
    }
}
