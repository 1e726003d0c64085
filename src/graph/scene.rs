use super::dependency_graph::DependencyGraph;
use super::error::CircuitError;
use super::gate::*;
use super::handles::*;
use super::pin::*;
use crate::data_structures::Slab;
use crate::devices::{Beam, Kicker, Product, Property, Sensor, SENSOR_PROPERTIES_TINYVEC_SIZE};
use casey::pascal;
use concat_idents::concat_idents;
use indexmap::IndexSet;
use smallvec::SmallVec;
#[cfg(feature = "debug_gates")]
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::io::{self, Write};
use unwrap::unwrap;

use GateType::*;
use PinState::*;

/// Creates gatename and gatename2 constructors for every two input combinational gate.
/// The constructors create gates with unwired inputs and with both inputs wired respectively.
macro_rules! gate_constructors {
    ($name:ident,$($rest:ident),*) => {
        gate_constructors!($name);
        gate_constructors!($($rest),*);
    };
    ($name:ident) => {
        gate_constructors!(
            $name,
            concat!(
                "Returns the [ItemIndex] of a new `",
                stringify!($name),
                "` gate with unwired inputs. Inputs can be wired with [Scene::connect]\n\n",
                "Providing a good name allows for a great debugging experience, you can disable the \"debug_gates\" feature ",
                "to slightly increase performance"
            )
        );
    };
    ($name:ident,$doc0:expr) => {
        #[doc=$doc0]
        pub fn $name<S: Into<String>>(&mut self, name: S) -> ItemIndex {
            self.create_gate(pascal!($name), &[], name)
        }

        concat_idents!(name2 = $name, 2 {
            /// Returns the [ItemIndex] of a new gate with its inputs driven by the output pins `a` and `b`.
            ///
            /// A source that can't be connected is logged and its input left unwired.
            pub fn name2<S: Into<String>>(&mut self, a: PinIndex, b: PinIndex, name: S) -> ItemIndex {
                self.create_gate(pascal!($name), &[a, b], name)
            }
        });
    };
}

/// Anything that can be placed in a [Scene].
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Gate(Gate),
    Sensor(Sensor),
    Beam(Beam),
    Kicker(Kicker),
}

impl Item {
    /// Returns the [Gate] if the item is one.
    pub fn as_gate(&self) -> Option<&Gate> {
        match self {
            Item::Gate(gate) => Some(gate),
            _ => None,
        }
    }

    pub fn as_gate_mut(&mut self) -> Option<&mut Gate> {
        match self {
            Item::Gate(gate) => Some(gate),
            _ => None,
        }
    }

    /// Returns the input pins of the item in order.
    pub fn inputs(&self) -> &[PinIndex] {
        match self {
            Item::Gate(gate) => gate.inputs(),
            Item::Kicker(kicker) => kicker.inputs(),
            Item::Sensor(_) | Item::Beam(_) => &[],
        }
    }

    /// Returns the output pins of the item in order.
    pub fn outputs(&self) -> &[PinIndex] {
        match self {
            Item::Gate(gate) => gate.outputs(),
            Item::Sensor(sensor) => sensor.outputs(),
            Item::Beam(beam) => beam.outputs(),
            Item::Kicker(_) => &[],
        }
    }

    /// Returns every pin owned by the item, inputs first.
    pub fn pins(&self) -> impl Iterator<Item = PinIndex> + '_ {
        self.inputs().iter().chain(self.outputs().iter()).copied()
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Item::Gate(gate) => write!(f, "{}", gate.ty()),
            Item::Sensor(_) => write!(f, "Sensor"),
            Item::Beam(_) => write!(f, "Beam"),
            Item::Kicker(_) => write!(f, "Kicker"),
        }
    }
}

/// What happened during a [Scene::tick].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Gates in the order they were calculated.
    pub evaluated: Vec<ItemIndex>,
    /// Kickers that fired.
    pub kicks: Vec<ItemIndex>,
}

/// Data structure that owns every item of a level and the pins wiring them together.
///
/// Gates are created with the builder methods ([Scene::and2], [Scene::not1], [Scene::d_flip_flop]...),
/// devices with [Scene::sensor], [Scene::beam] and [Scene::kicker]. Every method returns the
/// [ItemIndex] of the new item, its pins can be looked up with [Scene::input] and [Scene::output].
///
/// Every call to [Scene::tick] orders the gates so that producers come before their consumers,
/// calculates each of them once and then lets the kickers look at their inputs.
///
/// # Examples
/// A sensor deciding which products get kicked.
/// ```
/// # use kickgates::{Color, Content, Product, Property, Scene, Shape};
/// let mut scene = Scene::new();
///
/// let sensor = scene.sensor(
///     vec![Property::Color(Color::Red), Property::Shape(Shape::Square)],
///     "sensor",
/// );
/// let red = scene.output(sensor, 0).unwrap();
/// let square = scene.output(sensor, 1).unwrap();
///
/// // Kick red squares.
/// let and = scene.and2(red, square, "red square");
/// let kicker = scene.kicker("kicker");
/// scene
///     .connect(scene.output(and, 0).unwrap(), scene.input(kicker, 0).unwrap())
///     .unwrap();
///
/// let product = Product::new(Color::Red, Shape::Circle, Content::None);
/// scene.sense(sensor, Some(&product)).unwrap();
/// assert!(scene.tick().unwrap().kicks.is_empty());
///
/// let product = Product::new(Color::Red, Shape::Square, Content::Izzo);
/// scene.sense(sensor, Some(&product)).unwrap();
/// assert_eq!(scene.tick().unwrap().kicks, vec![kicker]);
/// ```
///
/// Feedback loops are rejected, no gate is calculated.
/// ```
/// # use kickgates::{CircuitError, Scene};
/// let mut scene = Scene::new();
/// let a = scene.not("a");
/// let b = scene.not1(scene.output(a, 0).unwrap(), "b");
/// scene
///     .connect(scene.output(b, 0).unwrap(), scene.input(a, 0).unwrap())
///     .unwrap();
///
/// assert_eq!(
///     scene.tick(),
///     Err(CircuitError::CycleDetected { unsorted: vec![a, b] })
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scene {
    items: Slab<ItemIndex, Item>,
    /// Live items in creation order, slots of removed items are reused by [Slab].
    order: IndexSet<ItemIndex>,
    wiring: Wiring,
    #[cfg(feature = "debug_gates")]
    names: HashMap<ItemIndex, String>,
}

impl Scene {
    /// Returns a new empty [Scene].
    pub fn new() -> Scene {
        Default::default()
    }

    /// Creates the pins of a new gate of type `ty`, wires `sources` to its inputs in order and adds it.
    fn create_gate<S: Into<String>>(
        &mut self,
        ty: GateType,
        sources: &[PinIndex],
        name: S,
    ) -> ItemIndex {
        let idx = self.items.next_key();
        let inputs = (0..ty.input_count())
            .map(|_| self.wiring.insert(PinType::Input, idx, Unknown))
            .collect();
        let outputs = ty
            .initial_outputs()
            .iter()
            .map(|state| self.wiring.insert(PinType::Output, idx, *state))
            .collect();
        let gate = Gate::new(ty, inputs, outputs);

        for (input, source) in gate.inputs().iter().zip(sources) {
            if let Err(error) = self.wiring.connect(*source, *input) {
                tracing::warn!(%error, gate = %idx, "left gate input unwired");
            }
        }
        self.create_item(idx, Item::Gate(gate), name)
    }

    fn create_item<S: Into<String>>(&mut self, idx: ItemIndex, item: Item, name: S) -> ItemIndex {
        let inserted = self.items.insert(item);
        debug_assert_eq!(inserted, idx);
        self.order.insert(inserted);
        #[cfg(feature = "debug_gates")]
        self.names.insert(inserted, name.into());
        #[cfg(not(feature = "debug_gates"))]
        let _ = name;
        inserted
    }

    gate_constructors!(and, or, nand);

    /// Returns the [ItemIndex] of a new `not` gate with an unwired input.
    ///
    /// Providing a good name allows for a great debugging experience, you can disable the "debug_gates" feature
    /// to slightly increase performance.
    pub fn not<S: Into<String>>(&mut self, name: S) -> ItemIndex {
        self.create_gate(Not, &[], name)
    }

    /// Returns the [ItemIndex] of a new `not` gate with its input driven by the output pin `src`.
    pub fn not1<S: Into<String>>(&mut self, src: PinIndex, name: S) -> ItemIndex {
        self.create_gate(Not, &[src], name)
    }

    /// Returns the [ItemIndex] of a new D flip-flop with inputs (D, clock) and outputs (Q, Q').
    ///
    /// It starts with Q = [Zero], Q' = [One] and a low clock.
    pub fn d_flip_flop<S: Into<String>>(&mut self, name: S) -> ItemIndex {
        self.create_gate(DFlipFlop, &[], name)
    }

    /// Returns the [ItemIndex] of a new SR flip-flop with inputs (S, R) and outputs (Q, Q').
    ///
    /// It starts with Q = [Zero], Q' = [One].
    pub fn sr_flip_flop<S: Into<String>>(&mut self, name: S) -> ItemIndex {
        self.create_gate(SrFlipFlop, &[], name)
    }

    /// Returns the [ItemIndex] of a new sensor with one output pin per property, in order.
    ///
    /// Outputs start at [Zero], see [Scene::sense].
    pub fn sensor<S: Into<String>, I: IntoIterator<Item = Property>>(
        &mut self,
        properties: I,
        name: S,
    ) -> ItemIndex {
        let idx = self.items.next_key();
        let properties: SmallVec<[Property; SENSOR_PROPERTIES_TINYVEC_SIZE]> =
            properties.into_iter().collect();
        let outputs = properties
            .iter()
            .map(|_| self.wiring.insert(PinType::Output, idx, Zero))
            .collect();
        self.create_item(idx, Item::Sensor(Sensor::new(properties, outputs)), name)
    }

    /// Returns the [ItemIndex] of a new beam, its only output starts at [Zero].
    pub fn beam<S: Into<String>>(&mut self, name: S) -> ItemIndex {
        let idx = self.items.next_key();
        let output = self.wiring.insert(PinType::Output, idx, Zero);
        self.create_item(idx, Item::Beam(Beam::new(output)), name)
    }

    /// Returns the [ItemIndex] of a new kicker with an unwired input.
    pub fn kicker<S: Into<String>>(&mut self, name: S) -> ItemIndex {
        let idx = self.items.next_key();
        let input = self.wiring.insert(PinType::Input, idx, Unknown);
        self.create_item(idx, Item::Kicker(Kicker::new(input)), name)
    }

    /// Returns the `n`th input pin of `item`.
    pub fn input(&self, item: ItemIndex, n: usize) -> Option<PinIndex> {
        self.items.get(item)?.inputs().get(n).copied()
    }

    /// Returns the `n`th output pin of `item`.
    pub fn output(&self, item: ItemIndex, n: usize) -> Option<PinIndex> {
        self.items.get(item)?.outputs().get(n).copied()
    }

    /// Returns the item at `idx`, None if it has been removed.
    pub fn item(&self, idx: ItemIndex) -> Option<&Item> {
        self.items.get(idx)
    }

    /// Returns the gate at `idx`, None if there is no gate there.
    pub fn get_gate(&self, idx: ItemIndex) -> Option<&Gate> {
        self.items.get(idx).and_then(Item::as_gate)
    }

    /// Returns a reference to the [Gate] at `idx`.
    ///
    /// # Panics
    ///
    /// Will panic if there is no gate at `idx`.
    pub fn gate(&self, idx: ItemIndex) -> &Gate {
        unwrap!(self.get_gate(idx), "{} is not a gate of the scene", idx)
    }

    /// Returns a reference to the [Pin] at `idx`.
    ///
    /// # Panics
    ///
    /// Will panic if `idx` has been removed.
    pub fn pin(&self, idx: PinIndex) -> &Pin {
        unwrap!(self.wiring.get(idx), "{} is not a pin of the scene", idx)
    }

    /// Returns the pins of the scene.
    pub fn wiring(&self) -> &Wiring {
        &self.wiring
    }

    /// Returns the pins of the scene for rewiring or driving them by hand.
    pub fn wiring_mut(&mut self) -> &mut Wiring {
        &mut self.wiring
    }

    /// Connects output `from` to input `to`, see [Wiring::connect].
    pub fn connect(&mut self, from: PinIndex, to: PinIndex) -> Result<(), CircuitError> {
        self.wiring.connect(from, to)
    }

    /// Returns the gate owning the output pin that drives `input`, if any.
    pub fn source_gate(&self, input: PinIndex) -> Option<ItemIndex> {
        let producer = self.wiring.producer(input)?;
        let owner = self.wiring.get(producer)?.owner();
        self.get_gate(owner).map(|_| owner)
    }

    /// Removes `idx` and its pins from the scene.
    ///
    /// Inputs that were driven by the item read [Unknown] afterwards.
    pub fn remove(&mut self, idx: ItemIndex) -> Result<Item, CircuitError> {
        let unknown = CircuitError::UnknownItem(idx);
        let item = self.items.remove(idx).ok_or(unknown)?;
        self.order.shift_remove(&idx);
        for pin in item.pins() {
            self.wiring.remove(pin);
        }
        #[cfg(feature = "debug_gates")]
        self.names.remove(&idx);
        tracing::debug!(item = %idx, "removed item");
        Ok(item)
    }

    /// Removes every item and pin.
    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
        self.wiring.clear();
        #[cfg(feature = "debug_gates")]
        self.names.clear();
    }

    /// Returns the number of items in the scene.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the scene has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns an iterator over every item in creation order.
    ///
    /// A removed item's index can be handed out again, the new item still comes last.
    pub fn items(&self) -> impl Iterator<Item = (ItemIndex, &Item)> + '_ {
        self.order
            .iter()
            .filter_map(move |idx| self.items.get(*idx).map(|item| (*idx, item)))
    }

    /// Returns the indexes of every gate in creation order.
    pub fn gates(&self) -> Vec<ItemIndex> {
        self.items()
            .filter(|(_, item)| item.as_gate().is_some())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Drives the outputs of `sensor` for the product in front of it, `None` if there is none.
    pub fn sense(
        &mut self,
        sensor: ItemIndex,
        product: Option<&Product>,
    ) -> Result<(), CircuitError> {
        let item = match self.items.get(sensor) {
            Some(Item::Sensor(s)) => s,
            Some(_) => {
                return Err(CircuitError::NotA {
                    item: sensor,
                    expected: "sensor",
                })
            }
            None => return Err(CircuitError::UnknownItem(sensor)),
        };
        let readings: SmallVec<[_; SENSOR_PROPERTIES_TINYVEC_SIZE]> =
            item.readings(product).collect();
        for (pin, state) in readings {
            self.wiring.drive(pin, state);
        }
        Ok(())
    }

    /// Drives the output of `beam`, [One] while a product is `crossed` it.
    pub fn set_beam(&mut self, beam: ItemIndex, crossed: bool) -> Result<(), CircuitError> {
        let output = match self.items.get(beam) {
            Some(Item::Beam(b)) => b.output(),
            Some(_) => {
                return Err(CircuitError::NotA {
                    item: beam,
                    expected: "beam",
                })
            }
            None => return Err(CircuitError::UnknownItem(beam)),
        };
        self.wiring.drive(output, Beam::reading(crossed));
        Ok(())
    }

    /// Builds the [DependencyGraph] of every gate in the scene.
    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::build(self, &self.gates())
    }

    /// Calculates every gate once, producers before consumers, and returns the order used.
    ///
    /// The gates are sorted before any of them is calculated, if they can't be ordered
    /// [CircuitError::CycleDetected] is returned and the scene is left untouched.
    pub fn compute_all_gates(&mut self) -> Result<Vec<ItemIndex>, CircuitError> {
        let gates = self.gates();
        let order = DependencyGraph::build(self, &gates).topological_sort(&gates)?;
        tracing::debug!(gates = order.len(), "calculating gates");

        for idx in &order {
            if let Some(Item::Gate(gate)) = self.items.get_mut(*idx) {
                gate.calculate(&mut self.wiring);
                tracing::trace!(gate = %idx, ty = %gate.ty(), "calculated gate");
            }
        }
        Ok(order)
    }

    /// Runs a simulation step: [Scene::compute_all_gates] then every kicker polls its input.
    ///
    /// Independent gates are calculated and kickers polled in creation order.
    ///
    /// On a cycle nothing is calculated and no kicker is polled.
    pub fn tick(&mut self) -> Result<TickReport, CircuitError> {
        let evaluated = self.compute_all_gates()?;

        let kickers: Vec<_> = self
            .items()
            .filter(|(_, item)| matches!(item, Item::Kicker(_)))
            .map(|(idx, _)| idx)
            .collect();
        let mut kicks = Vec::new();
        for idx in kickers {
            if let Some(Item::Kicker(kicker)) = self.items.get_mut(idx) {
                let level = self.wiring.state(kicker.input()).unwrap_or(Unknown);
                if kicker.poll(level) {
                    tracing::debug!(kicker = %idx, "kick");
                    kicks.push(idx);
                }
            }
        }
        Ok(TickReport { evaluated, kicks })
    }

    /// "Probes" `pin`, meaning that whenever its state changes,
    /// the new state will be logged along with `name`.
    #[cfg(feature = "debug_gates")]
    pub fn probe<S: Into<String>>(&mut self, pin: PinIndex, name: S) -> Result<(), CircuitError> {
        self.wiring.probe(pin, name)
    }

    /// Returns the name of `item`.
    #[cfg(feature = "debug_gates")]
    pub fn name(&self, item: ItemIndex) -> Option<&str> {
        self.names.get(&item).map(String::as_str)
    }

    /// Returns the "full name" of `item` in format:
    ///
    /// "ITEM_TYPE:ITEM_NAME" if the "debug_gates" feature is enabled.
    ///
    /// "ITEM_TYPE:ITEM_INDEX" if the "debug_gates" feature is disabled.
    pub fn full_name(&self, item: ItemIndex) -> String {
        let ty = match self.items.get(item) {
            Some(i) => i.to_string(),
            None => return item.to_string(),
        };
        #[cfg(feature = "debug_gates")]
        if let Some(name) = self.names.get(&item) {
            return format!("{}:{}", ty, name);
        }
        format!("{}:{}", ty, item)
    }

    /// Dumps the gate dependency graph in [dot](https://en.wikipedia.org/wiki/DOT_(graph_description_language))
    /// format to `writer`, to be visualized by many supported tools.
    pub fn dump_dot<W: Write>(&self, writer: W) -> io::Result<()> {
        self.dependency_graph().dump_dot(self, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{Color, Content, Shape};

    fn out(scene: &Scene, item: ItemIndex) -> PinIndex {
        scene.output(item, 0).unwrap()
    }

    fn state(scene: &Scene, pin: PinIndex) -> PinState {
        scene.wiring().state(pin).unwrap()
    }

    #[test]
    fn test_constructors() {
        let mut g = Scene::new();
        let and = g.and("and");
        let d = g.d_flip_flop("d");
        let sensor = g.sensor(
            vec![
                Property::Color(Color::Red),
                Property::Content(Content::None),
            ],
            "sensor",
        );
        let kicker = g.kicker("kicker");

        assert_eq!(g.len(), 4);
        assert_eq!(g.gates(), vec![and, d]);
        assert_eq!(g.gate(and).ty(), And);
        assert_eq!(state(&g, out(&g, and)), Unknown);
        assert_eq!(state(&g, g.output(d, 0).unwrap()), Zero);
        assert_eq!(state(&g, g.output(d, 1).unwrap()), One);
        assert_eq!(g.item(sensor).unwrap().outputs().len(), 2);
        assert_eq!(g.input(kicker, 1), None);
        assert_eq!(g.pin(g.input(kicker, 0).unwrap()).owner(), kicker);
        assert_eq!(g.wiring().len(), 3 + 4 + 2 + 1);
    }

    #[test]
    fn test_wired_constructors() {
        let mut g = Scene::new();
        let beam = g.beam("beam");
        let not = g.not1(out(&g, beam), "not");
        let or = g.or2(out(&g, beam), out(&g, not), "or");

        assert_eq!(
            g.wiring().producer(g.input(or, 1).unwrap()),
            Some(out(&g, not))
        );
        assert_eq!(g.source_gate(g.input(or, 1).unwrap()), Some(not));
        assert_eq!(g.source_gate(g.input(or, 0).unwrap()), None);
        assert_eq!(state(&g, g.input(not, 0).unwrap()), Zero);
    }

    #[test]
    fn test_bad_source_leaves_input_unwired() {
        let mut g = Scene::new();
        let kicker = g.kicker("kicker");
        let not = g.not1(g.input(kicker, 0).unwrap(), "not");
        assert_eq!(g.wiring().producer(g.input(not, 0).unwrap()), None);
    }

    #[test]
    fn test_chain_settles_in_one_tick() {
        let mut g = Scene::new();
        // Created consumers first so that index order is not evaluation order.
        let last = g.not("last");
        let middle = g.not("middle");
        let beam = g.beam("beam");
        let first = g.not1(out(&g, beam), "first");
        g.connect(out(&g, first), g.input(middle, 0).unwrap())
            .unwrap();
        g.connect(out(&g, middle), g.input(last, 0).unwrap())
            .unwrap();

        let report = g.tick().unwrap();
        assert_eq!(report.evaluated, vec![first, middle, last]);
        assert_eq!(state(&g, out(&g, last)), One);

        g.set_beam(beam, true).unwrap();
        g.tick().unwrap();
        assert_eq!(state(&g, out(&g, last)), Zero);
    }

    #[test]
    fn test_cycle_evaluates_nothing() {
        let mut g = Scene::new();
        let beam = g.beam("beam");
        let free = g.not1(out(&g, beam), "free");
        let a = g.and("a");
        let b = g.or2(out(&g, a), out(&g, a), "b");
        g.connect(out(&g, b), g.input(a, 0).unwrap()).unwrap();

        assert_eq!(
            g.tick(),
            Err(CircuitError::CycleDetected {
                unsorted: vec![a, b]
            })
        );
        assert_eq!(state(&g, out(&g, free)), Unknown);
    }

    #[test]
    fn test_flip_flop_feedback_is_a_cycle() {
        let mut g = Scene::new();
        let d = g.d_flip_flop("d");
        g.connect(g.output(d, 1).unwrap(), g.input(d, 0).unwrap())
            .unwrap();
        assert!(g.compute_all_gates().is_err());
    }

    #[test]
    fn test_sensor_drives_gates() {
        let mut g = Scene::new();
        let sensor = g.sensor(
            vec![
                Property::Shape(Shape::Diamond),
                Property::Content(Content::Basketball),
            ],
            "sensor",
        );
        let nand = g.nand2(out(&g, sensor), g.output(sensor, 1).unwrap(), "nand");

        let product = Product::new(Color::White, Shape::Diamond, Content::Basketball);
        g.sense(sensor, Some(&product)).unwrap();
        g.tick().unwrap();
        assert_eq!(state(&g, out(&g, nand)), Zero);

        g.sense(sensor, None).unwrap();
        g.tick().unwrap();
        assert_eq!(state(&g, out(&g, nand)), One);

        assert_eq!(
            g.sense(nand, None),
            Err(CircuitError::NotA {
                item: nand,
                expected: "sensor"
            })
        );
    }

    #[test]
    fn test_kicker_fires_once_per_rising_level() {
        let mut g = Scene::new();
        let beam = g.beam("beam");
        let kicker = g.kicker("kicker");
        g.connect(out(&g, beam), g.input(kicker, 0).unwrap())
            .unwrap();

        assert!(g.tick().unwrap().kicks.is_empty());
        g.set_beam(beam, true).unwrap();
        assert_eq!(g.tick().unwrap().kicks, vec![kicker]);
        assert!(g.tick().unwrap().kicks.is_empty());
        g.set_beam(beam, false).unwrap();
        assert!(g.tick().unwrap().kicks.is_empty());
        g.set_beam(beam, true).unwrap();
        assert_eq!(g.tick().unwrap().kicks, vec![kicker]);
    }

    #[test]
    fn test_d_flip_flop_in_scene() {
        let mut g = Scene::new();
        let data = g.beam("data");
        let clock = g.beam("clock");
        let d = g.d_flip_flop("d");
        g.connect(out(&g, data), g.input(d, 0).unwrap()).unwrap();
        g.connect(out(&g, clock), g.input(d, 1).unwrap()).unwrap();
        let q = g.output(d, 0).unwrap();

        g.set_beam(data, true).unwrap();
        g.tick().unwrap();
        assert_eq!(state(&g, q), Zero);

        g.set_beam(clock, true).unwrap();
        g.tick().unwrap();
        assert_eq!(state(&g, q), One);

        g.set_beam(data, false).unwrap();
        g.tick().unwrap();
        assert_eq!(state(&g, q), One);
    }

    #[test]
    fn test_remove_severs_connections() {
        let mut g = Scene::new();
        let beam = g.beam("beam");
        let not = g.not1(out(&g, beam), "not");
        let and = g.and2(out(&g, not), out(&g, beam), "and");
        g.tick().unwrap();
        let input = g.input(and, 0).unwrap();
        assert_eq!(state(&g, input), One);

        let removed = g.remove(not).unwrap();
        assert!(removed.as_gate().is_some());
        assert_eq!(state(&g, input), Unknown);
        assert_eq!(g.wiring().producer(input), None);
        assert_eq!(
            g.pin(out(&g, beam)).connected_pins(),
            &[g.input(and, 1).unwrap()]
        );
        assert_eq!(g.remove(not), Err(CircuitError::UnknownItem(not)));
        assert_eq!(g.tick().unwrap().evaluated, vec![and]);
    }

    #[test]
    fn test_reused_index_keeps_creation_order() {
        let mut g = Scene::new();
        let a = g.not("a");
        let b = g.not("b");
        let kicker = g.kicker("kicker");
        g.remove(a).unwrap();
        let c = g.not("c");

        assert_eq!(c, a);
        assert_eq!(g.gates(), vec![b, c]);
        let items: Vec<_> = g.items().map(|(idx, _)| idx).collect();
        assert_eq!(items, vec![b, kicker, c]);
        assert_eq!(g.tick().unwrap().evaluated, vec![b, c]);
    }

    #[test]
    fn test_clear() {
        let mut g = Scene::new();
        let beam = g.beam("beam");
        g.not1(out(&g, beam), "not");
        g.clear();
        assert!(g.is_empty());
        assert!(g.wiring().is_empty());
        assert_eq!(g.tick(), Ok(TickReport::default()));
    }

    #[test]
    fn test_full_name() {
        let mut g = Scene::new();
        let nand = g.nand("my nand");
        #[cfg(feature = "debug_gates")]
        assert_eq!(g.full_name(nand), "Nand:my nand");
        #[cfg(not(feature = "debug_gates"))]
        assert_eq!(g.full_name(nand), format!("Nand:{}", nand));
    }

    #[cfg(feature = "debug_gates")]
    #[test]
    fn test_watched_pin_bookkeeping() {
        let mut g = Scene::new();
        let beam = g.beam("beam");
        let out = out(&g, beam);
        g.probe(out, "beam out").unwrap();
        g.set_beam(beam, true).unwrap();
        assert_eq!(g.name(beam), Some("beam"));
        g.remove(beam).unwrap();
        assert_eq!(g.name(beam), None);
        assert_eq!(g.probe(out, "gone"), Err(CircuitError::UnknownPin(out)));
    }

    /// Collects everything the fmt subscriber writes.
    #[cfg(feature = "debug_gates")]
    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    #[cfg(feature = "debug_gates")]
    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[cfg(feature = "debug_gates")]
    #[test]
    fn test_watched_pin_logs_every_change() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();

        let mut g = Scene::new();
        let beam = g.beam("beam");
        let not = g.not1(out(&g, beam), "not");
        g.probe(out(&g, not), "inverted").unwrap();

        tracing::subscriber::with_default(subscriber, || {
            g.tick().unwrap();
            g.tick().unwrap();
            g.set_beam(beam, true).unwrap();
            g.tick().unwrap();
        });

        let bytes = captured.0.lock().unwrap().clone();
        let logs = String::from_utf8(bytes).unwrap();
        assert_eq!(logs.matches("probe changed").count(), 2, "{}", logs);
        assert!(logs.contains("probe=inverted"), "{}", logs);
        assert!(logs.contains("state=One"), "{}", logs);
        assert!(logs.contains("state=Zero"), "{}", logs);
    }
}
