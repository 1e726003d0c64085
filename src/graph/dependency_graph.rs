use super::error::CircuitError;
use super::handles::*;
use super::scene::Scene;
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::io::{self, Write};

/// Amount of dependents kept in the stack for a gate.
const DEPENDENTS_TINYVEC_SIZE: usize = 2;

/// Producer → consumer graph of the gates of a [Scene], rebuilt from the wiring every tick.
///
/// An edge A → B exists once for every input pin of B driven by an output pin of A.
/// Gates are kept in the order they were handed to [DependencyGraph::build], which makes
/// the sort deterministic.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    dependents: IndexMap<ItemIndex, SmallVec<[ItemIndex; DEPENDENTS_TINYVEC_SIZE]>>,
    in_degrees: IndexMap<ItemIndex, usize>,
}

impl DependencyGraph {
    /// Builds the graph of `gates` from the current wiring of `scene`.
    ///
    /// Inputs driven by devices or by gates not in `gates` add no edge.
    pub fn build(scene: &Scene, gates: &[ItemIndex]) -> Self {
        let members: IndexSet<ItemIndex> = gates.iter().copied().collect();
        let mut graph = DependencyGraph::default();

        for gate in &members {
            graph.in_degrees.entry(*gate).or_insert(0);
            graph.dependents.entry(*gate).or_default();
        }

        for gate in &members {
            let inputs = match scene.get_gate(*gate) {
                Some(g) => g.inputs(),
                None => continue,
            };
            for input in inputs {
                let source = match scene.source_gate(*input) {
                    Some(source) if members.contains(&source) => source,
                    _ => continue,
                };
                graph.dependents.entry(source).or_default().push(*gate);
                *graph.in_degrees.entry(*gate).or_insert(0) += 1;
            }
        }

        tracing::debug!(
            gates = graph.len(),
            edges = graph.edge_count(),
            "built dependency graph"
        );
        graph
    }

    /// Returns the number of gates in the graph.
    pub fn len(&self) -> usize {
        self.in_degrees.len()
    }

    /// Returns true if the graph has no gates.
    pub fn is_empty(&self) -> bool {
        self.in_degrees.is_empty()
    }

    /// Returns the number of edges, counting parallel edges.
    pub fn edge_count(&self) -> usize {
        self.dependents.values().map(|d| d.len()).sum()
    }

    /// Returns the gates consuming an output of `gate`, once per connected input.
    pub fn dependents(&self, gate: ItemIndex) -> &[ItemIndex] {
        self.dependents
            .get(&gate)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the number of inputs of `gate` driven by other gates of the graph.
    pub fn in_degree(&self, gate: ItemIndex) -> usize {
        self.in_degrees.get(&gate).copied().unwrap_or(0)
    }

    /// Returns `gates` ordered so that every producer comes before its consumers (Kahn's algorithm).
    ///
    /// Only edges between members of `gates` are followed, so any subset of the gates the graph
    /// was built from can be sorted. Gates that are ready at the same time keep the order in
    /// which they became ready, starting from their order in `gates`.
    ///
    /// Returns [CircuitError::CycleDetected] with the gates that could not be ordered if
    /// the graph has a feedback loop.
    pub fn topological_sort(&self, gates: &[ItemIndex]) -> Result<Vec<ItemIndex>, CircuitError> {
        let members: IndexSet<ItemIndex> = gates.iter().copied().collect();
        let mut in_degrees: IndexMap<ItemIndex, usize> =
            members.iter().map(|gate| (*gate, 0)).collect();
        for gate in &members {
            for dependent in self.dependents(*gate) {
                if let Some(degree) = in_degrees.get_mut(dependent) {
                    *degree += 1;
                }
            }
        }

        let mut sorted = Vec::with_capacity(in_degrees.len());
        let mut ready: VecDeque<ItemIndex> = in_degrees
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(gate, _)| *gate)
            .collect();

        while let Some(current) = ready.pop_front() {
            sorted.push(current);
            for dependent in self.dependents(current) {
                if let Some(degree) = in_degrees.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(*dependent);
                    }
                }
            }
        }

        if sorted.len() < in_degrees.len() {
            let unsorted: Vec<_> = in_degrees
                .iter()
                .filter(|(_, degree)| **degree > 0)
                .map(|(gate, _)| *gate)
                .collect();
            debug_assert!(!unsorted.is_empty());
            tracing::warn!(
                sorted = sorted.len(),
                gates = in_degrees.len(),
                "cycle detected in the gate dependency graph"
            );
            return Err(CircuitError::CycleDetected { unsorted });
        }
        Ok(sorted)
    }

    /// Dumps the graph in [dot](https://en.wikipedia.org/wiki/DOT_(graph_description_language)) format
    /// to `writer`, labeling every gate with its full name in `scene`.
    pub fn dump_dot<W: Write>(&self, scene: &Scene, mut writer: W) -> io::Result<()> {
        use petgraph::dot::{Config, Dot};
        let mut graph = petgraph::Graph::<_, ()>::new();
        let mut index = IndexMap::new();
        for gate in self.in_degrees.keys() {
            index.insert(*gate, graph.add_node(scene.full_name(*gate)));
        }
        for (gate, dependents) in &self.dependents {
            graph.extend_with_edges(
                dependents
                    .iter()
                    .map(|dependent| (index[gate], index[dependent])),
            );
        }
        write!(
            writer,
            "{:?}",
            Dot::with_config(&graph, &[Config::EdgeNoLabel])
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(scene: &Scene, item: ItemIndex) -> PinIndex {
        scene.output(item, 0).unwrap()
    }

    #[test]
    fn test_chain_is_sorted_producer_first() {
        let mut scene = Scene::new();
        let g3 = scene.not("g3");
        let g1 = scene.not("g1");
        let g2 = scene.not1(out(&scene, g1), "g2");
        scene
            .connect(out(&scene, g2), scene.input(g3, 0).unwrap())
            .unwrap();

        let gates = scene.gates();
        let graph = DependencyGraph::build(&scene, &gates);
        assert_eq!(graph.in_degree(g3), 1);
        assert_eq!(graph.dependents(g1), &[g2]);
        assert_eq!(graph.topological_sort(&gates), Ok(vec![g1, g2, g3]));
    }

    #[test]
    fn test_ready_gates_keep_insertion_order() {
        let mut scene = Scene::new();
        let a = scene.not("a");
        let b = scene.not("b");
        let c = scene.and2(out(&scene, a), out(&scene, b), "c");
        let d = scene.not("d");

        let gates = scene.gates();
        let graph = DependencyGraph::build(&scene, &gates);
        assert_eq!(graph.topological_sort(&gates), Ok(vec![a, b, d, c]));
    }

    #[test]
    fn test_parallel_edges() {
        let mut scene = Scene::new();
        let a = scene.not("a");
        let b = scene.nand2(out(&scene, a), out(&scene, a), "b");

        let gates = scene.gates();
        let graph = DependencyGraph::build(&scene, &gates);
        assert_eq!(graph.in_degree(b), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.topological_sort(&gates), Ok(vec![a, b]));
    }

    #[test]
    fn test_sort_a_subset_of_the_graph() {
        let mut scene = Scene::new();
        let a = scene.not("a");
        let b = scene.not1(out(&scene, a), "b");
        let c = scene.not1(out(&scene, b), "c");
        scene
            .connect(out(&scene, c), scene.input(b, 0).unwrap())
            .unwrap();

        let graph = DependencyGraph::build(&scene, &[a, b, c]);
        assert_eq!(graph.topological_sort(&[a]), Ok(vec![a]));
        assert_eq!(graph.topological_sort(&[c, a]), Ok(vec![c, a]));
        assert_eq!(
            graph.topological_sort(&[a, b, c]),
            Err(CircuitError::CycleDetected {
                unsorted: vec![b, c]
            })
        );
    }

    #[test]
    fn test_sort_ignores_edges_leaving_the_subset() {
        let mut scene = Scene::new();
        let a = scene.not("a");
        let b = scene.not1(out(&scene, a), "b");
        let c = scene.not1(out(&scene, b), "c");

        let graph = DependencyGraph::build(&scene, &[a, b, c]);
        assert_eq!(graph.topological_sort(&[c, b]), Ok(vec![b, c]));
        assert_eq!(graph.topological_sort(&[c, a]), Ok(vec![c, a]));
    }

    #[test]
    fn test_devices_add_no_edges() {
        let mut scene = Scene::new();
        let beam = scene.beam("beam");
        let not = scene.not1(out(&scene, beam), "not");

        let gates = scene.gates();
        let graph = DependencyGraph::build(&scene, &gates);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.in_degree(not), 0);
    }

    #[test]
    fn test_cycle_is_detected() {
        let mut scene = Scene::new();
        let head = scene.not("head");
        let a = scene.not1(out(&scene, head), "a");
        let b = scene.not1(out(&scene, a), "b");
        let tail = scene.not1(out(&scene, b), "tail");
        scene
            .connect(out(&scene, b), scene.input(a, 0).unwrap())
            .unwrap();

        let gates = scene.gates();
        let graph = DependencyGraph::build(&scene, &gates);
        assert_eq!(
            graph.topological_sort(&gates),
            Err(CircuitError::CycleDetected {
                unsorted: vec![a, b, tail]
            })
        );
        assert_eq!(graph.in_degree(head), 0);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let mut scene = Scene::new();
        let n = scene.not("n");
        scene
            .connect(out(&scene, n), scene.input(n, 0).unwrap())
            .unwrap();

        let gates = scene.gates();
        let graph = DependencyGraph::build(&scene, &gates);
        assert!(graph.topological_sort(&gates).is_err());
    }

    #[test]
    fn test_empty_graph() {
        let scene = Scene::new();
        let graph = DependencyGraph::build(&scene, &[]);
        assert!(graph.is_empty());
        assert_eq!(graph.topological_sort(&[]), Ok(vec![]));
    }

    #[test]
    fn test_dump_dot() {
        let mut scene = Scene::new();
        let a = scene.not("first");
        scene.not1(out(&scene, a), "second");

        let gates = scene.gates();
        let graph = DependencyGraph::build(&scene, &gates);
        let mut dot = Vec::new();
        graph.dump_dot(&scene, &mut dot).unwrap();
        let dot = String::from_utf8(dot).unwrap();

        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("0 -> 1"));
        #[cfg(feature = "debug_gates")]
        assert!(dot.contains("Not:first"));
    }
}
