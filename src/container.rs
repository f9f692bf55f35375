use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use log::debug;

use crate::graph::{BooleanGraph, Gate, GateType, State};
use crate::settings::Settings;
use crate::vertex::{SetNode, Vertex};
use crate::zbdd::{Operator, Zbdd};

/// Storage for generated cut sets in MOCUS.
///
/// The semantics is a mutable set of cut sets over a ZBDD: gates enter as
/// proxy literals and get expanded one at a time until only basic events and
/// module proxies remain. Gate indices are distinguished from variables by an
/// exclusive lower bound; gates must never appear complemented.
pub struct CutSetContainer {
    zbdd: Zbdd,
    gate_index_bound: i32,
}

impl CutSetContainer {
    /// Creates an empty container.
    ///
    /// `gate_index_bound` is the exclusive lower bound of gate indices;
    /// basic events are indexed at or below it.
    pub fn new(settings: &Settings, gate_index_bound: i32) -> Self {
        Self {
            zbdd: Zbdd::with_settings(*settings),
            gate_index_bound,
        }
    }

    pub fn root(&self) -> &Vertex {
        self.zbdd.root()
    }

    fn limit_order(&self) -> i32 {
        self.zbdd.settings().limit_order()
    }

    fn is_gate(&self, node: &SetNode) -> bool {
        node.index() > self.gate_index_bound
    }

    pub(crate) fn into_parts(self) -> (Vertex, HashMap<i32, Vertex>, u64) {
        self.zbdd.into_parts()
    }

    /// Converts a Boolean graph gate into intermediate cut sets.
    ///
    /// Arguments are treated as single literals: variables stay variables and
    /// gate arguments become proxy literals for later expansion. The literals
    /// are folded by the gate operator from the deepest order up.
    pub fn convert_gate(&mut self, gate: &Gate, graph: &BooleanGraph) -> Vertex {
        assert!(!gate.is_constant(), "Constant gates do not enter cut sets");
        let mut args: Vec<(i32, Vertex)> = Vec::with_capacity(gate.num_args());
        for &literal in gate.variable_args() {
            let order = graph.variable_order(literal);
            args.push((order, self.zbdd.single_literal(literal, order, false)));
        }
        for &child_index in gate.gate_args() {
            let child = graph.gate(child_index);
            if child.is_constant() {
                let terminal = match child.state() {
                    State::Unity => Vertex::base(),
                    State::Null => Vertex::empty(),
                    State::Normal => unreachable!(),
                };
                args.push((i32::MAX, terminal));
                continue;
            }
            let literal = self.zbdd.single_literal(child_index, child.order(), child.is_module());
            args.push((child.order(), literal));
        }
        args.sort_by_key(|(order, _)| std::cmp::Reverse(*order));
        let op = match gate.gate_type() {
            GateType::And => Operator::And,
            GateType::Or | GateType::Null => Operator::Or,
        };
        let mut args = args.into_iter().map(|(_, vertex)| vertex);
        let first = args.next().expect("Gates carry arguments");
        args.fold(first, |result, arg| {
            let limit = self.limit_order();
            self.zbdd.apply(op, &result, &arg, limit)
        })
    }

    /// Finds a gate in the intermediate cut sets and marks the path to it.
    ///
    /// Returns 0 when only variables and module proxies remain. Marks must be
    /// clear before the call; extraction consumes the marked path.
    pub fn get_next_gate(&self) -> i32 {
        let mut gate_free = HashSet::new();
        self.find_gate(self.zbdd.root(), &mut gate_free)
    }

    fn find_gate(&self, vertex: &Vertex, gate_free: &mut HashSet<u64>) -> i32 {
        let node = match vertex {
            Vertex::Terminal(_) => return 0,
            Vertex::Node(node) => node,
        };
        if gate_free.contains(&node.id()) {
            return 0;
        }
        let found = if self.is_gate(node) && !node.module() {
            node.index()
        } else {
            let in_high = self.find_gate(&node.high(), gate_free);
            if in_high != 0 {
                in_high
            } else {
                self.find_gate(&node.low(), gate_free)
            }
        };
        if found != 0 {
            node.set_mark(true);
        } else {
            gate_free.insert(node.id());
        }
        found
    }

    /// Extracts the intermediate cut sets containing the marked gate and
    /// removes its literal from them. The remainder becomes the new root.
    ///
    /// Sets reaching the gate through unmarked paths stay behind for a later
    /// round. The marked path is cleaned on the way.
    pub fn extract_intermediate_cut_sets(&mut self, index: i32) -> Vertex {
        debug!("Extracting cut sets with gate {}", index);
        let root = Rc::clone(self.zbdd.root().node());
        let (extracted, remainder) = self.extract(&root, index);
        self.zbdd.set_root(remainder);
        extracted
    }

    fn extract(&mut self, node: &Rc<SetNode>, index: i32) -> (Vertex, Vertex) {
        node.set_mark(false);
        if node.index() == index {
            return (node.high(), node.low());
        }
        let high = node.high();
        let low = node.low();
        let is_marked = |vertex: &Vertex| vertex.as_node().map_or(false, |node| node.mark());
        if is_marked(&high) {
            let branch = Rc::clone(high.node());
            let (extracted, remainder) = self.extract(&branch, index);
            let extracted =
                self.zbdd
                    .fetch_reduced(node.index(), &extracted, &Vertex::empty(), node.order(), node.module());
            let remainder = self
                .zbdd
                .fetch_reduced(node.index(), &remainder, &low, node.order(), node.module());
            (extracted, remainder)
        } else {
            assert!(is_marked(&low), "The marked path to gate {} is broken", index);
            let branch = Rc::clone(low.node());
            let (extracted, remainder) = self.extract(&branch, index);
            let remainder = self
                .zbdd
                .fetch_reduced(node.index(), &high, &remainder, node.order(), node.module());
            (extracted, remainder)
        }
    }

    /// Expands a gate into the cut sets that contained its literal.
    pub fn expand_gate(&mut self, gate_zbdd: &Vertex, cut_sets: &Vertex) -> Vertex {
        let limit = self.limit_order();
        self.zbdd.apply(Operator::And, gate_zbdd, cut_sets, limit)
    }

    /// Merges cut sets into the container.
    pub fn merge(&mut self, vertex: Vertex) {
        let limit = self.limit_order();
        let root = self.zbdd.root().clone();
        let root = self.zbdd.apply(Operator::Or, &root, &vertex, limit);
        self.zbdd.set_root(root);
        self.zbdd.clear_compute_tables();
    }

    /// Removes all complement literals from the cut sets.
    ///
    /// Only needed when the source graph is non-coherent.
    pub fn eliminate_complements(&mut self) {
        debug!("Eliminating complements from the cut sets...");
        self.zbdd.eliminate_complements_in_root();
    }

    /// Minimizes the cut sets under subset inclusion.
    pub fn minimize(&mut self) {
        let root = self.zbdd.root().clone();
        let root = self.zbdd.minimize(&root);
        self.zbdd.set_root(root);
    }

    /// The indices of module proxies reachable from the root.
    pub fn gather_modules(&self) -> Vec<i32> {
        let mut visited = HashSet::new();
        let mut found = BTreeSet::new();
        gather(self.zbdd.root(), &mut visited, &mut found);
        found.into_iter().collect()
    }

    /// Installs the final cut sets of a module.
    ///
    /// The module container must be fully analyzed: minimal, sanitized, and
    /// never processed again. Its own modules transfer along.
    pub fn join_module(&mut self, index: i32, container: CutSetContainer) {
        debug!("Joining module {}", index);
        let (root, modules, _) = container.into_parts();
        self.zbdd.modules_mut().extend(modules);
        self.zbdd.modules_mut().insert(index, root);
    }

    /// Inlines modules that collapsed to constants after joining.
    ///
    /// A Unity module drops its proxy literal; an Empty module erases the
    /// sets that contained it. The pass leaves no terminal module entries.
    pub fn sanitize(&mut self) {
        let root = self.zbdd.root().clone();
        let mut results = HashMap::new();
        let root = self.sanitize_vertex(&root, &mut results);
        // Module subgraphs may hold proxies of constant sub-modules.
        let indices: Vec<i32> = self.zbdd.modules().keys().copied().collect();
        for index in indices {
            let module = self.zbdd.modules()[&index].clone();
            let module = self.sanitize_vertex(&module, &mut results);
            if module.is_terminal() {
                self.zbdd.modules_mut().remove(&index);
            } else {
                let module = self.zbdd.minimize(&module);
                self.zbdd.modules_mut().insert(index, module);
            }
        }
        let root = self.zbdd.minimize(&root);
        self.zbdd.set_root(root);
    }

    fn sanitize_vertex(&mut self, vertex: &Vertex, results: &mut HashMap<u64, Vertex>) -> Vertex {
        let node = match vertex {
            Vertex::Terminal(_) => return vertex.clone(),
            Vertex::Node(node) => Rc::clone(node),
        };
        if let Some(result) = results.get(&vertex.id()) {
            return result.clone();
        }
        let high = self.sanitize_vertex(&node.high(), results);
        let low = self.sanitize_vertex(&node.low(), results);
        let result = if node.module() {
            let module = self.zbdd.modules().get(&node.index()).cloned();
            match module {
                Some(module) => {
                    let module = self.sanitize_vertex(&module, results);
                    if module.is_empty() {
                        low
                    } else if module.is_base() {
                        let limit = self.limit_order();
                        self.zbdd.apply(Operator::Or, &high, &low, limit)
                    } else {
                        self.zbdd.modules_mut().insert(node.index(), module);
                        self.zbdd.fetch_reduced(node.index(), &high, &low, node.order(), true)
                    }
                }
                // An unjoined proxy means the caller is not done; leave it.
                None => self.zbdd.fetch_reduced(node.index(), &high, &low, node.order(), true),
            }
        } else {
            self.zbdd
                .fetch_reduced(node.index(), &high, &low, node.order(), node.module())
        };
        results.insert(vertex.id(), result.clone());
        result
    }

    /// Checks the underlying ZBDD for structural errors.
    pub fn test_structure(&self) {
        self.zbdd.test_structure();
    }
}

fn gather(vertex: &Vertex, visited: &mut HashSet<u64>, found: &mut BTreeSet<i32>) {
    let node = match vertex {
        Vertex::Terminal(_) => return,
        Vertex::Node(node) => node,
    };
    if !visited.insert(node.id()) {
        return;
    }
    if node.module() {
        found.insert(node.index());
    }
    gather(&node.high(), visited, found);
    gather(&node.low(), visited, found);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level_graph() -> BooleanGraph {
        // g4 = OR(g5, C), g5 = AND(A, B)
        let mut graph = BooleanGraph::new(3);
        graph.add_gate(4, GateType::Or);
        graph.add_gate(5, GateType::And);
        graph.add_variable_arg(5, 1);
        graph.add_variable_arg(5, 2);
        graph.add_gate_arg(4, 5);
        graph.add_variable_arg(4, 3);
        graph.set_root(4);
        graph
    }

    #[test]
    fn test_convert_gate_keeps_gate_literal() {
        let graph = two_level_graph();
        let settings = Settings::new().with_limit_order(3);
        let mut container = CutSetContainer::new(&settings, graph.gate_index_bound());
        let seed = container.convert_gate(graph.root_gate(), &graph);
        container.merge(seed);
        let next = container.get_next_gate();
        assert_eq!(next, 5);
    }

    #[test]
    fn test_extract_and_expand() {
        let graph = two_level_graph();
        let settings = Settings::new().with_limit_order(3);
        let mut container = CutSetContainer::new(&settings, graph.gate_index_bound());
        let seed = container.convert_gate(graph.root_gate(), &graph);
        container.merge(seed);

        let next = container.get_next_gate();
        let extracted = container.extract_intermediate_cut_sets(next);
        let gate_zbdd = container.convert_gate(graph.gate(next), &graph);
        let expanded = container.expand_gate(&gate_zbdd, &extracted);
        container.merge(expanded);

        assert_eq!(container.get_next_gate(), 0);
        container.minimize();
        container.test_structure();
    }

    #[test]
    fn test_gather_modules() {
        // g4 = OR(A, g5) where g5 = AND(B, C) is a module.
        let mut graph = BooleanGraph::new(3);
        graph.add_gate(4, GateType::Or);
        graph.add_gate(5, GateType::And);
        graph.set_module(5);
        graph.add_variable_arg(4, 1);
        graph.add_gate_arg(4, 5);
        graph.add_variable_arg(5, 2);
        graph.add_variable_arg(5, 3);
        graph.set_root(4);

        let settings = Settings::new().with_limit_order(3);
        let mut container = CutSetContainer::new(&settings, graph.gate_index_bound());
        let seed = container.convert_gate(graph.root_gate(), &graph);
        container.merge(seed);
        assert_eq!(container.get_next_gate(), 0, "A module proxy is not an expandable gate");
        assert_eq!(container.gather_modules(), vec![5]);
    }
}
