use log::debug;

use crate::container::CutSetContainer;
use crate::graph::{BooleanGraph, Gate};
use crate::settings::Settings;
use crate::zbdd::Zbdd;

/// An explicit cut set produced by MOCUS: basic event literals plus the
/// indices of unexpanded modules.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CutSet {
    literals: Vec<i32>,
    modules: Vec<i32>,
}

impl CutSet {
    pub fn new(literals: impl IntoIterator<Item = i32>, modules: impl IntoIterator<Item = i32>) -> Self {
        let mut literals: Vec<i32> = literals.into_iter().collect();
        let mut modules: Vec<i32> = modules.into_iter().collect();
        assert!(literals.iter().all(|&literal| literal != 0), "Literal indices are non-zero");
        assert!(modules.iter().all(|&module| module > 0), "Module indices are positive");
        literals.sort_unstable();
        modules.sort_unstable();
        Self { literals, modules }
    }

    /// Ordered literal indices; negative values are complements.
    pub fn literals(&self) -> &[i32] {
        &self.literals
    }

    /// Ordered module indices.
    pub fn modules(&self) -> &[i32] {
        &self.modules
    }

    /// The total number of literals and modules.
    pub fn size(&self) -> usize {
        self.literals.len() + self.modules.len()
    }

    /// The contribution to cut set cardinality: positive literals and
    /// modules. Complements do not occur in final cut sets.
    pub fn order(&self) -> i32 {
        let positive = self.literals.iter().filter(|&&literal| literal > 0).count();
        (positive + self.modules.len()) as i32
    }

    /// true for the Unity cut set.
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty() && self.modules.is_empty()
    }
}

/// MOCUS: cut set generation by one-at-a-time gate expansion.
///
/// The driver seeds a [`CutSetContainer`] with the root gate, expands gate
/// literals until only basic events and module proxies remain, solves each
/// module the same way, and joins the results. The assembled ZBDD is handed
/// back for [`Zbdd::analyze`].
pub struct Mocus<'a> {
    graph: &'a BooleanGraph,
    settings: Settings,
}

impl<'a> Mocus<'a> {
    pub fn new(graph: &'a BooleanGraph, settings: &Settings) -> Self {
        graph.validate();
        Self {
            graph,
            settings: *settings,
        }
    }

    /// Generates the cut sets of the fault tree as a ZBDD.
    pub fn analyze(&self) -> Zbdd {
        debug!("Analyzing the fault tree with MOCUS...");
        let root_gate = self.graph.root_gate();
        if root_gate.is_constant() {
            return Zbdd::from_graph(self.graph, &self.settings);
        }
        let container = self.analyze_module(root_gate);
        let root_index = root_gate.index();
        Zbdd::from_modules(root_index, vec![(root_index, container)], &self.settings)
    }

    /// Computes the cut sets of one module gate.
    fn analyze_module(&self, gate: &Gate) -> CutSetContainer {
        debug!("Computing cut sets of module gate {}", gate.index());
        let mut container = CutSetContainer::new(&self.settings, self.graph.gate_index_bound());
        let seed = container.convert_gate(gate, self.graph);
        container.merge(seed);
        loop {
            let next = container.get_next_gate();
            if next == 0 {
                break;
            }
            debug!("Expanding gate {}", next);
            let extracted = container.extract_intermediate_cut_sets(next);
            let gate_zbdd = container.convert_gate(self.graph.gate(next), self.graph);
            let expanded = container.expand_gate(&gate_zbdd, &extracted);
            container.merge(expanded);
        }
        if !self.graph.coherent() {
            container.eliminate_complements();
        }
        container.minimize();
        for index in container.gather_modules() {
            let module = self.analyze_module(self.graph.gate(index));
            container.join_module(index, module);
        }
        container.sanitize();
        container
    }
}
