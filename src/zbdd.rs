use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use log::debug;

use crate::bdd::{Bdd, BddVertex};
use crate::cache::{Cache, OpKey};
use crate::container::CutSetContainer;
use crate::graph::{BooleanGraph, Gate, GateType, State};
use crate::mocus::CutSet as MocusCutSet;
use crate::settings::Settings;
use crate::table::{UniqueKey, UniqueTable};
use crate::vertex::{CutSet, SetNode, Vertex};

/// Boolean connective applied over families of sets.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Operator {
    And,
    Or,
}

/// Zero-Suppressed Binary Decision Diagram for cut set manipulations.
///
/// The manager owns the unique table (hash consing of set nodes through weak
/// references), the per-operator compute tables, the module map, and the root
/// vertex. Families of sets reachable through the root represent the cut sets
/// of the analyzed fault tree; module proxies stand for independently solved
/// subgraphs stored in the module map.
///
/// A ZBDD is built through one of three paths — from a reduced ordered BDD,
/// directly from a preprocessed Boolean graph, or from MOCUS cut set
/// containers — and consumed once by [`Zbdd::analyze`], which minimizes the
/// graph and destructively extracts the explicit cut sets.
pub struct Zbdd {
    settings: Settings,
    root: Vertex,
    unique_table: UniqueTable,
    /// Processed AND computations, keyed `(min_id, max_id, limit)`.
    and_table: Cache<OpKey, Vertex>,
    /// Processed OR computations, keyed `(min_id, max_id, limit)`.
    or_table: Cache<OpKey, Vertex>,
    /// Subsume results, keyed `(high_id, low_id)`.
    subsume_table: Cache<OpKey, Vertex>,
    /// Minimal results of processed vertices, keyed by id.
    minimal_results: HashMap<u64, Vertex>,
    /// Module subgraphs keyed by the module gate index.
    modules: HashMap<i32, Vertex>,
    /// Identification assignment for new set nodes. Terminals use 0 and 1.
    set_id: u64,
    cut_sets: Vec<CutSet>,
}

const COMPUTE_TABLE_BITS: usize = 16;

impl Zbdd {
    /// Creates an empty ZBDD manager: the root is the Empty set.
    pub fn new(settings: &Settings) -> Self {
        Self::with_settings(*settings)
    }

    pub(crate) fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            root: Vertex::empty(),
            unique_table: UniqueTable::new(),
            and_table: Cache::new(COMPUTE_TABLE_BITS),
            or_table: Cache::new(COMPUTE_TABLE_BITS),
            subsume_table: Cache::new(COMPUTE_TABLE_BITS),
            minimal_results: HashMap::new(),
            modules: HashMap::new(),
            set_id: 2,
            cut_sets: Vec::new(),
        }
    }

    /// Converts a reduced ordered BDD into a ZBDD.
    ///
    /// The input BDD must come from a coherent fault tree: attributed edges
    /// terminate at non-complemented subgraphs, so complement elimination is
    /// never needed on this path.
    pub fn from_bdd(bdd: &Bdd, settings: &Settings) -> Self {
        let mut zbdd = Zbdd::with_settings(*settings);
        debug!("Creating ZBDD from BDD...");
        let start = Instant::now();
        let root_function = bdd.root();
        let mut ites = HashMap::new();
        let root = zbdd.convert_bdd(
            &root_function.vertex,
            root_function.complement,
            bdd,
            settings.limit_order(),
            &mut ites,
        );
        zbdd.root = root;
        debug!("Created ZBDD from BDD in {:?}", start.elapsed());
        zbdd.log_graph_counts();
        #[cfg(debug_assertions)]
        zbdd.test_structure();
        zbdd
    }

    /// Produces a ZBDD directly from a preprocessed Boolean graph.
    ///
    /// The graph must be normalized (AND/OR gates, complements pushed down to
    /// variables) and carry a variable ordering. Non-coherent graphs go
    /// through complement elimination after conversion.
    pub fn from_graph(graph: &BooleanGraph, settings: &Settings) -> Self {
        graph.validate();
        let mut zbdd = Zbdd::with_settings(*settings);
        debug!("Creating ZBDD from the Boolean graph...");
        let start = Instant::now();
        let root_gate = graph.root_gate();
        let root = if root_gate.is_constant() {
            match root_gate.state() {
                State::Unity => Vertex::base(),
                State::Null => Vertex::empty(),
                State::Normal => unreachable!(),
            }
        } else {
            let mut gates = HashMap::new();
            zbdd.convert_graph(graph, root_gate, &mut gates)
        };
        zbdd.root = root;
        debug!("Created ZBDD from the Boolean graph in {:?}", start.elapsed());
        if !graph.coherent() {
            debug!("Eliminating complements from the ZBDD...");
            zbdd.eliminate_complements_in_root();
        }
        zbdd.log_graph_counts();
        #[cfg(debug_assertions)]
        zbdd.test_structure();
        zbdd
    }

    /// Assembles a ZBDD from cut set containers produced by MOCUS.
    ///
    /// The containers must be topologically ordered: every module before any
    /// container referring to it. Each container's root lands in the module
    /// map; the ZBDD root is the entry of the root module. The joined
    /// subgraphs are final and are only traversed afterwards.
    pub fn from_modules(root_index: i32, containers: Vec<(i32, CutSetContainer)>, settings: &Settings) -> Self {
        let mut zbdd = Zbdd::with_settings(*settings);
        let mut next_id = zbdd.set_id;
        for (index, container) in containers {
            let (root, modules, container_next_id) = container.into_parts();
            next_id = next_id.max(container_next_id);
            zbdd.modules.extend(modules);
            zbdd.modules.insert(index, root);
        }
        zbdd.set_id = next_id;
        zbdd.root = zbdd
            .modules
            .remove(&root_index)
            .expect("The root module container is missing");
        #[cfg(debug_assertions)]
        zbdd.test_structure();
        zbdd
    }

    /// Builds a minimal ZBDD database from explicit MOCUS cut sets.
    ///
    /// Cut sets are grouped per module and topologically ordered like
    /// [`Zbdd::from_modules`]. Negative literals are discarded; cut sets over
    /// the order limit are dropped. Literal orders equal their indices.
    pub fn from_cut_sets(root_index: i32, cut_sets: &[(i32, Vec<MocusCutSet>)], settings: &Settings) -> Self {
        let mut zbdd = Zbdd::with_settings(*settings);
        let limit = settings.limit_order();
        // Roots of all processed modules, terminal ones included; only
        // non-terminal roots may enter the module map.
        let mut roots: HashMap<i32, Vertex> = HashMap::new();
        for (module_index, sets) in cut_sets {
            let mut sets: Vec<&MocusCutSet> = sets.iter().collect();
            sets.sort_by_key(|cut_set| cut_set.size());
            let mut root = Vertex::empty();
            for cut_set in sets {
                if cut_set.order() > limit {
                    continue;
                }
                let set_vertex = zbdd.emplace_cut_set(cut_set, &roots);
                root = zbdd.apply(Operator::Or, &root, &set_vertex, limit);
            }
            let root = zbdd.minimize(&root);
            roots.insert(*module_index, root.clone());
            if !root.is_terminal() {
                zbdd.modules.insert(*module_index, root);
            }
        }
        zbdd.root = roots.remove(&root_index).expect("The root module is missing");
        zbdd.modules.remove(&root_index);
        #[cfg(debug_assertions)]
        zbdd.test_structure();
        zbdd
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn limit_order(&self) -> i32 {
        self.settings.limit_order()
    }

    pub fn root(&self) -> &Vertex {
        &self.root
    }

    pub(crate) fn set_root(&mut self, root: Vertex) {
        self.root = root;
    }

    pub(crate) fn modules(&self) -> &HashMap<i32, Vertex> {
        &self.modules
    }

    pub(crate) fn modules_mut(&mut self) -> &mut HashMap<i32, Vertex> {
        &mut self.modules
    }

    pub(crate) fn into_parts(self) -> (Vertex, HashMap<i32, Vertex>, u64) {
        (self.root, self.modules, self.set_id)
    }

    /// Cut sets generated by [`Zbdd::analyze`].
    pub fn cut_sets(&self) -> &[CutSet] {
        &self.cut_sets
    }

    /// Runs the qualitative analysis over this ZBDD.
    ///
    /// Minimizes the graph, releases the tables, and destructively generates
    /// the explicit cut sets. The ZBDD graph is consumed: only the produced
    /// [`Zbdd::cut_sets`] remain meaningful afterwards.
    pub fn analyze(&mut self) {
        debug!("Analyzing ZBDD...");
        let analysis_start = Instant::now();

        let start = Instant::now();
        debug!("Minimizing ZBDD...");
        let root = self.root.clone();
        self.root = self.minimize(&root);
        debug!("Finished ZBDD minimization in {:?}", start.elapsed());
        self.log_graph_counts();

        // Release the tables so that the weak unique table does not outlive
        // the strong references severed by the destructive traversal.
        self.unique_table.clear();
        self.and_table.clear();
        self.or_table.clear();
        self.subsume_table.clear();
        self.minimal_results.clear();

        let start = Instant::now();
        debug!("Getting cut sets from minimized ZBDD...");
        let root = self.root.clone();
        let mut cut_sets = self.generate_cut_sets(&root);
        self.root = Vertex::empty();
        self.modules.clear();
        for cut_set in &mut cut_sets {
            cut_set.sort_unstable();
        }
        // Module cross products may repeat cut sets; the output is a set.
        cut_sets.sort_by(|one, two| one.len().cmp(&two.len()).then_with(|| one.cmp(two)));
        cut_sets.dedup();
        debug!("{} cut sets are found in {:?}", cut_sets.len(), start.elapsed());
        self.cut_sets = cut_sets;
        debug!("Finished ZBDD analysis in {:?}", analysis_start.elapsed());
    }
}

// Node management.
impl Zbdd {
    /// Fetches a unique set node from the hash table, creating it with a
    /// fresh id if the triplet `(index, high, low)` is not represented.
    pub(crate) fn fetch_unique_table(
        &mut self,
        index: i32,
        high: &Vertex,
        low: &Vertex,
        order: i32,
        module: bool,
    ) -> Rc<SetNode> {
        let key: UniqueKey = (index, high.id(), low.id());
        if let Some(node) = self.unique_table.lookup(&key) {
            return node;
        }
        let id = self.set_id;
        self.set_id += 1;
        let node = Rc::new(SetNode::new(index, order, id, module, high.clone(), low.clone()));
        self.unique_table.insert(key, &node);
        node
    }

    /// Fetches a node after the reduction rules: an Empty high collapses to
    /// the low branch, and so do equal children (a set with an extra literal
    /// is subsumed by the same set without it).
    pub(crate) fn fetch_reduced(&mut self, index: i32, high: &Vertex, low: &Vertex, order: i32, module: bool) -> Vertex {
        if high.is_empty() {
            return low.clone();
        }
        if high.id() == low.id() {
            return low.clone();
        }
        Vertex::Node(self.fetch_unique_table(index, high, low, order, module))
    }

    /// The ZBDD of a single literal: `{{index}}`.
    ///
    /// Negative indices are complement literals; a module flag makes the
    /// literal a proxy for a subgraph of the module map.
    pub fn single_literal(&mut self, index: i32, order: i32, module: bool) -> Vertex {
        Vertex::Node(self.fetch_unique_table(index, &Vertex::base(), &Vertex::empty(), order, module))
    }

    /// Releases the volatile operation caches.
    pub(crate) fn clear_compute_tables(&mut self) {
        self.and_table.clear();
        self.or_table.clear();
    }

    /// Drops dead entries from the unique table.
    pub fn collect_garbage(&mut self) {
        self.unique_table.collect();
    }
}

// Set algebra.
impl Zbdd {
    /// Applies a Boolean operation to two set families.
    ///
    /// The result is reduced and ordered but not necessarily minimal. The
    /// order limit restricts the cut set size as a pruning aid; it is not a
    /// post-condition on every path.
    pub fn apply(&mut self, op: Operator, one: &Vertex, two: &Vertex, limit_order: i32) -> Vertex {
        if limit_order < 0 {
            return Vertex::empty();
        }
        match (one, two) {
            (Vertex::Terminal(one), Vertex::Terminal(two)) => match op {
                Operator::Or => Vertex::Terminal(*one || *two),
                Operator::And => Vertex::Terminal(*one && *two),
            },
            (Vertex::Terminal(value), set @ Vertex::Node(_)) | (set @ Vertex::Node(_), Vertex::Terminal(value)) => {
                match (op, *value) {
                    (Operator::Or, true) => Vertex::base(),
                    (Operator::Or, false) => set.clone(),
                    (Operator::And, true) => set.clone(),
                    (Operator::And, false) => Vertex::empty(),
                }
            }
            (Vertex::Node(one), Vertex::Node(two)) => {
                if one.id() == two.id() {
                    return Vertex::Node(Rc::clone(one));
                }
                // The outer argument carries the variable decided first.
                let (outer, inner) = if one.order_key() <= two.order_key() {
                    (Rc::clone(one), Rc::clone(two))
                } else {
                    (Rc::clone(two), Rc::clone(one))
                };
                let key = {
                    let min_id = one.id().min(two.id());
                    let max_id = one.id().max(two.id());
                    match op {
                        Operator::Or => OpKey::Or(min_id, max_id, limit_order),
                        Operator::And => OpKey::And(min_id, max_id, limit_order),
                    }
                };
                let table = match op {
                    Operator::Or => &self.or_table,
                    Operator::And => &self.and_table,
                };
                if let Some(result) = table.get(&key) {
                    return result.clone();
                }
                let result = self.apply_set_nodes(op, &outer, &inner, limit_order);
                let table = match op {
                    Operator::Or => &mut self.or_table,
                    Operator::And => &mut self.and_table,
                };
                table.insert(key, result.clone());
                result
            }
        }
    }

    /// Applies the operation to two set nodes with `outer` deciding first.
    fn apply_set_nodes(&mut self, op: Operator, outer: &Rc<SetNode>, inner: &Rc<SetNode>, limit_order: i32) -> Vertex {
        // The outer literal adds to the cut set cardinality unless it is a
        // complement or a module proxy.
        let limit_high = if outer.index() < 0 || outer.module() {
            limit_order
        } else {
            limit_order - 1
        };
        let inner_vertex = Vertex::Node(Rc::clone(inner));
        let (high, low);
        if outer.order() == inner.order() && outer.index() == inner.index() {
            match op {
                Operator::Or => {
                    high = self.apply(Operator::Or, &outer.high(), &inner.high(), limit_high);
                    low = self.apply(Operator::Or, &outer.low(), &inner.low(), limit_order);
                }
                Operator::And => {
                    // Minato's rule for the intersection of covers.
                    let inner_all = self.apply(Operator::Or, &inner.high(), &inner.low(), limit_high);
                    let high_with_inner = self.apply(Operator::And, &outer.high(), &inner_all, limit_high);
                    let low_with_high = self.apply(Operator::And, &outer.low(), &inner.high(), limit_high);
                    high = self.apply(Operator::Or, &high_with_inner, &low_with_high, limit_high);
                    low = self.apply(Operator::And, &outer.low(), &inner.low(), limit_order);
                }
            }
        } else {
            match op {
                Operator::Or => {
                    high = outer.high();
                    low = self.apply(Operator::Or, &outer.low(), &inner_vertex, limit_order);
                }
                Operator::And => {
                    high = self.apply(Operator::And, &outer.high(), &inner_vertex, limit_high);
                    low = self.apply(Operator::And, &outer.low(), &inner_vertex, limit_order);
                }
            }
        }
        // A high branch starting at the outer order carries the complement of
        // the outer variable: such sets are contradictions and fold away.
        let high = prune_equal_order(outer.order(), high);
        let result = self.fetch_reduced(outer.index(), &high, &low, outer.order(), outer.module());
        self.minimize(&result)
    }

    /// Drops the sets in `high` that have a subset in `low`.
    pub fn subsume(&mut self, high: &Vertex, low: &Vertex) -> Vertex {
        if low.is_empty() {
            return high.clone(); // high cannot have a subset in the Empty set.
        }
        if low.is_base() {
            return Vertex::empty(); // Everything is a superset of the empty combination.
        }
        if high.is_terminal() {
            return high.clone();
        }
        let key = OpKey::Subsume(high.id(), low.id());
        if let Some(result) = self.subsume_table.get(&key) {
            return result.clone();
        }
        let high_node = Rc::clone(high.node());
        let low_node = Rc::clone(low.node());
        let result = if high_node.order_key() > low_node.order_key() {
            // The low variable cannot occur in high; only deeper sets matter.
            self.subsume(high, &low_node.low())
        } else {
            let (subhigh, sublow);
            if high_node.order() == low_node.order() && high_node.index() == low_node.index() {
                let with_high = self.subsume(&high_node.high(), &low_node.high());
                subhigh = self.subsume(&with_high, &low_node.low());
                sublow = self.subsume(&high_node.low(), &low_node.low());
            } else {
                subhigh = self.subsume(&high_node.high(), low);
                sublow = self.subsume(&high_node.low(), low);
            }
            let rebuilt = self.fetch_reduced(
                high_node.index(),
                &subhigh,
                &sublow,
                high_node.order(),
                high_node.module(),
            );
            if let Some(node) = rebuilt.as_node() {
                if high_node.minimal() {
                    node.set_minimal(true);
                }
            }
            rebuilt
        };
        self.subsume_table.insert(key, result.clone());
        result
    }

    /// Removes subsets from the family: the result contains only the sets
    /// with no proper subset in the same family.
    ///
    /// Idempotent; already-minimal subgraphs are returned unchanged.
    pub fn minimize(&mut self, vertex: &Vertex) -> Vertex {
        let node = match vertex {
            Vertex::Terminal(_) => return vertex.clone(),
            Vertex::Node(node) => Rc::clone(node),
        };
        if node.minimal() {
            return vertex.clone();
        }
        if let Some(result) = self.minimal_results.get(&vertex.id()) {
            return result.clone();
        }
        if node.module() {
            // Module maps of working containers fill in lazily; a missing
            // entry belongs to a module that is not joined yet.
            if let Some(module) = self.modules.get(&node.index()).cloned() {
                let module = self.minimize(&module);
                self.modules.insert(node.index(), module);
            }
        }
        let high = self.minimize(&node.high());
        let low = self.minimize(&node.low());
        let high = self.subsume(&high, &low);
        let result = if high.is_empty() || high.id() == low.id() {
            low
        } else {
            let rebuilt = self.fetch_unique_table(node.index(), &high, &low, node.order(), node.module());
            rebuilt.set_minimal(true);
            Vertex::Node(rebuilt)
        };
        self.minimal_results.insert(vertex.id(), result.clone());
        result
    }
}

// Complement elimination.
impl Zbdd {
    /// Removes complement literals from the cut sets of the root.
    ///
    /// Only needed for non-coherent inputs with minimal cut sets as output:
    /// the cut set semantics drops every negative literal and unions the
    /// branches it guarded.
    pub(crate) fn eliminate_complements_in_root(&mut self) {
        let root = self.root.clone();
        let mut wide_results = HashMap::new();
        let mut processed_modules = HashMap::new();
        self.root = self.eliminate_complements(&root, &mut wide_results, &mut processed_modules);
    }

    fn eliminate_complements(
        &mut self,
        vertex: &Vertex,
        wide_results: &mut HashMap<u64, Vertex>,
        processed_modules: &mut HashMap<i32, Vertex>,
    ) -> Vertex {
        let node = match vertex {
            Vertex::Terminal(_) => return vertex.clone(),
            Vertex::Node(node) => Rc::clone(node),
        };
        if let Some(result) = wide_results.get(&vertex.id()) {
            return result.clone();
        }
        let high = self.eliminate_complements(&node.high(), wide_results, processed_modules);
        let low = self.eliminate_complements(&node.low(), wide_results, processed_modules);
        let result = self.eliminate_complement(&node, &high, &low, wide_results, processed_modules);
        wide_results.insert(vertex.id(), result.clone());
        result
    }

    fn eliminate_complement(
        &mut self,
        node: &Rc<SetNode>,
        high: &Vertex,
        low: &Vertex,
        wide_results: &mut HashMap<u64, Vertex>,
        processed_modules: &mut HashMap<i32, Vertex>,
    ) -> Vertex {
        if node.index() < 0 {
            // The complement literal does not occur in cut sets.
            return self.apply(Operator::Or, high, low, self.limit_order());
        }
        if node.module() {
            let processed = if let Some(module) = processed_modules.get(&node.index()) {
                module.clone()
            } else if let Some(module) = self.modules.get(&node.index()).cloned() {
                let module = self.eliminate_complements(&module, wide_results, processed_modules);
                let module = self.minimize(&module);
                processed_modules.insert(node.index(), module.clone());
                if module.is_terminal() {
                    self.modules.remove(&node.index());
                } else {
                    self.modules.insert(node.index(), module.clone());
                }
                module
            } else {
                // Not joined yet; keep the proxy untouched.
                return self.fetch_reduced(node.index(), high, low, node.order(), true);
            };
            if processed.is_empty() {
                return low.clone(); // An impossible module erases its sets.
            }
            if processed.is_base() {
                return self.apply(Operator::Or, high, low, self.limit_order());
            }
        }
        self.fetch_reduced(node.index(), high, low, node.order(), node.module())
    }
}

// Construction from a BDD.
impl Zbdd {
    fn convert_bdd(
        &mut self,
        vertex: &BddVertex,
        complement: bool,
        bdd: &Bdd,
        limit_order: i32,
        ites: &mut HashMap<(i64, i32), Vertex>,
    ) -> Vertex {
        let ite = match vertex {
            BddVertex::One => return Vertex::Terminal(!complement),
            BddVertex::Ite(ite) => Rc::clone(ite),
        };
        // Attributed edges of coherent functions terminate at the terminal.
        debug_assert!(!complement, "Complemented non-terminal BDD subgraph in a coherent conversion");
        let sign: i64 = if complement { -1 } else { 1 };
        let key = (sign * ite.id() as i64, limit_order);
        if let Some(result) = ites.get(&key) {
            return result.clone();
        }
        let low = self.convert_bdd(&ite.low(), ite.complement_edge() ^ complement, bdd, limit_order, ites);
        let result = if low.is_base() {
            // The empty combination subsumes everything the high side holds.
            Vertex::base()
        } else {
            let limit_high = if ite.module() { limit_order } else { limit_order - 1 };
            let high = if limit_order > 0 {
                self.convert_bdd(&ite.high(), complement, bdd, limit_high, ites)
            } else {
                Vertex::empty()
            };
            if ite.module() {
                let function = bdd.module(ite.index());
                let module = self.convert_bdd(
                    &function.vertex,
                    function.complement,
                    bdd,
                    self.limit_order(),
                    ites,
                );
                if module.is_empty() {
                    low
                } else if module.is_base() {
                    self.apply(Operator::Or, &high, &low, limit_order)
                } else {
                    self.modules.insert(ite.index(), module);
                    self.fetch_reduced(ite.index(), &high, &low, ite.order(), true)
                }
            } else {
                self.fetch_reduced(ite.index(), &high, &low, ite.order(), false)
            }
        };
        ites.insert(key, result.clone());
        result
    }
}

// Construction from a Boolean graph.
impl Zbdd {
    /// Transforms a Boolean graph gate into a ZBDD.
    ///
    /// The memoization container tracks how many parents still need a
    /// converted gate so that shared gates are rebuilt only once and released
    /// as soon as the last parent has consumed them.
    fn convert_graph(
        &mut self,
        graph: &BooleanGraph,
        gate: &Gate,
        gates: &mut HashMap<i32, (Vertex, usize)>,
    ) -> Vertex {
        assert!(!gate.is_constant(), "Constant gates are inlined by the caller");
        if let Some((vertex, count)) = gates.get_mut(&gate.index()) {
            let result = vertex.clone();
            *count -= 1;
            if *count == 0 {
                gates.remove(&gate.index());
            }
            return result;
        }
        let mut args = Vec::with_capacity(gate.num_args());
        for &literal in gate.variable_args() {
            let order = graph.variable_order(literal);
            args.push(self.single_literal(literal, order, false));
        }
        for &child_index in gate.gate_args() {
            let child = graph.gate(child_index);
            if child.is_constant() {
                args.push(match child.state() {
                    State::Unity => Vertex::base(),
                    State::Null => Vertex::empty(),
                    State::Normal => unreachable!(),
                });
                continue;
            }
            if child.is_module() {
                let module = self.convert_graph(graph, child, gates);
                if module.is_terminal() {
                    args.push(module); // Constant modules are inlined.
                } else {
                    self.modules.insert(child_index, module);
                    args.push(self.single_literal(child_index, child.order(), true));
                }
            } else {
                args.push(self.convert_graph(graph, child, gates));
            }
        }
        let result = match gate.gate_type() {
            GateType::Null => {
                assert_eq!(args.len(), 1, "NULL gates pass a single argument through");
                args.pop().expect("A NULL gate argument")
            }
            gate_type => {
                let op = match gate_type {
                    GateType::And => Operator::And,
                    GateType::Or => Operator::Or,
                    GateType::Null => unreachable!(),
                };
                let mut args = args.into_iter();
                let first = args.next().expect("Gates carry arguments");
                args.fold(first, |result, arg| {
                    let limit = self.limit_order();
                    self.apply(op, &result, &arg, limit)
                })
            }
        };
        // Bound the memory of the gate conversion.
        self.clear_compute_tables();
        if gate.parents() > 1 {
            gates.insert(gate.index(), (result.clone(), gate.parents() - 1));
        }
        result
    }

    /// Converts one explicit MOCUS cut set into a single-chain ZBDD.
    fn emplace_cut_set(&mut self, cut_set: &MocusCutSet, module_roots: &HashMap<i32, Vertex>) -> Vertex {
        let mut vertex = Vertex::base(); // The Unity set for empty cut sets.
        for &module in cut_set.modules().iter().rev() {
            let root = module_roots
                .get(&module)
                .unwrap_or_else(|| panic!("Module {} is not final yet", module));
            if root.is_empty() {
                return Vertex::empty(); // The whole product is impossible.
            }
            if root.is_base() {
                continue; // Unity modules add nothing.
            }
            vertex = Vertex::Node(self.fetch_unique_table(module, &vertex, &Vertex::empty(), module, true));
        }
        for &literal in cut_set.literals().iter().rev() {
            if literal < 0 {
                continue; // Negative literals are discarded.
            }
            vertex = Vertex::Node(self.fetch_unique_table(literal, &vertex, &Vertex::empty(), literal, false));
        }
        vertex
    }
}

// Cut set generation.
impl Zbdd {
    /// Destructively traverses the minimized ZBDD to emit explicit cut sets.
    ///
    /// Node results are cached only when the node is shared; branches are cut
    /// as soon as a node is finished, so the graph frees while it is walked.
    fn generate_cut_sets(&self, vertex: &Vertex) -> Vec<CutSet> {
        let node = match vertex {
            Vertex::Terminal(true) => return vec![Vec::new()],
            Vertex::Terminal(false) => return Vec::new(),
            Vertex::Node(node) => Rc::clone(node),
        };
        if node.mark() {
            return node.cut_sets();
        }
        node.set_mark(true);
        let low = self.generate_cut_sets(&node.low());
        let high = self.generate_cut_sets(&node.high());
        let limit = self.limit_order() as usize;
        let mut result = low;
        if node.module() {
            let module = self
                .modules
                .get(&node.index())
                .cloned()
                .unwrap_or_else(|| panic!("Module {} is missing for generation", node.index()));
            let module_sets = self.generate_cut_sets(&module);
            for cut_set in &high {
                for module_set in &module_sets {
                    if cut_set.len() + module_set.len() <= limit {
                        let mut product = cut_set.clone();
                        product.extend(module_set.iter().copied());
                        result.push(product);
                    }
                }
            }
        } else {
            for mut cut_set in high {
                if cut_set.len() < limit {
                    cut_set.push(node.index());
                    result.push(cut_set);
                }
            }
        }
        // The clone of this traversal holds one count; anything above two
        // means another edge or the module map will come back for the result.
        if Rc::strong_count(&node) > 2 {
            node.set_cut_sets(result.clone());
        }
        node.cut_branches();
        result
    }
}

// Bookkeeping traversals.
impl Zbdd {
    /// Counts set nodes reachable from the vertex, module subgraphs included.
    ///
    /// Marks must be clear before the call; the traversal leaves them set.
    pub fn count_set_nodes(&self, vertex: &Vertex) -> i64 {
        let node = match vertex {
            Vertex::Terminal(_) => return 0,
            Vertex::Node(node) => Rc::clone(node),
        };
        if node.mark() {
            return 0;
        }
        node.set_mark(true);
        let in_module = if node.module() {
            self.modules
                .get(&node.index())
                .map_or(0, |module| self.count_set_nodes(&module.clone()))
        } else {
            0
        };
        1 + in_module + self.count_set_nodes(&node.high()) + self.count_set_nodes(&node.low())
    }

    /// Counts the number of cut sets in the family, multiplying through
    /// module proxies. Marks must be clear before the call.
    pub fn count_cut_sets(&self, vertex: &Vertex) -> i64 {
        let node = match vertex {
            Vertex::Terminal(true) => return 1,
            Vertex::Terminal(false) => return 0,
            Vertex::Node(node) => Rc::clone(node),
        };
        if node.mark() {
            return node.count();
        }
        node.set_mark(true);
        let multiplier = if node.module() {
            self.modules
                .get(&node.index())
                .map_or(1, |module| self.count_cut_sets(&module.clone()))
        } else {
            1
        };
        let count = multiplier * self.count_cut_sets(&node.high()) + self.count_cut_sets(&node.low());
        node.set_count(count);
        count
    }

    /// Clears vertex marks set by a previous traversal.
    ///
    /// The graph must be marked contiguously: the sweep stops at the first
    /// unmarked vertex of a branch.
    pub fn clear_marks(&self, vertex: &Vertex) {
        let node = match vertex {
            Vertex::Terminal(_) => return,
            Vertex::Node(node) => Rc::clone(node),
        };
        if !node.mark() {
            return;
        }
        node.set_mark(false);
        if node.module() {
            if let Some(module) = self.modules.get(&node.index()) {
                self.clear_marks(&module.clone());
            }
        }
        self.clear_marks(&node.high());
        self.clear_marks(&node.low());
    }

    fn log_graph_counts(&self) {
        debug!("The total number of ZBDD nodes created: {}", self.set_id - 1);
        let root = self.root.clone();
        debug!("# of set nodes in ZBDD: {}", self.count_set_nodes(&root));
        self.clear_marks(&root);
        debug!("There are {} cut sets in total.", self.count_cut_sets(&root));
        self.clear_marks(&root);
    }

    /// Checks the ZBDD graph for structural errors.
    ///
    /// Violations are engine bugs and fail hard. Marks must be clear; the
    /// check cleans up after itself.
    pub fn test_structure(&self) {
        let root = self.root.clone();
        self.test_vertex(&root);
        for module in self.modules.values() {
            assert!(!module.is_terminal(), "A terminal module has not been inlined");
            self.test_vertex(&module.clone());
        }
        self.clear_marks(&root);
        for module in self.modules.values() {
            self.clear_marks(&module.clone());
        }
    }

    fn test_vertex(&self, vertex: &Vertex) {
        let node = match vertex {
            Vertex::Terminal(_) => return,
            Vertex::Node(node) => Rc::clone(node),
        };
        if node.mark() {
            return;
        }
        node.set_mark(true);
        let high = node.high();
        let low = node.low();
        assert!(!high.is_empty(), "A set node high branch is the Empty terminal");
        assert_ne!(high.id(), low.id(), "Duplicate set node children escaped reduction");
        for child in [&high, &low] {
            if let Some(child) = child.as_node() {
                assert!(
                    node.order_key() < child.order_key(),
                    "Set node ordering is broken: ({}, {}) is not above ({}, {})",
                    node.order(),
                    node.index(),
                    child.order(),
                    child.index()
                );
                if node.minimal() {
                    assert!(child.minimal(), "A minimal set node has a non-minimal descendant");
                }
            }
        }
        if node.module() {
            let module = self
                .modules
                .get(&node.index())
                .unwrap_or_else(|| panic!("Module {} is not registered", node.index()));
            assert!(!module.is_terminal(), "A terminal module has not been inlined");
        }
        self.test_vertex(&high);
        self.test_vertex(&low);
    }
}

/// Replaces a high branch that shares the order of its parent variable with
/// the branch below it: the only same-order node is the complement literal,
/// and a set with both polarities of one variable is a contradiction.
fn prune_equal_order(order: i32, mut high: Vertex) -> Vertex {
    loop {
        let next = match high.as_node() {
            Some(node) if node.order() == order => node.low(),
            _ => break,
        };
        high = next;
    }
    high
}
