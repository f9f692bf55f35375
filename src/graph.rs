use std::collections::HashMap;

/// Logical connective of an indexed gate after preprocessing.
///
/// The preprocessor normalizes everything to AND/OR; NULL is a single
/// argument pass-through that may remain at the root or under modules.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GateType {
    And,
    Or,
    Null,
}

/// Constant state of a gate after constant propagation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum State {
    Normal,
    /// The gate is constant false.
    Null,
    /// The gate is constant true.
    Unity,
}

/// An indexed gate of the preprocessed Boolean graph.
///
/// Variable arguments are signed literal indices (negative for complements);
/// gate arguments are always positive because the preprocessor pushes
/// complements down to variables.
#[derive(Debug)]
pub struct Gate {
    index: i32,
    gate_type: GateType,
    state: State,
    order: i32,
    module: bool,
    variable_args: Vec<i32>,
    gate_args: Vec<i32>,
    parents: usize,
}

impl Gate {
    fn new(index: i32, gate_type: GateType) -> Self {
        Self {
            index,
            gate_type,
            state: State::Normal,
            order: index,
            module: false,
            variable_args: Vec::new(),
            gate_args: Vec::new(),
            parents: 0,
        }
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn gate_type(&self) -> GateType {
        self.gate_type
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn is_module(&self) -> bool {
        self.module
    }

    pub fn is_constant(&self) -> bool {
        self.state != State::Normal
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Signed indices of variable arguments.
    pub fn variable_args(&self) -> &[i32] {
        &self.variable_args
    }

    /// Positive indices of gate arguments.
    pub fn gate_args(&self) -> &[i32] {
        &self.gate_args
    }

    pub fn num_args(&self) -> usize {
        self.variable_args.len() + self.gate_args.len()
    }

    /// The number of gates referencing this gate as an argument.
    pub fn parents(&self) -> usize {
        self.parents
    }
}

/// Preprocessed, normalized, indexed fault tree.
///
/// Variables occupy indices `1..=gate_index_bound`; gates take indices above
/// the bound. Variable ordering defaults to the index and can be overridden
/// with the ordering produced by the preprocessor.
pub struct BooleanGraph {
    root: i32,
    gates: HashMap<i32, Gate>,
    variable_orders: HashMap<i32, i32>,
    gate_index_bound: i32,
    coherent: bool,
}

impl BooleanGraph {
    /// Creates a graph over `num_variables` basic events.
    pub fn new(num_variables: i32) -> Self {
        assert!(num_variables >= 0, "Negative number of variables");
        Self {
            root: 0,
            gates: HashMap::new(),
            variable_orders: HashMap::new(),
            gate_index_bound: num_variables,
            coherent: true,
        }
    }

    /// The exclusive upper bound of variable indices.
    pub fn gate_index_bound(&self) -> i32 {
        self.gate_index_bound
    }

    /// true if no complement literal occurs in the graph.
    pub fn coherent(&self) -> bool {
        self.coherent
    }

    pub fn is_gate_index(&self, index: i32) -> bool {
        index > self.gate_index_bound
    }

    pub fn add_gate(&mut self, index: i32, gate_type: GateType) {
        assert!(self.is_gate_index(index), "Gate index {} is within the variable range", index);
        let previous = self.gates.insert(index, Gate::new(index, gate_type));
        assert!(previous.is_none(), "Duplicate gate index {}", index);
    }

    /// Adds a signed variable literal to a gate.
    pub fn add_variable_arg(&mut self, gate: i32, literal: i32) {
        assert_ne!(literal, 0, "Literal index must not be zero");
        assert!(
            literal.abs() <= self.gate_index_bound,
            "Literal {} is outside of the variable range",
            literal
        );
        if literal < 0 {
            self.coherent = false;
        }
        self.gate_mut(gate).variable_args.push(literal);
    }

    /// Adds a positive gate argument. Gate complements must have been pushed
    /// down to variables by the preprocessor.
    pub fn add_gate_arg(&mut self, gate: i32, child: i32) {
        assert!(self.is_gate_index(child), "Gate argument {} is not a gate index", child);
        self.gate_mut(child).parents += 1;
        self.gate_mut(gate).gate_args.push(child);
    }

    /// Marks a gate as a module: its subgraph shares no variables with the
    /// rest of the tree and is solved independently.
    pub fn set_module(&mut self, gate: i32) {
        self.gate_mut(gate).module = true;
    }

    /// Turns a gate into a constant. Constant gates keep no arguments.
    pub fn set_constant(&mut self, gate: i32, unity: bool) {
        let gate = self.gate_mut(gate);
        gate.state = if unity { State::Unity } else { State::Null };
        gate.variable_args.clear();
        gate.gate_args.clear();
    }

    /// Overrides the ordering key of a variable or a gate.
    pub fn set_order(&mut self, index: i32, order: i32) {
        assert!(order > 0, "Ordering keys must be positive");
        if self.is_gate_index(index) {
            self.gate_mut(index).order = order;
        } else {
            assert!(index > 0, "Variable index must be positive");
            self.variable_orders.insert(index, order);
        }
    }

    pub fn set_root(&mut self, index: i32) {
        assert!(self.gates.contains_key(&index), "Root gate {} does not exist", index);
        self.root = index;
    }

    pub fn root(&self) -> i32 {
        assert_ne!(self.root, 0, "The root gate has not been set");
        self.root
    }

    pub fn root_gate(&self) -> &Gate {
        self.gate(self.root())
    }

    pub fn gate(&self, index: i32) -> &Gate {
        self.gates.get(&index).unwrap_or_else(|| panic!("Unknown gate index {}", index))
    }

    fn gate_mut(&mut self, index: i32) -> &mut Gate {
        self.gates.get_mut(&index).unwrap_or_else(|| panic!("Unknown gate index {}", index))
    }

    /// The ordering key of a variable literal (sign ignored).
    pub fn variable_order(&self, literal: i32) -> i32 {
        let index = literal.abs();
        assert!(index > 0 && index <= self.gate_index_bound, "Literal {} is not a variable", literal);
        self.variable_orders.get(&index).copied().unwrap_or(index)
    }

    /// Checks the structural preconditions of the cut set engine.
    ///
    /// Violations are programming errors of the preprocessor and trap.
    pub fn validate(&self) {
        let root = self.root();
        for gate in self.gates.values() {
            if gate.is_constant() {
                assert_eq!(gate.num_args(), 0, "Constant gate {} keeps arguments", gate.index);
                continue;
            }
            assert!(gate.num_args() > 0, "Gate {} has no arguments", gate.index);
            if gate.gate_type == GateType::Null {
                assert_eq!(gate.num_args(), 1, "NULL gate {} must have a single argument", gate.index);
            }
            for &arg in &gate.gate_args {
                assert!(arg > 0, "Complement gate argument {} has not been pushed down", arg);
                assert!(self.gates.contains_key(&arg), "Dangling gate argument {}", arg);
            }
        }
        assert!(self.gates.contains_key(&root), "Dangling root index {}", root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_two_level_tree() {
        let mut graph = BooleanGraph::new(3);
        graph.add_gate(4, GateType::Or);
        graph.add_gate(5, GateType::And);
        graph.add_variable_arg(5, 1);
        graph.add_variable_arg(5, 2);
        graph.add_gate_arg(4, 5);
        graph.add_variable_arg(4, 3);
        graph.set_root(4);
        graph.validate();

        assert!(graph.coherent());
        assert_eq!(graph.root_gate().gate_args(), &[5]);
        assert_eq!(graph.gate(5).parents(), 1);
        assert_eq!(graph.variable_order(-2), 2);
    }

    #[test]
    fn test_complement_marks_non_coherent() {
        let mut graph = BooleanGraph::new(2);
        graph.add_gate(3, GateType::And);
        graph.add_variable_arg(3, 1);
        graph.add_variable_arg(3, -2);
        graph.set_root(3);
        assert!(!graph.coherent());
    }

    #[test]
    #[should_panic(expected = "within the variable range")]
    fn test_gate_in_variable_range_panics() {
        let mut graph = BooleanGraph::new(5);
        graph.add_gate(3, GateType::And);
    }

    #[test]
    #[should_panic(expected = "single argument")]
    fn test_null_gate_arity() {
        let mut graph = BooleanGraph::new(2);
        graph.add_gate(3, GateType::Null);
        graph.add_variable_arg(3, 1);
        graph.add_variable_arg(3, 2);
        graph.set_root(3);
        graph.validate();
    }
}
