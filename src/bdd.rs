use std::collections::HashMap;
use std::rc::Rc;

/// A function pointer into an attributed-edge ROBDD: a vertex together with
/// the complement interpretation of the edge leading to it.
#[derive(Debug, Clone)]
pub struct Function {
    pub vertex: BddVertex,
    pub complement: bool,
}

/// A vertex of the input ROBDD.
///
/// Attributed edges need a single terminal: the constant One. The Zero
/// function is One reached through a complemented edge.
#[derive(Debug, Clone)]
pub enum BddVertex {
    One,
    Ite(Rc<Ite>),
}

impl BddVertex {
    /// Identifier for conversion memoization. The terminal takes id 1.
    pub fn id(&self) -> u64 {
        match self {
            BddVertex::One => 1,
            BddVertex::Ite(ite) => ite.id(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BddVertex::One)
    }
}

/// An if-then-else vertex of the input ROBDD.
///
/// Only the low edge may carry the complement attribute; the high edge is
/// always regular. Module vertices are proxies whose function graph lives in
/// the owning [`Bdd`] module map.
#[derive(Debug)]
pub struct Ite {
    index: i32,
    order: i32,
    id: u64,
    module: bool,
    complement_edge: bool,
    high: BddVertex,
    low: BddVertex,
}

impl Ite {
    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn module(&self) -> bool {
        self.module
    }

    /// true if the low edge is attributed with a complement.
    pub fn complement_edge(&self) -> bool {
        self.complement_edge
    }

    pub fn high(&self) -> BddVertex {
        self.high.clone()
    }

    pub fn low(&self) -> BddVertex {
        self.low.clone()
    }
}

/// The ROBDD produced by the qualitative preprocessor, reduced to the surface
/// the ZBDD conversion needs: a root function, ITE vertices, and a map of
/// module functions keyed by gate index.
///
/// This type only carries the graph; Boolean manipulation of ROBDDs is the
/// business of its producer.
pub struct Bdd {
    root: Option<Function>,
    modules: HashMap<i32, Function>,
    next_id: u64,
}

impl Bdd {
    pub fn new() -> Self {
        Self {
            root: None,
            modules: HashMap::new(),
            next_id: 2,
        }
    }

    /// The terminal One vertex.
    pub fn one(&self) -> BddVertex {
        BddVertex::One
    }

    /// Creates an ITE vertex with a fresh id.
    ///
    /// # Panics
    ///
    /// Panics on a non-positive index or order, or when the high edge is the
    /// complemented terminal in disguise (the high edge must be regular).
    pub fn ite(&mut self, index: i32, order: i32, high: BddVertex, low: BddVertex, complement_edge: bool) -> BddVertex {
        self.ite_impl(index, order, high, low, complement_edge, false)
    }

    /// Creates a module proxy ITE vertex. The module function must be
    /// registered with [`Bdd::add_module`] under the same index.
    pub fn module_ite(
        &mut self,
        index: i32,
        order: i32,
        high: BddVertex,
        low: BddVertex,
        complement_edge: bool,
    ) -> BddVertex {
        self.ite_impl(index, order, high, low, complement_edge, true)
    }

    fn ite_impl(
        &mut self,
        index: i32,
        order: i32,
        high: BddVertex,
        low: BddVertex,
        complement_edge: bool,
        module: bool,
    ) -> BddVertex {
        assert!(index > 0, "ITE vertex indices are positive");
        assert!(order > 0, "ITE vertex orders are positive");
        let id = self.next_id;
        self.next_id += 1;
        BddVertex::Ite(Rc::new(Ite {
            index,
            order,
            id,
            module,
            complement_edge,
            high,
            low,
        }))
    }

    /// A single-variable function graph.
    pub fn variable(&mut self, index: i32, order: i32) -> BddVertex {
        self.ite(index, order, BddVertex::One, BddVertex::One, true)
    }

    pub fn add_module(&mut self, index: i32, function: Function) {
        self.modules.insert(index, function);
    }

    pub fn set_root(&mut self, function: Function) {
        self.root = Some(function);
    }

    pub fn root(&self) -> &Function {
        self.root.as_ref().expect("The BDD root has not been set")
    }

    pub fn module(&self, index: i32) -> &Function {
        self.modules
            .get(&index)
            .unwrap_or_else(|| panic!("Unknown BDD module {}", index))
    }

    pub fn modules(&self) -> &HashMap<i32, Function> {
        &self.modules
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Self::new()
    }
}
