//! # zbdd-rs: Zero-Suppressed BDDs for minimal cut set analysis
//!
//! **`zbdd-rs`** is the qualitative engine of a fault tree analysis tool: it
//! computes the **minimal cut sets** of a Boolean fault tree — the sets of
//! basic event occurrences whose simultaneous truth fails the top event —
//! minimized under subset inclusion and bounded by a configurable
//! cardinality limit.
//!
//! ## What is a ZBDD?
//!
//! A Zero-Suppressed Binary Decision Diagram is a canonical DAG
//! representation of a family of sets. Its reduction rule eliminates nodes
//! whose high child is the Empty terminal (the opposite of the classic BDD
//! rule), which makes sparse combination sets — like cut sets — extremely
//! compact. Canonicity comes from hash consing: structurally equal subgraphs
//! share a single node through the unique table.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: all operations go through the
//!   [`Zbdd`][crate::zbdd::Zbdd] manager, which owns the unique table, the
//!   compute tables, and the module map.
//! - **Three construction paths**: from a reduced ordered BDD, directly from
//!   a preprocessed Boolean graph, or from MOCUS cut set containers.
//! - **Bounded computation**: every Apply is pruned by the cut set order
//!   limit from [`Settings`][crate::settings::Settings].
//! - **Modular analysis**: independent subtrees are solved separately and
//!   embedded as single proxy nodes.
//! - **Non-coherent trees**: complement literals are eliminated with the cut
//!   set semantics after construction.
//!
//! ## Basic Usage
//!
//! ```rust
//! use zbdd_rs::graph::{BooleanGraph, GateType};
//! use zbdd_rs::settings::Settings;
//! use zbdd_rs::zbdd::Zbdd;
//!
//! // Fault tree: top = (A and B) or (A and C), with A=1, B=2, C=3.
//! let mut graph = BooleanGraph::new(3);
//! graph.add_gate(4, GateType::Or);
//! graph.add_gate(5, GateType::And);
//! graph.add_gate(6, GateType::And);
//! graph.add_variable_arg(5, 1);
//! graph.add_variable_arg(5, 2);
//! graph.add_variable_arg(6, 1);
//! graph.add_variable_arg(6, 3);
//! graph.add_gate_arg(4, 5);
//! graph.add_gate_arg(4, 6);
//! graph.set_root(4);
//!
//! let settings = Settings::new().with_limit_order(3);
//! let mut zbdd = Zbdd::from_graph(&graph, &settings);
//! zbdd.analyze();
//! assert_eq!(zbdd.cut_sets(), &[vec![1, 2], vec![1, 3]]);
//! ```
//!
//! ## Core Components
//!
//! - **[`zbdd`]**: the heart of the library — the [`Zbdd`][crate::zbdd::Zbdd]
//!   manager with apply/subsume/minimize and cut set generation.
//! - **[`graph`]**: the indexed Boolean graph produced by the preprocessor.
//! - **[`container`]** and **[`mocus`]**: the MOCUS driver that expands gates
//!   one at a time over ZBDD cut set containers.
//! - **[`dot`]**: Graphviz visualization of ZBDD graphs.

pub mod bdd;
pub mod cache;
pub mod container;
pub mod dot;
pub mod graph;
pub mod mocus;
pub mod settings;
pub mod table;
pub mod utils;
pub mod vertex;
pub mod zbdd;
