//! Builds a small fault tree, runs the cut set analysis, and prints the
//! minimal cut sets and the Graphviz rendering of the ZBDD.
//!
//! Run with `RUST_LOG=debug` to watch the analysis phases.

use zbdd_rs::graph::{BooleanGraph, GateType};
use zbdd_rs::settings::Settings;
use zbdd_rs::zbdd::Zbdd;

fn main() {
    env_logger::init();

    // top = OR(pump_failure, M) with M = AND(valve_a, valve_b) a module.
    //
    //   1 = pump_failure, 2 = valve_a, 3 = valve_b
    let mut graph = BooleanGraph::new(3);
    graph.add_gate(4, GateType::Or);
    graph.add_gate(5, GateType::And);
    graph.set_module(5);
    graph.add_variable_arg(4, 1);
    graph.add_gate_arg(4, 5);
    graph.add_variable_arg(5, 2);
    graph.add_variable_arg(5, 3);
    graph.set_root(4);

    let settings = Settings::new().with_limit_order(4);
    let mut zbdd = Zbdd::from_graph(&graph, &settings);

    println!("{}", zbdd.to_dot().expect("dot rendering"));

    zbdd.analyze();
    println!("Minimal cut sets:");
    for cut_set in zbdd.cut_sets() {
        println!("  {:?}", cut_set);
    }
}
