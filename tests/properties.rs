//! Property tests over randomly generated coherent fault trees.
//!
//! The generators are seeded, so every run exercises the same graphs. A
//! brute-force truth table over the basic events provides the oracle for
//! soundness, minimality, and completeness.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use zbdd_rs::graph::{BooleanGraph, GateType};
use zbdd_rs::mocus::Mocus;
use zbdd_rs::settings::Settings;
use zbdd_rs::vertex::Vertex;
use zbdd_rs::zbdd::{Operator, Zbdd};

const NUM_VARS: i32 = 5;
const NUM_GATES: i32 = 4;
const SEEDS: u64 = 24;

fn random_graph(rng: &mut ChaCha8Rng) -> BooleanGraph {
    let mut graph = BooleanGraph::new(NUM_VARS);
    let first = NUM_VARS + 1;
    let last = NUM_VARS + NUM_GATES;
    for index in first..=last {
        let gate_type = if rng.gen_bool(0.5) { GateType::And } else { GateType::Or };
        graph.add_gate(index, gate_type);
    }
    for index in first..=last {
        let num_args = rng.gen_range(2..=3);
        let mut vars = HashSet::new();
        let mut added = 0;
        while added < num_args {
            if index < last && rng.gen_bool(0.3) {
                let child = rng.gen_range(index + 1..=last);
                graph.add_gate_arg(index, child);
                added += 1;
            } else {
                let var = rng.gen_range(1..=NUM_VARS);
                if vars.insert(var) {
                    graph.add_variable_arg(index, var);
                    added += 1;
                }
            }
        }
    }
    graph.set_root(first);
    graph
}

/// Evaluates the graph under a bitmask assignment of the basic events.
fn eval(graph: &BooleanGraph, index: i32, assignment: u32) -> bool {
    let gate = graph.gate(index);
    let literal = |&literal: &i32| {
        let value = (assignment >> (literal.abs() - 1)) & 1 == 1;
        if literal > 0 {
            value
        } else {
            !value
        }
    };
    match gate.gate_type() {
        GateType::And => {
            gate.variable_args().iter().all(literal)
                && gate.gate_args().iter().all(|&child| eval(graph, child, assignment))
        }
        GateType::Or => {
            gate.variable_args().iter().any(literal)
                || gate.gate_args().iter().any(|&child| eval(graph, child, assignment))
        }
        GateType::Null => {
            if let Some(literal_arg) = gate.variable_args().first() {
                literal(literal_arg)
            } else {
                eval(graph, gate.gate_args()[0], assignment)
            }
        }
    }
}

/// Minimal satisfying assignments by exhaustive enumeration.
fn brute_force_minimal(graph: &BooleanGraph) -> Vec<Vec<i32>> {
    let satisfying: Vec<u32> = (0..1u32 << NUM_VARS)
        .filter(|&mask| eval(graph, graph.root(), mask))
        .collect();
    let mut minimal = Vec::new();
    for &mask in &satisfying {
        let is_minimal = satisfying
            .iter()
            .all(|&other| other == mask || (other & mask) != other);
        if is_minimal {
            let mut set: Vec<i32> = (1..=NUM_VARS).filter(|&v| (mask >> (v - 1)) & 1 == 1).collect();
            set.sort_unstable();
            minimal.push(set);
        }
    }
    minimal.sort_by(|one, two| one.len().cmp(&two.len()).then_with(|| one.cmp(two)));
    minimal
}

fn check_cut_sets(graph: &BooleanGraph, cut_sets: &[Vec<i32>], limit: i32) {
    // P4: the order cap holds on every generated cut set.
    for cut_set in cut_sets {
        assert!(cut_set.len() <= limit as usize, "Cut set over the order limit: {:?}", cut_set);
    }
    // P1: every cut set satisfies the formula on its own.
    for cut_set in cut_sets {
        let mask = cut_set.iter().fold(0u32, |mask, &v| mask | 1 << (v - 1));
        assert!(
            eval(graph, graph.root(), mask),
            "Unsound cut set {:?} does not fail the top event",
            cut_set
        );
    }
    // P2: no cut set subsumes another.
    for one in cut_sets {
        for two in cut_sets {
            if one == two {
                continue;
            }
            assert!(
                !one.iter().all(|literal| two.contains(literal)),
                "Cut set {:?} is a subset of {:?}",
                one,
                two
            );
        }
    }
    // P3: every minimal satisfying assignment under the limit is reported.
    for minimal in brute_force_minimal(graph) {
        if minimal.len() <= limit as usize {
            assert!(
                cut_sets.contains(&minimal),
                "Missing minimal cut set {:?}",
                minimal
            );
        }
    }
}

#[test]
fn random_graphs_from_graph_path() {
    for seed in 0..SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let graph = random_graph(&mut rng);
        for limit in [2, NUM_VARS] {
            let settings = Settings::new().with_limit_order(limit);
            let mut zbdd = Zbdd::from_graph(&graph, &settings);
            zbdd.analyze();
            check_cut_sets(&graph, zbdd.cut_sets(), limit);
        }
    }
}

#[test]
fn random_graphs_mocus_path() {
    for seed in 0..SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let graph = random_graph(&mut rng);
        for limit in [2, NUM_VARS] {
            let settings = Settings::new().with_limit_order(limit);
            let mut zbdd = Mocus::new(&graph, &settings).analyze();
            zbdd.analyze();
            check_cut_sets(&graph, zbdd.cut_sets(), limit);
        }
    }
}

#[test]
fn paths_agree_on_cut_sets() {
    for seed in 0..SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let graph = random_graph(&mut rng);
        let settings = Settings::new().with_limit_order(NUM_VARS);
        let mut direct = Zbdd::from_graph(&graph, &settings);
        direct.analyze();
        let mut mocus = Mocus::new(&graph, &settings).analyze();
        mocus.analyze();
        assert_eq!(direct.cut_sets(), mocus.cut_sets(), "Paths disagree on seed {}", seed);
    }
}

// ─── Algebraic properties over random families ─────────────────────────────────

fn random_family(zbdd: &mut Zbdd, rng: &mut ChaCha8Rng) -> Vertex {
    let num_sets = rng.gen_range(1..=4);
    let mut family = Vertex::empty();
    for _ in 0..num_sets {
        let size = rng.gen_range(1..=3);
        let mut set = Vertex::base();
        let mut vars = HashSet::new();
        while vars.len() < size {
            let var = rng.gen_range(1..=NUM_VARS);
            if vars.insert(var) {
                let literal = zbdd.single_literal(var, var, false);
                set = zbdd.apply(Operator::And, &set, &literal, NUM_VARS);
            }
        }
        family = zbdd.apply(Operator::Or, &family, &set, NUM_VARS);
    }
    family
}

#[test]
fn minimize_is_idempotent() {
    // P5: a second Minimize returns the same vertex.
    for seed in 0..SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(100 + seed);
        let settings = Settings::new().with_limit_order(NUM_VARS);
        let mut zbdd = Zbdd::new(&settings);
        let family = random_family(&mut zbdd, &mut rng);
        let once = zbdd.minimize(&family);
        let twice = zbdd.minimize(&once);
        assert_eq!(once.id(), twice.id());
    }
}

#[test]
fn apply_is_commutative() {
    // P6: OR and AND are symmetric in their arguments.
    for seed in 0..SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(200 + seed);
        let settings = Settings::new().with_limit_order(NUM_VARS);
        let mut zbdd = Zbdd::new(&settings);
        let one = random_family(&mut zbdd, &mut rng);
        let two = random_family(&mut zbdd, &mut rng);
        for op in [Operator::Or, Operator::And] {
            let left = zbdd.apply(op, &one, &two, NUM_VARS);
            let right = zbdd.apply(op, &two, &one, NUM_VARS);
            assert_eq!(left.id(), right.id(), "{:?} is not commutative", op);
        }
    }
}

#[test]
fn apply_or_is_associative_on_literals() {
    // P7: balanced and skewed OR trees of single literals agree.
    let settings = Settings::new().with_limit_order(NUM_VARS);
    let mut zbdd = Zbdd::new(&settings);
    let literals: Vec<Vertex> = (1..=4).map(|v| zbdd.single_literal(v, v, false)).collect();

    let left_pair = zbdd.apply(Operator::Or, &literals[0], &literals[1], NUM_VARS);
    let right_pair = zbdd.apply(Operator::Or, &literals[2], &literals[3], NUM_VARS);
    let balanced = zbdd.apply(Operator::Or, &left_pair, &right_pair, NUM_VARS);

    let mut skewed = literals[0].clone();
    for literal in &literals[1..] {
        skewed = zbdd.apply(Operator::Or, &skewed, literal, NUM_VARS);
    }
    assert_eq!(balanced.id(), skewed.id());
}

#[test]
fn subsume_identities() {
    // P8: Empty drops nothing; Base drops everything.
    for seed in 0..SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(300 + seed);
        let settings = Settings::new().with_limit_order(NUM_VARS);
        let mut zbdd = Zbdd::new(&settings);
        let family = random_family(&mut zbdd, &mut rng);
        let with_empty = zbdd.subsume(&family, &Vertex::empty());
        assert_eq!(with_empty.id(), family.id());
        let with_base = zbdd.subsume(&family, &Vertex::base());
        assert!(with_base.is_empty());
    }
}

#[test]
fn hash_consing_shares_equal_subgraphs() {
    // P9: two constructions of one family meet in the same node.
    let settings = Settings::new().with_limit_order(NUM_VARS);
    let mut zbdd = Zbdd::new(&settings);
    let a = zbdd.single_literal(1, 1, false);
    let b = zbdd.single_literal(2, 2, false);
    let c = zbdd.single_literal(3, 3, false);

    // {{1, 2}, {1, 3}} as A(B + C) and as AB + AC.
    let b_or_c = zbdd.apply(Operator::Or, &b, &c, NUM_VARS);
    let factored = zbdd.apply(Operator::And, &a, &b_or_c, NUM_VARS);
    let ab = zbdd.apply(Operator::And, &a, &b, NUM_VARS);
    let ac = zbdd.apply(Operator::And, &a, &c, NUM_VARS);
    let expanded = zbdd.apply(Operator::Or, &ab, &ac, NUM_VARS);

    assert_eq!(factored.id(), expanded.id());
    assert!(std::rc::Rc::ptr_eq(factored.node(), expanded.node()));
}
