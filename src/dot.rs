use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use crate::vertex::Vertex;
use crate::zbdd::Zbdd;

impl Zbdd {
    /// Renders the ZBDD and its modules as a Graphviz digraph.
    ///
    /// High edges are solid, low edges dashed; terminals are squares; module
    /// proxies are double circles with a dotted edge into their subgraph.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph zbdd {{")?;
        writeln!(dot, "node [shape=circle];")?;
        writeln!(dot, "{{ rank=sink")?;
        writeln!(dot, "term0 [shape=square, label=\"0\"];")?;
        writeln!(dot, "term1 [shape=square, label=\"1\"];")?;
        writeln!(dot, "}}")?;

        let modules: BTreeMap<i32, Vertex> = self.modules().iter().map(|(&k, v)| (k, v.clone())).collect();
        let mut visited = HashSet::new();
        write_vertex(self.root(), &modules, &mut dot, &mut visited)?;
        for module in modules.values() {
            write_vertex(module, &modules, &mut dot, &mut visited)?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

fn vertex_name(vertex: &Vertex) -> String {
    match vertex {
        Vertex::Terminal(value) => format!("term{}", *value as u8),
        Vertex::Node(node) => format!("n{}", node.id()),
    }
}

fn write_vertex(
    vertex: &Vertex,
    modules: &BTreeMap<i32, Vertex>,
    dot: &mut String,
    visited: &mut HashSet<u64>,
) -> std::fmt::Result {
    let node = match vertex {
        Vertex::Terminal(_) => return Ok(()),
        Vertex::Node(node) => node,
    };
    if !visited.insert(node.id()) {
        return Ok(());
    }
    let name = vertex_name(vertex);
    if node.module() {
        writeln!(dot, "{} [shape=doublecircle, label=\"m{}\"];", name, node.index())?;
        if let Some(module) = modules.get(&node.index()) {
            writeln!(dot, "{} -> {} [style=dotted];", name, vertex_name(module))?;
        }
    } else if node.index() < 0 {
        writeln!(dot, "{} [label=\"~x{}\"];", name, -node.index())?;
    } else {
        writeln!(dot, "{} [label=\"x{}\"];", name, node.index())?;
    }
    let high = node.high();
    let low = node.low();
    writeln!(dot, "{} -> {};", name, vertex_name(&high))?;
    writeln!(dot, "{} -> {} [style=dashed];", name, vertex_name(&low))?;
    write_vertex(&high, modules, dot, visited)?;
    write_vertex(&low, modules, dot, visited)
}

#[cfg(test)]
mod tests {
    use crate::graph::{BooleanGraph, GateType};
    use crate::settings::Settings;
    use crate::zbdd::Zbdd;

    #[test]
    fn test_dot_output_shape() {
        let mut graph = BooleanGraph::new(2);
        graph.add_gate(3, GateType::And);
        graph.add_variable_arg(3, 1);
        graph.add_variable_arg(3, 2);
        graph.set_root(3);

        let settings = Settings::new().with_limit_order(2);
        let zbdd = Zbdd::from_graph(&graph, &settings);
        let dot = zbdd.to_dot().unwrap();
        assert!(dot.starts_with("digraph zbdd {"));
        assert!(dot.contains("[label=\"x1\"]"));
        assert!(dot.contains("[label=\"x2\"]"));
        assert!(dot.contains("[style=dashed]"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
