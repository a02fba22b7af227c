use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::TableDescriptor;

/// Table-level foreign-key dependency graph.
///
/// Each node maps to the tables it references. Nodes keep first-encounter
/// order, which is also the tie-break order of [`topological_sort`].
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    self_references: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    dependencies: Vec<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with no dependencies if it is not already present.
    pub fn add_node(&mut self, name: &str) {
        if self.index.contains_key(name) {
            return;
        }
        self.index.insert(name.to_string(), self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            dependencies: Vec::new(),
        });
    }

    /// Record that `table` references `referenced`. Both become nodes.
    pub fn add_edge(&mut self, table: &str, referenced: &str) {
        self.add_node(table);
        self.add_node(referenced);
        if let Some(&idx) = self.index.get(table) {
            let dependencies = &mut self.nodes[idx].dependencies;
            if !dependencies.iter().any(|dep| dep == referenced) {
                dependencies.push(referenced.to_string());
            }
        }
    }

    fn add_self_reference(&mut self, table: &str, column: &str) {
        self.self_references
            .entry(table.to_string())
            .or_default()
            .push(column.to_string());
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.name.as_str())
    }

    /// Tables referenced by `table`; empty for unknown tables.
    pub fn dependencies(&self, table: &str) -> &[String] {
        self.index
            .get(table)
            .map(|&idx| self.nodes[idx].dependencies.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, table: &str) -> bool {
        self.index.contains_key(table)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.dependencies.len()).sum()
    }

    /// Columns of `table` that reference `table` itself.
    pub fn self_references(&self, table: &str) -> &[String] {
        self.self_references
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn self_reference_count(&self) -> usize {
        self.self_references.values().map(Vec::len).sum()
    }
}

/// Build the dependency graph for a set of tables.
///
/// Self-referencing foreign keys are not edges; they are tracked separately
/// so the synthesizer can leave the first row's reference empty.
pub fn build_graph(tables: &[TableDescriptor]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();

    for table in tables {
        graph.add_node(&table.name);

        for column in &table.columns {
            let Some(referenced) = column.referenced_table() else {
                continue;
            };
            if referenced == table.name {
                graph.add_self_reference(&table.name, &column.name);
            } else {
                graph.add_edge(&table.name, referenced);
            }
        }
    }

    graph
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Unvisited,
    InProgress,
    Done,
}

struct Frame<'a> {
    node: &'a str,
    next: usize,
}

/// Order tables so every table appears after all tables it references.
///
/// Depth-first with an explicit frame stack. Every node is tried as a root so
/// disconnected components are included. A node reached again while still on
/// the current path is a cycle and yields [`Error::CyclicDependency`].
pub fn topological_sort(graph: &DependencyGraph) -> Result<Vec<String>> {
    let mut states: HashMap<&str, NodeState> = graph
        .nodes()
        .map(|node| (node, NodeState::Unvisited))
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    for root in graph.nodes() {
        if states.get(root) != Some(&NodeState::Unvisited) {
            continue;
        }

        states.insert(root, NodeState::InProgress);
        let mut stack = vec![Frame {
            node: root,
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let Some(dependency) = graph.dependencies(node).get(frame.next) else {
                states.insert(node, NodeState::Done);
                order.push(node.to_string());
                stack.pop();
                continue;
            };
            frame.next += 1;

            let dependency = dependency.as_str();
            match states
                .get(dependency)
                .copied()
                .unwrap_or(NodeState::Unvisited)
            {
                NodeState::Done => {}
                NodeState::InProgress => return Err(cycle_error(&stack, dependency)),
                NodeState::Unvisited => {
                    states.insert(dependency, NodeState::InProgress);
                    stack.push(Frame {
                        node: dependency,
                        next: 0,
                    });
                }
            }
        }
    }

    Ok(order)
}

fn cycle_error(stack: &[Frame<'_>], reentered: &str) -> Error {
    let start = stack
        .iter()
        .position(|frame| frame.node == reentered)
        .unwrap_or(0);
    let mut cycle: Vec<String> = stack[start..]
        .iter()
        .map(|frame| frame.node.to_string())
        .collect();
    cycle.push(reentered.to_string());
    Error::CyclicDependency { cycle }
}

/// Summary of graph structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub self_references: usize,
}

/// Dependency report: either a seed order or the offending cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphReport {
    pub summary: GraphSummary,
    pub order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
}

/// Build the dependency report for a set of tables.
pub fn build_graph_report(tables: &[TableDescriptor]) -> GraphReport {
    let graph = build_graph(tables);
    let summary = GraphSummary {
        nodes: graph.len(),
        edges: graph.edge_count(),
        self_references: graph.self_reference_count(),
    };

    match topological_sort(&graph) {
        Ok(order) => GraphReport {
            summary,
            order: Some(order),
            cycle: None,
        },
        Err(Error::CyclicDependency { cycle }) => GraphReport {
            summary,
            order: None,
            cycle: Some(cycle),
        },
        Err(_) => GraphReport {
            summary,
            order: None,
            cycle: None,
        },
    }
}
