use crate::error::{GraphError, Result};
use incident_protocol::RelationRecord;
use petgraph::graph::{EdgeReference, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Edge in relation graph, one per relation row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationLink {
    /// Number of relation rows this link stands for
    pub count: u32,
}

/// Undirected graph over the shared value space of both relation columns.
///
/// Node identity is value equality: a value appearing as `Source` in one row
/// and `Target` in another is a single node.
pub struct RelationGraph {
    /// Undirected graph (value -- value)
    pub graph: UnGraph<String, RelationLink>,

    /// Value -> NodeIndex mapping for fast lookup
    pub value_index: HashMap<String, NodeIndex>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            value_index: HashMap::new(),
        }
    }

    /// Nodes in first-appearance order, one edge per row (self-edges kept)
    pub fn from_relations(relations: &[RelationRecord]) -> Self {
        let mut graph = Self::new();
        for relation in relations {
            let source = graph.add_node(&relation.source);
            let target = graph.add_node(&relation.target);
            graph.graph.add_edge(source, target, RelationLink { count: 1 });
        }

        log::info!(
            "Built relation graph: {} nodes, {} links",
            graph.node_count(),
            graph.edge_count()
        );

        graph
    }

    /// Add node unless the value is already present
    pub fn add_node(&mut self, value: &str) -> NodeIndex {
        if let Some(&idx) = self.value_index.get(value) {
            return idx;
        }
        let idx = self.graph.add_node(value.to_string());
        self.value_index.insert(value.to_string(), idx);
        idx
    }

    pub fn find_node(&self, value: &str) -> Option<NodeIndex> {
        self.value_index.get(value).copied()
    }

    /// Node values in insertion order
    pub fn values(&self) -> impl Iterator<Item = (NodeIndex, &str)> {
        self.graph
            .node_indices()
            .map(move |idx| (idx, self.graph[idx].as_str()))
    }

    /// Links in relation-table order
    pub fn links(&self) -> impl Iterator<Item = EdgeReference<'_, RelationLink>> {
        self.graph.edge_references()
    }

    /// Opposite endpoint of every link touching `value`, in table order.
    /// A self-link lists the value itself once.
    pub fn neighbors(&self, value: &str) -> Result<Vec<&str>> {
        let node = self
            .find_node(value)
            .ok_or_else(|| GraphError::NodeNotFound(value.to_string()))?;

        Ok(self
            .links()
            .filter_map(|edge| {
                if edge.source() == node {
                    Some(edge.target())
                } else if edge.target() == node {
                    Some(edge.source())
                } else {
                    None
                }
            })
            .map(|idx| self.graph[idx].as_str())
            .collect())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for RelationGraph {
    fn default() -> Self {
        Self::new()
    }
}
