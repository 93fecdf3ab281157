use crate::config::FilterDependency;
use crate::error::{FilterError, Result};
use incident_protocol::Dimension;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef};
use std::collections::{HashMap, HashSet};

/// Directed driver → dependent graph between filter keys.
///
/// Dependents never feed back into their drivers: construction rejects
/// cycles, so a cascade always terminates.
#[derive(Debug, Clone)]
pub struct RecomputeGraph {
    graph: DiGraph<Dimension, ()>,
    index: HashMap<Dimension, NodeIndex>,
    order: Vec<NodeIndex>,
}

impl RecomputeGraph {
    pub fn new(dependencies: &[FilterDependency]) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for dep in dependencies {
            let from = *index
                .entry(dep.driver)
                .or_insert_with(|| graph.add_node(dep.driver));
            let to = *index
                .entry(dep.dependent)
                .or_insert_with(|| graph.add_node(dep.dependent));
            if from == to {
                return Err(FilterError::CyclicDependency(dep.driver));
            }
            graph.update_edge(from, to, ());
        }

        let order = toposort(&graph, None)
            .map_err(|cycle| FilterError::CyclicDependency(graph[cycle.node_id()]))?;

        Ok(Self {
            graph,
            index,
            order,
        })
    }

    /// Edges to re-run after `key` changed, drivers before their dependents
    pub fn cascade_from(&self, key: Dimension) -> Vec<FilterDependency> {
        let Some(&start) = self.index.get(&key) else {
            return Vec::new();
        };

        let mut reachable = HashSet::new();
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(node) = bfs.next(&self.graph) {
            reachable.insert(node);
        }

        self.order
            .iter()
            .filter(|node| reachable.contains(node))
            .flat_map(|&node| {
                self.graph.edges(node).map(|edge| FilterDependency {
                    driver: self.graph[edge.source()],
                    dependent: self.graph[edge.target()],
                })
            })
            .collect()
    }

    /// Every edge, drivers before their dependents
    pub fn all_edges(&self) -> Vec<FilterDependency> {
        self.order
            .iter()
            .flat_map(|&node| {
                self.graph.edges(node).map(|edge| FilterDependency {
                    driver: self.graph[edge.source()],
                    dependent: self.graph[edge.target()],
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dep(driver: Dimension, dependent: Dimension) -> FilterDependency {
        FilterDependency { driver, dependent }
    }

    #[test]
    fn cascade_follows_topological_order() {
        let graph = RecomputeGraph::new(&[
            dep(Dimension::Group, Dimension::Site),
            dep(Dimension::Category, Dimension::Group),
        ])
        .unwrap();

        assert_eq!(
            graph.cascade_from(Dimension::Category),
            vec![
                dep(Dimension::Category, Dimension::Group),
                dep(Dimension::Group, Dimension::Site),
            ]
        );
        assert_eq!(
            graph.cascade_from(Dimension::Group),
            vec![dep(Dimension::Group, Dimension::Site)]
        );
        assert!(graph.cascade_from(Dimension::Site).is_empty());
        assert!(graph.cascade_from(Dimension::TimeFrame).is_empty());
    }

    #[test]
    fn cycles_are_rejected() {
        let err = RecomputeGraph::new(&[
            dep(Dimension::Category, Dimension::Group),
            dep(Dimension::Group, Dimension::Category),
        ])
        .unwrap_err();
        assert!(matches!(err, FilterError::CyclicDependency(_)));
    }
}
