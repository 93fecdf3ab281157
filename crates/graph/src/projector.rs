use crate::scale::RadiusScale;
use crate::types::RelationGraph;
use incident_protocol::{DerivedNode, DerivedStat, Dimension, IncidentRecord, NodeLevel};
use incident_stats::{ColorScale, Rgb, StatsAggregator};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;

/// Node as handed to the network renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkNode {
    #[serde(flatten)]
    pub node: DerivedNode,

    /// Pixel radius from the square-root count scale
    pub radius: f64,

    /// Fill by average duration
    pub color: Option<Rgb>,
}

/// Link between two node positions in [`NetworkGraph::nodes`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkLink {
    pub source: usize,
    pub target: usize,
    pub count: u32,
}

/// Node-link view for one recompute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkGraph {
    pub nodes: Vec<NetworkNode>,
    pub links: Vec<NetworkLink>,
    pub max_count: u64,
}

/// Attaches incident statistics to relation-graph nodes.
///
/// A value resolves against Category-level statistics first, then
/// Subcategory-level; a value found at both levels takes the Category stats.
pub struct BipartiteProjector {
    category_stats: HashMap<String, DerivedStat>,
    subcategory_stats: HashMap<String, DerivedStat>,
}

impl BipartiteProjector {
    pub fn new(incidents: &[IncidentRecord]) -> Self {
        Self {
            category_stats: StatsAggregator::stats_by_key(incidents, Dimension::Category),
            subcategory_stats: StatsAggregator::stats_by_key(incidents, Dimension::SubCategory),
        }
    }

    pub fn node_stats(&self, value: &str) -> DerivedNode {
        if let Some(stat) = self.category_stats.get(value) {
            DerivedNode::from_stat(value, stat, NodeLevel::Category)
        } else if let Some(stat) = self.subcategory_stats.get(value) {
            DerivedNode::from_stat(value, stat, NodeLevel::Subcategory)
        } else {
            DerivedNode::unmatched(value)
        }
    }

    /// Enriched nodes in graph order
    pub fn project(&self, graph: &RelationGraph) -> Vec<DerivedNode> {
        graph
            .values()
            .map(|(_, value)| self.node_stats(value))
            .collect()
    }

    /// Full node-link view with radius and color per node
    pub fn network(&self, graph: &RelationGraph, colors: &ColorScale) -> NetworkGraph {
        let derived = self.project(graph);
        let radius = RadiusScale::for_nodes(&derived);

        let nodes = derived
            .into_iter()
            .map(|node| NetworkNode {
                radius: radius.radius(node.count),
                color: colors.color(node.avg_hours),
                node,
            })
            .collect();

        let links = graph
            .links()
            .map(|edge| NetworkLink {
                source: edge.source().index(),
                target: edge.target().index(),
                count: edge.weight().count,
            })
            .collect();

        NetworkGraph {
            nodes,
            links,
            max_count: radius.max_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_protocol::RelationRecord;
    use pretty_assertions::assert_eq;

    fn incidents() -> Vec<IncidentRecord> {
        vec![
            IncidentRecord::new(2, 3.0)
                .with(Dimension::Category, "Network")
                .with(Dimension::SubCategory, "DNS"),
            IncidentRecord::new(1, 9.0)
                .with(Dimension::Category, "Network")
                .with(Dimension::SubCategory, "Proxy"),
            IncidentRecord::new(4, 1.0)
                .with(Dimension::Category, "Storage")
                .with(Dimension::SubCategory, "Network"),
        ]
    }

    #[test]
    fn category_level_wins_over_subcategory() {
        let projector = BipartiteProjector::new(&incidents());
        let node = projector.node_stats("Network");

        assert_eq!(node.level, NodeLevel::Category);
        assert_eq!(node.count, 3);
        assert_eq!(node.total_hours, 15.0);
        assert_eq!(node.avg_hours, 5.0);
    }

    #[test]
    fn subcategory_and_unmatched_nodes() {
        let projector = BipartiteProjector::new(&incidents());

        let dns = projector.node_stats("DNS");
        assert_eq!(dns.level, NodeLevel::Subcategory);
        assert_eq!(dns.avg_hours, 3.0);

        assert_eq!(projector.node_stats("Firewall"), DerivedNode::unmatched("Firewall"));
    }

    #[test]
    fn network_attaches_radius_color_and_links() {
        let graph = RelationGraph::from_relations(&[
            RelationRecord::new("Network", "DNS"),
            RelationRecord::new("Firewall", "Firewall"),
        ]);
        let projector = BipartiteProjector::new(&incidents());
        let network = projector.network(&graph, &ColorScale::default());

        assert_eq!(network.max_count, 3);
        assert_eq!(network.nodes.len(), 3);
        assert_eq!(network.nodes[0].radius, 30.0);
        assert_eq!(network.nodes[2].node.count, 0);
        assert_eq!(network.nodes[2].radius, 5.0);
        assert_eq!(network.nodes[2].color, Some(Rgb::GREEN));
        assert_eq!(
            network.links,
            vec![
                NetworkLink { source: 0, target: 1, count: 1 },
                NetworkLink { source: 2, target: 2, count: 1 },
            ]
        );
    }
}
