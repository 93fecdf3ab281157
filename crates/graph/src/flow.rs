use incident_protocol::{Dimension, IncidentRecord};
use incident_stats::{ColorScale, Rgb, WeightedTotals};
use serde::Serialize;
use std::collections::HashMap;

/// Column order of the default flow diagram
pub const DEFAULT_FLOW_DIMENSIONS: [Dimension; 4] = [
    Dimension::TimeFrame,
    Dimension::Site,
    Dimension::Group,
    Dimension::Category,
];

/// Aggregated `(dimension, value)` box of the flow diagram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub dimension: Dimension,
    pub key: String,

    /// Σcount of contributing rows
    pub size: u64,

    /// Count-weighted mean duration; `None` when `size` is zero
    #[serde(rename = "Hours")]
    pub hours: Option<f64>,

    pub color: Option<Rgb>,
}

/// Band between two nodes of adjacent dimensions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowLink {
    /// Position in [`FlowDiagram::nodes`]
    pub source: usize,
    pub target: usize,
    pub size: u64,

    #[serde(rename = "Hours")]
    pub hours: Option<f64>,

    pub color: Option<Rgb>,
}

/// Flow-diagram view for one recompute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowDiagram {
    pub dimensions: Vec<Dimension>,
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

/// Aggregates incident rows into flow nodes and links.
///
/// Every row contributes to one node per dimension and one link per pair of
/// adjacent dimensions; values missing from a row contribute nothing.
pub struct FlowProjector {
    dimensions: Vec<Dimension>,
}

impl FlowProjector {
    pub fn new(dimensions: Vec<Dimension>) -> Self {
        Self { dimensions }
    }

    pub fn project(&self, incidents: &[IncidentRecord], colors: &ColorScale) -> FlowDiagram {
        let mut nodes: Vec<((Dimension, &str), WeightedTotals)> = Vec::new();
        let mut node_slots: HashMap<(Dimension, &str), usize> = HashMap::new();
        let mut links: Vec<((usize, usize), WeightedTotals)> = Vec::new();
        let mut link_slots: HashMap<(usize, usize), usize> = HashMap::new();

        for record in incidents {
            let mut previous: Option<usize> = None;
            for &dimension in &self.dimensions {
                let Some(value) = record.value(dimension) else {
                    previous = None;
                    continue;
                };
                let node = *node_slots.entry((dimension, value)).or_insert_with(|| {
                    nodes.push(((dimension, value), WeightedTotals::default()));
                    nodes.len() - 1
                });
                nodes[node].1.add(record);

                if let Some(source) = previous {
                    let link = *link_slots.entry((source, node)).or_insert_with(|| {
                        links.push(((source, node), WeightedTotals::default()));
                        links.len() - 1
                    });
                    links[link].1.add(record);
                }
                previous = Some(node);
            }
        }

        log::debug!(
            "Flow diagram: {} nodes, {} links from {} rows",
            nodes.len(),
            links.len(),
            incidents.len()
        );

        FlowDiagram {
            dimensions: self.dimensions.clone(),
            nodes: nodes
                .into_iter()
                .map(|((dimension, key), totals)| FlowNode {
                    dimension,
                    key: key.to_string(),
                    size: totals.count,
                    hours: totals.avg_hours(),
                    color: colors.color_for(totals.avg_hours()),
                })
                .collect(),
            links: links
                .into_iter()
                .map(|((source, target), totals)| FlowLink {
                    source,
                    target,
                    size: totals.count,
                    hours: totals.avg_hours(),
                    color: colors.color_for(totals.avg_hours()),
                })
                .collect(),
        }
    }
}

impl Default for FlowProjector {
    fn default() -> Self {
        Self::new(DEFAULT_FLOW_DIMENSIONS.to_vec())
    }
}
