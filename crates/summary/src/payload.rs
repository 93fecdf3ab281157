use crate::error::{Result, SummaryError};
use incident_graph::RelationGraph;
use incident_protocol::{DerivedStat, Dimension, IncidentRecord};
use incident_stats::StatsAggregator;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashSet;

pub const DEFAULT_TOP_OVERALL: usize = 5;
pub const DEFAULT_TOP_PER_CATEGORY: usize = 2;

/// Statistics for one selected category that still has filtered incidents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub time_frames: Vec<DerivedStat>,
    pub sites: Vec<DerivedStat>,
    pub groups: Vec<DerivedStat>,

    /// Opposite endpoint of every relation touching the category, table order
    pub related: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryConnections {
    pub category: String,

    /// Unique neighbors in first-seen order
    pub connections: Vec<String>,
}

/// Connectivity of the selected categories in the relation table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NetworkSummary {
    pub connections: Vec<CategoryConnections>,

    /// Unique targets of relations whose source is a selected category
    pub related_subcategories: Vec<String>,
}

/// Everything the prompt needs, taken from the filtered subset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPayload {
    pub selected_categories: Vec<String>,

    /// Every Category group, first-appearance order
    pub category_stats: Vec<DerivedStat>,

    pub top_categories: Vec<DerivedStat>,
    pub top_groups: Vec<DerivedStat>,
    pub top_sites: Vec<DerivedStat>,
    pub top_time_frames: Vec<DerivedStat>,

    pub categories: Vec<CategoryBreakdown>,
    pub network: NetworkSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum SummaryOutcome {
    NoCategoriesSelected,
    NoData,
    Ready(SummaryPayload),
}

impl SummaryOutcome {
    pub fn into_payload(self) -> Result<SummaryPayload> {
        match self {
            Self::NoCategoriesSelected => Err(SummaryError::NoCategoriesSelected),
            Self::NoData => Err(SummaryError::NoData),
            Self::Ready(payload) => Ok(payload),
        }
    }
}

pub struct SummaryPayloadBuilder {
    top_overall: usize,
    top_per_category: usize,
}

impl SummaryPayloadBuilder {
    pub fn new(top_overall: usize, top_per_category: usize) -> Self {
        Self {
            top_overall,
            top_per_category,
        }
    }

    /// Assemble the payload for `selected_categories` over the filtered rows.
    pub fn build(
        &self,
        incidents: &[IncidentRecord],
        relations: &RelationGraph,
        selected_categories: &[String],
    ) -> SummaryOutcome {
        if selected_categories.is_empty() {
            return SummaryOutcome::NoCategoriesSelected;
        }
        if incidents.is_empty() {
            return SummaryOutcome::NoData;
        }

        let category_stats = StatsAggregator::compute_stats(incidents, Dimension::Category);
        let top = |dimension: Dimension| {
            StatsAggregator::top_n(
                &StatsAggregator::compute_stats(incidents, dimension),
                self.top_overall,
            )
        };

        let categories: Vec<_> = selected_categories
            .iter()
            .filter_map(|category| self.breakdown(incidents, relations, category))
            .collect();

        log::debug!(
            "Summary payload: {} selected categories, {} with data",
            selected_categories.len(),
            categories.len()
        );

        SummaryOutcome::Ready(SummaryPayload {
            selected_categories: selected_categories.to_vec(),
            top_categories: StatsAggregator::top_n(&category_stats, self.top_overall),
            top_groups: top(Dimension::Group),
            top_sites: top(Dimension::Site),
            top_time_frames: top(Dimension::TimeFrame),
            category_stats,
            categories,
            network: network_summary(relations, selected_categories),
        })
    }

    fn breakdown(
        &self,
        incidents: &[IncidentRecord],
        relations: &RelationGraph,
        category: &str,
    ) -> Option<CategoryBreakdown> {
        let rows: Vec<IncidentRecord> = incidents
            .iter()
            .filter(|r| r.value(Dimension::Category) == Some(category))
            .cloned()
            .collect();
        if rows.is_empty() {
            return None;
        }

        let top = |dimension: Dimension| {
            StatsAggregator::top_n(
                &StatsAggregator::compute_stats(&rows, dimension),
                self.top_per_category,
            )
        };

        Some(CategoryBreakdown {
            category: category.to_string(),
            time_frames: top(Dimension::TimeFrame),
            sites: top(Dimension::Site),
            groups: top(Dimension::Group),
            related: neighbors_of(relations, category),
        })
    }
}

impl Default for SummaryPayloadBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_OVERALL, DEFAULT_TOP_PER_CATEGORY)
    }
}

/// A value absent from the relation table has no neighbors
fn neighbors_of(relations: &RelationGraph, value: &str) -> Vec<String> {
    relations
        .neighbors(value)
        .map(|found| found.into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}

fn network_summary(relations: &RelationGraph, selected: &[String]) -> NetworkSummary {
    let connections = selected
        .iter()
        .map(|category| CategoryConnections {
            category: category.clone(),
            connections: unique(neighbors_of(relations, category)),
        })
        .collect();

    let selected: HashSet<&str> = selected.iter().map(String::as_str).collect();
    let targets = relations
        .links()
        .filter(|edge| selected.contains(relations.graph[edge.source()].as_str()))
        .map(|edge| relations.graph[edge.target()].clone())
        .collect();

    NetworkSummary {
        connections,
        related_subcategories: unique(targets),
    }
}

fn unique(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
