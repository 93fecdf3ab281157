use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::view::{DashboardView, FilterPanel, Panel};
use incident_filters::CascadingFilters;
use incident_graph::{BipartiteProjector, FlowProjector, RelationGraph};
use incident_protocol::{
    ChatPrompt, Dimension, IncidentRecord, RelationRecord, VIEW_SCHEMA_VERSION,
};
use incident_stats::{ColorScale, WeightedTotals};
use incident_store::{load_incidents, load_relations, RecordStore};
use incident_summary::{PromptComposer, SummaryError, SummaryOutcome, SummaryPayloadBuilder};
use serde::Serialize;
use std::path::Path;

/// Which uploaded table a session is still waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Incidents,
    Relations,
}

/// Tables plus everything derived from them when the store changes
struct Loaded {
    store: RecordStore,
    relations: RelationGraph,
    filters: CascadingFilters,
}

/// Tables received before the other one arrived
#[derive(Default)]
struct Pending {
    incidents: Option<Vec<IncidentRecord>>,
    relations: Option<Vec<RelationRecord>>,
}

/// One user's dashboard.
///
/// Every mutation returns the freshly recomputed view, or `None` while a
/// table is still missing.
pub struct Dashboard {
    config: DashboardConfig,
    colors: ColorScale,
    flow: FlowProjector,
    summary: SummaryPayloadBuilder,
    pending: Pending,
    loaded: Option<Loaded>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        config.validate().map_err(DashboardError::InvalidConfig)?;
        let colors = ColorScale::new(config.threshold)?;
        Ok(Self {
            flow: FlowProjector::new(config.flow_dimensions.clone()),
            summary: SummaryPayloadBuilder::new(
                config.summary_top_overall,
                config.summary_top_per_category,
            ),
            colors,
            config,
            pending: Pending::default(),
            loaded: None,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn threshold(&self) -> f64 {
        self.colors.threshold()
    }

    pub fn store(&self) -> Option<&RecordStore> {
        self.loaded.as_ref().map(|loaded| &loaded.store)
    }

    pub fn filters(&self) -> Option<&CascadingFilters> {
        self.loaded.as_ref().map(|loaded| &loaded.filters)
    }

    /// Tables not uploaded yet
    pub fn awaiting(&self) -> Vec<TableKind> {
        if self.loaded.is_some() {
            return Vec::new();
        }
        let mut missing = Vec::new();
        if self.pending.incidents.is_none() {
            missing.push(TableKind::Incidents);
        }
        if self.pending.relations.is_none() {
            missing.push(TableKind::Relations);
        }
        missing
    }

    pub fn load_incidents(&mut self, path: &Path) -> Result<Option<DashboardView>> {
        let incidents = load_incidents(path)?;
        self.set_incidents(incidents)
    }

    pub fn load_relations(&mut self, path: &Path) -> Result<Option<DashboardView>> {
        let relations = load_relations(path)?;
        self.set_relations(relations)
    }

    /// Replace the incident table; filter state is rebuilt from scratch
    pub fn set_incidents(&mut self, incidents: Vec<IncidentRecord>) -> Result<Option<DashboardView>> {
        let relations = match self.loaded.take() {
            Some(loaded) => Some(loaded.store.into_parts().1),
            None => self.pending.relations.take(),
        };
        self.install(Some(incidents), relations)
    }

    /// Replace the relation table; filter state is rebuilt from scratch
    pub fn set_relations(&mut self, relations: Vec<RelationRecord>) -> Result<Option<DashboardView>> {
        let incidents = match self.loaded.take() {
            Some(loaded) => Some(loaded.store.into_parts().0),
            None => self.pending.incidents.take(),
        };
        self.install(incidents, Some(relations))
    }

    fn install(
        &mut self,
        incidents: Option<Vec<IncidentRecord>>,
        relations: Option<Vec<RelationRecord>>,
    ) -> Result<Option<DashboardView>> {
        match (incidents, relations) {
            (Some(incidents), Some(relations)) => {
                let filters = CascadingFilters::new(self.config.filter_config(), &incidents)?;
                let graph = RelationGraph::from_relations(&relations);
                let store = RecordStore::new(incidents, relations);
                log::info!(
                    "Dashboard ready: {} incident rows, {} relations",
                    store.incident_count(),
                    store.relation_count()
                );
                self.loaded = Some(Loaded {
                    store,
                    relations: graph,
                    filters,
                });
            }
            (incidents, relations) => {
                log::info!("Awaiting the remaining table before drawing");
                self.pending = Pending {
                    incidents,
                    relations,
                };
            }
        }
        Ok(self.recompute())
    }

    /// Rebuild every filter domain and re-derive the dependent key
    pub fn reset(&mut self) -> Result<Option<DashboardView>> {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.filters.reset(loaded.store.incidents())?;
        }
        Ok(self.recompute())
    }

    pub fn toggle(&mut self, key: Dimension, value: &str) -> Result<Option<DashboardView>> {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.filters.toggle(key, value, loaded.store.incidents())?;
        }
        Ok(self.recompute())
    }

    pub fn select_all(&mut self, key: Dimension, checked: bool) -> Result<Option<DashboardView>> {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.filters.select_all(key, checked, loaded.store.incidents())?;
        }
        Ok(self.recompute())
    }

    /// Allow-list mode on the configured driver key
    pub fn apply_allow_list(&mut self, checked: bool) -> Result<Option<DashboardView>> {
        let driver = self.config.driver_key;
        if let Some(loaded) = self.loaded.as_mut() {
            loaded
                .filters
                .apply_allow_list(driver, checked, loaded.store.incidents())?;
        }
        Ok(self.recompute())
    }

    /// Rebuild the color scale; an out-of-range threshold leaves it unchanged
    pub fn set_threshold(&mut self, threshold: f64) -> Result<Option<DashboardView>> {
        self.colors = ColorScale::new(threshold)?;
        self.config.threshold = threshold;
        Ok(self.recompute())
    }

    /// Filtered rows of the current selection
    pub fn filtered(&self) -> Option<Vec<IncidentRecord>> {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.filters.filtered(loaded.store.incidents()))
    }

    /// Full state → view-model transform; `None` until both tables exist
    pub fn recompute(&self) -> Option<DashboardView> {
        let loaded = self.loaded.as_ref()?;
        let state = loaded.filters.state();
        let incidents = loaded.filters.filtered(loaded.store.incidents());

        let filters = state
            .keys()
            .iter()
            .map(|&key| FilterPanel {
                key,
                select_all: state.select_all_checked(key).unwrap_or(false),
                options: state.sorted_view(key).unwrap_or_default(),
            })
            .collect();

        let (flow, network) = if incidents.is_empty() {
            log::debug!("No incidents match the current filters");
            (Panel::no_data(), Panel::no_data())
        } else {
            let projector = BipartiteProjector::new(&incidents);
            (
                Panel::Ready(self.flow.project(&incidents, &self.colors)),
                Panel::Ready(projector.network(&loaded.relations, &self.colors)),
            )
        };

        Some(DashboardView {
            schema_version: VIEW_SCHEMA_VERSION,
            threshold: self.colors.threshold(),
            filters,
            matched_rows: incidents.len(),
            matched_incidents: WeightedTotals::of(&incidents).count,
            flow,
            network,
        })
    }

    /// Payload for the selected categories over the filtered subset
    pub fn summary_payload(&self) -> Result<SummaryOutcome> {
        let loaded = self.loaded.as_ref().ok_or(DashboardError::AwaitingData)?;
        let incidents = loaded.filters.filtered(loaded.store.incidents());
        let selected = loaded
            .filters
            .selected_values(Dimension::Category)
            .unwrap_or_default();
        Ok(self.summary.build(&incidents, &loaded.relations, &selected))
    }

    /// Snapshot request for "summarize"
    pub fn summary_request(&self) -> Result<ChatPrompt> {
        let payload = self.summary_payload()?.into_payload()?;
        Ok(PromptComposer::summarize(&payload))
    }

    /// Snapshot request for "ask"; the question is checked before anything else
    pub fn ask_request(&self, question: &str) -> Result<ChatPrompt> {
        if question.trim().is_empty() {
            return Err(SummaryError::EmptyQuestion.into());
        }
        let payload = self.summary_payload()?.into_payload()?;
        Ok(PromptComposer::ask(question, &payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn incidents() -> Vec<IncidentRecord> {
        vec![
            IncidentRecord::new(2, 3.0)
                .with(Dimension::Site, "Pune")
                .with(Dimension::TimeFrame, "Morning")
                .with(Dimension::Group, "Ops")
                .with(Dimension::Category, "Network")
                .with(Dimension::SubCategory, "DNS"),
            IncidentRecord::new(1, 9.0)
                .with(Dimension::Site, "Austin")
                .with(Dimension::TimeFrame, "Night")
                .with(Dimension::Group, "Dev")
                .with(Dimension::Category, "Storage")
                .with(Dimension::SubCategory, "Disk"),
        ]
    }

    fn relations() -> Vec<RelationRecord> {
        vec![RelationRecord::new("Network", "DNS")]
    }

    #[test]
    fn awaits_both_tables() {
        let mut dashboard = Dashboard::new(DashboardConfig::default()).unwrap();
        assert_eq!(
            dashboard.awaiting(),
            vec![TableKind::Incidents, TableKind::Relations]
        );

        assert!(dashboard.set_incidents(incidents()).unwrap().is_none());
        assert_eq!(dashboard.awaiting(), vec![TableKind::Relations]);
        assert!(dashboard.toggle(Dimension::Site, "Pune").unwrap().is_none());

        let view = dashboard.set_relations(relations()).unwrap().unwrap();
        assert!(dashboard.awaiting().is_empty());
        assert_eq!(view.matched_rows, 2);
        assert_eq!(view.matched_incidents, 3);
    }

    #[test]
    fn reupload_keeps_the_other_table() {
        let mut dashboard = Dashboard::new(DashboardConfig::default()).unwrap();
        dashboard.set_incidents(incidents()).unwrap();
        dashboard.set_relations(relations()).unwrap();

        dashboard.toggle(Dimension::Site, "Pune").unwrap();
        let view = dashboard.set_incidents(incidents()).unwrap().unwrap();

        assert_eq!(dashboard.store().unwrap().relation_count(), 1);
        // Filter state was rebuilt, so the toggle is gone
        assert_eq!(view.matched_rows, 2);
    }

    #[test]
    fn threshold_changes_recolor_and_bad_values_are_rejected() {
        let mut dashboard = Dashboard::new(DashboardConfig::default()).unwrap();
        dashboard.set_incidents(incidents()).unwrap();
        dashboard.set_relations(relations()).unwrap();

        let view = dashboard.set_threshold(5.0).unwrap().unwrap();
        assert_eq!(view.threshold, 5.0);

        assert!(matches!(
            dashboard.set_threshold(12.0),
            Err(DashboardError::Stats(_))
        ));
        assert_eq!(dashboard.threshold(), 5.0);
    }

    #[test]
    fn ask_checks_the_question_first() {
        let dashboard = Dashboard::new(DashboardConfig::default()).unwrap();
        assert!(matches!(
            dashboard.ask_request("  "),
            Err(DashboardError::Summary(SummaryError::EmptyQuestion))
        ));
        assert!(matches!(
            dashboard.ask_request("why?"),
            Err(DashboardError::AwaitingData)
        ));
    }
}
