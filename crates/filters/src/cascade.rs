use crate::config::FilterConfig;
use crate::dependency::RecomputeGraph;
use crate::error::{FilterError, Result};
use crate::state::FilterState;
use crate::topn::{DriverMode, TopNSelector};
use incident_protocol::{Dimension, IncidentRecord};

/// Filter panel: selection state plus the driver → dependent cascade.
///
/// Every mutation re-derives the keys downstream of the changed key before
/// returning.
#[derive(Debug, Clone)]
pub struct CascadingFilters {
    config: FilterConfig,
    graph: RecomputeGraph,
    selector: TopNSelector,
    state: FilterState,
}

impl CascadingFilters {
    pub fn new(config: FilterConfig, incidents: &[IncidentRecord]) -> Result<Self> {
        config.validate().map_err(FilterError::InvalidConfig)?;
        let graph = RecomputeGraph::new(&config.dependencies)?;
        let selector = TopNSelector::new(config.top_per_driver, config.allow_list.clone());

        let mut filters = Self {
            config,
            graph,
            selector,
            state: FilterState::default(),
        };
        filters.reset(incidents)?;
        Ok(filters)
    }

    /// Rebuild every domain and re-derive all dependent keys
    pub fn reset(&mut self, incidents: &[IncidentRecord]) -> Result<()> {
        let unselected: Vec<Dimension> = self
            .config
            .filter_keys
            .iter()
            .copied()
            .filter(|&key| self.config.is_dependent(key))
            .collect();
        self.state = FilterState::initialize(&self.config.filter_keys, &unselected, incidents);

        for dep in self.graph.all_edges() {
            self.selector
                .apply(&mut self.state, incidents, dep, DriverMode::Selection)?;
        }
        Ok(())
    }

    pub fn toggle(&mut self, key: Dimension, value: &str, incidents: &[IncidentRecord]) -> Result<bool> {
        let selected = self.state.toggle(key, value)?;
        self.cascade(key, incidents, DriverMode::Selection)?;
        Ok(selected)
    }

    pub fn select_all(&mut self, key: Dimension, checked: bool, incidents: &[IncidentRecord]) -> Result<()> {
        self.state.select_all(key, checked)?;
        self.cascade(key, incidents, DriverMode::Selection)
    }

    /// Narrow `driver` to the configured allow-list (or clear it when
    /// unchecked) and re-derive its dependents
    pub fn apply_allow_list(
        &mut self,
        driver: Dimension,
        checked: bool,
        incidents: &[IncidentRecord],
    ) -> Result<()> {
        if !self.config.is_driver(driver) {
            return Err(FilterError::InvalidConfig(format!(
                "{driver} does not drive any filter key"
            )));
        }
        self.cascade(driver, incidents, DriverMode::AllowList { checked })
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn filtered(&self, incidents: &[IncidentRecord]) -> Vec<IncidentRecord> {
        self.state.filtered(incidents)
    }

    pub fn selected_values(&self, key: Dimension) -> Result<Vec<String>> {
        self.state.selected_values(key)
    }

    fn cascade(&mut self, key: Dimension, incidents: &[IncidentRecord], mode: DriverMode) -> Result<()> {
        for dep in self.graph.cascade_from(key) {
            // Only the edges leaving the changed key see the allow-list mode
            let edge_mode = if dep.driver == key { mode } else { DriverMode::Selection };
            self.selector.apply(&mut self.state, incidents, dep, edge_mode)?;
        }
        Ok(())
    }
}
