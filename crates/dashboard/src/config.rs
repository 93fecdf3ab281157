use crate::error::{DashboardError, Result};
use incident_filters::{FilterConfig, FilterDependency};
use incident_graph::DEFAULT_FLOW_DIMENSIONS;
use incident_protocol::Dimension;
use incident_stats::{DEFAULT_THRESHOLD, MAX_DURATION, MIN_DURATION};
use incident_summary::{DEFAULT_TOP_OVERALL, DEFAULT_TOP_PER_CATEGORY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Dashboard settings, read from the root table of a TOML file.
///
/// ```toml
/// threshold = 3.5
/// filter_keys = ["Site", "Time frame", "Group", "Category"]
/// driver_key = "Category"
/// dependent_key = "Group"
/// allow_list = ["Network", "Storage"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Duration (hours) mapped to yellow
    pub threshold: f64,

    /// Filterable columns, in panel order
    pub filter_keys: Vec<Dimension>,

    /// Key whose selection drives the automatic one
    pub driver_key: Dimension,

    /// Key re-derived from the driver; starts unselected
    pub dependent_key: Dimension,

    pub top_per_driver: usize,

    /// Driver values kept by allow-list mode
    pub allow_list: Vec<String>,

    /// Column order of the flow diagram
    pub flow_dimensions: Vec<Dimension>,

    pub summary_top_overall: usize,
    pub summary_top_per_category: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let filters = FilterConfig::default();
        Self {
            threshold: DEFAULT_THRESHOLD,
            filter_keys: filters.filter_keys,
            driver_key: Dimension::Category,
            dependent_key: Dimension::Group,
            top_per_driver: filters.top_per_driver,
            allow_list: filters.allow_list,
            flow_dimensions: DEFAULT_FLOW_DIMENSIONS.to_vec(),
            summary_top_overall: DEFAULT_TOP_OVERALL,
            summary_top_per_category: DEFAULT_TOP_PER_CATEGORY,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| DashboardError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|err| match err {
            DashboardError::ParseConfig { message, .. } => DashboardError::ParseConfig {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        log::debug!("Loaded dashboard config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|err| DashboardError::ParseConfig {
            path: "<toml>".into(),
            message: err.to_string(),
        })?;
        config.validate().map_err(DashboardError::InvalidConfig)?;
        Ok(config)
    }

    /// Filter panel settings with the single driver → dependent edge
    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            filter_keys: self.filter_keys.clone(),
            dependencies: vec![FilterDependency {
                driver: self.driver_key,
                dependent: self.dependent_key,
            }],
            top_per_driver: self.top_per_driver,
            allow_list: self.allow_list.clone(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.threshold.is_finite() || !(MIN_DURATION..=MAX_DURATION).contains(&self.threshold) {
            return Err(format!(
                "threshold {} is outside [{MIN_DURATION}, {MAX_DURATION}]",
                self.threshold
            ));
        }

        self.filter_config().validate()?;

        if self.flow_dimensions.is_empty() {
            return Err("flow_dimensions must not be empty".to_string());
        }
        if self.summary_top_overall == 0 || self.summary_top_per_category == 0 {
            return Err("summary top counts must be > 0".to_string());
        }

        Ok(())
    }
}
