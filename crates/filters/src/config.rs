use incident_protocol::Dimension;
use serde::{Deserialize, Serialize};

/// One driver → dependent edge: selecting driver values re-derives the
/// dependent key's selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDependency {
    pub driver: Dimension,
    pub dependent: Dimension,
}

/// Configuration of the cascading filter panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filterable columns, in panel order
    pub filter_keys: Vec<Dimension>,

    /// Auto-selection edges between filter keys
    pub dependencies: Vec<FilterDependency>,

    /// Dependent values kept per selected driver value
    pub top_per_driver: usize,

    /// Pre-approved driver values for allow-list mode
    pub allow_list: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_keys: vec![
                Dimension::Site,
                Dimension::TimeFrame,
                Dimension::Group,
                Dimension::Category,
            ],
            dependencies: vec![FilterDependency {
                driver: Dimension::Category,
                dependent: Dimension::Group,
            }],
            top_per_driver: 2,
            allow_list: Vec::new(),
        }
    }
}

impl FilterConfig {
    /// Keys whose selection is derived rather than user-chosen by default
    pub fn is_dependent(&self, key: Dimension) -> bool {
        self.dependencies.iter().any(|dep| dep.dependent == key)
    }

    pub fn is_driver(&self, key: Dimension) -> bool {
        self.dependencies.iter().any(|dep| dep.driver == key)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.filter_keys.is_empty() {
            return Err("filter_keys must not be empty".to_string());
        }

        for (idx, key) in self.filter_keys.iter().enumerate() {
            if self.filter_keys[..idx].contains(key) {
                return Err(format!("filter key {key} is listed twice"));
            }
        }

        for dep in &self.dependencies {
            if dep.driver == dep.dependent {
                return Err(format!("filter key {} cannot drive itself", dep.driver));
            }
            for key in [dep.driver, dep.dependent] {
                if !self.filter_keys.contains(&key) {
                    return Err(format!("dependency key {key} is not a filter key"));
                }
            }
        }

        if self.top_per_driver == 0 {
            return Err("top_per_driver must be > 0".to_string());
        }

        Ok(())
    }
}
