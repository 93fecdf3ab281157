use crate::config::FilterDependency;
use crate::error::Result;
use crate::state::FilterState;
use incident_protocol::IncidentRecord;
use std::collections::{BTreeSet, HashMap, HashSet};

/// How the driver key's selection was last changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverMode {
    /// Driver selection was edited directly (toggle, select all, reset)
    Selection,

    /// Driver selection was replaced by the allow-list toggle
    AllowList { checked: bool },
}

/// Derives a dependent key's selection from its driver's selection.
#[derive(Debug, Clone)]
pub struct TopNSelector {
    per_driver: usize,
    allow_list: Vec<String>,
}

impl TopNSelector {
    pub fn new(per_driver: usize, allow_list: Vec<String>) -> Self {
        Self {
            per_driver,
            allow_list,
        }
    }

    /// Re-derive `dep.dependent`, overriding whatever it held.
    ///
    /// In allow-list mode the driver selection is first narrowed to the
    /// allow-list and its "select all" toggle cleared.
    pub fn apply(
        &self,
        state: &mut FilterState,
        incidents: &[IncidentRecord],
        dep: FilterDependency,
        mode: DriverMode,
    ) -> Result<()> {
        if let DriverMode::AllowList { checked } = mode {
            let allowed: HashSet<&str> = self.allow_list.iter().map(String::as_str).collect();
            state.select_where(dep.driver, |value| checked && allowed.contains(value))?;
            state.set_select_all_checked(dep.driver, false)?;
        }

        let drivers = state.selected_values(dep.driver)?;
        if drivers.is_empty() {
            state.select_where(dep.dependent, |_| false)?;
            log::debug!("No {} selected; cleared {}", dep.driver, dep.dependent);
            return Ok(());
        }

        let top = self.top_dependents(incidents, dep, &drivers);
        log::debug!(
            "Auto-selected {} {} values from {} {} values",
            top.len(),
            dep.dependent,
            drivers.len(),
            dep.driver
        );
        state.select_where(dep.dependent, |value| top.contains(value))
    }

    /// Union over `drivers` of each value's top dependents by summed count.
    ///
    /// Ties rank by ascending dependent value.
    pub fn top_dependents(
        &self,
        incidents: &[IncidentRecord],
        dep: FilterDependency,
        drivers: &[String],
    ) -> BTreeSet<String> {
        let wanted: HashSet<&str> = drivers.iter().map(String::as_str).collect();
        let mut counts: HashMap<&str, HashMap<&str, u64>> = HashMap::new();

        for record in incidents {
            let (Some(driver), Some(dependent)) =
                (record.value(dep.driver), record.value(dep.dependent))
            else {
                continue;
            };
            if !wanted.contains(driver) {
                continue;
            }
            *counts
                .entry(driver)
                .or_default()
                .entry(dependent)
                .or_insert(0) += record.count;
        }

        let mut top = BTreeSet::new();
        for groups in counts.into_values() {
            let mut ranked: Vec<(&str, u64)> = groups.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            top.extend(
                ranked
                    .into_iter()
                    .take(self.per_driver)
                    .map(|(value, _)| value.to_string()),
            );
        }
        top
    }
}
