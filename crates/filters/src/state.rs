use crate::error::{FilterError, Result};
use incident_protocol::{Dimension, IncidentRecord};
use incident_store::distinct_values;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// One checkbox of a filter key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub selected: bool,
}

/// Options and "select all" toggle of a single filter key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct KeyState {
    options: Vec<FilterOption>,
    select_all: bool,
}

/// Per-key selection state.
///
/// Domains are fixed when the state is built; afterwards only the
/// `selected` flags change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    keys: Vec<Dimension>,
    entries: BTreeMap<Dimension, KeyState>,
}

impl FilterState {
    /// Enumerate each key's domain. Every option starts selected except those
    /// of the `unselected` keys, whose selection is derived later.
    pub fn initialize(
        keys: &[Dimension],
        unselected: &[Dimension],
        incidents: &[IncidentRecord],
    ) -> Self {
        let mut entries = BTreeMap::new();
        for &key in keys {
            let selected = !unselected.contains(&key);
            let options = distinct_values(incidents, key)
                .into_iter()
                .map(|value| FilterOption { value, selected })
                .collect();
            entries.insert(
                key,
                KeyState {
                    options,
                    select_all: selected,
                },
            );
        }

        log::debug!("Filter state initialized for {} keys", keys.len());

        Self {
            keys: keys.to_vec(),
            entries,
        }
    }

    pub fn keys(&self) -> &[Dimension] {
        &self.keys
    }

    /// Flip one option; returns its new state
    pub fn toggle(&mut self, key: Dimension, value: &str) -> Result<bool> {
        let option = self
            .entry_mut(key)?
            .options
            .iter_mut()
            .find(|opt| opt.value == value)
            .ok_or_else(|| FilterError::UnknownValue {
                key,
                value: value.to_string(),
            })?;
        option.selected = !option.selected;
        Ok(option.selected)
    }

    pub fn select_all(&mut self, key: Dimension, checked: bool) -> Result<()> {
        let entry = self.entry_mut(key)?;
        for option in &mut entry.options {
            option.selected = checked;
        }
        entry.select_all = checked;
        Ok(())
    }

    /// Replace a key's selection with exactly the values accepted by `keep`
    pub fn select_where(&mut self, key: Dimension, keep: impl Fn(&str) -> bool) -> Result<()> {
        for option in &mut self.entry_mut(key)?.options {
            option.selected = keep(&option.value);
        }
        Ok(())
    }

    pub fn set_select_all_checked(&mut self, key: Dimension, checked: bool) -> Result<()> {
        self.entry_mut(key)?.select_all = checked;
        Ok(())
    }

    /// State of the key's "select all" toggle
    pub fn select_all_checked(&self, key: Dimension) -> Result<bool> {
        Ok(self.entry(key)?.select_all)
    }

    pub fn selected_values(&self, key: Dimension) -> Result<Vec<String>> {
        Ok(self
            .entry(key)?
            .options
            .iter()
            .filter(|opt| opt.selected)
            .map(|opt| opt.value.clone())
            .collect())
    }

    /// Options as the panel shows them: selected first, then alphabetical
    pub fn sorted_view(&self, key: Dimension) -> Result<Vec<FilterOption>> {
        let mut options = self.entry(key)?.options.clone();
        options.sort_by(|a, b| {
            b.selected
                .cmp(&a.selected)
                .then_with(|| alphabetical(&a.value, &b.value))
        });
        Ok(options)
    }

    /// Rows passing every key's constraint.
    ///
    /// A key with nothing selected, or with its whole domain selected,
    /// constrains nothing.
    pub fn filtered(&self, incidents: &[IncidentRecord]) -> Vec<IncidentRecord> {
        let constraints: Vec<(Dimension, HashSet<&str>)> = self
            .keys
            .iter()
            .filter_map(|&key| {
                let entry = self.entries.get(&key)?;
                let selected: HashSet<&str> = entry
                    .options
                    .iter()
                    .filter(|opt| opt.selected)
                    .map(|opt| opt.value.as_str())
                    .collect();
                let unconstrained = selected.is_empty() || selected.len() == entry.options.len();
                (!unconstrained).then_some((key, selected))
            })
            .collect();

        incidents
            .iter()
            .filter(|record| {
                constraints.iter().all(|(key, selected)| {
                    record
                        .value(*key)
                        .is_some_and(|value| selected.contains(value))
                })
            })
            .cloned()
            .collect()
    }

    fn entry(&self, key: Dimension) -> Result<&KeyState> {
        self.entries.get(&key).ok_or(FilterError::UnknownKey(key))
    }

    fn entry_mut(&mut self, key: Dimension) -> Result<&mut KeyState> {
        self.entries.get_mut(&key).ok_or(FilterError::UnknownKey(key))
    }
}

/// Case-insensitive order, raw value as tie-break
fn alphabetical(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn incidents() -> Vec<IncidentRecord> {
        vec![
            IncidentRecord::new(3, 1.0)
                .with(Dimension::Site, "Pune")
                .with(Dimension::Group, "Ops"),
            IncidentRecord::new(1, 2.0)
                .with(Dimension::Site, "Chennai")
                .with(Dimension::Group, "Dev"),
            IncidentRecord::new(2, 4.0).with(Dimension::Group, "Ops"),
        ]
    }

    #[test]
    fn dependent_key_starts_unselected() {
        let state = FilterState::initialize(
            &[Dimension::Site, Dimension::Group],
            &[Dimension::Group],
            &incidents(),
        );

        assert_eq!(
            state.selected_values(Dimension::Site).unwrap(),
            vec!["Chennai", "Pune"]
        );
        assert!(state.selected_values(Dimension::Group).unwrap().is_empty());
        assert!(state.select_all_checked(Dimension::Site).unwrap());
        assert!(!state.select_all_checked(Dimension::Group).unwrap());
    }

    #[test]
    fn sorted_view_puts_selected_first() {
        let mut state = FilterState::initialize(&[Dimension::Group], &[], &incidents());
        state.toggle(Dimension::Group, "Dev").unwrap();

        let view = state.sorted_view(Dimension::Group).unwrap();
        assert_eq!(
            view,
            vec![
                FilterOption {
                    value: "Ops".into(),
                    selected: true
                },
                FilterOption {
                    value: "Dev".into(),
                    selected: false
                },
            ]
        );
    }

    #[test]
    fn sorted_view_ignores_case() {
        let data = vec![
            IncidentRecord::new(1, 1.0).with(Dimension::Site, "apple"),
            IncidentRecord::new(1, 1.0).with(Dimension::Site, "Banana"),
            IncidentRecord::new(1, 1.0).with(Dimension::Site, "Apple"),
        ];
        let state = FilterState::initialize(&[Dimension::Site], &[], &data);

        let values: Vec<String> = state
            .sorted_view(Dimension::Site)
            .unwrap()
            .into_iter()
            .map(|opt| opt.value)
            .collect();
        assert_eq!(values, vec!["Apple", "apple", "Banana"]);
    }

    #[test]
    fn empty_selection_matches_everything() {
        let data = incidents();
        let mut state = FilterState::initialize(&[Dimension::Site], &[], &data);
        state.select_all(Dimension::Site, false).unwrap();
        assert_eq!(state.filtered(&data).len(), data.len());
    }

    #[test]
    fn full_selection_keeps_rows_missing_the_key() {
        let data = incidents();
        let state = FilterState::initialize(&[Dimension::Site, Dimension::Group], &[], &data);
        assert_eq!(state.filtered(&data), data);
    }

    #[test]
    fn partial_selection_drops_rows_missing_the_key() {
        let data = incidents();
        let mut state = FilterState::initialize(&[Dimension::Site], &[], &data);
        state.toggle(Dimension::Site, "Chennai").unwrap();

        let rows = state.filtered(&data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value(Dimension::Site), Some("Pune"));
    }

    #[test]
    fn unknown_value_is_rejected() {
        let mut state = FilterState::initialize(&[Dimension::Site], &[], &incidents());
        assert_eq!(
            state.toggle(Dimension::Site, "Mumbai"),
            Err(FilterError::UnknownValue {
                key: Dimension::Site,
                value: "Mumbai".into()
            })
        );
        assert_eq!(
            state.toggle(Dimension::Category, "x"),
            Err(FilterError::UnknownKey(Dimension::Category))
        );
    }
}
