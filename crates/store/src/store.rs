use incident_protocol::{Dimension, IncidentRecord, RelationRecord};
use std::collections::BTreeSet;

/// Both uploaded tables, replaced wholesale on every re-upload.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    incidents: Vec<IncidentRecord>,
    relations: Vec<RelationRecord>,
}

impl RecordStore {
    pub fn new(incidents: Vec<IncidentRecord>, relations: Vec<RelationRecord>) -> Self {
        log::info!(
            "Record store loaded: {} incidents, {} relations",
            incidents.len(),
            relations.len()
        );
        Self {
            incidents,
            relations,
        }
    }

    pub fn incidents(&self) -> &[IncidentRecord] {
        &self.incidents
    }

    /// Distinct non-null values of a column, sorted ascending
    pub fn domain(&self, dimension: Dimension) -> Vec<String> {
        distinct_values(&self.incidents, dimension)
    }

    pub fn incident_count(&self) -> usize {
        self.incidents.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn into_parts(self) -> (Vec<IncidentRecord>, Vec<RelationRecord>) {
        (self.incidents, self.relations)
    }
}

/// Distinct non-null values of a column across `records`, sorted ascending
pub fn distinct_values(records: &[IncidentRecord], dimension: Dimension) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.value(dimension))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn domain_skips_missing_values_and_sorts() {
        let store = RecordStore::new(
            vec![
                IncidentRecord::new(1, 1.0).with(Dimension::Site, "Pune"),
                IncidentRecord::new(1, 1.0),
                IncidentRecord::new(1, 1.0).with(Dimension::Site, "Chennai"),
                IncidentRecord::new(1, 1.0).with(Dimension::Site, "Pune"),
            ],
            vec![],
        );

        assert_eq!(store.domain(Dimension::Site), vec!["Chennai", "Pune"]);
        assert_eq!(store.incident_count(), 4);
        assert!(store.domain(Dimension::Group).is_empty());
    }
}
