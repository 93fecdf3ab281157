use crate::Dimension;
use serde::{Deserialize, Serialize};

/// One row of the incident table.
///
/// `hours` is the average duration per incident of this row, so every
/// aggregate must weight it by `count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    #[serde(rename = "Site", default)]
    pub site: Option<String>,

    #[serde(rename = "Time frame", default)]
    pub time_frame: Option<String>,

    #[serde(rename = "Group", default)]
    pub group: Option<String>,

    #[serde(rename = "Category", default)]
    pub category: Option<String>,

    #[serde(rename = "Sub Cat", default)]
    pub sub_category: Option<String>,

    #[serde(rename = "Count", default)]
    pub count: u64,

    #[serde(rename = "Hours", default)]
    pub hours: f64,
}

impl IncidentRecord {
    pub fn new(count: u64, hours: f64) -> Self {
        Self {
            site: None,
            time_frame: None,
            group: None,
            category: None,
            sub_category: None,
            count,
            hours,
        }
    }

    /// Builder-style setter; blank values are stored as missing
    pub fn with(mut self, dimension: Dimension, value: impl Into<String>) -> Self {
        self.set(dimension, Some(value.into()));
        self
    }

    pub fn set(&mut self, dimension: Dimension, value: Option<String>) {
        let value = value.filter(|v| !v.trim().is_empty());
        match dimension {
            Dimension::Site => self.site = value,
            Dimension::TimeFrame => self.time_frame = value,
            Dimension::Group => self.group = value,
            Dimension::Category => self.category = value,
            Dimension::SubCategory => self.sub_category = value,
        }
    }

    /// Categorical value for a column, `None` when null or empty
    pub fn value(&self, dimension: Dimension) -> Option<&str> {
        let raw = match dimension {
            Dimension::Site => &self.site,
            Dimension::TimeFrame => &self.time_frame,
            Dimension::Group => &self.group,
            Dimension::Category => &self.category,
            Dimension::SubCategory => &self.sub_category,
        };
        raw.as_deref().filter(|v| !v.is_empty())
    }

    /// `hours * count`, the row's contribution to a group's total duration
    pub fn weighted_hours(&self) -> f64 {
        self.hours * self.count as f64
    }
}

/// Undirected adjacency between two named entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationRecord {
    #[serde(rename = "Source")]
    pub source: String,

    #[serde(rename = "Target")]
    pub target: String,
}

impl RelationRecord {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_missing() {
        let record = IncidentRecord::new(1, 2.0)
            .with(Dimension::Site, "  ")
            .with(Dimension::Group, "Ops");
        assert_eq!(record.value(Dimension::Site), None);
        assert_eq!(record.value(Dimension::Group), Some("Ops"));
        assert_eq!(record.value(Dimension::Category), None);
    }
}
