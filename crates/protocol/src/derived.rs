use serde::{Deserialize, Serialize};

/// Weighted aggregate for one group of incident rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStat {
    pub key: String,

    #[serde(rename = "Count")]
    pub count: u64,

    /// Σ(hours · count) over the group
    #[serde(rename = "TotalHours")]
    pub total_hours: f64,

    /// `total_hours / count`; `None` ("no data") when the group's count is zero
    #[serde(rename = "AvgHours")]
    pub avg_hours: Option<f64>,
}

impl DerivedStat {
    pub fn new(key: impl Into<String>, count: u64, total_hours: f64) -> Self {
        let avg_hours = weighted_average(total_hours, count);
        Self {
            key: key.into(),
            count,
            total_hours,
            avg_hours,
        }
    }
}

/// `total / count` normalized so that a zero count never produces NaN
pub fn weighted_average(total: f64, count: u64) -> Option<f64> {
    if count == 0 {
        return None;
    }
    let avg = total / count as f64;
    avg.is_finite().then_some(avg)
}

/// Grouping level a projected node's statistics were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeLevel {
    Category,
    Subcategory,
    Unmatched,
}

/// Relation-graph node enriched with incident statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedNode {
    pub value: String,

    #[serde(rename = "TotalHours")]
    pub total_hours: f64,

    #[serde(rename = "Count")]
    pub count: u64,

    #[serde(rename = "AvgHours")]
    pub avg_hours: f64,

    pub level: NodeLevel,
}

impl DerivedNode {
    pub fn unmatched(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            total_hours: 0.0,
            count: 0,
            avg_hours: 0.0,
            level: NodeLevel::Unmatched,
        }
    }

    /// Attach a group's statistics; a zero-count group still yields zeros
    pub fn from_stat(value: impl Into<String>, stat: &DerivedStat, level: NodeLevel) -> Self {
        let total_hours = if stat.total_hours.is_finite() {
            stat.total_hours
        } else {
            0.0
        };
        Self {
            value: value.into(),
            total_hours,
            count: stat.count,
            avg_hours: stat.avg_hours.unwrap_or(0.0),
            level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_group_has_no_average() {
        let stat = DerivedStat::new("Idle", 0, 0.0);
        assert_eq!(stat.avg_hours, None);

        let node = DerivedNode::from_stat("Idle", &stat, NodeLevel::Category);
        assert_eq!(node.avg_hours, 0.0);
        assert_eq!(node.count, 0);
    }

    #[test]
    fn weighted_average_divides_total_by_count() {
        assert_eq!(weighted_average(15.0, 3), Some(5.0));
        assert_eq!(weighted_average(15.0, 0), None);
    }
}
