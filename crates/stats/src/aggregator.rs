use incident_protocol::derived::weighted_average;
use incident_protocol::{DerivedStat, Dimension, IncidentRecord};
use std::collections::HashMap;

/// Running `Σcount` and `Σ(hours · count)` for a group of rows
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedTotals {
    pub count: u64,
    pub weighted_hours: f64,
}

impl WeightedTotals {
    pub fn add(&mut self, record: &IncidentRecord) {
        self.count += record.count;
        self.weighted_hours += record.weighted_hours();
    }

    pub fn of<'a>(records: impl IntoIterator<Item = &'a IncidentRecord>) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals.add(record);
        }
        totals
    }

    /// Weighted mean duration, `None` when the group holds zero incidents
    pub fn avg_hours(&self) -> Option<f64> {
        weighted_average(self.weighted_hours, self.count)
    }

    pub fn into_stat(self, key: impl Into<String>) -> DerivedStat {
        DerivedStat::new(key, self.count, self.weighted_hours)
    }
}

/// Grouped, count-weighted statistics over any record subset
pub struct StatsAggregator;

impl StatsAggregator {
    /// Group `records` by `group_key` in first-appearance order.
    ///
    /// Rows without a value for `group_key` belong to no group.
    pub fn compute_stats(records: &[IncidentRecord], group_key: Dimension) -> Vec<DerivedStat> {
        let mut order: Vec<(&str, WeightedTotals)> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();

        for record in records {
            let Some(key) = record.value(group_key) else {
                continue;
            };
            let slot = *slots.entry(key).or_insert_with(|| {
                order.push((key, WeightedTotals::default()));
                order.len() - 1
            });
            order[slot].1.add(record);
        }

        order
            .into_iter()
            .map(|(key, totals)| totals.into_stat(key))
            .collect()
    }

    /// Same groups as [`compute_stats`](Self::compute_stats), keyed by value
    pub fn stats_by_key(
        records: &[IncidentRecord],
        group_key: Dimension,
    ) -> HashMap<String, DerivedStat> {
        Self::compute_stats(records, group_key)
            .into_iter()
            .map(|stat| (stat.key.clone(), stat))
            .collect()
    }

    /// Highest counts first; equal counts by ascending key
    pub fn top_n(stats: &[DerivedStat], n: usize) -> Vec<DerivedStat> {
        let mut ranked = stats.to_vec();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(site: &str, count: u64, hours: f64) -> IncidentRecord {
        IncidentRecord::new(count, hours).with(Dimension::Site, site)
    }

    #[test]
    fn weighted_average_over_two_rows() {
        let stats = StatsAggregator::compute_stats(
            &[row("Pune", 2, 3.0), row("Pune", 1, 9.0)],
            Dimension::Site,
        );

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 3);
        assert_eq!(stats[0].total_hours, 15.0);
        assert_eq!(stats[0].avg_hours, Some(5.0));
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let stats = StatsAggregator::compute_stats(
            &[row("Pune", 1, 1.0), row("Agra", 1, 1.0), row("Pune", 1, 1.0)],
            Dimension::Site,
        );
        let keys: Vec<_> = stats.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["Pune", "Agra"]);
    }

    #[test]
    fn zero_count_group_reports_no_data() {
        let stats = StatsAggregator::compute_stats(&[row("Pune", 0, 4.0)], Dimension::Site);
        assert_eq!(stats[0].count, 0);
        assert_eq!(stats[0].avg_hours, None);
    }

    #[test]
    fn rows_missing_the_key_are_not_grouped() {
        let stats = StatsAggregator::compute_stats(
            &[row("Pune", 1, 1.0), IncidentRecord::new(5, 1.0)],
            Dimension::Site,
        );
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 1);
    }

    #[test]
    fn top_n_breaks_ties_by_key() {
        let stats = vec![
            DerivedStat::new("C", 7, 7.0),
            DerivedStat::new("D", 1, 1.0),
            DerivedStat::new("B", 7, 7.0),
            DerivedStat::new("A", 10, 10.0),
        ];
        let keys: Vec<_> = StatsAggregator::top_n(&stats, 3)
            .into_iter()
            .map(|s| s.key)
            .collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert!(StatsAggregator::top_n(&stats, 0).is_empty());
        assert_eq!(StatsAggregator::top_n(&stats, 10).len(), 4);
    }
}
