//! Alert generation, filtering and summaries.
//!
//! Everything here is a pure function of `(records, dismissed ids, now)`:
//! calling it twice with the same arguments gives the same output.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::budget::{self, BudgetRecord};

use super::{classify, Alert, AlertTier, TierFilter};

/// Classify every non-dismissed record and order the result by priority.
///
/// Dismissed records are skipped before classification. The sort is stable,
/// so alerts that share a priority keep the order of their input records.
pub fn generate(
    records: &[BudgetRecord],
    dismissed: &HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = records
        .iter()
        .filter(|record| !dismissed.contains(&record.alert_id()))
        .filter_map(|record| {
            let days = budget::days_remaining(&record.period, record.start_date, now);
            classify(record, days)
        })
        .collect();

    alerts.sort_by_key(|alert| alert.priority);
    alerts
}

/// Alerts matching a tier filter, in their existing order.
pub fn filter(alerts: &[Alert], tier: TierFilter) -> Vec<Alert> {
    alerts
        .iter()
        .filter(|alert| tier.matches(alert.tier))
        .cloned()
        .collect()
}

/// Number of alerts per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub success: usize,
}

impl TierCounts {
    pub fn get(&self, tier: AlertTier) -> usize {
        match tier {
            AlertTier::Critical => self.critical,
            AlertTier::Warning => self.warning,
            AlertTier::Info => self.info,
            AlertTier::Success => self.success,
        }
    }

    fn bump(&mut self, tier: AlertTier) {
        match tier {
            AlertTier::Critical => self.critical += 1,
            AlertTier::Warning => self.warning += 1,
            AlertTier::Info => self.info += 1,
            AlertTier::Success => self.success += 1,
        }
    }
}

/// Counts over the produced alerts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCounts {
    pub counts_by_tier: TierCounts,
    pub total_alerts: usize,
}

/// Totals over every visible budget, alerted or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverview {
    pub total_spent: f64,
    pub total_budgeted: f64,
    /// `None` when no budget is visible.
    pub min_days_remaining: Option<i64>,
}

/// Banner summary: alert counts plus the budget overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    #[serde(flatten)]
    pub counts: AlertCounts,
    #[serde(flatten)]
    pub overview: BudgetOverview,
}

pub fn summarize(alerts: &[Alert]) -> AlertCounts {
    let mut counts = TierCounts::default();
    for alert in alerts {
        counts.bump(alert.tier);
    }
    AlertCounts {
        counts_by_tier: counts,
        total_alerts: alerts.len(),
    }
}

/// Aggregate spend over all non-dismissed budgets.
///
/// Unlike [`summarize`], budgets in the quiet band count here too.
pub fn overview(
    records: &[BudgetRecord],
    dismissed: &HashSet<String>,
    now: DateTime<Utc>,
) -> BudgetOverview {
    records
        .iter()
        .filter(|record| !dismissed.contains(&record.alert_id()))
        .fold(BudgetOverview::default(), |mut acc, record| {
            let days = budget::days_remaining(&record.period, record.start_date, now);
            acc.total_spent += record.spent;
            acc.total_budgeted += record.budgeted;
            acc.min_days_remaining = Some(acc.min_days_remaining.map_or(days, |d| d.min(days)));
            acc
        })
}

pub fn build_summary(
    records: &[BudgetRecord],
    alerts: &[Alert],
    dismissed: &HashSet<String>,
    now: DateTime<Utc>,
) -> AlertSummary {
    AlertSummary {
        counts: summarize(alerts),
        overview: overview(records, dismissed, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetPeriod;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn rec(id: &str, budgeted: f64, spent: f64) -> BudgetRecord {
        BudgetRecord::new(id, format!("Category {}", id), BudgetPeriod::Monthly, budgeted, spent)
    }

    fn ids(alerts: &[Alert]) -> Vec<&str> {
        alerts.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_priority_stable() {
        let records = vec![
            rec("1", 100.0, 40.0),  // success
            rec("2", 100.0, 120.0), // critical
            rec("3", 100.0, 95.0),  // warning
        ];
        let alerts = generate(&records, &HashSet::new(), now());
        let tiers: Vec<AlertTier> = alerts.iter().map(|a| a.tier).collect();
        assert_eq!(
            tiers,
            vec![AlertTier::Critical, AlertTier::Warning, AlertTier::Success]
        );
    }

    #[test]
    fn test_same_priority_keeps_input_order() {
        let records = vec![
            rec("1", 100.0, 95.0),  // warning
            rec("2", 100.0, 80.0),  // info
            rec("3", 100.0, 150.0), // critical
        ];
        let alerts = generate(&records, &HashSet::new(), now());
        assert_eq!(
            ids(&alerts),
            vec!["budget-1-monthly", "budget-3-monthly", "budget-2-monthly"]
        );
    }

    #[test]
    fn test_dismissed_records_are_skipped() {
        let records = vec![rec("1", 100.0, 120.0), rec("2", 100.0, 92.0)];
        let dismissed: HashSet<String> = ["budget-1-monthly".to_string()].into();
        let alerts = generate(&records, &dismissed, now());
        assert_eq!(ids(&alerts), vec!["budget-2-monthly"]);
    }

    #[test]
    fn test_generate_is_idempotent() {
        let records = vec![
            rec("1", 100.0, 40.0),
            rec("2", 100.0, 60.0),
            rec("3", 100.0, 101.0),
        ];
        let dismissed: HashSet<String> = ["budget-9-monthly".to_string()].into();
        assert_eq!(
            generate(&records, &dismissed, now()),
            generate(&records, &dismissed, now())
        );
    }

    #[test]
    fn test_quiet_band_not_in_output() {
        let alerts = generate(&[rec("1", 100.0, 60.0)], &HashSet::new(), now());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_filter() {
        let records = vec![
            rec("1", 100.0, 40.0),
            rec("2", 100.0, 120.0),
            rec("3", 100.0, 30.0),
        ];
        let alerts = generate(&records, &HashSet::new(), now());

        assert_eq!(filter(&alerts, TierFilter::All), alerts);
        assert_eq!(
            ids(&filter(&alerts, AlertTier::Success.into())),
            vec!["budget-1-monthly", "budget-3-monthly"]
        );
        assert!(filter(&alerts, AlertTier::Info.into()).is_empty());
    }

    #[test]
    fn test_summarize_counts() {
        let records = vec![
            rec("1", 100.0, 40.0),
            rec("2", 100.0, 120.0),
            rec("3", 100.0, 92.0),
            rec("4", 100.0, 10.0),
        ];
        let counts = summarize(&generate(&records, &HashSet::new(), now()));
        assert_eq!(counts.total_alerts, 4);
        assert_eq!(counts.counts_by_tier.get(AlertTier::Critical), 1);
        assert_eq!(counts.counts_by_tier.get(AlertTier::Warning), 1);
        assert_eq!(counts.counts_by_tier.get(AlertTier::Info), 0);
        assert_eq!(counts.counts_by_tier.get(AlertTier::Success), 2);
    }

    #[test]
    fn test_overview_includes_quiet_budgets() {
        let start = Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap();
        let mut weekly = rec("2", 50.0, 10.0).with_start_date(start);
        weekly.period = BudgetPeriod::Weekly;
        let records = vec![
            rec("1", 100.0, 60.0), // quiet band, full month left
            weekly,
            rec("3", 200.0, 250.0), // dismissed
        ];
        let dismissed: HashSet<String> = ["budget-3-monthly".to_string()].into();

        let summary = build_summary(
            &records,
            &generate(&records, &dismissed, now()),
            &dismissed,
            now(),
        );
        assert_eq!(summary.counts.total_alerts, 1);
        assert_eq!(summary.overview.total_spent, 70.0);
        assert_eq!(summary.overview.total_budgeted, 150.0);
        // Weekly from 2024-03-08 ends 2024-03-15; 4.5 days left rounds to 5.
        assert_eq!(summary.overview.min_days_remaining, Some(5));
    }

    #[test]
    fn test_overview_empty() {
        let overview = overview(&[], &HashSet::new(), now());
        assert_eq!(overview.total_spent, 0.0);
        assert_eq!(overview.min_days_remaining, None);
    }

    #[test]
    fn test_summary_json_shape() {
        let records = vec![rec("1", 100.0, 120.0)];
        let alerts = generate(&records, &HashSet::new(), now());
        let summary = build_summary(&records, &alerts, &HashSet::new(), now());
        let json = serde_json::to_value(summary).unwrap();

        assert_eq!(json["countsByTier"]["critical"], 1);
        assert_eq!(json["totalAlerts"], 1);
        assert_eq!(json["totalSpent"], 120.0);
        assert_eq!(json["totalBudgeted"], 100.0);
        assert_eq!(json["minDaysRemaining"], 30);
    }
}
