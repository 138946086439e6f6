//! Tier classification for a single budget.
//!
//! Rules are checked from most to least severe and the first match wins:
//!
//! ```text
//! exceeded or >= 100%   critical
//! >= 90%                warning
//! >= 75%                info
//! <  50% with spend     success
//! otherwise             no alert
//! ```
//!
//! The 50-75% band (and untouched budgets) deliberately produce nothing, so
//! budgets that are merely on pace stay quiet.

use crate::budget::{self, BudgetMetrics, BudgetRecord};

use super::{Alert, AlertDetails, AlertTier};

pub const CRITICAL_PERCENT: f64 = 100.0;
pub const WARNING_PERCENT: f64 = 90.0;
pub const INFO_PERCENT: f64 = 75.0;
pub const SUCCESS_CEILING_PERCENT: f64 = 50.0;

/// Pick the tier for a record, or `None` when it falls in the quiet band.
pub fn tier_for(spent: f64, metrics: &BudgetMetrics) -> Option<AlertTier> {
    let pct = metrics.percentage_used;
    if metrics.is_exceeded || pct >= CRITICAL_PERCENT {
        Some(AlertTier::Critical)
    } else if pct >= WARNING_PERCENT {
        Some(AlertTier::Warning)
    } else if pct >= INFO_PERCENT {
        Some(AlertTier::Info)
    } else if pct < SUCCESS_CEILING_PERCENT && spent > 0.0 {
        Some(AlertTier::Success)
    } else {
        None
    }
}

/// Classify one record into at most one alert.
///
/// `days_remaining` comes from [`budget::days_remaining`]; every division by
/// it is guarded with `max(days_remaining, 1)`.
pub fn classify(record: &BudgetRecord, days_remaining: i64) -> Option<Alert> {
    let metrics = record.metrics();
    let tier = tier_for(record.spent, &metrics)?;

    let pct = metrics.percentage_used;
    let remaining = metrics.remaining;
    let total_days = budget::total_days(&record.period);
    let daily_average = record.spent / budget::days_elapsed(&record.period, days_remaining) as f64;
    let daily_cap = remaining / days_remaining.max(1) as f64;
    let category = &record.category_name;

    let mut details = AlertDetails {
        spent: record.spent,
        budgeted: record.budgeted,
        percentage: pct,
        remaining,
        period: record.period.to_string(),
        days_remaining,
        overage: None,
        daily_limit: None,
        daily_average: None,
        projected_overage: None,
        projected_savings: None,
    };

    let (title, message, action) = match tier {
        AlertTier::Critical => {
            let overage = remaining.abs();
            details.remaining = overage;
            details.overage = Some(overage);
            let message = if metrics.is_exceeded {
                format!("You've overspent by {:.2}", overage)
            } else {
                format!("You've used your entire {:.2} budget", record.budgeted)
            };
            (
                format!("{} Budget Exceeded!", category),
                message,
                "Reduce spending immediately".to_string(),
            )
        }
        AlertTier::Warning => {
            details.daily_limit = Some(daily_cap);
            let projected = daily_average * days_remaining as f64 - remaining;
            if projected > 0.0 {
                details.projected_overage = Some(projected);
            }
            (
                format!("{} Budget Alert", category),
                format!(
                    "Only {:.2} remaining ({:.0}% left)",
                    remaining,
                    100.0 - pct
                ),
                format!("Limit spending to {:.2}/day", daily_cap),
            )
        }
        AlertTier::Info => {
            details.daily_average = Some(daily_average);
            (
                format!("{} Budget Notice", category),
                format!("{:.0}% used with {} days left", pct, days_remaining),
                format!("Stay under {:.2}/day", daily_cap),
            )
        }
        AlertTier::Success => {
            details.daily_average = Some(daily_average);
            details.projected_savings = Some(record.budgeted - daily_average * total_days as f64);
            (
                format!("{} On Track!", category),
                format!("Great job! You're doing well with {:.0}% used", pct),
                "Keep up the good work!".to_string(),
            )
        }
    };

    Some(Alert {
        id: record.alert_id(),
        tier,
        priority: tier.priority(),
        budget_id: record.budget_id.clone(),
        category_name: record.category_name.clone(),
        title,
        message,
        action,
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertPriority;
    use crate::budget::BudgetPeriod;

    fn record(budgeted: f64, spent: f64) -> BudgetRecord {
        BudgetRecord::new("1", "Groceries", BudgetPeriod::Monthly, budgeted, spent)
    }

    #[test]
    fn test_overspent_is_critical() {
        let alert = classify(&record(200.0, 210.0), 12).unwrap();
        assert_eq!(alert.tier, AlertTier::Critical);
        assert_eq!(alert.priority, AlertPriority::High);
        assert_eq!(alert.details.remaining, 10.0);
        assert_eq!(alert.details.overage, Some(10.0));
        assert_eq!(alert.message, "You've overspent by 10.00");
        assert_eq!(alert.action, "Reduce spending immediately");
        assert_eq!(alert.title, "Groceries Budget Exceeded!");
    }

    #[test]
    fn test_exactly_full_is_critical() {
        let alert = classify(&record(100.0, 100.0), 5).unwrap();
        assert_eq!(alert.tier, AlertTier::Critical);
        assert_eq!(alert.details.overage, Some(0.0));
    }

    #[test]
    fn test_spend_without_budget_is_critical() {
        let alert = classify(&record(0.0, 15.0), 30).unwrap();
        assert_eq!(alert.tier, AlertTier::Critical);
        assert_eq!(alert.details.percentage, 0.0);
        assert_eq!(alert.details.remaining, 15.0);
    }

    #[test]
    fn test_ninety_percent_is_warning_with_daily_limit() {
        let alert = classify(&record(100.0, 92.0), 4).unwrap();
        assert_eq!(alert.tier, AlertTier::Warning);
        assert_eq!(alert.priority, AlertPriority::High);
        assert_eq!(alert.details.remaining, 8.0);
        assert_eq!(alert.details.daily_limit, Some(2.0));
        assert_eq!(alert.action, "Limit spending to 2.00/day");
        assert_eq!(alert.message, "Only 8.00 remaining (8% left)");
    }

    #[test]
    fn test_warning_with_no_days_left_uses_one_day() {
        let alert = classify(&record(100.0, 95.0), 0).unwrap();
        assert_eq!(alert.details.daily_limit, Some(5.0));
    }

    #[test]
    fn test_warning_projects_overage() {
        // 20 days elapsed at 4.6/day, 10 days left: 46 more against 8 remaining.
        let alert = classify(&record(100.0, 92.0), 10).unwrap();
        let projected = alert.details.projected_overage.unwrap();
        assert!((projected - 38.0).abs() < 1e-9);
    }

    #[test]
    fn test_seventy_five_percent_is_info() {
        let alert = classify(&record(100.0, 80.0), 10).unwrap();
        assert_eq!(alert.tier, AlertTier::Info);
        assert_eq!(alert.priority, AlertPriority::Medium);
        assert_eq!(alert.details.daily_average, Some(4.0));
        assert_eq!(alert.action, "Stay under 2.00/day");
        assert_eq!(alert.message, "80% used with 10 days left");
    }

    #[test]
    fn test_under_half_is_success() {
        let alert = classify(&record(100.0, 40.0), 30).unwrap();
        assert_eq!(alert.tier, AlertTier::Success);
        assert_eq!(alert.priority, AlertPriority::Low);
        assert_eq!(alert.action, "Keep up the good work!");
        assert!(alert.details.projected_savings.is_some());
    }

    #[test]
    fn test_quiet_band_produces_nothing() {
        for spent in [50.0, 60.0, 74.99] {
            assert!(classify(&record(100.0, spent), 10).is_none(), "spent {}", spent);
        }
    }

    #[test]
    fn test_untouched_budget_produces_nothing() {
        assert!(classify(&record(100.0, 0.0), 30).is_none());
        assert!(classify(&record(0.0, 0.0), 30).is_none());
    }

    #[test]
    fn test_boundaries() {
        let tier = |spent: f64| classify(&record(100.0, spent), 10).map(|a| a.tier);
        assert_eq!(tier(99.99), Some(AlertTier::Warning));
        assert_eq!(tier(90.0), Some(AlertTier::Warning));
        assert_eq!(tier(89.99), Some(AlertTier::Info));
        assert_eq!(tier(75.0), Some(AlertTier::Info));
        assert_eq!(tier(49.99), Some(AlertTier::Success));
        assert_eq!(tier(0.01), Some(AlertTier::Success));
    }

    #[test]
    fn test_alert_id_and_period_detail() {
        let rec = BudgetRecord::new("42", "Travel", BudgetPeriod::Yearly, 1000.0, 100.0);
        let alert = classify(&rec, 200).unwrap();
        assert_eq!(alert.id, "budget-42-yearly");
        assert_eq!(alert.budget_id, "42");
        assert_eq!(alert.details.period, "yearly");
        assert_eq!(alert.details.days_remaining, 200);
    }
}
