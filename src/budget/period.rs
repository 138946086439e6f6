//! Period arithmetic.
//!
//! Period lengths come from a fixed table, not the calendar: a month is
//! always 30 days and a year 365. Unrecognised periods use the monthly
//! length. A missing start date means the whole period is assumed to remain.

use chrono::{DateTime, Duration, Utc};

use super::BudgetPeriod;

const DAILY_DAYS: i64 = 1;
const WEEKLY_DAYS: i64 = 7;
const MONTHLY_DAYS: i64 = 30;
const YEARLY_DAYS: i64 = 365;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Nominal length of a period in days.
pub fn total_days(period: &BudgetPeriod) -> i64 {
    match period {
        BudgetPeriod::Daily => DAILY_DAYS,
        BudgetPeriod::Weekly => WEEKLY_DAYS,
        BudgetPeriod::Monthly | BudgetPeriod::Other(_) => MONTHLY_DAYS,
        BudgetPeriod::Yearly => YEARLY_DAYS,
    }
}

/// Whole days left in the current period instance, never negative.
///
/// Partial days round up, so a period ending later today still has one day.
pub fn days_remaining(
    period: &BudgetPeriod,
    start_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> i64 {
    let total = total_days(period);
    let Some(start) = start_date else {
        return total;
    };

    let end = start + Duration::days(total);
    let left = (end - now).num_milliseconds() as f64 / MILLIS_PER_DAY;
    (left.ceil() as i64).max(0)
}

/// Days already spent in the period, at least one so it can be used as a divisor.
pub fn days_elapsed(period: &BudgetPeriod, days_remaining: i64) -> i64 {
    (total_days(period) - days_remaining).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_total_days_table() {
        assert_eq!(total_days(&BudgetPeriod::Daily), 1);
        assert_eq!(total_days(&BudgetPeriod::Weekly), 7);
        assert_eq!(total_days(&BudgetPeriod::Monthly), 30);
        assert_eq!(total_days(&BudgetPeriod::Yearly), 365);
        assert_eq!(total_days(&BudgetPeriod::parse("quarterly")), 30);
    }

    #[test]
    fn test_missing_start_date_assumes_full_period() {
        let now = at(2024, 3, 10, 12);
        assert_eq!(days_remaining(&BudgetPeriod::Weekly, None, now), 7);
        assert_eq!(days_remaining(&BudgetPeriod::parse("bogus"), None, now), 30);
    }

    #[test]
    fn test_days_remaining_rounds_up() {
        let start = at(2024, 3, 1, 0);
        // Period ends 2024-03-31T00:00; 20.5 days left rounds to 21.
        assert_eq!(
            days_remaining(&BudgetPeriod::Monthly, Some(start), at(2024, 3, 10, 12)),
            21
        );
        // Exactly on a day boundary.
        assert_eq!(
            days_remaining(&BudgetPeriod::Weekly, Some(start), at(2024, 3, 5, 0)),
            3
        );
    }

    #[test]
    fn test_days_remaining_clamps_at_zero() {
        let start = at(2024, 1, 1, 0);
        assert_eq!(
            days_remaining(&BudgetPeriod::Daily, Some(start), at(2024, 2, 1, 0)),
            0
        );
    }

    #[test]
    fn test_days_elapsed_never_zero() {
        assert_eq!(days_elapsed(&BudgetPeriod::Monthly, 30), 1);
        assert_eq!(days_elapsed(&BudgetPeriod::Monthly, 10), 20);
        assert_eq!(days_elapsed(&BudgetPeriod::Daily, 0), 1);
    }
}
