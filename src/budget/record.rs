//! Budget records as delivered by the Budget Status service.
//!
//! Records are read-only input. Every numeric field is decoded leniently:
//! a missing, null, non-numeric or non-finite amount becomes `0.0` instead of
//! failing the whole snapshot. Derived figures (`percentage_used`,
//! `remaining`, `is_exceeded`) are never taken from the wire; see
//! [`BudgetRecord::metrics`].

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Category label used when the service sends none.
const UNKNOWN_CATEGORY: &str = "Unknown";

/// Recurring window over which a budget cap applies.
///
/// Unrecognised values are preserved in [`BudgetPeriod::Other`] so the alert
/// id keeps the caller's spelling; arithmetic treats them as monthly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum BudgetPeriod {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
    Other(String),
}

impl BudgetPeriod {
    /// Parse a wire value. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "yearly" => Self::Yearly,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Other(raw) => raw,
        }
    }

    /// Whether this is one of the four known periods.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BudgetPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BudgetPeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => Self::parse(&raw),
            _ => Self::default(),
        })
    }
}

/// One category budget and its current spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    /// Opaque identifier, stable per budget definition.
    #[serde(deserialize_with = "budget_id_from_value")]
    pub budget_id: String,

    /// Display label; not part of any identity.
    #[serde(
        default = "unknown_category",
        deserialize_with = "category_from_value"
    )]
    pub category_name: String,

    #[serde(default)]
    pub period: BudgetPeriod,

    /// Start of the current period instance. `None` when absent or unparsable.
    #[serde(default, deserialize_with = "start_date_from_value")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "amount_from_value")]
    pub budgeted: f64,

    #[serde(default, deserialize_with = "amount_from_value")]
    pub spent: f64,
}

/// Figures derived from `budgeted` and `spent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetMetrics {
    /// `spent / budgeted * 100`, or `0` when nothing is budgeted.
    pub percentage_used: f64,
    /// `budgeted - spent`; negative once the budget is exceeded.
    pub remaining: f64,
    pub is_exceeded: bool,
}

impl BudgetRecord {
    pub fn new(
        budget_id: impl Into<String>,
        category_name: impl Into<String>,
        period: BudgetPeriod,
        budgeted: f64,
        spent: f64,
    ) -> Self {
        Self {
            budget_id: budget_id.into(),
            category_name: category_name.into(),
            period,
            start_date: None,
            budgeted: sanitize_amount(budgeted),
            spent: sanitize_amount(spent),
        }
    }

    pub fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Recompute the derived figures. Input-supplied values are never trusted.
    pub fn metrics(&self) -> BudgetMetrics {
        let percentage_used = if self.budgeted > 0.0 {
            self.spent / self.budgeted * 100.0
        } else {
            0.0
        };
        BudgetMetrics {
            percentage_used,
            remaining: self.budgeted - self.spent,
            is_exceeded: self.spent > self.budgeted,
        }
    }

    /// Alert identifier for this budget.
    ///
    /// Depends only on `budget_id` and `period`, so it stays the same while
    /// spend moves within a period and a dismissal keeps applying.
    pub fn alert_id(&self) -> String {
        format!("budget-{}-{}", self.budget_id, self.period)
    }
}

/// Parse an ISO start date: RFC 3339, a naive timestamp, or a plain date.
///
/// Naive values are taken as UTC.
pub fn parse_start_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn unknown_category() -> String {
    UNKNOWN_CATEGORY.to_string()
}

fn budget_id_from_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(id) if !id.trim().is_empty() => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(<D::Error as serde::de::Error>::custom(format!(
            "budget_id must be a non-empty string or a number, got {}",
            other
        ))),
    }
}

fn category_from_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(name) => name,
        _ => unknown_category(),
    })
}

fn start_date_from_value<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => parse_start_date(&raw),
        _ => None,
    })
}

fn amount_from_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let amount = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(amount.map(sanitize_amount).unwrap_or(0.0))
}
