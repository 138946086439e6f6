//! Alert data types.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AlertError;

/// Severity of a budget's current spend ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertTier {
    Critical,
    Warning,
    Info,
    Success,
}

impl AlertTier {
    /// Priority derived from the tier. Critical and warning share `High`.
    pub fn priority(self) -> AlertPriority {
        match self {
            Self::Critical | Self::Warning => AlertPriority::High,
            Self::Info => AlertPriority::Medium,
            Self::Success => AlertPriority::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for AlertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertTier {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            _ => Err(AlertError::UnknownTier(s.to_string())),
        }
    }
}

/// Display priority. Ordered `High < Medium < Low` so sorting ascending
/// puts the most urgent alerts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

impl AlertPriority {
    /// Sort rank: high=0, medium=1, low=2.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl Ord for AlertPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for AlertPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Tier selector for filtered views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TierFilter {
    #[default]
    All,
    Only(AlertTier),
}

impl TierFilter {
    pub fn matches(self, tier: AlertTier) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == tier,
        }
    }
}

impl FromStr for TierFilter {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl From<AlertTier> for TierFilter {
    fn from(tier: AlertTier) -> Self {
        Self::Only(tier)
    }
}

/// Numbers behind an alert.
///
/// The optional fields are tier-specific and omitted from JSON when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDetails {
    pub spent: f64,
    pub budgeted: f64,
    pub percentage: f64,
    /// Amount left in the budget. For critical alerts this is the overage.
    pub remaining: f64,
    pub period: String,
    pub days_remaining: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projected_overage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projected_savings: Option<f64>,
}

/// A classified budget alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// `budget-{budgetId}-{period}`; see [`crate::budget::BudgetRecord::alert_id`].
    pub id: String,
    pub tier: AlertTier,
    pub priority: AlertPriority,
    pub budget_id: String,
    pub category_name: String,
    pub title: String,
    pub message: String,
    pub action: String,
    pub details: AlertDetails,
}
