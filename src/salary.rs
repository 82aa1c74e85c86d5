// src/salary.rs
//! Pay-interval parsing and conversion of posted amounts into an
//! hourly-equivalent rate used only for threshold comparison.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub const HOURS_PER_DAY: f64 = 8.0;
pub const HOURS_PER_WEEK: f64 = 40.0;
pub const WEEKS_PER_MONTH: f64 = 4.33;
pub const WEEKS_PER_YEAR: f64 = 52.0;

/// Hours in a working year (40 × 52).
pub const HOURS_PER_YEAR: f64 = HOURS_PER_WEEK * WEEKS_PER_YEAR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayInterval {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl PayInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            PayInterval::Hourly => "hourly",
            PayInterval::Daily => "daily",
            PayInterval::Weekly => "weekly",
            PayInterval::Monthly => "monthly",
            PayInterval::Yearly => "yearly",
        }
    }

    /// Number of working hours one unit of this interval stands for.
    pub fn hours(self) -> f64 {
        match self {
            PayInterval::Hourly => 1.0,
            PayInterval::Daily => HOURS_PER_DAY,
            PayInterval::Weekly => HOURS_PER_WEEK,
            PayInterval::Monthly => HOURS_PER_WEEK * WEEKS_PER_MONTH,
            PayInterval::Yearly => HOURS_PER_YEAR,
        }
    }
}

impl fmt::Display for PayInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayInterval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" | "hour" => Ok(PayInterval::Hourly),
            "daily" | "day" => Ok(PayInterval::Daily),
            "weekly" | "week" => Ok(PayInterval::Weekly),
            "monthly" | "month" => Ok(PayInterval::Monthly),
            "yearly" | "year" | "annual" | "annually" => Ok(PayInterval::Yearly),
            other => anyhow::bail!("unknown pay interval `{other}`"),
        }
    }
}

/// Serde helper: unknown or empty intervals become `None` instead of failing the record.
pub fn lenient_interval<'de, D>(de: D) -> Result<Option<PayInterval>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// Drop negative, NaN and infinite amounts.
pub fn usable_amount(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x >= 0.0)
}

/// Hourly-equivalent rate. `min_amount` is preferred, `max_amount` is the fallback.
/// Missing amount or interval yields 0.0 ("unknown").
pub fn normalized_rate(
    min_amount: Option<f64>,
    max_amount: Option<f64>,
    interval: Option<PayInterval>,
) -> f64 {
    let amount = usable_amount(min_amount).or_else(|| usable_amount(max_amount));
    match (amount, interval) {
        (Some(a), Some(iv)) => a / iv.hours(),
        _ => 0.0,
    }
}
