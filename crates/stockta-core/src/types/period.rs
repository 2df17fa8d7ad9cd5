//! Named lookback periods for history requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How far back a history request reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LookbackPeriod {
    /// One month
    #[serde(rename = "1M")]
    Month1,
    /// Three months
    #[serde(rename = "3M")]
    Month3,
    /// Six months
    #[serde(rename = "6M")]
    Month6,
    /// One year
    #[serde(rename = "1Y")]
    #[default]
    Year1,
    /// Two years
    #[serde(rename = "2Y")]
    Year2,
    /// Five years
    #[serde(rename = "5Y")]
    Year5,
}

impl LookbackPeriod {
    /// Calendar days covered by the period.
    pub fn days(&self) -> u32 {
        match self {
            LookbackPeriod::Month1 => 30,
            LookbackPeriod::Month3 => 90,
            LookbackPeriod::Month6 => 180,
            LookbackPeriod::Year1 => 365,
            LookbackPeriod::Year2 => 730,
            LookbackPeriod::Year5 => 1825,
        }
    }

    /// Get all available periods, shortest first.
    pub fn all() -> &'static [LookbackPeriod] {
        &[
            LookbackPeriod::Month1,
            LookbackPeriod::Month3,
            LookbackPeriod::Month6,
            LookbackPeriod::Year1,
            LookbackPeriod::Year2,
            LookbackPeriod::Year5,
        ]
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LookbackPeriod::Month1 => "1M",
            LookbackPeriod::Month3 => "3M",
            LookbackPeriod::Month6 => "6M",
            LookbackPeriod::Year1 => "1Y",
            LookbackPeriod::Year2 => "2Y",
            LookbackPeriod::Year5 => "5Y",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for LookbackPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1M" | "1MO" | "MONTH" => Ok(LookbackPeriod::Month1),
            "3M" | "3MO" => Ok(LookbackPeriod::Month3),
            "6M" | "6MO" => Ok(LookbackPeriod::Month6),
            "1Y" | "YEAR" => Ok(LookbackPeriod::Year1),
            "2Y" => Ok(LookbackPeriod::Year2),
            "5Y" => Ok(LookbackPeriod::Year5),
            _ => Err(format!("Invalid lookback period: {}", s)),
        }
    }
}
