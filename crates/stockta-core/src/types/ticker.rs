//! Ticker identifiers and market routing tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// Suffix carried by Vietnamese-market tickers.
pub const VIETNAM_SUFFIX: &str = ".VN";

/// Market a ticker trades on, as far as data-source routing cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Tickers with the `.VN` suffix
    Vietnam,
    /// Everything else
    Global,
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Vietnam => write!(f, "vietnam"),
            Market::Global => write!(f, "global"),
        }
    }
}

/// Normalized ticker symbol (trimmed, upper-cased).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parse and normalize a ticker symbol.
    pub fn parse(symbol: &str) -> Result<Self, DataError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() || symbol == VIETNAM_SUFFIX {
            return Err(DataError::InvalidTicker(symbol));
        }
        if symbol.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(DataError::InvalidTicker(symbol));
        }
        Ok(Self(symbol))
    }

    /// Full symbol, including any market suffix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Market this ticker routes to.
    pub fn market(&self) -> Market {
        if self.0.ends_with(VIETNAM_SUFFIX) {
            Market::Vietnam
        } else {
            Market::Global
        }
    }

    /// Check if this is a Vietnamese-market ticker.
    pub fn is_vietnamese(&self) -> bool {
        self.market() == Market::Vietnam
    }

    /// Symbol without the market suffix (`FPT.VN` -> `FPT`).
    pub fn base_symbol(&self) -> &str {
        self.0.strip_suffix(VIETNAM_SUFFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}
