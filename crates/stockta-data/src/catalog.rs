//! Ticker catalog loaded from `SYMBOL|NAME|SECTOR|COUNTRY` lines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use stockta_core::error::DashboardError;
use stockta_core::types::Ticker;
use tracing::{debug, warn};

/// One selectable ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub ticker: Ticker,
    pub name: String,
    pub sector: Option<String>,
    pub country: String,
}

impl TickerInfo {
    fn new(symbol: &str, name: &str, country: &str) -> Option<Self> {
        Some(Self {
            ticker: Ticker::parse(symbol).ok()?,
            name: name.to_string(),
            sector: None,
            country: country.to_string(),
        })
    }

    pub fn is_us(&self) -> bool {
        self.country.eq_ignore_ascii_case("US")
    }
}

impl fmt::Display for TickerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} [{}]", self.ticker, self.name, self.country)
    }
}

/// Ordered list of known tickers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerCatalog {
    entries: Vec<TickerInfo>,
}

impl TickerCatalog {
    /// Default selection when nothing else is requested.
    pub const DEFAULT_SYMBOL: &'static str = "AAPL";

    /// Parse catalog text.
    ///
    /// NAME defaults to SYMBOL and COUNTRY to `Unknown`. Blank lines, `#`
    /// comments and lines with an unusable symbol are skipped.
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split('|').map(str::trim);
            let symbol = parts.next().unwrap_or_default();
            let ticker = match Ticker::parse(symbol) {
                Ok(ticker) => ticker,
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "Skipping catalog line");
                    continue;
                }
            };

            let name = parts
                .next()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| symbol.to_string());
            let sector = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
            let country = parts
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or("Unknown")
                .to_string();

            entries.push(TickerInfo {
                ticker,
                name,
                sector,
                country,
            });
        }

        Self { entries }
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::parse(&text);
        debug!(path = %path.display(), tickers = catalog.len(), "Loaded ticker catalog");
        Ok(catalog)
    }

    /// Load a catalog file, using [`TickerCatalog::fallback`] when it cannot be read.
    pub fn load_or_fallback(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) if !catalog.is_empty() => catalog,
            Ok(_) => {
                warn!(path = %path.display(), "Ticker catalog is empty, using built-in list");
                Self::fallback()
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Ticker catalog unavailable, using built-in list"
                );
                Self::fallback()
            }
        }
    }

    /// Built-in list used when no catalog file is available.
    pub fn fallback() -> Self {
        let entries = [
            ("AAPL", "Apple Inc.", "US"),
            ("GOOGL", "Alphabet Inc.", "US"),
            ("CTG.VN", "Ngân hàng Công thương VN", "VN"),
            ("FPT.VN", "Công ty FPT", "VN"),
        ]
        .into_iter()
        .filter_map(|(symbol, name, country)| TickerInfo::new(symbol, name, country))
        .collect();

        Self { entries }
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[TickerInfo] {
        &self.entries
    }

    /// US tickers first, everything else after, each group in file order.
    pub fn display_order(&self) -> Vec<&TickerInfo> {
        let (us, rest): (Vec<&TickerInfo>, Vec<&TickerInfo>) =
            self.entries.iter().partition(|t| t.is_us());
        us.into_iter().chain(rest).collect()
    }

    /// Look up a symbol (case-insensitive).
    pub fn find(&self, symbol: &str) -> Option<&TickerInfo> {
        let ticker = Ticker::parse(symbol).ok()?;
        self.entries.iter().find(|t| t.ticker == ticker)
    }

    /// `AAPL` when listed, otherwise the first entry in display order.
    pub fn default_ticker(&self) -> Option<&TickerInfo> {
        self.find(Self::DEFAULT_SYMBOL)
            .or_else(|| self.display_order().into_iter().next())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
