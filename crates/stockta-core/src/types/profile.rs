//! Company profile and valuation ratios.

use serde::{Deserialize, Serialize};

use super::Ticker;

/// Descriptive and valuation data for one company.
///
/// Every field is optional: upstream coverage varies a lot by market, and a
/// zero ratio is reported by most providers when the value is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub ticker: Ticker,
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    /// Full-time employees
    pub employees: Option<u64>,
    /// Currency the market data is quoted in
    pub currency: Option<String>,
    pub market_cap: Option<f64>,
    /// Trailing price/earnings
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    /// Dividend yield as a fraction (0.005 = 0.5%)
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
}

impl CompanyProfile {
    /// Empty profile for a ticker.
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            long_name: None,
            sector: None,
            industry: None,
            country: None,
            website: None,
            employees: None,
            currency: None,
            market_cap: None,
            trailing_pe: None,
            price_to_book: None,
            dividend_yield: None,
            beta: None,
        }
    }

    /// Company name, or the ticker symbol when unknown.
    pub fn display_name(&self) -> &str {
        self.long_name.as_deref().unwrap_or(self.ticker.as_str())
    }

    /// Whether the profile carries nothing beyond the ticker.
    pub fn is_empty(&self) -> bool {
        *self == Self::new(self.ticker.clone())
    }

    /// Dividend yield in percent, only when positive.
    pub fn dividend_yield_pct(&self) -> Option<f64> {
        self.dividend_yield.filter(|y| *y > 0.0).map(|y| y * 100.0)
    }

    /// Market cap scaled to T/B/M, e.g. `2.95T USD`. `None` unless positive.
    pub fn market_cap_display(&self) -> Option<String> {
        let cap = self.market_cap.filter(|c| c.is_finite() && *c > 0.0)?;
        let scaled = if cap >= 1e12 {
            format!("{:.2}T", cap / 1e12)
        } else if cap >= 1e9 {
            format!("{:.2}B", cap / 1e9)
        } else if cap >= 1e6 {
            format!("{:.2}M", cap / 1e6)
        } else {
            format!("{:.0}", cap)
        };
        Some(match &self.currency {
            Some(currency) => format!("{} {}", scaled, currency),
            None => scaled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CompanyProfile {
        CompanyProfile::new(Ticker::parse("AAPL").unwrap())
    }

    #[test]
    fn test_market_cap_display() {
        let mut p = profile();
        assert_eq!(p.market_cap_display(), None);

        p.market_cap = Some(2_950_000_000_000.0);
        p.currency = Some("USD".into());
        assert_eq!(p.market_cap_display().as_deref(), Some("2.95T USD"));

        p.market_cap = Some(48_300_000_000.0);
        p.currency = None;
        assert_eq!(p.market_cap_display().as_deref(), Some("48.30B"));

        p.market_cap = Some(0.0);
        assert_eq!(p.market_cap_display(), None);
    }

    #[test]
    fn test_display_name_and_dividend() {
        let mut p = profile();
        assert!(p.is_empty());
        assert_eq!(p.display_name(), "AAPL");
        assert_eq!(p.dividend_yield_pct(), None);

        p.long_name = Some("Apple Inc.".into());
        p.dividend_yield = Some(0.0044);
        assert!(!p.is_empty());
        assert_eq!(p.display_name(), "Apple Inc.");
        assert!((p.dividend_yield_pct().unwrap() - 0.44).abs() < 1e-10);

        p.dividend_yield = Some(0.0);
        assert_eq!(p.dividend_yield_pct(), None);
    }
}
