//! Core data types for the analysis pipeline.

mod ohlcv;
mod period;
mod profile;
mod ticker;

pub use ohlcv::{Bar, BarSeries};
pub use period::LookbackPeriod;
pub use profile::CompanyProfile;
pub use ticker::{Market, Ticker, VIETNAM_SUFFIX};
