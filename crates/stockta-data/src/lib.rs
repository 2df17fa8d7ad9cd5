//! Market data sources for the analysis pipeline.
//!
//! `.VN` tickers are served by VCI, then Yahoo, then an optional local CSV
//! archive; every other ticker by Polygon. Each provider's payload goes through
//! [`normalize`] before it leaves this crate.

mod adapter;
mod archive;
mod cache;
mod catalog;
mod chain;
mod normalize;
mod providers;

pub use adapter::{MarketDataAdapter, PolygonSettings, ProviderSettings, VciSettings, YahooSettings};
pub use archive::CsvArchiveSource;
pub use cache::{CacheKey, SeriesCache};
pub use catalog::{TickerCatalog, TickerInfo};
pub use chain::SourceChain;
pub use normalize::{normalize, EpochUnit, Field, RawTable};
pub use providers::{parse_polygon, parse_vci, parse_yahoo, PolygonSource, VciSource, YahooSource};
