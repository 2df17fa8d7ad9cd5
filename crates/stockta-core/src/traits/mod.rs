//! Core traits for the analysis pipeline.

mod data_source;
mod indicator;
mod profile_source;

pub use data_source::{DataSource, FetchRequest};
pub use indicator::{Indicator, MultiOutputIndicator, OhlcvIndicator};
pub use profile_source::ProfileSource;
