//! Core types and traits for the stock technical-analysis pipeline.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries, Ticker, LookbackPeriod, CompanyProfile)
//! - The error taxonomy shared by sources, config and the scorer
//! - Core traits for data sources, profile sources and indicators

pub mod error;
pub mod traits;
pub mod types;

pub use error::{DashboardError, DataError};
pub use traits::*;
pub use types::*;
