//! Company profile source trait.

use crate::error::DataError;
use crate::types::{CompanyProfile, Ticker};
use async_trait::async_trait;

/// Trait for sources of company profiles.
///
/// A profile that comes back with no fields at all is reported as
/// `EmptyResult`, not as an empty `CompanyProfile`.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch the profile of a ticker.
    async fn profile(&self, ticker: &Ticker) -> Result<CompanyProfile, DataError>;

    /// Get the profile source name.
    fn name(&self) -> &str;
}
