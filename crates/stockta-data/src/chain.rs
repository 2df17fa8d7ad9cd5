//! Ordered fallback over several data sources.

use async_trait::async_trait;
use stockta_core::error::{DataError, SourceAttempt};
use stockta_core::traits::{DataSource, FetchRequest};
use stockta_core::types::BarSeries;
use tracing::{debug, warn};

/// Sources tried in order, each exactly once, until one returns data.
#[derive(Default)]
pub struct SourceChain {
    sources: Vec<Box<dyn DataSource>>,
}

impl SourceChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source (builder style).
    pub fn with_source(mut self, source: impl DataSource + 'static) -> Self {
        self.push(Box::new(source));
        self
    }

    /// Append a boxed source.
    pub fn push(&mut self, source: Box<dyn DataSource>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Source names in the order they are tried.
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }
}

#[async_trait]
impl DataSource for SourceChain {
    /// Return the first non-empty series. When every source fails the
    /// attempts are collected into [`DataError::NotAvailable`].
    async fn fetch(&self, request: &FetchRequest) -> Result<BarSeries, DataError> {
        let mut attempts = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let outcome = match source.fetch(request).await {
                Ok(series) if series.is_empty() => {
                    Err(DataError::EmptyResult(format!("{} returned no rows", source.name())))
                }
                other => other,
            };

            match outcome {
                Ok(series) => {
                    debug!(
                        ticker = %request.ticker,
                        source = source.name(),
                        rows = series.len(),
                        fallbacks = attempts.len(),
                        "Fetched history"
                    );
                    return Ok(series);
                }
                Err(e) => {
                    warn!(
                        ticker = %request.ticker,
                        source = source.name(),
                        kind = %e.kind(),
                        error = %e,
                        "Data source failed"
                    );
                    attempts.push(SourceAttempt {
                        source: source.name().to_string(),
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Err(DataError::NotAvailable {
            ticker: request.ticker.to_string(),
            attempts,
        })
    }

    fn name(&self) -> &str {
        "chain"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use stockta_core::error::FailureKind;
    use stockta_core::types::{Bar, Ticker};

    /// Scripted source that counts its calls.
    pub(crate) struct MockSource {
        name: &'static str,
        outcome: Result<Vec<Bar>, DataError>,
        pub(crate) calls: Arc<AtomicUsize>,
    }

    impl MockSource {
        pub(crate) fn returning(name: &'static str, bars: Vec<Bar>) -> Self {
            Self {
                name,
                outcome: Ok(bars),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub(crate) fn failing(name: &'static str, error: DataError) -> Self {
            Self {
                name,
                outcome: Err(error),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl DataSource for MockSource {
        async fn fetch(&self, request: &FetchRequest) -> Result<BarSeries, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
                .clone()
                .map(|bars| BarSeries::new(request.ticker.clone(), bars))
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    pub(crate) fn bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                Bar::new(i as i64 * 86_400_000, c, c + 1.0, c - 1.0, c, 1_000.0)
            })
            .collect()
    }

    fn request(symbol: &str) -> FetchRequest {
        FetchRequest::new(Ticker::parse(symbol).unwrap(), 365)
    }

    #[tokio::test]
    async fn test_first_source_wins() {
        let first = MockSource::returning("first", bars(3));
        let second = MockSource::returning("second", bars(5));
        let second_calls = second.calls.clone();

        let chain = SourceChain::new().with_source(first).with_source(second);
        let series = chain.fetch(&request("AAPL")).await.unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_once_per_source() {
        let vci = MockSource::failing("vci", DataError::Transport("connection reset".into()));
        let yahoo = MockSource::returning("yahoo", bars(4));
        let (vci_calls, yahoo_calls) = (vci.calls.clone(), yahoo.calls.clone());

        let chain = SourceChain::new().with_source(vci).with_source(yahoo);
        let series = chain.fetch(&request("FPT.VN")).await.unwrap();

        assert_eq!(series.len(), 4);
        assert_eq!(vci_calls.load(Ordering::SeqCst), 1);
        assert_eq!(yahoo_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_series_counts_as_failure() {
        let chain = SourceChain::new()
            .with_source(MockSource::returning("vci", Vec::new()))
            .with_source(MockSource::failing(
                "yahoo",
                DataError::MalformedSchema("no close".into()),
            ));

        let err = chain.fetch(&request("XYZ.VN")).await.unwrap_err();
        match err {
            DataError::NotAvailable { ticker, attempts } => {
                assert_eq!(ticker, "XYZ.VN");
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].source, "vci");
                assert_eq!(attempts[0].kind, FailureKind::EmptyResult);
                assert_eq!(attempts[1].kind, FailureKind::MalformedSchema);
            }
            other => panic!("expected NotAvailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_chain_is_not_available() {
        let chain = SourceChain::new();
        assert!(chain.is_empty());

        let err = chain.fetch(&request("AAPL")).await.unwrap_err();
        assert!(err.is_not_available());
    }

    #[test]
    fn test_names_in_order() {
        let chain = SourceChain::new()
            .with_source(MockSource::returning("vci", Vec::new()))
            .with_source(MockSource::returning("yahoo", Vec::new()));
        assert_eq!(chain.names(), vec!["vci", "yahoo"]);
        assert_eq!(chain.len(), 2);
    }
}
