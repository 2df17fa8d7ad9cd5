//! Local CSV archive of daily bars.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use stockta_core::error::DataError;
use stockta_core::traits::{DataSource, FetchRequest};
use stockta_core::types::{BarSeries, Ticker};
use tracing::debug;

use crate::normalize::{normalize, RawTable};

const NAME: &str = "archive";

/// Header names accepted for the date column.
const DATE_COLUMNS: [&str; 5] = ["Date", "date", "timestamp", "Timestamp", "time"];

/// Daily bars read from `{dir}/{SYMBOL}.csv`.
///
/// Vietnamese tickers also match on the bare symbol (`FPT.csv` for `FPT.VN`),
/// and lower-case file names are accepted.
pub struct CsvArchiveSource {
    dir: PathBuf,
}

impl CsvArchiveSource {
    /// Create an archive source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Archive directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// First existing archive file for the ticker.
    pub fn locate(&self, ticker: &Ticker) -> Option<PathBuf> {
        let mut stems = vec![ticker.as_str().to_string(), ticker.base_symbol().to_string()];
        stems.push(ticker.as_str().to_lowercase());
        stems.push(ticker.base_symbol().to_lowercase());
        stems.dedup();

        stems
            .iter()
            .map(|stem| self.dir.join(format!("{}.csv", stem)))
            .find(|path| path.is_file())
    }

    /// Read CSV content into a raw table keyed by its header names.
    fn read_table(content: &[u8], path: &Path) -> Result<RawTable, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| DataError::Parse(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let date_idx = headers
            .iter()
            .position(|h| DATE_COLUMNS.contains(&h.as_str()))
            .ok_or_else(|| {
                DataError::MalformedSchema(format!(
                    "{}: no date column (found: {})",
                    path.display(),
                    headers.join(", ")
                ))
            })?;

        let mut timestamps = Vec::new();
        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];

        for result in reader.records() {
            let record = result.map_err(|e| DataError::Parse(e.to_string()))?;
            let date = record.get(date_idx).unwrap_or_default();
            timestamps.push(parse_timestamp(date)?);

            for (i, values) in columns.iter_mut().enumerate() {
                let value = record
                    .get(i)
                    .filter(|s| !s.is_empty())
                    .and_then(|s| s.parse::<f64>().ok());
                values.push(value);
            }
        }

        let mut table = RawTable::new(timestamps);
        for (i, (name, values)) in headers.into_iter().zip(columns).enumerate() {
            if i != date_idx {
                table.push_column(name, values);
            }
        }
        Ok(table)
    }
}

/// Parse the date formats found in exported archives, or a Unix timestamp.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    let formats = [
        "%Y-%m-%d",
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%d-%m-%Y",
    ];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
        if let Some(dt) = NaiveDate::parse_from_str(date_str, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    if let Ok(ts) = date_str.parse::<i64>() {
        // More than 10 digits means milliseconds
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::Parse(format!("Could not parse date: {}", date_str)))
}

/// Read an archive file; failures are local I/O, not schema problems.
async fn read_file(path: &Path) -> Result<Vec<u8>, DataError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| DataError::Io(format!("{}: {}: {}", NAME, path.display(), e)))
}

#[async_trait]
impl DataSource for CsvArchiveSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<BarSeries, DataError> {
        let path = self.locate(&request.ticker).ok_or_else(|| {
            DataError::EmptyResult(format!(
                "{}: no file for {} in {}",
                NAME,
                request.ticker,
                self.dir.display()
            ))
        })?;
        debug!(source = NAME, path = %path.display(), "Reading archive file");

        let content = read_file(&path).await?;
        let table = Self::read_table(&content, &path)?;
        normalize(&table, request, NAME)
    }

    fn name(&self) -> &str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use stockta_core::error::FailureKind;

    fn request(symbol: &str) -> FetchRequest {
        FetchRequest::new(Ticker::parse(symbol).unwrap(), 30)
            .with_end(Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_parse_timestamp() {
        let jan_15 = Utc
            .with_ymd_and_hms(2024, 1, 15, 0, 0, 0)
            .unwrap()
            .timestamp_millis();

        assert_eq!(parse_timestamp("2024-01-15").unwrap(), jan_15);
        assert_eq!(parse_timestamp("2024/01/15").unwrap(), jan_15);
        assert_eq!(parse_timestamp("01/15/2024").unwrap(), jan_15);
        assert_eq!(parse_timestamp("2024-01-15 10:30:00").unwrap(), jan_15 + 37_800_000);
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1705312800000); // Unix ms
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1705312800000); // Unix sec
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_fetch_from_archive() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("FPT.csv"),
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-16,96.0,97.5,95.2,97.0,1200000\n\
             2024-01-15,95.0,96.0,94.5,95.8,1000000\n\
             2024-01-17,97.0,98.0,96.1,,900000\n",
        )
        .unwrap();

        let source = CsvArchiveSource::new(dir.path());
        let series = source.fetch(&request("FPT.VN")).await.unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.ticker.as_str(), "FPT.VN");
        // Sorted oldest first
        assert_eq!(series.closes()[0], 95.8);
        assert!(series.get(2).unwrap().close.is_nan());
    }

    #[tokio::test]
    async fn test_lowercase_file_and_missing_volume() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("aapl.csv"),
            "date,open,high,low,close\n2024-01-18,180,182,179,181\n",
        )
        .unwrap();

        let source = CsvArchiveSource::new(dir.path());
        let series = source.fetch(&request("AAPL")).await.unwrap();

        assert_eq!(series.len(), 1);
        assert!(!series.has_volume());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvArchiveSource::new(dir.path());

        let err = source.fetch(&request("XYZ.VN")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::EmptyResult);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();

        // A directory cannot be read as a file
        let err = read_file(dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Io);
        assert!(matches!(err, DataError::Io(_)));

        let err = read_file(&dir.path().join("gone.csv")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Io);
    }

    #[tokio::test]
    async fn test_missing_date_column() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("MSFT.csv"),
            "Open,High,Low,Close\n1,2,0.5,1.5\n",
        )
        .unwrap();

        let source = CsvArchiveSource::new(dir.path());
        let err = source.fetch(&request("MSFT")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedSchema);
    }
}
