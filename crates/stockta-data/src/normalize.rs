//! Upstream schema normalization.
//!
//! Every provider decodes its payload into a [`RawTable`] of named columns; the
//! column names are whatever the upstream used. [`normalize`] maps them onto the
//! canonical OHLCV fields and builds the series.

use serde_json::{Map, Value};
use stockta_core::error::DataError;
use stockta_core::traits::FetchRequest;
use stockta_core::types::{Bar, BarSeries};

/// Canonical OHLCV field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Field {
    const REQUIRED: [Field; 4] = [Field::Open, Field::High, Field::Low, Field::Close];

    /// Upstream names accepted for this field, most preferred first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Open => &["open", "o", "Open", "OPEN", "open_price"],
            Field::High => &["high", "h", "High", "HIGH", "high_price"],
            Field::Low => &["low", "l", "Low", "LOW", "low_price"],
            Field::Close => &[
                "close",
                "c",
                "Close",
                "CLOSE",
                "close_price",
                "Adj Close",
                "adjclose",
            ],
            Field::Volume => &["volume", "v", "Volume", "VOLUME", "vol", "Vol"],
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Close => "Close",
            Field::Volume => "Volume",
        }
    }
}

/// Unit of upstream epoch timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochUnit {
    Seconds,
    Millis,
}

impl EpochUnit {
    fn to_millis(self, value: i64) -> i64 {
        match self {
            EpochUnit::Seconds => value.saturating_mul(1000),
            EpochUnit::Millis => value,
        }
    }
}

/// Upstream rows as named numeric columns plus a timestamp column (Unix ms).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    timestamps: Vec<i64>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl RawTable {
    /// Create a table with the given timestamps and no columns.
    pub fn new(timestamps: Vec<i64>) -> Self {
        Self {
            timestamps,
            columns: Vec::new(),
        }
    }

    /// Add a column.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.push_column(name, values);
        self
    }

    /// Add a column in place.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        self.columns.push((name.into(), values));
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Upstream column names.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Column by exact upstream name.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Build from row objects such as `[{"t": .., "o": .., ...}]`.
    ///
    /// Every key other than `time_key` becomes a column; a key absent from a row
    /// is a missing value for that row.
    pub fn from_records(
        records: &[Map<String, Value>],
        time_key: &str,
        unit: EpochUnit,
    ) -> Result<Self, DataError> {
        let mut timestamps = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let ts = record.get(time_key).and_then(value_as_i64).ok_or_else(|| {
                DataError::MalformedSchema(format!(
                    "row {} has no usable '{}' timestamp",
                    i, time_key
                ))
            })?;
            timestamps.push(unit.to_millis(ts));
        }

        let mut names: Vec<&String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if key != time_key && !names.contains(&key) {
                    names.push(key);
                }
            }
        }

        let mut table = Self::new(timestamps);
        for name in names {
            let values = records
                .iter()
                .map(|r| r.get(name.as_str()).and_then(value_as_f64))
                .collect();
            table.push_column(name.clone(), values);
        }
        Ok(table)
    }

    /// Build from a columnar object such as `{"t": [..], "o": [..], ...}`.
    ///
    /// Non-array members are ignored.
    pub fn from_columns(
        object: &Map<String, Value>,
        time_key: &str,
        unit: EpochUnit,
    ) -> Result<Self, DataError> {
        let times = object
            .get(time_key)
            .and_then(Value::as_array)
            .ok_or_else(|| DataError::MalformedSchema(format!("missing '{}' array", time_key)))?;

        let timestamps = times
            .iter()
            .enumerate()
            .map(|(i, v)| {
                value_as_i64(v).map(|ts| unit.to_millis(ts)).ok_or_else(|| {
                    DataError::MalformedSchema(format!("invalid timestamp at index {}: {}", i, v))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut table = Self::new(timestamps);
        for (name, value) in object {
            if name == time_key {
                continue;
            }
            if let Some(values) = value.as_array() {
                table.push_column(name.clone(), values.iter().map(value_as_f64).collect());
            }
        }
        Ok(table)
    }

    fn resolve(&self, field: Field) -> Option<&[Option<f64>]> {
        field.aliases().iter().find_map(|alias| self.column(alias))
    }
}

/// Numeric JSON value, accepting numeric strings.
pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Map an upstream table onto the canonical OHLCV series for a request.
///
/// Missing Open/High/Low/Close columns are a schema error. A missing Volume
/// column becomes an all-missing volume. Rows older than the request window
/// are dropped; a table with no rows left is an empty result.
pub fn normalize(
    table: &RawTable,
    request: &FetchRequest,
    source: &str,
) -> Result<BarSeries, DataError> {
    if table.is_empty() {
        return Err(DataError::EmptyResult(format!("{} returned no rows", source)));
    }

    let missing: Vec<&str> = Field::REQUIRED
        .iter()
        .filter(|f| table.resolve(**f).is_none())
        .map(|f| f.name())
        .collect();
    if !missing.is_empty() {
        let found: Vec<&str> = table.column_names().collect();
        return Err(DataError::MalformedSchema(format!(
            "{}: missing column(s) {} (found: {})",
            source,
            missing.join(", "),
            found.join(", ")
        )));
    }

    let column = |field: Field| -> Result<Option<&[Option<f64>]>, DataError> {
        match table.resolve(field) {
            Some(values) if values.len() != table.len() => Err(DataError::MalformedSchema(format!(
                "{}: column {} has {} values for {} timestamps",
                source,
                field.name(),
                values.len(),
                table.len()
            ))),
            other => Ok(other),
        }
    };
    let open = column(Field::Open)?;
    let high = column(Field::High)?;
    let low = column(Field::Low)?;
    let close = column(Field::Close)?;
    let volume = column(Field::Volume)?;

    let at = |values: Option<&[Option<f64>]>, i: usize| -> f64 {
        values.and_then(|v| v[i]).unwrap_or(f64::NAN)
    };

    let start = request.start().timestamp_millis();
    let bars: Vec<Bar> = table
        .timestamps
        .iter()
        .enumerate()
        .filter(|(_, ts)| **ts >= start)
        .map(|(i, &ts)| {
            Bar::new(ts, at(open, i), at(high, i), at(low, i), at(close, i), at(volume, i))
        })
        .collect();

    if bars.is_empty() {
        return Err(DataError::EmptyResult(format!(
            "{} returned no rows inside the {}-day window",
            source, request.lookback_days
        )));
    }

    Ok(BarSeries::new(request.ticker.clone(), bars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use stockta_core::error::FailureKind;
    use stockta_core::types::Ticker;

    const DAY_MS: i64 = 86_400_000;

    fn request() -> FetchRequest {
        FetchRequest::new(Ticker::parse("FPT.VN").unwrap(), 10)
            .with_end(Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap())
    }

    fn day(d: u32) -> i64 {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_aliases_map_to_canonical() {
        let table = RawTable::new(vec![day(5), day(6)])
            .with_column("OPEN", vec![Some(1.0), Some(2.0)])
            .with_column("h", vec![Some(3.0), Some(4.0)])
            .with_column("Low", vec![Some(0.5), Some(1.5)])
            .with_column("Adj Close", vec![Some(2.5), Some(3.5)])
            .with_column("vol", vec![Some(100.0), None]);

        let series = normalize(&table, &request(), "test").unwrap();
        assert_eq!(series.len(), 2);
        let first = series.get(0).unwrap();
        assert_eq!(
            (first.open, first.high, first.low, first.close, first.volume),
            (1.0, 3.0, 0.5, 2.5, 100.0)
        );
        assert!(series.get(1).unwrap().volume.is_nan());
    }

    #[test]
    fn test_close_preferred_over_adjusted() {
        let table = RawTable::new(vec![day(5)])
            .with_column("Adj Close", vec![Some(9.0)])
            .with_column("Close", vec![Some(10.0)])
            .with_column("Open", vec![Some(1.0)])
            .with_column("High", vec![Some(11.0)])
            .with_column("Low", vec![Some(0.5)]);

        let series = normalize(&table, &request(), "test").unwrap();
        assert_eq!(series.get(0).unwrap().close, 10.0);
    }

    #[test]
    fn test_missing_required_column() {
        let table = RawTable::new(vec![day(5)])
            .with_column("open", vec![Some(1.0)])
            .with_column("high", vec![Some(1.0)])
            .with_column("low", vec![Some(1.0)]);

        let err = normalize(&table, &request(), "test").unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedSchema);
        assert!(err.to_string().contains("Close"));
    }

    #[test]
    fn test_missing_volume_is_nan() {
        let table = RawTable::new(vec![day(5)])
            .with_column("o", vec![Some(1.0)])
            .with_column("h", vec![Some(2.0)])
            .with_column("l", vec![Some(0.5)])
            .with_column("c", vec![Some(1.5)]);

        let series = normalize(&table, &request(), "test").unwrap();
        assert!(series.get(0).unwrap().volume.is_nan());
        assert!(!series.has_volume());
    }

    #[test]
    fn test_rows_before_window_dropped() {
        let table = RawTable::new(vec![day(1) - DAY_MS, day(1), day(2)])
            .with_column("o", vec![Some(1.0); 3])
            .with_column("h", vec![Some(1.0); 3])
            .with_column("l", vec![Some(1.0); 3])
            .with_column("c", vec![Some(1.0), Some(2.0), Some(3.0)]);

        let series = normalize(&table, &request(), "test").unwrap();
        assert_eq!(series.closes(), vec![2.0, 3.0]);

        let stale = RawTable::new(vec![day(1) - DAY_MS])
            .with_column("o", vec![Some(1.0)])
            .with_column("h", vec![Some(1.0)])
            .with_column("l", vec![Some(1.0)])
            .with_column("c", vec![Some(1.0)]);
        let err = normalize(&stale, &request(), "test").unwrap_err();
        assert_eq!(err.kind(), FailureKind::EmptyResult);
    }

    #[test]
    fn test_empty_table() {
        let err = normalize(&RawTable::default(), &request(), "vci").unwrap_err();
        assert_eq!(err.kind(), FailureKind::EmptyResult);
    }

    #[test]
    fn test_length_mismatch() {
        let table = RawTable::new(vec![day(5), day(6)])
            .with_column("o", vec![Some(1.0)])
            .with_column("h", vec![Some(1.0), Some(1.0)])
            .with_column("l", vec![Some(1.0), Some(1.0)])
            .with_column("c", vec![Some(1.0), Some(1.0)]);

        let err = normalize(&table, &request(), "test").unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedSchema);
    }

    #[test]
    fn test_from_records() {
        let records = json!([
            {"t": day(5), "o": 1.0, "h": 2.0, "l": 0.5, "c": 1.5, "v": 10},
            {"t": day(6), "o": 1.5, "h": 2.5, "l": 1.0, "c": 2.0}
        ]);
        let records: Vec<Map<String, Value>> = serde_json::from_value(records).unwrap();

        let table = RawTable::from_records(&records, "t", EpochUnit::Millis).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("v"), Some(&[Some(10.0), None][..]));
    }

    #[test]
    fn test_from_columns_with_string_values() {
        let object = json!({
            "t": ["1704412800", 1704499200],
            "c": ["10.5", 11.0],
            "symbol": "FPT"
        });

        let table =
            RawTable::from_columns(object.as_object().unwrap(), "t", EpochUnit::Seconds).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("c"), Some(&[Some(10.5), Some(11.0)][..]));
        assert_eq!(table.column_names().count(), 1);
    }
}
