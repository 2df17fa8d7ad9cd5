//! Indicator engine: derives the full indicator battery for a series as
//! columns aligned row-for-row with the input bars.

use std::collections::BTreeMap;
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize, Serializer};
use stockta_core::traits::{Indicator, MultiOutputIndicator, OhlcvIndicator};
use stockta_core::types::{Bar, BarSeries, Ticker};
use tracing::debug;

use crate::momentum::{Macd, Roc, Rsi, Stochastic, WilliamsR};
use crate::moving_average::{Ema, Sma};
use crate::pivot::{PivotLevels, Pivots};
use crate::trend::{Adx, Cci};
use crate::volatility::{Atr, BollingerBands};
use crate::volume::{Mfi, Obv};

/// Canonical indicator column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnId {
    #[serde(rename = "SMA_20")]
    Sma20,
    #[serde(rename = "SMA_50")]
    Sma50,
    #[serde(rename = "SMA_200")]
    Sma200,
    #[serde(rename = "EMA_12")]
    Ema12,
    #[serde(rename = "EMA_26")]
    Ema26,
    #[serde(rename = "EMA_50")]
    Ema50,
    #[serde(rename = "BB_Upper")]
    BbUpper,
    #[serde(rename = "BB_Middle")]
    BbMiddle,
    #[serde(rename = "BB_Lower")]
    BbLower,
    #[serde(rename = "BB_Width")]
    BbWidth,
    #[serde(rename = "BB_PercentB")]
    BbPercentB,
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "MACD_Signal")]
    MacdSignal,
    #[serde(rename = "MACD_Histogram")]
    MacdHistogram,
    #[serde(rename = "RSI_14")]
    Rsi14,
    #[serde(rename = "RSI_30")]
    Rsi30,
    #[serde(rename = "STOCH_K")]
    StochK,
    #[serde(rename = "STOCH_D")]
    StochD,
    #[serde(rename = "WILLIAMS_R")]
    WilliamsR,
    #[serde(rename = "ADX")]
    Adx,
    #[serde(rename = "PLUS_DI")]
    PlusDi,
    #[serde(rename = "MINUS_DI")]
    MinusDi,
    #[serde(rename = "ATR")]
    Atr,
    #[serde(rename = "CCI")]
    Cci,
    #[serde(rename = "ROC")]
    Roc,
    #[serde(rename = "OBV")]
    Obv,
    #[serde(rename = "MFI")]
    Mfi,
    #[serde(rename = "Volume_SMA")]
    VolumeSma,
    #[serde(rename = "Pivot")]
    Pivot,
    #[serde(rename = "R1")]
    R1,
    #[serde(rename = "S1")]
    S1,
    #[serde(rename = "R2")]
    R2,
    #[serde(rename = "S2")]
    S2,
    #[serde(rename = "R3")]
    R3,
    #[serde(rename = "S3")]
    S3,
}

impl ColumnId {
    /// Every column in output order.
    pub fn all() -> &'static [ColumnId] {
        use ColumnId::*;
        &[
            Sma20, Sma50, Sma200, Ema12, Ema26, Ema50, BbUpper, BbMiddle, BbLower, BbWidth,
            BbPercentB, Macd, MacdSignal, MacdHistogram, Rsi14, Rsi30, StochK, StochD,
            WilliamsR, Adx, PlusDi, MinusDi, Atr, Cci, Roc, Obv, Mfi, VolumeSma, Pivot, R1,
            S1, R2, S2, R3, S3,
        ]
    }

    /// Canonical column name.
    pub fn as_str(&self) -> &'static str {
        use ColumnId::*;
        match self {
            Sma20 => "SMA_20",
            Sma50 => "SMA_50",
            Sma200 => "SMA_200",
            Ema12 => "EMA_12",
            Ema26 => "EMA_26",
            Ema50 => "EMA_50",
            BbUpper => "BB_Upper",
            BbMiddle => "BB_Middle",
            BbLower => "BB_Lower",
            BbWidth => "BB_Width",
            BbPercentB => "BB_PercentB",
            Macd => "MACD",
            MacdSignal => "MACD_Signal",
            MacdHistogram => "MACD_Histogram",
            Rsi14 => "RSI_14",
            Rsi30 => "RSI_30",
            StochK => "STOCH_K",
            StochD => "STOCH_D",
            WilliamsR => "WILLIAMS_R",
            Adx => "ADX",
            PlusDi => "PLUS_DI",
            MinusDi => "MINUS_DI",
            Atr => "ATR",
            Cci => "CCI",
            Roc => "ROC",
            Obv => "OBV",
            Mfi => "MFI",
            VolumeSma => "Volume_SMA",
            Pivot => "Pivot",
            R1 => "R1",
            S1 => "S1",
            R2 => "R2",
            S2 => "S2",
            R3 => "R3",
            S3 => "S3",
        }
    }

    /// Whether the column belongs to the volume group.
    pub fn is_volume(&self) -> bool {
        matches!(self, ColumnId::Obv | ColumnId::Mfi | ColumnId::VolumeSma)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A derived column: one entry per bar, `None` where undefined.
pub type Column = Vec<Option<f64>>;

/// The input series plus every derived indicator column.
///
/// Every column has exactly `series.len()` entries and row `i` of every column
/// belongs to bar `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    series: BarSeries,
    columns: BTreeMap<ColumnId, Column>,
}

impl IndicatorFrame {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Check if the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// The underlying bars.
    pub fn series(&self) -> &BarSeries {
        &self.series
    }

    /// Ticker of the underlying series.
    pub fn ticker(&self) -> &Ticker {
        &self.series.ticker
    }

    /// Close of the latest bar.
    pub fn latest_close(&self) -> Option<f64> {
        self.series
            .last()
            .map(|b| b.close)
            .filter(|c| c.is_finite())
    }

    /// A column by id, if it was computed.
    pub fn column(&self, id: ColumnId) -> Option<&[Option<f64>]> {
        self.columns.get(&id).map(Vec::as_slice)
    }

    /// Check if a column was computed.
    pub fn has_column(&self, id: ColumnId) -> bool {
        self.columns.contains_key(&id)
    }

    /// Ids of the computed columns, in output order.
    pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.keys().copied()
    }

    /// Value of a column at a row.
    pub fn value(&self, id: ColumnId, row: usize) -> Option<f64> {
        self.columns.get(&id)?.get(row).copied().flatten()
    }

    /// Value of a column in the latest row.
    pub fn latest(&self, id: ColumnId) -> Option<f64> {
        self.columns.get(&id)?.last().copied().flatten()
    }

    /// Number of missing entries in a column.
    pub fn missing_count(&self, id: ColumnId) -> Option<usize> {
        self.columns
            .get(&id)
            .map(|c| c.iter().filter(|v| v.is_none()).count())
    }

    /// Pivot levels of the latest bar.
    pub fn pivot_levels(&self) -> Option<PivotLevels> {
        Some(PivotLevels {
            pivot: self.latest(ColumnId::Pivot)?,
            r1: self.latest(ColumnId::R1)?,
            s1: self.latest(ColumnId::S1)?,
            r2: self.latest(ColumnId::R2)?,
            s2: self.latest(ColumnId::S2)?,
            r3: self.latest(ColumnId::R3)?,
            s3: self.latest(ColumnId::S3)?,
        })
    }

    /// Write the frame as CSV, one row per bar.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec![
            "Date".to_string(),
            "Open".to_string(),
            "High".to_string(),
            "Low".to_string(),
            "Close".to_string(),
            "Volume".to_string(),
        ];
        header.extend(self.columns.keys().map(|id| id.as_str().to_string()));
        wtr.write_record(&header)?;

        for (row, bar) in self.series.iter().enumerate() {
            let mut record = vec![
                bar.datetime().format("%Y-%m-%d").to_string(),
                format_cell(Some(bar.open)),
                format_cell(Some(bar.high)),
                format_cell(Some(bar.low)),
                format_cell(Some(bar.close)),
                format_cell(Some(bar.volume)),
            ];
            record.extend(self.columns.values().map(|col| format_cell(col[row])));
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[derive(Serialize)]
struct ColumnarFrame<'a> {
    ticker: &'a Ticker,
    timestamps: Vec<i64>,
    open: Column,
    high: Column,
    low: Column,
    close: Column,
    volume: Column,
    columns: &'a BTreeMap<ColumnId, Column>,
}

impl Serialize for IndicatorFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let field =
            |f: fn(&Bar) -> f64| -> Column { self.series.iter().map(|b| finite(f(b))).collect() };

        ColumnarFrame {
            ticker: &self.series.ticker,
            timestamps: self.series.timestamps(),
            open: field(|b| b.open),
            high: field(|b| b.high),
            low: field(|b| b.low),
            close: field(|b| b.close),
            volume: field(|b| b.volume),
            columns: &self.columns,
        }
        .serialize(serializer)
    }
}

/// Right-align `values` against a series of `len` rows, padding the warm-up
/// rows with `None` and mapping non-finite values to `None`.
fn align<I>(values: I, len: usize) -> Column
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: ExactSizeIterator,
{
    let values = values.into_iter();
    let skip = values.len().saturating_sub(len);
    let pad = len.saturating_sub(values.len());

    let mut column = Vec::with_capacity(len);
    column.resize(pad, None);
    column.extend(values.skip(skip).map(finite));
    column
}

/// Compute the full indicator battery for a series.
///
/// Pure and deterministic. Indicators whose warm-up exceeds the series length
/// yield all-`None` columns. The volume group (OBV, MFI, Volume_SMA) is only
/// present when the series has at least one finite, non-zero volume.
pub fn compute(series: &BarSeries) -> IndicatorFrame {
    let len = series.len();
    let mut columns = BTreeMap::new();

    if series.is_empty() {
        return IndicatorFrame {
            series: series.clone(),
            columns,
        };
    }

    debug!(ticker = %series.ticker, rows = len, "Computing indicators");

    let bars = series.bars();
    let closes = series.closes();

    // Moving averages
    for (id, period) in [
        (ColumnId::Sma20, 20),
        (ColumnId::Sma50, 50),
        (ColumnId::Sma200, 200),
    ] {
        columns.insert(id, align(Sma::new(period).calculate(&closes), len));
    }
    for (id, period) in [
        (ColumnId::Ema12, 12),
        (ColumnId::Ema26, 26),
        (ColumnId::Ema50, 50),
    ] {
        columns.insert(id, align(Ema::new(period).calculate(&closes), len));
    }

    // Bollinger Bands
    let bb = BollingerBands::new().calculate(&closes);
    columns.insert(ColumnId::BbUpper, align(bb.iter().map(|o| o.upper), len));
    columns.insert(ColumnId::BbMiddle, align(bb.iter().map(|o| o.middle), len));
    columns.insert(ColumnId::BbLower, align(bb.iter().map(|o| o.lower), len));
    columns.insert(ColumnId::BbWidth, align(bb.iter().map(|o| o.width), len));
    columns.insert(ColumnId::BbPercentB, align(bb.iter().map(|o| o.percent_b), len));

    // MACD: the line starts before the signal, so it is aligned separately
    let macd = Macd::new();
    columns.insert(ColumnId::Macd, align(macd.macd_line(&closes), len));
    let macd_out = macd.calculate(&closes);
    columns.insert(ColumnId::MacdSignal, align(macd_out.iter().map(|o| o.signal), len));
    columns.insert(
        ColumnId::MacdHistogram,
        align(macd_out.iter().map(|o| o.histogram), len),
    );

    // Momentum
    columns.insert(ColumnId::Rsi14, align(Rsi::new(14).calculate(&closes), len));
    columns.insert(ColumnId::Rsi30, align(Rsi::new(30).calculate(&closes), len));

    let stoch = Stochastic::new();
    columns.insert(ColumnId::StochK, align(stoch.percent_k(bars), len));
    columns.insert(
        ColumnId::StochD,
        align(stoch.calculate_bars(bars).iter().map(|o| o.d), len),
    );
    columns.insert(
        ColumnId::WilliamsR,
        align(WilliamsR::new(14).calculate_bars(bars), len),
    );
    columns.insert(ColumnId::Roc, align(Roc::new(10).calculate(&closes), len));

    // Trend strength and volatility
    let adx = Adx::new(14);
    let di = adx.directional(bars);
    columns.insert(ColumnId::PlusDi, align(di.iter().map(|d| d.0), len));
    columns.insert(ColumnId::MinusDi, align(di.iter().map(|d| d.1), len));
    columns.insert(
        ColumnId::Adx,
        align(adx.calculate_bars(bars).iter().map(|o| o.adx), len),
    );
    columns.insert(ColumnId::Atr, align(Atr::new(14).calculate_bars(bars), len));
    columns.insert(ColumnId::Cci, align(Cci::new(20).calculate_bars(bars), len));

    // Volume group
    if series.has_volume() {
        columns.insert(ColumnId::Obv, align(Obv::new().calculate_bars(bars), len));
        columns.insert(ColumnId::Mfi, align(Mfi::new(14).calculate_bars(bars), len));
        columns.insert(
            ColumnId::VolumeSma,
            align(Sma::new(20).calculate(&series.volumes()), len),
        );
    } else {
        debug!(ticker = %series.ticker, "No usable volume, skipping volume indicators");
    }

    // Pivot points
    let pivots = Pivots.calculate_bars(bars);
    columns.insert(ColumnId::Pivot, align(pivots.iter().map(|p| p.pivot), len));
    columns.insert(ColumnId::R1, align(pivots.iter().map(|p| p.r1), len));
    columns.insert(ColumnId::S1, align(pivots.iter().map(|p| p.s1), len));
    columns.insert(ColumnId::R2, align(pivots.iter().map(|p| p.r2), len));
    columns.insert(ColumnId::S2, align(pivots.iter().map(|p| p.s2), len));
    columns.insert(ColumnId::R3, align(pivots.iter().map(|p| p.r3), len));
    columns.insert(ColumnId::S3, align(pivots.iter().map(|p| p.s3), len));

    debug!(
        ticker = %series.ticker,
        columns = columns.len(),
        "Indicator frame ready"
    );

    IndicatorFrame {
        series: series.clone(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;

    fn series_from(closes: &[f64], volume: f64) -> BarSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Bar::new(
                    1_600_000_000_000 + i as i64 * DAY_MS,
                    c,
                    c + 1.0,
                    c - 1.0,
                    c,
                    volume,
                )
            })
            .collect();
        BarSeries::new(Ticker::parse("TEST").unwrap(), bars)
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.15).sin() * 8.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn test_columns_align_with_input() {
        let frame = compute(&series_from(&wave(250), 1_000.0));

        assert_eq!(frame.len(), 250);
        for id in ColumnId::all() {
            let column = frame.column(*id).unwrap();
            assert_eq!(column.len(), 250, "{id} has wrong length");
        }
        assert!(frame.latest(ColumnId::Sma200).is_some());
    }

    #[test]
    fn test_sma_200_missing_for_short_series() {
        let frame = compute(&series_from(&wave(150), 1_000.0));

        assert_eq!(frame.missing_count(ColumnId::Sma200), Some(150));
        assert!(frame.latest(ColumnId::Sma50).is_some());
    }

    #[test]
    fn test_warm_up_rows() {
        let frame = compute(&series_from(&wave(60), 1_000.0));

        assert_eq!(frame.missing_count(ColumnId::Sma20), Some(19));
        assert_eq!(frame.missing_count(ColumnId::Ema12), Some(11));
        assert_eq!(frame.missing_count(ColumnId::Macd), Some(25));
        assert_eq!(frame.missing_count(ColumnId::MacdSignal), Some(33));
        assert_eq!(frame.missing_count(ColumnId::Rsi14), Some(14));
        assert_eq!(frame.missing_count(ColumnId::StochK), Some(13));
        assert_eq!(frame.missing_count(ColumnId::StochD), Some(15));
        assert_eq!(frame.missing_count(ColumnId::PlusDi), Some(14));
        assert_eq!(frame.missing_count(ColumnId::Adx), Some(27));
        assert_eq!(frame.missing_count(ColumnId::Atr), Some(14));
        assert_eq!(frame.missing_count(ColumnId::Roc), Some(10));
        assert_eq!(frame.missing_count(ColumnId::Obv), Some(0));
        assert_eq!(frame.missing_count(ColumnId::Pivot), Some(0));
    }

    #[test]
    fn test_rsi_in_range() {
        for closes in [wave(120), vec![25.0; 120]] {
            let frame = compute(&series_from(&closes, 1_000.0));
            for value in frame.column(ColumnId::Rsi14).unwrap().iter().flatten() {
                assert!((0.0..=100.0).contains(value));
            }
        }
    }

    #[test]
    fn test_sma_20_on_ramp() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
        let frame = compute(&series_from(&closes, 1_000.0));
        let sma = frame.column(ColumnId::Sma20).unwrap();

        for row in 0..60 {
            if row < 19 {
                assert!(sma[row].is_none());
            } else {
                let expected = closes[row - 19..=row].iter().sum::<f64>() / 20.0;
                assert!((sma[row].unwrap() - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_volume_group_omitted_without_volume() {
        for volume in [0.0, f64::NAN] {
            let frame = compute(&series_from(&wave(60), volume));
            assert!(!frame.has_column(ColumnId::Obv));
            assert!(!frame.has_column(ColumnId::Mfi));
            assert!(!frame.has_column(ColumnId::VolumeSma));
            assert!(frame.has_column(ColumnId::Rsi14));
        }

        let frame = compute(&series_from(&wave(60), 5_000.0));
        assert!(ColumnId::all()
            .iter()
            .filter(|id| id.is_volume())
            .all(|id| frame.has_column(*id)));
    }

    #[test]
    fn test_missing_close_stays_local() {
        let mut closes = wave(80);
        closes[40] = f64::NAN;
        let frame = compute(&series_from(&closes, 1_000.0));
        let sma = frame.column(ColumnId::Sma20).unwrap();

        // Windows covering row 40 are missing, later windows recover
        assert!(sma[39].is_some());
        assert!(sma[40..60].iter().all(Option::is_none));
        assert!(sma[60].is_some());
        assert!(frame.latest(ColumnId::Ema12).is_some());
        assert!(frame.latest(ColumnId::Rsi14).is_some());
    }

    #[test]
    fn test_empty_series() {
        let frame = compute(&series_from(&[], 0.0));
        assert!(frame.is_empty());
        assert_eq!(frame.column_ids().count(), 0);
        assert!(frame.pivot_levels().is_none());
    }

    #[test]
    fn test_compute_is_deterministic() {
        let series = series_from(&wave(90), 2_000.0);
        assert_eq!(compute(&series), compute(&series));
    }

    #[test]
    fn test_pivot_levels_from_latest_row() {
        let frame = compute(&series_from(&[10.0, 20.0], 1.0));
        let levels = frame.pivot_levels().unwrap();

        // Last bar: high 21, low 19, close 20
        assert!((levels.pivot - 20.0).abs() < 1e-10);
        assert!((levels.r1 - 21.0).abs() < 1e-10);
        assert!((levels.s2 - 18.0).abs() < 1e-10);
    }

    #[test]
    fn test_csv_export() {
        let frame = compute(&series_from(&wave(30), 1_000.0));
        let mut out = Vec::new();
        frame.write_csv(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Date,Open,High,Low,Close,Volume,SMA_20"));
        assert_eq!(lines.count(), 30);
    }

    #[test]
    fn test_json_is_columnar() {
        let frame = compute(&series_from(&wave(30), 1_000.0));
        let json = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["ticker"], "TEST");
        assert_eq!(json["timestamps"].as_array().unwrap().len(), 30);
        assert_eq!(json["columns"]["SMA_20"].as_array().unwrap().len(), 30);
        assert!(json["columns"]["SMA_20"][0].is_null());
        assert!(json["columns"]["BB_PercentB"][29].is_number());
    }
}
