//! Technical analysis report generation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stockta_core::types::{CompanyProfile, Ticker};
use stockta_indicators::{ColumnId, IndicatorFrame, PivotLevels};

use crate::analysis::{CrossState, KeyLevels, MarketSnapshot};
use crate::scorer::{SignalScorer, SignalSummary};

const RULE: &str = "───────────────────────────────────────────────────────────\n";
const DOUBLE_RULE: &str = "═══════════════════════════════════════════════════════════\n";

/// Complete technical analysis of one ticker's latest row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalReport {
    pub ticker: Ticker,
    /// Number of bars analysed
    pub rows: usize,
    pub snapshot: Option<MarketSnapshot>,
    pub key_levels: Option<KeyLevels>,
    pub cross: CrossState,
    pub pivots: Option<PivotLevels>,
    /// Latest defined value of every computed column
    pub readings: BTreeMap<ColumnId, f64>,
    pub signal: SignalSummary,
    /// Company profile, when requested and available
    pub profile: Option<CompanyProfile>,
}

impl TechnicalReport {
    /// Assemble the report from a computed frame.
    pub fn build(frame: &IndicatorFrame, scorer: &SignalScorer) -> Self {
        let series = frame.series();
        let readings = frame
            .column_ids()
            .filter_map(|id| frame.latest(id).map(|v| (id, v)))
            .collect();

        Self {
            ticker: frame.ticker().clone(),
            rows: frame.len(),
            snapshot: MarketSnapshot::from_series(series),
            key_levels: KeyLevels::from_series(series, KeyLevels::DEFAULT_WINDOW),
            cross: CrossState::from_frame(frame),
            pivots: frame.pivot_levels(),
            readings,
            signal: scorer.score(frame),
            profile: None,
        }
    }

    /// Attach a company profile.
    pub fn with_profile(mut self, profile: CompanyProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Latest reading of a column.
    pub fn reading(&self, id: ColumnId) -> Option<f64> {
        self.readings.get(&id).copied()
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str(DOUBLE_RULE);
        s.push_str(&format!(
            "                TECHNICAL ANALYSIS: {}\n",
            self.ticker
        ));
        s.push_str(DOUBLE_RULE);
        s.push('\n');

        s.push_str("MARKET\n");
        s.push_str(RULE);
        match &self.snapshot {
            Some(snap) => {
                s.push_str(&format!("  Price:               {:.2}\n", snap.price));
                s.push_str(&format!(
                    "  Change:              {}\n",
                    signed(snap.change, "")
                ));
                s.push_str(&format!(
                    "  Change %:            {}\n",
                    signed(snap.change_pct, "%")
                ));
                s.push_str(&format!(
                    "  Volume:              {}\n",
                    snap.volume
                        .map(|v| format!("{:.0}", v))
                        .unwrap_or_else(|| "N/A".into())
                ));
            }
            None => s.push_str("  No price data\n"),
        }
        s.push_str(&format!("  Bars analysed:       {}\n", self.rows));
        s.push('\n');

        s.push_str("MOVING AVERAGES\n");
        s.push_str(RULE);
        s.push_str(&format!("  SMA 20:              {}\n", self.fmt(ColumnId::Sma20, 2)));
        s.push_str(&format!("  SMA 50:              {}\n", self.fmt(ColumnId::Sma50, 2)));
        s.push_str(&format!("  SMA 200:             {}\n", self.fmt(ColumnId::Sma200, 2)));
        s.push_str(&format!("  Cross:               {}\n", self.cross));
        s.push('\n');

        s.push_str("MOMENTUM & TREND\n");
        s.push_str(RULE);
        s.push_str(&format!("  RSI 14:              {}\n", self.fmt(ColumnId::Rsi14, 2)));
        s.push_str(&format!(
            "  MACD:                {} (Signal: {})\n",
            self.fmt(ColumnId::Macd, 4),
            self.fmt(ColumnId::MacdSignal, 4)
        ));
        s.push_str(&format!("  Stochastic %K:       {}\n", self.fmt(ColumnId::StochK, 2)));
        s.push_str(&format!("  ADX:                 {}\n", self.fmt(ColumnId::Adx, 2)));
        s.push_str(&format!("  ATR:                 {}\n", self.fmt(ColumnId::Atr, 2)));
        s.push_str(&format!("  BB %B:               {}\n", self.fmt(ColumnId::BbPercentB, 2)));
        s.push('\n');

        s.push_str("KEY LEVELS\n");
        s.push_str(RULE);
        if let Some(levels) = &self.key_levels {
            s.push_str(&format!(
                "  Resistance:          {:.2} ({:+.1}%)\n",
                levels.resistance, levels.distance_to_resistance_pct
            ));
            s.push_str(&format!(
                "  Support:             {:.2} (-{:.1}%)\n",
                levels.support, levels.distance_from_support_pct
            ));
        }
        if let Some(p) = &self.pivots {
            s.push_str(&format!("  Pivot:               {:.2}\n", p.pivot));
            s.push_str(&format!(
                "  R1/R2/R3:            {:.2} / {:.2} / {:.2}\n",
                p.r1, p.r2, p.r3
            ));
            s.push_str(&format!(
                "  S1/S2/S3:            {:.2} / {:.2} / {:.2}\n",
                p.s1, p.s2, p.s3
            ));
        }
        s.push('\n');

        if let Some(profile) = &self.profile {
            s.push_str(&profile_section(profile));
            s.push('\n');
        }

        s.push_str("SIGNAL\n");
        s.push_str(RULE);
        for vote in &self.signal.votes {
            s.push_str(&format!(
                "  {:<21}{:+}\n",
                format!("{}:", vote.rule.label()),
                vote.vote.value()
            ));
        }
        s.push_str(&format!(
            "  Score:               {}/4\n",
            self.signal.numeric_score
        ));
        s.push_str(&format!("  Verdict:             {}\n", self.signal.verdict));
        s.push('\n');

        s.push_str(DOUBLE_RULE);

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn fmt(&self, id: ColumnId, decimals: usize) -> String {
        self.reading(id)
            .map(|v| format!("{:.*}", decimals, v))
            .unwrap_or_else(|| "N/A".into())
    }
}

fn profile_section(p: &CompanyProfile) -> String {
    let na = || "N/A".to_string();
    let text = |v: &Option<String>| v.clone().unwrap_or_else(na);
    let ratio = |v: Option<f64>| v.filter(|r| *r != 0.0).map(|r| format!("{:.2}", r));

    let mut s = String::new();
    s.push_str("COMPANY\n");
    s.push_str(RULE);
    s.push_str(&format!("  Company:             {}\n", p.display_name()));
    s.push_str(&format!("  Sector:              {}\n", text(&p.sector)));
    s.push_str(&format!("  Industry:            {}\n", text(&p.industry)));
    s.push_str(&format!("  Country:             {}\n", text(&p.country)));
    if let Some(employees) = p.employees.filter(|e| *e > 0) {
        s.push_str(&format!("  Employees:           {}\n", employees));
    }
    s.push_str(&format!(
        "  Market cap:          {}\n",
        p.market_cap_display().unwrap_or_else(na)
    ));
    s.push_str(&format!(
        "  P/E:                 {}\n",
        ratio(p.trailing_pe).unwrap_or_else(na)
    ));
    s.push_str(&format!(
        "  P/B:                 {}\n",
        ratio(p.price_to_book).unwrap_or_else(na)
    ));
    s.push_str(&format!(
        "  Dividend yield:      {}\n",
        p.dividend_yield_pct()
            .map(|y| format!("{:.2}%", y))
            .unwrap_or_else(na)
    ));
    s.push_str(&format!(
        "  Beta:                {}\n",
        ratio(p.beta).unwrap_or_else(na)
    ));
    if let Some(website) = &p.website {
        s.push_str(&format!("  Website:             {}\n", website));
    }
    s
}

fn signed(value: Option<f64>, suffix: &str) -> String {
    value
        .map(|v| format!("{:+.2}{}", v, suffix))
        .unwrap_or_else(|| "N/A".into())
}
