//! Signal scoring and technical analysis reports.
//!
//! This crate turns an [`IndicatorFrame`](stockta_indicators::IndicatorFrame) into
//! decisions and readings:
//! - The four-rule signal scorer and its verdict
//! - Market snapshot, key support/resistance levels and the SMA cross state
//! - A combined technical report with text and JSON output

mod analysis;
mod report;
mod scorer;

pub use analysis::{CrossState, KeyLevels, MarketSnapshot};
pub use report::TechnicalReport;
pub use scorer::{
    score, RuleVote, ScorerConfig, SignalInputs, SignalScorer, SignalSummary, Verdict, Vote,
    VoteRule,
};
