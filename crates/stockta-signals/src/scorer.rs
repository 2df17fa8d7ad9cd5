//! Signal scorer.
//!
//! Reduces the latest row of an indicator frame to four votes and a discrete
//! verdict. Only the latest row is read, so scoring the same frame twice always
//! gives the same result.

use serde::{Deserialize, Serialize};
use std::fmt;
use stockta_core::error::SignalError;
use stockta_indicators::{ColumnId, IndicatorFrame};
use tracing::debug;

/// One rule's opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Bearish,
    Neutral,
    Bullish,
}

impl Vote {
    /// Numeric value: -1, 0 or +1.
    pub fn value(&self) -> i32 {
        match self {
            Vote::Bearish => -1,
            Vote::Neutral => 0,
            Vote::Bullish => 1,
        }
    }

    /// `+1` only when both sides are present and `lhs > rhs`; a missing side
    /// fails the comparison and votes bearish.
    fn from_comparison(lhs: Option<f64>, rhs: Option<f64>) -> Self {
        match (lhs, rhs) {
            (Some(a), Some(b)) if a > b => Vote::Bullish,
            _ => Vote::Bearish,
        }
    }
}

/// The four scoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteRule {
    /// Close above SMA 20
    PriceVsSma20,
    /// Close above SMA 50
    PriceVsSma50,
    /// RSI 14 outside the neutral band
    RsiZone,
    /// MACD above its signal line
    MacdCross,
}

impl VoteRule {
    /// All rules in scoring order.
    pub fn all() -> [VoteRule; 4] {
        [
            VoteRule::PriceVsSma20,
            VoteRule::PriceVsSma50,
            VoteRule::RsiZone,
            VoteRule::MacdCross,
        ]
    }

    /// Human-readable rule label.
    pub fn label(&self) -> &'static str {
        match self {
            VoteRule::PriceVsSma20 => "Price vs SMA 20",
            VoteRule::PriceVsSma50 => "Price vs SMA 50",
            VoteRule::RsiZone => "RSI 14 zone",
            VoteRule::MacdCross => "MACD vs signal",
        }
    }
}

/// Discrete recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Verdict {
    /// Map a summed score onto a verdict.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 2 => Verdict::StrongBuy,
            1 => Verdict::Buy,
            0 => Verdict::Hold,
            -1 => Verdict::Sell,
            _ => Verdict::StrongSell,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::StrongBuy => "STRONG_BUY",
            Verdict::Buy => "BUY",
            Verdict::Hold => "HOLD",
            Verdict::Sell => "SELL",
            Verdict::StrongSell => "STRONG_SELL",
        };
        f.write_str(s)
    }
}

/// Scorer thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// RSI above this votes bearish
    pub rsi_overbought: f64,
    /// RSI below this votes bullish
    pub rsi_oversold: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

impl ScorerConfig {
    /// Validate the thresholds.
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.rsi_overbought <= self.rsi_oversold {
            return Err(SignalError::InvalidConfig(
                "Overbought must be greater than oversold".into(),
            ));
        }
        if self.rsi_overbought > 100.0 || self.rsi_oversold < 0.0 {
            return Err(SignalError::InvalidConfig(
                "RSI thresholds must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

/// The latest-row values the rules read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalInputs {
    pub close: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
}

impl SignalInputs {
    /// Read the latest row of a frame.
    pub fn from_frame(frame: &IndicatorFrame) -> Self {
        Self {
            close: frame.latest_close(),
            sma_20: frame.latest(ColumnId::Sma20),
            sma_50: frame.latest(ColumnId::Sma50),
            rsi_14: frame.latest(ColumnId::Rsi14),
            macd: frame.latest(ColumnId::Macd),
            macd_signal: frame.latest(ColumnId::MacdSignal),
        }
    }
}

/// A rule together with its vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleVote {
    pub rule: VoteRule,
    pub vote: Vote,
}

/// Scorer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    /// One vote per rule, in rule order
    pub votes: Vec<RuleVote>,
    /// Sum of the votes, in [-4, 4]
    pub numeric_score: i32,
    pub verdict: Verdict,
    /// Inputs the votes were taken from
    pub inputs: SignalInputs,
}

impl SignalSummary {
    /// Vote cast by a rule.
    pub fn vote(&self, rule: VoteRule) -> Option<Vote> {
        self.votes.iter().find(|v| v.rule == rule).map(|v| v.vote)
    }

    /// Number of neutral votes. Only the RSI rule can abstain.
    pub fn abstentions(&self) -> usize {
        self.votes.iter().filter(|v| v.vote == Vote::Neutral).count()
    }
}

/// Four-rule signal scorer.
#[derive(Debug, Clone, Default)]
pub struct SignalScorer {
    config: ScorerConfig,
}

impl SignalScorer {
    /// Create a scorer, rejecting invalid thresholds.
    pub fn new(config: ScorerConfig) -> Result<Self, SignalError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Scorer thresholds.
    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Score the latest row of a frame.
    pub fn score(&self, frame: &IndicatorFrame) -> SignalSummary {
        let summary = self.score_inputs(SignalInputs::from_frame(frame));
        debug!(
            ticker = %frame.ticker(),
            score = summary.numeric_score,
            verdict = %summary.verdict,
            "Scored latest row"
        );
        summary
    }

    /// Score explicit latest-row values.
    pub fn score_inputs(&self, inputs: SignalInputs) -> SignalSummary {
        let votes: Vec<RuleVote> = VoteRule::all()
            .into_iter()
            .map(|rule| RuleVote {
                rule,
                vote: self.vote(rule, &inputs),
            })
            .collect();

        let numeric_score = votes.iter().map(|v| v.vote.value()).sum();

        SignalSummary {
            votes,
            numeric_score,
            verdict: Verdict::from_score(numeric_score),
            inputs,
        }
    }

    fn vote(&self, rule: VoteRule, inputs: &SignalInputs) -> Vote {
        match rule {
            VoteRule::PriceVsSma20 => Vote::from_comparison(inputs.close, inputs.sma_20),
            VoteRule::PriceVsSma50 => Vote::from_comparison(inputs.close, inputs.sma_50),
            VoteRule::MacdCross => Vote::from_comparison(inputs.macd, inputs.macd_signal),
            VoteRule::RsiZone => match inputs.rsi_14 {
                Some(rsi) if rsi > self.config.rsi_overbought => Vote::Bearish,
                Some(rsi) if rsi < self.config.rsi_oversold => Vote::Bullish,
                _ => Vote::Neutral,
            },
        }
    }
}

/// Score a frame with the default thresholds.
pub fn score(frame: &IndicatorFrame) -> SignalSummary {
    SignalScorer::default().score(frame)
}
