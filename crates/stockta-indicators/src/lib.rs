//! Technical indicators and the indicator engine.
//!
//! This crate provides batch implementations of the indicators used by the
//! analysis pipeline:
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD, Stochastic, Williams %R, ROC)
//! - Trend strength (ADX with +DI/-DI, CCI)
//! - Volatility indicators (ATR, Bollinger Bands)
//! - Volume indicators (OBV, MFI)
//! - Classic pivot points
//!
//! [`compute`] runs the whole battery over a [`BarSeries`](stockta_core::BarSeries)
//! and returns an [`IndicatorFrame`] whose columns line up with the input bars.

pub mod frame;
pub mod momentum;
pub mod moving_average;
pub mod pivot;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use frame::{compute, Column, ColumnId, IndicatorFrame};
pub use momentum::{Macd, MacdOutput, Roc, Rsi, Stochastic, StochasticOutput, WilliamsR};
pub use moving_average::{Ema, Sma};
pub use pivot::{PivotLevels, Pivots};
pub use trend::{Adx, AdxOutput, Cci};
pub use volatility::{Atr, BollingerBands, BollingerOutput};
pub use volume::{Mfi, Obv};
