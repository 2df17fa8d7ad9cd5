//! Configuration structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use stockta_core::error::DashboardError;
use stockta_core::types::LookbackPeriod;
use stockta_data::ProviderSettings;
use stockta_monitor::LogFormat;
use stockta_signals::ScorerConfig;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub providers: ProviderSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

impl AppConfig {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), DashboardError> {
        self.analysis.scorer_config().validate()?;

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(DashboardError::Config(format!(
                "Unknown log level '{}'",
                self.logging.level
            )));
        }

        if self.providers.timeout_secs == Some(0) {
            return Err(DashboardError::Config(
                "providers.timeout_secs must be positive".into(),
            ));
        }

        if let Some(path) = &self.providers.archive_dir {
            if !path.is_dir() {
                return Err(DashboardError::Config(format!(
                    "Archive directory {} does not exist",
                    path.display()
                )));
            }
        }

        Ok(())
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
    /// Ticker catalog file (`SYMBOL|NAME|SECTOR|COUNTRY` lines)
    pub tickers_file: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "stockta".to_string(),
            environment: "development".to_string(),
            tickers_file: PathBuf::from("all_tickers.txt"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Analysis defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Lookback used when a command does not name one
    pub default_period: LookbackPeriod,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        let scorer = ScorerConfig::default();
        Self {
            default_period: LookbackPeriod::default(),
            rsi_overbought: scorer.rsi_overbought,
            rsi_oversold: scorer.rsi_oversold,
        }
    }
}

impl AnalysisSettings {
    pub fn scorer_config(&self) -> ScorerConfig {
        ScorerConfig {
            rsi_overbought: self.rsi_overbought,
            rsi_oversold: self.rsi_oversold,
        }
    }
}

/// Series cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CacheSettings {
    /// Seconds before a cached series is refetched; none keeps entries for the session
    pub max_age_secs: Option<u64>,
}

impl CacheSettings {
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age_secs.map(Duration::from_secs)
    }
}
