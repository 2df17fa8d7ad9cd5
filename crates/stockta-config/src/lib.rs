//! Configuration management.
//!
//! Values are layered: serde defaults, then the optional TOML file, then
//! `STOCKTA__SECTION__KEY` environment variables.

mod settings;

pub use settings::{AnalysisSettings, AppConfig, AppSettings, CacheSettings, LoggingConfig};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "STOCKTA";

/// Load configuration from an optional file and the environment.
///
/// A missing file is not an error; defaults apply.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(false));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

/// Render the effective configuration as TOML.
pub fn render_config(config: &AppConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use stockta_core::types::LookbackPeriod;
    use stockta_monitor::LogFormat;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("missing.toml"))).unwrap();

        assert_eq!(config.app.name, "stockta");
        assert_eq!(config.analysis.default_period, LookbackPeriod::Year1);
        assert_eq!(config.analysis.rsi_overbought, 70.0);
        assert_eq!(config.providers.polygon.api_key_env, "POLYGON_API_KEY");
        assert!(config.cache.max_age().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockta.toml");
        fs::write(
            &path,
            r#"
[logging]
level = "debug"
format = "json"

[providers]
timeout_secs = 15

[providers.vci]
base_url = "http://localhost:8080/api/"

[analysis]
default_period = "6M"
rsi_overbought = 80.0
rsi_oversold = 20.0

[cache]
max_age_secs = 300
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.providers.timeout_secs, Some(15));
        assert_eq!(config.providers.vci.base_url, "http://localhost:8080/api/");
        // Untouched sections keep their defaults
        assert_eq!(config.providers.yahoo, stockta_data::YahooSettings::default());
        assert_eq!(config.analysis.default_period, LookbackPeriod::Month6);
        assert_eq!(config.analysis.scorer_config().rsi_oversold, 20.0);
        assert_eq!(config.cache.max_age_secs, Some(300));
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.analysis.rsi_oversold = 75.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.providers.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_render_round_trips() {
        let config = AppConfig::default();
        let rendered = render_config(&config).unwrap();

        assert!(rendered.contains("[analysis]"));
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
