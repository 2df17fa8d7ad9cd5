//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use stockta_config::{render_config, AppConfig};

pub async fn run(config: &AppConfig, config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);
    if !config_path.exists() {
        println!("(file not found, using defaults and environment)");
    }

    match config.validate() {
        Ok(()) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Default period: {}", config.analysis.default_period);
            println!(
                "RSI thresholds: {} / {}",
                config.analysis.rsi_oversold, config.analysis.rsi_overbought
            );
            println!(
                "Polygon key ({}): {}",
                config.providers.polygon.api_key_env,
                if std::env::var(&config.providers.polygon.api_key_env).is_ok() {
                    "set"
                } else {
                    "missing"
                }
            );
            println!();
            println!("{}", render_config(config)?);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
