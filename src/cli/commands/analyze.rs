//! Analyze command implementation.

use anyhow::{Context, Result};
use stockta_config::AppConfig;
use stockta_indicators::compute;
use stockta_signals::{SignalScorer, TechnicalReport};
use tracing::{error, info, warn};

use super::Session;
use crate::cli::{AnalyzeArgs, ReportFormat};

pub async fn run(args: AnalyzeArgs, config: &AppConfig) -> Result<()> {
    let scorer = SignalScorer::new(config.analysis.scorer_config())
        .context("Invalid signal thresholds")?;
    let mut session = Session::new(config)?;

    let mut reports = Vec::with_capacity(args.tickers.len());
    let mut failed = Vec::new();

    for symbol in &args.tickers {
        info!(ticker = %symbol, "Analyzing");
        let series = match session.history(symbol, args.period).await {
            Ok(series) => series,
            Err(e) => {
                error!(ticker = %symbol, error = %format!("{:#}", e), "Analysis skipped");
                failed.push(symbol.clone());
                continue;
            }
        };

        let frame = compute(&series);
        let mut report = TechnicalReport::build(&frame, &scorer);
        if args.profile {
            match session.profile(&report.ticker).await {
                Ok(profile) => report = report.with_profile(profile),
                Err(e) => warn!(
                    ticker = %report.ticker,
                    error = %format!("{:#}", e),
                    "Profile unavailable"
                ),
            }
        }
        info!(
            ticker = %report.ticker,
            rows = report.rows,
            score = report.signal.numeric_score,
            verdict = %report.signal.verdict,
            "Analysis complete"
        );
        reports.push(report);
    }

    match args.output {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&reports)?;
            println!("{}", json);
        }
        ReportFormat::Text => {
            for report in &reports {
                println!("{}", report.summary());
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("No data available for: {}", failed.join(", "));
    }

    Ok(())
}
