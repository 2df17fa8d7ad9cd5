//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use stockta_core::types::LookbackPeriod;

#[derive(Parser)]
#[command(name = "stockta")]
#[command(author, version, about = "Technical analysis for US and Vietnamese stocks")]
pub struct Cli {
    /// Configuration file path (optional; defaults apply when missing)
    #[arg(short, long, default_value = "config/default.toml", env = "STOCKTA_CONFIG")]
    pub config: PathBuf,

    /// Log level (overrides the configuration file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch history, compute indicators and print the signal report
    Analyze(AnalyzeArgs),
    /// Export the full indicator table
    Indicators(IndicatorsArgs),
    /// List the ticker catalog
    Tickers(TickersArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    Csv,
    Json,
}

#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Tickers to analyze (comma-separated), e.g. AAPL,FPT.VN
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub tickers: Vec<String>,

    /// Lookback period (1M, 3M, 6M, 1Y, 2Y, 5Y); defaults to the configured period
    #[arg(short, long)]
    pub period: Option<LookbackPeriod>,

    /// Output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub output: ReportFormat,

    /// Include the company profile (sector, valuation ratios, market cap)
    #[arg(long)]
    pub profile: bool,
}

#[derive(clap::Args)]
pub struct IndicatorsArgs {
    /// Ticker to compute
    #[arg(short, long)]
    pub ticker: String,

    /// Lookback period (1M, 3M, 6M, 1Y, 2Y, 5Y); defaults to the configured period
    #[arg(short, long)]
    pub period: Option<LookbackPeriod>,

    /// Output format
    #[arg(long, value_enum, default_value_t = TableFormat::Csv)]
    pub output: TableFormat,

    /// Save to file instead of printing
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct TickersArgs {
    /// Catalog file; defaults to the configured one
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}
