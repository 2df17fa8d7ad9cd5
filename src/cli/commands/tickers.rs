//! Tickers command implementation.

use anyhow::Result;
use stockta_config::AppConfig;
use stockta_data::TickerCatalog;
use tracing::info;

use crate::cli::TickersArgs;

pub async fn run(args: TickersArgs, config: &AppConfig) -> Result<()> {
    let path = args.file.as_deref().unwrap_or(config.app.tickers_file.as_path());
    let catalog = TickerCatalog::load_or_fallback(path);
    info!(path = %path.display(), tickers = catalog.len(), "Listing tickers");

    let default = catalog.default_ticker().map(|t| t.ticker.clone());
    for info in catalog.display_order() {
        let marker = if Some(&info.ticker) == default.as_ref() { "*" } else { " " };
        match &info.sector {
            Some(sector) => println!("{} {} ({})", marker, info, sector),
            None => println!("{} {}", marker, info),
        }
    }
    println!();
    println!("{} tickers", catalog.len());

    Ok(())
}
