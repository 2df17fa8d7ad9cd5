//! Indicators command implementation.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use stockta_config::AppConfig;
use stockta_indicators::{compute, IndicatorFrame};
use tracing::info;

use super::Session;
use crate::cli::{IndicatorsArgs, TableFormat};

pub async fn run(args: IndicatorsArgs, config: &AppConfig) -> Result<()> {
    let mut session = Session::new(config)?;
    let series = session.history(&args.ticker, args.period).await?;

    let frame = compute(&series);
    info!(
        ticker = %frame.ticker(),
        rows = frame.len(),
        columns = frame.column_ids().count(),
        "Indicators computed"
    );

    match &args.save {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_frame(&frame, args.output, BufWriter::new(file))?;
            info!("Indicators saved to {:?}", path);
        }
        None => write_frame(&frame, args.output, io::stdout().lock())?,
    }

    Ok(())
}

fn write_frame<W: Write>(frame: &IndicatorFrame, format: TableFormat, mut writer: W) -> Result<()> {
    match format {
        TableFormat::Csv => frame.write_csv(&mut writer)?,
        TableFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, frame)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}
