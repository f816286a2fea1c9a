use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ohlc_forecast::{
    config::ForecastConfig,
    export::{export_file_name, render_tail, write_csv, Summary},
    market::{
        parse_exchange_info, tradable_symbols, CsvFileProvider, Interval, Lookback,
        MarketDataProvider,
    },
    EngineBuilder,
};

/// Candle-majority forecast with an ATR-based target
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Forecast one symbol from `<data-dir>/<SYMBOL>_<interval>.csv`
    Forecast {
        #[arg(long)]
        data_dir: PathBuf,

        #[arg(long)]
        symbol: String,

        #[arg(long, default_value_t = Interval::default())]
        interval: Interval,

        /// Lookback period in hours (6..=168)
        #[arg(long, default_value_t = 48)]
        hours: u32,

        /// ATR window, overrides the config file
        #[arg(long)]
        window: Option<usize>,

        /// JSON engine configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write annotated bars as CSV; a directory gets `<SYMBOL>_ohlc.csv`
        #[arg(long)]
        export: Option<PathBuf>,

        /// Rows of the annotated table to print (0 disables)
        #[arg(long, default_value_t = 30)]
        tail: usize,
    },

    /// List tradable USDT symbols from an exchange-info JSON document
    Symbols {
        #[arg(long)]
        exchange_info: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(Cli::parse(), &mut io::stdout().lock())
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Command::Forecast {
            data_dir,
            symbol,
            interval,
            hours,
            window,
            config,
            export,
            tail,
        } => {
            let config = match config {
                Some(path) => ForecastConfig::from_json_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => ForecastConfig::default(),
            };
            let mut builder = EngineBuilder::from_config(config);
            if let Some(window) = window {
                builder = builder.window(window);
            }
            let engine = builder.build().context("invalid engine settings")?;
            let lookback = Lookback::new(hours)?;

            let provider = CsvFileProvider::new(&data_dir);
            let bars = provider
                .fetch(&symbol, interval, lookback)
                .with_context(|| format!("fetching {symbol} {interval}"))?;
            if bars.is_empty() {
                anyhow::bail!("no data available for {symbol} {interval}, try another pair or interval");
            }

            let result = engine.forecast(&bars)?;
            writeln!(out, "{}", Summary::new(&symbol, &result))?;
            if !result.atr_available {
                log::warn!(
                    "volatility unknown: {} bars is below the {}-bar ATR window",
                    result.bar_count,
                    result.window
                );
            }

            let rows = engine.annotate(&bars)?;
            if tail > 0 {
                writeln!(out)?;
                write!(out, "{}", render_tail(&rows, tail))?;
            }

            if let Some(path) = export {
                let path = if path.is_dir() {
                    path.join(export_file_name(&symbol))
                } else {
                    path
                };
                let file = File::create(&path)
                    .with_context(|| format!("creating {}", path.display()))?;
                write_csv(&rows, BufWriter::new(file))?;
                log::info!("exported {} rows to {}", rows.len(), path.display());
            }
        }

        Command::Symbols { exchange_info } => {
            let json = std::fs::read_to_string(&exchange_info)
                .with_context(|| format!("reading {}", exchange_info.display()))?;
            let infos = parse_exchange_info(&json)?;
            for symbol in tradable_symbols(&infos) {
                writeln!(out, "{symbol}")?;
            }
        }
    }

    Ok(())
}
