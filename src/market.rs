//! Market data input
//!
//! The forecast engine only ever sees a bar slice. This module covers the
//! request parameters around it (interval, lookback, symbol universe) and the
//! [`MarketDataProvider`] seam that a live exchange client would implement.
//! [`CsvFileProvider`] serves bars from local CSV files.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{Ohlc, OhlcBar};

/// Errors from a market data provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no data for {symbol} {interval} at {}", path.display())]
    NotFound {
        symbol: String,
        interval: Interval,
        path: PathBuf,
    },

    #[error("failed to read bars: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read exchange info: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================
// INTERVAL
// ============================================================

/// Bar interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Interval {
    M1,
    M5,
    M15,
    M30,
    #[default]
    H1,
    H4,
    D1,
}

impl Interval {
    pub const ALL: [Interval; 7] = [
        Interval::M1,
        Interval::M5,
        Interval::M15,
        Interval::M30,
        Interval::H1,
        Interval::H4,
        Interval::D1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
            Interval::H4 => "4h",
            Interval::D1 => "1d",
        }
    }

    pub fn duration_ms(self) -> i64 {
        const MINUTE: i64 = 60_000;
        match self {
            Interval::M1 => MINUTE,
            Interval::M5 => 5 * MINUTE,
            Interval::M15 => 15 * MINUTE,
            Interval::M30 => 30 * MINUTE,
            Interval::H1 => 60 * MINUTE,
            Interval::H4 => 240 * MINUTE,
            Interval::D1 => 1_440 * MINUTE,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown interval string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown interval {0:?}, expected one of 1m, 5m, 15m, 30m, 1h, 4h, 1d")]
pub struct ParseIntervalError(pub String);

impl FromStr for Interval {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| ParseIntervalError(s.to_string()))
    }
}

// ============================================================
// LOOKBACK
// ============================================================

/// History length in hours, 6..=168
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lookback(u32);

impl Lookback {
    pub const MIN_HOURS: u32 = 6;
    pub const MAX_HOURS: u32 = 168;
    const HOUR_MS: i64 = 3_600_000;

    pub fn new(hours: u32) -> crate::Result<Self> {
        if !(Self::MIN_HOURS..=Self::MAX_HOURS).contains(&hours) {
            return Err(crate::ForecastError::InvalidConfig(format!(
                "lookback of {hours}h outside {}..={}",
                Self::MIN_HOURS,
                Self::MAX_HOURS
            )));
        }
        Ok(Self(hours))
    }

    #[inline]
    pub fn hours(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn duration_ms(self) -> i64 {
        i64::from(self.0) * Self::HOUR_MS
    }

    /// Trailing bars whose timestamps fall within the lookback measured from
    /// the last bar. Bars without timestamps are returned unchanged.
    pub fn select<T: Ohlc>(self, bars: &[T]) -> &[T] {
        let Some(end) = bars.last().and_then(|b| b.timestamp()) else {
            return bars;
        };
        let start = end.saturating_sub(self.duration_ms());
        let first = bars.partition_point(|b| b.timestamp().is_some_and(|t| t < start));
        &bars[first..]
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self(48)
    }
}

// ============================================================
// SYMBOL UNIVERSE
// ============================================================

/// One entry from an exchange symbol listing
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub quote_asset: String,
    pub status: String,
}

#[derive(serde::Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

const QUOTE_ASSET: &str = "USDT";
const LEVERAGED_MARKERS: [&str; 4] = ["UP", "DOWN", "BULL", "BEAR"];

impl SymbolInfo {
    /// USDT-quoted, trading, and not a leveraged token
    pub fn is_tradable(&self) -> bool {
        self.quote_asset == QUOTE_ASSET
            && self.status == "TRADING"
            && !LEVERAGED_MARKERS.iter().any(|m| self.symbol.contains(m))
    }
}

/// Sorted tradable symbols
pub fn tradable_symbols<'a>(infos: impl IntoIterator<Item = &'a SymbolInfo>) -> Vec<String> {
    let mut symbols: Vec<String> = infos
        .into_iter()
        .filter(|info| info.is_tradable())
        .map(|info| info.symbol.clone())
        .collect();
    symbols.sort();
    symbols
}

/// Parse an exchange-info document (`{"symbols": [...]}`)
pub fn parse_exchange_info(json: &str) -> Result<Vec<SymbolInfo>, ProviderError> {
    let info: ExchangeInfo = serde_json::from_str(json)?;
    Ok(info.symbols)
}

// ============================================================
// PROVIDERS
// ============================================================

/// Source of bars for a symbol. Implementations own their own timeout and
/// retry policy.
pub trait MarketDataProvider {
    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<Vec<OhlcBar>, ProviderError>;
}

/// Reads `<dir>/<SYMBOL>_<interval>.csv` with a
/// `timestamp,open,high,low,close` header
#[derive(Debug, Clone)]
pub struct CsvFileProvider {
    dir: PathBuf,
}

impl CsvFileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.dir.join(format!("{symbol}_{interval}.csv"))
    }
}

/// Read every bar from a CSV file
pub fn read_bars_csv(path: &Path) -> Result<Vec<OhlcBar>, ProviderError> {
    let mut reader = csv::Reader::from_path(path)?;
    let bars = reader.deserialize().collect::<Result<Vec<OhlcBar>, _>>()?;
    Ok(bars)
}

impl MarketDataProvider for CsvFileProvider {
    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<Vec<OhlcBar>, ProviderError> {
        let path = self.path_for(symbol, interval);
        if !path.is_file() {
            return Err(ProviderError::NotFound {
                symbol: symbol.to_string(),
                interval,
                path,
            });
        }

        let bars = read_bars_csv(&path)?;
        let selected = lookback.select(&bars);
        log::info!(
            "loaded {} of {} bars for {} {} ({}h)",
            selected.len(),
            bars.len(),
            symbol,
            interval,
            lookback.hours()
        );
        Ok(selected.to_vec())
    }
}
