//! # ohlc-forecast
//!
//! Short-horizon directional forecasts from OHLC bars: majority candle label,
//! ATR-offset target price and a confidence score.
//!
//! ## Quick Start
//!
//! ```rust
//! use ohlc_forecast::prelude::*;
//!
//! let bars = vec![
//!     OhlcBar::new(1_000, 100.0, 101.0, 99.5, 100.5),
//!     OhlcBar::new(2_000, 100.5, 101.5, 100.0, 101.0),
//!     OhlcBar::new(3_000, 101.0, 101.2, 100.1, 100.4),
//! ];
//!
//! let engine = EngineBuilder::new().window(2).build().unwrap();
//! let result = engine.forecast(&bars).unwrap();
//!
//! assert_eq!(result.dominant_label, CandleLabel::Bullish);
//! assert!(result.atr_available);
//! ```

pub mod analytics;
pub mod config;
pub mod export;
pub mod market;

pub mod prelude {
    pub use crate::{
        // Analytics
        analytics::*,
        // Configuration
        config::{ConfigError, ForecastConfig},
        // Export
        export::{write_csv, AnnotatedBar, ExportError, Summary},
        // Market input
        market::{CsvFileProvider, Interval, Lookback, MarketDataProvider, SymbolInfo},
        // Parallel
        forecast_parallel,
        // Engine
        EngineBuilder,
        ForecastEngine,
        // Errors
        ForecastError,
        // Parallel results
        ForecastFailure,
        InstrumentForecast,
        // Core traits
        Ohlc,
        OhlcBar,
        OhlcExt,
        Period,
        Result,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while computing a forecast
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Insufficient data: need {need} bars, got {got}")]
    InsufficientData { need: usize, got: usize },

    #[error("Invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: &'static str },

    #[error("Timestamp at index {index} ({current}) does not follow {previous}")]
    NonMonotonicTimestamp {
        index: usize,
        previous: i64,
        current: i64,
    },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Window length (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(ForecastError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for Period {
    /// The conventional 14-bar ATR window
    fn default() -> Self {
        Self(14)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLC TRAITS
// ============================================================

/// Core OHLC data trait
pub trait Ohlc {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    /// Bar open time in milliseconds since the Unix epoch
    fn timestamp(&self) -> Option<i64> {
        None
    }
}

impl<T: Ohlc + ?Sized> Ohlc for &T {
    fn open(&self) -> f64 {
        (**self).open()
    }

    fn high(&self) -> f64 {
        (**self).high()
    }

    fn low(&self) -> f64 {
        (**self).low()
    }

    fn close(&self) -> f64 {
        (**self).close()
    }

    fn timestamp(&self) -> Option<i64> {
        (**self).timestamp()
    }
}

/// Extension trait with computed properties for OHLC data
pub trait OhlcExt: Ohlc {
    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Validate OHLC data consistency
    fn validate(&self) -> Result<()> {
        let (o, h, l, c) = (self.open(), self.high(), self.low(), self.close());
        if o.is_nan() || h.is_nan() || l.is_nan() || c.is_nan() {
            return Err(ForecastError::InvalidBar {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if o.is_infinite() || h.is_infinite() || l.is_infinite() || c.is_infinite() {
            return Err(ForecastError::InvalidBar {
                index: 0,
                reason: "Infinite value in OHLC",
            });
        }
        if h < l {
            return Err(ForecastError::InvalidBar {
                index: 0,
                reason: "high < low",
            });
        }
        if h < o.max(c) {
            return Err(ForecastError::InvalidBar {
                index: 0,
                reason: "high below open/close",
            });
        }
        if l > o.min(c) {
            return Err(ForecastError::InvalidBar {
                index: 0,
                reason: "low above open/close",
            });
        }
        Ok(())
    }
}

impl<T: Ohlc + ?Sized> OhlcExt for T {}

/// Plain OHLC bar with a millisecond timestamp
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OhlcBar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcBar {
    pub const fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }
}

impl Ohlc for OhlcBar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.timestamp)
    }
}

/// Check every bar and the ordering of timestamps, reporting the first offender
pub fn validate_bars<T: Ohlc>(bars: &[T]) -> Result<()> {
    let mut previous: Option<i64> = None;
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            ForecastError::InvalidBar { reason, .. } => ForecastError::InvalidBar { index: i, reason },
            other => other,
        })?;

        if let Some(current) = bar.timestamp() {
            if let Some(prev) = previous {
                if current <= prev {
                    return Err(ForecastError::NonMonotonicTimestamp {
                        index: i,
                        previous: prev,
                        current,
                    });
                }
            }
            previous = Some(current);
        }
    }
    Ok(())
}

// ============================================================
// FORECAST ENGINE
// ============================================================

use analytics::{classify_all, ConfidenceMetric, ForecastResult, LabelCounts, VolatilityEstimator};
use config::ForecastConfig;
use export::AnnotatedBar;

/// Stateless forecast engine. Holds only immutable configuration, so a single
/// instance can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    config: ForecastConfig,
}

impl ForecastEngine {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    #[inline]
    pub fn window(&self) -> Period {
        self.config.window
    }

    #[inline]
    pub fn volatility(&self) -> VolatilityEstimator {
        VolatilityEstimator::new(self.config.window)
    }

    /// Produce a forecast for the whole sequence.
    ///
    /// Fails with [`ForecastError::InsufficientData`] on an empty sequence.
    /// With fewer than `window` bars the ATR is reported as unavailable and
    /// the target collapses onto the latest close.
    pub fn forecast<T: Ohlc>(&self, bars: &[T]) -> Result<ForecastResult> {
        let last = bars.last().ok_or(ForecastError::InsufficientData {
            need: 1,
            got: 0,
        })?;
        if self.config.validate_data {
            validate_bars(bars)?;
        }

        let counts = LabelCounts::from_bars(bars);
        let atr = self.volatility().latest(bars);
        if atr.is_none() {
            log::debug!(
                "ATR unavailable: {} bars for a window of {}",
                bars.len(),
                self.config.window
            );
        }

        let result = ForecastResult::from_parts(
            counts,
            last.close(),
            atr,
            self.config.window,
            self.config.confidence_metric,
        );
        log::debug!(
            "forecast: {} over {} bars, target {:.7} ({:.2}% {})",
            result.dominant_label,
            result.bar_count,
            result.target_price,
            result.confidence_pct,
            result.confidence_metric
        );
        Ok(result)
    }

    /// Per-bar derived columns (label, true range, ATR) for tables and export
    pub fn annotate<T: Ohlc>(&self, bars: &[T]) -> Result<Vec<AnnotatedBar>> {
        if self.config.validate_data {
            validate_bars(bars)?;
        }

        let volatility = self.volatility();
        let labels = classify_all(bars);
        let ranges = volatility.true_ranges(bars);
        let atrs = volatility.series(bars);
        log::trace!("annotated {} bars", bars.len());

        Ok(bars
            .iter()
            .zip(labels)
            .zip(ranges)
            .zip(atrs)
            .map(|(((bar, label), true_range), atr)| AnnotatedBar {
                timestamp: bar.timestamp(),
                open: bar.open(),
                high: bar.high(),
                low: bar.low(),
                close: bar.close(),
                label,
                true_range,
                atr,
            })
            .collect())
    }
}

/// Forecast with default settings and the given window
pub fn forecast<T: Ohlc>(bars: &[T], window: Period) -> Result<ForecastResult> {
    EngineBuilder::new().window_period(window).build()?.forecast(bars)
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating ForecastEngine instances
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    window: Option<usize>,
    config: ForecastConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: ForecastConfig) -> Self {
        Self {
            window: None,
            config,
        }
    }

    /// Set the ATR window; zero is rejected by [`build`](Self::build)
    pub fn window(mut self, window: usize) -> Self {
        self.window = Some(window);
        self
    }

    pub fn window_period(mut self, window: Period) -> Self {
        self.window = None;
        self.config.window = window;
        self
    }

    pub fn confidence_metric(mut self, metric: ConfidenceMetric) -> Self {
        self.config.confidence_metric = metric;
        self
    }

    /// Enable/disable bar validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Build the engine
    pub fn build(mut self) -> Result<ForecastEngine> {
        if let Some(window) = self.window {
            self.config.window = Period::new(window)?;
        }
        Ok(ForecastEngine::new(self.config))
    }
}

// ============================================================
// PARALLEL FORECASTING
// ============================================================

use rayon::prelude::*;

/// Forecast for a single instrument
#[derive(Debug, Clone)]
pub struct InstrumentForecast {
    pub symbol: String,
    pub result: ForecastResult,
}

/// Error from forecasting a single instrument
#[derive(Debug, Clone)]
pub struct ForecastFailure {
    pub symbol: String,
    pub error: ForecastError,
}

/// Independent forecasts for several instruments, computed in parallel.
/// Each instrument is handled in isolation.
pub fn forecast_parallel<'a, T, I>(
    engine: &ForecastEngine,
    instruments: I,
) -> (Vec<InstrumentForecast>, Vec<ForecastFailure>)
where
    T: Ohlc + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .forecast(bars)
                .map(|result| InstrumentForecast {
                    symbol: symbol.to_string(),
                    result,
                })
                .map_err(|error| ForecastFailure {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
