//! Forecast analytics
//!
//! The three pure building blocks behind [`ForecastEngine`](crate::ForecastEngine):
//!
//! - **Classifier**: per-bar Bullish / Bearish / Doji labels and their tally.
//! - **Volatility**: True Range and its simple moving average (ATR).
//! - **Forecast**: dominant label, ATR-offset target and confidence score.

pub mod classifier;
pub mod forecast;
pub mod volatility;

// Re-export everything for convenience
pub use classifier::*;
pub use forecast::*;
pub use volatility::*;
