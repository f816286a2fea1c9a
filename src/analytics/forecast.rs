//! Majority-vote forecast
//!
//! Combines the label tally, the latest close and the latest ATR into a
//! [`ForecastResult`].

use std::fmt;

use super::classifier::{CandleLabel, LabelCounts};
use crate::Period;

/// Guards the margin metric against division by zero when every bar is a Doji
pub const MARGIN_EPSILON: f64 = 1e-9;

/// How `confidence_pct` is derived from the label tally.
///
/// The two metrics are not numerically comparable; a result records which
/// one produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceMetric {
    /// Share of bars carrying the dominant label, in percent
    #[default]
    DominantShare,
    /// `|bullish - bearish| / (bullish + bearish + ε)`, in percent
    BullBearMargin,
}

impl ConfidenceMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceMetric::DominantShare => "dominant_share",
            ConfidenceMetric::BullBearMargin => "bull_bear_margin",
        }
    }

    /// Score in `[0, 100]`. Zero for an empty tally.
    pub fn score(self, counts: &LabelCounts, dominant: CandleLabel) -> f64 {
        let total = counts.total();
        if total == 0 {
            return 0.0;
        }
        match self {
            ConfidenceMetric::DominantShare => {
                counts.get(dominant) as f64 * 100.0 / total as f64
            }
            ConfidenceMetric::BullBearMargin => {
                let bull = counts.bullish as f64;
                let bear = counts.bearish as f64;
                (bull - bear).abs() / (bull + bear + MARGIN_EPSILON) * 100.0
            }
        }
    }
}

impl fmt::Display for ConfidenceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project a target: `latest_close ± atr`, signed by [`CandleLabel::target_sign`]
#[inline]
pub fn target_price(label: CandleLabel, latest_close: f64, atr: f64) -> f64 {
    if label.target_sign() > 0.0 {
        latest_close + atr
    } else {
        latest_close - atr
    }
}

/// Where the target sits relative to the latest close
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TargetSide {
    Above,
    Below,
    /// Target equals the latest close (ATR unavailable or zero)
    Flat,
}

/// Outcome of a single forecast request
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ForecastResult {
    pub dominant_label: CandleLabel,
    pub latest_close: f64,
    /// ATR at the last bar, `0.0` when unavailable
    pub atr: f64,
    pub atr_available: bool,
    pub target_price: f64,
    pub confidence_pct: f64,
    pub confidence_metric: ConfidenceMetric,
    pub counts: LabelCounts,
    pub bar_count: usize,
    pub window: Period,
}

impl ForecastResult {
    /// Assemble a result from a tally. An empty tally yields a Doji label
    /// with zero confidence; the engine never passes one.
    pub fn from_parts(
        counts: LabelCounts,
        latest_close: f64,
        atr: Option<f64>,
        window: Period,
        metric: ConfidenceMetric,
    ) -> Self {
        let dominant_label = counts.dominant().unwrap_or(CandleLabel::Doji);
        let atr_available = atr.is_some();
        let atr = atr.unwrap_or(0.0);

        Self {
            dominant_label,
            latest_close,
            atr,
            atr_available,
            target_price: target_price(dominant_label, latest_close, atr),
            confidence_pct: metric.score(&counts, dominant_label),
            confidence_metric: metric,
            counts,
            bar_count: counts.total(),
            window,
        }
    }

    pub fn target_side(&self) -> TargetSide {
        if self.target_price > self.latest_close {
            TargetSide::Above
        } else if self.target_price < self.latest_close {
            TargetSide::Below
        } else {
            TargetSide::Flat
        }
    }
}
