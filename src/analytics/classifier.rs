//! Candle classification
//!
//! A bar is Bullish when it closes above its open, Bearish when it closes
//! below, and Doji otherwise. Labels are derived on demand and never stored
//! on the bar.

use std::fmt;

use crate::Ohlc;

/// Directional label of a single bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CandleLabel {
    Bullish,
    Bearish,
    Doji,
}

impl CandleLabel {
    /// Tie-break order for majority voting: earlier wins on equal counts.
    pub const PRIORITY: [CandleLabel; 3] =
        [CandleLabel::Bullish, CandleLabel::Bearish, CandleLabel::Doji];

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            CandleLabel::Bullish => "Bullish",
            CandleLabel::Bearish => "Bearish",
            CandleLabel::Doji => "Doji",
        }
    }

    /// Sign applied to the ATR offset when projecting a target.
    ///
    /// Only Bullish projects upward; Bearish and Doji both project downward.
    #[inline]
    pub fn target_sign(self) -> f64 {
        match self {
            CandleLabel::Bullish => 1.0,
            CandleLabel::Bearish | CandleLabel::Doji => -1.0,
        }
    }
}

impl fmt::Display for CandleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label a single bar. Total: bars with NaN prices fall through to Doji.
#[inline]
pub fn classify<T: Ohlc + ?Sized>(bar: &T) -> CandleLabel {
    let (open, close) = (bar.open(), bar.close());
    if close > open {
        CandleLabel::Bullish
    } else if close < open {
        CandleLabel::Bearish
    } else {
        CandleLabel::Doji
    }
}

/// Label every bar in order
pub fn classify_all<T: Ohlc>(bars: &[T]) -> Vec<CandleLabel> {
    bars.iter().map(classify).collect()
}

/// Per-label counts over a sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LabelCounts {
    pub bullish: usize,
    pub bearish: usize,
    pub doji: usize,
}

impl LabelCounts {
    pub fn from_bars<T: Ohlc>(bars: &[T]) -> Self {
        bars.iter().map(classify).collect()
    }

    #[inline]
    pub fn record(&mut self, label: CandleLabel) {
        match label {
            CandleLabel::Bullish => self.bullish += 1,
            CandleLabel::Bearish => self.bearish += 1,
            CandleLabel::Doji => self.doji += 1,
        }
    }

    #[inline]
    pub fn get(&self, label: CandleLabel) -> usize {
        match label {
            CandleLabel::Bullish => self.bullish,
            CandleLabel::Bearish => self.bearish,
            CandleLabel::Doji => self.doji,
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.bullish + self.bearish + self.doji
    }

    /// Most frequent label, ties resolved by [`CandleLabel::PRIORITY`].
    /// `None` when nothing has been counted.
    pub fn dominant(&self) -> Option<CandleLabel> {
        if self.total() == 0 {
            return None;
        }
        // max_by_key keeps the last maximum, so walk the priority list backwards
        CandleLabel::PRIORITY
            .iter()
            .rev()
            .copied()
            .max_by_key(|&label| self.get(label))
    }
}

impl FromIterator<CandleLabel> for LabelCounts {
    fn from_iter<I: IntoIterator<Item = CandleLabel>>(iter: I) -> Self {
        let mut counts = Self::default();
        for label in iter {
            counts.record(label);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OhlcBar;

    fn bar(o: f64, c: f64) -> OhlcBar {
        OhlcBar::new(0, o, o.max(c) + 1.0, o.min(c) - 1.0, c)
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&bar(100.0, 101.0)), CandleLabel::Bullish);
        assert_eq!(classify(&bar(100.0, 99.0)), CandleLabel::Bearish);
        assert_eq!(classify(&bar(100.0, 100.0)), CandleLabel::Doji);
    }

    #[test]
    fn test_classify_nan_is_doji() {
        let b = OhlcBar::new(0, f64::NAN, 1.0, 0.0, 0.5);
        assert_eq!(classify(&b), CandleLabel::Doji);
    }

    #[test]
    fn test_counts() {
        let bars = vec![bar(1.0, 2.0), bar(2.0, 1.0), bar(1.0, 1.0), bar(1.0, 3.0)];
        let counts = LabelCounts::from_bars(&bars);
        assert_eq!(counts.bullish, 2);
        assert_eq!(counts.bearish, 1);
        assert_eq!(counts.doji, 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.dominant(), Some(CandleLabel::Bullish));
    }

    #[test]
    fn test_dominant_empty() {
        assert_eq!(LabelCounts::default().dominant(), None);
    }

    #[test]
    fn test_tie_break_order() {
        let all_tied = LabelCounts {
            bullish: 2,
            bearish: 2,
            doji: 2,
        };
        assert_eq!(all_tied.dominant(), Some(CandleLabel::Bullish));

        let bear_doji = LabelCounts {
            bullish: 1,
            bearish: 3,
            doji: 3,
        };
        assert_eq!(bear_doji.dominant(), Some(CandleLabel::Bearish));

        let bull_doji = LabelCounts {
            bullish: 3,
            bearish: 0,
            doji: 3,
        };
        assert_eq!(bull_doji.dominant(), Some(CandleLabel::Bullish));

        let doji_only = LabelCounts {
            bullish: 0,
            bearish: 0,
            doji: 1,
        };
        assert_eq!(doji_only.dominant(), Some(CandleLabel::Doji));
    }

    #[test]
    fn test_target_sign() {
        assert_eq!(CandleLabel::Bullish.target_sign(), 1.0);
        assert_eq!(CandleLabel::Bearish.target_sign(), -1.0);
        assert_eq!(CandleLabel::Doji.target_sign(), -1.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(CandleLabel::Doji.to_string(), "Doji");
    }
}
