//! True Range and Average True Range
//!
//! ```text
//! TR[i] = max(high[i] - low[i], |high[i] - close[i-1]|, |low[i] - close[i-1]|)
//! TR[0] = high[0] - low[0]
//! ATR[i] = mean(TR[i-window+1 ..= i])
//! ```
//!
//! ATR is a simple moving average. It is `None` until `window` True Range
//! values are available, i.e. for every index below `window - 1`.

use crate::{Ohlc, OhlcExt, Period};

/// True Range of `bar`. Without a previous bar only the intrabar range counts.
#[inline]
pub fn true_range<T: Ohlc + ?Sized>(bar: &T, previous: Option<&T>) -> f64 {
    let range = bar.range();
    match previous {
        Some(prev) => {
            let prev_close = prev.close();
            range
                .max((bar.high() - prev_close).abs())
                .max((bar.low() - prev_close).abs())
        }
        None => range,
    }
}

/// True Range for every bar, aligned to `bars`
pub fn true_ranges<T: Ohlc>(bars: &[T]) -> Vec<f64> {
    let mut out = Vec::with_capacity(bars.len());
    let mut previous: Option<&T> = None;
    for bar in bars {
        out.push(true_range(bar, previous));
        previous = Some(bar);
    }
    out
}

/// ATR for every bar, aligned to `bars`; `None` where the window is incomplete
pub fn average_true_range<T: Ohlc>(bars: &[T], window: Period) -> Vec<Option<f64>> {
    let window = window.get();
    let ranges = true_ranges(bars);

    let mut out = vec![None; bars.len()];
    for (offset, slice) in ranges.windows(window).enumerate() {
        out[offset + window - 1] = Some(mean(slice));
    }
    out
}

/// ATR at a single index. Only looks at the bars the window needs.
pub fn atr_at<T: Ohlc>(bars: &[T], index: usize, window: Period) -> Option<f64> {
    let window = window.get();
    if index >= bars.len() || index + 1 < window {
        return None;
    }

    let start = index + 1 - window;
    let ranges: Vec<f64> = (start..=index)
        .map(|i| true_range(&bars[i], i.checked_sub(1).map(|p| &bars[p])))
        .collect();
    Some(mean(&ranges))
}

#[inline]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Window-bound volatility estimator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VolatilityEstimator {
    window: Period,
}

impl VolatilityEstimator {
    pub fn new(window: Period) -> Self {
        Self { window }
    }

    #[inline]
    pub fn window(&self) -> Period {
        self.window
    }

    pub fn true_ranges<T: Ohlc>(&self, bars: &[T]) -> Vec<f64> {
        true_ranges(bars)
    }

    pub fn series<T: Ohlc>(&self, bars: &[T]) -> Vec<Option<f64>> {
        average_true_range(bars, self.window)
    }

    /// ATR at the last bar
    pub fn latest<T: Ohlc>(&self, bars: &[T]) -> Option<f64> {
        bars.len().checked_sub(1).and_then(|last| atr_at(bars, last, self.window))
    }
}
