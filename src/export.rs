//! Presentation and export helpers
//!
//! Everything here consumes engine output; nothing feeds back into it.

use std::{fmt, io};

use crate::analytics::{CandleLabel, ForecastResult, TargetSide};

/// Errors writing exported data
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One bar with its derived columns
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct AnnotatedBar {
    pub timestamp: Option<i64>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(rename = "candle")]
    pub label: CandleLabel,
    pub true_range: f64,
    /// Empty in CSV output while the ATR window is incomplete
    pub atr: Option<f64>,
}

/// Conventional export file name for a symbol
pub fn export_file_name(symbol: &str) -> String {
    format!("{symbol}_ohlc.csv")
}

/// Write rows as CSV with a header line
pub fn write_csv<W: io::Write>(rows: &[AnnotatedBar], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render the last `n` rows as a fixed-width text table
pub fn render_tail(rows: &[AnnotatedBar], n: usize) -> String {
    use std::fmt::Write;

    let start = rows.len().saturating_sub(n);
    let mut out = format!(
        "{:>14} {:>16} {:>16} {:>16} {:>16} {:>8} {:>14}\n",
        "timestamp", "open", "high", "low", "close", "candle", "atr"
    );
    for row in &rows[start..] {
        let ts = row.timestamp.map_or_else(|| "-".to_string(), |t| t.to_string());
        let atr = row.atr.map_or_else(|| "-".to_string(), |a| format!("{a:.7}"));
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "{:>14} {:>16.7} {:>16.7} {:>16.7} {:>16.7} {:>8} {:>14}",
            ts,
            row.open,
            row.high,
            row.low,
            row.close,
            row.label.as_str(),
            atr
        );
    }
    out
}

/// `1234567.5` -> `1,234,567.5000000`. Non-finite values print as-is.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{value:.7}");
    let (sign, digits) = match fixed.strip_prefix('-') {
        // -0.0000000 after rounding carries no sign
        Some(rest) if rest.bytes().any(|b| matches!(b, b'1'..=b'9')) => ("-", rest),
        Some(rest) => ("", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{frac_part}")
}

/// Human-readable forecast panel
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a> {
    pub symbol: &'a str,
    pub result: &'a ForecastResult,
}

impl<'a> Summary<'a> {
    pub fn new(symbol: &'a str, result: &'a ForecastResult) -> Self {
        Self { symbol, result }
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.result;
        writeln!(f, "Forecast Summary: {}", self.symbol)?;
        writeln!(f, "  Dominant Candle:       {}", r.dominant_label)?;
        writeln!(f, "  Latest Close:          ${}", format_price(r.latest_close))?;
        let side = match r.target_side() {
            TargetSide::Above => "above close",
            TargetSide::Below => "below close",
            TargetSide::Flat => "at close",
        };
        writeln!(
            f,
            "  Target Price:          ${} ({side})",
            format_price(r.target_price)
        )?;
        if r.atr_available {
            writeln!(f, "  ATR Volatility:        ${}", format_price(r.atr))?;
        } else {
            writeln!(
                f,
                "  ATR Volatility:        unavailable (fewer than {} bars)",
                r.window
            )?;
        }
        write!(
            f,
            "  Prediction Confidence: {:.2}% ({}, {} bars)",
            r.confidence_pct, r.confidence_metric, r.bar_count
        )
    }
}
