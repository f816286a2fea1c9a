//! Integration tests for the forecast engine.
//!
//! These exercise the public API with a caller-defined bar type.

use ohlc_forecast::prelude::*;

/// Simple test bar structure without timestamps
#[derive(Debug, Clone, Copy)]
struct TestBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

impl TestBar {
    fn new(o: f64, h: f64, l: f64, c: f64) -> Self {
        Self { o, h, l, c }
    }
}

impl Ohlc for TestBar {
    fn open(&self) -> f64 {
        self.o
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }
}

/// Bars with a True Range of exactly 2.5 and closes hovering around 100
fn flat_volatility_bars(bullish: usize, bearish: usize) -> Vec<TestBar> {
    let mut bars = Vec::with_capacity(bullish + bearish);
    for i in 0..bullish + bearish {
        let bar = if i < bearish {
            TestBar::new(100.5, 101.25, 98.75, 99.5)
        } else {
            TestBar::new(99.5, 101.25, 98.75, 100.5)
        };
        bars.push(bar);
    }
    bars
}

// ============================================================
// SCENARIOS
// ============================================================

#[test]
fn test_short_bullish_sequence_has_no_atr() {
    let bars = vec![
        TestBar::new(100.0, 101.5, 99.5, 101.0),
        TestBar::new(101.0, 102.5, 100.5, 102.0),
        TestBar::new(102.0, 103.5, 101.5, 103.0),
    ];

    let result = ForecastEngine::default().forecast(&bars).unwrap();

    assert!(!result.atr_available);
    assert_eq!(result.atr, 0.0);
    assert_eq!(result.dominant_label, CandleLabel::Bullish);
    assert_eq!(result.latest_close, 103.0);
    assert_eq!(result.target_price, result.latest_close);
    assert_eq!(result.confidence_pct, 100.0);
}

#[test]
fn test_majority_bullish_with_known_atr() {
    let mut bars = flat_volatility_bars(12, 8);
    // last bar closes exactly at 100
    *bars.last_mut().unwrap() = TestBar::new(99.5, 101.25, 98.75, 100.0);
    assert_eq!(bars.len(), 20);

    let result = ForecastEngine::default().forecast(&bars).unwrap();

    assert_eq!(result.dominant_label, CandleLabel::Bullish);
    assert!(result.atr_available);
    assert_eq!(result.atr, 2.5);
    assert_eq!(result.latest_close, 100.0);
    assert_eq!(result.target_price, 102.5);
    assert!((result.confidence_pct - 60.0).abs() < 1e-9);
    assert_eq!(result.counts.bullish, 12);
    assert_eq!(result.counts.bearish, 8);
}

#[test]
fn test_empty_sequence_is_rejected() {
    let bars: Vec<TestBar> = vec![];
    let err = ForecastEngine::default().forecast(&bars).unwrap_err();
    assert_eq!(err, ForecastError::InsufficientData { need: 1, got: 0 });
}

#[test]
fn test_single_doji_takes_downside_branch() {
    let bars = vec![TestBar::new(100.0, 101.0, 99.0, 100.0)];

    assert_eq!(classify(&bars[0]), CandleLabel::Doji);

    let result = ForecastEngine::default().forecast(&bars).unwrap();
    assert_eq!(result.dominant_label, CandleLabel::Doji);
    assert!(!result.atr_available);
    assert_eq!(result.target_price, 100.0 - 0.0);
    assert_eq!(result.confidence_pct, 100.0);
}

// ============================================================
// POLICIES
// ============================================================

#[test]
fn test_doji_majority_projects_downward() {
    let mut bars: Vec<TestBar> = (0..10)
        .map(|_| TestBar::new(100.0, 101.0, 99.0, 100.0))
        .collect();
    bars.push(TestBar::new(100.0, 101.0, 99.0, 100.5));

    let engine = EngineBuilder::new().window(5).build().unwrap();
    let result = engine.forecast(&bars).unwrap();

    assert_eq!(result.dominant_label, CandleLabel::Doji);
    assert!(result.atr_available);
    assert_eq!(result.target_price, result.latest_close - result.atr);
}

#[test]
fn test_tie_prefers_bullish() {
    let bars = flat_volatility_bars(5, 5);
    let result = ForecastEngine::default().forecast(&bars).unwrap();
    assert_eq!(result.dominant_label, CandleLabel::Bullish);
    assert_eq!(result.confidence_pct, 50.0);
}

#[test]
fn test_margin_metric() {
    let bars = flat_volatility_bars(12, 8);
    let engine = EngineBuilder::new()
        .confidence_metric(ConfidenceMetric::BullBearMargin)
        .build()
        .unwrap();
    let result = engine.forecast(&bars).unwrap();

    assert_eq!(result.confidence_metric, ConfidenceMetric::BullBearMargin);
    assert!((result.confidence_pct - 20.0).abs() < 1e-6);
    // label and target do not depend on the metric
    let share = ForecastEngine::default().forecast(&bars).unwrap();
    assert_eq!(share.dominant_label, result.dominant_label);
    assert_eq!(share.target_price, result.target_price);
}

#[test]
fn test_window_boundary() {
    let engine = EngineBuilder::new().window(14).build().unwrap();

    let bars = flat_volatility_bars(13, 0);
    assert!(!engine.forecast(&bars).unwrap().atr_available);

    let bars = flat_volatility_bars(14, 0);
    assert!(engine.forecast(&bars).unwrap().atr_available);
}

#[test]
fn test_gap_raises_atr() {
    let mut bars = flat_volatility_bars(14, 0);
    // gap up from 100.5 to a bar trading 110..112
    bars.push(TestBar::new(110.0, 112.0, 110.0, 111.0));

    let engine = EngineBuilder::new().window(14).build().unwrap();
    let result = engine.forecast(&bars).unwrap();
    let expected = (13.0 * 2.5 + 11.5) / 14.0;
    assert!((result.atr - expected).abs() < 1e-12);
}

#[test]
fn test_forecast_is_idempotent() {
    let bars = flat_volatility_bars(9, 11);
    let engine = ForecastEngine::default();
    assert_eq!(engine.forecast(&bars).unwrap(), engine.forecast(&bars).unwrap());
}

#[test]
fn test_untimed_bars_skip_timestamp_checks() {
    let bars = flat_volatility_bars(3, 3);
    assert!(ForecastEngine::default().forecast(&bars).is_ok());
}

#[test]
fn test_invalid_bar_index_reported() {
    let mut bars = flat_volatility_bars(5, 0);
    bars[2] = TestBar::new(100.0, 99.0, 101.0, 100.0);
    let err = ForecastEngine::default().forecast(&bars).unwrap_err();
    assert!(matches!(err, ForecastError::InvalidBar { index: 2, .. }));
}

// ============================================================
// RESULT SHAPE
// ============================================================

#[test]
fn test_result_serializes() {
    let bars = flat_volatility_bars(12, 8);
    let result = ForecastEngine::default().forecast(&bars).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["dominant_label"], "Bullish");
    assert_eq!(json["atr_available"], true);
    assert_eq!(json["window"], 14);
    assert_eq!(json["confidence_metric"], "dominant_share");

    let back: ForecastResult = serde_json::from_value(json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_annotate_then_export() {
    let bars = flat_volatility_bars(10, 10);
    let engine = ForecastEngine::default();
    let rows = engine.annotate(&bars).unwrap();

    let mut buf = Vec::new();
    write_csv(&rows, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    // header + one line per bar
    assert_eq!(text.lines().count(), 21);
    // no timestamps on TestBar, ATR empty for the first 13 rows
    assert!(text.lines().nth(1).unwrap().starts_with(",100.5,"));
    assert!(text.lines().nth(13).unwrap().ends_with(','));
    assert!(text.lines().nth(14).unwrap().ends_with(",2.5"));
}

#[test]
fn test_summary_for_engine_output() {
    let bars = flat_volatility_bars(12, 8);
    let result = ForecastEngine::default().forecast(&bars).unwrap();
    let text = Summary::new("ETHUSDT", &result).to_string();
    assert!(text.starts_with("Forecast Summary: ETHUSDT"));
    assert!(text.contains("ATR Volatility:        $2.5000000"));
}
