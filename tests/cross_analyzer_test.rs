mod common_test_utils;

use common_test_utils::{create_downtrend_bars, create_oscillating_bars, create_uptrend_bars};
use stock_analytics::analyzer::{CrossAnalyzer, CrossParams};
use stock_analytics::model::CrossKind;

#[test]
fn test_golden_cross_on_rebound() {
    // 하락 후 상승 반전 구간에서 골든 크로스가 탐지됨
    let mut bars = create_downtrend_bars(20, 150.0, 2.0);
    let mut rebound = create_uptrend_bars(20, 114.0, 3.0);
    for (i, bar) in rebound.iter_mut().enumerate() {
        bar.datetime = common_test_utils::bar_time(20 + i);
    }
    bars.append(&mut rebound);

    let signals = CrossAnalyzer::default().detect(&bars);
    assert!(signals.iter().any(|s| s.kind == CrossKind::Golden));
}

#[test]
fn test_death_cross_after_peak() {
    let mut bars = create_uptrend_bars(20, 100.0, 3.0);
    let mut fall = create_downtrend_bars(20, 155.0, 2.0);
    for (i, bar) in fall.iter_mut().enumerate() {
        bar.datetime = common_test_utils::bar_time(20 + i);
    }
    bars.append(&mut fall);

    let signals = CrossAnalyzer::default().detect(&bars);
    assert!(signals.iter().any(|s| s.kind == CrossKind::Death));
}

#[test]
fn test_monotonic_series_no_cross() {
    let rising = create_uptrend_bars(40, 100.0, 1.0);
    let signals = CrossAnalyzer::default().detect(&rising);
    assert!(signals.iter().all(|s| s.kind != CrossKind::Death));

    let falling = create_downtrend_bars(40, 200.0, 1.0);
    let signals = CrossAnalyzer::default().detect(&falling);
    assert!(signals.iter().all(|s| s.kind != CrossKind::Golden));
}

#[test]
fn test_signals_ordered_and_alternating() {
    let bars = create_oscillating_bars(120, 100.0, 10.0);
    let signals = CrossAnalyzer::default().detect(&bars);

    assert!(!signals.is_empty());
    for pair in signals.windows(2) {
        assert!(pair[0].datetime < pair[1].datetime);
        assert_ne!(pair[0].kind, pair[1].kind);
    }
}

#[test]
fn test_custom_periods() {
    let bars = create_oscillating_bars(120, 100.0, 10.0);

    let short = CrossAnalyzer::new(CrossParams::new(3, 7)).detect(&bars);
    let long = CrossAnalyzer::new(CrossParams::new(10, 30)).detect(&bars);

    // 짧은 기간일수록 교차가 더 자주 발생
    assert!(short.len() >= long.len());
}
