use crate::indicator::{IndicatorSeries, none_series};
use crate::model::Candle;

/// 평균 실질 범위(ATR) 시계열 계산
///
/// 와일더 평활 방식을 사용합니다. 첫 ATR 값은 최초 `period`개
/// 실질 범위(TR)의 단순 평균이고, 이후에는
/// `atr = (이전 atr * (period - 1) + tr) / period`로 갱신합니다.
/// TR은 직전 종가가 필요하므로 `period + 1`개 미만의 캔들에서는 전부 None입니다.
///
/// # Arguments
/// * `candles` - 시간 오름차순 캔들 배열
/// * `period` - 계산 기간 (일반적으로 14)
///
/// # Returns
/// * `IndicatorSeries` - 입력과 같은 길이의 ATR 시계열 (첫 `period`개 구간은 None)
pub fn calculate_atr<C: Candle>(candles: &[C], period: usize) -> IndicatorSeries {
    let len = candles.len();

    if period == 0 || len < period + 1 {
        return none_series(len);
    }

    let mut series = none_series(len);

    // 실질 범위: 당일 고저폭과 전일 종가 대비 갭을 모두 포함
    let true_ranges: Vec<f64> = (1..len)
        .map(|i| true_range(&candles[i], candles[i - 1].close_price()))
        .collect();

    let mut atr = true_ranges.iter().take(period).sum::<f64>() / period as f64;
    series[period] = Some(atr);

    for i in period..true_ranges.len() {
        atr = (atr * (period - 1) as f64 + true_ranges[i]) / period as f64;
        series[i + 1] = Some(atr);
    }

    series
}

/// 실질 범위(TR) 계산
///
/// 고가-저가, |고가-전일종가|, |저가-전일종가| 중 가장 큰 값입니다.
fn true_range<C: Candle>(candle: &C, prev_close: f64) -> f64 {
    let high_low = candle.high_price() - candle.low_price();
    let high_close = (candle.high_price() - prev_close).abs();
    let low_close = (candle.low_price() - prev_close).abs();
    high_low.max(high_close).max(low_close)
}

/// 가장 최근 시점의 ATR 값 계산
///
/// # Arguments
/// * `candles` - 시간 오름차순 캔들 배열
/// * `period` - 계산 기간
///
/// # Returns
/// * `Option<f64>` - 최신 ATR 값 (데이터 부족 시 None)
pub fn latest_atr<C: Candle>(candles: &[C], period: usize) -> Option<f64> {
    calculate_atr(candles, period).last().copied().flatten()
}
