use crate::indicator::utils::stats;
use crate::indicator::{IndicatorSeries, none_series};
use crate::model::Candle;

/// 상품 채널 지수(CCI) 시계열 계산
///
/// 대표 가격이 자신의 이동평균에서 얼마나 벗어났는지를
/// 평균 절대 편차로 정규화한 지표입니다.
/// `cci = (대표가격 - SMA(대표가격)) / (0.015 * 평균절대편차)`
/// 평균 절대 편차가 0인 구간(완전히 평탄한 가격)에서는 0을 반환합니다.
///
/// # Arguments
/// * `candles` - 시간 오름차순 캔들 배열
/// * `period` - 계산 기간 (일반적으로 20)
///
/// # Returns
/// * `IndicatorSeries` - 입력과 같은 길이의 CCI 시계열 (첫 `period - 1`개 구간은 None)
pub fn calculate_cci<C: Candle>(candles: &[C], period: usize) -> IndicatorSeries {
    let len = candles.len();

    if period == 0 || len < period {
        return none_series(len);
    }

    let typical_prices: Vec<f64> = candles.iter().map(|c| c.typical_price()).collect();
    let mut series = none_series(len);

    for i in period - 1..len {
        let window = &typical_prices[i + 1 - period..=i];
        let mean = stats::calculate_mean(window);
        let mean_deviation = stats::calculate_mean_abs_deviation(window);

        series[i] = if mean_deviation.abs() < f64::EPSILON {
            // 편차가 없는 평탄한 구간은 중립값 0
            Some(0.0)
        } else {
            Some((typical_prices[i] - mean) / (0.015 * mean_deviation))
        };
    }

    series
}

/// 가장 최근 시점의 CCI 값 계산
///
/// # Arguments
/// * `candles` - 시간 오름차순 캔들 배열
/// * `period` - 계산 기간
///
/// # Returns
/// * `Option<f64>` - 최신 CCI 값 (데이터 부족 시 None)
pub fn latest_cci<C: Candle>(candles: &[C], period: usize) -> Option<f64> {
    calculate_cci(candles, period).last().copied().flatten()
}
