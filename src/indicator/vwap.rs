use crate::indicator::{IndicatorSeries, none_series};
use crate::model::Candle;

/// 거래량 가중 평균 가격(VWAP) 시계열 계산
///
/// 시계열 시작부터의 누적 `대표가격 * 거래량`을 누적 거래량으로 나눈 값입니다.
/// 누적 거래량이 0인 구간(거래가 전혀 없는 초반부)은 None입니다.
///
/// # Arguments
/// * `candles` - 시간 오름차순 캔들 배열
///
/// # Returns
/// * `IndicatorSeries` - 입력과 같은 길이의 VWAP 시계열
pub fn calculate_vwap<C: Candle>(candles: &[C]) -> IndicatorSeries {
    let mut series = none_series(candles.len());

    let mut cumulative_pv = 0.0;
    let mut cumulative_volume = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        cumulative_pv += candle.typical_price() * candle.volume();
        cumulative_volume += candle.volume();

        if cumulative_volume > f64::EPSILON {
            series[i] = Some(cumulative_pv / cumulative_volume);
        }
    }

    series
}
