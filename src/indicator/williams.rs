use crate::indicator::{IndicatorSeries, none_series};
use crate::model::Candle;

/// 윌리엄스 %R 시계열 계산
///
/// 기간 내 최고가 대비 종가의 위치를 -100(최저) ~ 0(최고) 범위로 나타냅니다.
/// `%R = (최고가 - 종가) / (최고가 - 최저가) * -100`
/// 기간 내 고저 범위가 0이면 중립값 -50을 사용합니다.
///
/// # Arguments
/// * `candles` - 시간 오름차순 캔들 배열
/// * `period` - 계산 기간 (일반적으로 14)
///
/// # Returns
/// * `IndicatorSeries` - 입력과 같은 길이의 %R 시계열 (첫 `period - 1`개 구간은 None)
pub fn calculate_williams_r<C: Candle>(candles: &[C], period: usize) -> IndicatorSeries {
    let len = candles.len();

    if period == 0 || len < period {
        return none_series(len);
    }

    let mut series = none_series(len);

    for i in period - 1..len {
        let window = &candles[i + 1 - period..=i];
        let highest = window
            .iter()
            .map(|c| c.high_price())
            .fold(f64::MIN, f64::max);
        let lowest = window
            .iter()
            .map(|c| c.low_price())
            .fold(f64::MAX, f64::min);

        let range = highest - lowest;
        series[i] = if range.abs() < f64::EPSILON {
            // 고저 범위가 없는 구간은 중립값
            Some(-50.0)
        } else {
            Some((highest - candles[i].close_price()) / range * -100.0)
        };
    }

    series
}

/// 가장 최근 시점의 윌리엄스 %R 값 계산
///
/// # Arguments
/// * `candles` - 시간 오름차순 캔들 배열
/// * `period` - 계산 기간
///
/// # Returns
/// * `Option<f64>` - 최신 %R 값 (데이터 부족 시 None)
pub fn latest_williams_r<C: Candle>(candles: &[C], period: usize) -> Option<f64> {
    calculate_williams_r(candles, period)
        .last()
        .copied()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::TestCandle;

    #[test]
    fn test_williams_warmup_nulls() {
        let candles = TestCandle::linear_series(20, 100.0, 1.0);
        let wr = calculate_williams_r(&candles, 14);

        assert_eq!(wr.len(), 20);
        for i in 0..13 {
            assert_eq!(wr[i], None);
        }
        for i in 13..20 {
            assert!(wr[i].is_some());
        }
    }

    #[test]
    fn test_williams_range() {
        let candles = TestCandle::sine_series(60, 100.0, 10.0);
        let wr = calculate_williams_r(&candles, 14);

        for value in wr.iter().flatten() {
            assert!(*value <= 0.0 && *value >= -100.0);
        }
    }

    #[test]
    fn test_williams_flat_market_is_minus_50() {
        // 고가 == 저가 == 종가인 평탄한 시장에서는 -50
        let candles = TestCandle::flat_series(25, 100.0);
        let wr = calculate_williams_r(&candles, 14);

        for value in wr.iter().flatten() {
            assert!((value + 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_williams_near_zero_in_uptrend() {
        // 상승 추세에서는 종가가 기간 최고가 근처이므로 %R이 0에 가까움
        let candles = TestCandle::linear_series(30, 100.0, 1.0);
        let last = latest_williams_r(&candles, 14).unwrap();
        assert!(last > -30.0);
    }

    #[test]
    fn test_williams_insufficient_data() {
        let candles = TestCandle::linear_series(10, 100.0, 1.0);
        let wr = calculate_williams_r(&candles, 14);
        assert!(wr.iter().all(|v| v.is_none()));
    }
}
