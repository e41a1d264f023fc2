use crate::indicator::{IndicatorSeries, none_series};
use crate::model::Candle;
use serde::Serialize;
use std::fmt::Display;

/// ADX/DMI 시계열
///
/// +DI와 -DI는 기간 내 방향성 움직임을 실질 범위 합으로 정규화한 값이고,
/// ADX는 DX의 기간 평균으로 추세의 강도를 나타냅니다.
#[derive(Debug, Clone, Serialize)]
pub struct AdxSeries {
    /// 계산 기간
    pub period: usize,
    /// 추세 강도 (ADX)
    pub adx: IndicatorSeries,
    /// 상승 방향 지표 (+DI)
    pub plus_di: IndicatorSeries,
    /// 하락 방향 지표 (-DI)
    pub minus_di: IndicatorSeries,
}

impl Display for AdxSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (
            self.adx.last().copied().flatten(),
            self.plus_di.last().copied().flatten(),
            self.minus_di.last().copied().flatten(),
        ) {
            (Some(adx), Some(plus), Some(minus)) => {
                write!(
                    f,
                    "ADX({}: {:.2}, +DI {:.2}, -DI {:.2})",
                    self.period, adx, plus, minus
                )
            }
            _ => write!(f, "ADX({}: 데이터 부족)", self.period),
        }
    }
}

impl AdxSeries {
    /// 시계열 길이 반환
    pub fn len(&self) -> usize {
        self.adx.len()
    }

    /// 시계열이 비어 있는지 확인
    pub fn is_empty(&self) -> bool {
        self.adx.is_empty()
    }

    /// 최신 시점에서 상승 방향이 우세한지 확인
    pub fn is_bullish_direction(&self) -> bool {
        match (
            self.plus_di.last().copied().flatten(),
            self.minus_di.last().copied().flatten(),
        ) {
            (Some(plus), Some(minus)) => plus > minus,
            _ => false,
        }
    }
}

/// ADX/DMI 시계열 계산
///
/// 방향성 움직임(+DM/-DM)과 실질 범위(TR)를 기간 단위로 합산하여
/// `+DI = 100 * sum(+DM) / sum(TR)`, `-DI = 100 * sum(-DM) / sum(TR)`를 구하고,
/// `DX = |+DI - -DI| / (+DI + -DI) * 100`의 최근 `period`개 평균이 ADX입니다.
/// DI 합이 0인 시점의 DX는 정의되지 않으며, 윈도우 내 정의된 DX가 없으면
/// ADX도 None입니다.
///
/// # Arguments
/// * `candles` - 시간 오름차순 캔들 배열
/// * `period` - 계산 기간 (일반적으로 14)
///
/// # Returns
/// * `AdxSeries` - 계산된 ADX/DMI 시계열
pub fn calculate_adx<C: Candle>(candles: &[C], period: usize) -> AdxSeries {
    let len = candles.len();

    let mut adx = none_series(len);
    let mut plus_di_series = none_series(len);
    let mut minus_di_series = none_series(len);

    if period == 0 || len < period + 1 {
        return AdxSeries {
            period,
            adx,
            plus_di: plus_di_series,
            minus_di: minus_di_series,
        };
    }

    // 인덱스 1부터의 방향성 움직임과 실질 범위
    let mut plus_dm = Vec::with_capacity(len - 1);
    let mut minus_dm = Vec::with_capacity(len - 1);
    let mut true_ranges = Vec::with_capacity(len - 1);

    for i in 1..len {
        let up_move = candles[i].high_price() - candles[i - 1].high_price();
        let down_move = candles[i - 1].low_price() - candles[i].low_price();

        plus_dm.push(if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        });
        minus_dm.push(if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        });

        let high_low = candles[i].high_price() - candles[i].low_price();
        let high_close = (candles[i].high_price() - candles[i - 1].close_price()).abs();
        let low_close = (candles[i].low_price() - candles[i - 1].close_price()).abs();
        true_ranges.push(high_low.max(high_close).max(low_close));
    }

    // 각 시점의 DX (DI 합이 0이면 None)
    let mut dx = none_series(len);

    for i in period..len {
        let window = i - period..i;
        let tr_sum: f64 = true_ranges[window.clone()].iter().sum();
        if tr_sum < f64::EPSILON {
            continue;
        }

        let plus_di = plus_dm[window.clone()].iter().sum::<f64>() / tr_sum * 100.0;
        let minus_di = minus_dm[window].iter().sum::<f64>() / tr_sum * 100.0;

        plus_di_series[i] = Some(plus_di);
        minus_di_series[i] = Some(minus_di);

        let di_sum = plus_di + minus_di;
        if di_sum > f64::EPSILON {
            dx[i] = Some((plus_di - minus_di).abs() / di_sum * 100.0);
        }
    }

    // ADX: 최근 period개 시점 중 정의된 DX의 단순 평균
    for i in period..len {
        let start = i.saturating_sub(period - 1);
        let defined: Vec<f64> = dx[start..=i].iter().flatten().copied().collect();
        if !defined.is_empty() {
            adx[i] = Some(defined.iter().sum::<f64>() / defined.len() as f64);
        }
    }

    AdxSeries {
        period,
        adx,
        plus_di: plus_di_series,
        minus_di: minus_di_series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::TestCandle;

    #[test]
    fn test_adx_warmup_nulls() {
        let candles = TestCandle::linear_series(30, 100.0, 1.0);
        let adx = calculate_adx(&candles, 14);

        assert_eq!(adx.len(), 30);
        for i in 0..14 {
            assert_eq!(adx.plus_di[i], None);
            assert_eq!(adx.minus_di[i], None);
        }
        for i in 14..30 {
            assert!(adx.plus_di[i].is_some());
            assert!(adx.minus_di[i].is_some());
        }
    }

    #[test]
    fn test_adx_uptrend_plus_di_dominates() {
        let candles = TestCandle::linear_series(40, 100.0, 1.0);
        let adx = calculate_adx(&candles, 14);

        let plus = adx.plus_di.last().copied().flatten().unwrap();
        let minus = adx.minus_di.last().copied().flatten().unwrap();
        assert!(plus > minus);
        assert!(adx.is_bullish_direction());

        // 일관된 추세에서 ADX는 높게 유지됨
        let last_adx = adx.adx.last().copied().flatten().unwrap();
        assert!(last_adx > 50.0);
    }

    #[test]
    fn test_adx_downtrend_minus_di_dominates() {
        let candles = TestCandle::linear_series(40, 200.0, -1.0);
        let adx = calculate_adx(&candles, 14);

        let plus = adx.plus_di.last().copied().flatten().unwrap();
        let minus = adx.minus_di.last().copied().flatten().unwrap();
        assert!(minus > plus);
        assert!(!adx.is_bullish_direction());
    }

    #[test]
    fn test_adx_range() {
        let candles = TestCandle::sine_series(80, 100.0, 10.0);
        let adx = calculate_adx(&candles, 14);

        for value in adx.adx.iter().flatten() {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
        for value in adx.plus_di.iter().flatten() {
            assert!(*value >= 0.0);
        }
    }

    #[test]
    fn test_adx_flat_market_undefined() {
        // 실질 범위가 0인 평탄한 시장에서는 DI와 ADX 모두 정의되지 않음
        let candles = TestCandle::flat_series(30, 100.0);
        let adx = calculate_adx(&candles, 14);

        assert!(adx.adx.iter().all(|v| v.is_none()));
        assert!(adx.plus_di.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_adx_insufficient_data() {
        let candles = TestCandle::linear_series(14, 100.0, 1.0);
        let adx = calculate_adx(&candles, 14);
        assert!(adx.adx.iter().all(|v| v.is_none()));
    }
}
