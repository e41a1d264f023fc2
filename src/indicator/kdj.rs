use crate::indicator::{IndicatorSeries, none_series};
use crate::model::Candle;
use serde::Serialize;
use std::fmt::Display;

/// KDJ 스토캐스틱 시계열
///
/// K와 D는 RSV의 평활값이고 J는 `3K - 2D`로 민감도를 높인 보조선입니다.
#[derive(Debug, Clone, Serialize)]
pub struct KdjSeries {
    /// 계산 기간
    pub period: usize,
    /// K선
    pub k: IndicatorSeries,
    /// D선
    pub d: IndicatorSeries,
    /// J선 (3K - 2D)
    pub j: IndicatorSeries,
}

impl Display for KdjSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (
            self.k.last().copied().flatten(),
            self.d.last().copied().flatten(),
            self.j.last().copied().flatten(),
        ) {
            (Some(k), Some(d), Some(j)) => {
                write!(f, "KDJ({}: {:.2}, {:.2}, {:.2})", self.period, k, d, j)
            }
            _ => write!(f, "KDJ({}: 데이터 부족)", self.period),
        }
    }
}

impl KdjSeries {
    /// 시계열 길이 반환
    pub fn len(&self) -> usize {
        self.k.len()
    }

    /// 시계열이 비어 있는지 확인
    pub fn is_empty(&self) -> bool {
        self.k.is_empty()
    }
}

/// KDJ 시계열 계산
///
/// RSV는 기간 내 고저 범위에서 종가의 상대 위치(0-100)이며,
/// 범위가 0인 구간(고가 == 저가)에서는 중립값 50을 사용합니다.
/// K와 D는 각각 `2/3 * 이전값 + 1/3 * 신규값`으로 평활하고 초기값은 50입니다.
///
/// # Arguments
/// * `candles` - 시간 오름차순 캔들 배열
/// * `period` - RSV 계산 기간 (일반적으로 9)
///
/// # Returns
/// * `KdjSeries` - 계산된 KDJ 시계열 (첫 `period - 1`개 구간은 None)
pub fn calculate_kdj<C: Candle>(candles: &[C], period: usize) -> KdjSeries {
    let len = candles.len();

    if period == 0 || len < period {
        return KdjSeries {
            period,
            k: none_series(len),
            d: none_series(len),
            j: none_series(len),
        };
    }

    let mut k_series = none_series(len);
    let mut d_series = none_series(len);
    let mut j_series = none_series(len);

    let mut prev_k = 50.0;
    let mut prev_d = 50.0;

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
        let rsv = if range.abs() < f64::EPSILON {
            // 고가와 저가가 같은 구간에서는 중립값 사용
            50.0
        } else {
            (candles[i].close_price() - lowest) / range * 100.0
        };

        let k = 2.0 / 3.0 * prev_k + 1.0 / 3.0 * rsv;
        let d = 2.0 / 3.0 * prev_d + 1.0 / 3.0 * k;
        let j = 3.0 * k - 2.0 * d;

        k_series[i] = Some(k);
        d_series[i] = Some(d);
        j_series[i] = Some(j);

        prev_k = k;
        prev_d = d;
    }

    KdjSeries {
        period,
        k: k_series,
        d: d_series,
        j: j_series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::TestCandle;

    #[test]
    fn test_kdj_warmup_nulls() {
        let candles = TestCandle::linear_series(20, 100.0, 1.0);
        let kdj = calculate_kdj(&candles, 9);

        assert_eq!(kdj.len(), 20);
        for i in 0..8 {
            assert_eq!(kdj.k[i], None);
            assert_eq!(kdj.d[i], None);
            assert_eq!(kdj.j[i], None);
        }
        for i in 8..20 {
            assert!(kdj.k[i].is_some());
            assert!(kdj.d[i].is_some());
            assert!(kdj.j[i].is_some());
        }
    }

    #[test]
    fn test_kdj_j_relation() {
        let candles = TestCandle::linear_series(30, 100.0, 0.5);
        let kdj = calculate_kdj(&candles, 9);

        // J = 3K - 2D 관계 확인
        for i in 0..kdj.len() {
            if let (Some(k), Some(d), Some(j)) = (kdj.k[i], kdj.d[i], kdj.j[i]) {
                assert!((j - (3.0 * k - 2.0 * d)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_kdj_flat_market_neutral() {
        // 고가 == 저가 == 종가인 평탄한 시장에서 RSV는 50이고
        // K와 D도 초기값 50에서 움직이지 않음
        let candles = TestCandle::flat_series(15, 100.0);
        let kdj = calculate_kdj(&candles, 9);

        for i in 8..15 {
            assert!((kdj.k[i].unwrap() - 50.0).abs() < 1e-9);
            assert!((kdj.d[i].unwrap() - 50.0).abs() < 1e-9);
            assert!((kdj.j[i].unwrap() - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_kdj_uptrend_k_above_50() {
        // 강한 상승 추세에서는 종가가 범위 상단에 있어 K가 50을 넘어감
        let candles = TestCandle::linear_series(30, 100.0, 2.0);
        let kdj = calculate_kdj(&candles, 9);

        let last_k = kdj.k.last().copied().flatten().unwrap();
        assert!(last_k > 50.0);
    }

    #[test]
    fn test_kdj_insufficient_data() {
        let candles = TestCandle::linear_series(5, 100.0, 1.0);
        let kdj = calculate_kdj(&candles, 9);
        assert!(kdj.k.iter().all(|v| v.is_none()));
    }
}
