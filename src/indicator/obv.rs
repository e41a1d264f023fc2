use crate::model::Candle;
use serde::Serialize;
use std::fmt::Display;

/// OBV 추세 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObvTrend {
    /// 최근 누적 거래량 증가폭이 직전 구간보다 큼
    Rising,
    /// 최근 누적 거래량 증가폭이 직전 구간보다 작음
    Falling,
    /// 변화 없음 또는 비교 구간 부족
    Neutral,
}

impl Display for ObvTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObvTrend::Rising => write!(f, "상승"),
            ObvTrend::Falling => write!(f, "하락"),
            ObvTrend::Neutral => write!(f, "중립"),
        }
    }
}

/// OBV 시계열과 추세 분류
///
/// OBV는 첫 캔들부터 누적되므로 None 구간이 없습니다.
#[derive(Debug, Clone, Serialize)]
pub struct ObvSummary {
    /// 누적 OBV 시계열 (입력과 같은 길이)
    pub obv: Vec<f64>,
    /// 최근 구간의 추세 분류
    pub trend: ObvTrend,
}

impl Display for ObvSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.obv.last() {
            Some(last) => write!(f, "OBV({:.0}, {})", last, self.trend),
            None => write!(f, "OBV(데이터 없음)"),
        }
    }
}

/// 거래량 균형(OBV) 시계열 계산
///
/// 종가가 전일보다 오르면 거래량을 더하고 내리면 빼는 누적 시계열입니다.
/// 종가가 같으면 변화가 없습니다. 첫 값은 0에서 시작합니다.
///
/// 추세 분류는 최근 `min(10, n-1)`개 캔들의 OBV 변화량을
/// 그 직전 같은 길이 구간의 변화량과 비교합니다.
/// 직전 구간이 없으면 최근 변화량의 부호로 판단합니다.
///
/// # Arguments
/// * `candles` - 시간 오름차순 캔들 배열
///
/// # Returns
/// * `ObvSummary` - OBV 시계열과 추세 분류
pub fn calculate_obv<C: Candle>(candles: &[C]) -> ObvSummary {
    let len = candles.len();
    let mut obv = Vec::with_capacity(len);

    if len == 0 {
        return ObvSummary {
            obv,
            trend: ObvTrend::Neutral,
        };
    }

    obv.push(0.0);
    for i in 1..len {
        let prev = obv[i - 1];
        let change = candles[i].close_price() - candles[i - 1].close_price();
        let signed_volume = if change > 0.0 {
            candles[i].volume()
        } else if change < 0.0 {
            -candles[i].volume()
        } else {
            0.0
        };
        obv.push(prev + signed_volume);
    }

    let trend = classify_trend(&obv);

    ObvSummary { obv, trend }
}

/// 최근 OBV 변화량을 직전 같은 길이 구간과 비교하여 추세를 분류합니다.
fn classify_trend(obv: &[f64]) -> ObvTrend {
    let n = obv.len();
    if n < 2 {
        return ObvTrend::Neutral;
    }

    let span = 10.min(n - 1);
    let recent_delta = obv[n - 1] - obv[n - 1 - span];

    let reference = if n - 1 >= 2 * span {
        // 직전 같은 길이 구간의 변화량과 비교
        obv[n - 1 - span] - obv[n - 1 - 2 * span]
    } else {
        0.0
    };

    if recent_delta > reference {
        ObvTrend::Rising
    } else if recent_delta < reference {
        ObvTrend::Falling
    } else {
        ObvTrend::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::TestCandle;

    #[test]
    fn test_obv_strictly_increasing_in_uptrend() {
        let candles = TestCandle::linear_series(30, 100.0, 1.0);
        let summary = calculate_obv(&candles);

        assert_eq!(summary.obv.len(), 30);
        for i in 1..summary.obv.len() {
            assert!(summary.obv[i] > summary.obv[i - 1]);
        }
    }

    #[test]
    fn test_obv_flat_market_unchanged() {
        // 종가가 변하지 않으면 OBV도 0에서 움직이지 않음
        let candles = TestCandle::flat_series(20, 100.0);
        let summary = calculate_obv(&candles);

        assert!(summary.obv.iter().all(|v| v.abs() < 1e-9));
        assert_eq!(summary.trend, ObvTrend::Neutral);
    }

    #[test]
    fn test_obv_decreasing_in_downtrend() {
        let candles = TestCandle::linear_series(30, 200.0, -1.0);
        let summary = calculate_obv(&candles);

        let last = *summary.obv.last().unwrap();
        assert!(last < 0.0);
    }

    #[test]
    fn test_obv_trend_rising_after_reversal() {
        // 하락 후 상승 반전: 최근 구간의 변화량이 직전 구간보다 큼
        let mut candles = TestCandle::linear_series(15, 200.0, -1.0);
        let mut rebound = TestCandle::linear_series(15, 186.0, 2.0);
        candles.append(&mut rebound);

        let summary = calculate_obv(&candles);
        assert_eq!(summary.trend, ObvTrend::Rising);
    }

    #[test]
    fn test_obv_trend_falling_after_reversal() {
        let mut candles = TestCandle::linear_series(15, 100.0, 2.0);
        let mut drop = TestCandle::linear_series(15, 128.0, -2.0);
        candles.append(&mut drop);

        let summary = calculate_obv(&candles);
        assert_eq!(summary.trend, ObvTrend::Falling);
    }

    #[test]
    fn test_obv_empty_and_single() {
        let empty: Vec<TestCandle> = Vec::new();
        let summary = calculate_obv(&empty);
        assert!(summary.obv.is_empty());
        assert_eq!(summary.trend, ObvTrend::Neutral);

        let single = TestCandle::flat_series(1, 100.0);
        let summary = calculate_obv(&single);
        assert_eq!(summary.obv, vec![0.0]);
        assert_eq!(summary.trend, ObvTrend::Neutral);
    }
}
