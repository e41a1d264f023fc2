// 기술적 지표 모듈
// 차트 표시에 사용하는 각종 기술적 분석 지표를 제공합니다.

pub mod adx;
pub mod atr;
pub mod bband;
pub mod cci;
pub mod kdj;
pub mod ma;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod stoch_rsi;
pub mod utils;
pub mod vwap;
pub mod williams;

/// 지표 시계열 타입
///
/// 입력 캔들 배열과 같은 길이의 시계열입니다.
/// 계산에 필요한 과거 데이터(lookback)가 부족한 구간은 `None`으로 표시됩니다.
/// `None`은 오류가 아니라 "아직 계산할 수 없음"을 의미합니다.
pub type IndicatorSeries = Vec<Option<f64>>;

/// 전체가 None인 시계열을 생성합니다.
///
/// # Arguments
/// * `len` - 시계열 길이
///
/// # Returns
/// * `IndicatorSeries` - None으로 채워진 시계열
pub fn none_series(len: usize) -> IndicatorSeries {
    vec![None; len]
}

/// 시계열에서 가장 최근의 계산된 값을 반환합니다.
///
/// # Arguments
/// * `series` - 지표 시계열
///
/// # Returns
/// * `Option<f64>` - 마지막으로 정의된 값 또는 None
pub fn last_defined(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().find_map(|v| *v)
}

/// 시계열에서 앞쪽 None 구간의 길이를 반환합니다.
///
/// # Arguments
/// * `series` - 지표 시계열
///
/// # Returns
/// * `usize` - 첫 번째 정의된 값의 인덱스 (모두 None이면 시계열 길이)
pub fn warmup_len(series: &[Option<f64>]) -> usize {
    series
        .iter()
        .position(|v| v.is_some())
        .unwrap_or(series.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_series() {
        let series = none_series(5);
        assert_eq!(series.len(), 5);
        assert!(series.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_last_defined() {
        let series = vec![None, Some(1.0), Some(2.0), None];
        assert_eq!(last_defined(&series), Some(2.0));

        let empty: IndicatorSeries = vec![None, None];
        assert_eq!(last_defined(&empty), None);
    }

    #[test]
    fn test_warmup_len() {
        let series = vec![None, None, Some(1.0), Some(2.0)];
        assert_eq!(warmup_len(&series), 2);

        let all_none: IndicatorSeries = vec![None, None];
        assert_eq!(warmup_len(&all_none), 2);

        let no_warmup = vec![Some(1.0)];
        assert_eq!(warmup_len(&no_warmup), 0);
    }
}
