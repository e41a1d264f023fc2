use crate::config_loader::{ConfigError, ConfigResult, ConfigValidation};
use crate::indicator::ma::ema_values;
use crate::indicator::{IndicatorSeries, none_series};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// MACD 매개변수를 정의하는 구조체
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MacdParams {
    /// 빠른 EMA 기간
    pub fast_period: usize,
    /// 느린 EMA 기간
    pub slow_period: usize,
    /// 시그널 라인 기간
    pub signal_period: usize,
}

impl MacdParams {
    /// 새 MACD 파라미터 생성
    ///
    /// # Arguments
    /// * `fast_period` - 빠른 EMA 기간 (일반적으로 12)
    /// * `slow_period` - 느린 EMA 기간 (일반적으로 26)
    /// * `signal_period` - 시그널 라인 기간 (일반적으로 9)
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> MacdParams {
        MacdParams {
            fast_period,
            slow_period,
            signal_period,
        }
    }
}

impl Default for MacdParams {
    fn default() -> Self {
        MacdParams {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Display for MacdParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({},{},{})",
            self.fast_period, self.slow_period, self.signal_period
        )
    }
}

impl ConfigValidation for MacdParams {
    fn validate(&self) -> ConfigResult<()> {
        if self.fast_period == 0 || self.slow_period == 0 || self.signal_period == 0 {
            return Err(ConfigError::ValidationError(
                "MACD 기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if self.fast_period >= self.slow_period {
            return Err(ConfigError::ValidationError(
                "빠른 기간은 느린 기간보다 작아야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

/// MACD(Moving Average Convergence Divergence) 시계열
///
/// MACD는 추세 추종 모멘텀 지표로, 추세의 방향과 강도를 나타냅니다.
/// `macd_line`은 EMA 시드 방식 덕분에 전 구간 정의되며,
/// `signal_line`과 `histogram`은 느린 EMA가 의미를 갖는
/// `slow_period - 1` 인덱스부터 정의됩니다.
#[derive(Debug, Clone, Serialize)]
pub struct MacdSeries {
    /// 계산에 사용한 파라미터
    pub params: MacdParams,
    /// MACD 라인 (빠른 EMA - 느린 EMA)
    pub macd_line: IndicatorSeries,
    /// 시그널 라인 (MACD 라인의 EMA)
    pub signal_line: IndicatorSeries,
    /// 히스토그램 (MACD - 시그널)
    pub histogram: IndicatorSeries,
}

impl Display for MacdSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (
            self.macd_line.last().copied().flatten(),
            self.signal_line.last().copied().flatten(),
            self.histogram.last().copied().flatten(),
        ) {
            (Some(macd), Some(signal), Some(hist)) => {
                write!(f, "{}: {:.4}, {:.4}, {:.4}", self.params, macd, signal, hist)
            }
            _ => write!(f, "{}: 데이터 부족", self.params),
        }
    }
}

impl MacdSeries {
    /// 시계열 길이 반환
    pub fn len(&self) -> usize {
        self.macd_line.len()
    }

    /// 시계열이 비어 있는지 확인
    pub fn is_empty(&self) -> bool {
        self.macd_line.is_empty()
    }

    /// 지정된 인덱스에서 MACD 라인과 시그널 라인이 모두 정의되어 있는지 확인
    pub fn is_defined_at(&self, index: usize) -> bool {
        self.macd_line.get(index).copied().flatten().is_some()
            && self.signal_line.get(index).copied().flatten().is_some()
    }
}

/// MACD 시계열 계산
///
/// MACD 라인은 빠른 EMA에서 느린 EMA를 뺀 값입니다.
/// 시그널 라인은 느린 EMA가 의미를 갖는 `slow_period - 1` 인덱스부터의
/// MACD 라인에 시그널 기간 EMA를 적용한 뒤 원래 인덱스에 맞춰 재정렬한 값이며,
/// 그 앞 구간은 None으로 채워집니다.
///
/// # Arguments
/// * `values` - 가격 데이터 배열 (시간 오름차순)
/// * `params` - MACD 파라미터
///
/// # Returns
/// * `MacdSeries` - 계산된 MACD 시계열
pub fn calculate_macd(values: &[f64], params: &MacdParams) -> MacdSeries {
    let len = values.len();

    if params.fast_period == 0 || params.slow_period == 0 || params.signal_period == 0 {
        return MacdSeries {
            params: *params,
            macd_line: none_series(len),
            signal_line: none_series(len),
            histogram: none_series(len),
        };
    }

    let fast_ema = ema_values(values, params.fast_period);
    let slow_ema = ema_values(values, params.slow_period);

    let macd_raw: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(fast, slow)| fast - slow)
        .collect();

    let macd_line: IndicatorSeries = macd_raw.iter().copied().map(Some).collect();

    // 시그널 라인은 느린 EMA가 충분히 수렴한 구간부터 계산
    let offset = params.slow_period - 1;
    let mut signal_line = none_series(len);
    let mut histogram = none_series(len);

    if len > offset {
        let signal_raw = ema_values(&macd_raw[offset..], params.signal_period);
        for (i, signal) in signal_raw.into_iter().enumerate() {
            let index = offset + i;
            signal_line[index] = Some(signal);
            histogram[index] = Some(macd_raw[index] - signal);
        }
    }

    MacdSeries {
        params: *params,
        macd_line,
        signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macd_alignment() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let params = MacdParams::default();
        let macd = calculate_macd(&values, &params);

        assert_eq!(macd.len(), 40);

        // MACD 라인은 전 구간 정의됨
        assert!(macd.macd_line.iter().all(|v| v.is_some()));

        // 시그널과 히스토그램은 slow_period - 1 이전에는 None
        for i in 0..params.slow_period - 1 {
            assert_eq!(macd.signal_line[i], None);
            assert_eq!(macd.histogram[i], None);
        }
        for i in params.slow_period - 1..40 {
            assert!(macd.signal_line[i].is_some());
            assert!(macd.histogram[i].is_some());
        }
    }

    #[test]
    fn test_histogram_is_macd_minus_signal() {
        let values: Vec<f64> = (0..50)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();
        let macd = calculate_macd(&values, &MacdParams::default());

        for i in 0..macd.len() {
            match (macd.macd_line[i], macd.signal_line[i], macd.histogram[i]) {
                (Some(m), Some(s), Some(h)) => {
                    assert!((h - (m - s)).abs() < 1e-12);
                }
                (_, None, None) => (),
                _ => panic!("시그널과 히스토그램의 정의 구간이 일치해야 함: index {}", i),
            }
        }
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        // 충분히 긴 상승 추세에서는 MACD 라인이 양수
        let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let macd = calculate_macd(&values, &MacdParams::default());

        let last_macd = macd.macd_line.last().copied().flatten().unwrap();
        assert!(last_macd > 0.0);

        let last_hist = macd.histogram.last().copied().flatten().unwrap();
        assert!(last_hist > 0.0 || last_hist.abs() < 1e-6);
    }

    #[test]
    fn test_macd_short_input() {
        // 느린 기간보다 짧은 입력: MACD 라인은 정의되지만 시그널은 전부 None
        let values = [100.0, 101.0, 102.0];
        let macd = calculate_macd(&values, &MacdParams::default());

        assert_eq!(macd.len(), 3);
        assert!(macd.macd_line.iter().all(|v| v.is_some()));
        assert!(macd.signal_line.iter().all(|v| v.is_none()));
        assert!(macd.histogram.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_macd_empty_input() {
        let macd = calculate_macd(&[], &MacdParams::default());
        assert!(macd.is_empty());
    }

    #[test]
    fn test_macd_params_display() {
        let params = MacdParams::default();
        assert_eq!(format!("{params}"), "MACD(12,26,9)");
    }

    #[test]
    fn test_macd_params_validation() {
        assert!(MacdParams::new(12, 26, 9).validate().is_ok());
        assert!(MacdParams::new(0, 26, 9).validate().is_err());
        assert!(MacdParams::new(26, 12, 9).validate().is_err());
        assert!(MacdParams::new(26, 26, 9).validate().is_err());
    }
}
