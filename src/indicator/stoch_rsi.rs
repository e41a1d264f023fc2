use crate::config_loader::{ConfigError, ConfigResult, ConfigValidation};
use crate::indicator::rsi::calculate_rsi;
use crate::indicator::{IndicatorSeries, none_series};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 스토캐스틱 RSI 매개변수를 정의하는 구조체
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StochRsiParams {
    /// RSI 계산 기간
    pub rsi_period: usize,
    /// RSI에 적용하는 스토캐스틱 기간
    pub stoch_period: usize,
    /// %K 기간
    pub k_period: usize,
    /// %D 기간
    pub d_period: usize,
}

impl StochRsiParams {
    /// 새 스토캐스틱 RSI 파라미터 생성
    pub fn new(
        rsi_period: usize,
        stoch_period: usize,
        k_period: usize,
        d_period: usize,
    ) -> StochRsiParams {
        StochRsiParams {
            rsi_period,
            stoch_period,
            k_period,
            d_period,
        }
    }
}

impl Default for StochRsiParams {
    fn default() -> Self {
        StochRsiParams {
            rsi_period: 14,
            stoch_period: 14,
            k_period: 3,
            d_period: 3,
        }
    }
}

impl Display for StochRsiParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StochRSI({},{},{},{})",
            self.rsi_period, self.stoch_period, self.k_period, self.d_period
        )
    }
}

impl ConfigValidation for StochRsiParams {
    fn validate(&self) -> ConfigResult<()> {
        if self.rsi_period == 0 || self.stoch_period == 0 || self.k_period == 0 || self.d_period == 0
        {
            return Err(ConfigError::ValidationError(
                "스토캐스틱 RSI 기간은 0보다 커야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

/// 스토캐스틱 RSI 시계열
#[derive(Debug, Clone, Serialize)]
pub struct StochRsiSeries {
    /// 계산에 사용한 파라미터
    pub params: StochRsiParams,
    /// %K선 (RSI의 스토캐스틱, 0-100)
    pub k: IndicatorSeries,
    /// %D선 (%K의 이동평균)
    pub d: IndicatorSeries,
}

impl Display for StochRsiSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (
            self.k.last().copied().flatten(),
            self.d.last().copied().flatten(),
        ) {
            (Some(k), Some(d)) => write!(f, "{}: K {:.2}, D {:.2}", self.params, k, d),
            _ => write!(f, "{}: 데이터 부족", self.params),
        }
    }
}

impl StochRsiSeries {
    /// 시계열 길이 반환
    pub fn len(&self) -> usize {
        self.k.len()
    }

    /// 시계열이 비어 있는지 확인
    pub fn is_empty(&self) -> bool {
        self.k.is_empty()
    }
}

/// 스토캐스틱 RSI 시계열 계산
///
/// 먼저 RSI를 계산한 뒤, RSI 값에 `stoch_period` 스토캐스틱을 적용해
/// %K를 구합니다. 윈도우 내 RSI 고저 범위가 0이면 중립값 50을 사용합니다.
/// %D는 %K에 대한 `k_period + d_period - 1` 윈도우의 단순 평균입니다.
///
/// # Arguments
/// * `values` - 가격 데이터 배열 (시간 오름차순)
/// * `params` - 스토캐스틱 RSI 파라미터
///
/// # Returns
/// * `StochRsiSeries` - 계산된 %K/%D 시계열
pub fn calculate_stoch_rsi(values: &[f64], params: &StochRsiParams) -> StochRsiSeries {
    let len = values.len();

    let mut k_series = none_series(len);
    let mut d_series = none_series(len);

    if params.rsi_period == 0 || params.stoch_period == 0 {
        return StochRsiSeries {
            params: *params,
            k: k_series,
            d: d_series,
        };
    }

    let rsi = calculate_rsi(values, params.rsi_period);

    // %K: RSI에 대한 스토캐스틱
    for i in 0..len {
        if i + 1 < params.stoch_period {
            continue;
        }

        let window: Vec<f64> = rsi[i + 1 - params.stoch_period..=i]
            .iter()
            .flatten()
            .copied()
            .collect();
        if window.len() < params.stoch_period {
            continue;
        }

        let highest = window.iter().copied().fold(f64::MIN, f64::max);
        let lowest = window.iter().copied().fold(f64::MAX, f64::min);
        let range = highest - lowest;

        k_series[i] = if range.abs() < f64::EPSILON {
            // RSI가 움직이지 않은 구간은 중립값
            Some(50.0)
        } else {
            Some((rsi[i].unwrap_or(lowest) - lowest) / range * 100.0)
        };
    }

    // %D: %K의 k_period + d_period - 1 윈도우 단순 평균
    let d_window = params.k_period + params.d_period - 1;
    for i in 0..len {
        if i + 1 < d_window {
            continue;
        }

        let window: Vec<f64> = k_series[i + 1 - d_window..=i]
            .iter()
            .flatten()
            .copied()
            .collect();
        if window.len() == d_window {
            d_series[i] = Some(window.iter().sum::<f64>() / d_window as f64);
        }
    }

    StochRsiSeries {
        params: *params,
        k: k_series,
        d: d_series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stoch_rsi_range() {
        let values: Vec<f64> = (0..80)
            .map(|i| 100.0 + (i as f64 * 0.6).sin() * 10.0)
            .collect();
        let stoch = calculate_stoch_rsi(&values, &StochRsiParams::default());

        for value in stoch.k.iter().flatten() {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
        for value in stoch.d.iter().flatten() {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
    }

    #[test]
    fn test_stoch_rsi_alignment() {
        let values: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.8).cos() * 7.0)
            .collect();
        let params = StochRsiParams::default();
        let stoch = calculate_stoch_rsi(&values, &params);

        assert_eq!(stoch.len(), 60);

        // %K는 RSI 워밍업 + 스토캐스틱 윈도우 이후부터 정의됨
        let first_k = stoch.k.iter().position(|v| v.is_some()).unwrap();
        assert_eq!(first_k, params.rsi_period + params.stoch_period - 1);

        // %D는 %K 이후 k + d - 2 시점부터 정의됨
        let first_d = stoch.d.iter().position(|v| v.is_some()).unwrap();
        assert_eq!(first_d, first_k + params.k_period + params.d_period - 2);
    }

    #[test]
    fn test_stoch_rsi_constant_rsi_neutral() {
        // 순증가 입력의 RSI는 항상 100이므로 범위가 0이 되어 %K는 중립값 50
        let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let stoch = calculate_stoch_rsi(&values, &StochRsiParams::default());

        for value in stoch.k.iter().flatten() {
            assert!((value - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_stoch_rsi_insufficient_data() {
        let values: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let stoch = calculate_stoch_rsi(&values, &StochRsiParams::default());
        assert!(stoch.k.iter().all(|v| v.is_none()));
        assert!(stoch.d.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_stoch_rsi_params_validation() {
        assert!(StochRsiParams::default().validate().is_ok());
        assert!(StochRsiParams::new(0, 14, 3, 3).validate().is_err());
        assert!(StochRsiParams::new(14, 14, 0, 3).validate().is_err());
    }
}
