use crate::config_loader::{ConfigError, ConfigResult, ConfigValidation};
use crate::indicator::utils::stats;
use crate::indicator::{IndicatorSeries, none_series};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 볼린저밴드 매개변수를 정의하는 구조체
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerParams {
    /// 이동평균 기간
    pub period: usize,
    /// 표준편차 배수
    pub multiplier: f64,
}

impl BollingerParams {
    /// 새 볼린저밴드 파라미터 생성
    ///
    /// # Arguments
    /// * `period` - 이동평균 기간 (일반적으로 20)
    /// * `multiplier` - 표준편차 배수 (일반적으로 2.0)
    pub fn new(period: usize, multiplier: f64) -> BollingerParams {
        BollingerParams { period, multiplier }
    }
}

impl Default for BollingerParams {
    fn default() -> Self {
        BollingerParams {
            period: 20,
            multiplier: 2.0,
        }
    }
}

impl Display for BollingerParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BB({},{})", self.period, self.multiplier)
    }
}

impl ConfigValidation for BollingerParams {
    fn validate(&self) -> ConfigResult<()> {
        if self.period == 0 {
            return Err(ConfigError::ValidationError(
                "볼린저밴드 기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if self.multiplier <= 0.0 {
            return Err(ConfigError::ValidationError(
                "표준편차 배수는 0보다 커야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

/// 볼린저밴드 시계열
///
/// 중심선은 SMA이고 상단/하단 밴드는 중심선에서
/// 표준편차의 배수만큼 떨어진 값입니다.
/// 표준편차는 트레일링 윈도우에 대한 모집단 표준편차를 사용합니다.
#[derive(Debug, Clone, Serialize)]
pub struct BollingerSeries {
    /// 계산에 사용한 파라미터
    pub params: BollingerParams,
    /// 중심선 (SMA)
    pub middle: IndicatorSeries,
    /// 상단 밴드
    pub upper: IndicatorSeries,
    /// 하단 밴드
    pub lower: IndicatorSeries,
    /// 밴드 폭 비율 (%) = (상단 - 하단) / 중심 * 100
    pub width: IndicatorSeries,
}

impl Display for BollingerSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (
            self.lower.last().copied().flatten(),
            self.middle.last().copied().flatten(),
            self.upper.last().copied().flatten(),
        ) {
            (Some(lower), Some(middle), Some(upper)) => {
                write!(
                    f,
                    "{}: {:.2} < {:.2} < {:.2}",
                    self.params, lower, middle, upper
                )
            }
            _ => write!(f, "{}: 데이터 부족", self.params),
        }
    }
}

impl BollingerSeries {
    /// 시계열 길이 반환
    pub fn len(&self) -> usize {
        self.middle.len()
    }

    /// 시계열이 비어 있는지 확인
    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }
}

/// 볼린저밴드 시계열 계산
///
/// 첫 `period - 1`개 구간은 윈도우 데이터가 부족하므로 None입니다.
/// 중심선이 0에 가까우면 밴드 폭 비율은 계산할 수 없어 None입니다.
///
/// # Arguments
/// * `values` - 가격 데이터 배열 (시간 오름차순)
/// * `params` - 볼린저밴드 파라미터
///
/// # Returns
/// * `BollingerSeries` - 계산된 볼린저밴드 시계열
pub fn calculate_bollinger(values: &[f64], params: &BollingerParams) -> BollingerSeries {
    let len = values.len();
    let period = params.period;

    let mut middle = none_series(len);
    let mut upper = none_series(len);
    let mut lower = none_series(len);
    let mut width = none_series(len);

    if period == 0 || len < period {
        return BollingerSeries {
            params: *params,
            middle,
            upper,
            lower,
            width,
        };
    }

    for i in period - 1..len {
        let window = &values[i + 1 - period..=i];
        let mean = stats::calculate_mean(window);
        let stddev = stats::calculate_stddev(window);

        let band_upper = mean + params.multiplier * stddev;
        let band_lower = mean - params.multiplier * stddev;

        middle[i] = Some(mean);
        upper[i] = Some(band_upper);
        lower[i] = Some(band_lower);
        width[i] = if mean.abs() < f64::EPSILON {
            None
        } else {
            Some((band_upper - band_lower) / mean * 100.0)
        };
    }

    BollingerSeries {
        params: *params,
        middle,
        upper,
        lower,
        width,
    }
}
