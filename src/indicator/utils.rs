use crate::indicator::IndicatorSeries;
use crate::indicator::atr::calculate_atr;
use crate::indicator::bband::{BollingerParams, BollingerSeries, calculate_bollinger};
use crate::indicator::kdj::{KdjSeries, calculate_kdj};
use crate::indicator::ma::{calculate_ema, calculate_sma};
use crate::indicator::macd::{MacdParams, MacdSeries, calculate_macd};
use crate::indicator::rsi::calculate_rsi;
use crate::indicator::vwap::calculate_vwap;
use crate::indicator::williams::calculate_williams_r;
use crate::model::Candle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// 공통 이동평균 계산 함수들
pub mod moving_average {
    /// 단순이동평균(SMA) 계산 - 공통 유틸리티 함수
    ///
    /// 배열의 마지막 `period`개 값에 대한 평균을 계산합니다.
    ///
    /// # Arguments
    /// * `values` - 가격 데이터 배열
    /// * `period` - 계산 기간
    ///
    /// # Returns
    /// * `f64` - 계산된 SMA 값 (데이터가 부족하거나 period가 0이면 0.0 반환)
    pub fn calculate_sma(values: &[f64], period: usize) -> f64 {
        if values.is_empty() || period == 0 {
            return 0.0;
        }

        if values.len() >= period {
            let start_idx = values.len() - period;
            let slice = &values[start_idx..];
            slice.iter().sum::<f64>() / period as f64
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    /// 지수이동평균(EMA) 계산을 위한 알파값 계산
    ///
    /// # Arguments
    /// * `period` - EMA 기간
    ///
    /// # Returns
    /// * `f64` - 알파값 (평활화 계수)
    pub fn calculate_ema_alpha(period: usize) -> f64 {
        2.0 / (period + 1) as f64
    }

    /// 지수이동평균(EMA) 한 스텝 계산
    ///
    /// # Arguments
    /// * `current_price` - 현재 가격
    /// * `previous_ema` - 이전 EMA 값
    /// * `alpha` - 평활화 계수
    ///
    /// # Returns
    /// * `f64` - 계산된 EMA 값
    pub fn calculate_ema_step(current_price: f64, previous_ema: f64, alpha: f64) -> f64 {
        alpha * current_price + (1.0 - alpha) * previous_ema
    }
}

/// 공통 통계 계산 함수들
pub mod stats {
    /// 산술 평균 계산
    ///
    /// # Arguments
    /// * `values` - 데이터 배열
    ///
    /// # Returns
    /// * `f64` - 평균값 (빈 배열이면 0.0)
    pub fn calculate_mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// 모집단 표준편차 계산
    ///
    /// # Arguments
    /// * `values` - 데이터 배열
    ///
    /// # Returns
    /// * `f64` - 표준편차 (빈 배열이면 0.0)
    pub fn calculate_stddev(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }

        let mean = calculate_mean(values);
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }

    /// 평균 절대 편차 계산
    ///
    /// # Arguments
    /// * `values` - 데이터 배열
    ///
    /// # Returns
    /// * `f64` - 평균으로부터의 절대 편차 평균 (빈 배열이면 0.0)
    pub fn calculate_mean_abs_deviation(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }

        let mean = calculate_mean(values);
        values.iter().map(|v| (v - mean).abs()).sum::<f64>() / values.len() as f64
    }

    /// 최소제곱법으로 추세 기울기 계산
    ///
    /// x축을 0..n-1 인덱스로 두고 y값에 대한 회귀 직선의 기울기를 구합니다.
    /// 양수이면 상승 추세, 음수이면 하락 추세입니다.
    ///
    /// # Arguments
    /// * `values` - 데이터 배열
    ///
    /// # Returns
    /// * `f64` - 추세 기울기 (데이터가 2개 미만이면 0.0)
    pub fn calculate_slope(values: &[f64]) -> f64 {
        let n = values.len();
        if n < 2 {
            return 0.0;
        }

        let n_f = n as f64;
        let sum_x = (0..n).map(|i| i as f64).sum::<f64>();
        let sum_y = values.iter().sum::<f64>();
        let sum_xy = values
            .iter()
            .enumerate()
            .map(|(i, v)| i as f64 * v)
            .sum::<f64>();
        let sum_x2 = (0..n).map(|i| (i as f64).powi(2)).sum::<f64>();

        let denominator = n_f * sum_x2 - sum_x * sum_x;
        if denominator.abs() < f64::EPSILON {
            return 0.0;
        }

        (n_f * sum_xy - sum_x * sum_y) / denominator
    }

    /// 두 시계열의 피어슨 상관계수 계산
    ///
    /// # Arguments
    /// * `x` - 첫 번째 시계열
    /// * `y` - 두 번째 시계열 (x와 같은 길이여야 함)
    ///
    /// # Returns
    /// * `f64` - 상관계수 [-1, 1] (길이가 다르거나 분산이 0이면 0.0)
    pub fn calculate_pearson(x: &[f64], y: &[f64]) -> f64 {
        if x.len() != y.len() || x.len() < 2 {
            return 0.0;
        }

        let mean_x = calculate_mean(x);
        let mean_y = calculate_mean(y);

        let mut covariance = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;

        for i in 0..x.len() {
            let dx = x[i] - mean_x;
            let dy = y[i] - mean_y;
            covariance += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        let denominator = (var_x * var_y).sqrt();
        if denominator < f64::EPSILON {
            return 0.0;
        }

        // 부동소수점 오차로 범위를 살짝 벗어나는 경우 보정
        (covariance / denominator).clamp(-1.0, 1.0)
    }
}

/// 차트 기본 패널 지표 파라미터
///
/// 하나의 캔들 배열에서 차트 표시에 필요한 지표 묶음을 한 번에 계산할 때 사용합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSetParams {
    /// 단순이동평균 기간 목록
    pub sma_periods: Vec<usize>,
    /// 지수이동평균 기간 목록
    pub ema_periods: Vec<usize>,
    /// RSI 기간
    pub rsi_period: usize,
    /// MACD 파라미터
    pub macd: MacdParams,
    /// KDJ 기간
    pub kdj_period: usize,
    /// 볼린저밴드 파라미터
    pub bollinger: BollingerParams,
    /// ATR 기간
    pub atr_period: usize,
    /// 윌리엄스 %R 기간
    pub williams_period: usize,
}

impl Default for IndicatorSetParams {
    fn default() -> Self {
        IndicatorSetParams {
            sma_periods: vec![5, 10, 20, 60],
            ema_periods: vec![12, 26],
            rsi_period: 14,
            macd: MacdParams::default(),
            kdj_period: 9,
            bollinger: BollingerParams::default(),
            atr_period: 14,
            williams_period: 14,
        }
    }
}

impl Display for IndicatorSetParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IndicatorSet(SMA{:?}, EMA{:?}, RSI{}, {}, KDJ{}, {}, ATR{}, W%R{})",
            self.sma_periods,
            self.ema_periods,
            self.rsi_period,
            self.macd,
            self.kdj_period,
            self.bollinger,
            self.atr_period,
            self.williams_period
        )
    }
}

impl crate::config_loader::ConfigValidation for IndicatorSetParams {
    fn validate(&self) -> crate::config_loader::ConfigResult<()> {
        use crate::config_loader::ConfigError;

        if self.sma_periods.iter().any(|p| *p == 0) {
            return Err(ConfigError::ValidationError(
                "SMA 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if self.ema_periods.iter().any(|p| *p == 0) {
            return Err(ConfigError::ValidationError(
                "EMA 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if self.rsi_period == 0
            || self.kdj_period == 0
            || self.atr_period == 0
            || self.williams_period == 0
        {
            return Err(ConfigError::ValidationError(
                "지표 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        self.macd.validate()?;
        self.bollinger.validate()?;
        Ok(())
    }
}

/// 차트 기본 패널 지표 묶음
///
/// 각 지표 시계열은 입력 캔들 배열과 같은 길이이며,
/// 계산 불가능한 앞쪽 구간은 None으로 채워집니다.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSet {
    /// 기간별 단순이동평균
    pub smas: BTreeMap<usize, IndicatorSeries>,
    /// 기간별 지수이동평균
    pub emas: BTreeMap<usize, IndicatorSeries>,
    /// 상대강도지수
    pub rsi: IndicatorSeries,
    /// 이동평균수렴발산
    pub macd: MacdSeries,
    /// KDJ 스토캐스틱
    pub kdj: KdjSeries,
    /// 볼린저밴드
    pub bollinger: BollingerSeries,
    /// 평균 실질 범위
    pub atr: IndicatorSeries,
    /// 윌리엄스 %R
    pub williams_r: IndicatorSeries,
    /// 거래량 가중 평균 가격
    pub vwap: IndicatorSeries,
}

impl IndicatorSet {
    /// 캔들 배열에서 기본 패널 지표 묶음을 계산합니다.
    ///
    /// # Arguments
    /// * `candles` - 시간 오름차순 캔들 배열
    /// * `params` - 지표 파라미터
    ///
    /// # Returns
    /// * `IndicatorSet` - 계산된 지표 묶음
    pub fn compute<C: Candle>(candles: &[C], params: &IndicatorSetParams) -> IndicatorSet {
        log::trace!("지표 묶음 계산 시작: {}개 캔들", candles.len());

        let closes: Vec<f64> = candles.iter().map(|c| c.close_price()).collect();

        let mut smas = BTreeMap::new();
        for period in &params.sma_periods {
            smas.insert(*period, calculate_sma(&closes, *period));
        }

        let mut emas = BTreeMap::new();
        for period in &params.ema_periods {
            emas.insert(*period, calculate_ema(&closes, *period));
        }

        IndicatorSet {
            smas,
            emas,
            rsi: calculate_rsi(&closes, params.rsi_period),
            macd: calculate_macd(&closes, &params.macd),
            kdj: calculate_kdj(candles, params.kdj_period),
            bollinger: calculate_bollinger(&closes, &params.bollinger),
            atr: calculate_atr(candles, params.atr_period),
            williams_r: calculate_williams_r(candles, params.williams_period),
            vwap: calculate_vwap(candles),
        }
    }

    /// 특정 기간 SMA의 최신 값을 반환합니다.
    pub fn latest_sma(&self, period: usize) -> Option<f64> {
        self.smas
            .get(&period)
            .and_then(|series| series.last().copied().flatten())
    }

    /// RSI의 최신 값을 반환합니다.
    pub fn latest_rsi(&self) -> Option<f64> {
        self.rsi.last().copied().flatten()
    }

    /// ATR의 최신 값을 반환합니다.
    pub fn latest_atr(&self) -> Option<f64> {
        self.atr.last().copied().flatten()
    }
}
