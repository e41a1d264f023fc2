use crate::indicator::{IndicatorSeries, none_series};
use serde::Serialize;
use std::fmt::Display;

/// 상대강도지수(RSI) 시계열 계산
///
/// 와일더 방식의 평활 평균 게인/로스 비율을 사용합니다.
/// 첫 `period`개 구간은 델타 데이터가 부족하므로 None입니다.
/// 평균 로스가 0이면 RSI는 100입니다.
///
/// # Arguments
/// * `values` - 가격 데이터 배열 (시간 오름차순)
/// * `period` - 계산 기간 (일반적으로 14)
///
/// # Returns
/// * `IndicatorSeries` - 입력과 같은 길이의 RSI 시계열 (0-100)
pub fn calculate_rsi(values: &[f64], period: usize) -> IndicatorSeries {
    if period == 0 || values.len() < period + 1 {
        return none_series(values.len());
    }

    let mut series = none_series(values.len());

    let mut gains = Vec::with_capacity(values.len() - 1);
    let mut losses = Vec::with_capacity(values.len() - 1);

    // 가격 변화량 계산
    for i in 1..values.len() {
        let change = values[i] - values[i - 1];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    // 첫 번째 평균 게인/로스 계산
    let mut avg_gain = gains.iter().take(period).sum::<f64>() / period as f64;
    let mut avg_loss = losses.iter().take(period).sum::<f64>() / period as f64;
    series[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    // 나머지 기간에 대해 와일더 평활로 업데이트
    let smoothing_factor = 1.0 / period as f64;
    for i in period..gains.len() {
        avg_gain = (avg_gain * (1.0 - smoothing_factor)) + (gains[i] * smoothing_factor);
        avg_loss = (avg_loss * (1.0 - smoothing_factor)) + (losses[i] * smoothing_factor);
        series[i + 1] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    series
}

/// 평균 게인/로스에서 RSI 값 계산
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss < 0.000001 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// 가장 최근 시점의 RSI 값 계산
///
/// # Arguments
/// * `values` - 가격 데이터 배열 (시간 오름차순)
/// * `period` - 계산 기간
///
/// # Returns
/// * `Option<f64>` - 최신 RSI 값 (데이터 부족 시 None)
pub fn latest_rsi(values: &[f64], period: usize) -> Option<f64> {
    calculate_rsi(values, period).last().copied().flatten()
}

/// RSI 값이 속한 구간
///
/// 복합 신호 분류에서 MACD 판단과 결합해 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RsiZone {
    /// 과매수 (70 이상)
    Overbought,
    /// 상승 우위 (60 이상)
    Bullish,
    /// 중립
    Neutral,
    /// 하락 우위 (40 이하)
    Bearish,
    /// 과매도 (30 이하)
    Oversold,
}

impl RsiZone {
    /// RSI 값에서 구간을 판정합니다.
    ///
    /// 경계값은 바깥 구간에 먼저 속합니다 (70은 과매수, 30은 과매도).
    ///
    /// # Arguments
    /// * `value` - RSI 값 (0-100)
    ///
    /// # Returns
    /// * `RsiZone` - 판정된 구간
    pub fn from_value(value: f64) -> RsiZone {
        if value >= 70.0 {
            RsiZone::Overbought
        } else if value <= 30.0 {
            RsiZone::Oversold
        } else if value >= 60.0 {
            RsiZone::Bullish
        } else if value <= 40.0 {
            RsiZone::Bearish
        } else {
            RsiZone::Neutral
        }
    }

    /// 과매수 구간 여부
    pub fn is_overbought(&self) -> bool {
        *self == RsiZone::Overbought
    }

    /// 과매도 구간 여부
    pub fn is_oversold(&self) -> bool {
        *self == RsiZone::Oversold
    }
}

impl Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RsiZone::Overbought => write!(f, "과매수"),
            RsiZone::Bullish => write!(f, "상승 우위"),
            RsiZone::Neutral => write!(f, "중립"),
            RsiZone::Bearish => write!(f, "하락 우위"),
            RsiZone::Oversold => write!(f, "과매도"),
        }
    }
}
