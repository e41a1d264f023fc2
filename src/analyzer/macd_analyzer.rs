use crate::indicator::macd::{MacdParams, MacdSeries, calculate_macd};
use crate::indicator::utils::stats;
use crate::model::{Candle, ClassifiedSignal, SignalAction, SignalDirection, SignalReason};
use serde::Serialize;
use std::fmt::Display;

/// MACD 라인의 0축 판정 임계값
///
/// 절대값이 이보다 작으면 0축 부근으로 취급합니다.
const ZERO_AXIS_THRESHOLD: f64 = 0.0005;

/// 최근 교차 횟수를 세는 트레일링 구간 길이
const FRESH_CROSS_WINDOW: usize = 10;

/// 역추세 판정에 사용하는 종가 구간 길이
const TREND_WINDOW: usize = 20;

/// 관망으로 수렴시키는 최소 신호 강도
const HOLD_THRESHOLD: f64 = 4.0;

/// MACD 라인의 0축 기준 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ZeroAxisPosition {
    /// 0축 위
    Above,
    /// 0축 부근
    Near,
    /// 0축 아래
    Below,
}

impl ZeroAxisPosition {
    /// MACD 라인 값에서 0축 위치를 판정합니다.
    pub fn from_value(value: f64) -> ZeroAxisPosition {
        if value.abs() < ZERO_AXIS_THRESHOLD {
            ZeroAxisPosition::Near
        } else if value > 0.0 {
            ZeroAxisPosition::Above
        } else {
            ZeroAxisPosition::Below
        }
    }
}

impl Display for ZeroAxisPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZeroAxisPosition::Above => write!(f, "0축 위"),
            ZeroAxisPosition::Near => write!(f, "0축 부근"),
            ZeroAxisPosition::Below => write!(f, "0축 아래"),
        }
    }
}

/// MACD 교차 기반 매매 신호 분류기
///
/// 최근 두 시점의 MACD 출력을 보고 골든/데드 크로스, 히스토그램 추이,
/// 0축 위치를 종합하여 점수화된 매매 액션을 냅니다.
/// 0축 아래의 교차는 통계적으로 신뢰도가 낮으므로 강도를 깎습니다.
#[derive(Debug, Clone)]
pub struct MacdSignalAnalyzer {
    params: MacdParams,
}

impl MacdSignalAnalyzer {
    /// 새 MACD 신호 분류기 생성
    pub fn new(params: MacdParams) -> MacdSignalAnalyzer {
        MacdSignalAnalyzer { params }
    }

    /// 최신 시점의 매매 신호를 분류합니다.
    ///
    /// 판정 규칙:
    /// - 골든 크로스: 0축 위에서 최근 첫 교차이면 강도 9, 반복 교차이면 7.
    ///   0축 부근이면 0.7배로 할인, 0축 아래이면 고정 강도 4.
    /// - 데드 크로스: 0축 위 -7, 0축 부근 -4.9, 0축 아래 -9.
    /// - 교차 없이 0축 위에서 히스토그램이 축소하면 비중 축소(-3).
    /// - 최근 20개 종가의 회귀 기울기가 음수이면 매수 강도를 절반으로.
    /// - 매수/매도 신호의 최종 강도 절대값이 4 미만이면 관망으로 수렴.
    ///   (비중 축소는 자체 강도가 낮은 보조 신호이므로 그대로 유지)
    ///
    /// # Arguments
    /// * `candles` - 시간 오름차순 캔들 배열
    ///
    /// # Returns
    /// * `ClassifiedSignal` - 분류된 매매 신호
    pub fn classify<C: Candle>(&self, candles: &[C]) -> ClassifiedSignal {
        let closes: Vec<f64> = candles.iter().map(|c| c.close_price()).collect();
        let macd = calculate_macd(&closes, &self.params);

        let Some(index) = latest_pair_index(&macd) else {
            return ClassifiedSignal::hold(SignalReason::InsufficientData);
        };

        let macd_now = macd.macd_line[index].unwrap_or(0.0);
        let signal_now = macd.signal_line[index].unwrap_or(0.0);
        let macd_prev = macd.macd_line[index - 1].unwrap_or(0.0);
        let signal_prev = macd.signal_line[index - 1].unwrap_or(0.0);

        let position = ZeroAxisPosition::from_value(macd_now);
        let golden = macd_prev <= signal_prev && macd_now > signal_now;
        let death = macd_prev >= signal_prev && macd_now < signal_now;
        let fresh = is_fresh_cross(&macd, index);

        log::debug!(
            "MACD 분류: index {}, {}, 골든 {}, 데드 {}, 첫 교차 {}",
            index,
            position,
            golden,
            death,
            fresh
        );

        let mut signal = if golden {
            let (strength, reason) = match position {
                ZeroAxisPosition::Above => {
                    let base = if fresh { 9.0 } else { 7.0 };
                    (base, SignalReason::GoldenCrossAboveZero)
                }
                ZeroAxisPosition::Near => {
                    let base = if fresh { 9.0 } else { 7.0 };
                    (base * 0.7, SignalReason::GoldenCrossNearZero)
                }
                ZeroAxisPosition::Below => (4.0, SignalReason::GoldenCrossBelowZero),
            };
            ClassifiedSignal::new(SignalAction::Buy, SignalDirection::Bullish, strength, reason)
        } else if death {
            let (strength, reason) = match position {
                ZeroAxisPosition::Above => (-7.0, SignalReason::DeathCrossAboveZero),
                ZeroAxisPosition::Near => (-7.0 * 0.7, SignalReason::DeathCrossNearZero),
                ZeroAxisPosition::Below => (-9.0, SignalReason::DeathCrossBelowZero),
            };
            ClassifiedSignal::new(SignalAction::Sell, SignalDirection::Bearish, strength, reason)
        } else if position == ZeroAxisPosition::Above && is_histogram_shrinking(&macd, index) {
            ClassifiedSignal::new(
                SignalAction::Reduce,
                SignalDirection::Bearish,
                -3.0,
                SignalReason::HistogramShrinking,
            )
        } else {
            return ClassifiedSignal::hold(SignalReason::NoSignal);
        };

        // 역추세 패널티: 가격이 하락 추세이면 매수 확신을 절반으로
        if signal.strength > 0.0 {
            let start = closes.len().saturating_sub(TREND_WINDOW);
            if stats::calculate_slope(&closes[start..]) < 0.0 {
                log::debug!("역추세 패널티 적용: 강도 {:.1} -> {:.1}", signal.strength, signal.strength / 2.0);
                signal.strength /= 2.0;
            }
        }

        // 약한 매수/매도 신호는 관망으로 수렴
        if matches!(signal.action, SignalAction::Buy | SignalAction::Sell)
            && signal.strength.abs() < HOLD_THRESHOLD
        {
            return ClassifiedSignal::new(
                SignalAction::Hold,
                SignalDirection::Neutral,
                signal.strength,
                SignalReason::WeakSignal,
            );
        }

        signal
    }
}

impl Default for MacdSignalAnalyzer {
    fn default() -> Self {
        MacdSignalAnalyzer::new(MacdParams::default())
    }
}

/// MACD 라인과 시그널 라인이 연속 두 시점 모두 정의된 마지막 인덱스
fn latest_pair_index(macd: &MacdSeries) -> Option<usize> {
    let len = macd.len();
    if len < 2 {
        return None;
    }

    let index = len - 1;
    if macd.is_defined_at(index) && macd.is_defined_at(index - 1) {
        Some(index)
    } else {
        None
    }
}

/// 최근 구간에서 첫 교차인지 판정합니다.
///
/// 트레일링 10개 시점에서 MACD-시그널 차이의 부호가 바뀐 횟수가
/// 1회 이하이면 새로 발생한 신호로 보고 확신을 높입니다.
fn is_fresh_cross(macd: &MacdSeries, index: usize) -> bool {
    let start = index.saturating_sub(FRESH_CROSS_WINDOW - 1).max(1);
    let mut crossings = 0;

    for i in start..=index {
        if !(macd.is_defined_at(i) && macd.is_defined_at(i - 1)) {
            continue;
        }

        let diff_prev = macd.macd_line[i - 1].unwrap_or(0.0) - macd.signal_line[i - 1].unwrap_or(0.0);
        let diff_now = macd.macd_line[i].unwrap_or(0.0) - macd.signal_line[i].unwrap_or(0.0);

        if (diff_prev <= 0.0 && diff_now > 0.0) || (diff_prev >= 0.0 && diff_now < 0.0) {
            crossings += 1;
        }
    }

    crossings <= 1
}

/// 히스토그램 절대값이 직전보다 줄었는지 확인합니다.
fn is_histogram_shrinking(macd: &MacdSeries, index: usize) -> bool {
    match (macd.histogram[index - 1], macd.histogram[index]) {
        (Some(prev), Some(now)) => now.abs() < prev.abs(),
        _ => false,
    }
}
