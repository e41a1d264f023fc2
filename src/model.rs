use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// OHLCV 캔들 데이터 접근 트레이트
///
/// 분석 엔진의 모든 계산은 이 트레이트를 통해 캔들 데이터에 접근합니다.
/// 구체적인 캔들 타입은 이 트레이트를 구현하면 모든 지표와 분석기에서 사용할 수 있습니다.
pub trait Candle: Clone + PartialEq + Debug + Display {
    /// 캔들의 기준 시각
    fn datetime(&self) -> DateTime<Utc>;

    /// 시가
    fn open_price(&self) -> f64;

    /// 고가
    fn high_price(&self) -> f64;

    /// 저가
    fn low_price(&self) -> f64;

    /// 종가
    fn close_price(&self) -> f64;

    /// 거래량
    fn volume(&self) -> f64;

    /// 대표 가격 (고가 + 저가 + 종가) / 3
    ///
    /// VWAP, CCI 등의 지표 계산에 사용됩니다.
    fn typical_price(&self) -> f64 {
        (self.high_price() + self.low_price() + self.close_price()) / 3.0
    }

    /// 종가 가중 평균 가격 (고가 + 저가 + 종가*2) / 4
    ///
    /// 매물대 분석에서 하루 거래의 중심 가격으로 사용됩니다.
    fn weighted_close_price(&self) -> f64 {
        (self.high_price() + self.low_price() + 2.0 * self.close_price()) / 4.0
    }

    /// 캔들의 가격 범위 (고가 - 저가)
    fn price_range(&self) -> f64 {
        self.high_price() - self.low_price()
    }
}

/// 일반적인 주식 캔들 데이터
///
/// 외부 데이터 소스로부터 받은 OHLCV 데이터를 표현하는 기본 구현체입니다.
/// 날짜는 UTC 기준이며, 직렬화 시 RFC 3339 문자열로 표현됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockBar {
    /// 캔들 기준 시각
    pub datetime: DateTime<Utc>,
    /// 시가
    pub open: f64,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: f64,
}

impl StockBar {
    /// 새로운 StockBar 인스턴스를 생성합니다.
    ///
    /// # Arguments
    /// * `datetime` - 캔들 기준 시각
    /// * `open` - 시가
    /// * `high` - 고가
    /// * `low` - 저가
    /// * `close` - 종가
    /// * `volume` - 거래량 (음수가 아니어야 함)
    ///
    /// # Returns
    /// * `StockBar` - 생성된 캔들 인스턴스
    pub fn new(
        datetime: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> StockBar {
        StockBar {
            datetime,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl Display for StockBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} O:{:.2} H:{:.2} L:{:.2} C:{:.2} V:{:.0}",
            self.datetime.format("%Y-%m-%d %H:%M"),
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume
        )
    }
}

impl Candle for StockBar {
    fn datetime(&self) -> DateTime<Utc> {
        self.datetime
    }

    fn open_price(&self) -> f64 {
        self.open
    }

    fn high_price(&self) -> f64 {
        self.high
    }

    fn low_price(&self) -> f64 {
        self.low
    }

    fn close_price(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

/// 이동평균 교차의 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrossKind {
    /// 골든 크로스 (단기선이 장기선을 상향 돌파)
    Golden,
    /// 데드 크로스 (단기선이 장기선을 하향 돌파)
    Death,
}

impl Display for CrossKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrossKind::Golden => write!(f, "골든 크로스"),
            CrossKind::Death => write!(f, "데드 크로스"),
        }
    }
}

/// 이동평균 교차 시점에 발생한 매매 신호
///
/// 교차가 발생한 캔들의 시각과 종가를 함께 기록합니다.
/// 발생 순서대로 시간 오름차순으로 생성됩니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingSignal {
    /// 교차가 발생한 캔들의 시각
    pub datetime: DateTime<Utc>,
    /// 교차 종류
    pub kind: CrossKind,
    /// 교차가 발생한 캔들의 종가
    pub price: f64,
}

impl Display for TradingSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} @ {:.2}",
            self.datetime.format("%Y-%m-%d %H:%M"),
            self.kind,
            self.price
        )
    }
}

/// 분류된 매매 액션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalAction {
    /// 적극 매수
    StrongBuy,
    /// 매수
    Buy,
    /// 주의 매수
    CautionBuy,
    /// 비중 축소
    Reduce,
    /// 관망
    Hold,
    /// 주의 매도
    CautionSell,
    /// 매도
    Sell,
    /// 적극 매도
    StrongSell,
}

impl Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalAction::StrongBuy => write!(f, "적극 매수"),
            SignalAction::Buy => write!(f, "매수"),
            SignalAction::CautionBuy => write!(f, "주의 매수"),
            SignalAction::Reduce => write!(f, "비중 축소"),
            SignalAction::Hold => write!(f, "관망"),
            SignalAction::CautionSell => write!(f, "주의 매도"),
            SignalAction::Sell => write!(f, "매도"),
            SignalAction::StrongSell => write!(f, "적극 매도"),
        }
    }
}

/// 신호의 방향성
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalDirection {
    /// 상승 방향
    Bullish,
    /// 하락 방향
    Bearish,
    /// 중립
    Neutral,
}

impl Display for SignalDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalDirection::Bullish => write!(f, "상승"),
            SignalDirection::Bearish => write!(f, "하락"),
            SignalDirection::Neutral => write!(f, "중립"),
        }
    }
}

/// 신호 분류 근거 코드
///
/// 분류기가 어떤 분기에서 결론을 냈는지 나타냅니다.
/// UI 문자열이 아니라 변형(variant)으로 표현하여 누락 없이 처리할 수 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalReason {
    /// 0축 위에서 발생한 골든 크로스
    GoldenCrossAboveZero,
    /// 0축 부근에서 발생한 골든 크로스
    GoldenCrossNearZero,
    /// 0축 아래에서 발생한 골든 크로스
    GoldenCrossBelowZero,
    /// 0축 위에서 발생한 데드 크로스
    DeathCrossAboveZero,
    /// 0축 부근에서 발생한 데드 크로스
    DeathCrossNearZero,
    /// 0축 아래에서 발생한 데드 크로스
    DeathCrossBelowZero,
    /// 0축 위에서 히스토그램이 축소 (모멘텀 둔화)
    HistogramShrinking,
    /// 교차는 있었으나 강도가 관망 기준에 미달
    WeakSignal,
    /// 상승 모멘텀 + RSI 과매도 (반등 매수)
    MomentumWithOversold,
    /// 상승 모멘텀 + RSI 동조
    MomentumBullish,
    /// 하락 모멘텀 + RSI 과매수 (고점 매도)
    MomentumWithOverbought,
    /// 하락 모멘텀 + RSI 동조
    MomentumBearish,
    /// 모멘텀과 RSI가 상반됨
    MomentumAgainstRsi,
    /// 모멘텀 없이 RSI만 과매수
    OverboughtOnly,
    /// 모멘텀 없이 RSI만 과매도
    OversoldOnly,
    /// 교차 없음
    NoSignal,
    /// 데이터 부족
    InsufficientData,
}

impl Display for SignalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalReason::GoldenCrossAboveZero => write!(f, "0축 위 골든 크로스"),
            SignalReason::GoldenCrossNearZero => write!(f, "0축 부근 골든 크로스"),
            SignalReason::GoldenCrossBelowZero => write!(f, "0축 아래 골든 크로스"),
            SignalReason::DeathCrossAboveZero => write!(f, "0축 위 데드 크로스"),
            SignalReason::DeathCrossNearZero => write!(f, "0축 부근 데드 크로스"),
            SignalReason::DeathCrossBelowZero => write!(f, "0축 아래 데드 크로스"),
            SignalReason::HistogramShrinking => write!(f, "히스토그램 축소"),
            SignalReason::WeakSignal => write!(f, "약한 신호"),
            SignalReason::MomentumWithOversold => write!(f, "상승 모멘텀 + 과매도"),
            SignalReason::MomentumBullish => write!(f, "상승 모멘텀"),
            SignalReason::MomentumWithOverbought => write!(f, "하락 모멘텀 + 과매수"),
            SignalReason::MomentumBearish => write!(f, "하락 모멘텀"),
            SignalReason::MomentumAgainstRsi => write!(f, "모멘텀과 RSI 상반"),
            SignalReason::OverboughtOnly => write!(f, "RSI 과매수"),
            SignalReason::OversoldOnly => write!(f, "RSI 과매도"),
            SignalReason::NoSignal => write!(f, "신호 없음"),
            SignalReason::InsufficientData => write!(f, "데이터 부족"),
        }
    }
}

/// 분류된 매매 신호
///
/// 액션, 방향, 부호 있는 강도(-10 ~ 10), 판단 근거를 함께 담습니다.
/// 강도의 절대값이 클수록 신호의 확신이 높습니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassifiedSignal {
    /// 매매 액션
    pub action: SignalAction,
    /// 신호 방향
    pub direction: SignalDirection,
    /// 신호 강도 (-10 ~ 10)
    pub strength: f64,
    /// 판단 근거
    pub reason: SignalReason,
}

impl ClassifiedSignal {
    /// 새 분류 신호 생성
    pub fn new(
        action: SignalAction,
        direction: SignalDirection,
        strength: f64,
        reason: SignalReason,
    ) -> ClassifiedSignal {
        ClassifiedSignal {
            action,
            direction,
            strength,
            reason,
        }
    }

    /// 관망 신호 생성
    pub fn hold(reason: SignalReason) -> ClassifiedSignal {
        ClassifiedSignal::new(SignalAction::Hold, SignalDirection::Neutral, 0.0, reason)
    }
}

impl Display for ClassifiedSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, 강도 {:.1}, {})",
            self.action, self.direction, self.strength, self.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bar() -> StockBar {
        StockBar::new(
            Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap(),
            100.0,
            110.0,
            90.0,
            105.0,
            1000.0,
        )
    }

    #[test]
    fn test_typical_price() {
        let bar = sample_bar();
        // (110 + 90 + 105) / 3
        assert!((bar.typical_price() - 101.666_666_666_666_67).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_close_price() {
        let bar = sample_bar();
        // (110 + 90 + 2*105) / 4
        assert!((bar.weighted_close_price() - 102.5).abs() < 1e-9);
    }

    #[test]
    fn test_price_range() {
        let bar = sample_bar();
        assert!((bar.price_range() - 20.0).abs() < 1e-9);
    }
}
