use crate::analyzer::macd_analyzer::MacdSignalAnalyzer;
use crate::config_loader::{ConfigError, ConfigResult, ConfigValidation};
use crate::indicator::macd::MacdParams;
use crate::indicator::rsi::{RsiZone, latest_rsi};
use crate::model::{Candle, ClassifiedSignal, SignalAction, SignalDirection, SignalReason};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 복합 신호 분류 매개변수를 정의하는 구조체
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeParams {
    /// MACD 파라미터
    pub macd: MacdParams,
    /// RSI 기간
    pub rsi_period: usize,
}

impl Default for CompositeParams {
    fn default() -> Self {
        CompositeParams {
            macd: MacdParams::default(),
            rsi_period: 14,
        }
    }
}

impl Display for CompositeParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Composite({}, RSI{})", self.macd, self.rsi_period)
    }
}

impl ConfigValidation for CompositeParams {
    fn validate(&self) -> ConfigResult<()> {
        if self.rsi_period == 0 {
            return Err(ConfigError::ValidationError(
                "RSI 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        self.macd.validate()?;
        Ok(())
    }
}

/// MACD + RSI 복합 신호 분류기
///
/// MACD 분류기의 방향 판단과 RSI 구간을 고정 대응표로 결합합니다.
/// 학습 모델이 아니라 결정적 테이블이며, 강도는 ±9 / ±7 / ±4로 고정됩니다.
#[derive(Debug, Clone)]
pub struct CompositeAnalyzer {
    params: CompositeParams,
    macd_analyzer: MacdSignalAnalyzer,
}

impl CompositeAnalyzer {
    /// 새 복합 분류기 생성
    pub fn new(params: CompositeParams) -> CompositeAnalyzer {
        CompositeAnalyzer {
            params,
            macd_analyzer: MacdSignalAnalyzer::new(params.macd),
        }
    }

    /// MACD 방향과 RSI 구간을 결합해 매매 신호를 분류합니다.
    ///
    /// 대응표:
    ///
    /// | MACD 방향 | RSI 구간        | 결과                |
    /// |-----------|-----------------|---------------------|
    /// | 상승      | 과매도          | 적극 매수 (+9)      |
    /// | 상승      | 상승/중립       | 매수 (+7)           |
    /// | 상승      | 과매수/하락     | 주의 매수 (+4)      |
    /// | 하락      | 과매수          | 적극 매도 (-9)      |
    /// | 하락      | 하락/중립       | 매도 (-7)           |
    /// | 하락      | 과매도/상승     | 주의 매도 (-4)      |
    /// | 중립      | 과매수          | 주의 매도 (-4)      |
    /// | 중립      | 과매도          | 주의 매수 (+4)      |
    /// | 중립      | 그 외           | 관망 (0)            |
    ///
    /// # Arguments
    /// * `candles` - 시간 오름차순 캔들 배열
    ///
    /// # Returns
    /// * `ClassifiedSignal` - 분류된 매매 신호
    pub fn classify<C: Candle>(&self, candles: &[C]) -> ClassifiedSignal {
        let closes: Vec<f64> = candles.iter().map(|c| c.close_price()).collect();

        let Some(rsi) = latest_rsi(&closes, self.params.rsi_period) else {
            return ClassifiedSignal::hold(SignalReason::InsufficientData);
        };
        let zone = RsiZone::from_value(rsi);

        let macd_signal = self.macd_analyzer.classify(candles);

        log::debug!(
            "복합 분류: MACD {} / RSI {:.1} ({})",
            macd_signal.direction,
            rsi,
            zone
        );

        // 비중 축소(히스토그램 둔화)는 방향성 모멘텀이 아니므로 중립으로 취급
        let momentum = match macd_signal.action {
            SignalAction::StrongBuy | SignalAction::Buy | SignalAction::CautionBuy => {
                SignalDirection::Bullish
            }
            SignalAction::StrongSell | SignalAction::Sell | SignalAction::CautionSell => {
                SignalDirection::Bearish
            }
            SignalAction::Reduce | SignalAction::Hold => SignalDirection::Neutral,
        };

        match momentum {
            SignalDirection::Bullish => match zone {
                RsiZone::Oversold => ClassifiedSignal::new(
                    SignalAction::StrongBuy,
                    SignalDirection::Bullish,
                    9.0,
                    SignalReason::MomentumWithOversold,
                ),
                RsiZone::Bullish | RsiZone::Neutral => ClassifiedSignal::new(
                    SignalAction::Buy,
                    SignalDirection::Bullish,
                    7.0,
                    SignalReason::MomentumBullish,
                ),
                RsiZone::Overbought | RsiZone::Bearish => ClassifiedSignal::new(
                    SignalAction::CautionBuy,
                    SignalDirection::Bullish,
                    4.0,
                    SignalReason::MomentumAgainstRsi,
                ),
            },
            SignalDirection::Bearish => match zone {
                RsiZone::Overbought => ClassifiedSignal::new(
                    SignalAction::StrongSell,
                    SignalDirection::Bearish,
                    -9.0,
                    SignalReason::MomentumWithOverbought,
                ),
                RsiZone::Bearish | RsiZone::Neutral => ClassifiedSignal::new(
                    SignalAction::Sell,
                    SignalDirection::Bearish,
                    -7.0,
                    SignalReason::MomentumBearish,
                ),
                RsiZone::Oversold | RsiZone::Bullish => ClassifiedSignal::new(
                    SignalAction::CautionSell,
                    SignalDirection::Bearish,
                    -4.0,
                    SignalReason::MomentumAgainstRsi,
                ),
            },
            SignalDirection::Neutral => match zone {
                RsiZone::Overbought => ClassifiedSignal::new(
                    SignalAction::CautionSell,
                    SignalDirection::Bearish,
                    -4.0,
                    SignalReason::OverboughtOnly,
                ),
                RsiZone::Oversold => ClassifiedSignal::new(
                    SignalAction::CautionBuy,
                    SignalDirection::Bullish,
                    4.0,
                    SignalReason::OversoldOnly,
                ),
                RsiZone::Bullish | RsiZone::Neutral | RsiZone::Bearish => {
                    ClassifiedSignal::hold(SignalReason::NoSignal)
                }
            },
        }
    }
}

impl Default for CompositeAnalyzer {
    fn default() -> Self {
        CompositeAnalyzer::new(CompositeParams::default())
    }
}
