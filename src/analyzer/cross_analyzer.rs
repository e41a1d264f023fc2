use crate::config_loader::{ConfigError, ConfigResult, ConfigValidation};
use crate::indicator::ma::calculate_sma;
use crate::model::{Candle, CrossKind, TradingSignal};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 이동평균 교차 탐지 매개변수를 정의하는 구조체
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossParams {
    /// 단기 이동평균 기간
    pub fast_period: usize,
    /// 장기 이동평균 기간
    pub slow_period: usize,
}

impl CrossParams {
    /// 새 교차 탐지 파라미터 생성
    pub fn new(fast_period: usize, slow_period: usize) -> CrossParams {
        CrossParams {
            fast_period,
            slow_period,
        }
    }
}

impl Default for CrossParams {
    fn default() -> Self {
        CrossParams {
            fast_period: 5,
            slow_period: 10,
        }
    }
}

impl Display for CrossParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cross({},{})", self.fast_period, self.slow_period)
    }
}

impl ConfigValidation for CrossParams {
    fn validate(&self) -> ConfigResult<()> {
        if self.fast_period == 0 || self.slow_period == 0 {
            return Err(ConfigError::ValidationError(
                "이동평균 기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if self.fast_period >= self.slow_period {
            return Err(ConfigError::ValidationError(
                "단기 기간은 장기 기간보다 작아야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

/// 이동평균 골든/데드 크로스 탐지기
///
/// 단기 SMA가 장기 SMA를 상향 돌파하면 골든 크로스,
/// 하향 돌파하면 데드 크로스 신호를 발생 시각 순서대로 기록합니다.
#[derive(Debug, Clone)]
pub struct CrossAnalyzer {
    params: CrossParams,
}

impl CrossAnalyzer {
    /// 새 교차 탐지기 생성
    pub fn new(params: CrossParams) -> CrossAnalyzer {
        CrossAnalyzer { params }
    }

    /// 캔들 배열에서 교차 신호를 모두 탐지합니다.
    ///
    /// 두 이동평균의 워밍업 구간 길이가 다르므로,
    /// 양쪽 모두 값이 정의된 인덱스 쌍만 비교합니다.
    /// 두 값이 같은 경우는 아직 교차가 아니며 엄격한 부등호가
    /// 뒤집힐 때만 신호가 발생합니다.
    ///
    /// # Arguments
    /// * `candles` - 시간 오름차순 캔들 배열
    ///
    /// # Returns
    /// * `Vec<TradingSignal>` - 시간 오름차순 교차 신호 목록
    pub fn detect<C: Candle>(&self, candles: &[C]) -> Vec<TradingSignal> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close_price()).collect();
        let fast = calculate_sma(&closes, self.params.fast_period);
        let slow = calculate_sma(&closes, self.params.slow_period);

        let mut signals = Vec::new();

        for i in 1..candles.len() {
            let (Some(prev_fast), Some(prev_slow), Some(now_fast), Some(now_slow)) =
                (fast[i - 1], slow[i - 1], fast[i], slow[i])
            else {
                continue;
            };

            let kind = if prev_fast <= prev_slow && now_fast > now_slow {
                CrossKind::Golden
            } else if prev_fast >= prev_slow && now_fast < now_slow {
                CrossKind::Death
            } else {
                continue;
            };

            log::debug!(
                "{} 탐지: {} @ {:.2}",
                kind,
                candles[i].datetime(),
                closes[i]
            );

            signals.push(TradingSignal {
                datetime: candles[i].datetime(),
                kind,
                price: closes[i],
            });
        }

        signals
    }
}

impl Default for CrossAnalyzer {
    fn default() -> Self {
        CrossAnalyzer::new(CrossParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::TestCandle;

    #[test]
    fn test_no_death_cross_in_uptrend() {
        // 순증가 시계열에서는 데드 크로스가 발생하지 않음
        let candles = TestCandle::linear_series(30, 100.0, 1.0);
        let signals = CrossAnalyzer::default().detect(&candles);

        assert!(signals.iter().all(|s| s.kind != CrossKind::Death));
    }

    #[test]
    fn test_golden_cross_after_reversal() {
        // 하락 후 상승 반전: 단기선이 장기선을 상향 돌파
        let mut candles = TestCandle::linear_series(20, 150.0, -2.0);
        let mut rebound = TestCandle::linear_series(20, 114.0, 3.0);
        candles.append(&mut rebound);

        let signals = CrossAnalyzer::default().detect(&candles);
        assert!(signals.iter().any(|s| s.kind == CrossKind::Golden));
    }

    #[test]
    fn test_death_cross_after_peak() {
        let mut candles = TestCandle::linear_series(20, 100.0, 3.0);
        let mut fall = TestCandle::linear_series(20, 155.0, -2.0);
        candles.append(&mut fall);

        let signals = CrossAnalyzer::default().detect(&candles);
        assert!(signals.iter().any(|s| s.kind == CrossKind::Death));
    }

    #[test]
    fn test_signals_chronological() {
        let candles = TestCandle::sine_series(100, 100.0, 10.0);
        let signals = CrossAnalyzer::default().detect(&candles);

        for pair in signals.windows(2) {
            assert!(pair[0].datetime < pair[1].datetime);
        }
    }

    #[test]
    fn test_alternating_cross_kinds() {
        // 교차는 방향이 번갈아 나타나야 함 (같은 방향이 연속 불가)
        let candles = TestCandle::sine_series(120, 100.0, 10.0);
        let signals = CrossAnalyzer::default().detect(&candles);

        for pair in signals.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
    }

    #[test]
    fn test_insufficient_data_no_signals() {
        let candles = TestCandle::linear_series(5, 100.0, 1.0);
        let signals = CrossAnalyzer::default().detect(&candles);
        assert!(signals.is_empty());
    }

    #[test]
    fn test_flat_market_no_signals() {
        // 평탄한 시장에서 두 이동평균은 같은 값이므로 교차 없음
        let candles = TestCandle::flat_series(30, 100.0);
        let signals = CrossAnalyzer::default().detect(&candles);
        assert!(signals.is_empty());
    }

    #[test]
    fn test_cross_params_validation() {
        assert!(CrossParams::default().validate().is_ok());
        assert!(CrossParams::new(0, 10).validate().is_err());
        assert!(CrossParams::new(10, 5).validate().is_err());
        assert!(CrossParams::new(5, 5).validate().is_err());
    }
}
