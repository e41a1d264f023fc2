use crate::indicator::{IndicatorSeries, none_series};
use crate::indicator::utils::moving_average;

/// 단순이동평균(SMA) 시계열 계산
///
/// 각 인덱스에서 직전 `period`개 값의 산술 평균을 계산합니다.
/// 데이터가 부족한 앞쪽 `period - 1`개 구간은 None입니다.
///
/// # Arguments
/// * `values` - 가격 데이터 배열 (시간 오름차순)
/// * `period` - 계산 기간
///
/// # Returns
/// * `IndicatorSeries` - 입력과 같은 길이의 SMA 시계열
pub fn calculate_sma(values: &[f64], period: usize) -> IndicatorSeries {
    if period == 0 || values.len() < period {
        return none_series(values.len());
    }

    let mut series = none_series(values.len());

    // 첫 윈도우 합계를 구한 뒤 슬라이딩으로 갱신
    let mut window_sum: f64 = values[..period].iter().sum();
    series[period - 1] = Some(window_sum / period as f64);

    for i in period..values.len() {
        window_sum += values[i] - values[i - period];
        series[i] = Some(window_sum / period as f64);
    }

    series
}

/// 지수이동평균(EMA) 시계열 계산
///
/// 첫 값을 시드로 사용하고 `k = 2 / (period + 1)` 평활 계수로 갱신합니다.
/// 시드 방식 때문에 워밍업 구간 없이 인덱스 0부터 모든 값이 정의됩니다.
///
/// # Arguments
/// * `values` - 가격 데이터 배열 (시간 오름차순)
/// * `period` - 계산 기간
///
/// # Returns
/// * `IndicatorSeries` - 입력과 같은 길이의 EMA 시계열 (모든 값 정의)
pub fn calculate_ema(values: &[f64], period: usize) -> IndicatorSeries {
    if period == 0 {
        return none_series(values.len());
    }

    ema_values(values, period).into_iter().map(Some).collect()
}

/// EMA 원시값 시계열 계산 (내부용)
///
/// MACD처럼 EMA 결과에 다시 계산을 적용하는 지표를 위해
/// Option 래핑 없이 f64 배열을 반환합니다.
pub(crate) fn ema_values(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let alpha = moving_average::calculate_ema_alpha(period);
    let mut result = Vec::with_capacity(values.len());
    let mut ema = values[0];
    result.push(ema);

    for &price in &values[1..] {
        ema = moving_average::calculate_ema_step(price, ema, alpha);
        result.push(ema);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_warmup_nulls() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sma = calculate_sma(&values, 3);

        assert_eq!(sma.len(), 5);
        assert_eq!(sma[0], None);
        assert_eq!(sma[1], None);
        // (1+2+3)/3 = 2
        assert_eq!(sma[2], Some(2.0));
        // (2+3+4)/3 = 3
        assert_eq!(sma[3], Some(3.0));
        // (3+4+5)/3 = 4
        assert_eq!(sma[4], Some(4.0));
    }

    #[test]
    fn test_sma_exact_window_mean() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0];
        let period = 4;
        let sma = calculate_sma(&values, period);

        for i in 0..values.len() {
            if i < period - 1 {
                assert_eq!(sma[i], None);
            } else {
                let expected: f64 =
                    values[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
                assert!((sma[i].unwrap() - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_sma_insufficient_data() {
        let values = [1.0, 2.0];
        let sma = calculate_sma(&values, 5);
        assert_eq!(sma, vec![None, None]);
    }

    #[test]
    fn test_sma_zero_period() {
        let values = [1.0, 2.0, 3.0];
        let sma = calculate_sma(&values, 0);
        assert!(sma.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        let values = [10.0, 11.0, 12.0];
        let ema = calculate_ema(&values, 3);

        // 첫 값이 시드
        assert_eq!(ema[0], Some(10.0));

        // k = 2/(3+1) = 0.5
        // ema[1] = 11*0.5 + 10*0.5 = 10.5
        assert!((ema[1].unwrap() - 10.5).abs() < 1e-9);
        // ema[2] = 12*0.5 + 10.5*0.5 = 11.25
        assert!((ema[2].unwrap() - 11.25).abs() < 1e-9);
    }

    #[test]
    fn test_ema_no_warmup_gap() {
        let values = [5.0, 6.0, 7.0, 8.0];
        let ema = calculate_ema(&values, 20);

        // 기간보다 데이터가 짧아도 모든 값이 정의됨
        assert_eq!(ema.len(), 4);
        assert!(ema.iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_ema_constant_input() {
        let values = [42.0; 10];
        let ema = calculate_ema(&values, 5);

        // 상수 입력이면 EMA도 상수
        for value in ema {
            assert!((value.unwrap() - 42.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(calculate_sma(&[], 5).is_empty());
        assert!(calculate_ema(&[], 5).is_empty());
    }
}
