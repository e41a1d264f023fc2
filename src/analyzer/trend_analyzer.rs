use crate::config_loader::{ConfigResult, ConfigValidation};
use crate::indicator::rsi::latest_rsi;
use crate::indicator::utils::stats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

/// 분석 대상 기간 종류
///
/// 윈도우 크기와 임계값의 기본값을 고르는 용도로만 사용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodKind {
    /// 장중 (분봉)
    Intraday,
    /// 일봉
    Daily,
}

impl Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodKind::Intraday => write!(f, "장중"),
            PeriodKind::Daily => write!(f, "일봉"),
        }
    }
}

/// 이탈/수렴 추세 분석 매개변수를 정의하는 구조체
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendParams {
    /// 기간 종류
    pub period: PeriodKind,
}

impl TrendParams {
    /// 새 추세 분석 파라미터 생성
    pub fn new(period: PeriodKind) -> TrendParams {
        TrendParams { period }
    }

    /// 데이터 길이에 맞춘 적응형 윈도우 크기
    pub fn window_size(&self, data_len: usize) -> usize {
        match self.period {
            PeriodKind::Intraday => (data_len / 4).clamp(5, 20),
            PeriodKind::Daily => (data_len / 3).clamp(10, 30),
        }
    }

    /// 유효한 추세로 인정하는 최소 구간 길이
    pub fn min_trend_length(&self, window_size: usize) -> usize {
        match self.period {
            PeriodKind::Intraday => (window_size / 3).max(3),
            PeriodKind::Daily => (window_size / 2).max(5),
        }
    }

    /// 이탈률 변화 기준의 바탕 임계값
    fn base_threshold(&self) -> f64 {
        match self.period {
            PeriodKind::Intraday => 0.1,
            PeriodKind::Daily => 0.5,
        }
    }

    /// RSI 차이의 (이탈, 수렴) 임계값
    fn rsi_thresholds(&self) -> (f64, f64) {
        match self.period {
            PeriodKind::Intraday => (15.0, 10.0),
            PeriodKind::Daily => (25.0, 20.0),
        }
    }
}

impl Default for TrendParams {
    fn default() -> Self {
        TrendParams {
            period: PeriodKind::Daily,
        }
    }
}

impl Display for TrendParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trend({})", self.period)
    }
}

impl ConfigValidation for TrendParams {
    fn validate(&self) -> ConfigResult<()> {
        // 기간 종류 외의 설정이 없으므로 항상 유효
        Ok(())
    }
}

/// 추세 구간의 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendKind {
    /// 기준 시계열에서 멀어지는 구간
    Divergence,
    /// 기준 시계열에 다가가는 구간
    Convergence,
}

impl Display for TrendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendKind::Divergence => write!(f, "이탈"),
            TrendKind::Convergence => write!(f, "수렴"),
        }
    }
}

/// 탐지된 추세 구간
///
/// 인덱스는 입력 시계열 기준이며 양끝을 포함합니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendSegment {
    /// 구간 종류
    pub kind: TrendKind,
    /// 시작 인덱스 (포함)
    pub start_index: usize,
    /// 끝 인덱스 (포함)
    pub end_index: usize,
    /// 구간 강도 (0 이상, 클수록 뚜렷한 추세)
    pub strength: f64,
    /// 구간에 대한 두 시계열의 피어슨 상관계수 [-1, 1]
    pub correlation: f64,
}

impl Display for TrendSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}-{}] 강도 {:.2}, 상관 {:.2}",
            self.kind, self.start_index, self.end_index, self.strength, self.correlation
        )
    }
}

/// 이탈/수렴 추세 분석 결과
#[derive(Debug, Clone, Serialize)]
pub struct TrendAnalysis {
    /// 시간 순서의 겹치지 않는 추세 구간 목록
    pub segments: Vec<TrendSegment>,
    /// 사용된 적응형 윈도우 크기
    pub window_size: usize,
    /// 사용된 최소 추세 길이
    pub min_trend_length: usize,
}

impl Display for TrendAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "추세 분석(구간 {}개, 윈도우 {}, 최소 길이 {})",
            self.segments.len(),
            self.window_size,
            self.min_trend_length
        )
    }
}

/// 시계열을 시작점 대비 백분율 변화로 정규화합니다.
///
/// 서로 스케일이 다른 종목과 섹터 지수를 같은 축에서 비교하기 위한
/// 전처리입니다. 시작값이 0이면 전체를 0으로 돌려줍니다.
///
/// # Arguments
/// * `values` - 원시 가격 시계열
///
/// # Returns
/// * `Vec<f64>` - 시작점 대비 % 변화 시계열 (첫 값은 0)
pub fn normalize_percent_series(values: &[f64]) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };

    if first.abs() < f64::EPSILON {
        return vec![0.0; values.len()];
    }

    values.iter().map(|v| (v / first - 1.0) * 100.0).collect()
}

/// 종목-기준 시계열 이탈/수렴 추세 분석기
///
/// 종목과 기준(섹터) 시계열을 정규화한 뒤, 두 시계열의 편차 변화율,
/// 롤링 상관계수 변화, 윈도우 RSI 차이라는 세 가지 독립 신호를
/// 가중 합산해 이탈/수렴 여부를 점수로 판정합니다.
/// 단일 조건의 논리곱이 아니라 셋 중 둘 이상이 동의해야 추세로 봅니다.
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    params: TrendParams,
}

impl TrendAnalyzer {
    /// 새 추세 분석기 생성
    pub fn new(params: TrendParams) -> TrendAnalyzer {
        TrendAnalyzer { params }
    }

    /// 두 원시 가격 시계열에서 이탈/수렴 구간을 탐지합니다.
    ///
    /// 두 시계열은 같은 시간축에 정렬되어 있어야 하며,
    /// 길이가 다르면 짧은 쪽에 맞춰 자릅니다.
    ///
    /// 판정은 인덱스마다 다음 세 신호의 가중 점수(0-1)로 이뤄집니다.
    /// - 편차 절대값의 윈도우 변화량 vs 적응형 임계값 (가중치 0.4)
    /// - 롤링 상관계수 변화 vs ±0.1 (가중치 0.3)
    /// - 두 시계열의 윈도우 RSI 차이 vs 고정 임계값 (가중치 0.3)
    ///
    /// 점수가 0.6 이상이면(신호 두 개 이상 동의) 해당 상태로 전이하고,
    /// 상태가 바뀔 때 직전 구간이 최소 길이를 넘으면 결과에 기록합니다.
    ///
    /// 롤링 상관계수는 `(시작, 끝)` 키로 메모이즈합니다. 캐시는 이 호출
    /// 안에서만 살아 있으며, 긴 시계열에서 겹치는 윈도우의 재계산을
    /// 막아 계산량을 거의 선형으로 유지합니다.
    ///
    /// # Arguments
    /// * `stock` - 종목 가격 시계열 (시간 오름차순)
    /// * `reference` - 기준(섹터) 가격 시계열 (시간 오름차순)
    ///
    /// # Returns
    /// * `TrendAnalysis` - 겹치지 않는 시간순 추세 구간 목록
    pub fn analyze(&self, stock: &[f64], reference: &[f64]) -> TrendAnalysis {
        let n = stock.len().min(reference.len());
        let stock = &stock[..n];
        let reference = &reference[..n];

        let window = self.params.window_size(n);
        let min_trend_length = self.params.min_trend_length(window);

        if n <= window {
            return TrendAnalysis {
                segments: Vec::new(),
                window_size: window,
                min_trend_length,
            };
        }

        let stock_norm = normalize_percent_series(stock);
        let reference_norm = normalize_percent_series(reference);
        let deviation: Vec<f64> = stock_norm
            .iter()
            .zip(reference_norm.iter())
            .map(|(s, r)| s - r)
            .collect();

        // 편차의 변동성이 클수록 임계값을 높여 노이즈 구간의 오탐을 줄임
        let deviation_stddev = stats::calculate_stddev(&deviation);
        let deviation_threshold =
            self.params.base_threshold() * (1.0 + (deviation_stddev / 10.0).min(2.0));
        let (rsi_div_threshold, rsi_conv_threshold) = self.params.rsi_thresholds();
        let rsi_period = 14.min(window);

        log::debug!(
            "추세 분석: {}개 지점, 윈도우 {}, 최소 길이 {}, 편차 임계값 {:.3}",
            n,
            window,
            min_trend_length,
            deviation_threshold
        );

        // 호출 단위로 살아 있는 상관계수 메모 테이블
        let mut correlation_memo: HashMap<(usize, usize), f64> = HashMap::new();
        let correlation = |memo: &mut HashMap<(usize, usize), f64>, start: usize, end: usize| {
            *memo.entry((start, end)).or_insert_with(|| {
                stats::calculate_pearson(&stock[start..=end], &reference[start..=end])
            })
        };

        let mut segments = Vec::new();
        let mut open_segment: Option<(TrendKind, usize)> = None;

        for i in window..n {
            let win_start = i - window;

            let corr_now = correlation(&mut correlation_memo, win_start, i);
            let corr_change = if win_start > 0 {
                corr_now - correlation(&mut correlation_memo, win_start - 1, i - 1)
            } else {
                0.0
            };

            let deviation_change = deviation[i].abs() - deviation[win_start].abs();

            let rsi_diff = match (
                latest_rsi(&stock[win_start..=i], rsi_period),
                latest_rsi(&reference[win_start..=i], rsi_period),
            ) {
                (Some(s), Some(r)) => Some((s - r).abs()),
                _ => None,
            };

            let divergence_score = weighted_score(
                deviation_change > deviation_threshold,
                corr_change < -0.1,
                rsi_diff.is_some_and(|d| d > rsi_div_threshold),
            );
            let convergence_score = weighted_score(
                deviation_change < -deviation_threshold,
                corr_change > 0.1,
                rsi_diff.is_some_and(|d| d < rsi_conv_threshold),
            );

            let state = if divergence_score >= 0.6 {
                Some(TrendKind::Divergence)
            } else if convergence_score >= 0.6 {
                Some(TrendKind::Convergence)
            } else {
                None
            };

            match (open_segment, state) {
                (Some((kind, start)), new_state) if new_state != Some(kind) => {
                    // 상태 전이: 열려 있던 구간을 닫음
                    let end = i - 1;
                    if end + 1 - start >= min_trend_length {
                        let corr = correlation(&mut correlation_memo, start, end);
                        segments.push(build_segment(kind, start, end, corr, &deviation));
                    }
                    open_segment = new_state.map(|kind| (kind, i));
                }
                (None, Some(kind)) => {
                    open_segment = Some((kind, i));
                }
                _ => {}
            }
        }

        // 시계열 끝에서 열려 있는 구간 마감
        if let Some((kind, start)) = open_segment {
            let end = n - 1;
            if end + 1 - start >= min_trend_length {
                let corr = correlation(&mut correlation_memo, start, end);
                segments.push(build_segment(kind, start, end, corr, &deviation));
            }
        }

        TrendAnalysis {
            segments,
            window_size: window,
            min_trend_length,
        }
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        TrendAnalyzer::new(TrendParams::default())
    }
}

/// 세 신호의 가중 점수 (0.4 + 0.3 + 0.3)
fn weighted_score(deviation_signal: bool, correlation_signal: bool, rsi_signal: bool) -> f64 {
    let mut score = 0.0;
    if deviation_signal {
        score += 0.4;
    }
    if correlation_signal {
        score += 0.3;
    }
    if rsi_signal {
        score += 0.3;
    }
    score
}

/// 구간 강도를 계산해 추세 구간을 만듭니다.
///
/// 강도는 편차 변화의 크기에 방향 일관성(추세 방향으로 움직인 스텝 비율)을
/// 곱한 값입니다. 구간 후반부의 변화가 전반부보다 크면(가속)
/// 1.2배 보너스를 줍니다.
fn build_segment(
    kind: TrendKind,
    start: usize,
    end: usize,
    correlation: f64,
    deviation: &[f64],
) -> TrendSegment {
    let total_change = (deviation[end].abs() - deviation[start].abs()).abs();

    let steps = end - start;
    let mut consistent = 0usize;
    for i in start + 1..=end {
        let widening = deviation[i].abs() >= deviation[i - 1].abs();
        let matches_kind = match kind {
            TrendKind::Divergence => widening,
            TrendKind::Convergence => !widening,
        };
        if matches_kind {
            consistent += 1;
        }
    }
    let continuity = if steps > 0 {
        consistent as f64 / steps as f64
    } else {
        0.0
    };

    let mut strength = total_change * (0.5 + 0.5 * continuity);

    // 가속 보너스: 후반부 움직임이 전반부보다 크면 추세가 강해지는 중
    let mid = (start + end) / 2;
    let first_half = (deviation[mid].abs() - deviation[start].abs()).abs();
    let second_half = (deviation[end].abs() - deviation[mid].abs()).abs();
    if second_half > first_half {
        strength *= 1.2;
    }

    TrendSegment {
        kind,
        start_index: start,
        end_index: end,
        strength,
        correlation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 기준 시계열: 완만한 상승
    fn reference_series(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn test_empty_and_short_input() {
        let analyzer = TrendAnalyzer::default();

        let empty = analyzer.analyze(&[], &[]);
        assert!(empty.segments.is_empty());

        let short = analyzer.analyze(&[100.0, 101.0], &[100.0, 100.5]);
        assert!(short.segments.is_empty());
    }

    #[test]
    fn test_identical_series_no_divergence() {
        // 완전히 같은 시계열은 편차가 0이므로 이탈 구간이 없음
        let series: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.2).sin() * 5.0).collect();
        let analysis = TrendAnalyzer::default().analyze(&series, &series);

        assert!(
            analysis
                .segments
                .iter()
                .all(|s| s.kind != TrendKind::Divergence)
        );
    }

    #[test]
    fn test_divergence_detected_on_breakaway() {
        // 횡보하는 기준 대비 후반부에 급등해 이탈하는 종목:
        // 편차 확대와 RSI 격차가 함께 발생해야 이탈로 판정됨
        let n = 120;
        let reference: Vec<f64> = (0..n)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 0.5)
            .collect();
        let stock: Vec<f64> = (0..n)
            .map(|i| {
                if i < 60 {
                    100.0
                } else {
                    100.0 + (i - 60) as f64 * 1.5
                }
            })
            .collect();

        let analysis = TrendAnalyzer::default().analyze(&stock, &reference);
        assert!(
            analysis
                .segments
                .iter()
                .any(|s| s.kind == TrendKind::Divergence)
        );
    }

    #[test]
    fn test_segments_non_overlapping_and_ordered() {
        let n = 200;
        let reference = reference_series(n);
        let stock: Vec<f64> = (0..n)
            .map(|i| 100.0 + i as f64 * 0.1 + (i as f64 * 0.15).sin() * 12.0)
            .collect();

        let analysis = TrendAnalyzer::default().analyze(&stock, &reference);

        for segment in &analysis.segments {
            assert!(segment.start_index <= segment.end_index);
            assert!(segment.end_index + 1 - segment.start_index >= analysis.min_trend_length);
            assert!(segment.strength >= 0.0);
            assert!(segment.correlation >= -1.0 && segment.correlation <= 1.0);
        }

        for pair in analysis.segments.windows(2) {
            assert!(pair[0].end_index < pair[1].start_index);
        }
    }

    #[test]
    fn test_window_sizing_intraday_vs_daily() {
        let intraday = TrendParams::new(PeriodKind::Intraday);
        let daily = TrendParams::new(PeriodKind::Daily);

        // 장중: clamp(n/4, 5, 20)
        assert_eq!(intraday.window_size(12), 5);
        assert_eq!(intraday.window_size(40), 10);
        assert_eq!(intraday.window_size(400), 20);

        // 일봉: clamp(n/3, 10, 30)
        assert_eq!(daily.window_size(12), 10);
        assert_eq!(daily.window_size(60), 20);
        assert_eq!(daily.window_size(400), 30);

        // 최소 추세 길이
        assert_eq!(intraday.min_trend_length(5), 3);
        assert_eq!(intraday.min_trend_length(20), 6);
        assert_eq!(daily.min_trend_length(10), 5);
        assert_eq!(daily.min_trend_length(30), 15);
    }

    #[test]
    fn test_analysis_idempotent() {
        let n = 150;
        let reference = reference_series(n);
        let stock: Vec<f64> = (0..n)
            .map(|i| 100.0 + (i as f64 * 0.25).sin() * 8.0)
            .collect();

        let analyzer = TrendAnalyzer::default();
        let first = analyzer.analyze(&stock, &reference);
        let second = analyzer.analyze(&stock, &reference);

        assert_eq!(first.segments, second.segments);
    }

    #[test]
    fn test_normalize_percent_series() {
        let normalized = normalize_percent_series(&[100.0, 110.0, 90.0]);
        assert!((normalized[0]).abs() < 1e-9);
        assert!((normalized[1] - 10.0).abs() < 1e-9);
        assert!((normalized[2] + 10.0).abs() < 1e-9);

        // 시작값이 0이면 전체가 0
        let zero_start = normalize_percent_series(&[0.0, 5.0]);
        assert_eq!(zero_start, vec![0.0, 0.0]);

        assert!(normalize_percent_series(&[]).is_empty());
    }

    #[test]
    fn test_mismatched_lengths_truncated() {
        let stock: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let reference: Vec<f64> = (0..80).map(|i| 100.0 + i as f64 * 0.5).collect();

        // 짧은 쪽 길이에 맞춰 동작하고 패닉하지 않아야 함
        let analysis = TrendAnalyzer::default().analyze(&stock, &reference);
        for segment in &analysis.segments {
            assert!(segment.end_index < 80);
        }
    }
}
