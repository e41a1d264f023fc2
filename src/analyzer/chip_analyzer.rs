use crate::config_loader::{ConfigError, ConfigResult, ConfigValidation};
use crate::indicator::utils::stats;
use crate::model::Candle;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 매물대 분석에 필요한 최소 캔들 수
pub const MIN_CHIP_BARS: usize = 20;

/// 매물 소멸(감쇠) 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecayMode {
    /// 매일 일정한 비율로 감쇠
    Fixed,
    /// 거래량 회전율에 따라 감쇠율이 변함
    Dynamic,
}

impl Display for DecayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecayMode::Fixed => write!(f, "고정 감쇠"),
            DecayMode::Dynamic => write!(f, "동적 감쇠"),
        }
    }
}

/// 하루 거래량을 가격 구간에 배분하는 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionKind {
    /// 고가-저가 범위에 균등 배분
    Uniform,
    /// 대표가격을 정점으로 하는 삼각형 배분
    Triangular,
}

impl Display for DistributionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistributionKind::Uniform => write!(f, "균등 분포"),
            DistributionKind::Triangular => write!(f, "삼각형 분포"),
        }
    }
}

/// 매물대 분석 매개변수를 정의하는 구조체
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChipParams {
    /// 가격 구간(빈) 개수
    pub price_bins: usize,
    /// 감쇠 계수. 고정 모드에서는 하루당 잔존 비율,
    /// 동적 모드에서는 회전율에 곱하는 계수로 사용됩니다.
    pub decay_factor: f64,
    /// 감쇠 방식
    pub decay_mode: DecayMode,
    /// 거래량 배분 방식
    pub distribution: DistributionKind,
}

impl ChipParams {
    /// 새 매물대 분석 파라미터 생성
    pub fn new(
        price_bins: usize,
        decay_factor: f64,
        decay_mode: DecayMode,
        distribution: DistributionKind,
    ) -> ChipParams {
        ChipParams {
            price_bins,
            decay_factor,
            decay_mode,
            distribution,
        }
    }
}

impl Default for ChipParams {
    fn default() -> Self {
        ChipParams {
            price_bins: 100,
            decay_factor: 0.97,
            decay_mode: DecayMode::Fixed,
            distribution: DistributionKind::Triangular,
        }
    }
}

impl Display for ChipParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chip(빈 {}, 감쇠 {:.2} {}, {})",
            self.price_bins, self.decay_factor, self.decay_mode, self.distribution
        )
    }
}

impl ConfigValidation for ChipParams {
    fn validate(&self) -> ConfigResult<()> {
        if !(50..=200).contains(&self.price_bins) {
            return Err(ConfigError::ValidationError(
                "가격 구간 개수는 50 이상 200 이하여야 합니다".to_string(),
            ));
        }

        if !(0.5..=0.99).contains(&self.decay_factor) {
            return Err(ConfigError::ValidationError(
                "감쇠 계수는 0.5 이상 0.99 이하여야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

/// 매물대 봉우리 (지지/저항 후보)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChipPeak {
    /// 봉우리의 가격 수준
    pub price: f64,
    /// 봉우리의 매물량
    pub amount: f64,
}

/// 매물대 분포 분석 결과
///
/// 과거 거래량을 최근일수록 무겁게 가격 구간별로 누적한 히스토그램과
/// 파생 통계를 담는 불변 값 객체입니다.
#[derive(Debug, Clone, Serialize)]
pub struct ChipDistribution {
    /// 각 구간의 중심 가격 (순증가, 균등 간격)
    pub price_levels: Vec<f64>,
    /// 각 구간에 누적된 매물량
    pub chip_amounts: Vec<f64>,
    /// 거래량 가중 평균 매수 단가
    pub avg_cost: f64,
    /// 현재 종가보다 낮은 가격대 매물의 비율 (0-100)
    pub profit_ratio: f64,
    /// 물린 매물의 비율 (100 - profit_ratio)
    pub lockup_ratio: f64,
    /// 매물 집중도 (0-100, 클수록 한 가격대에 몰림)
    pub concentration: f64,
    /// 주요 봉우리 (매물량 내림차순, 최대 3개)
    pub main_peaks: Vec<ChipPeak>,
    /// 현재가 아래에서 가장 가까운 봉우리 가격 (지지선 후보)
    pub support: Option<f64>,
    /// 현재가 위에서 가장 가까운 봉우리 가격 (저항선 후보)
    pub resistance: Option<f64>,
}

impl Display for ChipDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "매물대(평균단가 {:.2}, 수익비율 {:.1}%, 집중도 {:.1})",
            self.avg_cost, self.profit_ratio, self.concentration
        )
    }
}

/// 매물대 분포 분석기
///
/// 조회 구간의 모든 거래량을 가격 구간별 히스토그램으로 모델링합니다.
/// 하루 거래량은 그날의 고가-저가 범위에 배분되고,
/// 오래된 거래일수록 감쇠 계수만큼 가중치가 줄어듭니다.
/// 이는 보유 물량이 이후 거래로 계속 교체되는 현상을 근사합니다.
#[derive(Debug, Clone)]
pub struct ChipAnalyzer {
    params: ChipParams,
}

impl ChipAnalyzer {
    /// 새 매물대 분석기 생성
    pub fn new(params: ChipParams) -> ChipAnalyzer {
        ChipAnalyzer { params }
    }

    /// 매물대 분포를 계산합니다.
    ///
    /// 캔들이 [`MIN_CHIP_BARS`]개 미만이면 None을 반환합니다.
    /// 이는 오류가 아니라 "아직 계산할 수 없음"을 의미합니다.
    ///
    /// # Arguments
    /// * `candles` - 시간 오름차순 캔들 배열
    ///
    /// # Returns
    /// * `Option<ChipDistribution>` - 분석 결과 (데이터 부족 시 None)
    pub fn analyze<C: Candle>(&self, candles: &[C]) -> Option<ChipDistribution> {
        let n = candles.len();
        if n < MIN_CHIP_BARS {
            log::debug!("매물대 분석 생략: 캔들 {}개 (최소 {}개)", n, MIN_CHIP_BARS);
            return None;
        }

        let bins = self.params.price_bins.max(1);
        let min_price = candles.iter().map(|c| c.low_price()).fold(f64::MAX, f64::min);
        let max_price = candles
            .iter()
            .map(|c| c.high_price())
            .fold(f64::MIN, f64::max);

        // 빈 축은 조회 구간의 [최저가, 최고가]를 그대로 사용합니다.
        // 모든 캔들이 같은 가격인 완전 퇴화 구간에서만 0 폭을 피하기 위해
        // 아주 작은 폭을 부여합니다.
        let mut axis_min = min_price;
        let mut span = max_price - min_price;
        if span < f64::EPSILON {
            let pad = (min_price.abs() * 1e-6).max(1e-6);
            axis_min = min_price - pad;
            span = pad * 2.0;
        }
        let bin_size = span / bins as f64;

        let price_levels: Vec<f64> = (0..bins)
            .map(|i| axis_min + (i as f64 + 0.5) * bin_size)
            .collect();
        let mut chip_amounts = vec![0.0; bins];

        log::debug!(
            "매물대 분석: {}개 캔들, 가격 범위 [{:.2}, {:.2}], {}",
            n,
            min_price,
            max_price,
            self.params
        );

        let decay_weights = self.decay_weights(candles);

        for (day, candle) in candles.iter().enumerate() {
            let mass = candle.volume() * decay_weights[day];
            if mass <= 0.0 {
                continue;
            }
            self.spread_day_volume(candle, mass, &price_levels, bin_size, &mut chip_amounts);
        }

        let current_price = candles[n - 1].close_price();
        Some(self.derive_statistics(price_levels, chip_amounts, current_price))
    }

    /// 날짜별 감쇠 가중치를 계산합니다.
    ///
    /// 고정 모드: 끝에서 `d`일 떨어진 날의 가중치는 `decay_factor^d`.
    /// 동적 모드: 각 날의 잔존 비율이 `1 - clamp(회전율 * 계수, 0, 1)`이고,
    /// 가중치는 그 이후 날들의 잔존 비율 누적곱입니다.
    /// 회전율 입력이 없으므로 `거래량 / 구간 평균 거래량`을 회전율의
    /// 대용치로 사용합니다. 잔존 비율이 날마다 일정하면 고정 모드와 같은
    /// 거듭제곱 형태가 됩니다.
    fn decay_weights<C: Candle>(&self, candles: &[C]) -> Vec<f64> {
        let n = candles.len();

        match self.params.decay_mode {
            DecayMode::Fixed => (0..n)
                .map(|i| self.params.decay_factor.powi((n - 1 - i) as i32))
                .collect(),
            DecayMode::Dynamic => {
                let mean_volume =
                    candles.iter().map(|c| c.volume()).sum::<f64>() / n as f64;

                let retentions: Vec<f64> = candles
                    .iter()
                    .map(|c| {
                        let turnover = if mean_volume > f64::EPSILON {
                            c.volume() / mean_volume
                        } else {
                            0.0
                        };
                        1.0 - (turnover * self.params.decay_factor).clamp(0.0, 1.0)
                    })
                    .collect();

                // 뒤에서부터 누적곱: weight[i] = retention[i+1] * ... * retention[n-1]
                let mut weights = vec![1.0; n];
                for i in (0..n - 1).rev() {
                    weights[i] = weights[i + 1] * retentions[i + 1];
                }
                weights
            }
        }
    }

    /// 하루치 매물량을 그날의 가격 범위에 해당하는 빈들에 배분합니다.
    fn spread_day_volume<C: Candle>(
        &self,
        candle: &C,
        mass: f64,
        price_levels: &[f64],
        bin_size: f64,
        chip_amounts: &mut [f64],
    ) {
        let low = candle.low_price();
        let high = candle.high_price();
        let typical = candle.weighted_close_price();

        // 그날의 가격 범위에 중심이 포함되는 빈들의 가중치 수집
        let mut covered: Vec<(usize, f64)> = Vec::new();
        let mut total_weight = 0.0;

        for (i, &level) in price_levels.iter().enumerate() {
            if level < low || level > high {
                continue;
            }

            let weight = match self.params.distribution {
                DistributionKind::Uniform => 1.0,
                DistributionKind::Triangular => {
                    let max_distance = (typical - low).max(high - typical);
                    if max_distance < f64::EPSILON {
                        1.0
                    } else {
                        (1.0 - (level - typical).abs() / max_distance).max(0.0)
                    }
                }
            };

            covered.push((i, weight));
            total_weight += weight;
        }

        if total_weight > f64::EPSILON {
            for (i, weight) in covered {
                chip_amounts[i] += mass * weight / total_weight;
            }
        } else {
            // 범위에 걸친 빈 중심이 없으면 대표가격에 가장 가까운 빈에 전량 배분
            let index = (((typical - (price_levels[0] - bin_size / 2.0)) / bin_size).floor()
                as isize)
                .clamp(0, chip_amounts.len() as isize - 1) as usize;
            chip_amounts[index] += mass;
        }
    }

    /// 히스토그램에서 파생 통계를 계산합니다.
    fn derive_statistics(
        &self,
        price_levels: Vec<f64>,
        chip_amounts: Vec<f64>,
        current_price: f64,
    ) -> ChipDistribution {
        let total: f64 = chip_amounts.iter().sum();
        let mean = stats::calculate_mean(&chip_amounts);

        let (avg_cost, profit_ratio) = if total > f64::EPSILON {
            let weighted: f64 = price_levels
                .iter()
                .zip(chip_amounts.iter())
                .map(|(p, a)| p * a)
                .sum();
            let profit_mass: f64 = price_levels
                .iter()
                .zip(chip_amounts.iter())
                .filter(|(p, _)| **p < current_price)
                .map(|(_, a)| a)
                .sum();
            (weighted / total, profit_mass / total * 100.0)
        } else {
            (0.0, 0.0)
        };

        // 집중도는 매물이 실제로 쌓인 빈들만 대상으로 계산합니다.
        // 빈 빈을 포함하면 전체 빈 개수에 따라 값이 왜곡됩니다.
        let occupied: Vec<f64> = chip_amounts.iter().copied().filter(|a| *a > 0.0).collect();
        let occupied_mean = stats::calculate_mean(&occupied);
        let concentration = if occupied_mean > f64::EPSILON {
            ((1.0 - stats::calculate_stddev(&occupied) / occupied_mean) * 100.0).clamp(0.0, 100.0)
        } else {
            // 매물이 전혀 없는 평탄한 분포
            0.0
        };

        // 봉우리: 양쪽 이웃보다 크고 평균의 1.5배를 넘는 지역 극대점
        let mut peaks: Vec<ChipPeak> = Vec::new();
        if mean > f64::EPSILON {
            for i in 1..chip_amounts.len().saturating_sub(1) {
                if chip_amounts[i] > chip_amounts[i - 1]
                    && chip_amounts[i] > chip_amounts[i + 1]
                    && chip_amounts[i] > 1.5 * mean
                {
                    peaks.push(ChipPeak {
                        price: price_levels[i],
                        amount: chip_amounts[i],
                    });
                }
            }
        }

        // 현재가 기준 가장 가까운 지지/저항 봉우리
        let support = peaks
            .iter()
            .filter(|p| p.price < current_price)
            .max_by(|a, b| a.price.total_cmp(&b.price))
            .map(|p| p.price);
        let resistance = peaks
            .iter()
            .filter(|p| p.price > current_price)
            .min_by(|a, b| a.price.total_cmp(&b.price))
            .map(|p| p.price);

        // 주요 봉우리는 매물량 내림차순 최대 3개
        peaks.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        peaks.truncate(3);

        ChipDistribution {
            price_levels,
            chip_amounts,
            avg_cost,
            profit_ratio,
            lockup_ratio: 100.0 - profit_ratio,
            concentration,
            main_peaks: peaks,
            support,
            resistance,
        }
    }
}

impl Default for ChipAnalyzer {
    fn default() -> Self {
        ChipAnalyzer::new(ChipParams::default())
    }
}
