// 분석기 모듈
// 매집/분산 추정, 교차 탐지, 신호 분류, 이탈/수렴 추세 분석 도구를 제공합니다.

pub mod chip_analyzer;
pub mod composite_analyzer;
pub mod cross_analyzer;
pub mod macd_analyzer;
pub mod trend_analyzer;

pub use chip_analyzer::{
    ChipAnalyzer, ChipDistribution, ChipParams, ChipPeak, DecayMode, DistributionKind,
};
pub use composite_analyzer::{CompositeAnalyzer, CompositeParams};
pub use cross_analyzer::{CrossAnalyzer, CrossParams};
pub use macd_analyzer::{MacdSignalAnalyzer, ZeroAxisPosition};
pub use trend_analyzer::{
    PeriodKind, TrendAnalysis, TrendAnalyzer, TrendKind, TrendParams, TrendSegment,
};
