//! 주식 차트용 시계열 분석 엔진
//!
//! OHLCV 캔들 배열을 입력으로 받아 기술적 지표, 매물대(칩) 분포,
//! 매매 신호 분류, 섹터 대비 이탈/수렴 추세 분석 결과를 계산합니다.
//! 모든 계산은 동기적이고 입력을 변경하지 않으며, 네트워크나 저장소에
//! 접근하지 않습니다. 데이터 부족은 오류가 아니라 None으로 표현됩니다.

pub mod analyzer;
pub mod candle_store;
pub mod indicator;
pub mod model;

/// 설정 로더
pub mod config_loader;
