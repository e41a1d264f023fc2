use log::{debug, error, info};
use serde::de::DeserializeOwned;
use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use stock_analytics::analyzer::{ChipParams, CompositeParams, CrossParams, TrendParams};
use stock_analytics::config_loader::{ConfigFormat, ConfigLoader, ConfigValidation};
use stock_analytics::indicator::bband::BollingerParams;
use stock_analytics::indicator::macd::MacdParams;
use stock_analytics::indicator::stoch_rsi::StochRsiParams;
use stock_analytics::indicator::utils::IndicatorSetParams;

/// 파일에서 분석 파라미터를 읽어 검증 결과를 출력합니다.
fn load_and_report<T>(label: &str, path: &Path)
where
    T: DeserializeOwned + ConfigValidation + Display,
{
    info!("{} 설정 로드 시작: {}", label, path.display());

    match ConfigLoader::load_from_file::<T>(path, ConfigFormat::Auto) {
        Ok(params) => {
            info!("{} 설정 로드 성공", label);
            println!("설정 로드 성공:");
            println!("{}", params);
        }
        Err(err) => {
            error!("{} 설정 로드 실패: {}", label, err);
            println!("설정 로드 실패: {}", err);

            let message = err.to_string();
            if message.contains("파일") {
                println!("해결 방법: 설정 파일 경로를 확인하세요.");
            } else if message.contains("파싱") {
                println!("해결 방법: 설정 파일 형식(JSON/TOML)이 올바른지 확인하세요.");
            } else {
                println!("해결 방법: 설정 값이 유효 범위 내에 있는지 확인하세요.");
            }
        }
    }
}

fn main() {
    // 로그 초기화
    env_logger::init();

    info!("분석 설정 로더 시작");

    let args: Vec<String> = env::args().collect();
    debug!("커맨드 라인 인수: {:?}", args);

    if args.len() < 2 {
        error!("인수가 충분하지 않습니다. 분석 종류가 필요합니다.");
        println!("사용법: {} <분석_종류> [설정_파일_경로]", args[0]);
        println!(
            "지원되는 분석 종류: macd, bollinger, stoch_rsi, chip, cross, composite, trend, indicator_set"
        );
        return;
    }

    let kind = args[1].as_str();
    debug!("분석 종류: {}", kind);

    // 설정 파일 경로 (지정되지 않은 경우 기본 경로 사용)
    let config_path = if args.len() >= 3 {
        debug!("사용자 지정 설정 파일 사용: {}", args[2]);
        PathBuf::from(&args[2])
    } else {
        let path = PathBuf::from(format!("config/{}.toml", kind));
        debug!("기본 설정 파일 경로 사용: {}", path.display());
        path
    };

    if !config_path.exists() {
        println!(
            "경고: 설정 파일이 존재하지 않습니다: {}",
            config_path.display()
        );
    }

    println!("분석 종류: {}", kind);
    println!("설정 파일: {}", config_path.display());

    match kind {
        "macd" => load_and_report::<MacdParams>("MACD", &config_path),
        "bollinger" => load_and_report::<BollingerParams>("볼린저밴드", &config_path),
        "stoch_rsi" => load_and_report::<StochRsiParams>("스토캐스틱 RSI", &config_path),
        "chip" => load_and_report::<ChipParams>("매집 분포", &config_path),
        "cross" => load_and_report::<CrossParams>("이동평균 교차", &config_path),
        "composite" => load_and_report::<CompositeParams>("복합 신호", &config_path),
        "trend" => load_and_report::<TrendParams>("추세 분석", &config_path),
        "indicator_set" => load_and_report::<IndicatorSetParams>("지표 묶음", &config_path),
        _ => {
            error!("지원되지 않는 분석 종류: {}", kind);
            println!("지원되지 않는 분석 종류: {}", kind);
            println!(
                "지원되는 분석 종류: macd, bollinger, stoch_rsi, chip, cross, composite, trend, indicator_set"
            );
        }
    }

    info!("분석 설정 로더 종료");
}
