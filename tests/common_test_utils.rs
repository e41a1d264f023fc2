use chrono::{DateTime, Utc};
use stock_analytics::model::StockBar;

/// 테스트용 타임스탬프 (일 단위 간격)
pub fn bar_time(index: usize) -> DateTime<Utc> {
    DateTime::from_timestamp(index as i64 * 86_400, 0).unwrap_or_default()
}

/// 꾸준히 상승하는 캔들 시계열 생성
pub fn create_uptrend_bars(count: usize, base_price: f64, step: f64) -> Vec<StockBar> {
    (0..count)
        .map(|i| {
            let price = base_price + i as f64 * step;
            StockBar::new(
                bar_time(i),
                price - step / 2.0,
                price + step,
                price - step,
                price + step / 2.0,
                1000.0,
            )
        })
        .collect()
}

/// 꾸준히 하락하는 캔들 시계열 생성
pub fn create_downtrend_bars(count: usize, base_price: f64, step: f64) -> Vec<StockBar> {
    (0..count)
        .map(|i| {
            let price = base_price - i as f64 * step;
            StockBar::new(
                bar_time(i),
                price + step / 2.0,
                price + step,
                price - step,
                price - step / 2.0,
                1000.0,
            )
        })
        .collect()
}

/// 사인파 형태로 진동하는 캔들 시계열 생성
pub fn create_oscillating_bars(count: usize, base_price: f64, amplitude: f64) -> Vec<StockBar> {
    (0..count)
        .map(|i| {
            let close = base_price + (i as f64 * 0.35).sin() * amplitude;
            StockBar::new(
                bar_time(i),
                close - 0.2,
                close + 0.5,
                close - 0.5,
                close,
                1000.0 + (i % 5) as f64 * 100.0,
            )
        })
        .collect()
}

/// 가격 변동이 없는 캔들 시계열 생성
pub fn create_flat_bars(count: usize, price: f64) -> Vec<StockBar> {
    (0..count)
        .map(|i| StockBar::new(bar_time(i), price, price, price, price, 1000.0))
        .collect()
}
