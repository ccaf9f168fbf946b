//! 均线与趋势判断。输入一律为最近一根在前的 `KLineSeries`。

use rust_decimal::Decimal;
use tdxq_core::market::entity::{IndicatorSnapshot, KLineSeries, Trend};
use tdxq_core::market::error::MarketError;

pub const MA_SHORT: usize = 5;
pub const MA_MID: usize = 10;
pub const MA_LONG: usize = 20;

/// # Summary
/// 计算最近 `window` 根 K 线收盘价的算术平均。
///
/// # Logic
/// 1. `window == 0` 无意义，返回 `InvalidArgument`。
/// 2. 序列长度不足 `window` 返回 `InsufficientData`，不截断、不补零。
/// 3. 取序列前缀 (即最近的 `window` 根) 求均值。
///
/// # Arguments
/// * `series`: 倒序 K 线序列。
/// * `window`: 均线窗口。
///
/// # Returns
/// 成功返回均值。
pub fn moving_average(series: &KLineSeries, window: usize) -> Result<Decimal, MarketError> {
    if window == 0 {
        return Err(MarketError::InvalidArgument(
            "moving average window must be positive".to_string(),
        ));
    }
    if series.len() < window {
        return Err(MarketError::InsufficientData {
            required: window,
            available: series.len(),
        });
    }

    let sum: Decimal = series.bars().iter().take(window).map(|b| b.close).sum();
    Ok(sum / Decimal::from(window))
}

/// # Summary
/// 根据三条均线的排列判断趋势。
///
/// # Logic
/// 严格全序比较，任意相等都归为 `Choppy`。
pub fn trend(ma5: Decimal, ma10: Decimal, ma20: Decimal) -> Trend {
    if ma5 > ma10 && ma10 > ma20 {
        Trend::Bullish
    } else if ma5 < ma10 && ma10 < ma20 {
        Trend::Bearish
    } else {
        Trend::Choppy
    }
}

/// # Summary
/// 生成 MA5/MA10/MA20 与趋势快照。
///
/// # Logic
/// 1. 先检查序列至少有 `MA_LONG` 根，不满足直接失败，不产出部分结果。
/// 2. 依次计算三条均线并判断趋势。
pub fn snapshot(series: &KLineSeries) -> Result<IndicatorSnapshot, MarketError> {
    let current = match series.latest() {
        Some(bar) if series.len() >= MA_LONG => bar.close,
        _ => {
            return Err(MarketError::InsufficientData {
                required: MA_LONG,
                available: series.len(),
            });
        }
    };

    let ma5 = moving_average(series, MA_SHORT)?;
    let ma10 = moving_average(series, MA_MID)?;
    let ma20 = moving_average(series, MA_LONG)?;

    Ok(IndicatorSnapshot {
        current,
        ma5,
        ma10,
        ma20,
        trend: trend(ma5, ma10, ma20),
    })
}
