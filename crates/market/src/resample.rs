//! 日线到周线、月线的重采样。

use chrono::Datelike;
use rust_decimal::Decimal;
use tdxq_core::common::KlinePeriod;
use tdxq_core::market::entity::{KLineBar, KLineSeries};
use tdxq_core::market::error::MarketError;

/// # Summary
/// 将日线序列合并为周线 (ISO 周) 或月线。
///
/// # Logic
/// 1. 按时间正序遍历日线，以 (ISO 年, ISO 周) 或 (年, 月) 分组。
/// 2. 组内首根决定开盘价与昨收，末根决定收盘价与时间；最高、最低取极值，成交量与成交额累加。
/// 3. 结果重新按最近一根在前排列。
///
/// # Arguments
/// * `series`: 日线序列。
/// * `period`: 目标周期，仅支持 `Day` (原样返回)、`Week`、`Month`。
///
/// # Returns
/// 成功返回合并后的序列，其余周期返回 `InvalidArgument`。
pub fn resample(series: &KLineSeries, period: KlinePeriod) -> Result<KLineSeries, MarketError> {
    let key: fn(&KLineBar) -> (i32, u32) = match period {
        KlinePeriod::Day => return Ok(series.clone()),
        KlinePeriod::Week => week_key,
        KlinePeriod::Month => month_key,
        other => {
            return Err(MarketError::InvalidArgument(format!(
                "cannot resample daily bars into {}",
                other
            )));
        }
    };

    let mut merged: Vec<KLineBar> = Vec::new();
    let mut current_key = None;

    for bar in series.bars().iter().rev() {
        let bar_key = key(bar);
        match merged.last_mut() {
            Some(acc) if current_key == Some(bar_key) => merge_into(acc, bar),
            _ => merged.push(bar.clone()),
        }
        current_key = Some(bar_key);
    }

    merged.reverse();
    KLineSeries::new(merged)
}

fn week_key(bar: &KLineBar) -> (i32, u32) {
    let week = bar.time.iso_week();
    (week.year(), week.week())
}

fn month_key(bar: &KLineBar) -> (i32, u32) {
    (bar.time.year(), bar.time.month())
}

fn merge_into(acc: &mut KLineBar, bar: &KLineBar) {
    if bar.high > acc.high {
        acc.high = bar.high;
    }
    // 停牌日最低价可能为 0，此时以后续有效值为准
    if bar.low < acc.low || acc.low == Decimal::ZERO {
        acc.low = bar.low;
    }
    acc.close = bar.close;
    acc.volume += bar.volume;
    acc.turnover += bar.turnover;
    acc.time = bar.time;
}
