use crate::market::error::MarketError;
use chrono::{DateTime, FixedOffset, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// # Summary
/// 单档挂单的归一化视图。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    // 挂单价 (元)
    pub price: Decimal,
    // 挂单量 (手)
    pub volume_lots: Decimal,
}

/// # Summary
/// 归一化后的五档行情。
///
/// # Invariants
/// - 所有价格为元，`volume_lots` 为整手，`turnover` 为元。
/// - `buy_levels` / `sell_levels` 保持服务端给出的最优到最差顺序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedQuote {
    pub code: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    // 最新价
    pub close: Decimal,
    // 昨收价
    pub last: Decimal,
    pub volume_lots: Decimal,
    pub turnover: Decimal,
    pub buy_levels: Vec<DepthLevel>,
    pub sell_levels: Vec<DepthLevel>,
}

/// # Summary
/// 单根 K 线。
///
/// # Invariants
/// - `high` 通常大于或等于 `low`, `open`, `close`，但上游数据不做校正。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KLineBar {
    // K 线时间 (服务端时区)
    pub time: DateTime<FixedOffset>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    // 上一根 K 线的收盘价，服务端未提供时为 0
    pub prev_close: Decimal,
    // 成交量 (手)
    pub volume: i64,
    // 成交额 (元)
    pub turnover: Decimal,
}

impl KLineBar {
    /// 相对开盘价的涨跌额。
    pub fn change(&self) -> Decimal {
        self.close - self.open
    }

    /// # Summary
    /// 相对开盘价的涨跌幅 (百分比)。
    ///
    /// # Logic
    /// 开盘价不大于 0 时返回 0，避免除零。
    pub fn change_pct(&self) -> Decimal {
        if self.open > Decimal::ZERO {
            self.change() / self.open * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }
}

/// # Summary
/// 按时间倒序排列的 K 线序列，下标 0 为最近一根。
///
/// # Invariants
/// - 相邻元素满足 `bars[i].time >= bars[i + 1].time`。
/// - 只能通过 `KLineSeries::new` 构造，构造时校验顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KLineSeries {
    bars: Vec<KLineBar>,
}

impl KLineSeries {
    /// # Summary
    /// 从服务端返回的 K 线列表构造倒序序列。
    ///
    /// # Logic
    /// 1. 若首根早于末根，视为正序 (最旧在前) 输入，整体反转。
    /// 2. 校验反转后的序列时间单调不增。
    ///
    /// # Arguments
    /// * `bars`: 正序或倒序的 K 线列表。
    ///
    /// # Returns
    /// 顺序合法时返回序列，否则返回 `MarketError::Mapping`。
    pub fn new(mut bars: Vec<KLineBar>) -> Result<Self, MarketError> {
        let chronological = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => first.time < last.time,
            _ => false,
        };
        if chronological {
            debug!("Reversing {} chronological bars to most-recent-first", bars.len());
            bars.reverse();
        }

        if let Some(pos) = bars.windows(2).position(|w| w[0].time < w[1].time) {
            return Err(MarketError::Mapping(format!(
                "kline bars out of order at index {}",
                pos + 1
            )));
        }

        Ok(Self { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 最近一根 K 线。
    pub fn latest(&self) -> Option<&KLineBar> {
        self.bars.first()
    }

    /// 倒序的只读切片。
    pub fn bars(&self) -> &[KLineBar] {
        &self.bars
    }

    /// 取最近 `n` 根组成新序列，不足时全部返回。
    pub fn take_recent(&self, n: usize) -> KLineSeries {
        Self {
            bars: self.bars.iter().take(n).cloned().collect(),
        }
    }
}

/// # Summary
/// 分时数据点。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteBar {
    pub time: NaiveTime,
    pub price: Decimal,
    // 成交量 (手)
    pub volume: i64,
}

/// # Summary
/// 逐笔成交方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
    Neutral,
}

impl TradeSide {
    /// 服务端编码：0 买入，1 卖出，其余为中性盘。
    pub fn from_status(status: i64) -> Self {
        match status {
            0 => TradeSide::Buy,
            1 => TradeSide::Sell,
            _ => TradeSide::Neutral,
        }
    }
}

/// # Summary
/// 逐笔成交。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeTick {
    pub time: DateTime<FixedOffset>,
    pub price: Decimal,
    // 成交量 (手)
    pub volume: i64,
    pub side: TradeSide,
}

/// # Summary
/// 批量行情条目：行情本身加上相对昨收的涨跌。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchQuoteEntry {
    pub quote: NormalizedQuote,
    // close - last
    pub change: Decimal,
    // change / last * 100，昨收不大于 0 时为 0
    pub change_pct: Decimal,
}

/// # Summary
/// 涨跌平家数统计。
///
/// # Invariants
/// - `up + down + flat` 等于参与统计的条目数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketTally {
    pub up: usize,
    pub down: usize,
    pub flat: usize,
}

impl MarketTally {
    pub fn total(&self) -> usize {
        self.up + self.down + self.flat
    }
}

/// # Summary
/// 均线排列形态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    // 多头排列 ma5 > ma10 > ma20
    Bullish,
    // 空头排列 ma5 < ma10 < ma20
    Bearish,
    // 其余情况，包括任意相等
    Choppy,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Bullish => write!(f, "多头排列"),
            Trend::Bearish => write!(f, "空头排列"),
            Trend::Choppy => write!(f, "震荡盘整"),
        }
    }
}

/// # Summary
/// 技术指标快照。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    // 最近一根 K 线的收盘价
    pub current: Decimal,
    pub ma5: Decimal,
    pub ma10: Decimal,
    pub ma20: Decimal,
    pub trend: Trend,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn bar(day: i64, close: Decimal) -> KLineBar {
        let base = FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 15, 0, 0)
            .unwrap();
        KLineBar {
            time: base + Duration::days(day),
            open: dec!(10),
            high: close,
            low: close,
            close,
            prev_close: Decimal::ZERO,
            volume: 100,
            turnover: Decimal::ZERO,
        }
    }

    #[test]
    fn test_series_reverses_chronological_input() {
        let series = KLineSeries::new(vec![bar(0, dec!(1)), bar(1, dec!(2)), bar(2, dec!(3))])
            .unwrap();
        assert_eq!(series.latest().map(|b| b.close), Some(dec!(3)));
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_take_recent_keeps_newest_first() {
        let series = KLineSeries::new(vec![bar(0, dec!(1)), bar(1, dec!(2)), bar(2, dec!(3))])
            .unwrap();
        let recent = series.take_recent(2);
        let closes: Vec<Decimal> = recent.bars().iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![dec!(3), dec!(2)]);
        assert_eq!(series.take_recent(10).len(), 3);
    }

    #[test]
    fn test_series_rejects_unordered_input() {
        let result = KLineSeries::new(vec![bar(2, dec!(1)), bar(0, dec!(2)), bar(1, dec!(3))]);
        assert!(matches!(result, Err(MarketError::Mapping(_))));
    }

    #[test]
    fn test_bar_change_pct_guards_zero_open() {
        let mut b = bar(0, dec!(11));
        assert_eq!(b.change_pct(), dec!(10));
        b.open = Decimal::ZERO;
        assert_eq!(b.change_pct(), Decimal::ZERO);
    }

    #[test]
    fn test_trade_side_from_status() {
        assert_eq!(TradeSide::from_status(0), TradeSide::Buy);
        assert_eq!(TradeSide::from_status(1), TradeSide::Sell);
        assert_eq!(TradeSide::from_status(2), TradeSide::Neutral);
    }
}
