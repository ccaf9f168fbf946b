//! Record Mapper：把原始报文记录逐字段换算为领域实体。
//!
//! 缺失字段一律返回 `MarketError::Mapping`，不做任何缺省填充；五档顺序原样保留。

use chrono::{DateTime, FixedOffset, NaiveTime};
use tdxq_core::common::units::{
    to_decimal_price, to_lot_volume_aggregate, to_lot_volume_from_depth, to_turnover,
};
use tdxq_core::market::entity::{
    DepthLevel, KLineBar, KLineSeries, MinuteBar, NormalizedQuote, TradeSide, TradeTick,
};
use tdxq_core::market::error::MarketError;
use tdxq_core::market::raw::{
    RawDepthLevel, RawKLineRecord, RawMinuteRecord, RawQuoteRecord, RawTradeRecord,
};

fn required<T: Copy>(value: Option<T>, field: &str) -> Result<T, MarketError> {
    value.ok_or_else(|| MarketError::missing(field))
}

fn parse_timestamp(value: Option<&str>, field: &str) -> Result<DateTime<FixedOffset>, MarketError> {
    let raw = value.ok_or_else(|| MarketError::missing(field))?;
    DateTime::parse_from_rfc3339(raw)
        .map_err(|e| MarketError::Mapping(format!("invalid `{}` {:?}: {}", field, raw, e)))
}

/// # Summary
/// 映射一条五档行情记录。
///
/// # Logic
/// 1. 校验 `Code`, `K`, `TotalHand`, `Amount`, `BuyLevel`, `SellLevel` 均存在。
/// 2. 价格与成交额除以 1000，五档挂单量除以 100，总成交量原样保留。
/// 3. 五档按原顺序逐档映射。
///
/// # Arguments
/// * `raw`: 原始行情记录。
///
/// # Returns
/// 成功返回归一化行情，缺少字段时返回 `MarketError::Mapping`。
pub fn map_quote(raw: &RawQuoteRecord) -> Result<NormalizedQuote, MarketError> {
    let code = raw.code.clone().ok_or_else(|| MarketError::missing("Code"))?;
    let k = raw.k.as_ref().ok_or_else(|| MarketError::missing("K"))?;
    let buy = raw
        .buy_level
        .as_deref()
        .ok_or_else(|| MarketError::missing("BuyLevel"))?;
    let sell = raw
        .sell_level
        .as_deref()
        .ok_or_else(|| MarketError::missing("SellLevel"))?;

    Ok(NormalizedQuote {
        code,
        open: to_decimal_price(required(k.open, "K.Open")?),
        high: to_decimal_price(required(k.high, "K.High")?),
        low: to_decimal_price(required(k.low, "K.Low")?),
        close: to_decimal_price(required(k.close, "K.Close")?),
        last: to_decimal_price(required(k.last, "K.Last")?),
        volume_lots: to_lot_volume_aggregate(required(raw.total_hand, "TotalHand")?),
        turnover: to_turnover(required(raw.amount, "Amount")?),
        buy_levels: map_depth(buy, "BuyLevel")?,
        sell_levels: map_depth(sell, "SellLevel")?,
    })
}

fn map_depth(levels: &[RawDepthLevel], side: &str) -> Result<Vec<DepthLevel>, MarketError> {
    levels
        .iter()
        .enumerate()
        .map(|(i, level)| {
            let price = level
                .price
                .ok_or_else(|| MarketError::missing(format!("{side}[{i}].Price")))?;
            let number = level
                .number
                .ok_or_else(|| MarketError::missing(format!("{side}[{i}].Number")))?;
            Ok::<_, MarketError>(DepthLevel {
                price: to_decimal_price(price),
                volume_lots: to_lot_volume_from_depth(number),
            })
        })
        .collect()
}

/// 映射一组行情记录，任意一条失败则整体失败。
pub fn map_quotes(raw: &[RawQuoteRecord]) -> Result<Vec<NormalizedQuote>, MarketError> {
    raw.iter().map(map_quote).collect()
}

/// # Summary
/// 映射一条 K 线记录。
///
/// # Logic
/// 1. `Time` 按 RFC 3339 解析，保留服务端时区。
/// 2. 价格与成交额除以 1000，成交量为整手。
pub fn map_kline(raw: &RawKLineRecord) -> Result<KLineBar, MarketError> {
    Ok(KLineBar {
        time: parse_timestamp(raw.time.as_deref(), "Time")?,
        open: to_decimal_price(required(raw.open, "Open")?),
        high: to_decimal_price(required(raw.high, "High")?),
        low: to_decimal_price(required(raw.low, "Low")?),
        close: to_decimal_price(required(raw.close, "Close")?),
        prev_close: to_decimal_price(required(raw.last, "Last")?),
        volume: required(raw.volume, "Volume")?,
        turnover: to_turnover(required(raw.amount, "Amount")?),
    })
}

/// # Summary
/// 映射 K 线列表并构造倒序序列。
///
/// # Logic
/// 1. 逐条映射。
/// 2. 交给 `KLineSeries::new` 统一为最近一根在前，并校验顺序。
pub fn map_kline_series(raw: &[RawKLineRecord]) -> Result<KLineSeries, MarketError> {
    let bars = raw.iter().map(map_kline).collect::<Result<Vec<_>, _>>()?;
    KLineSeries::new(bars)
}

/// 映射一条分时记录，`Time` 形如 `09:31`。
pub fn map_minute(raw: &RawMinuteRecord) -> Result<MinuteBar, MarketError> {
    let time_str = raw.time.as_deref().ok_or_else(|| MarketError::missing("Time"))?;
    let time = NaiveTime::parse_from_str(time_str, "%H:%M")
        .map_err(|e| MarketError::Mapping(format!("invalid `Time` {:?}: {}", time_str, e)))?;
    Ok(MinuteBar {
        time,
        price: to_decimal_price(required(raw.price, "Price")?),
        volume: required(raw.number, "Number")?,
    })
}

pub fn map_minutes(raw: &[RawMinuteRecord]) -> Result<Vec<MinuteBar>, MarketError> {
    raw.iter().map(map_minute).collect()
}

/// 映射一条逐笔成交记录。
pub fn map_trade(raw: &RawTradeRecord) -> Result<TradeTick, MarketError> {
    Ok(TradeTick {
        time: parse_timestamp(raw.time.as_deref(), "Time")?,
        price: to_decimal_price(required(raw.price, "Price")?),
        volume: required(raw.volume, "Volume")?,
        side: TradeSide::from_status(required(raw.status, "Status")?),
    })
}

pub fn map_trades(raw: &[RawTradeRecord]) -> Result<Vec<TradeTick>, MarketError> {
    raw.iter().map(map_trade).collect()
}
