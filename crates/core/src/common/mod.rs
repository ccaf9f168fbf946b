use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod units;

/// # Summary
/// 交易所筛选条件，用于代码列表等按市场划分的查询。
///
/// # Invariants
/// - 线上名称全部为小写 (`sh`, `sz`, `bj`, `all`)。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    // 上海证券交易所
    Sh,
    // 深圳证券交易所
    Sz,
    // 北京证券交易所
    Bj,
    // 不限交易所
    All,
}

impl Exchange {
    /// 返回服务端识别的交易所名称。
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Sh => "sh",
            Exchange::Sz => "sz",
            Exchange::Bj => "bj",
            Exchange::All => "all",
        }
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sh" => Ok(Exchange::Sh),
            "sz" => Ok(Exchange::Sz),
            "bj" => Ok(Exchange::Bj),
            "" | "all" => Ok(Exchange::All),
            _ => Err(format!("Unknown Exchange: {}", s)),
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Summary
/// K 线周期枚举，取值与服务端 `type` 查询参数一一对应。
///
/// # Invariants
/// - 日、周、月线由服务端做前复权处理，分钟线与小时线不复权。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum KlinePeriod {
    // 1分钟
    Minute1,
    // 5分钟
    Minute5,
    // 15分钟
    Minute15,
    // 30分钟
    Minute30,
    // 60分钟
    Hour,
    // 日线
    Day,
    // 周线
    Week,
    // 月线
    Month,
}

impl KlinePeriod {
    /// 返回服务端识别的周期名称。
    pub fn as_str(&self) -> &'static str {
        match self {
            KlinePeriod::Minute1 => "minute1",
            KlinePeriod::Minute5 => "minute5",
            KlinePeriod::Minute15 => "minute15",
            KlinePeriod::Minute30 => "minute30",
            KlinePeriod::Hour => "hour",
            KlinePeriod::Day => "day",
            KlinePeriod::Week => "week",
            KlinePeriod::Month => "month",
        }
    }
}

impl FromStr for KlinePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" | "minute1" => Ok(KlinePeriod::Minute1),
            "5m" | "minute5" => Ok(KlinePeriod::Minute5),
            "15m" | "minute15" => Ok(KlinePeriod::Minute15),
            "30m" | "minute30" => Ok(KlinePeriod::Minute30),
            "1h" | "hour" => Ok(KlinePeriod::Hour),
            "1d" | "day" => Ok(KlinePeriod::Day),
            "1w" | "week" => Ok(KlinePeriod::Week),
            "1mo" | "month" => Ok(KlinePeriod::Month),
            _ => Err(format!("Unknown KlinePeriod: {}", s)),
        }
    }
}

impl std::fmt::Display for KlinePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
