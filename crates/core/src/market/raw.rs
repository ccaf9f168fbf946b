//! 服务端原始报文结构。
//!
//! 字段命名沿用服务端 JSON (行情与 K 线为 PascalCase，搜索与代码列表为小写)。
//! 行情类字段一律声明为 `Option`，缺失由 Record Mapper 报告，而不是在反序列化阶段失败。

use crate::market::error::MarketError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// # Summary
/// 统一响应信封 `{code, message, data}`。
///
/// # Invariants
/// - `code == 0` 表示成功，其余取值均视为失败。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// # Summary
    /// 拆开信封，取出成功负载。
    ///
    /// # Logic
    /// 1. `code != 0` 返回 `EnvelopeFailure`，携带服务端 message。
    /// 2. `code == 0` 但 `data` 缺失同样视为失败。
    ///
    /// # Returns
    /// 成功返回负载，失败返回 `MarketError::EnvelopeFailure`。
    pub fn into_data(self) -> Result<T, MarketError> {
        if self.code != 0 {
            return Err(MarketError::EnvelopeFailure {
                code: self.code,
                message: self.message.unwrap_or_default(),
            });
        }
        self.data.ok_or_else(|| MarketError::EnvelopeFailure {
            code: self.code,
            message: "data absent".to_string(),
        })
    }
}

/// # Summary
/// 五档行情原始记录。
///
/// # Invariants
/// - 价格、成交额为厘 (×1000)，`TotalHand` 为整手，五档 `Number` 为 1/100 手。
/// - `BuyLevel` / `SellLevel` 由服务端按最优到最差排序。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawQuoteRecord {
    pub code: Option<String>,
    #[serde(rename = "K")]
    pub k: Option<RawQuoteK>,
    pub total_hand: Option<i64>,
    pub amount: Option<i64>,
    pub buy_level: Option<Vec<RawDepthLevel>>,
    pub sell_level: Option<Vec<RawDepthLevel>>,
}

/// 行情记录中的 `K` 子对象，`Last` 为昨收价。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawQuoteK {
    pub open: Option<i64>,
    pub high: Option<i64>,
    pub low: Option<i64>,
    pub close: Option<i64>,
    pub last: Option<i64>,
}

/// 单档挂单。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDepthLevel {
    pub price: Option<i64>,
    pub number: Option<i64>,
}

/// # Summary
/// K 线原始记录。
///
/// # Invariants
/// - `Time` 为 RFC 3339 时间串，`Volume` 为整手，其余价格字段为厘。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawKLineRecord {
    pub time: Option<String>,
    pub open: Option<i64>,
    pub high: Option<i64>,
    pub low: Option<i64>,
    pub close: Option<i64>,
    pub last: Option<i64>,
    pub volume: Option<i64>,
    pub amount: Option<i64>,
}

/// 分时原始记录，`Time` 形如 `09:31`。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawMinuteRecord {
    pub time: Option<String>,
    pub price: Option<i64>,
    pub number: Option<i64>,
}

/// 逐笔成交原始记录，`Status` 为买卖方向编码。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTradeRecord {
    pub time: Option<String>,
    pub price: Option<i64>,
    pub volume: Option<i64>,
    pub status: Option<i64>,
}

/// # Summary
/// K 线、分时、成交接口共用的 `{Count, List}` 包装。
///
/// # Invariants
/// - 服务端可能把空列表编码为 `null`，此时视为空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPayload<T> {
    #[serde(rename = "Count", default)]
    pub count: Option<u64>,
    #[serde(rename = "List", default = "Option::default")]
    pub list: Option<Vec<T>>,
}

impl<T> ListPayload<T> {
    /// 取出列表，`null` 视为空。
    pub fn into_list(self) -> Vec<T> {
        self.list.unwrap_or_default()
    }
}

/// 分时接口负载，额外带有实际使用的交易日 `date` (YYYYMMDD)。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinutePayload {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "Count", default)]
    pub count: Option<u64>,
    #[serde(rename = "List", default = "Option::default")]
    pub list: Option<Vec<RawMinuteRecord>>,
}

/// 搜索结果与代码列表中的单只证券。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityEntry {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exchange: Option<String>,
}

/// # Summary
/// 代码列表接口负载。
///
/// # Invariants
/// - `exchanges` 统计的是全部交易所的股票数，不受筛选条件影响；`codes` 只包含筛选后的条目。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeList {
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub exchanges: BTreeMap<String, u64>,
    #[serde(default)]
    pub codes: Vec<SecurityEntry>,
}

/// 综合信息接口负载，各部分独立缺省。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockInfo {
    #[serde(default)]
    pub quote: Option<RawQuoteRecord>,
    #[serde(default)]
    pub kline_day: Option<ListPayload<RawKLineRecord>>,
    #[serde(default)]
    pub minute: Option<MinutePayload>,
}

/// 单个交易所的涨跌统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeStats {
    pub total: u64,
    pub up: u64,
    pub down: u64,
    pub flat: u64,
}

/// 全市场统计接口负载。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStats {
    #[serde(default)]
    pub sh: ExchangeStats,
    #[serde(default)]
    pub sz: ExchangeStats,
    #[serde(default)]
    pub bj: ExchangeStats,
    #[serde(default)]
    pub update_time: Option<String>,
}

/// 健康检查响应，该接口不使用统一信封。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub time: Option<String>,
}

/// 服务运行状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
    // 是否已连上通达信行情主机
    pub connected: bool,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub uptime: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_non_zero_code_is_failure() {
        let env: Envelope<Vec<SecurityEntry>> =
            serde_json::from_str(r#"{"code":-1,"message":"股票代码不能为空","data":null}"#)
                .unwrap();
        assert_eq!(
            env.into_data(),
            Err(MarketError::EnvelopeFailure {
                code: -1,
                message: "股票代码不能为空".to_string()
            })
        );
    }

    #[test]
    fn test_envelope_missing_data_is_failure() {
        let env: Envelope<CodeList> = serde_json::from_str(r#"{"code":0}"#).unwrap();
        assert!(matches!(
            env.into_data(),
            Err(MarketError::EnvelopeFailure { code: 0, .. })
        ));
    }

    #[test]
    fn test_null_list_decodes_as_empty() {
        let payload: ListPayload<RawKLineRecord> =
            serde_json::from_str(r#"{"Count":0,"List":null}"#).unwrap();
        assert!(payload.into_list().is_empty());
    }

    #[test]
    fn test_quote_record_tolerates_missing_fields() {
        let rec: RawQuoteRecord =
            serde_json::from_str(r#"{"Code":"000001","Exchange":0,"K":{"Close":15230}}"#)
                .unwrap();
        assert_eq!(rec.code.as_deref(), Some("000001"));
        assert_eq!(rec.k.as_ref().and_then(|k| k.close), Some(15230));
        assert!(rec.buy_level.is_none());
    }
}
