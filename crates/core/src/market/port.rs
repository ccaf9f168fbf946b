use crate::common::{Exchange, KlinePeriod};
use crate::market::error::MarketError;
use crate::market::raw::{
    CodeList, HealthStatus, MarketStats, MinutePayload, RawKLineRecord, RawQuoteRecord,
    RawTradeRecord, SecurityEntry, ServerStatus, StockInfo,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// # Summary
/// 行情服务单次往返的结果。
///
/// - `Ok(Some(_))`：成功取得数据。
/// - `Ok(None)`：报文 code 非零或 data 缺失，即「无数据」。
/// - `Err(_)`：服务不可达 (`TransportUnavailable`) 或响应体无法解析 (`Decode`)。
pub type FetchResult<T> = Result<Option<T>, MarketError>;

/// # Summary
/// 远端行情服务接口 (原始数据源)。
///
/// # Invariants
/// - 每次调用是一次独立的请求/响应往返，不缓存、不重试。
/// - 返回原始报文结构，归一化由调用方的 Record Mapper 完成。
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// # Summary
    /// 获取单只证券的五档行情。
    ///
    /// # Arguments
    /// * `code`: 证券代码，例如 `000001`。
    async fn get_quote(&self, code: &str) -> FetchResult<Vec<RawQuoteRecord>>;

    /// # Summary
    /// 获取全部 K 线 (日/周/月为前复权数据)。
    ///
    /// # Arguments
    /// * `code`: 证券代码。
    /// * `period`: K 线周期。
    async fn get_kline(&self, code: &str, period: KlinePeriod)
        -> FetchResult<Vec<RawKLineRecord>>;

    /// # Summary
    /// 获取最近 `limit` 根 K 线。
    ///
    /// # Logic
    /// 1. `limit` 在客户端收敛到 1..=800 区间，与服务端上限一致。
    async fn get_kline_history(
        &self,
        code: &str,
        period: KlinePeriod,
        limit: u16,
    ) -> FetchResult<Vec<RawKLineRecord>>;

    /// # Summary
    /// 获取指数 K 线，参数语义同 `get_kline_history`。
    async fn get_index(
        &self,
        code: &str,
        period: KlinePeriod,
        limit: u16,
    ) -> FetchResult<Vec<RawKLineRecord>>;

    /// # Summary
    /// 获取分时数据。
    ///
    /// # Arguments
    /// * `date`: 交易日，`None` 时由服务端回溯最近一个有数据的交易日。
    async fn get_minute(&self, code: &str, date: Option<NaiveDate>) -> FetchResult<MinutePayload>;

    /// # Summary
    /// 获取逐笔成交。
    ///
    /// # Arguments
    /// * `date`: 交易日，`None` 时为当日最近的成交。
    async fn get_trade(
        &self,
        code: &str,
        date: Option<NaiveDate>,
    ) -> FetchResult<Vec<RawTradeRecord>>;

    /// 按代码或名称模糊搜索股票。
    async fn search(&self, keyword: &str) -> FetchResult<Vec<SecurityEntry>>;

    /// 获取股票代码列表。
    async fn get_codes(&self, exchange: Exchange) -> FetchResult<CodeList>;

    /// # Summary
    /// 批量获取行情。
    ///
    /// # Logic
    /// 1. 以 `{codes: [...]}` 作为 POST 请求体。
    /// 2. 空列表或超过服务端上限时由服务端拒绝，表现为「无数据」。
    async fn batch_get_quote(&self, codes: &[String]) -> FetchResult<Vec<RawQuoteRecord>>;

    /// 获取行情、近期日线与分时的综合信息。
    async fn get_stock_info(&self, code: &str) -> FetchResult<StockInfo>;

    /// 获取全市场涨跌统计。
    async fn get_market_stats(&self) -> FetchResult<MarketStats>;

    /// 健康检查，服务不可达时返回 `TransportUnavailable`。
    async fn health(&self) -> Result<HealthStatus, MarketError>;

    /// 获取服务运行状态及其与行情主机的连接情况。
    async fn get_server_status(&self) -> FetchResult<ServerStatus>;
}
