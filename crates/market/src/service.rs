use crate::{batch, indicator, mapper};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tdxq_core::common::{Exchange, KlinePeriod};
use tdxq_core::market::entity::{
    BatchQuoteEntry, IndicatorSnapshot, KLineSeries, MarketTally, MinuteBar, NormalizedQuote,
    TradeTick,
};
use tdxq_core::market::error::MarketError;
use tdxq_core::market::port::{FetchResult, MarketDataProvider};
use tdxq_core::market::raw::{
    CodeList, HealthStatus, MarketStats, SecurityEntry, ServerStatus,
};
use tracing::{debug, info};

/// # Summary
/// 交易所抽样统计结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeSample {
    pub exchange: Exchange,
    // 该交易所的股票总数 (来自代码列表接口)
    pub listed: u64,
    pub entries: Vec<BatchQuoteEntry>,
    pub tally: MarketTally,
}

/// # Summary
/// 综合信息的归一化视图，各部分独立缺省。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockOverview {
    pub quote: Option<NormalizedQuote>,
    pub kline_day: Option<KLineSeries>,
    pub minute: Option<Vec<MinuteBar>>,
}

/// # Summary
/// 行情服务门面：调用原始数据源，经 Record Mapper 归一化后交给聚合与指标计算。
///
/// # Invariants
/// - 不持有任何跨调用的可变状态，每个方法都是一次独立往返。
/// - 「无数据」原样以 `Ok(None)` 透传；映射与指标错误以 `Err` 上抛。
pub struct MarketService {
    // 原始行情数据源驱动
    provider: Arc<dyn MarketDataProvider>,
}

impl MarketService {
    /// # Summary
    /// 使用任意满足 `MarketDataProvider` 的数据源构造服务。
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// 检查远端服务是否可达。
    pub async fn health(&self) -> Result<HealthStatus, MarketError> {
        self.provider.health().await
    }

    /// 服务运行状态，未连上行情主机时 `connected` 为 false。
    pub async fn server_status(&self) -> FetchResult<ServerStatus> {
        self.provider.get_server_status().await
    }

    /// 获取并归一化五档行情。
    pub async fn quote(&self, code: &str) -> FetchResult<Vec<NormalizedQuote>> {
        let raw = self.provider.get_quote(code).await?;
        raw.map(|records| mapper::map_quotes(&records)).transpose()
    }

    /// 获取全部 K 线，返回最近一根在前的序列。
    pub async fn kline(&self, code: &str, period: KlinePeriod) -> FetchResult<KLineSeries> {
        let raw = self.provider.get_kline(code, period).await?;
        raw.map(|records| mapper::map_kline_series(&records))
            .transpose()
    }

    /// 获取最近 `limit` 根 K 线。
    pub async fn kline_history(
        &self,
        code: &str,
        period: KlinePeriod,
        limit: u16,
    ) -> FetchResult<KLineSeries> {
        let raw = self.provider.get_kline_history(code, period, limit).await?;
        raw.map(|records| mapper::map_kline_series(&records))
            .transpose()
    }

    /// 获取最近 `limit` 根指数 K 线。
    pub async fn index(&self, code: &str, period: KlinePeriod, limit: u16) -> FetchResult<KLineSeries> {
        let raw = self.provider.get_index(code, period, limit).await?;
        raw.map(|records| mapper::map_kline_series(&records))
            .transpose()
    }

    /// 获取分时数据。
    pub async fn minute(&self, code: &str, date: Option<NaiveDate>) -> FetchResult<Vec<MinuteBar>> {
        let raw = self.provider.get_minute(code, date).await?;
        raw.map(|payload| mapper::map_minutes(&payload.list.unwrap_or_default()))
            .transpose()
    }

    /// 获取逐笔成交。
    pub async fn trades(&self, code: &str, date: Option<NaiveDate>) -> FetchResult<Vec<TradeTick>> {
        let raw = self.provider.get_trade(code, date).await?;
        raw.map(|records| mapper::map_trades(&records)).transpose()
    }

    pub async fn search(&self, keyword: &str) -> FetchResult<Vec<SecurityEntry>> {
        self.provider.search(keyword).await
    }

    pub async fn codes(&self, exchange: Exchange) -> FetchResult<CodeList> {
        self.provider.get_codes(exchange).await
    }

    /// 全市场涨跌统计，由服务端汇总。
    pub async fn market_stats(&self) -> FetchResult<MarketStats> {
        self.provider.get_market_stats().await
    }

    /// # Summary
    /// 批量获取行情并附加涨跌幅。
    ///
    /// # Logic
    /// 1. 请求批量行情接口。
    /// 2. 逐条映射，再交给 Batch Aggregator，输出顺序与服务端一致。
    pub async fn batch_quote(&self, codes: &[String]) -> FetchResult<Vec<BatchQuoteEntry>> {
        let raw = self.provider.batch_get_quote(codes).await?;
        let quotes = raw.map(|records| mapper::map_quotes(&records)).transpose()?;
        Ok(quotes.map(batch::aggregate))
    }

    /// # Summary
    /// 基于日线计算 MA5/MA10/MA20 与趋势。
    ///
    /// # Logic
    /// 1. 获取日线并映射为倒序序列。
    /// 2. 不足 20 根时返回 `InsufficientData`。
    pub async fn indicators(&self, code: &str) -> FetchResult<IndicatorSnapshot> {
        let Some(series) = self.kline(code, KlinePeriod::Day).await? else {
            debug!("No daily klines for {}, skipping indicators", code);
            return Ok(None);
        };
        indicator::snapshot(&series).map(Some)
    }

    /// # Summary
    /// 对某个交易所抽样统计涨跌家数。
    ///
    /// # Logic
    /// 1. 获取代码列表，取前 `sample_size` 只。
    /// 2. 批量请求行情并聚合。
    /// 3. 按 close 与 last 严格比较统计涨跌平。
    ///
    /// # Arguments
    /// * `exchange`: 交易所；`All` 时上市数为各交易所之和。
    /// * `sample_size`: 抽样数量。
    pub async fn sample_tally(
        &self,
        exchange: Exchange,
        sample_size: usize,
    ) -> FetchResult<ExchangeSample> {
        if sample_size == 0 {
            return Err(MarketError::InvalidArgument(
                "sample size must be positive".to_string(),
            ));
        }

        let Some(list) = self.provider.get_codes(exchange).await? else {
            return Ok(None);
        };
        let listed = match exchange {
            Exchange::All => list.exchanges.values().sum::<u64>(),
            other => list.exchanges.get(other.as_str()).copied().unwrap_or_default(),
        };

        let sample: Vec<String> = list
            .codes
            .into_iter()
            .take(sample_size)
            .map(|entry| entry.code)
            .collect();
        if sample.is_empty() {
            debug!("Exchange {} returned no codes to sample", exchange);
            return Ok(None);
        }

        let Some(entries) = self.batch_quote(&sample).await? else {
            return Ok(None);
        };
        let tally = batch::tally(&entries);
        info!(
            "Sampled {} of {} listed on {}: up={} down={} flat={}",
            entries.len(),
            listed,
            exchange,
            tally.up,
            tally.down,
            tally.flat
        );

        Ok(Some(ExchangeSample {
            exchange,
            listed,
            entries,
            tally,
        }))
    }

    /// # Summary
    /// 获取综合信息并归一化各部分。
    ///
    /// # Logic
    /// 任一部分映射失败即整体失败，缺省部分保持 `None`。
    pub async fn overview(&self, code: &str) -> FetchResult<StockOverview> {
        let Some(info) = self.provider.get_stock_info(code).await? else {
            return Ok(None);
        };

        let quote = info.quote.as_ref().map(mapper::map_quote).transpose()?;
        let kline_day = info
            .kline_day
            .map(|payload| mapper::map_kline_series(&payload.into_list()))
            .transpose()?;
        let minute = info
            .minute
            .map(|payload| mapper::map_minutes(&payload.list.unwrap_or_default()))
            .transpose()?;

        Ok(Some(StockOverview {
            quote,
            kline_day,
            minute,
        }))
    }
}
