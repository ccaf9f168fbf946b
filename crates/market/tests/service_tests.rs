use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tdxq_core::common::{Exchange, KlinePeriod};
use tdxq_core::market::entity::Trend;
use tdxq_core::market::error::MarketError;
use tdxq_core::market::port::{FetchResult, MarketDataProvider};
use tdxq_core::market::raw::{
    CodeList, HealthStatus, ListPayload, MarketStats, MinutePayload, RawKLineRecord,
    RawQuoteRecord, RawTradeRecord, SecurityEntry, ServerStatus, StockInfo,
};
use tdxq_market::service::MarketService;

/// # Summary
/// 为测试提供的模拟行情源，数据全部来自内存预设。
struct MockProvider {
    // 是否模拟服务不可达
    offline: bool,
    // 日线根数
    kline_count: usize,
}

impl MockProvider {
    fn online(kline_count: usize) -> Self {
        Self {
            offline: false,
            kline_count,
        }
    }

    fn guard(&self) -> Result<(), MarketError> {
        if self.offline {
            return Err(MarketError::TransportUnavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }

    fn quote(code: &str, close: i64, last: i64) -> RawQuoteRecord {
        serde_json::from_value(json!({
            "Code": code,
            "K": {"Open": last, "High": close.max(last), "Low": close.min(last), "Close": close, "Last": last},
            "TotalHand": 1000,
            "Amount": 1000000,
            "BuyLevel": [{"Price": close - 10, "Number": 100}],
            "SellLevel": [{"Price": close + 10, "Number": 200}]
        }))
        .unwrap()
    }

    fn klines(&self) -> Vec<RawKLineRecord> {
        // 服务端按时间正序返回，价格逐日下跌
        (0..self.kline_count)
            .map(|i| {
                let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i64::try_from(i).unwrap());
                let close = 50_000 - 100 * i64::try_from(i).unwrap();
                serde_json::from_value(json!({
                    "Time": format!("{}T15:00:00+08:00", day),
                    "Open": close, "High": close, "Low": close, "Close": close,
                    "Last": close + 100, "Volume": 10, "Amount": 1000
                }))
                .unwrap()
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn get_quote(&self, code: &str) -> FetchResult<Vec<RawQuoteRecord>> {
        self.guard()?;
        Ok(Some(vec![Self::quote(code, 15230, 15100)]))
    }

    async fn get_kline(&self, _: &str, _: KlinePeriod) -> FetchResult<Vec<RawKLineRecord>> {
        self.guard()?;
        Ok(Some(self.klines()))
    }

    async fn get_kline_history(
        &self,
        _: &str,
        _: KlinePeriod,
        limit: u16,
    ) -> FetchResult<Vec<RawKLineRecord>> {
        self.guard()?;
        let mut all = self.klines();
        let keep = usize::from(limit).min(all.len());
        Ok(Some(all.split_off(all.len() - keep)))
    }

    async fn get_index(
        &self,
        code: &str,
        period: KlinePeriod,
        limit: u16,
    ) -> FetchResult<Vec<RawKLineRecord>> {
        self.get_kline_history(code, period, limit).await
    }

    async fn get_minute(&self, _: &str, _: Option<NaiveDate>) -> FetchResult<MinutePayload> {
        self.guard()?;
        Ok(None)
    }

    async fn get_trade(&self, _: &str, _: Option<NaiveDate>) -> FetchResult<Vec<RawTradeRecord>> {
        self.guard()?;
        Ok(Some(vec![]))
    }

    async fn search(&self, _: &str) -> FetchResult<Vec<SecurityEntry>> {
        self.guard()?;
        Ok(None)
    }

    async fn get_codes(&self, _: Exchange) -> FetchResult<CodeList> {
        self.guard()?;
        let codes = ["600000", "600004", "600009"]
            .iter()
            .map(|c| SecurityEntry {
                code: c.to_string(),
                name: String::new(),
                exchange: Some("sh".to_string()),
            })
            .collect();
        Ok(Some(CodeList {
            total: Some(3),
            exchanges: BTreeMap::from([("sh".to_string(), 2300), ("sz".to_string(), 2800)]),
            codes,
        }))
    }

    async fn batch_get_quote(&self, codes: &[String]) -> FetchResult<Vec<RawQuoteRecord>> {
        self.guard()?;
        let quotes = codes
            .iter()
            .enumerate()
            .map(|(i, code)| match i % 3 {
                0 => Self::quote(code, 10100, 10000),
                1 => Self::quote(code, 9900, 10000),
                _ => Self::quote(code, 10000, 10000),
            })
            .collect();
        Ok(Some(quotes))
    }

    async fn get_stock_info(&self, code: &str) -> FetchResult<StockInfo> {
        self.guard()?;
        Ok(Some(StockInfo {
            quote: Some(Self::quote(code, 15230, 15100)),
            kline_day: Some(ListPayload {
                count: None,
                list: Some(self.klines()),
            }),
            minute: None,
        }))
    }

    async fn get_market_stats(&self) -> FetchResult<MarketStats> {
        self.guard()?;
        Ok(Some(MarketStats::default()))
    }

    async fn health(&self) -> Result<HealthStatus, MarketError> {
        self.guard()?;
        Ok(HealthStatus {
            status: "healthy".to_string(),
            time: None,
        })
    }

    async fn get_server_status(&self) -> FetchResult<ServerStatus> {
        self.guard()?;
        Ok(Some(ServerStatus {
            status: "running".to_string(),
            connected: true,
            version: "1.0.0".to_string(),
            uptime: "unknown".to_string(),
        }))
    }
}

#[tokio::test]
async fn test_quote_is_normalized() -> anyhow::Result<()> {
    let service = MarketService::new(Arc::new(MockProvider::online(0)));
    let quotes = service.quote("000001").await?.unwrap_or_default();

    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].close, dec!(15.23));
    assert_eq!(quotes[0].buy_levels[0].volume_lots, dec!(1));
    Ok(())
}

#[tokio::test]
async fn test_indicators_on_falling_series() -> anyhow::Result<()> {
    let service = MarketService::new(Arc::new(MockProvider::online(30)));
    let snap = service.indicators("000001").await?;

    let snap = snap.ok_or_else(|| anyhow::anyhow!("expected snapshot"))?;
    // 最新一根为第 30 天：50000 - 2900 = 47100 厘
    assert_eq!(snap.current, dec!(47.1));
    assert_eq!(snap.trend, Trend::Bearish);
    Ok(())
}

#[tokio::test]
async fn test_indicators_insufficient_history() {
    let service = MarketService::new(Arc::new(MockProvider::online(19)));
    let result = service.indicators("000001").await;

    assert_eq!(
        result,
        Err(MarketError::InsufficientData {
            required: 20,
            available: 19
        })
    );
}

#[tokio::test]
async fn test_kline_history_is_most_recent_first() -> anyhow::Result<()> {
    let service = MarketService::new(Arc::new(MockProvider::online(30)));
    let series = service
        .kline_history("000001", KlinePeriod::Day, 5)
        .await?
        .unwrap_or_default();

    assert_eq!(series.len(), 5);
    assert_eq!(series.latest().map(|b| b.close), Some(dec!(47.1)));
    Ok(())
}

#[tokio::test]
async fn test_sample_tally() -> anyhow::Result<()> {
    let service = MarketService::new(Arc::new(MockProvider::online(0)));

    let sample = service
        .sample_tally(Exchange::Sh, 10)
        .await?
        .ok_or_else(|| anyhow::anyhow!("expected sample"))?;
    assert_eq!(sample.listed, 2300);
    assert_eq!(sample.entries.len(), 3);
    assert_eq!((sample.tally.up, sample.tally.down, sample.tally.flat), (1, 1, 1));
    assert_eq!(sample.entries[0].change_pct, dec!(1));

    let all = service
        .sample_tally(Exchange::All, 2)
        .await?
        .ok_or_else(|| anyhow::anyhow!("expected sample"))?;
    assert_eq!(all.listed, 5100);
    assert_eq!(all.tally.total(), 2);
    Ok(())
}

#[tokio::test]
async fn test_empty_outcome_passes_through() -> anyhow::Result<()> {
    let service = MarketService::new(Arc::new(MockProvider::online(0)));

    assert!(service.minute("000001", None).await?.is_none());
    assert!(service.search("平安").await?.is_none());
    assert_eq!(service.trades("000001", None).await?, Some(vec![]));
    Ok(())
}

#[tokio::test]
async fn test_transport_failure_is_distinct() {
    let provider = MockProvider {
        offline: true,
        kline_count: 0,
    };
    let service = MarketService::new(Arc::new(provider));

    let err = service.batch_quote(&["000001".to_string()]).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_overview_maps_each_part() -> anyhow::Result<()> {
    let service = MarketService::new(Arc::new(MockProvider::online(3)));
    let overview = service
        .overview("000001")
        .await?
        .ok_or_else(|| anyhow::anyhow!("expected overview"))?;

    assert_eq!(overview.quote.map(|q| q.last), Some(dec!(15.1)));
    assert_eq!(overview.kline_day.map(|s| s.len()), Some(3));
    assert!(overview.minute.is_none());
    Ok(())
}

#[tokio::test]
async fn test_health_reports_transport_failure() {
    let online = MarketService::new(Arc::new(MockProvider::online(0)));
    assert_eq!(online.health().await.map(|h| h.status), Ok("healthy".to_string()));

    let offline = MarketService::new(Arc::new(MockProvider {
        offline: true,
        kline_count: 0,
    }));
    assert!(offline.health().await.is_err_and(|e| e.is_transport()));
}

#[tokio::test]
async fn test_server_status_passes_through() -> anyhow::Result<()> {
    let service = MarketService::new(Arc::new(MockProvider::online(0)));
    let status = service.server_status().await?;
    assert_eq!(status.as_ref().map(|s| s.connected), Some(true));
    assert_eq!(status.map(|s| s.version), Some("1.0.0".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_index_and_market_stats_pass_through() -> anyhow::Result<()> {
    let service = MarketService::new(Arc::new(MockProvider::online(12)));

    let index = service
        .index("000001", KlinePeriod::Day, 10)
        .await?
        .unwrap_or_default();
    assert_eq!(index.len(), 10);

    let stats = service.market_stats().await?;
    assert_eq!(stats, Some(MarketStats::default()));
    Ok(())
}
