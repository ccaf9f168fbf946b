use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tdxq_core::common::{Exchange, KlinePeriod};
use tdxq_core::config::ServiceConfig;
use tdxq_core::market::error::MarketError;
use tdxq_core::market::port::{FetchResult, MarketDataProvider};
use tdxq_core::market::raw::{
    CodeList, Envelope, HealthStatus, ListPayload, MarketStats, MinutePayload, RawKLineRecord,
    RawQuoteRecord, RawTradeRecord, SecurityEntry, ServerStatus, StockInfo,
};
use tracing::{debug, warn};

/// 服务端单次 K 线数量上限
pub const MAX_KLINE_LIMIT: u16 = 800;

/// # Summary
/// 通达信行情 HTTP 服务的客户端实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，每次调用是一次独立往返。
/// - `base_url` 不以 `/` 结尾。
#[derive(Clone)]
pub struct TdxHttpProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 服务根地址，例如 `http://localhost:8080`
    base_url: String,
}

/// 批量行情请求体
#[derive(Serialize)]
struct BatchQuoteRequest<'a> {
    codes: &'a [String],
}

impl TdxHttpProvider {
    /// # Summary
    /// 根据连接配置创建客户端。
    ///
    /// # Logic
    /// 1. 安装 ring 作为 rustls 的进程级加密实现 (已安装时忽略)。
    /// 2. 按配置设置超时与 User-Agent。
    /// 3. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `config`: 服务连接配置。
    ///
    /// # Returns
    /// 成功返回客户端，构建失败返回 `TransportUnavailable`。
    pub fn new(config: &ServiceConfig) -> Result<Self, MarketError> {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| MarketError::TransportUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 服务根地址。
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// # Summary
    /// 发送请求并解析响应体。
    ///
    /// # Logic
    /// 1. 连接失败、超时、非 2xx 状态统一映射为 `TransportUnavailable`。
    /// 2. 响应体无法解析为目标结构时返回 `Decode`。
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, MarketError> {
        let resp = request
            .send()
            .await
            .map_err(|e| MarketError::TransportUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::TransportUnavailable(format!(
                "HTTP {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| MarketError::Decode(e.to_string()))
    }

    /// # Summary
    /// 完成一次带统一信封的往返。
    ///
    /// # Logic
    /// 1. 发送请求并解析信封。
    /// 2. `EnvelopeFailure` 记录告警后降级为 `Ok(None)`，其余错误原样返回。
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> FetchResult<T> {
        debug!("Requesting {}", path);
        let envelope: Envelope<T> = self.send(request).await?;
        match envelope.into_data() {
            Ok(data) => Ok(Some(data)),
            Err(MarketError::EnvelopeFailure { code, message }) => {
                warn!("{} returned code {}: {}", path, code, message);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> FetchResult<T> {
        let request = self.client.get(self.url(path)).query(query);
        self.fetch(path, request).await
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> FetchResult<Vec<T>> {
        let payload: Option<ListPayload<T>> = self.get(path, query).await?;
        Ok(payload.map(ListPayload::into_list))
    }
}

fn date_param(date: Option<NaiveDate>) -> Option<(&'static str, String)> {
    date.map(|d| ("date", d.format("%Y%m%d").to_string()))
}

fn clamp_limit(limit: u16) -> String {
    limit.clamp(1, MAX_KLINE_LIMIT).to_string()
}

#[async_trait]
impl MarketDataProvider for TdxHttpProvider {
    async fn get_quote(&self, code: &str) -> FetchResult<Vec<RawQuoteRecord>> {
        self.get("/api/quote", &[("code", code.to_string())]).await
    }

    async fn get_kline(&self, code: &str, period: KlinePeriod) -> FetchResult<Vec<RawKLineRecord>> {
        self.get_list(
            "/api/kline",
            &[("code", code.to_string()), ("type", period.to_string())],
        )
        .await
    }

    async fn get_kline_history(
        &self,
        code: &str,
        period: KlinePeriod,
        limit: u16,
    ) -> FetchResult<Vec<RawKLineRecord>> {
        self.get_list(
            "/api/kline-history",
            &[
                ("code", code.to_string()),
                ("type", period.to_string()),
                ("limit", clamp_limit(limit)),
            ],
        )
        .await
    }

    async fn get_index(
        &self,
        code: &str,
        period: KlinePeriod,
        limit: u16,
    ) -> FetchResult<Vec<RawKLineRecord>> {
        self.get_list(
            "/api/index",
            &[
                ("code", code.to_string()),
                ("type", period.to_string()),
                ("limit", clamp_limit(limit)),
            ],
        )
        .await
    }

    async fn get_minute(&self, code: &str, date: Option<NaiveDate>) -> FetchResult<MinutePayload> {
        let mut query = vec![("code", code.to_string())];
        query.extend(date_param(date));
        self.get("/api/minute", &query).await
    }

    async fn get_trade(
        &self,
        code: &str,
        date: Option<NaiveDate>,
    ) -> FetchResult<Vec<RawTradeRecord>> {
        let mut query = vec![("code", code.to_string())];
        query.extend(date_param(date));
        self.get_list("/api/trade", &query).await
    }

    async fn search(&self, keyword: &str) -> FetchResult<Vec<SecurityEntry>> {
        self.get("/api/search", &[("keyword", keyword.to_string())])
            .await
    }

    async fn get_codes(&self, exchange: Exchange) -> FetchResult<CodeList> {
        self.get("/api/codes", &[("exchange", exchange.to_string())])
            .await
    }

    async fn batch_get_quote(&self, codes: &[String]) -> FetchResult<Vec<RawQuoteRecord>> {
        let path = "/api/batch-quote";
        let request = self
            .client
            .post(self.url(path))
            .json(&BatchQuoteRequest { codes });
        self.fetch(path, request).await
    }

    async fn get_stock_info(&self, code: &str) -> FetchResult<StockInfo> {
        self.get("/api/stock-info", &[("code", code.to_string())])
            .await
    }

    async fn get_market_stats(&self) -> FetchResult<MarketStats> {
        self.get("/api/market-stats", &[]).await
    }

    async fn get_server_status(&self) -> FetchResult<ServerStatus> {
        self.get("/api/server-status", &[]).await
    }

    async fn health(&self) -> Result<HealthStatus, MarketError> {
        let request = self.client.get(self.url("/api/health"));
        self.send(request).await
    }
}
