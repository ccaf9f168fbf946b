use crate::common::{Exchange, KlinePeriod};
use serde::{Deserialize, Deserializer, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub log: LogConfig,
    pub report: ReportConfig,
}

/// 远端行情服务连接参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    // 单次请求超时 (秒)
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    // EnvFilter 指令，RUST_LOG 优先
    pub level: String,
    // 设置后额外按日滚动写入该目录
    pub dir: Option<String>,
}

/// 报告各章节使用的标的与参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub code: String,
    pub period: KlinePeriod,
    pub search_keyword: String,
    #[serde(deserialize_with = "code_list")]
    pub batch_codes: Vec<String>,
    #[serde(deserialize_with = "code_list")]
    pub watchlist: Vec<String>,
    pub sample_exchange: Exchange,
    pub sample_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 10,
            user_agent: concat!("tdxq/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        let codes = vec![
            "000001".to_string(),
            "600519".to_string(),
            "601318".to_string(),
        ];
        Self {
            code: "000001".to_string(),
            period: KlinePeriod::Day,
            search_keyword: "平安".to_string(),
            batch_codes: codes.clone(),
            watchlist: codes,
            sample_exchange: Exchange::Sh,
            sample_size: 10,
        }
    }
}

/// # Summary
/// 反序列化证券代码列表，接受数组或逗号分隔的字符串。
///
/// # Invariants
/// - 代码始终作为字符串处理，保留前导零。
fn code_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Codes {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Codes::deserialize(deserializer)? {
        Codes::List(codes) => codes,
        Codes::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect(),
    })
}
