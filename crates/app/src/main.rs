use std::path::Path;
use std::sync::Arc;

use tdxq_core::config::{AppConfig, LogConfig};
use tdxq_feed::http::TdxHttpProvider;
use tdxq_market::service::MarketService;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod report;

/// # Summary
/// 报告程序入口。
///
/// # Logic
/// 1. 加载配置 (默认值 < `tdxq.toml` 或命令行指定文件 < `TDXQ__*` 环境变量)。
/// 2. 初始化日志。
/// 3. 实例化 HTTP 数据源与 MarketService。
/// 4. 依次输出各报告章节。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref().map(Path::new))?;

    // 1. 初始化日志，guard 需存活到进程退出以刷新文件缓冲
    let _log_guard = init_tracing(&config.log);
    info!("tdxq starting against {}", config.service.base_url);

    // 2. 实例化数据源与服务
    let provider = Arc::new(TdxHttpProvider::new(&config.service)?);
    let service = MarketService::new(provider);

    // 3. 输出报告
    report::run(&service, &config).await;

    info!("tdxq finished");
    Ok(())
}

/// # Summary
/// 分层加载应用配置。
///
/// # Logic
/// 1. 以 `AppConfig::default()` 为底。
/// 2. 叠加配置文件：显式路径必须存在，未指定时尝试可选的 `tdxq.toml`。
/// 3. 叠加 `TDXQ__` 前缀的环境变量，例如 `TDXQ__SERVICE__BASE_URL`，代码列表以逗号分隔。
///
/// # Invariants
/// - 环境变量一律按字符串读取，`000001` 这类证券代码保留前导零。
fn load_config(path: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    load_config_with_env(path, None)
}

/// 同 `load_config`，`env` 为 `Some` 时以该映射代替进程环境变量。
fn load_config_with_env(
    path: Option<&Path>,
    env: Option<config::Map<String, String>>,
) -> Result<AppConfig, config::ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name("tdxq").required(false),
    };

    config::Config::builder()
        .add_source(config::Config::try_from(&AppConfig::default())?)
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("TDXQ")
                .separator("__")
                .source(env),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// 初始化全局日志。
///
/// # Logic
/// 1. `RUST_LOG` 优先，否则使用配置中的级别。
/// 2. 日志写入 stderr，避免与报告正文混在 stdout。
/// 3. 配置了目录时额外按日滚动写文件。
///
/// # Returns
/// 写文件时返回后台写线程的 guard。
fn init_tracing(log: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    match &log.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tdxq.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}
