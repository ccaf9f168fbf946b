//! 终端报告：按章节调用 MarketService 并以两位小数格式输出。

use std::future::Future;
use std::pin::Pin;

use tdxq_core::config::{AppConfig, ReportConfig};
use tdxq_core::market::error::MarketError;
use tdxq_market::indicator::{MA_SHORT, moving_average};
use tdxq_market::service::MarketService;
use tracing::{error, info, warn};

type Section<'a> = Pin<Box<dyn Future<Output = Result<(), MarketError>> + 'a>>;

fn section<'a>(fut: impl Future<Output = Result<(), MarketError>> + 'a) -> Section<'a> {
    Box::pin(fut)
}

/// # Summary
/// 依次输出全部报告章节。
///
/// # Logic
/// 1. 先做健康检查，服务不可达时给出处理提示并结束。
/// 2. 逐章执行；某章遇到服务不可达即提示并结束，其余错误记录后继续下一章。
pub async fn run(service: &MarketService, config: &AppConfig) {
    let report = &config.report;
    let base_url = &config.service.base_url;

    if let Err(e) = service.health().await {
        unreachable_hint(base_url, &e);
        return;
    }
    match service.server_status().await {
        Ok(Some(status)) if !status.connected => {
            warn!("Server {} is up but not connected to a quote host", base_url)
        }
        Ok(Some(status)) => info!("Server {} v{} is {}", base_url, status.version, status.status),
        Ok(None) => {}
        Err(e) => warn!("Failed to read server status: {}", e),
    }

    let sections: Vec<(&str, Section<'_>)> = vec![
        ("获取实时行情", section(quote_section(service, report))),
        ("获取K线数据", section(kline_section(service, report))),
        ("搜索股票", section(search_section(service, report))),
        ("批量获取行情", section(batch_section(service, report))),
        ("市场分析", section(market_section(service, report))),
        ("技术分析", section(technical_section(service, report))),
        ("实时监控", section(watchlist_section(service, report))),
    ];

    for (i, (title, section)) in sections.into_iter().enumerate() {
        banner(&format!("示例{}: {}", i + 1, title));
        match section.await {
            Ok(()) => {}
            Err(e) if e.is_transport() => {
                unreachable_hint(base_url, &e);
                return;
            }
            Err(e) => {
                error!("Section {} failed: {}", title, e);
                println!("\n❌ 发生错误: {}", e);
            }
        }
    }

    banner("所有示例运行完成！");
}

fn banner(title: &str) {
    println!("\n{}", "=".repeat(50));
    println!("{}", title);
    println!("{}", "=".repeat(50));
}

fn unreachable_hint(base_url: &str, e: &MarketError) {
    warn!("Service unreachable: {}", e);
    println!("\n❌ 无法连接到API服务器");
    println!("   请确保服务运行在 {}", base_url);
    println!("   启动命令: docker-compose up -d");
}

fn no_data() {
    println!("暂无数据");
}

async fn quote_section(service: &MarketService, report: &ReportConfig) -> Result<(), MarketError> {
    let Some(quotes) = service.quote(&report.code).await? else {
        no_data();
        return Ok(());
    };
    let Some(q) = quotes.first() else {
        no_data();
        return Ok(());
    };

    println!("股票代码: {}", q.code);
    println!("最新价: {:.2}元", q.close);
    println!("开盘价: {:.2}元", q.open);
    println!("最高价: {:.2}元", q.high);
    println!("最低价: {:.2}元", q.low);
    println!("成交量: {}手", q.volume_lots);
    println!("成交额: {:.2}元", q.turnover);

    println!("\n买五档:");
    for (i, level) in q.buy_levels.iter().enumerate() {
        println!("  买{}: {:.2}元  {:.0}手", i + 1, level.price, level.volume_lots);
    }
    println!("\n卖五档:");
    for (i, level) in q.sell_levels.iter().enumerate() {
        println!("  卖{}: {:.2}元  {:.0}手", i + 1, level.price, level.volume_lots);
    }
    Ok(())
}

async fn kline_section(service: &MarketService, report: &ReportConfig) -> Result<(), MarketError> {
    let Some(series) = service.kline(&report.code, report.period).await? else {
        no_data();
        return Ok(());
    };
    if series.is_empty() {
        no_data();
        return Ok(());
    }

    println!("获取到 {} 条{}K线数据", series.len(), report.period);
    println!("\n最近5根K线:");
    for bar in series.take_recent(5).bars() {
        println!(
            "{}: 开{:.2} 收{:.2} 高{:.2} 低{:.2} 量{}手 {:+.2}%",
            bar.time.format("%Y-%m-%d"),
            bar.open,
            bar.close,
            bar.high,
            bar.low,
            bar.volume,
            bar.change_pct()
        );
    }

    if series.len() >= MA_SHORT {
        let ma5 = moving_average(&series, MA_SHORT)?;
        println!("\nMA5: {:.2}元", ma5);
    }
    Ok(())
}

async fn search_section(service: &MarketService, report: &ReportConfig) -> Result<(), MarketError> {
    match service.search(&report.search_keyword).await? {
        Some(hits) if !hits.is_empty() => {
            println!("找到 {} 只股票:", hits.len());
            for hit in hits {
                println!("  {} - {}", hit.code, hit.name);
            }
        }
        _ => no_data(),
    }
    Ok(())
}

async fn batch_section(service: &MarketService, report: &ReportConfig) -> Result<(), MarketError> {
    let Some(entries) = service.batch_quote(&report.batch_codes).await? else {
        no_data();
        return Ok(());
    };

    println!("批量行情数据:");
    for e in entries {
        println!(
            "  {}: {:.2}元, 成交量{}手",
            e.quote.code, e.quote.close, e.quote.volume_lots
        );
    }
    Ok(())
}

async fn market_section(service: &MarketService, report: &ReportConfig) -> Result<(), MarketError> {
    let Some(sample) = service
        .sample_tally(report.sample_exchange, report.sample_size)
        .await?
    else {
        no_data();
        return Ok(());
    };

    println!("{} 市场共 {} 只股票", sample.exchange, sample.listed);
    println!("\n样本分析（{}只）:", sample.tally.total());
    println!("  上涨: {}只", sample.tally.up);
    println!("  下跌: {}只", sample.tally.down);
    println!("  平盘: {}只", sample.tally.flat);
    Ok(())
}

async fn technical_section(
    service: &MarketService,
    report: &ReportConfig,
) -> Result<(), MarketError> {
    let snap = match service.indicators(&report.code).await {
        Ok(Some(snap)) => snap,
        Ok(None) => {
            no_data();
            return Ok(());
        }
        Err(MarketError::InsufficientData {
            required,
            available,
        }) => {
            println!("K线数量不足: 需要 {} 根，实际 {} 根", required, available);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    println!("技术指标:");
    println!("  当前价: {:.2}元", snap.current);
    println!("  MA5:   {:.2}元", snap.ma5);
    println!("  MA10:  {:.2}元", snap.ma10);
    println!("  MA20:  {:.2}元", snap.ma20);
    println!("\n趋势判断: {}", snap.trend);
    Ok(())
}

async fn watchlist_section(
    service: &MarketService,
    report: &ReportConfig,
) -> Result<(), MarketError> {
    println!("监控股票: {}", report.watchlist.join(", "));
    println!("\n实时行情（刷新一次）:");

    let Some(entries) = service.batch_quote(&report.watchlist).await? else {
        no_data();
        return Ok(());
    };

    println!("{:<10} {:<10} {:<10} 成交量", "代码", "最新价", "涨跌幅");
    println!("{}", "-".repeat(50));
    for e in entries {
        println!(
            "{:<10} {:<10.2} {:+.2}%  {:>10}手",
            e.quote.code,
            e.quote.close,
            e.change_pct,
            e.quote.volume_lots
        );
    }
    Ok(())
}
