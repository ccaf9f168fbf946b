//! 批量行情聚合与涨跌家数统计。

use rust_decimal::Decimal;
use std::cmp::Ordering;
use tdxq_core::market::entity::{BatchQuoteEntry, MarketTally, NormalizedQuote};

/// # Summary
/// 计算相对昨收的涨跌幅 (百分比)。
///
/// # Logic
/// 昨收不大于 0 时返回 0，任何 `close` 都不会触发除零。
pub fn change_pct(close: Decimal, last: Decimal) -> Decimal {
    if last > Decimal::ZERO {
        (close - last) / last * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// 为单条行情附加涨跌额与涨跌幅。
pub fn entry(quote: NormalizedQuote) -> BatchQuoteEntry {
    let change = quote.close - quote.last;
    let change_pct = change_pct(quote.close, quote.last);
    BatchQuoteEntry {
        quote,
        change,
        change_pct,
    }
}

/// # Summary
/// 把一组归一化行情转为批量条目，保持输入顺序。
pub fn aggregate(quotes: Vec<NormalizedQuote>) -> Vec<BatchQuoteEntry> {
    quotes.into_iter().map(entry).collect()
}

/// # Summary
/// 统计上涨、下跌、平盘家数。
///
/// # Logic
/// 严格比较 `close` 与 `last`，不设容差；每个条目恰好落入一类。
pub fn tally(entries: &[BatchQuoteEntry]) -> MarketTally {
    entries
        .iter()
        .fold(MarketTally::default(), |mut acc, e| {
            match e.quote.close.cmp(&e.quote.last) {
                Ordering::Greater => acc.up += 1,
                Ordering::Less => acc.down += 1,
                Ordering::Equal => acc.flat += 1,
            }
            acc
        })
}
