//! # tdxq-feed
//!
//! 基于 `reqwest` 的行情服务 HTTP 适配器，实现 `tdxq_core::market::port::MarketDataProvider`。

pub mod http;
