//! # tdxq-market
//!
//! 行情数据的归一化与衍生指标：Record Mapper、批量聚合、均线与趋势判断、周期重采样，
//! 以及把这些能力串到行情服务端口上的 `MarketService`。

pub mod batch;
pub mod indicator;
pub mod mapper;
pub mod resample;
pub mod service;
