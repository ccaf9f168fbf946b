//! # tdxq-core
//!
//! 通达信行情 HTTP 服务客户端的领域层：单位换算、原始报文结构、领域实体、错误类型以及行情服务端口。

pub mod common;
pub mod config;

pub mod market {
    pub mod entity;
    pub mod error;
    pub mod port;
    pub mod raw;
}
