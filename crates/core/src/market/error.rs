use thiserror::Error;

/// # Summary
/// 行情域错误枚举，覆盖传输、报文、映射以及指标计算四类故障。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 核心层不做任何自动重试，错误原样上抛给调用方。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    // 服务不可达：连接失败、超时或非 2xx 的 HTTP 状态
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),
    // 报文 code 非零或 data 缺失，调用方按「无数据」处理
    #[error("Envelope failure (code {code}): {message}")]
    EnvelopeFailure { code: i64, message: String },
    // 响应体不是合法的报文结构
    #[error("Decode error: {0}")]
    Decode(String),
    // 原始记录缺少必需字段或字段值非法
    #[error("Mapping error: {0}")]
    Mapping(String),
    // 指标窗口所需的 K 线数量不足
    #[error("Insufficient data: need {required} bars, got {available}")]
    InsufficientData { required: usize, available: usize },
    // 调用参数非法
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl MarketError {
    /// 构造「缺少字段」的映射错误，`field` 使用原始报文中的字段路径，例如 `K.Close`。
    pub fn missing(field: impl AsRef<str>) -> Self {
        MarketError::Mapping(format!("missing field `{}`", field.as_ref()))
    }

    /// 是否为服务不可达类故障。
    pub fn is_transport(&self) -> bool {
        matches!(self, MarketError::TransportUnavailable(_))
    }
}
