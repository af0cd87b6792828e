// src/error.rs

use thiserror::Error;

/// 适配器错误类型
///
/// 构建期错误（`Build`）会导致适配器无法创建；其余错误只中止当前这一次竞价。
#[derive(Debug, Error)]
pub enum AdapterError {
    /// endpoint 模板无法解析
    #[error("unable to parse endpoint url template: {0}")]
    Build(String),

    /// 请求参数不合法
    #[error("bad input: {0}")]
    BadInput(String),

    /// 宏展开失败
    #[error("unable to resolve endpoint macros: {0}")]
    MacroResolution(String),

    /// 请求体序列化失败
    #[error("failed to encode bid request: {0}")]
    Encode(#[from] serde_json::Error),

    /// 上游返回了不可用的响应
    #[error("{message}")]
    BadServerResponse { message: String },

    /// 网络层错误
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 上游超时
    #[error("upstream timed out after {0} ms")]
    Timeout(u64),
}

impl AdapterError {
    pub fn bad_server_response(message: impl Into<String>) -> Self {
        AdapterError::BadServerResponse { message: message.into() }
    }

    /// 是否为上游响应校验错误（状态码、JSON、seatbid）
    pub fn is_server_response(&self) -> bool {
        matches!(self, AdapterError::BadServerResponse { .. })
    }
}
