// src/error.rs

use std::time::Duration;
use thiserror::Error;

/// 适配器调用的全部错误类型。任何错误都会终止本次调用，不返回部分出价。
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Invalid params for ad unit '{code}': {source}")]
    Decode {
        code: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing {0}")]
    MissingRequiredField(&'static str),

    #[error("Failed to encode bid request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// body 保留原始字节，仅在展示时按 UTF-8 宽松解码
    #[error("HTTP status: {status}, body: {}", String::from_utf8_lossy(.body))]
    HttpStatus { status: u16, body: Vec<u8> },

    #[error("Failed to decode bid response: {0}")]
    ResponseDecode(#[from] simd_json::Error),

    #[error("Unknown impression id '{0}'")]
    UnknownImpression(String),

    #[error("Unknown ad unit code '{0}'")]
    UnknownPlacement(String),

    #[error("Bid request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Bid request cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AdapterError>;
