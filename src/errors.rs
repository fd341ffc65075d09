use thiserror::Error;
use std::num::ParseFloatError;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Parse float error: {0}")]
    ParseFloatError(#[from] ParseFloatError),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("No kline data returned for {0}")]
    EmptyResult(String),

    #[error("All {0} instruments failed to fetch")]
    AllInstrumentsFailed(usize),

    #[error("Fallback generation failed: {0}")]
    FallbackError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

// 用于从字符串创建错误
impl From<String> for TrackerError {
    fn from(s: String) -> Self {
        TrackerError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for TrackerError {
    fn from(s: &str) -> Self {
        TrackerError::Unknown(s.to_string())
    }
}
