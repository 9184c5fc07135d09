use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("GitHub API request failed: {0}")]
    ApiStatus(StatusCode),

    #[error("download request failed: {0}")]
    DownloadStatus(StatusCode),

    #[error("asset not found in release: {0}")]
    AssetNotFound(String),

    #[error("size mismatch: expected {expected} bytes, received {received}")]
    SizeMismatch { expected: u64, received: u64 },

    #[error("unsupported mode {0:?}, expected 'record_file' or 'file_mtime'")]
    UnsupportedMode(String),

    #[error("invalid time record: {0}")]
    InvalidRecord(String),
}

pub type Result<T> = std::result::Result<T, Error>;
