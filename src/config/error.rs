use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown compression {0:?}, expected one of DEFLATE, LZW, ZSTD, NONE")]
    Compression(String),
    #[error("band index {0} is invalid, band numbers start at 1")]
    BandIndex(usize),
}
