use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppDirsError {
    #[error("system data-local directory is unavailable")]
    DataLocalDirUnavailable,

    #[error("system cache directory is unavailable")]
    CacheDirUnavailable,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("manifest request failed: {0}")]
    Transport(String),

    #[error("manifest service returned status {status}")]
    Status { status: u16 },

    #[error("manifest response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("download failed: {0}")]
    Transport(String),

    #[error("download returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("downloaded artifact is too small ({size} bytes)")]
    TooSmall { size: u64 },

    #[error("downloaded artifact is not an image")]
    NotAnImage,

    #[error("cache storage error: {0}")]
    Io(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DisplayError {
    #[error("display enumeration failed: {0}")]
    Enumerate(String),

    #[error("failed to set wallpaper on {display}: {reason}")]
    Apply { display: String, reason: String },
}

#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("state storage error: {0}")]
    Io(String),

    #[error("state serialization error: {0}")]
    Serialize(String),
}
