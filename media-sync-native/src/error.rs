use thiserror::Error;

/// Failure while reading the current media session.
///
/// Variants are ordered by how specific they are. When more than one failure
/// is seen during a query, the most specific diagnostic wins and is never
/// replaced by a vaguer one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectError {
    #[error("Windows Runtime error: {message} (HRESULT 0x{code:08X})")]
    Platform { message: String, code: u32 },
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("Unknown error occurred while reading media session")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailureRank {
    Unknown,
    Runtime,
    Platform,
}

impl CollectError {
    pub fn rank(&self) -> FailureRank {
        match self {
            CollectError::Platform { .. } => FailureRank::Platform,
            CollectError::Runtime(_) => FailureRank::Runtime,
            CollectError::Unknown => FailureRank::Unknown,
        }
    }
}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Runtime(e.to_string())
    }
}

#[cfg(target_os = "windows")]
impl From<windows::core::Error> for CollectError {
    fn from(e: windows::core::Error) -> Self {
        CollectError::Platform {
            message: e.message(),
            code: e.code().0 as u32,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid bridge config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {value}")]
    InvalidField { field: &'static str, value: String },
}
