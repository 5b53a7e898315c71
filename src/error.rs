use reqwest::StatusCode;

/// Failure modes of a call against the recommendations API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Coarse classification handed to the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Status,
    Malformed,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Network,
            ApiError::Status { .. } => ErrorKind::Status,
            ApiError::Decode(_) => ErrorKind::Malformed,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("json column: {0}")]
    Json(#[from] serde_json::Error),

    #[error("timestamp column: {0}")]
    Time(String),

    #[error("storage task failed: {0}")]
    Task(String),
}

impl StorageError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
