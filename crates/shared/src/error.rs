use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    RateLimited,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            400..=499 => Self::Validation,
            _ => Self::Internal,
        }
    }
}

/// Failure of one catalog fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("catalog responded {status} ({code:?}): {message}")]
    Status {
        code: ErrorCode,
        status: u16,
        message: String,
    },
    #[error("malformed catalog response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            code: ErrorCode::from_status(status),
            status,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Status { code, .. } => *code,
            Self::Transport(_) | Self::Decode(_) => ErrorCode::Internal,
        }
    }
}
