use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes produced on the client side when the server did not supply one.
///
/// Server codes (e.g. `VALIDATION_FAILED`, `TASK_NOT_FOUND`) are open-ended and
/// travel as plain strings; these are the fixed sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownError,
    NetworkError,
    UnexpectedError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::NetworkError => "NETWORK_ERROR",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session token's claims could not be read.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token format: expected 3 segments, found {0}")]
    SegmentCount(usize),

    #[error("Invalid token payload encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Invalid token payload: {0}")]
    Payload(#[from] serde_json::Error),
}
