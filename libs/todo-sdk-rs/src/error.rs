use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use todo_types::{ErrorCode, ValidationError};

pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// The one error shape every gateway failure is converted into.
///
/// Network failures carry status 0, unexpected client-side faults status 500,
/// everything else the HTTP status the server answered with.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    pub code: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

/// Error taxonomy used by callers to decide how to render a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local form checks; never reached the network.
    Validation,
    /// No response received.
    Network,
    /// 401; the session has already been torn down.
    Unauthorized,
    /// Any other non-2xx answer from the API.
    ApiDomain,
    /// Anything else.
    Unexpected,
}

impl ApiError {
    pub fn network() -> Self {
        Self {
            message: NETWORK_ERROR_MESSAGE.to_string(),
            status: 0,
            code: ErrorCode::NetworkError.to_string(),
            details: Map::new(),
        }
    }

    pub fn unexpected(message: Option<String>) -> Self {
        Self {
            message: message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| UNEXPECTED_ERROR_MESSAGE.to_string()),
            status: 500,
            code: ErrorCode::UnexpectedError.to_string(),
            details: Map::new(),
        }
    }

    /// Builds the error for a non-2xx response from its decoded body.
    ///
    /// Message: `error.message`, then a flat `detail`, then a generic text.
    /// Code: `error.code`, then `UNKNOWN_ERROR`. Details: `error.details` or `{}`.
    pub fn from_response(status: u16, body: &Value) -> Self {
        let non_empty_str = |v: Option<&Value>| {
            v.and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let message = non_empty_str(body.pointer("/error/message"))
            .or_else(|| non_empty_str(body.get("detail")))
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
        let code = non_empty_str(body.pointer("/error/code"))
            .unwrap_or_else(|| ErrorCode::UnknownError.to_string());
        let details = body
            .pointer("/error/details")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Self {
            message,
            status,
            code,
            details,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match (self.status, self.code.as_str()) {
            (0, code) if code == ErrorCode::NetworkError.as_str() => ErrorKind::Network,
            (401, _) => ErrorKind::Unauthorized,
            (_, code) if code == ErrorCode::UnexpectedError.as_str() => ErrorKind::Unexpected,
            _ => ErrorKind::ApiDomain,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Any failure a caller of the SDK can meet: local validation, a normalized
/// API error, or bad configuration.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SdkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Api(e) => e.kind(),
            Self::Config(_) => ErrorKind::Unexpected,
        }
    }
}

/// Persistence backend failures. The token store logs and swallows these.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
