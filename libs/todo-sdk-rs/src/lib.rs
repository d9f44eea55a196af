//! Rust SDK for the to-do API.
//!
//! This SDK owns the client side of authentication and error handling.
//!
//! # Features
//!
//! - **Token store** - Persist the session token and user behind a pluggable key-value backend
//! - **Request gateway** - One choke point for API calls: bearer auth, body decoding, normalized errors
//! - **Session controller** - Startup restore, login/logout, 401 teardown and expiry warnings
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use todo_sdk::{FileStore, GatewayConfig, RequestGateway, SessionConfig, SessionController, TokenStore};
//!
//! let tokens = TokenStore::new(Arc::new(FileStore::new("/tmp/todo-session.json")));
//! let gateway = Arc::new(RequestGateway::new(
//!     GatewayConfig::new("http://localhost:8000".parse()?),
//!     tokens,
//! )?);
//! let session = SessionController::mount(gateway, navigator, notifier, SessionConfig::default())?;
//! session.start();
//!
//! let tasks = session.gateway().get_tasks().await?;
//! ```

mod api;
mod error;
mod gateway;
mod http_client;
mod routes;
mod scheduler;
mod session;
mod store;
mod token_store;

#[cfg(test)]
pub mod test_utils;

pub use error::{
    ApiError, ErrorKind, GENERIC_ERROR_MESSAGE, NETWORK_ERROR_MESSAGE, SdkError, StoreError,
    UNEXPECTED_ERROR_MESSAGE,
};
pub use gateway::{GatewayConfig, RequestGateway, ResponseBody, UnauthorizedHandler};
pub use http_client::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
pub use routes::{Route, RouteDecision, guard};
pub use scheduler::RecurringTask;
pub use session::{
    DEFAULT_CHECK_INTERVAL, DEFAULT_WARNING_DURATION, DEFAULT_WARNING_THRESHOLD, Navigator,
    Notifier, SessionConfig, SessionController, SessionState, expiry_warning_message,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use token_store::{TOKEN_KEY, TokenStore, USER_KEY};

// Re-export shared types for convenience
pub use todo_types::{
    AuthResponse, AuthUser, Credentials, FieldErrors, Task, TaskInput, TaskListResponse,
    TaskResponse, ValidationError, validation,
};
