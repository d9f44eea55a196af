//! HTTP client factory with consistent timeout configuration.
//!
//! The gateway builds its `reqwest::Client` here rather than constructing one
//! directly, so every outbound call shares the same timeout behavior.

use reqwest::Client;
use std::time::Duration;

/// Default connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout (total request/response time).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build an HTTP client with the given timeouts, returning Result for use in
/// fallible constructors.
pub fn try_build_client(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .user_agent(concat!("todo-sdk/", env!("CARGO_PKG_VERSION")))
        .build()
}
