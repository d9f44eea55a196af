//! Every outbound API call goes through [`RequestGateway::request`].
//!
//! The gateway attaches the stored bearer token, decodes the response body by
//! content type, and converts every failure (transport, HTTP status, malformed
//! body) into an [`ApiError`]. A 401 additionally fires the registered
//! [`UnauthorizedHandler`] before the error is handed back.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{
    AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue,
};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, SdkError};
use crate::http_client::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, try_build_client};
use crate::token_store::TokenStore;

/// Callback fired when the API answers 401.
///
/// Runs synchronously inside the failing call, so by the time the caller sees
/// the error the local session is already gone.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}

impl<F> UnauthorizedHandler for F
where
    F: Fn() + Send + Sync,
{
    fn on_unauthorized(&self) {
        self()
    }
}

/// Configuration for the request gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    /// API root, e.g. `http://localhost:8000`. Endpoints are appended verbatim.
    pub base_url: Url,

    pub connect_timeout: Duration,

    pub request_timeout: Duration,

    /// Handler installed at construction; can be swapped later.
    pub unauthorized_handler: Option<Arc<dyn UnauthorizedHandler>>,
}

impl GatewayConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            unauthorized_handler: None,
        }
    }

    pub fn with_unauthorized_handler(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.unauthorized_handler = Some(handler);
        self
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url.as_str())
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("unauthorized_handler", &self.unauthorized_handler.is_some())
            .finish()
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// What a body-less response decodes to: an empty JSON object.
    pub fn empty() -> Self {
        Self::Json(Value::Object(Map::new()))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Json(Value::Object(map)) => map.is_empty(),
            Self::Json(_) => false,
            Self::Text(text) => text.is_empty(),
        }
    }
}

/// Failure inside the pipeline, before normalization.
enum Fault {
    /// Already normalized; passes through untouched.
    Api(ApiError),
    Transport(reqwest::Error),
    Other(String),
}

impl From<reqwest::Error> for Fault {
    fn from(e: reqwest::Error) -> Self {
        Fault::Transport(e)
    }
}

impl From<serde_json::Error> for Fault {
    fn from(e: serde_json::Error) -> Self {
        Fault::Other(e.to_string())
    }
}

impl From<Fault> for ApiError {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Api(e) => e,
            // Builder errors mean we never got as far as the network.
            Fault::Transport(e) if e.is_builder() => ApiError::unexpected(Some(e.to_string())),
            Fault::Transport(e) => {
                debug!(error = %e, "No response received");
                ApiError::network()
            }
            Fault::Other(message) => ApiError::unexpected(Some(message)),
        }
    }
}

pub struct RequestGateway {
    base_url: String,
    http: Client,
    tokens: TokenStore,
    unauthorized: RwLock<Option<Arc<dyn UnauthorizedHandler>>>,
}

impl RequestGateway {
    /// Create a new gateway.
    ///
    /// # Returns
    /// A configured `RequestGateway` or an error if the configuration is invalid.
    pub fn new(config: GatewayConfig, tokens: TokenStore) -> Result<Self, SdkError> {
        if !matches!(config.base_url.scheme(), "http" | "https") {
            return Err(SdkError::Config(format!(
                "unsupported API URL scheme: {}",
                config.base_url.scheme()
            )));
        }

        let http = try_build_client(config.connect_timeout, config.request_timeout)
            .map_err(|e| SdkError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            http,
            tokens,
            unauthorized: RwLock::new(config.unauthorized_handler),
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Installs the 401 handler, replacing any previous one.
    pub fn set_unauthorized_handler(&self, handler: Arc<dyn UnauthorizedHandler>) {
        *self
            .unauthorized
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    pub fn clear_unauthorized_handler(&self) {
        *self
            .unauthorized
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Issues one API call.
    ///
    /// Caller `headers` win over the defaults (`content-type: application/json`
    /// and the stored bearer token).
    pub async fn request<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        headers: Option<HeaderMap>,
    ) -> Result<ResponseBody, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, endpoint, body, headers)
            .await
            .map_err(ApiError::from)
    }

    /// [`request`](Self::request) followed by typed deserialization of the body.
    pub async fn request_json<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.request(method, endpoint, body, None).await?;
        serde_json::from_value(body.into_json())
            .map_err(|e| ApiError::unexpected(Some(e.to_string())))
    }

    async fn send<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        headers: Option<HeaderMap>,
    ) -> Result<ResponseBody, Fault>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let headers = self.compose_headers(headers)?;

        let mut request = self.http.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        debug!(%method, %url, "Sending API request");
        let response = request.send().await?;
        let status = response.status();
        let body = decode_body(response).await?;

        if status.is_success() {
            return Ok(body);
        }

        let error = ApiError::from_response(
            status.as_u16(),
            body.as_json().unwrap_or(&Value::Null),
        );
        warn!(
            %method,
            %url,
            status = status.as_u16(),
            code = %error.code,
            "API request failed"
        );

        if status == StatusCode::UNAUTHORIZED {
            self.notify_unauthorized();
        }

        Err(Fault::Api(error))
    }

    fn compose_headers(&self, extra: Option<HeaderMap>) -> Result<HeaderMap, Fault> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(auth) = self.tokens.auth_header() {
            let mut value = HeaderValue::from_str(&auth)
                .map_err(|e| Fault::Other(format!("stored token is not a valid header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        // `extend` replaces existing entries for every key it carries.
        if let Some(extra) = extra {
            headers.extend(extra);
        }

        Ok(headers)
    }

    fn notify_unauthorized(&self) {
        let handler = self
            .unauthorized
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match handler {
            Some(handler) => handler.on_unauthorized(),
            None => debug!("401 received with no unauthorized handler registered"),
        }
    }
}

impl std::fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGateway")
            .field("base_url", &self.base_url)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

/// Body decoding policy: zero length or 204 is an empty object; JSON content
/// is parsed only when non-empty; anything else is raw text.
async fn decode_body(response: reqwest::Response) -> Result<ResponseBody, Fault> {
    let header = |name: HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let zero_length = header(CONTENT_LENGTH).is_some_and(|len| len.trim() == "0");
    if zero_length || response.status() == StatusCode::NO_CONTENT {
        return Ok(ResponseBody::empty());
    }

    let is_json = header(CONTENT_TYPE).is_some_and(|ct| ct.contains("application/json"));
    let text = response.text().await?;

    if !is_json {
        return Ok(ResponseBody::Text(text));
    }
    if text.is_empty() {
        return Ok(ResponseBody::empty());
    }
    Ok(ResponseBody::Json(serde_json::from_str(&text)?))
}
