use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use env_helpers::get_env_default;
use url::Url;

pub struct AppConfig {
    /// API root every endpoint is appended to.
    pub api_url: Url,
    /// JSON file holding the session token and user.
    pub session_file: PathBuf,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub session_check_interval: Duration,
    pub expiry_warning_threshold: Duration,
    /// Structured JSON logs go here when set.
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url: String = get_env_default("TODO_API_URL", "http://localhost:8000".to_string());
        let api_url = Url::parse(&api_url)
            .with_context(|| format!("TODO_API_URL is not a valid URL: {api_url}"))?;

        let session_file = std::env::var_os("TODO_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_session_file);

        let request_timeout_secs: u64 = get_env_default("TODO_REQUEST_TIMEOUT_SECS", 30);
        let connect_timeout_secs: u64 = get_env_default("TODO_CONNECT_TIMEOUT_SECS", 5);
        let session_check_secs: u64 = get_env_default("TODO_SESSION_CHECK_SECS", 300);
        let expiry_warning_secs: u64 = get_env_default("TODO_EXPIRY_WARNING_SECS", 3600);
        let log_file = std::env::var_os("TODO_LOG_FILE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_url,
            session_file,
            request_timeout: Duration::from_secs(request_timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            session_check_interval: Duration::from_secs(session_check_secs),
            expiry_warning_threshold: Duration::from_secs(expiry_warning_secs),
            log_file,
        })
    }
}

fn default_session_file() -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    home.join(".todo").join("session.json")
}
