use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use todo_sdk::{
    FileStore, GatewayConfig, RequestGateway, Route, SessionConfig, SessionController, TokenStore,
};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::console::{ConsoleNavigator, ConsoleNotifier};
use crate::infra::config::AppConfig;

/// Mounts a session controller for a command running at `route` and restores
/// whatever session the store holds.
pub fn init_session(config: &AppConfig, route: Route) -> anyhow::Result<SessionController> {
    let tokens = TokenStore::new(Arc::new(FileStore::new(&config.session_file)));

    let gateway = RequestGateway::new(
        GatewayConfig {
            base_url: config.api_url.clone(),
            connect_timeout: config.connect_timeout,
            request_timeout: config.request_timeout,
            unauthorized_handler: None,
        },
        tokens,
    )?;

    let session = SessionController::mount(
        Arc::new(gateway),
        Arc::new(ConsoleNavigator::new(route)),
        Arc::new(ConsoleNotifier),
        SessionConfig {
            check_interval: config.session_check_interval,
            warning_threshold: config.expiry_warning_threshold,
            ..SessionConfig::default()
        },
    )?;

    let state = session.start();
    debug!(
        session_file = %config.session_file.display(),
        authenticated = state.is_authenticated(),
        "Session restored"
    );

    Ok(session)
}

pub fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "todo_cli=info,todo_sdk=info".into());

    // Console logs share stderr with warnings; stdout carries command output.
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    // File (structured JSON logs)
    let json_layer = log_file
        .map(|path| -> anyhow::Result<_> {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            Ok(fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true))
        })
        .transpose()?;

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();

    Ok(())
}
