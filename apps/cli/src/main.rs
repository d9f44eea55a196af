use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;
use tracing::error;

use todo_cli::{
    commands::{Cli, execute, report},
    infra::{
        config::AppConfig,
        setup::{init_session, init_tracing},
    },
};
use todo_sdk::Route;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    init_tracing(config.log_file.as_deref())?;

    let route = cli.command.route().unwrap_or(Route::Home);
    let session = init_session(&config, route)?;

    let mut stdout = std::io::stdout().lock();
    match execute(cli.command, &session, &mut stdout).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!(error = %e, kind = ?e.kind(), "Command failed");
            report(&e, &mut std::io::stderr().lock())?;
            Ok(ExitCode::FAILURE)
        }
    }
}
