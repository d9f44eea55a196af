use std::io::Write;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use time::OffsetDateTime;
use todo_sdk::{ApiError, ErrorKind, Route, RouteDecision, SdkError, SessionController, guard};
use todo_types::validation::{
    validate_new_task, validate_signin, validate_signup, validate_task_update,
};
use todo_types::{Credentials, Task, TaskInput, ValidationError, time_until_expiry};
use tracing::info;
use uuid::Uuid;

use crate::console::hint_for;

#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Manage your to-do list from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and sign in
    Signup(AuthArgs),
    /// Sign in to an existing account
    Signin(AuthArgs),
    /// Forget the stored session
    Signout,
    /// Show the signed-in user
    Whoami,
    /// List your tasks
    List,
    /// Add a task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Replace a task's title and description
    Edit {
        id: Uuid,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Flip a task between open and done
    Toggle { id: Uuid },
    /// Delete a task
    Delete { id: Uuid },
}

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, env = "TODO_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl Command {
    /// The page this command stands in for. `None` runs regardless of session.
    pub fn route(&self) -> Option<Route> {
        match self {
            Command::Signup(_) => Some(Route::SignUp),
            Command::Signin(_) => Some(Route::SignIn),
            Command::Signout => None,
            Command::Whoami
            | Command::List
            | Command::Add { .. }
            | Command::Edit { .. }
            | Command::Toggle { .. }
            | Command::Delete { .. } => Some(Route::Tasks),
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error("{hint}")]
    Redirected { route: Route, hint: &'static str },

    #[error("session is still loading")]
    NotReady,

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl From<ValidationError> for CommandError {
    fn from(e: ValidationError) -> Self {
        Self::Sdk(e.into())
    }
}

impl From<ApiError> for CommandError {
    fn from(e: ApiError) -> Self {
        Self::Sdk(e.into())
    }
}

impl CommandError {
    /// Taxonomy of the underlying SDK failure, if there is one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Sdk(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Runs one command against an already started session.
pub async fn execute(
    command: Command,
    session: &SessionController,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    if let Some(route) = command.route() {
        match guard(route, &session.state()) {
            RouteDecision::Allow => {}
            RouteDecision::Wait => return Err(CommandError::NotReady),
            RouteDecision::Redirect(to) => {
                return Err(CommandError::Redirected {
                    route: to,
                    hint: hint_for(to),
                });
            }
        }
    }

    let gateway = session.gateway();

    match command {
        Command::Signup(args) => {
            let credentials = credentials(args);
            validate_signup(&credentials)?;
            let auth = gateway.signup(&credentials).await?;
            session.login(&auth.data.token, auth.data.user);
            writeln!(out, "Account created. Signed in as {}", credentials.email)?;
        }
        Command::Signin(args) => {
            let credentials = credentials(args);
            validate_signin(&credentials)?;
            let auth = gateway.signin(&credentials).await?;
            session.login(&auth.data.token, auth.data.user);
            writeln!(out, "Signed in as {}", credentials.email)?;
        }
        Command::Signout => {
            session.logout();
            writeln!(out, "Signed out")?;
        }
        Command::Whoami => {
            if let Some(user) = session.user() {
                writeln!(out, "{} ({})", user.email, user.id)?;
            }
            let remaining = gateway
                .tokens()
                .get_token()
                .and_then(|token| time_until_expiry(&token, OffsetDateTime::now_utc()));
            if let Some(remaining) = remaining {
                writeln!(
                    out,
                    "Session expires in {} minutes",
                    remaining.whole_minutes()
                )?;
            }
        }
        Command::List => {
            let list = gateway.get_tasks().await?.data;
            if list.tasks.is_empty() {
                writeln!(out, "No tasks yet. Add one with `todo add <title>`.")?;
            }
            for task in &list.tasks {
                write_task(out, task)?;
            }
            if list.count > 0 {
                let plural = if list.count == 1 { "" } else { "s" };
                writeln!(out, "{} task{plural}", list.count)?;
            }
        }
        Command::Add { title, description } => {
            let input = TaskInput::normalized(&title, description.as_deref());
            validate_new_task(&input)?;
            let task = gateway.create_task(&input).await?.data.task;
            info!(task_id = %task.id, "Task created");
            writeln!(out, "Added {}", task.id)?;
            write_task(out, &task)?;
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            let input = TaskInput::normalized(&title, description.as_deref());
            validate_task_update(&input)?;
            let task = gateway.update_task(id, &input).await?.data.task;
            write_task(out, &task)?;
        }
        Command::Toggle { id } => {
            let task = gateway.toggle_task(id).await?.data.task;
            write_task(out, &task)?;
        }
        Command::Delete { id } => {
            gateway.delete_task(id).await?;
            writeln!(out, "Deleted {id}")?;
        }
    }

    Ok(())
}

fn credentials(args: AuthArgs) -> Credentials {
    Credentials::new(args.email.trim(), args.password)
}

fn write_task(out: &mut impl Write, task: &Task) -> std::io::Result<()> {
    let mark = if task.is_completed { "x" } else { " " };
    writeln!(out, "[{mark}] {}  {}", task.id, task.title)?;
    if let Some(description) = &task.description {
        writeln!(out, "      {description}")?;
    }
    Ok(())
}

/// Writes a failure for humans. Validation failures get one line per field.
pub fn report(error: &CommandError, out: &mut impl Write) -> std::io::Result<()> {
    match error {
        CommandError::Sdk(SdkError::Validation(ValidationError(fields))) => {
            writeln!(out, "Please fix the following:")?;
            for (field, message) in fields.iter() {
                writeln!(out, "  {field}: {message}")?;
            }
            Ok(())
        }
        CommandError::Redirected { hint, .. } => writeln!(out, "{hint}"),
        other => writeln!(out, "error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;
    use tempfile::TempDir;
    use todo_sdk::SessionState;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::infra::config::AppConfig;
    use crate::infra::setup::init_session;

    const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";
    const TASK_ID: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

    fn token(expires_in_secs: i64) -> String {
        let exp = OffsetDateTime::now_utc().unix_timestamp() + expires_in_secs;
        encode(
            &Header::default(),
            &json!({"sub": USER_ID, "exp": exp}),
            &EncodingKey::from_secret(b"cli-test"),
        )
        .unwrap()
    }

    fn user_json() -> serde_json::Value {
        json!({"id": USER_ID, "email": "a@b.com", "created_at": "2026-01-14T10:30:00Z"})
    }

    fn task_json(title: &str, done: bool) -> serde_json::Value {
        json!({
            "id": TASK_ID,
            "user_id": USER_ID,
            "title": title,
            "description": null,
            "is_completed": done,
            "created_at": "2026-01-14T10:30:00Z",
            "updated_at": "2026-01-14T10:30:00Z"
        })
    }

    fn config(server: &MockServer, dir: &TempDir) -> AppConfig {
        AppConfig {
            api_url: server.uri().parse().unwrap(),
            session_file: dir.path().join("session.json"),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(1),
            session_check_interval: Duration::from_secs(300),
            expiry_warning_threshold: Duration::from_secs(3600),
            log_file: None,
        }
    }

    async fn run(
        config: &AppConfig,
        command: Command,
    ) -> (SessionController, Result<(), CommandError>, String) {
        let session = init_session(config, command.route().unwrap_or(Route::Home)).unwrap();
        let mut out = Vec::new();
        let result = execute(command, &session, &mut out).await;
        (session, result, String::from_utf8(out).unwrap())
    }

    fn signin(email: &str, password: &str) -> Command {
        Command::Signin(AuthArgs {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    #[tokio::test]
    async fn test_signin_persists_session_for_next_command() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let config = config(&server, &dir);
        let token = token(7200);

        Mock::given(method("POST"))
            .and(path("/auth/signin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"user": user_json(), "token": token},
                "message": "Signed in successfully",
                "error": null
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"tasks": [task_json("Buy milk", true)], "count": 1},
                "message": "Tasks retrieved successfully",
                "error": null
            })))
            .mount(&server)
            .await;

        let (session, result, out) = run(&config, signin("a@b.com", "password123")).await;
        result.unwrap();
        assert!(out.contains("Signed in as a@b.com"));
        assert!(session.is_authenticated());
        drop(session);

        let (_session, result, out) = run(&config, Command::List).await;
        result.unwrap();
        assert!(out.contains(&format!("[x] {TASK_ID}  Buy milk")));
        assert!(out.contains("1 task"));
    }

    #[tokio::test]
    async fn test_list_when_signed_out_redirects_without_request() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        let (_session, result, _) = run(&config(&server, &dir), Command::List).await;

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            CommandError::Redirected {
                route: Route::SignIn,
                ..
            }
        ));
        assert!(err.to_string().contains("todo signin"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_task_never_reaches_api() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let config = config(&server, &dir);
        todo_sdk::TokenStore::new(std::sync::Arc::new(todo_sdk::FileStore::new(
            &config.session_file,
        )))
        .set_token(
            &token(7200),
            &serde_json::from_value(user_json()).unwrap(),
        );

        let (_session, result, _) = run(
            &config,
            Command::Add {
                title: " ab ".to_string(),
                description: None,
            },
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Validation));
        let mut report_out = Vec::new();
        report(&err, &mut report_out).unwrap();
        let report_out = String::from_utf8(report_out).unwrap();
        assert!(report_out.contains("title: Title must be at least 3 characters"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signin_validation_lists_every_field() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        let (_session, result, _) = run(&config(&server, &dir), signin("nope", "")).await;

        let err = result.unwrap_err();
        let mut out = Vec::new();
        report(&err, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("email: Please enter a valid email address"));
        assert!(out.contains("password: Password is required"));
    }

    #[tokio::test]
    async fn test_rejected_token_signs_out() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let config = config(&server, &dir);
        todo_sdk::TokenStore::new(std::sync::Arc::new(todo_sdk::FileStore::new(
            &config.session_file,
        )))
        .set_token(
            &token(7200),
            &serde_json::from_value(user_json()).unwrap(),
        );

        Mock::given(method("PATCH"))
            .and(path(format!("/tasks/{TASK_ID}/toggle")))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})),
            )
            .mount(&server)
            .await;

        let (session, result, _) = run(
            &config,
            Command::Toggle {
                id: TASK_ID.parse().unwrap(),
            },
        )
        .await;

        match result.unwrap_err() {
            CommandError::Sdk(SdkError::Api(err)) => {
                assert_eq!(err.status, 401);
                assert_eq!(err.message, "Token expired");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(!session.gateway().tokens().is_authenticated());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_network_error() {
        let dir = TempDir::new().unwrap();
        let server = MockServer::start().await;
        let mut config = config(&server, &dir);
        drop(server);
        config.api_url = "http://127.0.0.1:9".parse().unwrap();

        let (_session, result, _) = run(&config, signin("a@b.com", "password123")).await;

        match result.unwrap_err() {
            CommandError::Sdk(SdkError::Api(err)) => {
                assert_eq!(err.status, 0);
                assert_eq!(err.code, "NETWORK_ERROR");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_command_routes() {
        assert_eq!(Command::List.route(), Some(Route::Tasks));
        assert_eq!(Command::Signout.route(), None);
        assert_eq!(
            signin("a@b.com", "x").route(),
            Some(Route::SignIn)
        );
    }

    #[test]
    fn test_cli_parses_edit_with_description() {
        let cli = Cli::try_parse_from([
            "todo",
            "edit",
            TASK_ID,
            "Buy oat milk",
            "--description",
            "2 l",
        ])
        .unwrap();

        match cli.command {
            Command::Edit {
                id,
                title,
                description,
            } => {
                assert_eq!(id.to_string(), TASK_ID);
                assert_eq!(title, "Buy oat milk");
                assert_eq!(description.as_deref(), Some("2 l"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
