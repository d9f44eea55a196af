//! Test doubles shared by the SDK's unit tests.
//!
//! - Token minting with `jsonwebtoken` (signature irrelevant to the client)
//! - Recording navigator/notifier and a store that counts removals
//! - `FakeTodoApi`, a stateful wiremock responder that behaves like the API

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jsonwebtoken::{EncodingKey, Header, encode};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use time::OffsetDateTime;
use todo_types::{AuthUser, Credentials, Task, TaskInput};
use uuid::Uuid;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use crate::error::StoreError;
use crate::routes::Route;
use crate::session::{Navigator, Notifier};
use crate::store::{KeyValueStore, MemoryStore};

const TIMESTAMP: &str = "2026-01-14T10:30:00Z";

pub fn sample_user() -> AuthUser {
    AuthUser {
        id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
        email: "a@b.com".to_string(),
        created_at: TIMESTAMP.to_string(),
        updated_at: Some(TIMESTAMP.to_string()),
    }
}

fn sign(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"fake-api-secret"),
    )
    .unwrap()
}

/// A token expiring `secs` seconds from now (negative for already expired).
pub fn mint_token(secs: i64) -> String {
    let exp = OffsetDateTime::now_utc().unix_timestamp() + secs;
    sign(json!({"sub": "user-1", "exp": exp, "jti": Uuid::new_v4()}))
}

pub fn mint_token_without_exp() -> String {
    sign(json!({"sub": "user-1"}))
}

// ============================================================================
// Collaborator doubles
// ============================================================================

pub struct RecordingNavigator {
    current: Mutex<String>,
    visits: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn at(path: &str) -> Arc<Self> {
        Arc::new(Self {
            current: Mutex::new(path.to_string()),
            visits: Mutex::new(Vec::new()),
        })
    }

    pub fn visits(&self) -> Vec<Route> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.current.lock().unwrap().clone()
    }

    fn navigate(&self, route: Route) {
        *self.current.lock().unwrap() = route.path().to_string();
        self.visits.lock().unwrap().push(route);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    warnings: Mutex<Vec<(String, Duration)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.warnings
            .lock()
            .unwrap()
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.warnings.lock().unwrap().iter().map(|(_, d)| *d).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn warning(&self, message: &str, display_for: Duration) {
        self.warnings
            .lock()
            .unwrap()
            .push((message.to_string(), display_for));
    }
}

/// Memory store that counts `remove` calls.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    removes: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key)
    }
}

// ============================================================================
// FakeTodoApi
// ============================================================================

#[derive(Default)]
struct FakeState {
    users: HashMap<String, (AuthUser, String)>,
    sessions: HashMap<String, Uuid>,
    tasks: Vec<Task>,
}

/// In-memory stand-in for the remote API, served through wiremock.
#[derive(Clone, Default)]
pub struct FakeTodoApi {
    state: Arc<Mutex<FakeState>>,
}

fn error(status: u16, code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "data": null,
        "message": null,
        "error": {"code": code, "message": message, "details": {}}
    }))
}

fn ok(status: u16, data: Value, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "data": data,
        "message": message,
        "error": null
    }))
}

impl FakeTodoApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn mount(&self, server: &MockServer) {
        Mock::given(any())
            .respond_with(self.clone())
            .mount(server)
            .await;
    }

    pub fn add_user(&self, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: TIMESTAMP.to_string(),
            updated_at: None,
        };
        self.state
            .lock()
            .unwrap()
            .users
            .insert(email.to_string(), (user.clone(), password.to_string()));
        user
    }

    fn issue(&self, user: &AuthUser) -> String {
        let token = mint_token(2 * 3600);
        self.state
            .lock()
            .unwrap()
            .sessions
            .insert(token.clone(), user.id);
        token
    }

    fn authenticate(&self, request: &Request) -> Option<Uuid> {
        let header = request.headers.get("authorization")?.to_str().ok()?;
        let token = header.strip_prefix("Bearer ")?;
        self.state.lock().unwrap().sessions.get(token).copied()
    }

    fn signup(&self, request: &Request) -> ResponseTemplate {
        let Ok(creds) = request.body_json::<Credentials>() else {
            return error(422, "VALIDATION_FAILED", "Invalid request body");
        };
        if self.state.lock().unwrap().users.contains_key(&creds.email) {
            return error(409, "EMAIL_EXISTS", "Email already registered");
        }
        let user = self.add_user(&creds.email, creds.password.expose_secret());
        let token = self.issue(&user);
        ok(
            201,
            json!({"user": user, "token": token}),
            "Account created successfully",
        )
    }

    fn signin(&self, request: &Request) -> ResponseTemplate {
        let Ok(creds) = request.body_json::<Credentials>() else {
            return error(422, "VALIDATION_FAILED", "Invalid request body");
        };
        let found = self.state.lock().unwrap().users.get(&creds.email).cloned();
        match found {
            Some((user, password)) if password == creds.password.expose_secret() => {
                let token = self.issue(&user);
                ok(
                    200,
                    json!({"user": user, "token": token}),
                    "Signed in successfully",
                )
            }
            _ => error(401, "INVALID_CREDENTIALS", "Invalid email or password"),
        }
    }

    fn tasks(&self, request: &Request, user_id: Uuid, rest: &[&str]) -> ResponseTemplate {
        let method = request.method.as_str();
        let mut state = self.state.lock().unwrap();

        if rest.is_empty() {
            return match method {
                "GET" => {
                    let tasks: Vec<&Task> =
                        state.tasks.iter().filter(|t| t.user_id == user_id).collect();
                    ok(
                        200,
                        json!({"tasks": tasks, "count": tasks.len()}),
                        "Tasks retrieved successfully",
                    )
                }
                "POST" => match request.body_json::<TaskInput>() {
                    Ok(input) if !input.title.trim().is_empty() => {
                        let task = Task {
                            id: Uuid::new_v4(),
                            user_id,
                            title: input.title.trim().to_string(),
                            description: input.description,
                            is_completed: false,
                            created_at: TIMESTAMP.to_string(),
                            updated_at: TIMESTAMP.to_string(),
                        };
                        state.tasks.push(task.clone());
                        ok(201, json!({"task": task}), "Task created successfully")
                    }
                    _ => error(400, "VALIDATION_FAILED", "Title required"),
                },
                _ => error(405, "METHOD_NOT_ALLOWED", "Method not allowed"),
            };
        }

        let Ok(id) = Uuid::parse_str(rest[0]) else {
            return error(404, "TASK_NOT_FOUND", "Task not found");
        };
        let Some(index) = state
            .tasks
            .iter()
            .position(|t| t.id == id && t.user_id == user_id)
        else {
            return error(404, "TASK_NOT_FOUND", "Task not found");
        };

        match (method, &rest[1..]) {
            ("PUT", []) => match request.body_json::<TaskInput>() {
                Ok(input) if !input.title.trim().is_empty() => {
                    let task = &mut state.tasks[index];
                    task.title = input.title.trim().to_string();
                    task.description = input.description;
                    ok(200, json!({"task": task}), "Task updated successfully")
                }
                _ => error(400, "VALIDATION_FAILED", "Title required"),
            },
            ("PATCH", ["toggle"]) => {
                let task = &mut state.tasks[index];
                task.is_completed = !task.is_completed;
                ok(200, json!({"task": task}), "Task status updated")
            }
            ("DELETE", []) => {
                state.tasks.remove(index);
                ResponseTemplate::new(204)
            }
            _ => error(405, "METHOD_NOT_ALLOWED", "Method not allowed"),
        }
    }
}

impl Respond for FakeTodoApi {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let path = request.url.path().trim_matches('/').to_string();
        let segments: Vec<&str> = path.split('/').collect();

        match (request.method.as_str(), segments.as_slice()) {
            ("POST", ["auth", "signup"]) => self.signup(request),
            ("POST", ["auth", "signin"]) => self.signin(request),
            (_, ["tasks", rest @ ..]) => match self.authenticate(request) {
                Some(user_id) => self.tasks(request, user_id, rest),
                None => ResponseTemplate::new(401).set_body_json(json!({
                    "detail": "Not authenticated"
                })),
            },
            _ => ResponseTemplate::new(404).set_body_json(json!({"detail": "Not Found"})),
        }
    }
}
