//! Typed bindings for the API's endpoints. Each one fixes a verb and a path
//! and adds nothing else.

use reqwest::Method;
use todo_types::{AuthResponse, Credentials, TaskInput, TaskListResponse, TaskResponse};
use uuid::Uuid;

use crate::error::ApiError;
use crate::gateway::RequestGateway;

const NO_BODY: Option<&()> = None;

// ============================================================================
// Auth
// ============================================================================

impl RequestGateway {
    pub async fn signup(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.request_json(Method::POST, "/auth/signup", Some(credentials))
            .await
    }

    pub async fn signin(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.request_json(Method::POST, "/auth/signin", Some(credentials))
            .await
    }
}

// ============================================================================
// Tasks
// ============================================================================

impl RequestGateway {
    pub async fn get_tasks(&self) -> Result<TaskListResponse, ApiError> {
        self.request_json(Method::GET, "/tasks", NO_BODY).await
    }

    pub async fn create_task(&self, input: &TaskInput) -> Result<TaskResponse, ApiError> {
        self.request_json(Method::POST, "/tasks", Some(input)).await
    }

    pub async fn update_task(&self, id: Uuid, input: &TaskInput) -> Result<TaskResponse, ApiError> {
        self.request_json(Method::PUT, &format!("/tasks/{id}"), Some(input))
            .await
    }

    pub async fn toggle_task(&self, id: Uuid) -> Result<TaskResponse, ApiError> {
        self.request_json(Method::PATCH, &format!("/tasks/{id}/toggle"), NO_BODY)
            .await
    }

    /// The API answers 204 or 200 with no body.
    pub async fn delete_task(&self, id: Uuid) -> Result<(), ApiError> {
        self.request(Method::DELETE, &format!("/tasks/{id}"), NO_BODY, None)
            .await
            .map(|_| ())
    }
}
