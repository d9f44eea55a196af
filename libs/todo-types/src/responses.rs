use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AuthUser, Task};

/// Success envelope shared by every endpoint that returns a body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    pub message: String,

    /// Always `null` on success.
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthData {
    pub user: AuthUser,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskData {
    pub task: Task,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListData {
    pub tasks: Vec<Task>,
    pub count: usize,
}

pub type AuthResponse = Envelope<AuthData>;
pub type TaskResponse = Envelope<TaskData>;
pub type TaskListResponse = Envelope<TaskListData>;
