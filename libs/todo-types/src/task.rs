use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A task owned by the remote API. The client never mutates one locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}
