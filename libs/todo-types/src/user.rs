use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in user, as returned next to the session token.
///
/// Timestamps are ISO 8601 strings exactly as the API sends them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub created_at: String,

    /// Not part of every API response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}
