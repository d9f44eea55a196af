//! Shared types for the to-do client.
//!
//! This crate provides:
//! - Wire types for users, tasks and the API's response envelopes
//! - Request payloads (`Credentials`, `TaskInput`)
//! - Session token claim peeking (no signature verification)
//! - Local form validation that never reaches the network

mod claims;
mod errors;
mod requests;
mod responses;
mod task;
mod token;
mod user;
pub mod validation;

pub use claims::TokenClaims;
pub use errors::{ErrorCode, TokenError};
pub use requests::{Credentials, TaskInput};
pub use responses::{
    AuthData, AuthResponse, Envelope, TaskData, TaskListData, TaskListResponse, TaskResponse,
};
pub use task::Task;
pub use token::{peek_claims, time_until_expiry};
pub use user::AuthUser;
pub use validation::{FieldErrors, ValidationError};
