use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Email/password pair for `/auth/signup` and `/auth/signin`.
///
/// The password stays wrapped until the request body is serialized.
#[derive(Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,

    #[serde(serialize_with = "expose_password", deserialize_with = "wrap_password")]
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        let password: String = password.into();
        Self {
            email: email.into(),
            password: SecretString::new(password.into_boxed_str()),
        }
    }
}

fn expose_password<S>(password: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(password.expose_secret())
}

fn wrap_password<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let password = String::deserialize(deserializer)?;
    Ok(SecretString::new(password.into_boxed_str()))
}

/// Body for creating or updating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskInput {
    /// Builds an input the way the forms submit it: title trimmed, blank
    /// descriptions dropped.
    pub fn normalized(title: &str, description: Option<&str>) -> Self {
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Self {
            title: title.trim().to_string(),
            description,
        }
    }
}
