//! Local form checks run before any request leaves the client.

use std::collections::BTreeMap;

use secrecy::ExposeSecret;
use thiserror::Error;
use validator::ValidateEmail;

use crate::{Credentials, TaskInput};

pub const EMAIL_MAX_CHARS: usize = 255;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 100;
pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Per-field messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// A form failed local validation; nothing was sent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid input: {0}")]
pub struct ValidationError(pub FieldErrors);

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Please enter a valid email address");
    }
}

pub fn validate_signin(credentials: &Credentials) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::default();
    check_email(&mut errors, &credentials.email);
    if credentials.password.expose_secret().is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result()
}

pub fn validate_signup(credentials: &Credentials) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::default();
    check_email(&mut errors, &credentials.email);
    if credentials.email.trim().chars().count() > EMAIL_MAX_CHARS {
        errors.add(
            "email",
            format!("Email must not exceed {EMAIL_MAX_CHARS} characters"),
        );
    }

    let password = credentials.password.expose_secret();
    if password.trim().is_empty() {
        errors.add("password", "Password is required");
    } else if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.add(
            "password",
            format!("Password must be at least {PASSWORD_MIN_CHARS} characters"),
        );
    } else if password.chars().count() > PASSWORD_MAX_CHARS {
        errors.add(
            "password",
            format!("Password must not exceed {PASSWORD_MAX_CHARS} characters"),
        );
    }
    errors.into_result()
}

fn check_description(errors: &mut FieldErrors, description: Option<&str>) {
    if description.is_some_and(|d| d.trim().chars().count() > DESCRIPTION_MAX_CHARS) {
        errors.add(
            "description",
            format!("Description must not exceed {DESCRIPTION_MAX_CHARS} characters"),
        );
    }
}

/// Checks for the create form, which also enforces a minimum title length.
pub fn validate_new_task(input: &TaskInput) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::default();
    let title = input.title.trim().chars().count();
    if title == 0 {
        errors.add("title", "Title is required");
    } else if title < TITLE_MIN_CHARS {
        errors.add(
            "title",
            format!("Title must be at least {TITLE_MIN_CHARS} characters"),
        );
    } else if title > TITLE_MAX_CHARS {
        errors.add(
            "title",
            format!("Title must not exceed {TITLE_MAX_CHARS} characters"),
        );
    }
    check_description(&mut errors, input.description.as_deref());
    errors.into_result()
}

pub fn validate_task_update(input: &TaskInput) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::default();
    let title = input.title.trim().chars().count();
    if title == 0 {
        errors.add("title", "Title is required");
    } else if title > TITLE_MAX_CHARS {
        errors.add(
            "title",
            format!("Title must not exceed {TITLE_MAX_CHARS} characters"),
        );
    }
    check_description(&mut errors, input.description.as_deref());
    errors.into_result()
}
