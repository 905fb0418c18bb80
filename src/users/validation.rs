use thiserror::Error;

use super::{dto::UserPayload, repo_types::NewUser};
use crate::auth::password::{hash_password, HashError};

/// Which rules apply to a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Registration: every field, password included, is required.
    Create,
    /// Profile edits: password may be omitted.
    Update,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("the field {field} {message}")]
pub struct MissingFieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl MissingFieldError {
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            message: "is required",
        }
    }
}

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error(transparent)]
    Missing(#[from] MissingFieldError),
    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Reports the first empty required field, checked in the order name, nick, email, password.
pub fn validate_required_fields(payload: &UserPayload, mode: Mode) -> Result<(), MissingFieldError> {
    let checks = [
        ("name", &payload.name, true),
        ("nick", &payload.nick, true),
        ("email", &payload.email, true),
        ("password", &payload.password, mode == Mode::Create),
    ];
    match checks
        .into_iter()
        .find(|(_, value, required)| *required && value.is_empty())
    {
        Some((field, _, _)) => Err(MissingFieldError::required(field)),
        None => Ok(()),
    }
}

/// Validates a registration payload and swaps its password for an Argon2 hash.
pub fn prepare(payload: UserPayload) -> Result<NewUser, PrepareError> {
    validate_required_fields(&payload, Mode::Create)?;
    let password_hash = hash_password(&payload.password)?;
    Ok(NewUser {
        name: payload.name,
        nick: payload.nick,
        email: payload.email,
        password_hash,
    })
}
