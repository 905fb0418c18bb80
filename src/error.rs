use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{
    auth::{guard::GuardError, jwt::TokenError, password::HashError},
    response::Envelope,
    users::{
        repo::StoreError,
        validation::{MissingFieldError, PrepareError},
    },
};

/// Every way a request can fail, mapped onto a status code and an enveloped message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid body")]
    InvalidBody(#[from] JsonRejection),

    #[error("invalid uuid")]
    InvalidId,

    #[error(transparent)]
    MissingField(#[from] MissingFieldError),

    #[error("password is bigger than requested")]
    PasswordTooLong,

    #[error("email or password invalids")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthenticated(#[source] TokenError),

    #[error("forbidden")]
    Forbidden,

    #[error("user not found")]
    NotFound,

    #[error("email already registered")]
    Conflict,

    #[error("request timed out")]
    Timeout,

    #[error("something went wrong")]
    Internal(anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidId | AppError::MissingField(_) | AppError::PasswordTooLong => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AppError::NotFound,
            StoreError::Conflict => AppError::Conflict,
            StoreError::Database(e) => AppError::Internal(anyhow::Error::new(e).context("user store")),
        }
    }
}

impl From<PrepareError> for AppError {
    fn from(e: PrepareError) -> Self {
        match e {
            PrepareError::Missing(e) => AppError::MissingField(e),
            PrepareError::Hash(HashError::TooLong) => AppError::PasswordTooLong,
            PrepareError::Hash(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing(_) => AppError::Internal(anyhow::Error::new(e)),
            e => AppError::Unauthenticated(e),
        }
    }
}

impl From<GuardError> for AppError {
    fn from(e: GuardError) -> Self {
        match e {
            GuardError::Unauthenticated(e) => AppError::Unauthenticated(e),
            GuardError::Forbidden => AppError::Forbidden,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Internal(e) => error!(error = ?e, "request failed"),
            AppError::Unauthenticated(e) => warn!(error = %e, "token rejected"),
            AppError::Forbidden => warn!("token subject does not own the target"),
            AppError::Timeout => warn!("request exceeded its time limit"),
            AppError::InvalidBody(e) => debug!(error = %e.body_text(), "rejected body"),
            _ => {}
        }
        (status, Json(Envelope::error(self.to_string()))).into_response()
    }
}
