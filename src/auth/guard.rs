//! Ownership gate for routes that mutate `/users/:id`.
//!
//! The bearer token must be valid and its subject must equal the raw `id` path segment.
//! Failures short-circuit with 401 (token) or 403 (subject mismatch) before the wrapped
//! handler runs. An `id` segment that cannot be decoded is a 400.

use axum::{
    extract::{rejection::PathRejection, Path, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use thiserror::Error;

use super::jwt::{Claims, JwtKeys, TokenError};
use crate::error::AppError;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error(transparent)]
    Unauthenticated(#[from] TokenError),
    #[error("token subject does not match target")]
    Forbidden,
}

/// Validates `header` and checks that its subject is `target_id`.
pub fn authorize(
    keys: &JwtKeys,
    header: Option<&str>,
    target_id: &str,
) -> Result<Claims, GuardError> {
    let claims = keys.validate(header)?;
    if claims.sub.to_string() != target_id {
        return Err(GuardError::Forbidden);
    }
    Ok(claims)
}

/// Middleware form of [`authorize`]; mount with `route_layer` on a route that has an `:id`.
pub async fn require_owner(
    State(keys): State<JwtKeys>,
    target_id: Result<Path<String>, PathRejection>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Path(target_id) = target_id.map_err(|_| AppError::InvalidId)?;
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .map(|v| v.to_str())
        .transpose()
        .map_err(|_| AppError::Unauthenticated(TokenError::MalformedHeader))?;

    authorize(&keys, header, &target_id)?;
    Ok(next.run(req).await)
}
