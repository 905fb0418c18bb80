use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        guard::require_owner,
        jwt::JwtKeys,
        password::verify_password,
    },
    error::AppError,
    response::Envelope,
    state::AppState,
    users::{
        dto::{ListQuery, LoginRequest, UserChanges, UserPayload, UserResponse},
        validation::prepare,
    },
};

type Reply<T> = Result<(StatusCode, Json<Envelope<T>>), AppError>;

/// Only `DELETE /users/:id` sits behind the ownership guard.
pub fn user_routes(keys: JwtKeys) -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/:id", get(get_user).put(update_user))
        .route(
            "/users/:id",
            delete(delete_user).route_layer(middleware::from_fn_with_state(keys, require_owner)),
        )
}

pub fn login_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// A segment that fails percent-decoding is reported like any other bad id.
fn parse_id(path: Result<Path<String>, PathRejection>) -> Result<Uuid, AppError> {
    let Path(raw) = path.map_err(|_| AppError::InvalidId)?;
    Uuid::parse_str(&raw).map_err(|_| AppError::InvalidId)
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Reply<UserResponse> {
    let Json(payload) = payload?;
    let new_user = prepare(payload)?;
    let user = state.store.create(new_user).await?;

    info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(Envelope::data(user.into()))))
}

#[instrument(skip(state, query))]
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Reply<Vec<UserResponse>> {
    let q = query
        .map(|Query(pairs)| ListQuery::from_pairs(pairs))
        .unwrap_or_default();
    let users = state.store.list_by_name_or_nick(&q.user).await?;
    let items = users.into_iter().map(UserResponse::from).collect();
    Ok((StatusCode::OK, Json(Envelope::data(items))))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Reply<UserResponse> {
    let id = parse_id(id)?;
    let user = state.store.get_by_id(id).await?;
    Ok((StatusCode::OK, Json(Envelope::data(user.into()))))
}

#[instrument(skip(state, changes))]
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    changes: Result<Json<UserChanges>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(id)?;
    let Json(changes) = changes?;
    state.store.update(id, &changes).await?;

    info!(user_id = %id, "user updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(id)?;
    state.store.delete(id).await?;

    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Reply<String> {
    let Json(payload) = payload?;

    let creds = state
        .store
        .get_credentials_by_email(&payload.email)
        .await?;

    if verify_password(&creds.password_hash, &payload.password).is_err() {
        warn!(user_id = %creds.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.keys.issue(creds.id)?;

    info!(user_id = %creds.id, "user logged in");
    Ok((StatusCode::OK, Json(Envelope::data(token))))
}
