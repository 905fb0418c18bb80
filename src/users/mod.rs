use axum::Router;

use crate::{auth::jwt::JwtKeys, state::AppState};

pub mod dto;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod validation;

pub fn router(keys: JwtKeys) -> Router<AppState> {
    Router::new()
        .merge(handlers::user_routes(keys))
        .merge(handlers::login_routes())
}
