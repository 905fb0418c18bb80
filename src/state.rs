use std::sync::Arc;

use crate::auth::jwt::JwtKeys;
use crate::users::{memory::InMemoryUserStore, repo::UserStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub keys: JwtKeys,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    /// State backed by [`InMemoryUserStore`], for tests and local runs without Postgres.
    pub fn in_memory(secret: &str) -> Self {
        Self::new(
            Arc::new(InMemoryUserStore::new()) as Arc<dyn UserStore>,
            JwtKeys::new(secret.as_bytes()),
        )
    }
}
