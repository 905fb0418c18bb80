use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::UserRecord;

/// Request body for user creation. Absent fields decode as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPayload {
    pub name: String,
    pub nick: String,
    pub email: String,
    pub password: String,
}

/// Request body for partial updates; empty fields leave the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserChanges {
    pub name: String,
    pub nick: String,
    pub email: String,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `?user=` filter for listing. An absent key means no filter.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub user: String,
}

impl ListQuery {
    /// Picks the first `user` value out of decoded query pairs; repeats are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let user = pairs
            .into_iter()
            .find(|(key, _)| key == "user")
            .map(|(_, value)| value)
            .unwrap_or_default();
        Self { user }
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub nick: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<UserRecord> for UserResponse {
    fn from(u: UserRecord) -> Self {
        Self {
            id: u.id,
            name: u.name,
            nick: u.nick,
            email: u.email,
            created_at: u.created_at,
        }
    }
}
