use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::{
    dto::UserChanges,
    repo_types::{Credentials, NewUser, UserRecord},
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,
    #[error("email already registered")]
    Conflict,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Conflict,
            e => StoreError::Database(e),
        }
    }
}

/// Persistence contract for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; id and created_at are assigned by the store.
    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Case-insensitive substring match on name or nick. An empty query matches everyone.
    async fn list_by_name_or_nick(&self, query: &str) -> Result<Vec<UserRecord>, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<UserRecord, StoreError>;

    async fn get_credentials_by_email(&self, email: &str) -> Result<Credentials, StoreError>;

    /// Overwrite only the non-empty fields of `changes`.
    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<(), StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Escapes LIKE metacharacters so user input only ever matches literally.
pub(crate) fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (name, nick, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, nick, email, password, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.nick)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(record)
    }

    async fn list_by_name_or_nick(&self, query: &str) -> Result<Vec<UserRecord>, StoreError> {
        let pattern = format!("%{}%", escape_like(query));
        let rows = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, nick, email, password, created_at
            FROM users
            WHERE name ILIKE $1 OR nick ILIKE $1
            ORDER BY created_at
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<UserRecord, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, nick, email, password, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        Ok(record)
    }

    async fn get_credentials_by_email(&self, email: &str) -> Result<Credentials, StoreError> {
        let creds = sqlx::query_as::<_, Credentials>(
            r#"SELECT id, password FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_one(&self.db)
        .await?;
        Ok(creds)
    }

    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name  = COALESCE(NULLIF($1, ''), name),
                nick  = COALESCE(NULLIF($2, ''), nick),
                email = COALESCE(NULLIF($3, ''), email)
            WHERE id = $4
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.nick)
        .bind(&changes.email)
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
