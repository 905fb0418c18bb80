use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    dto::UserChanges,
    repo::{StoreError, UserStore},
    repo_types::{Credentials, NewUser, UserRecord},
};

/// In-memory implementation of [`UserStore`] (for development/testing).
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, UserRecord>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn overwrite(target: &mut String, value: &str) {
    if !value.is_empty() {
        *target = value.to_string();
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict);
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: user.name,
            nick: user.nick,
            email: user.email,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_by_name_or_nick(&self, query: &str) -> Result<Vec<UserRecord>, StoreError> {
        let needle = query.to_lowercase();
        let users = self.users.read().await;
        let mut found: Vec<UserRecord> = users
            .values()
            .filter(|u| {
                u.name.to_lowercase().contains(&needle) || u.nick.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        found.sort_by_key(|u| u.created_at);
        Ok(found)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<UserRecord, StoreError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_credentials_by_email(&self, email: &str) -> Result<Credentials, StoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .map(|u| Credentials {
                id: u.id,
                password_hash: u.password_hash.clone(),
            })
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if !changes.email.is_empty()
            && users.values().any(|u| u.id != id && u.email == changes.email)
        {
            return Err(StoreError::Conflict);
        }
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        overwrite(&mut user.name, &changes.name);
        overwrite(&mut user.nick, &changes.nick);
        overwrite(&mut user.email, &changes.email);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, nick: &str, email: &str) -> NewUser {
        NewUser {
            name: name.into(),
            nick: nick.into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_identity() {
        let store = InMemoryUserStore::new();
        let a = store.create(new_user("Ann", "a1", "ann@x.com")).await.unwrap();
        let b = store.create(new_user("Bob", "b1", "bob@x.com")).await.unwrap();
        assert!(!a.id.is_nil());
        assert_ne!(a.id, b.id);
        assert_eq!(store.get_by_id(a.id).await.unwrap().email, "ann@x.com");
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = InMemoryUserStore::new();
        store.create(new_user("Ann", "a1", "ann@x.com")).await.unwrap();
        let err = store.create(new_user("Other", "o", "ann@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn list_matches_name_or_nick_ignoring_case() {
        let store = InMemoryUserStore::new();
        store.create(new_user("Ann Lee", "annie", "ann@x.com")).await.unwrap();
        store.create(new_user("Bob", "bobby_tables", "bob@x.com")).await.unwrap();

        assert_eq!(store.list_by_name_or_nick("").await.unwrap().len(), 2);
        assert_eq!(store.list_by_name_or_nick("LEE").await.unwrap().len(), 1);
        assert_eq!(store.list_by_name_or_nick("TABLES").await.unwrap()[0].name, "Bob");
        assert!(store.list_by_name_or_nick("zed").await.unwrap().is_empty());
        assert!(store.list_by_name_or_nick("%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_coalesces_empty_fields() {
        let store = InMemoryUserStore::new();
        let u = store.create(new_user("Ann", "a1", "ann@x.com")).await.unwrap();

        let changes = UserChanges {
            name: String::new(),
            nick: "ann2".into(),
            email: String::new(),
        };
        store.update(u.id, &changes).await.unwrap();

        let got = store.get_by_id(u.id).await.unwrap();
        assert_eq!(got.name, "Ann");
        assert_eq!(got.nick, "ann2");
        assert_eq!(got.email, "ann@x.com");
        assert_eq!(got.created_at, u.created_at);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = InMemoryUserStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.get_by_id(id).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.update(id, &UserChanges::default()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.get_credentials_by_email("nobody@x.com").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_is_permanent() {
        let store = InMemoryUserStore::new();
        let u = store.create(new_user("Ann", "a1", "ann@x.com")).await.unwrap();
        store.delete(u.id).await.unwrap();
        assert!(matches!(store.get_by_id(u.id).await, Err(StoreError::NotFound)));
        assert!(matches!(store.delete(u.id).await, Err(StoreError::NotFound)));
    }
}
