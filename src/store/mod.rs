use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Persisted user account as the access-control layer sees it. Consulted
/// only at registration and credential verification; never on ordinary
/// requests.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Raw role string as persisted; may predate the current role set.
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account already exists for {0}")]
    DuplicateEmail(String),
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Boundary to the credential store. The LMS proper keeps accounts in its
/// document database; this trait is the seam where that backend attaches.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError>;
}

/// In-process store keyed by normalized email.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(users.get(&normalize_email(email)).cloned())
    }

    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        let mut users = self
            .users
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let key = normalize_email(&user.email);
        if users.contains_key(&key) {
            return Err(StoreError::DuplicateEmail(user.email));
        }
        users.insert(key, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: email.to_string(),
            role: "student".to_string(),
            password_hash: "$argon2id$fake".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive_on_email() {
        let store = MemoryStore::new();
        store.insert(record("Ada@Example.com")).await.unwrap();
        let found = store.find_by_email("ada@example.com").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.insert(record("dup@example.com")).await.unwrap();
        let err = store.insert(record("DUP@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn missing_account_is_none_not_error() {
        let store = MemoryStore::new();
        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
    }
}
