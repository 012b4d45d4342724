use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::access::AccessPolicy;
use crate::auth::password;
use crate::is_development;
use crate::store::{CredentialStore, MemoryStore, UserRecord};

/// Shared, immutable application state: the access policy and the
/// credential-store handle. Cloned per request by the router.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<AccessPolicy>,
    pub users: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            policy: Arc::new(AccessPolicy::standard()),
            users: Arc::new(MemoryStore::new()),
        }
    }

    /// Ensure a default administrator exists so a fresh development
    /// instance is reachable without a registration round. No-op outside
    /// development mode.
    pub async fn ensure_default_admin(&self) {
        if !is_development!() {
            return;
        }

        let email = "admin@campus.local";
        match self.users.find_by_email(email).await {
            Ok(Some(_)) => return,
            Ok(None) => {}
            Err(err) => {
                tracing::warn!("could not check for default admin: {}", err);
                return;
            }
        }

        let hash = match password::hash_password("change-me-now") {
            Ok(hash) => hash,
            Err(err) => {
                tracing::warn!("could not hash default admin password: {}", err);
                return;
            }
        };

        let record = UserRecord {
            id: Uuid::new_v4(),
            name: "Campus Admin".to_string(),
            email: email.to_string(),
            role: "admin".to_string(),
            password_hash: hash,
            created_at: Utc::now(),
        };

        match self.users.insert(record).await {
            Ok(_) => tracing::info!("seeded default development admin ({})", email),
            Err(err) => tracing::warn!("could not seed default admin: {}", err),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
