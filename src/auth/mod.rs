use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;

pub mod password;

/// Identity claims carried by the session token.
///
/// `role`, `name`, and `email` are written from a live user-record read
/// exactly once, at credential verification; afterwards every request
/// rehydrates from the token alone, so they are a snapshot that may lag a
/// profile edit until the token is reissued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub name: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: Uuid, role: String, name: String, email: String) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub,
            role,
            name,
            email,
            exp,
            iat: now.timestamp(),
        }
    }

    /// Apply a session-update trigger: caller-supplied overrides are merged
    /// into the existing claims, everything else is preserved. Subject and
    /// role are never caller-writable; the reissued token gets a fresh
    /// issue/expiry window.
    pub fn merged(&self, update: &ClaimsUpdate) -> Self {
        Self::new(
            self.sub,
            self.role.clone(),
            update.name.clone().unwrap_or_else(|| self.name.clone()),
            update.email.clone().unwrap_or_else(|| self.email.clone()),
        )
    }
}

/// Caller-supplied claim overrides accepted by the session-update endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimsUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("session secret not configured")]
    MissingSecret,
    #[error("token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),
}

/// Sign claims into a session token with the process-wide secret.
pub fn issue_token(claims: &Claims) -> Result<String, TokenError> {
    let secret = &config::config().security.session_secret;

    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    Ok(encode(&header, claims, &encoding_key)?)
}

/// Verify signature and expiry, returning the embedded claims.
///
/// Verification is in-process HMAC over process-wide configuration; it never
/// touches the credential store, so sessions keep resolving even when the
/// persistence layer is degraded.
pub fn verify_token(token: &str) -> Result<Claims, TokenError> {
    let secret = &config::config().security.session_secret;

    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)?;

    Ok(token_data.claims)
}
