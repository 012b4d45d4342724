use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::access::Role;
use crate::auth::password;
use crate::config;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;
use crate::store::UserRecord;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Role chosen at sign-up; defaults to `student`.
    #[serde(default)]
    pub role: Option<String>,
}

/// POST /api/register - Create a new account
///
/// May be disabled per environment (`SECURITY_ALLOW_REGISTRATION=false`)
/// where accounts are provisioned administratively.
///
/// Expected Input:
/// ```json
/// {
///   "name": "string",        // Required
///   "email": "string",       // Required, unique
///   "password": "string",    // Required, min 8 chars
///   "role": "string"         // Optional, one of the known roles
/// }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": "uuid",
///     "email": "ada@example.com",
///     "role": "student"
///   }
/// }
/// ```
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !config::config().security.allow_registration {
        return Err(ApiError::forbidden("Self-registration is disabled"));
    }

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    super::validate_email_format(&payload.email)?;
    if payload.password.len() < super::MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            super::MIN_PASSWORD_LENGTH
        )));
    }

    let role = match payload.role.as_deref() {
        None | Some("") => Role::Student,
        Some(raw) => Role::parse(raw)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown role '{}'", raw)))?,
    };

    let hash = password::hash_password(&payload.password).map_err(|err| {
        tracing::error!("password hashing failed: {}", err);
        ApiError::internal("Could not create the account")
    })?;

    let record = UserRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: payload.email.trim().to_lowercase(),
        role: role.as_str().to_string(),
        password_hash: hash,
        created_at: Utc::now(),
    };

    let created = state.users.insert(record).await?;
    tracing::info!(role = created.role.as_str(), "registered new account");

    Ok(ApiResponse::created(json!({
        "id": created.id,
        "email": created.email,
        "role": created.role,
    })))
}
