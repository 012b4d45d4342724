use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::principal_json;
use crate::auth::{self, password, Claims, ClaimsUpdate};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::session::{self, Principal};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/signin - Verify credentials and establish a session
///
/// The only point in the system where the credential store is consulted and
/// where token identity claims (role, name, email) are written from a live
/// user-record read. On success the session token is set as a cookie and
/// also returned for API clients.
///
/// Expected Input:
/// ```json
/// {
///   "email": "string",      // Required
///   "password": "string"    // Required
/// }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "user": {
///       "id": "uuid",
///       "name": "Ada Lovelace",
///       "email": "ada@example.com",
///       "role": "student",
///       "roleLabel": "Student"
///     },
///     "redirect": "/student/dashboard"
///   }
/// }
/// ```
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let account = state.users.find_by_email(&payload.email).await?;

    // Unknown email and wrong password produce the same outcome; nothing in
    // the response distinguishes which check failed.
    let account = match account {
        Some(account) if password::verify_password(&account.password_hash, &payload.password) => account,
        _ => {
            tracing::info!("rejected sign-in attempt");
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
    };

    let claims = Claims::new(
        account.id,
        account.role.clone(),
        account.name.clone(),
        account.email.clone(),
    );
    let token = auth::issue_token(&claims).map_err(|err| {
        tracing::error!("could not issue session token: {}", err);
        ApiError::internal("Could not establish a session")
    })?;

    let principal = Principal::from_claims(&claims);
    let redirect = state.policy.dashboard_path_for(&principal.role).to_string();
    tracing::info!(role = principal.role.raw(), "sign-in succeeded");

    Ok((
        set_cookie_headers(&session::session_cookie(&token))?,
        ApiResponse::success(json!({
            "token": token,
            "user": principal_json(&state, &principal),
            "redirect": redirect,
        })),
    ))
}

/// POST /api/auth/signout - Clear the session cookie
///
/// Stateless sign-out: the cookie is expired client-side; the token itself
/// simply ages out.
pub async fn signout() -> Result<impl IntoResponse, ApiError> {
    Ok((
        set_cookie_headers(&session::clear_session_cookie())?,
        ApiResponse::success(json!({ "signedOut": true })),
    ))
}

/// GET /api/auth/session - Current principal, rehydrated from the token
///
/// Returns `"session": null` for anonymous callers rather than an error, so
/// the page shell can poll it on navigation without special-casing. Never
/// consults the credential store.
pub async fn session_get(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> ApiResponse<Value> {
    match principal {
        Some(Extension(principal)) => ApiResponse::success(json!({
            "session": principal_json(&state, &principal),
        })),
        None => ApiResponse::success(json!({ "session": null })),
    }
}

/// PUT /api/auth/session - Session-update trigger
///
/// Merges caller-supplied overrides into the verified claims of the current
/// token and reissues it; claims not named in the update are preserved.
/// `role` and the subject id are never caller-writable.
///
/// Expected Input:
/// ```json
/// {
///   "name": "string",    // Optional
///   "email": "string"    // Optional
/// }
/// ```
pub async fn session_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<ClaimsUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let token = session::token_from_headers(&headers)
        .ok_or_else(|| ApiError::unauthorized("A valid session is required"))?;
    let claims = auth::verify_token(&token)?;

    if let Some(email) = &update.email {
        super::validate_email_format(email)?;
    }
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Name cannot be empty"));
        }
    }

    let next_claims = claims.merged(&update);
    let token = auth::issue_token(&next_claims).map_err(|err| {
        tracing::error!("could not reissue session token: {}", err);
        ApiError::internal("Could not update the session")
    })?;

    let principal = Principal::from_claims(&next_claims);

    Ok((
        set_cookie_headers(&session::session_cookie(&token))?,
        ApiResponse::success(json!({
            "token": token,
            "session": principal_json(&state, &principal),
        })),
    ))
}

fn set_cookie_headers(cookie: &str) -> Result<HeaderMap, ApiError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|_| ApiError::internal("Could not set session cookie"))?;
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}
