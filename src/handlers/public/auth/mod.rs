pub mod register;
pub mod session;

pub use register::register;
pub use session::{session_get, session_update, signin, signout};

use serde_json::{json, Value};

use crate::error::ApiError;
use crate::session::Principal;
use crate::state::AppState;

pub(crate) const MIN_PASSWORD_LENGTH: usize = 8;

/// Principal as exposed to API clients and the page shell.
pub(crate) fn principal_json(state: &AppState, principal: &Principal) -> Value {
    json!({
        "id": principal.subject_id,
        "name": principal.display_name,
        "email": principal.email,
        "role": principal.role.raw(),
        "roleLabel": state.policy.display_name_for(&principal.role),
    })
}

/// Basic shape check; full deliverability is out of scope.
pub(crate) fn validate_email_format(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err(ApiError::bad_request("Invalid email format"));
    }
    Ok(())
}
