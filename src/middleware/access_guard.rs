use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::access::{decide, Decision};
use crate::session;
use crate::state::AppState;

/// Edge-layer access control. Runs on every inbound request before any
/// handler: resolves the session principal, evaluates the shared access
/// decision, and either forwards the request (with the principal attached
/// as a request extension) or answers with the redirect itself. A protected
/// handler therefore never starts executing under an unresolved principal.
pub async fn access_guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let principal = session::resolve(request.headers());
    let path = request.uri().path().to_string();

    match decide(&state.policy, principal.as_ref(), &path) {
        Decision::Allow => {
            if let Some(principal) = principal {
                request.extensions_mut().insert(principal);
            }
            next.run(request).await
        }
        Decision::RedirectTo(target) => {
            tracing::info!(
                path = %path,
                target = %target,
                role = principal.as_ref().map(|p| p.role.raw()).unwrap_or("anonymous"),
                "access redirect"
            );
            Redirect::to(&target).into_response()
        }
    }
}
