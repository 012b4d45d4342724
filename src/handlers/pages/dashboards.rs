use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use super::{guard_page, html_escape, layout};
use crate::session::Principal;
use crate::state::AppState;

/// GET /admin/dashboard
pub async fn admin(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    uri: Uri,
) -> Response {
    render(&state, principal, uri.path())
}

/// GET /instructor/dashboard
pub async fn instructor(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    uri: Uri,
) -> Response {
    render(&state, principal, uri.path())
}

/// GET /student/dashboard
pub async fn student(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    uri: Uri,
) -> Response {
    render(&state, principal, uri.path())
}

/// GET /developer/dashboard
pub async fn developer(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    uri: Uri,
) -> Response {
    render(&state, principal, uri.path())
}

/// GET /manager/dashboard
pub async fn manager(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    uri: Uri,
) -> Response {
    render(&state, principal, uri.path())
}

/// GET /user/dashboard - generic area every authenticated principal may enter
pub async fn user(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    uri: Uri,
) -> Response {
    render(&state, principal, uri.path())
}

fn render(state: &AppState, principal: Option<Extension<Principal>>, path: &str) -> Response {
    let principal = principal.map(|Extension(p)| p);

    if let Err(redirect) = guard_page(state, principal.as_ref(), path) {
        return redirect;
    }

    let Some(principal) = principal else {
        return Redirect::to(state.policy.landing_path()).into_response();
    };

    let label = state.policy.display_name_for(&principal.role);
    let body = format!(
        "<h1>{} dashboard</h1>\n\
         <p>Signed in as {} &lt;{}&gt;</p>\n\
         <nav>\n\
         <a href=\"/user/dashboard\">My account</a>\n\
         </nav>\n\
         <form id=\"signout\"><button type=\"submit\">Sign out</button></form>\n\
         <script>\n\
         document.getElementById('signout').addEventListener('submit', async (e) => {{\n\
           e.preventDefault();\n\
           await fetch('/api/auth/signout', {{method: 'POST'}});\n\
           window.location = '/';\n\
         }});\n\
         </script>",
        html_escape(&label),
        html_escape(&principal.display_name),
        html_escape(&principal.email),
    );
    layout(&format!("{} dashboard", label), &body).into_response()
}
