//! Server-rendered pages. Every protected page re-runs the shared access
//! decision before rendering - the same function the edge middleware already
//! ran - so a navigation that bypasses the edge (or a policy the middleware
//! was misconfigured out of) still resolves to the same answer.

pub mod dashboards;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};

use crate::access::{decide, Decision};
use crate::session::Principal;
use crate::state::AppState;

pub(crate) fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} · Campus</title>\n</head>\n<body>\n<main>\n{body}\n</main>\n</body>\n</html>\n"
    ))
}

/// GET / - Anonymous landing page
///
/// Authenticated callers never reach this handler: the access guard has
/// already redirected them to their dashboard.
pub async fn landing() -> Html<String> {
    layout(
        "Welcome",
        "<h1>Campus</h1>\n\
         <p>Courses, materials, and dashboards for your whole team.</p>\n\
         <p><a href=\"/signin\">Sign in</a> or <a href=\"/signup\">create an account</a>.</p>",
    )
}

/// GET /signin - Credential entry
pub async fn signin_page() -> Html<String> {
    layout(
        "Sign in",
        "<h1>Sign in</h1>\n\
         <form id=\"signin\">\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">Sign in</button>\n\
         </form>\n\
         <p id=\"error\" hidden></p>\n\
         <script>\n\
         document.getElementById('signin').addEventListener('submit', async (e) => {\n\
           e.preventDefault();\n\
           const form = new FormData(e.target);\n\
           const res = await fetch('/api/auth/signin', {\n\
             method: 'POST',\n\
             headers: {'Content-Type': 'application/json'},\n\
             body: JSON.stringify({email: form.get('email'), password: form.get('password')})\n\
           });\n\
           const body = await res.json();\n\
           if (body.success) { window.location = body.data.redirect; }\n\
           else { const p = document.getElementById('error'); p.hidden = false; p.textContent = body.error; }\n\
         });\n\
         </script>",
    )
}

/// GET /signup - Account creation
pub async fn signup_page() -> Html<String> {
    layout(
        "Create account",
        "<h1>Create an account</h1>\n\
         <form id=\"signup\">\n\
         <label>Name <input type=\"text\" name=\"name\" required></label>\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" minlength=\"8\" required></label>\n\
         <label>Role\n\
         <select name=\"role\">\n\
         <option value=\"student\" selected>Student</option>\n\
         <option value=\"instructor\">Instructor</option>\n\
         <option value=\"user\">User</option>\n\
         </select>\n\
         </label>\n\
         <button type=\"submit\">Create account</button>\n\
         </form>\n\
         <p id=\"error\" hidden></p>\n\
         <script>\n\
         document.getElementById('signup').addEventListener('submit', async (e) => {\n\
           e.preventDefault();\n\
           const form = new FormData(e.target);\n\
           const res = await fetch('/api/register', {\n\
             method: 'POST',\n\
             headers: {'Content-Type': 'application/json'},\n\
             body: JSON.stringify({name: form.get('name'), email: form.get('email'),\n\
                                   password: form.get('password'), role: form.get('role')})\n\
           });\n\
           const body = await res.json();\n\
           if (body.success) { window.location = '/signin'; }\n\
           else { const p = document.getElementById('error'); p.hidden = false; p.textContent = body.error; }\n\
         });\n\
         </script>",
    )
}

/// GET /unauthorized - Access denied
///
/// Unauthorized is a different outcome from unauthenticated: the caller has
/// a session, just not the role for where they tried to go. The page names
/// their current role and offers the way back to their own dashboard.
pub async fn unauthorized_page(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> Html<String> {
    let body = match principal {
        Some(Extension(principal)) => {
            let label = state.policy.display_name_for(&principal.role);
            let dashboard = state.policy.dashboard_path_for(&principal.role);
            format!(
                "<h1>Access denied</h1>\n\
                 <p>You are signed in as {} with the role <strong>{}</strong>, \
                 which cannot enter that area.</p>\n\
                 <p><a href=\"{}\">Back to your dashboard</a></p>",
                html_escape(&principal.display_name),
                html_escape(&label),
                dashboard
            )
        }
        None => "<h1>Access denied</h1>\n\
                 <p><a href=\"/signin\">Sign in</a> to continue.</p>"
            .to_string(),
    };
    layout("Access denied", &body)
}

/// Shell-side evaluation shared by every protected page handler.
pub(crate) fn guard_page(
    state: &AppState,
    principal: Option<&Principal>,
    path: &str,
) -> Result<(), Response> {
    match decide(&state.policy, principal, path) {
        Decision::Allow => Ok(()),
        Decision::RedirectTo(target) => Err(Redirect::to(&target).into_response()),
    }
}

pub(crate) fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escape_neutralizes_markup() {
        assert_eq!(html_escape("<b>&\"x\"</b>"), "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;");
        assert_eq!(html_escape("plain"), "plain");
    }
}
