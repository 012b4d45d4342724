use axum::http::{header, HeaderMap};
use uuid::Uuid;

use crate::access::RoleClaim;
use crate::auth::{self, Claims};
use crate::config;

/// The authenticated caller's identity for one request.
///
/// Rehydrated from the session token on every request - never from the
/// credential store - so name/email/role are the snapshot taken when the
/// token was issued. Destroyed at sign-out or token expiry.
#[derive(Debug, Clone)]
pub struct Principal {
    pub subject_id: Uuid,
    pub role: RoleClaim,
    pub display_name: String,
    pub email: String,
}

impl Principal {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            subject_id: claims.sub,
            role: RoleClaim::parse(&claims.role),
            display_name: claims.name.clone(),
            email: claims.email.clone(),
        }
    }
}

/// Resolve the inbound request to a principal, or `None`.
///
/// Never errors to the caller and never yields a partially-populated
/// principal: a missing, malformed, tampered, or expired token all resolve
/// to an anonymous request. The rejection reason is logged server-side only.
pub fn resolve(headers: &HeaderMap) -> Option<Principal> {
    let token = token_from_headers(headers)?;
    match auth::verify_token(&token) {
        Ok(claims) => Some(Principal::from_claims(&claims)),
        Err(err) => {
            tracing::debug!("session token rejected: {}", err);
            None
        }
    }
}

/// Extract the session token from the request: the session cookie first,
/// falling back to an `Authorization: Bearer` header for API clients.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookie_name = &config::config().security.session_cookie;

    if let Some(cookie_header) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        let found = cookie_header
            .split(';')
            .map(str::trim)
            .filter_map(|kv| kv.split_once('='))
            .find(|(name, _)| name == cookie_name)
            .map(|(_, value)| value);
        if let Some(token) = found {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// `Set-Cookie` value that installs a session token.
pub fn session_cookie(token: &str) -> String {
    let security = &config::config().security;
    let secure = if security.require_https { " Secure;" } else { "" };
    format!(
        "{}={}; Path=/;{} HttpOnly; SameSite=Lax; Max-Age={}",
        security.session_cookie,
        token,
        secure,
        security.jwt_expiry_hours * 3600
    )
}

/// `Set-Cookie` value that clears the session.
pub fn clear_session_cookie() -> String {
    let security = &config::config().security;
    let secure = if security.require_https { " Secure;" } else { "" };
    format!(
        "{}=; Path=/;{} HttpOnly; SameSite=Lax; Max-Age=0",
        security.session_cookie, secure
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn claims() -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "instructor".to_string(),
            "Grace Hopper".to_string(),
            "grace@example.com".to_string(),
        )
    }

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn resolves_principal_from_session_cookie() {
        let token = auth::issue_token(&claims()).unwrap();
        let cookie_name = &config::config().security.session_cookie;
        let headers = headers_with_cookie(&format!("other=1; {}={}; theme=dark", cookie_name, token));

        let principal = resolve(&headers).unwrap();
        assert_eq!(principal.role, RoleClaim::parse("instructor"));
        assert_eq!(principal.display_name, "Grace Hopper");
        assert_eq!(principal.email, "grace@example.com");
    }

    #[test]
    fn resolves_principal_from_bearer_header() {
        let token = auth::issue_token(&claims()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        assert!(resolve(&headers).is_some());
    }

    #[test]
    fn absent_or_garbage_tokens_resolve_to_anonymous() {
        assert!(resolve(&HeaderMap::new()).is_none());

        let cookie_name = &config::config().security.session_cookie;
        let headers = headers_with_cookie(&format!("{}=garbage.token.here", cookie_name));
        assert!(resolve(&headers).is_none());

        let headers = headers_with_cookie(&format!("{}=", cookie_name));
        assert!(resolve(&headers).is_none());
    }

    #[test]
    fn expired_token_resolves_to_anonymous() {
        let mut expired = claims();
        expired.iat -= 7200;
        expired.exp = expired.iat + 60;
        let token = auth::issue_token(&expired).unwrap();
        let cookie_name = &config::config().security.session_cookie;
        let headers = headers_with_cookie(&format!("{}={}", cookie_name, token));
        assert!(resolve(&headers).is_none());
    }

    #[test]
    fn cookie_attributes_cover_the_whole_site() {
        let cookie = session_cookie("tok");
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
