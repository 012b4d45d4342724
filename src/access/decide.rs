use super::classify::{classify, RouteClass};
use super::registry::AccessPolicy;
use crate::session::Principal;

/// Outcome of an access evaluation. Computed fresh per request and per
/// client-side navigation; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectTo(String),
}

/// Decide whether `principal` may stay on `path`, or where to send them.
///
/// This is the single shared implementation behind both evaluation sites:
/// the edge middleware runs it before any handler, and the page shell runs
/// it again before rendering. It is a pure function of its inputs - same
/// principal and path, same decision, at either site.
///
/// Order matters:
/// 1. Authenticated callers never see the anonymous landing page; they are
///    sent to their role's dashboard. If a degenerate table ever mapped a
///    dashboard onto the landing path itself, the call falls through to
///    `Allow` instead of redirecting in place.
/// 2. Public paths are allowed for everyone.
/// 3. Anonymous callers on protected paths go back to the landing page,
///    which offers sign-in - not to an error page.
/// 4. Authenticated callers on protected paths either hold an allowed role,
///    or are sent to the access-denied page. Insufficient role is a
///    different outcome from unauthenticated and must stay that way.
pub fn decide(policy: &AccessPolicy, principal: Option<&Principal>, path: &str) -> Decision {
    if path == policy.landing_path() {
        if let Some(principal) = principal {
            let dashboard = policy.dashboard_path_for(&principal.role);
            if dashboard != path {
                return Decision::RedirectTo(dashboard.to_string());
            }
            return Decision::Allow;
        }
    }

    match classify(policy, path) {
        RouteClass::Public => Decision::Allow,
        RouteClass::Protected(prefix) => match principal {
            None => Decision::RedirectTo(policy.landing_path().to_string()),
            Some(principal) => {
                if policy.is_allowed(&principal.role, prefix) {
                    Decision::Allow
                } else {
                    Decision::RedirectTo(policy.unauthorized_path().to_string())
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::registry::{Role, RoleClaim};
    use uuid::Uuid;

    fn principal(role: &str) -> Principal {
        Principal {
            subject_id: Uuid::new_v4(),
            role: RoleClaim::parse(role),
            display_name: "Test User".to_string(),
            email: "test@example.com".to_string(),
        }
    }

    #[test]
    fn anonymous_caller_on_protected_path_is_sent_to_landing() {
        let policy = AccessPolicy::standard();
        assert_eq!(
            decide(&policy, None, "/student/dashboard"),
            Decision::RedirectTo("/".to_string())
        );
    }

    #[test]
    fn insufficient_role_is_sent_to_access_denied() {
        let policy = AccessPolicy::standard();
        let student = principal("student");
        assert_eq!(
            decide(&policy, Some(&student), "/admin/users"),
            Decision::RedirectTo("/unauthorized".to_string())
        );
    }

    #[test]
    fn admin_is_not_universal_outside_its_own_prefix() {
        let policy = AccessPolicy::standard();
        let admin = principal("admin");
        assert_eq!(
            decide(&policy, Some(&admin), "/student/dashboard"),
            Decision::RedirectTo("/unauthorized".to_string())
        );
        // The catch-all still admits admin like any authenticated caller
        assert_eq!(decide(&policy, Some(&admin), "/user/dashboard"), Decision::Allow);
    }

    #[test]
    fn authenticated_caller_on_landing_goes_to_own_dashboard() {
        let policy = AccessPolicy::standard();
        let instructor = principal("instructor");
        assert_eq!(
            decide(&policy, Some(&instructor), "/"),
            Decision::RedirectTo("/instructor/dashboard".to_string())
        );
    }

    #[test]
    fn anonymous_caller_may_view_signin() {
        let policy = AccessPolicy::standard();
        assert_eq!(decide(&policy, None, "/signin"), Decision::Allow);
    }

    #[test]
    fn legacy_role_lands_in_the_catch_all_area() {
        let policy = AccessPolicy::standard();
        let legacy = principal("courseDesigner");
        assert_eq!(decide(&policy, Some(&legacy), "/user/dashboard"), Decision::Allow);
        assert_eq!(
            decide(&policy, Some(&legacy), "/"),
            Decision::RedirectTo("/user/dashboard".to_string())
        );
        assert_eq!(
            decide(&policy, Some(&legacy), "/admin/users"),
            Decision::RedirectTo("/unauthorized".to_string())
        );
    }

    #[test]
    fn decisions_are_deterministic() {
        let policy = AccessPolicy::standard();
        let caller = principal("developer");
        for path in ["/", "/developer/dashboard", "/admin", "/signin", "/courses/1"] {
            let first = decide(&policy, Some(&caller), path);
            let second = decide(&policy, Some(&caller), path);
            assert_eq!(first, second, "decision for {} must not vary between sites", path);
        }
    }

    #[test]
    fn public_paths_allow_any_principal_state() {
        let policy = AccessPolicy::standard();
        let states = [None, Some(principal("admin")), Some(principal("ghostRole"))];
        // The landing page is the documented exception: an authenticated
        // caller is redirected off it by step 1.
        for path in ["/signin", "/signup", "/unauthorized", "/health", "/api/auth/session"] {
            for state in &states {
                assert_eq!(
                    decide(&policy, state.as_ref(), path),
                    Decision::Allow,
                    "public path {} must allow regardless of principal",
                    path
                );
            }
        }
    }

    #[test]
    fn no_role_is_redirected_away_from_its_own_dashboard() {
        let policy = AccessPolicy::standard();
        for role in Role::ALL {
            let caller = principal(role.as_str());
            let dashboard = policy.dashboard_path_for(&caller.role).to_string();
            assert_eq!(
                decide(&policy, Some(&caller), &dashboard),
                Decision::Allow,
                "{:?} must be allowed on its own landing page",
                role
            );
        }
    }

    #[test]
    fn degenerate_dashboard_on_landing_falls_through_to_allow() {
        // A table whose fallback dashboard equals the landing path must not
        // produce a self-redirect.
        let mut policy = AccessPolicy::standard();
        policy.dashboards.clear();
        policy.fallback_dashboard = "/".to_string();
        let caller = principal("student");
        assert_eq!(decide(&policy, Some(&caller), "/"), Decision::Allow);
    }
}
