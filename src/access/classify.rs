use super::registry::AccessPolicy;

/// Category a request path falls into for access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass<'a> {
    /// No session required.
    Public,
    /// Requires a principal whose role may enter `prefix`.
    Protected(&'a str),
}

/// Classify a request path against the policy's route tables.
///
/// Public rules short-circuit before any protected matching: exact matches
/// first, then public namespaces. Protected matching walks the permission
/// table in declaration order and takes the first prefix of which `path` is
/// a sub-path. A path matching nothing is protected under the catch-all
/// prefix - never public by omission.
pub fn classify<'a>(policy: &'a AccessPolicy, path: &str) -> RouteClass<'a> {
    if policy.public_exact.iter().any(|p| p == path) {
        return RouteClass::Public;
    }
    if policy.public_prefixes.iter().any(|p| is_subpath(path, p)) {
        return RouteClass::Public;
    }
    for rule in &policy.rules {
        if is_subpath(path, &rule.prefix) {
            return RouteClass::Protected(&rule.prefix);
        }
    }
    RouteClass::Protected(&policy.catch_all)
}

/// `/admin` covers `/admin` and `/admin/users`, but not `/administrator`.
fn is_subpath(path: &str, prefix: &str) -> bool {
    path == prefix
        || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/'))
}
