use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Closed set of roles a user account can hold.
///
/// Wire names are camelCase to match the persisted user records and token
/// claims (`socialMediaManager`, not `social_media_manager`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    User,
    Admin,
    Instructor,
    Student,
    Developer,
    SocialMediaManager,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::User,
        Role::Admin,
        Role::Instructor,
        Role::Student,
        Role::Developer,
        Role::SocialMediaManager,
    ];

    /// Parse a raw role claim. Returns `None` for anything outside the
    /// closed set, including stale strings from long-lived tokens.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "instructor" => Some(Role::Instructor),
            "student" => Some(Role::Student),
            "developer" => Some(Role::Developer),
            "socialMediaManager" => Some(Role::SocialMediaManager),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Instructor => "instructor",
            Role::Student => "student",
            Role::Developer => "developer",
            Role::SocialMediaManager => "socialMediaManager",
        }
    }

    /// Human-readable label for dashboards and the access-denied page.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Administrator",
            Role::Instructor => "Instructor",
            Role::Student => "Student",
            Role::Developer => "Developer",
            Role::SocialMediaManager => "Social Media Manager",
        }
    }
}

/// Role as carried by a session token: either a member of the closed set or
/// a legacy string that no longer parses. Built once at the session-resolver
/// boundary so downstream code never handles an unvalidated claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleClaim {
    Known(Role),
    Legacy(String),
}

impl RoleClaim {
    pub fn parse(raw: &str) -> Self {
        match Role::parse(raw) {
            Some(role) => RoleClaim::Known(role),
            None => RoleClaim::Legacy(raw.to_string()),
        }
    }

    pub fn known(&self) -> Option<Role> {
        match self {
            RoleClaim::Known(role) => Some(*role),
            RoleClaim::Legacy(_) => None,
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            RoleClaim::Known(role) => role.as_str(),
            RoleClaim::Legacy(raw) => raw,
        }
    }
}

impl From<Role> for RoleClaim {
    fn from(role: Role) -> Self {
        RoleClaim::Known(role)
    }
}

/// One protected route prefix and the roles allowed to enter it.
#[derive(Debug, Clone)]
pub struct PrefixRule {
    pub prefix: String,
    pub allowed: BTreeSet<Role>,
}

impl PrefixRule {
    pub fn new(prefix: &str, allowed: impl IntoIterator<Item = Role>) -> Self {
        Self {
            prefix: prefix.to_string(),
            allowed: allowed.into_iter().collect(),
        }
    }
}

/// Immutable access-control configuration: public route lists, the protected
/// prefix permission table, and per-role landing pages.
///
/// Built once at startup and shared read-only through router state; tests
/// construct alternate tables directly. Changing the table is a redeploy,
/// never a runtime update.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    /// Paths that are public on exact match.
    pub(crate) public_exact: Vec<String>,
    /// Namespaces that are public for every sub-path (auth callbacks,
    /// registration API, static assets).
    pub(crate) public_prefixes: Vec<String>,
    /// Permission table. Declaration order is the match precedence; no
    /// prefix in the standard table is a sub-path of another.
    pub(crate) rules: Vec<PrefixRule>,
    /// Prefix every authenticated principal may enter. Must also appear in
    /// `rules`; paths matching no other rule are treated as under it.
    pub(crate) catch_all: String,
    pub(crate) dashboards: Vec<(Role, String)>,
    pub(crate) fallback_dashboard: String,
    pub(crate) landing: String,
    pub(crate) unauthorized: String,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl AccessPolicy {
    /// The deployed table. Admin is deliberately not universal: outside
    /// `/admin` it only holds the `/user` catch-all, like everyone else.
    pub fn standard() -> Self {
        Self {
            public_exact: vec![
                "/".to_string(),
                "/signin".to_string(),
                "/signup".to_string(),
                "/unauthorized".to_string(),
                "/health".to_string(),
                "/favicon.ico".to_string(),
            ],
            public_prefixes: vec![
                "/api/auth".to_string(),
                "/api/register".to_string(),
                "/assets".to_string(),
                "/static".to_string(),
            ],
            rules: vec![
                PrefixRule::new("/admin", [Role::Admin]),
                PrefixRule::new("/instructor", [Role::Instructor]),
                PrefixRule::new("/student", [Role::Student]),
                PrefixRule::new("/developer", [Role::Developer]),
                PrefixRule::new("/manager", [Role::SocialMediaManager]),
                PrefixRule::new("/user", Role::ALL),
            ],
            catch_all: "/user".to_string(),
            dashboards: vec![
                (Role::User, "/user/dashboard".to_string()),
                (Role::Admin, "/admin/dashboard".to_string()),
                (Role::Instructor, "/instructor/dashboard".to_string()),
                (Role::Student, "/student/dashboard".to_string()),
                (Role::Developer, "/developer/dashboard".to_string()),
                (Role::SocialMediaManager, "/manager/dashboard".to_string()),
            ],
            fallback_dashboard: "/user/dashboard".to_string(),
            landing: "/".to_string(),
            unauthorized: "/unauthorized".to_string(),
        }
    }

    /// Canonical landing page for a role. Total: unrecognized roles get the
    /// generic authenticated-user dashboard, never a panic and never `/`.
    pub fn dashboard_path_for(&self, role: &RoleClaim) -> &str {
        match role.known() {
            Some(known) => self
                .dashboards
                .iter()
                .find(|(r, _)| *r == known)
                .map(|(_, path)| path.as_str())
                .unwrap_or(&self.fallback_dashboard),
            None => &self.fallback_dashboard,
        }
    }

    /// Display label for a role claim. Unrecognized strings get a
    /// title-cased echo of the raw value rather than an error.
    pub fn display_name_for(&self, role: &RoleClaim) -> String {
        match role {
            RoleClaim::Known(known) => known.label().to_string(),
            RoleClaim::Legacy(raw) => title_case(raw),
        }
    }

    /// Permission set for a protected prefix. `None` means the prefix has no
    /// rule and is deny-all: absence is never interpreted as "allow".
    pub fn allowed_roles(&self, prefix: &str) -> Option<&BTreeSet<Role>> {
        self.rules
            .iter()
            .find(|rule| rule.prefix == prefix)
            .map(|rule| &rule.allowed)
    }

    /// Whether a role claim may enter a protected prefix. The catch-all
    /// prefix admits any authenticated principal, legacy role strings
    /// included; everywhere else membership in the rule's set is required.
    pub fn is_allowed(&self, role: &RoleClaim, prefix: &str) -> bool {
        if prefix == self.catch_all {
            return true;
        }
        match (self.allowed_roles(prefix), role.known()) {
            (Some(allowed), Some(known)) => allowed.contains(&known),
            _ => false,
        }
    }

    pub fn catch_all_prefix(&self) -> &str {
        &self.catch_all
    }

    pub fn landing_path(&self) -> &str {
        &self.landing
    }

    pub fn unauthorized_path(&self) -> &str {
        &self.unauthorized
    }
}

fn title_case(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
