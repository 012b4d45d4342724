use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Process-wide configuration, resolved once at startup.
///
/// `APP_ENV` picks a set of per-environment defaults, then individual
/// variables override single fields. Everything here is read-only for the
/// life of the process; changing the secret or a policy means a redeploy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// HMAC secret for session tokens. An empty secret makes every token
    /// operation fail closed.
    pub session_secret: String,
    pub session_cookie: String,
    pub jwt_expiry_hours: u64,
    pub require_https: bool,
    pub allow_registration: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let defaults = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        defaults.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.security.session_cookie = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_REQUIRE_HTTPS") {
            self.security.require_https = v.parse().unwrap_or(self.security.require_https);
        }
        if let Ok(v) = env::var("SECURITY_ALLOW_REGISTRATION") {
            self.security.allow_registration = v.parse().unwrap_or(self.security.allow_registration);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            security: SecurityConfig {
                // Fixed local-only fallback so `cargo run` works without a .env
                session_secret: "campus-dev-secret-not-for-production".to_string(),
                session_cookie: "campus_session".to_string(),
                jwt_expiry_hours: 24 * 7,
                require_https: false,
                allow_registration: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            security: SecurityConfig {
                session_secret: String::new(),
                session_cookie: "campus_session".to_string(),
                jwt_expiry_hours: 24,
                require_https: true,
                allow_registration: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            security: SecurityConfig {
                session_secret: String::new(),
                session_cookie: "campus_session".to_string(),
                jwt_expiry_hours: 4,
                require_https: true,
                allow_registration: true,
            },
        }
    }
}

/// Singleton, initialized on first access.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
