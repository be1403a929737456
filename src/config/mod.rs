use std::env;
use std::fmt;

use thiserror::Error;

/// Minimum accepted length of the token signing secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 16;

/// Upper bound for token and invite lifetimes: one year.
pub const MAX_TTL_HOURS: u64 = 24 * 366;

pub const MAX_IMPERSONATION_MINUTES: u32 = 24 * 60;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: JwtSecret,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub invite_ttl_hours: u64,
    pub max_impersonation_minutes: u32,
    pub enable_audit_logging: bool,
    pub cors_origins: Vec<String>,
    pub super_admin_bootstrap: Option<SuperAdminBootstrap>,
}

/// Credentials for the first platform operator, created on `serve` when absent.
#[derive(Clone)]
pub struct SuperAdminBootstrap {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SuperAdminBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperAdminBootstrap")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Process-wide token signing key. Never printed.
#[derive(Clone)]
pub struct JwtSecret(String);

impl JwtSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                reason: format!("must be at least {} bytes", MIN_SECRET_BYTES),
            });
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtSecret([REDACTED])")
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. `from_env` is the
    /// process-environment flavour of this.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let secret = JwtSecret::new(secret)?;

        let base = match environment {
            Environment::Production => Self::production(secret),
            Environment::Staging => Self::staging(secret),
            Environment::Development => Self::development(secret),
        };

        base.with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("APP_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse("PORT", &v)?;
        }

        if let Some(v) = lookup("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        if let Some(v) = lookup("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours =
                parse_bounded("SECURITY_JWT_EXPIRY_HOURS", &v, 1, MAX_TTL_HOURS)?;
        }
        if let Some(v) = lookup("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = parse_bounded("SECURITY_BCRYPT_COST", &v, 4, 31)?;
        }
        if let Some(v) = lookup("SECURITY_INVITE_TTL_HOURS") {
            self.security.invite_ttl_hours =
                parse_bounded("SECURITY_INVITE_TTL_HOURS", &v, 1, MAX_TTL_HOURS)?;
        }
        if let Some(v) = lookup("SECURITY_MAX_IMPERSONATION_MINUTES") {
            self.security.max_impersonation_minutes =
                parse_bounded("SECURITY_MAX_IMPERSONATION_MINUTES", &v, 1, MAX_IMPERSONATION_MINUTES)?;
        }
        if let Some(v) = lookup("SECURITY_ENABLE_AUDIT_LOGGING") {
            self.security.enable_audit_logging = parse("SECURITY_ENABLE_AUDIT_LOGGING", &v)?;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let (Some(email), Some(password)) =
            (lookup("SUPER_ADMIN_EMAIL"), lookup("SUPER_ADMIN_PASSWORD"))
        {
            self.security.super_admin_bootstrap = Some(SuperAdminBootstrap { email, password });
        }

        Ok(self)
    }

    pub fn development(jwt_secret: JwtSecret) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
                bcrypt_cost: 10,
                invite_ttl_hours: 24 * 7,
                max_impersonation_minutes: 60,
                enable_audit_logging: false,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                super_admin_bootstrap: None,
            },
        }
    }

    fn staging(jwt_secret: JwtSecret) -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
                bcrypt_cost: 10,
                invite_ttl_hours: 24 * 7,
                max_impersonation_minutes: 60,
                enable_audit_logging: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                super_admin_bootstrap: None,
            },
        }
    }

    fn production(jwt_secret: JwtSecret) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 12,
                bcrypt_cost: 12,
                invite_ttl_hours: 24 * 3,
                max_impersonation_minutes: 30,
                enable_audit_logging: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                super_admin_bootstrap: None,
            },
        }
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        reason: format!("cannot parse '{}'", value),
    })
}

fn parse_bounded<T>(key: &'static str, value: &str, min: T, max: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + fmt::Display,
{
    let parsed: T = parse(key, value)?;
    if parsed < min || parsed > max {
        return Err(ConfigError::Invalid {
            key,
            reason: format!("must be between {} and {}", min, max),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_secret_fails_startup() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "short")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_SECRET", .. }));
    }

    #[test]
    fn development_defaults() {
        let config =
            AppConfig::from_lookup(lookup(&[("JWT_SECRET", "0123456789abcdef")])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.security.bcrypt_cost, 10);
        assert!(!config.security.enable_audit_logging);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn production_preset_with_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("JWT_SECRET", "0123456789abcdef0123"),
            ("PORT", "8080"),
            ("SECURITY_MAX_IMPERSONATION_MINUTES", "15"),
            ("SECURITY_CORS_ORIGINS", "https://a.example, https://b.example"),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.security.max_impersonation_minutes, 15);
        assert!(config.security.enable_audit_logging);
        assert_eq!(config.security.cors_origins.len(), 2);
    }

    #[test]
    fn bcrypt_cost_bounds_are_checked() {
        let err = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "0123456789abcdef"),
            ("SECURITY_BCRYPT_COST", "2"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SECURITY_BCRYPT_COST", .. }));
    }

    #[test]
    fn lifetimes_are_bounded() {
        for (key, value) in [
            ("SECURITY_INVITE_TTL_HOURS", "18446744073709551615"),
            ("SECURITY_INVITE_TTL_HOURS", "0"),
            ("SECURITY_JWT_EXPIRY_HOURS", "9000000000000"),
            ("SECURITY_MAX_IMPERSONATION_MINUTES", "0"),
            ("SECURITY_MAX_IMPERSONATION_MINUTES", "100000"),
        ] {
            let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "0123456789abcdef"), (key, value)]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "{}={} accepted",
                key,
                value
            );
        }

        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "0123456789abcdef"),
            ("SECURITY_INVITE_TTL_HOURS", "8784"),
        ]))
        .unwrap();
        assert_eq!(config.security.invite_ttl_hours, MAX_TTL_HOURS);
    }

    #[test]
    fn secret_is_redacted_in_debug() {
        let secret = JwtSecret::new("super-secret-signing-key").unwrap();
        let printed = format!("{:?}", secret);
        assert!(!printed.contains("super-secret"));
    }
}
