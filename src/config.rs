// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup into an
//! immutable [`Config`] and handed to constructors from there.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | HMAC signing key (at least 32 bytes) | Required |
//! | `JWT_EXPIRATION_SECS` | ACCESS token lifetime in seconds | `3600` |
//! | `OPEN_ENDPOINTS` | Comma-separated open path substrings | `/auth/register,/auth/login,/health` |
//! | `INTROSPECTION_PATHS` | Comma-separated documentation path substrings | `/v3/api-docs,/swagger-ui,/swagger-resources,/webjars` |
//! | `SERVICE_AUTH_KEY` | Shared service-to-service credential | `internal-service-key` |
//! | `USER_SERVICE_URL` | Remote user directory base URL | In-memory directory |
//! | `SEED_ADMIN_EMAIL` / `SEED_ADMIN_PASSWORD` | Admin account for the in-memory directory | None |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::auth::routes::{DEFAULT_INTROSPECTION_PATHS, DEFAULT_OPEN_ENDPOINTS};
use crate::auth::trust::DEFAULT_SERVICE_CREDENTIAL;
use crate::auth::ServiceCredential;
use crate::logging::LogFormat;

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_EXPIRATION_ENV: &str = "JWT_EXPIRATION_SECS";
pub const OPEN_ENDPOINTS_ENV: &str = "OPEN_ENDPOINTS";
pub const INTROSPECTION_PATHS_ENV: &str = "INTROSPECTION_PATHS";
pub const SERVICE_AUTH_KEY_ENV: &str = "SERVICE_AUTH_KEY";
pub const USER_SERVICE_URL_ENV: &str = "USER_SERVICE_URL";
pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default ACCESS token lifetime (one hour).
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 3600;

/// HS256 keys shorter than the hash output are rejected.
pub const MIN_SECRET_LEN: usize = 32;

/// Startup configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("JWT_SECRET must be at least 32 bytes")]
    SecretTooShort,
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process-wide configuration, read-only after startup.
#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub access_ttl_secs: u64,
    pub open_endpoints: Vec<String>,
    pub introspection_paths: Vec<String>,
    pub service_credential: ServiceCredential,
    pub user_service_url: Option<Url>,
    pub seed_admin: Option<(String, String)>,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup(JWT_SECRET_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort);
        }

        let access_ttl_secs = match lookup(JWT_EXPIRATION_ENV) {
            Some(raw) => parse_ttl(&raw)?,
            None => DEFAULT_ACCESS_TTL_SECS,
        };

        let open_endpoints = lookup(OPEN_ENDPOINTS_ENV)
            .map(|raw| split_list(&raw))
            .unwrap_or_else(|| to_owned_list(DEFAULT_OPEN_ENDPOINTS));
        let introspection_paths = lookup(INTROSPECTION_PATHS_ENV)
            .map(|raw| split_list(&raw))
            .unwrap_or_else(|| to_owned_list(DEFAULT_INTROSPECTION_PATHS));

        let service_credential = ServiceCredential::new(
            lookup(SERVICE_AUTH_KEY_ENV)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SERVICE_CREDENTIAL.to_string()),
        );

        let user_service_url = lookup(USER_SERVICE_URL_ENV)
            .filter(|s| !s.is_empty())
            .map(|raw| {
                Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                    name: USER_SERVICE_URL_ENV,
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let seed_admin = match (lookup(SEED_ADMIN_EMAIL_ENV), lookup(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        };

        let host = lookup(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => 8080,
        };

        let log_format = lookup(LOG_FORMAT_ENV)
            .map(|raw| LogFormat::parse(&raw))
            .unwrap_or_default();

        Ok(Self {
            jwt_secret,
            access_ttl_secs,
            open_endpoints,
            introspection_paths,
            service_credential,
            user_service_url,
            seed_admin,
            host,
            port,
            log_format,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: HOST_ENV,
                reason: format!("'{}' is not an IP address", self.host),
            })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret", &"<redacted>")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("open_endpoints", &self.open_endpoints)
            .field("introspection_paths", &self.introspection_paths)
            .field("service_credential", &self.service_credential)
            .field("user_service_url", &self.user_service_url)
            .field("seed_admin", &self.seed_admin.as_ref().map(|(email, _)| email))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn parse_ttl(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            name: JWT_EXPIRATION_ENV,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(secs),
        Err(_) => Err(ConfigError::Invalid {
            name: JWT_EXPIRATION_ENV,
            reason: format!("'{raw}' is not a whole number of seconds"),
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
