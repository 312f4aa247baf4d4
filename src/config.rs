// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup. A
//! production configuration without a real signing secret is refused.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APP_ENV` | `production` or `development` | `development` |
//! | `JWT_SECRET` | HS256 token signing secret | Required for production |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `AUTH_COOKIE_NAME` | Name of the token cookie | `token` |
//! | `SEED_ADMIN_EMAIL` | Bootstrap admin account email | Optional |
//! | `SEED_ADMIN_PASSWORD` | Bootstrap admin account password | Optional |
//! | `LOGIN_RATE_LIMIT` | Login attempts allowed per window | `5` |
//! | `LOGIN_RATE_WINDOW_SECS` | Login rate limit window | `900` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;

use thiserror::Error;

pub const APP_ENV_ENV: &str = "APP_ENV";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const AUTH_COOKIE_NAME_ENV: &str = "AUTH_COOKIE_NAME";
pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const LOGIN_RATE_LIMIT_ENV: &str = "LOGIN_RATE_LIMIT";
pub const LOGIN_RATE_WINDOW_ENV: &str = "LOGIN_RATE_WINDOW_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Placeholder secret used when `JWT_SECRET` is unset outside production.
pub const DEFAULT_JWT_SECRET: &str = "dev-only-insecure-secret";

pub const DEFAULT_COOKIE_NAME: &str = "token";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{} must be set to a non-default value in production", JWT_SECRET_ENV)]
    InsecureSecret,
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "production" || v == "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub cookie_name: String,
    pub seed_admin: Option<(String, String)>,
    pub login_rate_limit: usize,
    pub login_rate_window_secs: u64,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::parse(lookup(APP_ENV_ENV).as_deref());

        let jwt_secret = lookup(JWT_SECRET_ENV)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());
        ensure_secret(&jwt_secret, environment)?;

        let host = lookup(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, PORT_ENV, 3000u16)?;
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: HOST_ENV,
                    value: host.clone(),
                })?;

        let cookie_name = lookup(AUTH_COOKIE_NAME_ENV)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());

        let seed_admin = match (lookup(SEED_ADMIN_EMAIL_ENV), lookup(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            environment,
            jwt_secret,
            bind_addr,
            cookie_name,
            seed_admin,
            login_rate_limit: parse_or(&lookup, LOGIN_RATE_LIMIT_ENV, 5usize)?,
            login_rate_window_secs: parse_or(&lookup, LOGIN_RATE_WINDOW_ENV, 900u64)?,
            log_format,
        })
    }
}

/// Refuse the placeholder (or an empty) secret in production.
pub fn ensure_secret(secret: &str, environment: Environment) -> Result<(), ConfigError> {
    if environment.is_production() && (secret.trim().is_empty() || secret == DEFAULT_JWT_SECRET) {
        return Err(ConfigError::InsecureSecret);
    }
    Ok(())
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}
