// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use tokio::sync::RwLock;

use crate::auth::{GatewayConfig, TokenService};
use crate::config::{AppConfig, ConfigError};
use crate::rate_limit::RateLimiter;
use crate::store::InMemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub gateway: GatewayConfig,
    pub login_limiter: RateLimiter,
    /// Mark session cookies `Secure` (production)
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(store: InMemoryStore, gateway: GatewayConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            gateway,
            login_limiter: RateLimiter::in_memory(5, Duration::from_secs(15 * 60)),
            secure_cookies: false,
        }
    }

    /// Build state from the runtime configuration.
    pub fn from_config(config: &AppConfig, store: InMemoryStore) -> Result<Self, ConfigError> {
        let tokens = TokenService::new(&config.jwt_secret, config.environment)?;
        let gateway = GatewayConfig::new(Arc::new(tokens), config.cookie_name.clone());

        Ok(Self::new(store, gateway)
            .with_login_limiter(RateLimiter::in_memory(
                config.login_rate_limit,
                Duration::from_secs(config.login_rate_window_secs),
            ))
            .with_secure_cookies(config.environment.is_production()))
    }

    pub fn with_login_limiter(mut self, limiter: RateLimiter) -> Self {
        self.login_limiter = limiter;
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn tokens(&self) -> &TokenService {
        &self.gateway.tokens
    }

    pub fn cookie_name(&self) -> &str {
        &self.gateway.cookie_name
    }
}

impl FromRef<AppState> for GatewayConfig {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}
