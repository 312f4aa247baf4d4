// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification (HS256).
//!
//! Verification fails closed: a wrong signature, a foreign algorithm, an
//! unparsable payload or an expired timestamp all produce a [`TokenError`].
//! Invalid tokens are an expected input, so verification returns a
//! `Result` and never panics.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use super::claims::{ClaimSubject, IdentityClaims};
use crate::config::{ensure_secret, ConfigError, Environment};

/// Reasons a token is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token algorithm is not accepted")]
    InvalidAlgorithm,
    #[error("token has expired")]
    Expired,
    #[error("token could not be signed: {0}")]
    Signing(String),
}

/// Supported token lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTtl {
    OneDay,
    SevenDays,
    ThirtyDays,
}

impl TokenTtl {
    pub fn duration(&self) -> Duration {
        match self {
            TokenTtl::OneDay => Duration::days(1),
            TokenTtl::SevenDays => Duration::days(7),
            TokenTtl::ThirtyDays => Duration::days(30),
        }
    }

    /// Lifetime in seconds, used for the cookie `Max-Age`.
    pub fn as_secs(&self) -> i64 {
        self.duration().num_seconds()
    }
}

impl FromStr for TokenTtl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1d" => Ok(TokenTtl::OneDay),
            "7d" => Ok(TokenTtl::SevenDays),
            "30d" => Ok(TokenTtl::ThirtyDays),
            other => Err(format!("unsupported token ttl: {other}")),
        }
    }
}

/// Which flow a session is being opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPolicy {
    Login,
    Registration,
}

impl SessionPolicy {
    /// Token and cookie lifetime for this flow.
    ///
    /// Login and registration intentionally differ without remember-me
    /// (1 day vs 7 days).
    pub fn ttl(&self, remember_me: bool) -> TokenTtl {
        match (self, remember_me) {
            (_, true) => TokenTtl::ThirtyDays,
            (SessionPolicy::Login, false) => TokenTtl::OneDay,
            (SessionPolicy::Registration, false) => TokenTtl::SevenDays,
        }
    }
}

/// Issues and verifies identity tokens with a symmetric server secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service.
    ///
    /// Fails with [`ConfigError::InsecureSecret`] when a production
    /// environment is configured with the placeholder secret.
    pub fn new(secret: &str, environment: Environment) -> Result<Self, ConfigError> {
        ensure_secret(secret, environment)?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an injectable clock in `verify_at`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn issue(&self, subject: &ClaimSubject, ttl: TokenTtl) -> Result<String, TokenError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &ClaimSubject,
        ttl: TokenTtl,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = IdentityClaims {
            user_id: subject.user_id.clone(),
            email: subject.email.clone(),
            role: subject.role.map(|r| r.as_str().to_string()),
            iat: now.timestamp(),
            exp: (now + ttl.duration()).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, TokenError> {
        let data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::InvalidAlgorithm
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            },
        )?;

        if data.claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
