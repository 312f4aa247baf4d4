// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity claims and the authenticated identity handed to handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims embedded in every token issued by the portal.
///
/// The role is kept as the raw string so that tokens carrying an unknown
/// role still verify; [`IdentityClaims::role`] maps it to a [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Member identifier
    #[serde(rename = "userId")]
    pub user_id: String,

    pub email: String,

    /// Role name (absent for legacy tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration (Unix timestamp, seconds)
    pub exp: i64,
}

impl IdentityClaims {
    /// Effective role, defaulting to [`Role::User`] when absent or unknown.
    pub fn role(&self) -> Role {
        self.role
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or_default()
    }
}

/// The identity fields a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSubject {
    pub user_id: String,
    pub email: String,
    pub role: Option<Role>,
}

impl ClaimSubject {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role,
        }
    }
}

/// Authenticated member making a request.
///
/// Built by the gateway from verified claims and re-read by handlers from
/// the trusted `x-user-*` headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: &IdentityClaims) -> Self {
        Self {
            user_id: claims.user_id.clone(),
            email: claims.email.clone(),
            role: claims.role(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
