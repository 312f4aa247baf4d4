// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Member roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Member roles carried in identity claims.
///
/// ## Roles
///
/// - `Admin` - CMS and member administration
/// - `Trainer` - Approved trainer account
/// - `Trainee` - Registered trainee account
/// - `User` - Authenticated account without a specific role (implicit default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Trainer member
    Trainer,
    /// Trainee member
    Trainee,
    /// Fallback for claims without a recognized role
    User,
}

impl Role {
    /// Parse role from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "trainer" => Some(Role::Trainer),
            "trainee" => Some(Role::Trainee),
            "user" | "guest" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Trainer => "trainer",
            Role::Trainee => "trainee",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }

    /// Roles a visitor may pick for themselves at registration.
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Role::Trainer | Role::Trainee)
    }
}

impl Default for Role {
    /// Claims without a role are treated as plain users (least privilege).
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
