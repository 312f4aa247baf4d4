// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures of the member API. All types derive
//! `ToSchema` for the OpenAPI document; JSON field names are camelCase to
//! match the web client.
//!
//! ## Model Categories
//!
//! - **Members**: registration, login and the public member view
//! - **Administration**: member updates (role, approval status)
//! - **Messages**: contact messages sent by members
//! - **Navigation**: role-filtered site links

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

// =============================================================================
// Members
// =============================================================================

/// Approval state of a registered member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Registered, waiting for an admin decision
    Pending,
    Approved,
    Rejected,
}

/// Stored member record. Never serialized to clients.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
}

/// Member as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserView {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            role: record.role,
            status: record.status,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `trainer` or `trainee` (default)
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Successful login or registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Same token as the cookie, for bearer use
    pub token: String,
    pub user: UserView,
}

// =============================================================================
// Administration
// =============================================================================

/// Partial member update. Role and status changes require an admin.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub status: Option<MemberStatus>,
}

impl UpdateUserRequest {
    pub fn touches_privileged_fields(&self) -> bool {
        self.role.is_some() || self.status.is_some()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserView>,
    pub total: usize,
}

// =============================================================================
// Messages
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub sender_id: String,
    pub sender_email: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageListResponse {
    pub messages: Vec<ContactMessage>,
    pub total: usize,
}

// =============================================================================
// Navigation
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NavigationItem {
    /// Localized href, e.g. `/ar/news`
    pub href: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NavigationResponse {
    pub locale: String,
    pub links: Vec<NavigationItem>,
}
