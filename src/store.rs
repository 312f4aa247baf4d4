// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory member directory and message outbox.
//!
//! Stands in for the document database used in deployment; handlers only
//! see this interface.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::Role;
use crate::error::ApiError;
use crate::models::{ContactMessage, MemberStatus, UpdateUserRequest, UserRecord};

#[derive(Default)]
pub struct InMemoryStore {
    users: HashMap<String, UserRecord>,
    messages: Vec<ContactMessage>,
}

/// Emails are matched case-insensitively.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_user(
        &mut self,
        name: &str,
        email: &str,
        password_hash: String,
        role: Role,
        status: MemberStatus,
    ) -> Result<UserRecord, ApiError> {
        let email = normalize_email(email);
        if self.user_by_email(&email).is_some() {
            return Err(ApiError::conflict("Email already registered"));
        }

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email,
            password_hash,
            role,
            status,
            created_at: Utc::now(),
        };
        self.users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    pub fn user(&self, id: &str) -> Option<&UserRecord> {
        self.users.get(id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        let email = normalize_email(email);
        self.users.values().find(|u| u.email == email)
    }

    /// All members, oldest first.
    pub fn list_users(&self) -> Vec<&UserRecord> {
        let mut users: Vec<&UserRecord> = self.users.values().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        users
    }

    /// Apply an update. `password_hash` replaces the stored digest when set.
    pub fn update_user(
        &mut self,
        id: &str,
        update: &UpdateUserRequest,
        password_hash: Option<String>,
    ) -> Result<UserRecord, ApiError> {
        let record = self
            .users
            .get_mut(id)
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        if let Some(name) = update.name.as_deref().map(str::trim) {
            if name.is_empty() {
                return Err(ApiError::bad_request("Name must not be empty"));
            }
            record.name = name.to_string();
        }
        if let Some(hash) = password_hash {
            record.password_hash = hash;
        }
        if let Some(role) = update.role {
            record.role = role;
        }
        if let Some(status) = update.status {
            record.status = status;
        }

        Ok(record.clone())
    }

    pub fn record_message(&mut self, message: ContactMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ContactMessage] {
        &self.messages
    }
}
