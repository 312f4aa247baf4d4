// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin member management.
//!
//! The gateway admits admins to every route here, and any member to
//! `PATCH /api/admin/users/<own id>`. The update handler re-checks both so
//! a non-admin can only change their own name and password.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::auth::{hash_blocking, validate_password},
    auth::{AdminOnly, Auth},
    error::ApiError,
    models::{MessageListResponse, UpdateUserRequest, UserListResponse, UserView},
    state::AppState,
};

/// List all members.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All members", body = UserListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<UserListResponse> {
    let store = state.store.read().await;
    let users: Vec<UserView> = store.list_users().into_iter().map(UserView::from).collect();
    let total = users.len();
    Json(UserListResponse { users, total })
}

/// Contact messages, oldest first.
#[utoipa::path(
    get,
    path = "/api/admin/messages",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Received messages", body = MessageListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
    )
)]
pub async fn list_messages(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<MessageListResponse> {
    let messages = state.store.read().await.messages().to_vec();
    let total = messages.len();
    Json(MessageListResponse { messages, total })
}

/// Update a member.
///
/// Admins may change any field of any member (e.g. approve a pending
/// registration). Other members may update only their own name and password.
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Member ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated member", body = UserView),
        (status = 400, description = "Invalid update"),
        (status = 403, description = "Not permitted"),
        (status = 404, description = "Member not found"),
    )
)]
pub async fn update_user(
    Auth(caller): Auth,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(update): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, ApiError> {
    if !caller.is_admin() {
        if caller.user_id != id {
            return Err(ApiError::forbidden("Admin access required"));
        }
        if update.touches_privileged_fields() {
            return Err(ApiError::forbidden("Only admins can change role or status"));
        }
    }

    let password_hash = match update.password.clone() {
        Some(password) => {
            validate_password(&password)?;
            Some(hash_blocking(password).await?)
        }
        None => None,
    };

    let updated = state
        .store
        .write()
        .await
        .update_user(&id, &update, password_hash)?;

    tracing::info!(
        user_id = %updated.id,
        by = %caller.user_id,
        role = %updated.role,
        "member updated"
    );
    Ok(Json(UserView::from(&updated)))
}
