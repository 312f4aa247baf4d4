// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, Json};

use crate::{auth::Auth, error::ApiError, models::UserView, state::AppState};

/// Get the current authenticated member.
///
/// Identity comes from the gateway-injected headers; the member record is
/// looked up fresh so role and status changes show immediately.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current member", body = UserView),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Member no longer exists"),
    )
)]
pub async fn get_current_user(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserView>, ApiError> {
    let store = state.store.read().await;
    let record = store
        .user(&user.user_id)
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(UserView::from(record)))
}
