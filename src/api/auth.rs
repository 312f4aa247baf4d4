// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration, login and logout.
//!
//! Successful flows issue a token, set it as the session cookie and return
//! it in the body for bearer use. Token lifetime follows [`SessionPolicy`].

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::OnceLock;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{
        cookie::{clear_session_cookie, session_cookie},
        hash_password, verify_password, ClaimSubject, Role, SessionPolicy,
    },
    error::ApiError,
    models::{AuthResponse, LoginRequest, MemberStatus, RegisterRequest, UserRecord, UserView},
    state::AppState,
    store::InMemoryStore,
};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Hash on the blocking pool; Argon2 is intentionally slow.
pub(crate) async fn hash_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|_| ApiError::internal("Internal server error"))?
        .map_err(ApiError::from)
}

async fn verify_blocking(password: String, digest: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &digest))
        .await
        .map_err(|_| ApiError::internal("Internal server error"))
}

/// Verify against a throwaway digest so unknown emails cost the same
/// Argon2 work as a wrong password.
async fn verify_unknown_member(password: String) -> Result<(), ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, unknown_member_digest()))
        .await
        .map(|_| ())
        .map_err(|_| ApiError::internal("Internal server error"))
}

fn unknown_member_digest() -> &'static str {
    static DIGEST: OnceLock<String> = OnceLock::new();
    DIGEST.get_or_init(|| hash_password("unknown-member-placeholder").unwrap_or_default())
}

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ApiError::bad_request("A valid email address is required")),
    }
}

/// Issue a token for `user` and build the response with its cookie.
fn session_response(
    state: &AppState,
    user: &UserRecord,
    policy: SessionPolicy,
    remember_me: bool,
    status: StatusCode,
) -> Result<axum::response::Response, ApiError> {
    let ttl = policy.ttl(remember_me);
    let subject = ClaimSubject::new(&user.id, &user.email, Some(user.role));
    let token = state.tokens().issue(&subject, ttl)?;
    let cookie = session_cookie(state.cookie_name(), &token, ttl, state.secure_cookies);

    let body = AuthResponse {
        token,
        user: UserView::from(user),
    };
    Ok((status, [(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Register a new member.
///
/// New members start as `pending` until an admin approves them.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Member registered", body = AuthResponse),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    let role = request.role.unwrap_or(Role::Trainee);
    if !role.is_self_assignable() {
        return Err(ApiError::bad_request("Role must be trainer or trainee"));
    }

    let password_hash = hash_blocking(request.password).await?;
    let user = state.store.write().await.create_user(
        &request.name,
        &request.email,
        password_hash,
        role,
        MemberStatus::Pending,
    )?;

    tracing::info!(user_id = %user.id, role = %user.role, "member registered");
    session_response(
        &state,
        &user,
        SessionPolicy::Registration,
        request.remember_me,
        StatusCode::CREATED,
    )
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Membership rejected"),
        (status = 429, description = "Too many login attempts"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let limiter_key = format!("login:{}", request.email.trim().to_lowercase());
    let decision = state.login_limiter.check(&limiter_key);
    if !decision.allowed {
        tracing::warn!("login rate limit exceeded");
        return Err(ApiError::too_many_requests(
            "Too many login attempts, please try again later",
        ));
    }

    let user = state.store.read().await.user_by_email(&request.email).cloned();
    let Some(user) = user else {
        verify_unknown_member(request.password).await?;
        tracing::debug!(remaining = decision.remaining, "login for unknown email");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    if !verify_blocking(request.password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, remaining = decision.remaining, "password mismatch");
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    if user.status == MemberStatus::Rejected {
        return Err(ApiError::forbidden("Membership has been rejected"));
    }

    state.login_limiter.reset(&limiter_key);
    tracing::info!(user_id = %user.id, "member logged in");
    session_response(
        &state,
        &user,
        SessionPolicy::Login,
        request.remember_me,
        StatusCode::OK,
    )
}

/// Clear the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_session_cookie(state.cookie_name(), state.secure_cookies);
    (
        [(SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

/// Create the bootstrap admin account unless the email already exists.
pub fn seed_admin(
    store: &mut InMemoryStore,
    email: &str,
    password: &str,
) -> Result<Option<UserRecord>, ApiError> {
    if store.user_by_email(email).is_some() {
        return Ok(None);
    }

    let password_hash = hash_password(password)?;
    store
        .create_user("Administrator", email, password_hash, Role::Admin, MemberStatus::Approved)
        .map(Some)
}
