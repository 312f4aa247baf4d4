// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! The user-facing messages are deliberately coarse: a missing token and an
//! invalid one are distinguished, but the reason a token was refused is
//! never exposed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No token in the `Authorization` header or the token cookie
    #[error("Authentication required")]
    MissingToken,
    /// Token failed verification (signature, algorithm, payload or expiry)
    #[error("Invalid or expired token")]
    InvalidToken,
    /// Authenticated, but the route requires the admin role
    #[error("Admin access required")]
    AdminRequired,
    /// Handler reached without gateway-injected identity headers
    #[error("Authentication required")]
    MissingIdentity,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::MissingIdentity => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::AdminRequired => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(AuthErrorBody {
            error: self.to_string(),
        });
        (self.status_code(), body).into_response()
    }
}
