// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the identity the gateway established.
//!
//! Handlers behind the gateway read the trusted `x-user-*` headers:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! The gateway strips client-supplied copies of those headers, so their
//! presence means the gateway verified a token for this request.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap, HeaderName},
};

use super::{
    cookie::extract_token,
    middleware::{GatewayConfig, USER_EMAIL_HEADER, USER_ID_HEADER, USER_ROLE_HEADER},
    AuthError, AuthenticatedUser, Role,
};

/// Extractor for the authenticated member.
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The gateway also stores the identity as an extension.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        identity_from_headers(&parts.headers)
            .map(Auth)
            .ok_or(AuthError::MissingIdentity)
    }
}

fn identity_from_headers(headers: &HeaderMap) -> Option<AuthenticatedUser> {
    let read = |name: &HeaderName| {
        headers
            .get(name)
            .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
            .map(str::to_string)
    };

    let user_id = read(&USER_ID_HEADER).filter(|id| !id.is_empty())?;
    let email = read(&USER_EMAIL_HEADER).unwrap_or_default();
    let role = read(&USER_ROLE_HEADER)
        .as_deref()
        .and_then(Role::parse)
        .unwrap_or_default();

    Some(AuthenticatedUser {
        user_id,
        email,
        role,
    })
}

/// Extractor that requires the admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::AdminRequired);
        }

        Ok(AdminOnly(user))
    }
}

/// Optional authentication for public routes.
///
/// Public routes pass through the gateway untouched, so this verifies the
/// token itself. Returns `None` instead of rejecting.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    GatewayConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Ok(Auth(user)) = Auth::from_request_parts(parts, state).await {
            return Ok(OptionalAuth(Some(user)));
        }

        let config = GatewayConfig::from_ref(state);
        let user = extract_token(&parts.headers, &config.cookie_name)
            .and_then(|token| config.tokens.verify(&token).ok())
            .map(|claims| AuthenticatedUser::from_claims(&claims));

        Ok(OptionalAuth(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{ClaimSubject, TokenService, TokenTtl};
    use crate::config::Environment;
    use axum::http::Request;
    use std::sync::Arc;

    fn gateway_config() -> GatewayConfig {
        let tokens = TokenService::new("extractor-test-secret", Environment::Development).unwrap();
        GatewayConfig::new(Arc::new(tokens), "token")
    }

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/test");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_requires_identity_headers() {
        let mut parts = parts_with(&[]);
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingIdentity)));
    }

    #[tokio::test]
    async fn auth_reads_identity_headers() {
        let mut parts = parts_with(&[
            ("x-user-id", "123"),
            ("x-user-email", "t@example.org"),
            ("x-user-role", "trainer"),
        ]);
        let Auth(user) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.user_id, "123");
        assert_eq!(user.email, "t@example.org");
        assert_eq!(user.role, Role::Trainer);
    }

    #[tokio::test]
    async fn auth_prefers_extensions() {
        let mut parts = parts_with(&[("x-user-id", "from-header")]);
        parts.extensions.insert(AuthenticatedUser {
            user_id: "from-gateway".to_string(),
            email: "a@b.c".to_string(),
            role: Role::Admin,
        });

        let Auth(user) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.user_id, "from-gateway");
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let mut parts = parts_with(&[("x-user-id", "5"), ("x-user-role", "trainee")]);
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::AdminRequired)));
    }

    #[tokio::test]
    async fn optional_auth_returns_none_without_token() {
        let config = gateway_config();
        let mut parts = parts_with(&[]);
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &config)
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn optional_auth_verifies_cookie_token() {
        let config = gateway_config();
        let token = config
            .tokens
            .issue(
                &ClaimSubject::new("9", "admin@example.org", Some(Role::Admin)),
                TokenTtl::OneDay,
            )
            .unwrap();
        let cookie = format!("token={token}");
        let mut parts = parts_with(&[("cookie", cookie.as_str())]);

        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &config)
            .await
            .unwrap();
        assert_eq!(user.map(|u| u.role), Some(Role::Admin));
    }

    #[tokio::test]
    async fn optional_auth_ignores_bad_token() {
        let config = gateway_config();
        let mut parts = parts_with(&[("authorization", "Bearer nope")]);
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &config)
            .await
            .unwrap();
        assert!(user.is_none());
    }
}
