// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request gateway.
//!
//! Runs once in front of every route and merges locale negotiation,
//! authentication and role authorization into a single pass:
//!
//! 1. API, asset and file paths skip locale handling.
//! 2. Other paths without a locale prefix are redirected to
//!    `/<locale><path>`.
//! 3. The path is classified against the access policy.
//! 4. Unrestricted routes pass through unchanged.
//! 5. Restricted routes need a token (bearer header, then cookie).
//! 6. The token must verify.
//! 7. Admin-restricted routes need the admin role, except a member
//!    updating their own row at `/api/admin/users/<id>`.
//! 8. The request is forwarded with trusted `x-user-*` headers.
//!
//! Failures on admin pages redirect (login or home); everything else gets a
//! JSON error with 401 or 403.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::{cookie::extract_token, AuthError, AuthenticatedUser, TokenService};
use crate::locale::{self, DEFAULT_LOCALE, SUPPORTED_LOCALES};
use crate::policy::AccessPolicy;
use crate::routes::{self, RouteClassification};

pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");
pub const USER_EMAIL_HEADER: HeaderName = HeaderName::from_static("x-user-email");
pub const USER_ROLE_HEADER: HeaderName = HeaderName::from_static("x-user-role");

/// Shared, read-only inputs of the gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    pub tokens: Arc<TokenService>,
    pub policy: Arc<AccessPolicy>,
    pub cookie_name: String,
    pub locales: &'static [&'static str],
    pub default_locale: &'static str,
}

impl GatewayConfig {
    pub fn new(tokens: Arc<TokenService>, cookie_name: impl Into<String>) -> Self {
        Self {
            tokens,
            policy: Arc::new(AccessPolicy::default()),
            cookie_name: cookie_name.into(),
            locales: SUPPORTED_LOCALES,
            default_locale: DEFAULT_LOCALE,
        }
    }
}

/// Everything the gateway reads from a request, gathered once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub path: String,
    pub query: Option<String>,
    pub token: Option<String>,
    pub accept_language: Option<String>,
}

impl RequestContext {
    pub fn new(uri: &Uri, headers: &HeaderMap, cookie_name: &str) -> Self {
        Self {
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            token: extract_token(headers, cookie_name),
            accept_language: headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }
}

/// Outcome of one gateway pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayDecision {
    /// Forward unchanged
    PassThrough,
    /// Redirect to the given location
    Redirect(String),
    /// Respond with a JSON error
    Reject(AuthError),
    /// Forward with identity headers attached
    Forward(AuthenticatedUser),
}

/// Decide what to do with a request.
pub fn decide(ctx: &RequestContext, config: &GatewayConfig) -> GatewayDecision {
    let path = ctx.path.as_str();

    if !routes::skips_locale_handling(path) && !routes::is_localized_path(path, config.locales) {
        let locale = negotiated_locale(ctx, config);
        let mut location = format!("/{locale}{path}");
        if let Some(query) = &ctx.query {
            location.push('?');
            location.push_str(query);
        }
        tracing::debug!(path, %location, "redirecting to localized path");
        return GatewayDecision::Redirect(location);
    }

    let route = RouteClassification::classify(path, &config.policy, config.locales);
    if !route.needs_identity() {
        return GatewayDecision::PassThrough;
    }

    let Some(token) = ctx.token.as_deref() else {
        tracing::debug!(path, "no token on restricted route");
        return unauthenticated(&route, ctx, config, AuthError::MissingToken);
    };

    let claims = match config.tokens.verify(token) {
        Ok(claims) => claims,
        Err(reason) => {
            tracing::debug!(path, %reason, "token rejected");
            return unauthenticated(&route, ctx, config, AuthError::InvalidToken);
        }
    };
    let user = AuthenticatedUser::from_claims(&claims);

    if route.is_admin_restricted && !config.policy.can_access(Some(user.role), path) {
        let self_update = routes::user_row_target(route.stripped)
            .is_some_and(|id| id == user.user_id);
        if !self_update {
            tracing::debug!(path, user_id = %user.user_id, role = %user.role, "role not permitted");
            return if route.is_api_route {
                GatewayDecision::Reject(AuthError::AdminRequired)
            } else {
                GatewayDecision::Redirect(format!("/{}/", page_locale(&route, ctx, config)))
            };
        }
    }

    GatewayDecision::Forward(user)
}

fn unauthenticated(
    route: &RouteClassification<'_>,
    ctx: &RequestContext,
    config: &GatewayConfig,
    error: AuthError,
) -> GatewayDecision {
    if route.is_restricted_page() {
        GatewayDecision::Redirect(format!("/{}/login", page_locale(route, ctx, config)))
    } else {
        GatewayDecision::Reject(error)
    }
}

fn negotiated_locale(ctx: &RequestContext, config: &GatewayConfig) -> String {
    locale::resolve(
        ctx.accept_language.as_deref(),
        config.locales,
        config.default_locale,
    )
}

/// Locale for a redirect target: the path's own prefix, else negotiated.
fn page_locale(route: &RouteClassification<'_>, ctx: &RequestContext, config: &GatewayConfig) -> String {
    route
        .locale
        .map(str::to_string)
        .unwrap_or_else(|| negotiated_locale(ctx, config))
}

/// Remove identity headers a client may have supplied itself.
pub fn strip_identity_headers(headers: &mut HeaderMap) {
    headers.remove(USER_ID_HEADER);
    headers.remove(USER_EMAIL_HEADER);
    headers.remove(USER_ROLE_HEADER);
}

fn attach_identity(headers: &mut HeaderMap, user: &AuthenticatedUser) -> Result<(), AuthError> {
    let value = |s: &str| HeaderValue::from_bytes(s.as_bytes()).map_err(|_| AuthError::InvalidToken);
    headers.insert(USER_ID_HEADER, value(&user.user_id)?);
    headers.insert(USER_EMAIL_HEADER, value(&user.email)?);
    headers.insert(USER_ROLE_HEADER, value(user.role.as_str())?);
    Ok(())
}

/// Gateway middleware.
///
/// ```rust,ignore
/// let app = Router::new()
///     .merge(routes)
///     .layer(axum::middleware::from_fn_with_state(gateway_config, gateway));
/// ```
pub async fn gateway(
    State(config): State<GatewayConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    strip_identity_headers(request.headers_mut());

    let ctx = RequestContext::new(request.uri(), request.headers(), &config.cookie_name);

    match decide(&ctx, &config) {
        GatewayDecision::PassThrough => next.run(request).await,
        GatewayDecision::Redirect(location) => Redirect::temporary(&location).into_response(),
        GatewayDecision::Reject(error) => error.into_response(),
        GatewayDecision::Forward(user) => {
            if let Err(error) = attach_identity(request.headers_mut(), &user) {
                tracing::warn!(user_id = %user.user_id, "identity not representable as headers");
                return error.into_response();
            }
            request.extensions_mut().insert(user);
            next.run(request).await
        }
    }
}
