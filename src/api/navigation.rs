// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-filtered site navigation.
//!
//! Filtering is cosmetic; the gateway enforces the same access policy.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth::OptionalAuth,
    locale::{DEFAULT_LOCALE, SUPPORTED_LOCALES},
    models::{NavigationItem, NavigationResponse},
    policy::SITE_NAVIGATION,
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NavigationQuery {
    /// `en` or `ar`
    pub locale: Option<String>,
}

fn localized_href(locale: &str, href: &str) -> String {
    if href == "/" {
        format!("/{locale}/")
    } else {
        format!("/{locale}{href}")
    }
}

/// Navigation links visible to the caller.
#[utoipa::path(
    get,
    path = "/api/navigation",
    tag = "Navigation",
    params(NavigationQuery),
    responses(
        (status = 200, description = "Visible links", body = NavigationResponse)
    )
)]
pub async fn navigation(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<NavigationQuery>,
) -> Json<NavigationResponse> {
    let locale = query
        .locale
        .as_deref()
        .and_then(|l| SUPPORTED_LOCALES.iter().copied().find(|s| *s == l))
        .unwrap_or(DEFAULT_LOCALE);

    let role = user.map(|u| u.role);
    let links = state
        .gateway
        .policy
        .visible_links(role, SITE_NAVIGATION)
        .into_iter()
        .map(|link| NavigationItem {
            href: localized_href(locale, link.href),
            label: link.label(locale).to_string(),
        })
        .collect();

    Json(NavigationResponse {
        locale: locale.to_string(),
        links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrefs_carry_locale() {
        assert_eq!(localized_href("ar", "/"), "/ar/");
        assert_eq!(localized_href("en", "/news"), "/en/news");
    }
}
