// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route classification.
//!
//! Pure functions over the request path. Restriction checks run against
//! both the raw path and the locale-stripped path, so `/en/admin/x`,
//! `/admin/x` and `/api/admin/x` classify uniformly.

use crate::policy::AccessPolicy;

/// Prefix of framework/static asset paths that never get a locale.
pub const ASSET_PREFIX: &str = "/_next";

/// Path of the self-service user row endpoint (`/api/admin/users/<id>`).
const USER_ROW_PREFIX: &str = "/api/admin/users/";

/// True iff `path` is `/<locale>` or starts with `/<locale>/`.
pub fn is_localized_path(path: &str, locales: &[&str]) -> bool {
    path_locale(path, locales).is_some()
}

/// The supported locale leading `path`, if any.
pub fn path_locale<'a>(path: &str, locales: &[&'a str]) -> Option<&'a str> {
    let rest = path.strip_prefix('/')?;
    let segment = rest.split('/').next().unwrap_or_default();
    locales.iter().copied().find(|locale| *locale == segment)
}

/// Remove a leading locale segment; `/en` becomes `/`.
pub fn strip_locale<'p>(path: &'p str, locales: &[&str]) -> &'p str {
    match path_locale(path, locales) {
        Some(locale) => {
            let rest = &path[1 + locale.len()..];
            if rest.is_empty() {
                "/"
            } else {
                rest
            }
        }
        None => path,
    }
}

/// True iff `path` or its locale-stripped form starts with any prefix.
pub fn matches_any_prefix(path: &str, prefixes: &[&str], locales: &[&str]) -> bool {
    let stripped = strip_locale(path, locales);
    prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix) || stripped.starts_with(prefix))
}

/// API routes answer with JSON errors instead of redirects.
pub fn is_api_route(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// API, asset and file paths bypass locale negotiation.
pub fn skips_locale_handling(path: &str) -> bool {
    is_api_route(path)
        || path == ASSET_PREFIX
        || path.starts_with(&format!("{ASSET_PREFIX}/"))
        || path.contains('.')
}

/// The `<id>` of `/api/admin/users/<id>`, when the path is exactly that.
pub fn user_row_target(path: &str) -> Option<&str> {
    let id = path.strip_prefix(USER_ROW_PREFIX)?;
    (!id.is_empty() && !id.contains('/')).then_some(id)
}

/// Per-request classification record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteClassification<'a> {
    pub pathname: &'a str,
    pub stripped: &'a str,
    pub is_api_route: bool,
    pub is_protected: bool,
    pub is_admin_restricted: bool,
    pub locale: Option<&'static str>,
}

impl<'a> RouteClassification<'a> {
    pub fn classify(
        pathname: &'a str,
        policy: &AccessPolicy,
        locales: &[&'static str],
    ) -> Self {
        Self {
            pathname,
            stripped: strip_locale(pathname, locales),
            is_api_route: is_api_route(pathname),
            is_protected: matches_any_prefix(pathname, &policy.protected_prefixes(), locales),
            is_admin_restricted: matches_any_prefix(
                pathname,
                &policy.role_restricted_prefixes(),
                locales,
            ),
            locale: path_locale(pathname, locales),
        }
    }

    pub fn needs_identity(&self) -> bool {
        self.is_protected || self.is_admin_restricted
    }

    /// Admin-restricted page (not API) routes redirect instead of erroring.
    pub fn is_restricted_page(&self) -> bool {
        self.is_admin_restricted && !self.is_api_route
    }
}
