// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fallback for routes no handler claims.
//!
//! Page content is rendered by the web frontend; this serves the localized
//! document shell it mounts into. Unknown API paths get a JSON 404.

use axum::{
    http::Uri,
    response::{Html, IntoResponse, Response},
};

use crate::{
    error::ApiError,
    locale::{text_direction, DEFAULT_LOCALE, SUPPORTED_LOCALES},
    routes::{is_api_route, path_locale},
};

pub async fn fallback(uri: Uri) -> Response {
    let path = uri.path();
    if is_api_route(path) {
        return ApiError::not_found("Not found").into_response();
    }

    let locale = path_locale(path, SUPPORTED_LOCALES).unwrap_or(DEFAULT_LOCALE);
    Html(page_shell(locale)).into_response()
}

fn page_shell(locale: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"{locale}\" dir=\"{dir}\">\n<head><meta charset=\"utf-8\"></head>\n<body><div id=\"root\"></div></body>\n</html>\n",
        dir = text_direction(locale)
    )
}
