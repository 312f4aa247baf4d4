// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Locale negotiation.
//!
//! Matches the client's `Accept-Language` preference list against the
//! supported locales using RFC 4647 lookup (progressive truncation of
//! subtags). Any negotiation failure falls back to the default locale.

/// Locales the portal is published in, in display order.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "ar"];

pub const DEFAULT_LOCALE: &str = "en";

/// Longest language tag accepted from a client.
const MAX_TAG_LEN: usize = 35;

/// Text direction for a locale.
pub fn text_direction(locale: &str) -> &'static str {
    match locale {
        "ar" | "fa" | "he" | "ur" => "rtl",
        _ => "ltr",
    }
}

/// Negotiate the best supported locale for a request.
///
/// Never fails: a missing or malformed header, or a preference list with no
/// supported match, resolves to `default`.
pub fn resolve(accept_language: Option<&str>, supported: &[&str], default: &str) -> String {
    let Some(header) = accept_language else {
        return default.to_string();
    };

    for tag in preferences(header) {
        if let Some(found) = lookup(&tag, supported) {
            return found.to_string();
        }
    }

    default.to_string()
}

/// Parse an `Accept-Language` value into tags ordered by descending quality.
///
/// Malformed entries are skipped; entries with `q=0` and the `*` wildcard
/// are dropped since lookup falls back to the default anyway.
fn preferences(header: &str) -> Vec<String> {
    let mut weighted: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if !is_valid_tag(tag) || tag == "*" {
                return None;
            }

            let mut quality = 1.0f32;
            for param in parts {
                let (key, value) = param.trim().split_once('=')?;
                if key.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse().ok()?;
                }
            }
            if !(0.0..=1.0).contains(&quality) || quality == 0.0 {
                return None;
            }

            Some((tag.to_ascii_lowercase(), quality))
        })
        .collect();

    // Stable sort keeps the client's order among equal weights.
    weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
    weighted.into_iter().map(|(tag, _)| tag).collect()
}

fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag.len() <= MAX_TAG_LEN
        && tag
            .split('-')
            .all(|sub| !sub.is_empty() && sub.chars().all(|c| c.is_ascii_alphanumeric() || c == '*'))
}

/// RFC 4647 §3.4 lookup of a single range against the supported set.
fn lookup<'a>(range: &str, supported: &[&'a str]) -> Option<&'a str> {
    let mut candidate = range;
    loop {
        if let Some(found) = supported
            .iter()
            .find(|locale| locale.eq_ignore_ascii_case(candidate))
        {
            return Some(found);
        }

        let cut = candidate.rfind('-')?;
        candidate = &candidate[..cut];
        // A single-character subtag (e.g. `x`) cannot stand at the end.
        if let Some(prev) = candidate.rfind('-') {
            if candidate.len() - prev == 2 {
                candidate = &candidate[..prev];
            }
        }
    }
}
