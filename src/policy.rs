// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Access Policy
//!
//! The one table of path prefix → required access. The gateway derives its
//! protected and admin-restricted prefix lists from it, and navigation
//! filtering consults the same table, so the two can never drift.
//!
//! Prefix matching is "starts with" against both the raw path and the
//! locale-stripped path. When several rules match, the longest prefix wins.
//! Paths matching no rule are public.

use crate::auth::Role;
use crate::locale::SUPPORTED_LOCALES;
use crate::routes::strip_locale;

/// What a rule requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any verified identity
    Authenticated,
    /// A verified identity holding one of the listed roles
    Roles(&'static [Role]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRule {
    pub prefix: &'static str,
    pub access: Access,
}

const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Portal access rules.
pub const ACCESS_RULES: &[AccessRule] = &[
    // Admin CMS pages
    AccessRule {
        prefix: "/admin",
        access: Access::Roles(ADMIN_ONLY),
    },
    // Admin API (users, news, gallery, partners, jobs, page settings)
    AccessRule {
        prefix: "/api/admin",
        access: Access::Roles(ADMIN_ONLY),
    },
    // Current-user lookup
    AccessRule {
        prefix: "/api/auth/me",
        access: Access::Authenticated,
    },
    // Contact message send
    AccessRule {
        prefix: "/api/messages",
        access: Access::Authenticated,
    },
];

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(ACCESS_RULES.to_vec())
    }
}

impl AccessPolicy {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    /// Prefixes that require any authenticated identity.
    pub fn protected_prefixes(&self) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|r| r.access == Access::Authenticated)
            .map(|r| r.prefix)
            .collect()
    }

    /// Prefixes that require a specific role.
    pub fn role_restricted_prefixes(&self) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|r| matches!(r.access, Access::Roles(_)))
            .map(|r| r.prefix)
            .collect()
    }

    /// Most specific rule governing `path`, if any.
    pub fn rule_for(&self, path: &str) -> Option<&AccessRule> {
        let stripped = strip_locale(path, SUPPORTED_LOCALES);
        self.rules
            .iter()
            .filter(|r| path.starts_with(r.prefix) || stripped.starts_with(r.prefix))
            .max_by_key(|r| r.prefix.len())
    }

    /// Whether a caller with `role` (`None` for anonymous) may reach `path`.
    pub fn can_access(&self, role: Option<Role>, path: &str) -> bool {
        match self.rule_for(path).map(|r| r.access) {
            None => true,
            Some(Access::Authenticated) => role.is_some(),
            Some(Access::Roles(allowed)) => role.is_some_and(|r| allowed.contains(&r)),
        }
    }

    /// Navigation links the caller may see.
    pub fn visible_links<'a>(&self, role: Option<Role>, links: &'a [NavLink]) -> Vec<&'a NavLink> {
        links
            .iter()
            .filter(|link| self.can_access(role, link.href))
            .collect()
    }
}

/// A site navigation entry, with its href relative to the locale prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub href: &'static str,
    pub label_en: &'static str,
    pub label_ar: &'static str,
}

impl NavLink {
    pub fn label(&self, locale: &str) -> &'static str {
        if locale == "ar" {
            self.label_ar
        } else {
            self.label_en
        }
    }
}

pub const SITE_NAVIGATION: &[NavLink] = &[
    NavLink { href: "/", label_en: "Home", label_ar: "الرئيسية" },
    NavLink { href: "/about", label_en: "About", label_ar: "من نحن" },
    NavLink { href: "/news", label_en: "News", label_ar: "الأخبار" },
    NavLink { href: "/gallery", label_en: "Gallery", label_ar: "المعرض" },
    NavLink { href: "/partners", label_en: "Partners", label_ar: "الشركاء" },
    NavLink { href: "/jobs", label_en: "Jobs", label_ar: "الوظائف" },
    NavLink { href: "/contact", label_en: "Contact", label_ar: "اتصل بنا" },
    NavLink { href: "/admin", label_en: "Dashboard", label_ar: "لوحة التحكم" },
];
