// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Portal Gateway - Localized Membership Portal Edge Service
//!
//! Serves the English/Arabic membership portal API behind a single request
//! gateway that negotiates locale, authenticates tokens and enforces roles.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Passwords, tokens, identity extractors and the gateway
//! - `locale` - Accept-Language negotiation
//! - `routes` - Path classification
//! - `policy` - Path prefix → role access table
//! - `rate_limit` - Sliding-window limiter with injectable store
//! - `store` - In-memory member directory

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod locale;
pub mod models;
pub mod policy;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod store;
