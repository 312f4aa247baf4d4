// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Credentials, tokens and the request gateway for the portal.
//!
//! ## Auth Flow
//!
//! 1. A member logs in or registers; the password is checked against its
//!    Argon2id digest.
//! 2. The server issues an HS256 token carrying `userId`, `email`, `role`
//!    and sets it as an `HttpOnly` cookie (also returned for bearer use).
//! 3. On every request the gateway:
//!    - redirects unlocalized page paths to `/<locale>/...`
//!    - extracts the token (bearer header first, then cookie)
//!    - verifies signature and expiry
//!    - checks the role against the access policy
//!    - forwards `x-user-id`, `x-user-email`, `x-user-role` to handlers
//!
//! ## Security
//!
//! - Tokens are stateless; there is no server-side revocation
//! - Verification fails closed on any anomaly
//! - Production refuses to start with the placeholder secret

pub mod claims;
pub mod cookie;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, ClaimSubject, IdentityClaims};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, OptionalAuth};
pub use middleware::{gateway, GatewayConfig, GatewayDecision};
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::Role;
pub use token::{SessionPolicy, TokenError, TokenService, TokenTtl};
