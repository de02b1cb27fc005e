// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token-based identity at the edge, header-based trust inside services.
//!
//! ## Auth Flow
//!
//! 1. Client logs in at `/auth/login` and receives ACCESS + REFRESH tokens
//! 2. Client sends `Authorization: Bearer <access token>`
//! 3. Edge gate (`gate`):
//!    - Classifies the path (`routes`)
//!    - Verifies signature and expiry (`codec`)
//!    - Forwards with `X-User-Id` / `X-User-Role`
//! 4. Internal service (`trust`):
//!    - `X-Service-Auth` with the shared credential → `service-account`
//!    - else identity headers → user identity
//!    - else unauthenticated
//!
//! ## Security
//!
//! - Tokens are HS256 JWTs under one shared signing key
//! - Every edge failure is an empty 401
//! - There is no revocation list; a leaked token stays valid until it expires
//! - Internal services trust identity headers without re-verification

use axum::http::HeaderName;

pub mod claims;
pub mod codec;
pub mod error;
pub mod gate;
pub mod identity;
pub mod roles;
pub mod routes;
pub mod trust;

pub use claims::{TokenClaims, TokenKind};
pub use codec::TokenCodec;
pub use error::{AuthError, TokenError};
pub use gate::{edge_auth, EdgeGate};
pub use identity::{Identity, IdentityContext, OptionalIdentity, Principal};
pub use roles::{Role, RoleSet};
pub use routes::RoutePolicy;
pub use trust::{service_trust, ServiceCredential, ServiceTrust};

/// User id forwarded by the edge gate.
pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// Role claim forwarded by the edge gate (comma-joined when several).
pub const USER_ROLE_HEADER: HeaderName = HeaderName::from_static("x-user-role");

/// Shared service-to-service credential.
pub const SERVICE_AUTH_HEADER: HeaderName = HeaderName::from_static("x-service-auth");
