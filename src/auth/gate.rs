// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Edge authentication gate.
//!
//! Runs at the ingress point in front of every route. For protected paths it
//! requires `Authorization: Bearer <token>`, verifies the token and rewrites
//! the request with trusted identity headers before forwarding it:
//!
//! | Step | Check | On failure |
//! |------|-------|------------|
//! | Classify | `RoutePolicy::is_protected` | forward unchanged |
//! | Presence | `Authorization` header exists | 401 |
//! | Scheme | value starts with `Bearer ` | 401 |
//! | Expiry | `TokenCodec::is_expired` is false | 401 |
//! | Enrich | claims fit into headers | 401 |
//!
//! Verification happens once per request and nothing is cached.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/tasks", get(list_tasks))
//!     .layer(axum::middleware::from_fn_with_state(gate, edge_auth));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::codec::TokenCodec;
use super::routes::RoutePolicy;
use super::{AuthError, USER_ID_HEADER, USER_ROLE_HEADER};

/// Literal prefix of a bearer credential.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Identity read from a verified token, ready to forward downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedIdentity {
    /// `X-User-Id` value
    pub user_id: HeaderValue,
    /// `X-User-Role` value (raw role claim)
    pub role: HeaderValue,
}

/// Shared, read-only state of the edge gate.
#[derive(Debug, Clone)]
pub struct EdgeGate {
    codec: Arc<TokenCodec>,
    routes: Arc<RoutePolicy>,
}

impl EdgeGate {
    pub fn new(codec: Arc<TokenCodec>, routes: Arc<RoutePolicy>) -> Self {
        Self { codec, routes }
    }

    pub fn routes(&self) -> &RoutePolicy {
        &self.routes
    }

    /// Run the gate over one request.
    ///
    /// Open routes come back untouched. Protected routes come back carrying
    /// `X-User-Id` and `X-User-Role`, with the original bearer header kept.
    pub fn admit(&self, mut request: Request) -> Result<Request, AuthError> {
        let path = request.uri().path();
        if !self.routes.is_protected(path) {
            tracing::debug!(path, "Public endpoint, skipping authentication");
            return Ok(request);
        }

        tracing::debug!(path, "Protected endpoint");
        let identity = self.authenticate(request.headers())?;

        let headers = request.headers_mut();
        headers.insert(USER_ID_HEADER, identity.user_id);
        headers.insert(USER_ROLE_HEADER, identity.role);
        Ok(request)
    }

    /// Check the bearer credential in `headers` and read its identity.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<ForwardedIdentity, AuthError> {
        let auth_header = headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingCredential)?
            .to_str()
            .map_err(|_| AuthError::MalformedScheme)?;

        let token = auth_header
            .strip_prefix(BEARER_PREFIX)
            .ok_or(AuthError::MalformedScheme)?;

        if self.codec.is_expired(token) {
            return Err(AuthError::InvalidOrExpiredToken);
        }

        let claims = self.codec.verify(token)?;
        let user_id =
            HeaderValue::from_str(&claims.sub).map_err(|_| AuthError::ClaimExtractionFailure)?;
        let role =
            HeaderValue::from_str(&claims.role).map_err(|_| AuthError::ClaimExtractionFailure)?;

        tracing::debug!(user_id = %claims.sub, role = %claims.role, "Adding identity headers");

        Ok(ForwardedIdentity { user_id, role })
    }
}

/// Edge gate middleware function.
pub async fn edge_auth(State(gate): State<EdgeGate>, request: Request, next: Next) -> Response {
    tracing::info!(method = %request.method(), path = request.uri().path(), "Request received");

    match gate.admit(request) {
        Ok(request) => next.run(request).await,
        Err(e) => {
            tracing::warn!(error_code = e.error_code(), "Access denied");
            e.into_response()
        }
    }
}
