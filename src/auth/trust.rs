// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Service trust filter.
//!
//! Runs inside each internal service and rebuilds the caller's identity
//! without re-verifying any token:
//!
//! 1. `X-Service-Auth` equal to the shared credential → `service-account`
//!    with role `SERVICE`.
//! 2. Otherwise non-empty `X-User-Id` and `X-User-Role` (as injected by the
//!    edge gate) → that user with the listed roles.
//! 3. Otherwise no identity; the request continues unauthenticated.
//!
//! The filter never rejects. Handlers that need an identity use the
//! [`Identity`](super::Identity) extractor.
//!
//! ## Trust model
//!
//! Identity headers are trusted as-is, so a service must only be reachable
//! through the edge gate or from peers holding the service credential. The
//! credential is one static string shared by every service, with no expiry.

use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use super::identity::IdentityContext;
use super::roles::RoleSet;
use super::{SERVICE_AUTH_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};

/// Default shared credential for service-to-service calls.
pub const DEFAULT_SERVICE_CREDENTIAL: &str = "internal-service-key";

/// Path prefixes that skip the filter entirely.
pub const DEFAULT_BYPASS_PREFIXES: &[&str] =
    &["/api-docs", "/v3/api-docs", "/swagger-ui", "/webjars"];

/// Path fragments that skip the filter wherever they appear.
pub const DEFAULT_BYPASS_FRAGMENTS: &[&str] = &["swagger-ui.html", "swagger-resources"];

/// Static secret asserting that a call comes from an internal service.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceCredential(Arc<str>);

impl ServiceCredential {
    pub fn new(secret: impl AsRef<str>) -> Self {
        Self(Arc::from(secret.as_ref()))
    }

    /// Whether a presented header value is this credential.
    pub fn matches(&self, presented: &HeaderValue) -> bool {
        presented.as_bytes() == self.0.as_bytes()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Default for ServiceCredential {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_CREDENTIAL)
    }
}

impl fmt::Debug for ServiceCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServiceCredential(<redacted>)")
    }
}

/// Shared, read-only state of the trust filter.
#[derive(Debug, Clone)]
pub struct ServiceTrust {
    credential: ServiceCredential,
    bypass_prefixes: Arc<[String]>,
    bypass_fragments: Arc<[String]>,
}

impl ServiceTrust {
    pub fn new(credential: ServiceCredential) -> Self {
        Self {
            credential,
            bypass_prefixes: DEFAULT_BYPASS_PREFIXES.iter().map(|s| s.to_string()).collect(),
            bypass_fragments: DEFAULT_BYPASS_FRAGMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Replace the bypass lists.
    pub fn with_bypass(mut self, prefixes: Vec<String>, fragments: Vec<String>) -> Self {
        self.bypass_prefixes = prefixes.into();
        self.bypass_fragments = fragments.into();
        self
    }

    pub fn credential(&self) -> &ServiceCredential {
        &self.credential
    }

    /// Documentation paths are not filtered at all.
    pub fn bypasses(&self, path: &str) -> bool {
        self.bypass_prefixes.iter().any(|p| path.starts_with(p.as_str()))
            || self.bypass_fragments.iter().any(|p| path.contains(p.as_str()))
    }

    /// Rebuild the identity carried by `headers`, if any.
    pub fn establish(&self, headers: &HeaderMap) -> Option<IdentityContext> {
        if headers
            .get(SERVICE_AUTH_HEADER)
            .is_some_and(|v| self.credential.matches(v))
        {
            tracing::info!("Service-to-service authentication detected");
            return Some(IdentityContext::service());
        }

        let user_id = header_str(headers, USER_ID_HEADER.as_str());
        let roles = header_str(headers, USER_ROLE_HEADER.as_str());

        match (user_id, roles) {
            (Some(user_id), Some(roles)) => {
                let roles = RoleSet::from_header_value(roles);
                tracing::info!(user_id, roles = %roles, "Request from user");
                Some(IdentityContext::user(user_id, roles))
            }
            (user_id, roles) => {
                tracing::debug!(?user_id, ?roles, "Identity headers missing");
                None
            }
        }
    }
}

/// Present, readable and non-empty header value.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Trust filter middleware function.
///
/// Stores the [`IdentityContext`] in the request extensions when one can be
/// established, then always forwards.
pub async fn service_trust(
    State(trust): State<ServiceTrust>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if trust.bypasses(path) {
        return next.run(request).await;
    }

    tracing::debug!(path, "Establishing request identity");

    // Never inherit an identity from anything layered above this filter.
    request.extensions_mut().remove::<IdentityContext>();
    if let Some(identity) = trust.establish(request.headers()) {
        request.extensions_mut().insert(identity);
    }

    next.run(request).await
}
