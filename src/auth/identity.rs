// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped identity and the extractors that read it.
//!
//! The trust filter stores an [`IdentityContext`] in the request extensions.
//! Handlers take it explicitly:
//!
//! ```rust,ignore
//! async fn my_handler(Identity(identity): Identity) -> impl IntoResponse {
//!     // identity.principal, identity.roles
//! }
//! ```

use std::fmt;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use super::roles::{Role, RoleSet};
use super::AuthError;

/// Principal name used for service-to-service traffic.
pub const SERVICE_ACCOUNT: &str = "service-account";

/// Who a request is acting as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// End user, identified by the token subject
    User(String),
    /// Another internal service holding the shared credential
    ServiceAccount,
}

impl Principal {
    pub fn as_str(&self) -> &str {
        match self {
            Principal::User(id) => id,
            Principal::ServiceAccount => SERVICE_ACCOUNT,
        }
    }

    /// The user id, if this is an end user.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Principal::User(id) => Some(id),
            Principal::ServiceAccount => None,
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Identity established for one inbound request.
///
/// Built once by the trust filter and dropped with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IdentityContext {
    /// User id, or `service-account` for internal callers
    #[schema(value_type = String)]
    pub principal: Principal,
    /// Roles granted for this request
    #[schema(value_type = Vec<Role>)]
    pub roles: RoleSet,
}

impl IdentityContext {
    pub fn user(user_id: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            principal: Principal::User(user_id.into()),
            roles,
        }
    }

    pub fn service() -> Self {
        Self {
            principal: Principal::ServiceAccount,
            roles: RoleSet::single(Role::Service),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }

    pub fn is_service(&self) -> bool {
        self.principal == Principal::ServiceAccount
    }
}

/// Extractor requiring an established identity.
///
/// Rejects with an empty 401 when the trust filter left the request
/// unauthenticated.
pub struct Identity(pub IdentityContext);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityContext>()
            .cloned()
            .map(Identity)
            .ok_or(AuthError::MissingCredential)
    }
}

/// Optional identity extractor.
///
/// Returns `None` instead of rejecting when no identity is present.
pub struct OptionalIdentity(pub Option<IdentityContext>);

impl<S> FromRequestParts<S> for OptionalIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalIdentity(
            parts.extensions.get::<IdentityContext>().cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn empty_parts() -> Parts {
        Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn service_identity_has_service_role() {
        let identity = IdentityContext::service();
        assert!(identity.is_service());
        assert!(identity.has_role(Role::Service));
        assert_eq!(identity.principal.as_str(), SERVICE_ACCOUNT);
        assert_eq!(identity.principal.user_id(), None);
    }

    #[test]
    fn serializes_principal_as_string() {
        let identity =
            IdentityContext::user("u1", RoleSet::from_iter([Role::Admin, Role::User]));
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["principal"], "u1");
        assert_eq!(json["roles"], serde_json::json!(["ADMIN", "USER"]));
    }

    #[tokio::test]
    async fn identity_extractor_requires_context() {
        let mut parts = empty_parts();
        let result = Identity::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingCredential)));
    }

    #[tokio::test]
    async fn identity_extractor_reads_extensions() {
        let mut parts = empty_parts();
        parts
            .extensions
            .insert(IdentityContext::user("u1", RoleSet::single(Role::User)));

        let Identity(identity) = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.principal.user_id(), Some("u1"));
    }

    #[tokio::test]
    async fn optional_identity_returns_none_without_context() {
        let mut parts = empty_parts();
        let OptionalIdentity(identity) = OptionalIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(identity.is_none());
    }
}
