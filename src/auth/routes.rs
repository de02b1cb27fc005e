// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route classification for the edge gate.
//!
//! Matching is plain substring containment on the raw request path.
//! `/auth/login/extra` is open because it contains `/auth/login`.

/// Paths reachable without a token.
pub const DEFAULT_OPEN_ENDPOINTS: &[&str] = &["/auth/register", "/auth/login", "/health"];

/// Documentation and introspection paths, also reachable without a token.
pub const DEFAULT_INTROSPECTION_PATHS: &[&str] =
    &["/v3/api-docs", "/swagger-ui", "/swagger-resources", "/webjars"];

/// Static classification of request paths into open and protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    open_endpoints: Vec<String>,
    introspection_paths: Vec<String>,
}

impl RoutePolicy {
    pub fn new(open_endpoints: Vec<String>, introspection_paths: Vec<String>) -> Self {
        Self {
            open_endpoints,
            introspection_paths,
        }
    }

    /// Whether a request to `path` must carry a valid token.
    ///
    /// Introspection paths are checked first, then open endpoints; any
    /// match makes the route open. Everything else is protected.
    pub fn is_protected(&self, path: &str) -> bool {
        if self
            .introspection_paths
            .iter()
            .any(|p| path.contains(p.as_str()))
        {
            return false;
        }

        !self.open_endpoints.iter().any(|p| path.contains(p.as_str()))
    }

    pub fn open_endpoints(&self) -> &[String] {
        &self.open_endpoints
    }

    pub fn introspection_paths(&self) -> &[String] {
        &self.introspection_paths
    }
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_OPEN_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_INTROSPECTION_PATHS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}
