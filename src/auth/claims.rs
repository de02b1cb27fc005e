// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::roles::RoleSet;

/// How long a token lives relative to the configured base duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived token exchanged for a new pair at `/auth/refresh`.
    Refresh,
}

impl TokenKind {
    /// Multiplier applied to the base duration.
    pub fn lifetime_factor(&self) -> i64 {
        match self {
            TokenKind::Access => 1,
            TokenKind::Refresh => 5,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "ACCESS"),
            TokenKind::Refresh => write!(f, "REFRESH"),
        }
    }
}

/// Claims carried by every issued token.
///
/// `role` is kept as the raw claim string. At login it is the account's
/// role set joined with commas; at refresh it is copied verbatim from the
/// presented token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Duplicate of the subject, kept for consumers that read `id`
    #[serde(default)]
    pub id: String,
    /// Role claim, possibly comma-joined
    pub role: String,
    /// Token kind (absent on tokens minted elsewhere)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenKind>,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

impl TokenClaims {
    /// Whether the token has expired at `now` (Unix seconds).
    ///
    /// Expiry is exact: a token whose `exp` equals `now` is already expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Decode the role claim into a role set.
    pub fn roles(&self) -> RoleSet {
        RoleSet::from_header_value(&self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::Role;

    fn sample_claims() -> TokenClaims {
        TokenClaims {
            sub: "u1".to_string(),
            id: "u1".to_string(),
            role: "ADMIN,USER".to_string(),
            token_type: Some(TokenKind::Access),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        }
    }

    #[test]
    fn refresh_lives_five_times_longer() {
        assert_eq!(TokenKind::Access.lifetime_factor(), 1);
        assert_eq!(TokenKind::Refresh.lifetime_factor(), 5);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let claims = sample_claims();
        assert!(!claims.is_expired_at(claims.exp - 1));
        assert!(claims.is_expired_at(claims.exp));
        assert!(claims.is_expired_at(claims.exp + 1));
    }

    #[test]
    fn roles_decodes_joined_claim() {
        let roles = sample_claims().roles();
        assert!(roles.contains(Role::Admin));
        assert!(roles.contains(Role::User));
        assert_eq!(roles.len(), 2);
    }

    #[test]
    fn token_type_is_optional_on_the_wire() {
        let json = r#"{"sub":"u1","role":"USER","iat":1,"exp":2}"#;
        let claims: TokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.token_type, None);
        assert_eq!(claims.id, "");
    }
}
