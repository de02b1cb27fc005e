// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! Tokens are compact HS256 JWTs signed with the shared signing key. The
//! codec is the only component that touches key material; the edge gate and
//! the session service go through it.
//!
//! ## Expiry
//!
//! [`TokenCodec::verify`] checks structure and signature only. Expiry is a
//! separate question answered by [`TokenCodec::is_expired`], which treats
//! every verification failure as expired.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::claims::{TokenClaims, TokenKind};
use super::error::TokenError;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and verifies signed identity tokens.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    /// ACCESS lifetime in seconds
    access_ttl: i64,
}

impl TokenCodec {
    /// Create a codec from raw key material and the ACCESS base duration.
    pub fn new(secret: &[u8], access_ttl_secs: u64) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked by `is_expired`, not during decoding.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl: i64::try_from(access_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Lifetime of a token of the given kind, in seconds.
    pub fn duration(&self, kind: TokenKind) -> i64 {
        self.access_ttl.saturating_mul(kind.lifetime_factor())
    }

    /// Issue a token for `subject` carrying `role` as its role claim.
    pub fn issue(&self, subject: &str, role: &str, kind: TokenKind) -> Result<String, TokenError> {
        self.issue_at(subject, role, kind, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(
        &self,
        subject: &str,
        role: &str,
        kind: TokenKind,
        now: i64,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: subject.to_string(),
            id: subject.to_string(),
            role: role.to_string(),
            token_type: Some(kind),
            iat: now,
            exp: now.saturating_add(self.duration(kind)),
        };

        tracing::debug!(subject, kind = %kind, exp = claims.exp, "Issuing token");

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Parse the token and check its signature. Expiry is not checked.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }

    /// Whether the token must be treated as expired right now.
    ///
    /// Returns `true` when the token has expired and also when it fails to
    /// parse or verify.
    pub fn is_expired(&self, token: &str) -> bool {
        self.is_expired_at(token, Utc::now().timestamp())
    }

    /// [`TokenCodec::is_expired`] evaluated at `now` (Unix seconds).
    pub fn is_expired_at(&self, token: &str, now: i64) -> bool {
        match self.verify(token) {
            Ok(claims) => claims.is_expired_at(now),
            Err(e) => {
                tracing::debug!(error = %e, "Token failed verification, treating as expired");
                true
            }
        }
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("access_ttl", &self.access_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    pub(crate) const TEST_SECRET: &[u8] = b"testsecretkeythatisusedforthejwttokengeneration";
    pub(crate) const TEST_TTL: u64 = 3600;

    pub(crate) fn test_codec() -> TokenCodec {
        TokenCodec::new(TEST_SECRET, TEST_TTL)
    }

    #[test]
    fn issued_token_verifies_and_is_not_expired() {
        let codec = test_codec();
        let token = codec.issue("u1", "ADMIN", TokenKind::Access).unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.id, "u1");
        assert_eq!(claims.role, "ADMIN");
        assert_eq!(claims.token_type, Some(TokenKind::Access));
        assert!(!codec.is_expired(&token));
    }

    #[test]
    fn refresh_duration_is_five_times_access() {
        let codec = test_codec();
        let now = 1_700_000_000;
        let access = codec.issue_at("u1", "USER", TokenKind::Access, now).unwrap();
        let refresh = codec.issue_at("u1", "USER", TokenKind::Refresh, now).unwrap();

        let access = codec.verify(&access).unwrap();
        let refresh = codec.verify(&refresh).unwrap();
        assert_eq!(access.exp - access.iat, TEST_TTL as i64);
        assert_eq!(refresh.exp - refresh.iat, 5 * (access.exp - access.iat));
        assert_eq!(codec.duration(TokenKind::Refresh), 5 * codec.duration(TokenKind::Access));
    }

    #[test]
    fn past_expiry_is_expired_but_still_verifies() {
        let codec = test_codec();
        let now = Utc::now().timestamp();
        let token = codec
            .issue_at("u1", "USER", TokenKind::Access, now - 2 * TEST_TTL as i64)
            .unwrap();

        assert!(codec.verify(&token).is_ok());
        assert!(codec.is_expired(&token));
    }

    #[test]
    fn expiry_comparison_is_exact() {
        let codec = test_codec();
        let token = codec.issue_at("u1", "USER", TokenKind::Access, 1_000).unwrap();
        let exp = 1_000 + TEST_TTL as i64;

        assert!(!codec.is_expired_at(&token, exp - 1));
        assert!(codec.is_expired_at(&token, exp));
    }

    #[test]
    fn garbage_is_malformed_and_expired() {
        let codec = test_codec();
        for token in ["", "not-a-token", "a.b.c", "Bearer abc"] {
            assert_eq!(codec.verify(token), Err(TokenError::Malformed), "{token}");
            assert!(codec.is_expired(token), "{token}");
        }
    }

    #[test]
    fn foreign_key_fails_signature() {
        let codec = test_codec();
        let other = TokenCodec::new(b"another-secret-that-is-long-enough-for-hs256", TEST_TTL);
        let token = other.issue("u1", "ADMIN", TokenKind::Access).unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::InvalidSignature));
        assert!(codec.is_expired(&token));
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let codec = test_codec();
        let token = codec.issue("u1", "USER", TokenKind::Access).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        let mut claims: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        claims["role"] = serde_json::Value::String("ADMIN".to_string());
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(codec.verify(&forged), Err(TokenError::InvalidSignature));
        assert!(codec.is_expired(&forged));
    }

    #[test]
    fn token_signed_by_jsonwebtoken_directly_is_accepted() {
        let codec = test_codec();
        let claims = TokenClaims {
            sub: "u9".to_string(),
            id: String::new(),
            role: "USER".to_string(),
            token_type: None,
            iat: 0,
            exp: 1,
        };
        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        assert_eq!(codec.verify(&token).unwrap(), claims);
        assert!(codec.is_expired(&token));
    }

    #[test]
    fn debug_does_not_print_key_material() {
        let rendered = format!("{:?}", test_codec());
        assert!(!rendered.contains("testsecret"));
    }
}
