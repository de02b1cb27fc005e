// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Failure while decoding or encoding a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Structure is valid but the signature does not match the signing key
    #[error("token signature is invalid")]
    InvalidSignature,
    /// Token cannot be parsed (bad segments, base64, JSON or missing claims)
    #[error("token is malformed")]
    Malformed,
    /// Token could not be signed
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Rejection produced by the edge gate.
///
/// Every variant answers 401 with an empty body so a caller cannot tell a
/// missing header from a forged or expired token. The distinction survives
/// only in logs via [`AuthError::error_code`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header present
    MissingCredential,
    /// Header present but not `Bearer <token>`
    MalformedScheme,
    /// Signature failure, parse failure or expiry
    InvalidOrExpiredToken,
    /// Token verified but its claims could not be read
    ClaimExtractionFailure,
}

impl AuthError {
    /// Get the error code for this error (logging only).
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedScheme => "malformed_scheme",
            AuthError::InvalidOrExpiredToken => "invalid_or_expired_token",
            AuthError::ClaimExtractionFailure => "claim_extraction_failure",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredential => write!(f, "Authorization header is required"),
            AuthError::MalformedScheme => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::InvalidOrExpiredToken => write!(f, "Token is invalid or expired"),
            AuthError::ClaimExtractionFailure => write!(f, "Token claims could not be read"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<TokenError> for AuthError {
    fn from(_: TokenError) -> Self {
        AuthError::ClaimExtractionFailure
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.status_code().into_response()
    }
}
