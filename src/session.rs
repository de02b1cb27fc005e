// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login, registration and token refresh.
//!
//! Sits between the HTTP handlers and the credential service, and is the
//! only caller of [`TokenCodec::issue`].
//!
//! Login builds the role claim from the account's role set (comma-joined).
//! Refresh copies the role claim of the presented token verbatim and does
//! not consult the directory again, so role changes made after login only
//! show up at the next login.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{TokenCodec, TokenError, TokenKind};
use crate::credentials::{CredentialError, CredentialService};

/// ACCESS and REFRESH tokens issued together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer token
    pub access_token: String,
    /// Long-lived token for `/auth/refresh`
    pub refresh_token: String,
}

/// Session operation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error("Refresh token expired")]
    RefreshExpired,
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Issues token pairs for authenticated accounts.
#[derive(Clone)]
pub struct SessionService {
    codec: Arc<TokenCodec>,
    credentials: Arc<dyn CredentialService>,
}

impl SessionService {
    pub fn new(codec: Arc<TokenCodec>, credentials: Arc<dyn CredentialService>) -> Self {
        Self { codec, credentials }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<(), SessionError> {
        tracing::info!(email, "Registering user");
        self.credentials.register(email, password).await?;
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, SessionError> {
        tracing::info!(email, "Login attempt");
        let user = self.credentials.login(email, password).await?;

        let role = user.roles.to_header_value();
        let pair = self.issue_pair(&user.subject, &role)?;

        tracing::info!(user_id = %user.subject, "User logged in");
        Ok(pair)
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, SessionError> {
        if self.codec.is_expired(refresh_token) {
            tracing::warn!("Refresh token expired or invalid");
            return Err(SessionError::RefreshExpired);
        }

        let claims = self.codec.verify(refresh_token)?;
        tracing::debug!(user_id = %claims.sub, role = %claims.role, "Refreshing tokens");

        let pair = self.issue_pair(&claims.sub, &claims.role)?;
        tracing::info!(user_id = %claims.sub, "Tokens refreshed");
        Ok(pair)
    }

    fn issue_pair(&self, subject: &str, role: &str) -> Result<TokenPair, SessionError> {
        Ok(TokenPair {
            access_token: self.codec.issue(subject, role, TokenKind::Access)?,
            refresh_token: self.codec.issue(subject, role, TokenKind::Refresh)?,
        })
    }
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
