// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Service
//!
//! Checks user credentials on behalf of the session service. The token core
//! never sees stored passwords; it only receives the `{subject, roles}` of an
//! authenticated account.
//!
//! ## Implementations
//!
//! - [`DirectoryCredentialService`] hashes and verifies passwords itself and
//!   looks accounts up in a [`UserDirectory`]:
//!   - [`InMemoryDirectory`] for single-process deployments and tests
//!   - [`HttpUserDirectory`] for a remote user service, called with the
//!     service-to-service credential

use async_trait::async_trait;

use crate::auth::RoleSet;

pub mod directory;
pub mod http;
pub mod password;

pub use directory::{DirectoryCredentialService, InMemoryDirectory, NewUser, UserDirectory, UserRecord};
pub use http::HttpUserDirectory;

/// Credential check failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// Registration for an email that already exists
    #[error("User already exists")]
    UserExists,
    /// The user directory could not be reached or answered unexpectedly
    #[error("User directory error: {0}")]
    Directory(String),
    /// Password hashing failed or a stored hash is unreadable
    #[error("Password hashing error: {0}")]
    Hashing(String),
}

/// Account that passed a credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    /// User ID, used as the token subject
    pub subject: String,
    /// Roles held by the account
    pub roles: RoleSet,
}

/// Verifies and registers user credentials.
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Check an email/password pair.
    async fn login(&self, email: &str, password: &str) -> Result<Authenticated, CredentialError>;

    /// Create a new account.
    async fn register(&self, email: &str, password: &str) -> Result<(), CredentialError>;
}
