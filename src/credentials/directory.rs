// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User directory abstraction and the password-checking credential service.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::password::{hash_password, verify_password};
use super::{Authenticated, CredentialError, CredentialService};
use crate::auth::{Role, RoleSet};

/// Stored account as returned by a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    /// PHC password hash
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub roles: RoleSet,
}

/// Account creation request sent to a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    /// PHC password hash, never the plain password
    #[serde(rename = "password")]
    pub password_hash: String,
}

/// Where accounts live.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, CredentialError>;

    async fn create(&self, user: NewUser) -> Result<UserRecord, CredentialError>;
}

/// Process-local directory keyed by email.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account.
    pub async fn insert(&self, user: UserRecord) {
        self.users.write().await.insert(user.email.clone(), user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, CredentialError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, CredentialError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(CredentialError::UserExists);
        }

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: user.email,
            password_hash: user.password_hash,
            roles: RoleSet::single(Role::default()),
        };
        users.insert(record.email.clone(), record.clone());
        Ok(record)
    }
}

/// Credential service that checks passwords against directory records.
#[derive(Debug)]
pub struct DirectoryCredentialService<D> {
    directory: D,
}

impl<D: UserDirectory> DirectoryCredentialService<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }
}

#[async_trait]
impl<D: UserDirectory> CredentialService for DirectoryCredentialService<D> {
    async fn login(&self, email: &str, password: &str) -> Result<Authenticated, CredentialError> {
        let user = self.directory.find_by_email(email).await?.ok_or_else(|| {
            tracing::warn!(email, "Login for unknown user");
            CredentialError::InvalidCredentials
        })?;

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(email, "Invalid password");
            return Err(CredentialError::InvalidCredentials);
        }

        tracing::debug!(user_id = %user.id, roles = %user.roles, "Credentials verified");
        Ok(Authenticated {
            subject: user.id,
            roles: user.roles,
        })
    }

    async fn register(&self, email: &str, password: &str) -> Result<(), CredentialError> {
        let password_hash = hash_password(password)?;
        let user = self
            .directory
            .create(NewUser {
                email: email.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, email, "User registered");
        Ok(())
    }
}
