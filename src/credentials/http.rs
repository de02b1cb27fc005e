// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote user directory over HTTP.
//!
//! Calls the user service with the shared service credential:
//!
//! - `GET  {base}/users/{email}` → `UserRecord`, 404 when unknown
//! - `POST {base}/users` with `NewUser` → `UserRecord`, 409 on duplicate

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use super::directory::{NewUser, UserDirectory, UserRecord};
use super::CredentialError;
use crate::auth::{ServiceCredential, SERVICE_AUTH_HEADER};

/// Request timeout for directory calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [`UserDirectory`] backed by the remote user service.
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    base_url: Url,
    credential: ServiceCredential,
    client: reqwest::Client,
}

impl HttpUserDirectory {
    pub fn new(base_url: Url, credential: ServiceCredential) -> Result<Self, CredentialError> {
        if base_url.cannot_be_a_base() {
            return Err(CredentialError::Directory(format!(
                "'{base_url}' cannot be used as a base URL"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CredentialError::Directory(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            credential,
            client,
        })
    }

    /// `{base}/users[/{segment}]` with the segment percent-encoded.
    fn users_url(&self, segment: Option<&str>) -> Result<Url, CredentialError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| CredentialError::Directory("invalid base URL".to_string()))?;
            segments.pop_if_empty().push("users");
            if let Some(segment) = segment {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header(SERVICE_AUTH_HEADER, self.credential.expose())
    }
}

fn transport_error(e: reqwest::Error) -> CredentialError {
    CredentialError::Directory(format!("user service request failed: {e}"))
}

fn unexpected_status(status: StatusCode) -> CredentialError {
    CredentialError::Directory(format!("user service returned {status}"))
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, CredentialError> {
        let url = self.users_url(Some(email))?;
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<UserRecord>()
                .await
                .map(Some)
                .map_err(transport_error),
            status => {
                tracing::warn!(%status, "User lookup failed");
                Err(unexpected_status(status))
            }
        }
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, CredentialError> {
        let url = self.users_url(None)?;
        let response = self
            .authorized(self.client.post(url))
            .json(&user)
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::CONFLICT => Err(CredentialError::UserExists),
            status if status.is_success() => {
                response.json::<UserRecord>().await.map_err(transport_error)
            }
            status => {
                tracing::warn!(%status, "User registration failed");
                Err(unexpected_status(status))
            }
        }
    }
}
