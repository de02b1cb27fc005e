// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::credentials::CredentialError;
use crate::session::SessionError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Credentials(CredentialError::InvalidCredentials) => {
                ApiError::unauthorized(CredentialError::InvalidCredentials.to_string())
            }
            SessionError::Credentials(CredentialError::UserExists) => {
                ApiError::conflict(CredentialError::UserExists.to_string())
            }
            SessionError::Credentials(CredentialError::Directory(msg)) => {
                tracing::error!(error = %msg, "User directory unavailable");
                ApiError::bad_gateway("User directory unavailable")
            }
            SessionError::Credentials(CredentialError::Hashing(msg)) => {
                tracing::error!(error = %msg, "Password hashing failed");
                ApiError::internal("Internal error")
            }
            SessionError::RefreshExpired => {
                ApiError::unauthorized(SessionError::RefreshExpired.to_string())
            }
            SessionError::Token(e) => {
                tracing::error!(error = %e, "Token issuance failed");
                ApiError::internal("Internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
