// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication endpoints: register, login, refresh.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};

use crate::auth::gate::BEARER_PREFIX;
use crate::error::ApiError;
use crate::models::{LoginRequest, RegisterRequest};
use crate::session::TokenPair;
use crate::state::AppState;

pub const REGISTERED_MESSAGE: &str = "User registered successfully";

/// Register a new user.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = String),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "User already exists"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<&'static str, ApiError> {
    request.validate().map_err(ApiError::bad_request)?;
    state
        .sessions
        .register(&request.email, &request.password)
        .await?;
    Ok(REGISTERED_MESSAGE)
}

/// Log in and receive ACCESS and REFRESH tokens.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = TokenPair),
        (status = 401, description = "Invalid email or password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let pair = state
        .sessions
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(pair))
}

/// Exchange a refresh token (sent as `Authorization: Bearer <token>`) for a new pair.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Tokens refreshed", body = TokenPair),
        (status = 401, description = "Refresh token invalid or expired"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenPair>, ApiError> {
    let raw = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Authorization header is required"))?;
    let token = raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw);

    let pair = state.sessions.refresh(token).await?;
    Ok(Json(pair))
}
