// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::Json;

use crate::auth::{Identity, IdentityContext};

/// Get the identity established for the current request.
///
/// Returns the principal and roles the trust filter rebuilt from the
/// forwarded headers or the service credential.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current identity", body = IdentityContext),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_user(Identity(identity): Identity) -> Json<IdentityContext> {
    Json(identity)
}
