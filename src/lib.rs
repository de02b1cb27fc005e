// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trustgate - edge authentication and service trust for a microservice mesh
//!
//! Tokens are issued and verified once at the edge. Downstream handlers trust
//! the forwarded identity headers or a shared service credential.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Token codec, route policy, edge gate, service trust filter
//! - `credentials` - Credential service and user directories
//! - `session` - Login, registration and token refresh
//! - `config` - Environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod models;
pub mod session;
pub mod state;
