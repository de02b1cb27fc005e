// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{EdgeGate, RoutePolicy, ServiceCredential, ServiceTrust, TokenCodec};
use crate::config::Config;
use crate::credentials::CredentialService;
use crate::session::SessionService;

/// Everything the router needs, built once at startup.
#[derive(Clone, Debug)]
pub struct AppState {
    pub edge: EdgeGate,
    pub trust: ServiceTrust,
    pub sessions: SessionService,
}

impl AppState {
    pub fn new(
        codec: Arc<TokenCodec>,
        routes: RoutePolicy,
        credential: ServiceCredential,
        credentials: Arc<dyn CredentialService>,
    ) -> Self {
        Self {
            edge: EdgeGate::new(codec.clone(), Arc::new(routes)),
            trust: ServiceTrust::new(credential),
            sessions: SessionService::new(codec, credentials),
        }
    }

    /// Wire the state from configuration and a credential service.
    pub fn from_config(config: &Config, credentials: Arc<dyn CredentialService>) -> Self {
        let codec = Arc::new(TokenCodec::new(
            config.jwt_secret.as_bytes(),
            config.access_ttl_secs,
        ));
        let routes = RoutePolicy::new(
            config.open_endpoints.clone(),
            config.introspection_paths.clone(),
        );
        Self::new(codec, routes, config.service_credential.clone(), credentials)
    }
}
