// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc};

use axum_server::Handle;
use trustgate::{
    api::router,
    auth::{Role, RoleSet},
    config::Config,
    credentials::{
        password::hash_password, CredentialService, DirectoryCredentialService,
        HttpUserDirectory, InMemoryDirectory, UserRecord,
    },
    logging,
    state::AppState,
};

#[tokio::main]
async fn main() {
    let config = Config::from_env().expect("Invalid configuration");
    logging::init(config.log_format).expect("Failed to initialize logging");

    let credentials = build_credentials(&config)
        .await
        .expect("Failed to build credential service");

    let state = AppState::from_config(&config, credentials);
    let app = router(state);

    let addr = config.bind_addr().expect("Failed to parse bind address");

    let handle: Handle<SocketAddr> = Handle::new();
    tokio::spawn(shutdown_on_ctrl_c(handle.clone()));

    tracing::info!(%addr, "Trustgate listening (docs at /swagger-ui)");

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .expect("HTTP server failed");
}

async fn build_credentials(
    config: &Config,
) -> Result<Arc<dyn CredentialService>, trustgate::credentials::CredentialError> {
    if let Some(url) = &config.user_service_url {
        tracing::info!(%url, "Using remote user directory");
        let directory = HttpUserDirectory::new(url.clone(), config.service_credential.clone())?;
        return Ok(Arc::new(DirectoryCredentialService::new(directory)));
    }

    tracing::warn!("USER_SERVICE_URL not set, using in-memory user directory");
    let directory = InMemoryDirectory::new();

    if let Some((email, password)) = &config.seed_admin {
        directory
            .insert(UserRecord {
                id: uuid::Uuid::new_v4().to_string(),
                email: email.clone(),
                password_hash: hash_password(password)?,
                roles: RoleSet::from_iter([Role::Admin, Role::User]),
            })
            .await;
        tracing::info!(email = %email, "Seeded admin account");
    }

    Ok(Arc::new(DirectoryCredentialService::new(directory)))
}

async fn shutdown_on_ctrl_c(handle: Handle<SocketAddr>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
    handle.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
}
