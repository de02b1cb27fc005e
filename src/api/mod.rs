// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{edge_auth, service_trust, IdentityContext, Role},
    models::{LoginRequest, RegisterRequest},
    session::TokenPair,
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod users;

/// Build the full application router.
///
/// Layering, outermost first: CORS, request id, tracing, edge gate, service
/// trust filter, handlers.
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/users/me", get(users::get_current_user))
        .route("/health", get(health::liveness))
        .with_state(state.clone());

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/v3/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(state.trust, service_trust))
        .layer(middleware::from_fn_with_state(state.edge, edge_auth))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::refresh,
        users::get_current_user,
        health::liveness
    ),
    components(
        schemas(
            LoginRequest,
            RegisterRequest,
            TokenPair,
            IdentityContext,
            Role,
            health::HealthResponse
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Auth", description = "Registration, login and token refresh"),
        (name = "Users", description = "Identity of the calling user"),
        (name = "Health", description = "Liveness probe")
    )
)]
struct ApiDoc;

/// Registers the `bearer` security scheme referenced by protected paths.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::codec::tests::{test_codec, TEST_TTL};
    use crate::auth::{RoleSet, RoutePolicy, ServiceCredential, TokenKind};
    use crate::credentials::password::hash_password;
    use crate::credentials::{DirectoryCredentialService, InMemoryDirectory, UserRecord};
    use crate::session::TokenPair;
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Request, StatusCode},
    };
    use chrono::Utc;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let directory = InMemoryDirectory::new();
        directory
            .insert(UserRecord {
                id: "admin-1".to_string(),
                email: "admin@example.com".to_string(),
                password_hash: hash_password("s3cret").unwrap(),
                roles: RoleSet::from_iter([Role::Admin, Role::User]),
            })
            .await;

        AppState::new(
            Arc::new(test_codec()),
            RoutePolicy::default(),
            ServiceCredential::default(),
            Arc::new(DirectoryCredentialService::new(directory)),
        )
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn login(app: &Router) -> TokenPair {
        let (status, body) = send(
            app.clone(),
            json_post(
                "/auth/login",
                serde_json::json!({"email": "admin@example.com", "password": "s3cret"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_state().await);
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn health_is_open() {
        let app = router(test_state().await);
        let (status, body) = send(app, get_with("/health", &[])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn openapi_document_is_open() {
        let app = router(test_state().await);
        let (status, body) = send(app, get_with("/v3/api-docs/openapi.json", &[])).await;
        assert_eq!(status, StatusCode::OK);

        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"]["/auth/login"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer"].is_object());
    }

    #[tokio::test]
    async fn login_returns_camel_case_token_pair() {
        let app = router(test_state().await);
        let (status, body) = send(
            app,
            json_post(
                "/auth/login",
                serde_json::json!({"email": "admin@example.com", "password": "s3cret"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(body["accessToken"].is_string());
        assert!(body["refreshToken"].is_string());
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_401_json() {
        let app = router(test_state().await);
        let (status, body) = send(
            app,
            json_post(
                "/auth/login",
                serde_json::json!({"email": "admin@example.com", "password": "nope"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn register_login_and_duplicate() {
        let app = router(test_state().await);
        let credentials = serde_json::json!({"email": "new@example.com", "password": "pw"});

        let (status, body) = send(app.clone(), json_post("/auth/register", credentials.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, auth::REGISTERED_MESSAGE.as_bytes());

        let (status, _) = send(app.clone(), json_post("/auth/register", credentials.clone())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(app, json_post("/auth/login", credentials)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn register_rejects_invalid_email() {
        let app = router(test_state().await);
        let (status, _) = send(
            app,
            json_post(
                "/auth/register",
                serde_json::json!({"email": "nobody", "password": "pw"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn users_me_requires_token() {
        let app = router(test_state().await);
        let (status, body) = send(app, get_with("/users/me", &[])).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn spoofed_identity_headers_without_token_are_rejected_at_the_edge() {
        let app = router(test_state().await);
        let (status, _) = send(
            app,
            get_with("/users/me", &[("x-user-id", "admin-1"), ("x-user-role", "ADMIN")]),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_flows_through_edge_and_trust_filter() {
        let app = router(test_state().await);
        let pair = login(&app).await;

        let bearer = format!("Bearer {}", pair.access_token);
        let (status, body) = send(
            app,
            get_with("/users/me", &[(AUTHORIZATION.as_str(), bearer.as_str())]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let identity: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(identity["principal"], "admin-1");
        assert_eq!(identity["roles"], serde_json::json!(["ADMIN", "USER"]));
    }

    #[tokio::test]
    async fn service_credential_alongside_token_yields_service_identity() {
        let app = router(test_state().await);
        let pair = login(&app).await;

        let bearer = format!("Bearer {}", pair.access_token);
        let (status, body) = send(
            app,
            get_with(
                "/users/me",
                &[
                    (AUTHORIZATION.as_str(), bearer.as_str()),
                    ("x-service-auth", "internal-service-key"),
                ],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let identity: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(identity["principal"], "service-account");
        assert_eq!(identity["roles"], serde_json::json!(["SERVICE"]));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let app = router(test_state().await);
        let token = test_codec()
            .issue_at(
                "admin-1",
                "ADMIN",
                TokenKind::Access,
                Utc::now().timestamp() - 2 * TEST_TTL as i64,
            )
            .unwrap();

        let bearer = format!("Bearer {token}");
        let (status, _) = send(
            app,
            get_with("/users/me", &[(AUTHORIZATION.as_str(), bearer.as_str())]),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn refresh_requires_bearer_and_issues_new_pair() {
        let app = router(test_state().await);
        let pair = login(&app).await;

        let request = Request::builder()
            .method("POST")
            .uri("/auth/refresh")
            .header(AUTHORIZATION, format!("Bearer {}", pair.refresh_token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);

        let refreshed: TokenPair = serde_json::from_slice(&body).unwrap();
        let claims = test_codec().verify(&refreshed.access_token).unwrap();
        assert_eq!(claims.sub, "admin-1");
        assert_eq!(claims.role, "ADMIN,USER");

        let request = Request::builder()
            .method("POST")
            .uri("/auth/refresh")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = router(test_state().await);
        let response = app.oneshot(get_with("/health", &[])).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
