// routes.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        auth::auth_handler,
        chat::chat_handler,
        dashboard::dashboard_handler,
        feed::feed_handler,
        jobs::jobs_handler,
        notifications::notifications_handler,
        pages::{login_page, register_page},
        portfolio::portfolio_handler,
        session::session_handler,
        users::{providers_handler, users_handler},
    },
    middleware::{auth, gate::session_gate},
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/session", session_handler())
        .nest("/auth", auth_handler())
        .nest("/providers", providers_handler())
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .nest("/jobs", jobs_handler().layer(middleware::from_fn(auth)))
        .nest("/portfolio", portfolio_handler().layer(middleware::from_fn(auth)))
        .nest("/notifications", notifications_handler().layer(middleware::from_fn(auth)))
        .nest("/chats", chat_handler().layer(middleware::from_fn(auth)))
        .nest("/feed", feed_handler().layer(middleware::from_fn(auth)));

    // Pages behind the session gate.
    let page_routes = Router::new()
        .route("/login", get(login_page))
        .route("/registrasi", get(register_page))
        .nest("/dashboard", dashboard_handler())
        .layer(middleware::from_fn(session_gate));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .merge(page_routes)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use chrono::{DateTime, Utc};
    use sqlx::PgPool;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        config::Config,
        db::db::DBClient,
        models::usermodel::UserRole,
        service::identity::{
            tests::MemoryRevocationStore, AuthError, Identity, IdentityProvider, RevocationStore,
            TokenIdentityProvider,
        },
    };

    /// Store whose writes always fail.
    struct FailingRevocationStore;

    #[async_trait]
    impl RevocationStore for FailingRevocationStore {
        async fn tokens_valid_after(&self, _uid: Uuid) -> Result<Option<DateTime<Utc>>, AuthError> {
            Ok(None)
        }

        async fn revoke(&self, _uid: Uuid, _at: DateTime<Utc>) -> Result<(), AuthError> {
            Err(AuthError::Store("connection reset".to_string()))
        }
    }

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/kelarapp_test".to_string(),
            app_url: "http://localhost:3000".to_string(),
            port: 8000,
            production: false,
            service_account: None,
        }
    }

    fn provider_with(store: Arc<dyn RevocationStore>) -> Arc<TokenIdentityProvider> {
        Arc::new(TokenIdentityProvider::new("kelarapp-test", b"router-test-key".to_vec(), store))
    }

    fn app(identity: Option<Arc<TokenIdentityProvider>>) -> Router {
        let pool = PgPool::connect_lazy("postgres://localhost/kelarapp_test").unwrap();
        let identity = identity.map(|provider| provider as Arc<dyn IdentityProvider>);
        let state = AppState::new(test_config(), DBClient::new(pool), identity);
        create_router(Arc::new(state))
    }

    async fn session_for(provider: &TokenIdentityProvider, role: UserRole) -> String {
        let id_token = provider
            .mint_id_token(&Identity {
                uid: Uuid::new_v4(),
                name: "Tester".to_string(),
                role,
            })
            .unwrap();
        provider
            .create_session_cookie(&id_token, Duration::from_secs(3600))
            .await
            .unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = cookie {
            builder = builder.header(header::COOKIE, format!("session={}", value));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = cookie {
            builder = builder.header(header::COOKIE, format!("session={}", value));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
    }

    fn set_cookie(response: &Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_check_works() {
        let response = app(None).oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn dashboard_without_cookie_redirects_to_login_with_destination() {
        let response = app(None).oneshot(get("/dashboard/penyewa", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/login?redirect=%2Fdashboard%2Fpenyewa");
        assert!(set_cookie(&response).is_empty());
    }

    #[tokio::test]
    async fn login_page_is_open_without_cookie() {
        let response = app(None).oneshot(get("/login", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["page"], "login");
    }

    #[tokio::test]
    async fn signed_in_user_is_sent_to_role_dashboard() {
        let provider = provider_with(Arc::new(MemoryRevocationStore::default()));
        let cookie = session_for(&provider, UserRole::Penyedia).await;
        let app = app(Some(provider));

        let response = app.oneshot(get("/registrasi", Some(&cookie))).await.unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/dashboard/penyedia");
    }

    #[tokio::test]
    async fn invalid_cookie_redirects_and_clears() {
        let provider = provider_with(Arc::new(MemoryRevocationStore::default()));
        let app = app(Some(provider));

        let response = app
            .oneshot(get("/dashboard/penyedia/tawaran", Some("forged.cookie.value")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/login");
        let cleared = set_cookie(&response);
        assert!(cleared.starts_with("session=;"));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn unconfigured_identity_treats_cookie_as_invalid() {
        let response = app(None)
            .oneshot(get("/dashboard/penyewa", Some("anything")))
            .await
            .unwrap();

        assert_eq!(location(&response), "/login");
        assert!(set_cookie(&response).contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn session_login_sets_five_day_cookie() {
        let provider = provider_with(Arc::new(MemoryRevocationStore::default()));
        let id_token = provider
            .mint_id_token(&Identity {
                uid: Uuid::new_v4(),
                name: "Wati".to_string(),
                role: UserRole::Penyewa,
            })
            .unwrap();
        let app = app(Some(provider));

        let body = format!(r#"{{"idToken":"{}"}}"#, id_token);
        let response = app.oneshot(post_json("/api/session/login", &body, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = set_cookie(&response);
        assert!(cookie.starts_with("session="));
        assert!(cookie.contains("Max-Age=432000"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"));

        assert_eq!(body_json(response).await["status"], "success");
    }

    #[tokio::test]
    async fn session_login_requires_id_token() {
        let provider = provider_with(Arc::new(MemoryRevocationStore::default()));
        let response = app(Some(provider))
            .oneshot(post_json("/api/session/login", "{}", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "ID token is required");
    }

    #[tokio::test]
    async fn session_login_blank_token_is_bad_request_but_malformed_body_is_server_error() {
        let provider = provider_with(Arc::new(MemoryRevocationStore::default()));
        let app = app(Some(provider));

        let response = app
            .clone()
            .oneshot(post_json("/api/session/login", r#"{"idToken":"   "}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post_json("/api/session/login", "idToken=abc", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Internal Server Error");
    }

    #[tokio::test]
    async fn session_login_hides_identity_failures() {
        let provider = provider_with(Arc::new(MemoryRevocationStore::default()));
        let response = app(Some(provider))
            .oneshot(post_json("/api/session/login", r#"{"idToken":"expired-or-forged"}"#, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Internal Server Error");

        let response = app(None)
            .oneshot(post_json("/api/session/login", r#"{"idToken":"x"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn logout_clears_cookie_even_when_revocation_fails() {
        let provider = provider_with(Arc::new(FailingRevocationStore));
        let cookie = session_for(&provider, UserRole::Penyewa).await;
        let app = app(Some(provider));

        let response = app
            .oneshot(post_json("/api/session/logout", "", Some(&cookie)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cleared = set_cookie(&response);
        assert!(cleared.starts_with("session=;"));
        assert!(cleared.contains("Max-Age=0"));
        assert_eq!(body_json(response).await["status"], "success");
    }

    #[tokio::test]
    async fn logout_without_cookie_succeeds() {
        let response = app(None)
            .oneshot(post_json("/api/session/logout", "", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_requires_session() {
        let response = app(None).oneshot(get("/api/users/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
