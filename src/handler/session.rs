// handler/session.rs
use std::{sync::Arc, time::Duration};

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::{
    dtos::SessionLoginDto,
    middleware::{append_cookie, removal_cookie, session_cookie, SESSION_COOKIE},
    AppState,
};

/// Five days.
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 5;

pub fn session_handler() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

fn session_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn success() -> Response {
    Json(json!({ "status": "success" })).into_response()
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<SessionLoginDto>, JsonRejection>,
) -> Response {
    let dto = match body {
        Ok(Json(dto)) => dto,
        Err(rejection) => {
            tracing::error!("Error creating session cookie: unreadable body: {}", rejection);
            return session_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    };

    let id_token = dto.id_token.filter(|token| !token.trim().is_empty());

    let Some(id_token) = id_token else {
        return session_error(StatusCode::BAD_REQUEST, "ID token is required");
    };

    let Some(identity) = app_state.identity.as_ref() else {
        tracing::error!("Error creating session cookie: identity provider is not configured");
        return session_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
    };

    let expires_in = Duration::from_secs(SESSION_MAX_AGE_SECS as u64);

    match identity.create_session_cookie(&id_token, expires_in).await {
        Ok(value) => {
            let cookie = session_cookie(
                value,
                time::Duration::seconds(SESSION_MAX_AGE_SECS),
                app_state.env.production,
            );
            let mut response = success();
            append_cookie(&mut response, &cookie);
            response
        }
        Err(e) => {
            tracing::error!("Error creating session cookie: {:?}", e);
            session_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

/// Always succeeds and always clears the cookie, even if revocation fails.
pub async fn logout(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Response {
    if let Some(cookie) = cookie_jar.get(SESSION_COOKIE) {
        match app_state.session_verifier.verify(cookie.value(), false).await {
            Ok(claims) => {
                if let Some(identity) = app_state.identity.as_ref() {
                    if let Err(e) = identity.revoke_refresh_tokens(&claims.sub).await {
                        tracing::error!("Error revoking refresh tokens for {}: {:?}", claims.sub, e);
                    }
                }
            }
            Err(e) => tracing::error!("Error verifying session cookie on logout: {:?}", e),
        }
    }

    let mut response = success();
    append_cookie(&mut response, &removal_cookie());
    response
}
