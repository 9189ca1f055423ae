use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use uuid::Uuid;

use crate::{
    db::userdb::UserExt,
    error::{ErrorMessage, HttpError},
    models::usermodel::{User, UserRole},
    AppState,
};

pub mod gate;

pub const SESSION_COOKIE: &str = "session";

/// The signed-in user, put on the request by `auth` or the session gate.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user: User,
}

pub fn session_cookie(value: String, max_age: time::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .secure(secure)
        .build()
}

/// `session=; Path=/; Max-Age=0`
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .http_only(true)
        .build()
}

pub fn append_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!("could not encode cookie {}: {:?}", cookie.name(), e),
    }
}

pub(crate) async fn load_session_user(
    app_state: &AppState,
    sub: &str,
) -> Result<Option<User>, HttpError> {
    let Ok(user_id) = Uuid::parse_str(sub) else {
        return Ok(None);
    };

    app_state
        .db_client
        .get_user(Some(user_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))
}

pub async fn auth(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let session = cookie_jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| auth_value.strip_prefix("Bearer ").map(str::to_owned))
        });

    let session = session.ok_or_else(|| {
        HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string())
    })?;

    let claims = app_state
        .session_verifier
        .verify(&session, true)
        .await
        .map_err(|e| {
            tracing::debug!("rejecting API session: {:?}", e);
            HttpError::unauthorized(ErrorMessage::InvalidToken.to_string())
        })?;

    let user = load_session_user(&app_state, &claims.sub)
        .await?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string()))?;

    req.extensions_mut().insert(SessionContext { user });

    Ok(next.run(req).await)
}

pub async fn role_check(
    Extension(_app_state): Extension<Arc<AppState>>,
    req: Request,
    next: Next,
    required_roles: Vec<UserRole>,
) -> Result<impl IntoResponse, HttpError> {
    let session = req
        .extensions()
        .get::<SessionContext>()
        .ok_or_else(|| {
            HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string())
        })?;

    if !required_roles.contains(&session.user.role) {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn,
        routing::get,
        Router,
    };
    use chrono::Utc;
    use sqlx::PgPool;
    use tower::ServiceExt;

    use crate::{config::Config, db::db::DBClient};

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Sari".to_string(),
            email: "sari@contoh.id".to_string(),
            password: String::new(),
            role,
            bio: None,
            specialization: None,
            avatar_url: None,
            rating: 0.0,
            review_count: 0,
            tokens_valid_after: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn seeker_only(signed_in: User) -> Router {
        let pool = PgPool::connect_lazy("postgres://localhost/kelarapp_test").unwrap();
        let config = Config {
            database_url: "postgres://localhost/kelarapp_test".to_string(),
            app_url: "http://localhost:3000".to_string(),
            port: 8000,
            production: false,
            service_account: None,
        };
        let app_state = Arc::new(AppState::new(config, DBClient::new(pool), None));

        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Penyewa])
            }))
            .layer(from_fn(move |mut req: Request<Body>, next: Next| {
                let user = signed_in.clone();
                async move {
                    req.extensions_mut().insert(SessionContext { user });
                    next.run(req).await
                }
            }))
            .layer(Extension(app_state))
    }

    #[tokio::test]
    async fn role_check_rejects_other_roles_with_forbidden() {
        let response = seeker_only(user(UserRole::Penyedia))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = seeker_only(user(UserRole::Penyewa))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), time::Duration::seconds(432000), false).to_string();
        assert!(cookie.starts_with("session=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=432000"));
        assert!(!cookie.contains("Secure"));

        let secure = session_cookie("abc".to_string(), time::Duration::seconds(60), true).to_string();
        assert!(secure.contains("Secure"));
    }

    #[test]
    fn removal_cookie_expires_immediately() {
        let cookie = removal_cookie().to_string();
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
