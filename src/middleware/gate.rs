// middleware/gate.rs
//
// Page-level gate for `/dashboard/*`, `/login` and `/registrasi`.
use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::HttpError,
    middleware::{append_cookie, load_session_user, removal_cookie, SessionContext, SESSION_COOKIE},
    models::usermodel::UserRole,
    utils::token::IdentityClaims,
    AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// `/login`, `/registrasi`
    AuthPage,
    /// `/dashboard` and below
    Protected,
    Public,
}

impl PathClass {
    pub fn of(path: &str) -> PathClass {
        match path {
            "/login" | "/registrasi" => PathClass::AuthPage,
            "/dashboard" => PathClass::Protected,
            p if p.starts_with("/dashboard/") => PathClass::Protected,
            _ => PathClass::Public,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CookieState {
    Absent,
    Valid(IdentityClaims),
    Invalid,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Allow {
        clear_cookie: bool,
        /// Set only for protected pages.
        session: Option<IdentityClaims>,
    },
    Redirect {
        location: String,
        clear_cookie: bool,
    },
}

pub fn login_redirect(path: &str) -> String {
    format!("/login?redirect={}", urlencoding::encode(path))
}

pub fn decide(path: &str, cookie: CookieState) -> GateDecision {
    let class = PathClass::of(path);

    match (cookie, class) {
        (CookieState::Absent, PathClass::Protected) => GateDecision::Redirect {
            location: login_redirect(path),
            clear_cookie: false,
        },
        (CookieState::Absent, _) => GateDecision::Allow {
            clear_cookie: false,
            session: None,
        },

        (CookieState::Valid(claims), PathClass::AuthPage) => {
            let role = claims.role.unwrap_or(UserRole::Penyewa);
            GateDecision::Redirect {
                location: role.dashboard_path().to_string(),
                clear_cookie: false,
            }
        }
        (CookieState::Valid(claims), PathClass::Protected) => GateDecision::Allow {
            clear_cookie: false,
            session: Some(claims),
        },
        (CookieState::Valid(_), PathClass::Public) => GateDecision::Allow {
            clear_cookie: false,
            session: None,
        },

        (CookieState::Invalid, PathClass::Public) => GateDecision::Allow {
            clear_cookie: true,
            session: None,
        },
        (CookieState::Invalid, _) => GateDecision::Redirect {
            location: "/login".to_string(),
            clear_cookie: true,
        },
    }
}

fn redirect(location: &str, clear_cookie: bool) -> Response {
    let mut response = Redirect::temporary(location).into_response();
    if clear_cookie {
        append_cookie(&mut response, &removal_cookie());
    }
    response
}

pub async fn session_gate(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let path = req.uri().path().to_string();

    let cookie_state = match cookie_jar.get(SESSION_COOKIE) {
        None => CookieState::Absent,
        Some(cookie) => match app_state.session_verifier.verify(cookie.value(), true).await {
            Ok(claims) => CookieState::Valid(claims),
            Err(e) => {
                tracing::debug!("session cookie rejected on {}: {:?}", path, e);
                CookieState::Invalid
            }
        },
    };

    match decide(&path, cookie_state) {
        GateDecision::Redirect { location, clear_cookie } => {
            tracing::debug!("gate: {} -> {}", path, location);
            Ok(redirect(&location, clear_cookie))
        }
        GateDecision::Allow { clear_cookie, session } => {
            if let Some(claims) = session {
                match load_session_user(&app_state, &claims.sub).await? {
                    Some(user) => {
                        req.extensions_mut().insert(SessionContext { user });
                    }
                    None => {
                        tracing::debug!("gate: session user {} is gone", claims.sub);
                        return Ok(redirect("/login", true));
                    }
                }
            }

            let mut response = next.run(req).await;
            if clear_cookie {
                append_cookie(&mut response, &removal_cookie());
            }
            Ok(response)
        }
    }
}
