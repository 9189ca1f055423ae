use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, routing::post, Extension, Json, Router};
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::{FilterUserDto, RegisterUserDto, SignInResponseDto, SignInUserDto, UserData, UserResponseDto},
    error::{ErrorMessage, HttpError},
    service::identity::Identity,
    utils::password,
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/sign-in", post(sign_in))
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let role = body
        .role
        .ok_or_else(|| HttpError::bad_request("Silakan pilih peran Anda."))?;

    let existing_user = app_state.db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing_user.is_some() {
        return Err(HttpError::unique_constraint_violation(ErrorMessage::EmailExist.to_string()));
    }

    let hashed_password = password::hash(&body.password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let user = app_state.db_client
        .save_user(body.name, body.email, hashed_password, role)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                HttpError::unique_constraint_violation(ErrorMessage::EmailExist.to_string())
            }
            other => HttpError::server_error(other.to_string()),
        })?;

    tracing::info!("Registered {} as {}", user.id, user.role.to_str());

    Ok((
        StatusCode::CREATED,
        Json(UserResponseDto {
            status: "success".to_string(),
            data: UserData {
                user: FilterUserDto::filter_user(&user),
            },
        }),
    ))
}

/// Password sign-in. Returns an ID token to exchange at `/api/session/login`.
pub async fn sign_in(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<SignInUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let identity = app_state
        .identity
        .as_ref()
        .ok_or_else(|| HttpError::server_error(ErrorMessage::IdentityNotConfigured.to_string()))?;

    let user = app_state.db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    let password_matched = password::compare(&body.password, &user.password)
        .map_err(|_| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        return Err(HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()));
    }

    let id_token = identity
        .mint_id_token(&Identity {
            uid: user.id,
            name: user.name.clone(),
            role: user.role,
        })
        .map_err(|e| {
            tracing::error!("Error minting ID token for {}: {:?}", user.id, e);
            HttpError::server_error(e.to_string())
        })?;

    Ok(Json(SignInResponseDto {
        status: "success".to_string(),
        id_token,
        dashboard: user.role.dashboard_path().to_string(),
        user: FilterUserDto::filter_user(&user),
    }))
}
