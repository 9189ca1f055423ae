use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{portfoliodb::PortfolioExt, userdb::UserExt},
    dtos::{ApiResponse, FilterUserDto, ProviderProfileDto, PublicProfileDto, UpdateProfileDto, UserData, UserResponseDto},
    error::HttpError,
    middleware::SessionContext,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new().route("/me", get(get_me).put(update_me))
}

/// Public provider pages; no session needed.
pub fn providers_handler() -> Router {
    Router::new().route("/:provider_id", get(get_provider_profile))
}

pub async fn get_me(
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&session.user),
        },
    }))
}

pub async fn update_me(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<UpdateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state.db_client
        .update_user_profile(session.user.id, body.name, body.bio, body.specialization, body.avatar_url)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user),
        },
    }))
}

pub async fn get_provider_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(provider_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let provider = app_state.db_client
        .get_user(Some(provider_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .filter(|user| user.is_provider())
        .ok_or_else(|| HttpError::not_found("Profil penyedia jasa tidak ditemukan."))?;

    let portfolio = app_state.db_client
        .get_portfolio(provider.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Provider profile retrieved successfully",
        ProviderProfileDto {
            profile: PublicProfileDto::from_user(&provider),
            portfolio,
        },
    )))
}
