use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::portfoliodb::PortfolioExt,
    dtos::{ApiResponse, CreatePortfolioItemDto},
    error::HttpError,
    middleware::{role_check, SessionContext},
    models::usermodel::UserRole,
    AppState,
};

pub fn portfolio_handler() -> Router {
    Router::new()
        .route("/", post(add_portfolio_item))
        .route("/", get(get_my_portfolio))
        .route("/:item_id", delete(delete_portfolio_item))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Penyedia])
        }))
}

pub async fn add_portfolio_item(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<CreatePortfolioItemDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let item = app_state.db_client
        .add_portfolio_item(session.user.id, body.title, body.description, body.image_url, body.category)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Proyek berhasil ditambahkan ke portofolio", item)),
    ))
}

pub async fn get_my_portfolio(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let items = app_state.db_client
        .get_portfolio(session.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Portfolio retrieved successfully", items)))
}

pub async fn delete_portfolio_item(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let deleted = app_state.db_client
        .delete_portfolio_item(item_id, session.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if !deleted {
        return Err(HttpError::not_found("Item portofolio tidak ditemukan."));
    }

    Ok(Json(ApiResponse::success("Item portofolio dihapus", item_id)))
}
