use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    db::notificationdb::NotificationExt,
    dtos::ApiResponse,
    error::HttpError,
    middleware::SessionContext,
    AppState,
};

pub const NOTIFICATION_PAGE_SIZE: i64 = 50;

pub fn notifications_handler() -> Router {
    Router::new()
        .route("/", get(get_notifications))
        .route("/unread-count", get(get_unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/:notification_id/read", post(mark_read))
}

pub async fn get_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let notifications = app_state.db_client
        .get_user_notifications(session.user.id, NOTIFICATION_PAGE_SIZE)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Notifications retrieved successfully", notifications)))
}

pub async fn get_unread_count(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let count = app_state.db_client
        .get_unread_notification_count(session.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Unread count retrieved", json!({ "unread_count": count }))))
}

pub async fn mark_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let notification = app_state.db_client
        .mark_notification_read(notification_id, session.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Notifikasi tidak ditemukan."))?;

    Ok(Json(ApiResponse::success("Notification marked as read", notification)))
}

pub async fn mark_all_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let marked = app_state.db_client
        .mark_all_notifications_read(session.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    tracing::debug!("marked {} notification(s) read for {}", marked, session.user.id);

    Ok(Json(ApiResponse::success("Semua notifikasi ditandai telah dibaca", json!({ "marked": marked }))))
}
