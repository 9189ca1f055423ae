use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{chatdb::ChatExt, userdb::UserExt},
    dtos::{ApiResponse, SendMessageDto},
    error::HttpError,
    middleware::SessionContext,
    service::{error::ServiceError, feed::ChangeEvent},
    AppState,
};

pub const CHAT_HISTORY_LIMIT: i64 = 200;

pub fn chat_handler() -> Router {
    Router::new().route("/:peer_id/messages", get(get_messages).post(send_message))
}

pub async fn get_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(peer_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let messages = app_state.db_client
        .get_conversation(session.user.id, peer_id, CHAT_HISTORY_LIMIT)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Messages retrieved successfully", messages)))
}

pub async fn send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(peer_id): Path<Uuid>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if body.text.trim().is_empty() {
        return Err(HttpError::bad_request("Pesan tidak boleh kosong"));
    }

    if peer_id == session.user.id {
        return Err(HttpError::bad_request("Tidak dapat mengirim pesan ke diri sendiri"));
    }

    app_state.db_client
        .get_user(Some(peer_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or(ServiceError::UserNotFound(peer_id))?;

    let message = app_state.db_client
        .send_message(session.user.id, peer_id, body.text)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state.feed.publish(ChangeEvent::ChatMessage(message.clone()));

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Pesan terkirim", message)),
    ))
}
