// handler/jobs.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::jobdb::JobExt,
    dtos::{ApiResponse, CreateJobDto, PlaceBidDto},
    error::HttpError,
    middleware::{role_check, SessionContext},
    models::usermodel::UserRole,
    service::error::ServiceError,
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        .route(
            "/",
            post(create_job).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Penyewa])
            })),
        )
        .route("/", get(list_open_jobs))
        .route("/:job_id", get(get_job))
        .route(
            "/:job_id/bids",
            post(place_bid).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Penyedia])
            })),
        )
        .route(
            "/:job_id/bids",
            get(list_bids).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Penyewa])
            })),
        )
        .route(
            "/:job_id/bids/:provider_id/accept",
            post(accept_bid).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Penyewa])
            })),
        )
        .route(
            "/:job_id/request-payment",
            post(request_payment).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Penyedia])
            })),
        )
        .route(
            "/:job_id/complete",
            post(complete_job).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Penyewa])
            })),
        )
        .route(
            "/:job_id/cancel",
            post(cancel_job).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Penyewa])
            })),
        )
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.bid_service
        .create_job(&session.user, body.title, body.category, body.description, body.budget)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Permintaan jasa berhasil dibuat", job)),
    ))
}

pub async fn list_open_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.db_client
        .get_open_jobs()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Open jobs retrieved successfully", jobs)))
}

pub async fn get_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.db_client
        .get_job_by_id(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or(ServiceError::JobNotFound(job_id))?;

    Ok(Json(ApiResponse::success("Job retrieved successfully", job)))
}

pub async fn place_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<PlaceBidDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let message = body.message.filter(|m| !m.trim().is_empty());
    let bid = app_state.bid_service
        .place_bid(job_id, &session.user, message)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Penawaran berhasil dikirim", bid)),
    ))
}

pub async fn list_bids(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let bids = app_state.bid_service
        .list_bids(job_id, session.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Bids retrieved successfully", bids)))
}

pub async fn accept_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path((job_id, provider_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    let result = app_state.bid_service
        .accept_bid(job_id, session.user.id, provider_id)
        .await?;

    Ok(Json(ApiResponse::success("Penawaran berhasil diterima", result)))
}

pub async fn request_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.bid_service
        .request_payment(job_id, &session.user)
        .await?;

    Ok(Json(ApiResponse::success("Permintaan pembayaran terkirim", job)))
}

pub async fn complete_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.bid_service
        .complete(job_id, session.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Pekerjaan ditandai selesai", job)))
}

pub async fn cancel_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.bid_service
        .cancel(job_id, session.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Pekerjaan dibatalkan", job)))
}
