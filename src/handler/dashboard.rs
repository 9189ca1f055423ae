// handler/dashboard.rs
//
// One JSON view per dashboard page. Everything here sits behind the session gate.
use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    db::{jobdb::JobExt, notificationdb::NotificationExt, portfoliodb::PortfolioExt},
    dtos::*,
    error::HttpError,
    handler::notifications::NOTIFICATION_PAGE_SIZE,
    middleware::{role_check, SessionContext},
    models::{jobmodel::BidStatus, usermodel::UserRole},
    service::error::ServiceError,
    AppState,
};

pub fn dashboard_handler() -> Router {
    let seeker = Router::new()
        .route("/", get(seeker_dashboard))
        .route("/pekerjaan", get(seeker_jobs))
        .route("/pekerjaan/:job_id", get(seeker_job_detail))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Penyewa])
        }));

    let provider = Router::new()
        .route("/", get(provider_dashboard))
        .route("/tawaran", get(provider_bids))
        .route("/portofolio", get(provider_portfolio))
        .route("/profil", get(provider_profile))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Penyedia])
        }));

    Router::new()
        .route("/", get(dashboard_home))
        .nest("/penyewa", seeker)
        .nest("/penyedia", provider)
        .route("/notifikasi", get(notifications_page))
}

pub async fn dashboard_home(
    Extension(session): Extension<SessionContext>,
) -> impl IntoResponse {
    axum::response::Redirect::temporary(session.user.role.dashboard_path())
}

pub async fn seeker_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.db_client
        .get_jobs_by_hirer(session.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(SeekerDashboardDto {
        greeting: greeting("Selamat Datang", &session.user.name, "Pengguna"),
        totals: SeekerTotals::from_jobs(&jobs),
        jobs: JobRowDto::from_jobs(&jobs),
    }))
}

pub async fn seeker_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.db_client
        .get_jobs_by_hirer(session.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(SeekerJobsDto {
        totals: SeekerTotals::from_jobs(&jobs),
        total_jobs: jobs.len(),
        jobs: JobRowDto::from_jobs(&jobs),
    }))
}

pub async fn seeker_job_detail(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.db_client
        .get_job_by_id(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or(ServiceError::JobNotFound(job_id))?;

    if job.hirer_id != session.user.id {
        // someone else's job looks the same as a missing one
        return Err(ServiceError::JobNotFound(job_id).into());
    }

    let bids = app_state.db_client
        .get_job_bids(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(JobDetailDto {
        job: JobRowDto::from_job(&job),
        description: job.description.clone(),
        bidders: bids.iter().map(BidderDto::from_bid).collect(),
    }))
}

pub async fn provider_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let open_jobs = app_state.db_client
        .get_open_jobs()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let active_bids = app_state.db_client
        .count_provider_bids(session.user.id, BidStatus::Pending)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ProviderDashboardDto {
        greeting: greeting("Halo", &session.user.name, "Penyedia Jasa"),
        active_bids,
        open_jobs: JobRowDto::from_jobs(&open_jobs),
    }))
}

pub async fn provider_bids(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let bids = app_state.db_client
        .get_provider_bids(session.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ProviderBidsDto {
        bids: bids.iter().map(ProviderBidRowDto::from_bid).collect(),
    }))
}

pub async fn provider_portfolio(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let items = app_state.db_client
        .get_portfolio(session.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(PortfolioDto { items }))
}

pub async fn provider_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let portfolio = app_state.db_client
        .get_portfolio(session.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ProviderProfileDto {
        profile: PublicProfileDto::from_user(&session.user),
        portfolio,
    }))
}

pub async fn notifications_page(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<impl IntoResponse, HttpError> {
    let notifications = app_state.db_client
        .get_user_notifications(session.user.id, NOTIFICATION_PAGE_SIZE)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let unread_count = app_state.db_client
        .get_unread_notification_count(session.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(NotificationsDto {
        unread_count,
        notifications,
    }))
}
