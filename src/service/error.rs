use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    error::HttpError,
    models::jobmodel::JobStatus,
    service::identity::AuthError,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Pekerjaan {0} tidak ditemukan")]
    JobNotFound(Uuid),

    #[error("Tawaran dari penyedia {1} untuk pekerjaan {0} tidak ditemukan")]
    BidNotFound(Uuid, Uuid),

    #[error("Pengguna {0} tidak ditemukan")]
    UserNotFound(Uuid),

    #[error("Job {0} cannot move from status {1:?}")]
    InvalidJobStatus(Uuid, JobStatus),

    #[error("User {0} is not authorized to perform this action on job {1}")]
    UnauthorizedJobAccess(Uuid, Uuid),

    #[error("{0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        HttpError::new(error.to_string(), status)
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::BidNotFound(_, _)
            | ServiceError::UserNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidJobStatus(_, _)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::UnauthorizedJobAccess(_, _) => StatusCode::FORBIDDEN,

            ServiceError::Conflict(_) => StatusCode::CONFLICT,

            ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        let id = Uuid::new_v4();
        let cases = vec![
            (ServiceError::JobNotFound(id), StatusCode::NOT_FOUND),
            (ServiceError::InvalidJobStatus(id, JobStatus::Completed), StatusCode::BAD_REQUEST),
            (ServiceError::UnauthorizedJobAccess(id, id), StatusCode::FORBIDDEN),
            (ServiceError::Conflict("dup".into()), StatusCode::CONFLICT),
            (ServiceError::Database(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            let http: HttpError = error.into();
            assert_eq!(http.status, expected);
        }
    }
}
