use axum::{response::IntoResponse, Json};

use crate::dtos::PageDto;

pub async fn login_page() -> impl IntoResponse {
    Json(PageDto {
        page: "login",
        title: "Masuk ke KelarApp",
        submit_to: "/api/auth/sign-in",
    })
}

pub async fn register_page() -> impl IntoResponse {
    Json(PageDto {
        page: "registrasi",
        title: "Buat Akun KelarApp",
        submit_to: "/api/auth/register",
    })
}
