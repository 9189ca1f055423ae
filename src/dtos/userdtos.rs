use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::usermodel::{User, UserRole};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, max = 100, message = "Nama wajib diisi"))]
    pub name: String,

    #[validate(email(message = "Email tidak valid"))]
    pub email: String,

    #[validate(length(min = 6, max = 64, message = "Kata sandi terlalu lemah. Minimal 6 karakter."))]
    pub password: String,

    #[validate(required(message = "Silakan pilih peran Anda."))]
    pub role: Option<UserRole>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct SignInUserDto {
    #[validate(email(message = "Email tidak valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Kata sandi wajib diisi"))]
    pub password: String,
}

/// Body of `POST /api/session/login`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SessionLoginDto {
    #[serde(rename = "idToken", default)]
    pub id_token: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100, message = "Nama wajib diisi"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Bio terlalu panjang"))]
    pub bio: Option<String>,
    #[validate(length(max = 255, message = "Spesialisasi terlalu panjang"))]
    pub specialization: Option<String>,
    #[validate(url(message = "URL foto profil tidak valid"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub bio: Option<String>,
    pub specialization: Option<String>,
    pub avatar_url: Option<String>,
    pub rating: f32,
    pub review_count: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            role: user.role.to_str().to_string(),
            bio: user.bio.clone(),
            specialization: user.specialization.clone(),
            avatar_url: user.avatar_url.clone(),
            rating: user.rating,
            review_count: user.review_count,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// What anyone may see of a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicProfileDto {
    pub id: String,
    pub name: String,
    pub bio: Option<String>,
    pub specialization: Option<String>,
    pub avatar_url: Option<String>,
    pub rating: f32,
    pub review_count: i32,
}

impl PublicProfileDto {
    pub fn from_user(user: &User) -> Self {
        PublicProfileDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            bio: user.bio.clone(),
            specialization: user.specialization.clone(),
            avatar_url: user.avatar_url.clone(),
            rating: user.rating,
            review_count: user.review_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub status: String,
    pub data: UserData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponseDto {
    pub status: String,
    #[serde(rename = "idToken")]
    pub id_token: String,
    pub user: FilterUserDto,
    pub dashboard: String,
}
