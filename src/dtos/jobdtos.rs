use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::utils::currency::parse_rupiah;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

/// Budgets arrive either as a JSON number or as a form string like `750.000`.
fn deserialize_budget<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Budget {
        Number(i64),
        Text(String),
    }

    match Budget::deserialize(deserializer)? {
        Budget::Number(n) => Ok(n),
        Budget::Text(s) => parse_rupiah(&s).map_err(serde::de::Error::custom),
    }
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobDto {
    #[validate(length(min = 1, max = 100, message = "Judul pekerjaan wajib diisi"))]
    pub title: String,

    #[validate(length(min = 1, max = 100, message = "Kategori wajib dipilih"))]
    pub category: String,

    #[validate(length(min = 1, message = "Deskripsi wajib diisi"))]
    pub description: String,

    #[validate(range(min = 1, message = "Anggaran harus lebih dari 0"))]
    #[serde(deserialize_with = "deserialize_budget")]
    pub budget: i64,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct PlaceBidDto {
    #[validate(length(max = 1000, message = "Pesan penawaran terlalu panjang"))]
    pub message: Option<String>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreatePortfolioItemDto {
    #[validate(length(min = 1, max = 100, message = "Judul proyek wajib diisi"))]
    pub title: String,

    #[validate(length(min = 1, message = "Deskripsi wajib diisi"))]
    pub description: String,

    #[validate(url(message = "URL gambar tidak valid"))]
    pub image_url: String,

    #[validate(length(min = 1, max = 100, message = "Kategori wajib diisi"))]
    pub category: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageDto {
    #[validate(length(min = 1, max = 2000, message = "Pesan harus berisi 1 sampai 2000 karakter"))]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_accepts_number_or_formatted_text() {
        let from_number: CreateJobDto = serde_json::from_str(
            r#"{"title":"Cat ulang rumah","category":"Renovasi","description":"Dua kamar","budget":1500000}"#,
        )
        .unwrap();
        assert_eq!(from_number.budget, 1_500_000);

        let from_text: CreateJobDto = serde_json::from_str(
            r#"{"title":"Cat ulang rumah","category":"Renovasi","description":"Dua kamar","budget":"Rp 1.500.000"}"#,
        )
        .unwrap();
        assert_eq!(from_text.budget, 1_500_000);
    }

    #[test]
    fn zero_budget_fails_validation() {
        let dto = CreateJobDto {
            title: "Pasang keramik".to_string(),
            category: "Renovasi".to_string(),
            description: "Lantai dapur".to_string(),
            budget: 0,
        };
        let err = dto.validate().unwrap_err();
        assert!(err.to_string().contains("Anggaran harus lebih dari 0"));
    }

    #[test]
    fn message_length_bounds() {
        assert!(SendMessageDto { text: String::new() }.validate().is_err());
        assert!(SendMessageDto { text: "a".repeat(2000) }.validate().is_ok());
        assert!(SendMessageDto { text: "a".repeat(2001) }.validate().is_err());
    }
}
