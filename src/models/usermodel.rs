use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Penyewa,
    Penyedia,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Penyewa => "penyewa",
            UserRole::Penyedia => "penyedia",
        }
    }

    /// Landing page for a signed-in user of this role.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            UserRole::Penyewa => "/dashboard/penyewa",
            UserRole::Penyedia => "/dashboard/penyedia",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: UserRole,
    pub bio: Option<String>,
    pub specialization: Option<String>,
    pub avatar_url: Option<String>,
    pub rating: f32,
    pub review_count: i32,
    #[serde(skip_serializing)]
    pub tokens_valid_after: Option<DateTime<Utc>>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_provider(&self) -> bool {
        self.role == UserRole::Penyedia
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_dashboards() {
        assert_eq!(UserRole::Penyewa.dashboard_path(), "/dashboard/penyewa");
        assert_eq!(UserRole::Penyedia.dashboard_path(), "/dashboard/penyedia");
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&UserRole::Penyedia).unwrap();
        assert_eq!(json, "\"penyedia\"");
        let role: UserRole = serde_json::from_str("\"penyewa\"").unwrap();
        assert_eq!(role, UserRole::Penyewa);
    }
}
