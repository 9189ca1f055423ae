// db/userdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::{User, UserRole};

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn save_user<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        password: T,
        role: UserRole,
    ) -> Result<User, sqlx::Error>;

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        bio: Option<String>,
        specialization: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<User, sqlx::Error>;

    async fn get_tokens_valid_after(
        &self,
        user_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, sqlx::Error>;

    async fn revoke_user_tokens(
        &self,
        user_id: Uuid,
        valid_after: DateTime<Utc>,
    ) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>(
                r#"
                SELECT id, name, email, password, role, bio, specialization,
                       avatar_url, rating, review_count, tokens_valid_after,
                       created_at, updated_at
                FROM users
                WHERE id = $1
                "#
            )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>(
                r#"
                SELECT id, name, email, password, role, bio, specialization,
                       avatar_url, rating, review_count, tokens_valid_after,
                       created_at, updated_at
                FROM users
                WHERE LOWER(email) = LOWER($1)
                "#
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(user)
    }

    async fn save_user<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        password: T,
        role: UserRole,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password, role, bio, specialization,
                      avatar_url, rating, review_count, tokens_valid_after,
                      created_at, updated_at
            "#
        )
        .bind(name.into())
        .bind(email.into())
        .bind(password.into())
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        bio: Option<String>,
        specialization: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                specialization = COALESCE($4, specialization),
                avatar_url = COALESCE($5, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password, role, bio, specialization,
                      avatar_url, rating, review_count, tokens_valid_after,
                      created_at, updated_at
            "#
        )
        .bind(user_id)
        .bind(name)
        .bind(bio)
        .bind(specialization)
        .bind(avatar_url)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_tokens_valid_after(
        &self,
        user_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        let valid_after = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            r#"SELECT tokens_valid_after FROM users WHERE id = $1"#
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(valid_after.flatten())
    }

    async fn revoke_user_tokens(
        &self,
        user_id: Uuid,
        valid_after: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET tokens_valid_after = $2, updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(user_id)
        .bind(valid_after)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }
}
