// db/portfoliodb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::jobmodel::PortfolioItem;

#[async_trait]
pub trait PortfolioExt {
    async fn add_portfolio_item(
        &self,
        provider_id: Uuid,
        title: String,
        description: String,
        image_url: String,
        category: String,
    ) -> Result<PortfolioItem, Error>;

    async fn get_portfolio(&self, provider_id: Uuid) -> Result<Vec<PortfolioItem>, Error>;

    /// Deletes only when `provider_id` owns the item. Returns whether a row went away.
    async fn delete_portfolio_item(
        &self,
        item_id: Uuid,
        provider_id: Uuid,
    ) -> Result<bool, Error>;
}

#[async_trait]
impl PortfolioExt for DBClient {
    async fn add_portfolio_item(
        &self,
        provider_id: Uuid,
        title: String,
        description: String,
        image_url: String,
        category: String,
    ) -> Result<PortfolioItem, Error> {
        sqlx::query_as::<_, PortfolioItem>(
            r#"
            INSERT INTO portfolio_items (provider_id, title, description, image_url, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, provider_id, title, description, image_url, category, created_at
            "#
        )
        .bind(provider_id)
        .bind(title)
        .bind(description)
        .bind(image_url)
        .bind(category)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_portfolio(&self, provider_id: Uuid) -> Result<Vec<PortfolioItem>, Error> {
        sqlx::query_as::<_, PortfolioItem>(
            r#"
            SELECT id, provider_id, title, description, image_url, category, created_at
            FROM portfolio_items
            WHERE provider_id = $1
            ORDER BY created_at DESC
            "#
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn delete_portfolio_item(
        &self,
        item_id: Uuid,
        provider_id: Uuid,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"DELETE FROM portfolio_items WHERE id = $1 AND provider_id = $2"#
        )
        .bind(item_id)
        .bind(provider_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
