// db/notificationdb.rs
use async_trait::async_trait;
use sqlx::{Error, PgConnection};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::notificationmodel::{NewNotification, Notification};

/// Inserts a notification on an open connection, so callers can write it in
/// the same transaction as the change it reports.
pub(crate) async fn insert_notification(
    conn: &mut PgConnection,
    notification: &NewNotification,
) -> Result<Notification, Error> {
    sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (user_id, message, link_to)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, message, link_to, is_read, created_at
        "#
    )
    .bind(notification.user_id)
    .bind(&notification.message)
    .bind(&notification.link_to)
    .fetch_one(conn)
    .await
}

#[async_trait]
pub trait NotificationExt {
    async fn get_user_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, Error>;

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, Error>;

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, Error>;

    async fn get_unread_notification_count(&self, user_id: Uuid) -> Result<i64, Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn get_user_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, message, link_to, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, message, link_to, is_read, created_at
            "#
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE"#
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_unread_notification_count(&self, user_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE"#
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }
}
