// db/chatdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodel::{conversation_id, ChatMessage};

#[async_trait]
pub trait ChatExt {
    async fn send_message(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        text: String,
    ) -> Result<ChatMessage, Error>;

    /// Oldest first.
    async fn get_conversation(
        &self,
        user_id: Uuid,
        peer_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn send_message(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        text: String,
    ) -> Result<ChatMessage, Error> {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (conversation_id, sender_id, recipient_id, text)
            VALUES ($1, $2, $3, $4)
            RETURNING id, conversation_id, sender_id, recipient_id, text, created_at
            "#
        )
        .bind(conversation_id(sender_id, recipient_id))
        .bind(sender_id)
        .bind(recipient_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_conversation(
        &self,
        user_id: Uuid,
        peer_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, Error> {
        // newest `limit` rows, returned in ascending order
        sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, conversation_id, sender_id, recipient_id, text, created_at
            FROM (
                SELECT id, conversation_id, sender_id, recipient_id, text, created_at
                FROM chat_messages
                WHERE conversation_id = $1
                ORDER BY created_at DESC
                LIMIT $2
            ) recent
            ORDER BY created_at ASC
            "#
        )
        .bind(conversation_id(user_id, peer_id))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
