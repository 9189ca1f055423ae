// service/feed.rs
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    Stream, StreamExt,
};
use uuid::Uuid;

use crate::models::{
    chatmodel::ChatMessage,
    jobmodel::{Bid, Job, JobStatus},
    notificationmodel::Notification,
    usermodel::UserRole,
};

const FEED_CAPACITY: usize = 256;

/// A row change pushed to live subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChangeEvent {
    Notification(Notification),
    ChatMessage(ChatMessage),
    Job {
        job: Job,
        /// Providers holding a bid on the job when it changed.
        bidder_ids: Vec<Uuid>,
    },
    Bid {
        bid: Bid,
        hirer_id: Uuid,
    },
}

impl ChangeEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            ChangeEvent::Notification(_) => "notification",
            ChangeEvent::ChatMessage(_) => "chat_message",
            ChangeEvent::Job { .. } => "job",
            ChangeEvent::Bid { .. } => "bid",
        }
    }

    pub fn visible_to(&self, user_id: Uuid, role: UserRole) -> bool {
        match self {
            ChangeEvent::Notification(n) => n.user_id == user_id,
            ChangeEvent::ChatMessage(m) => m.involves(user_id),
            ChangeEvent::Job { job, bidder_ids } => {
                job.hirer_id == user_id
                    || job.provider_id == Some(user_id)
                    || bidder_ids.contains(&user_id)
                    || (role == UserRole::Penyedia && job.status == JobStatus::Open)
            }
            ChangeEvent::Bid { bid, hirer_id } => {
                bid.provider_id == user_id || *hirer_id == user_id
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(FEED_CAPACITY)
    }
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: ChangeEvent) {
        let name = event.event_name();
        // no receivers is the normal idle state
        if let Ok(receivers) = self.tx.send(event) {
            tracing::debug!("change feed: {} delivered to {} subscriber(s)", name, receivers);
        }
    }

    /// Events visible to one user. Dropping the stream ends the subscription.
    pub fn subscribe_for(
        &self,
        user_id: Uuid,
        role: UserRole,
    ) -> impl Stream<Item = ChangeEvent> + Send + 'static {
        BroadcastStream::new(self.tx.subscribe()).filter_map(move |result| match result {
            Ok(event) if event.visible_to(user_id, role) => Some(event),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!("change feed subscriber {} lagged, skipped {} event(s)", user_id, skipped);
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chatmodel::conversation_id;
    use chrono::Utc;

    fn notification_for(user_id: Uuid) -> ChangeEvent {
        ChangeEvent::Notification(Notification {
            id: Uuid::new_v4(),
            user_id,
            message: "Tawaran baru".to_string(),
            link_to: "/dashboard/penyewa/pekerjaan".to_string(),
            is_read: false,
            created_at: Utc::now(),
        })
    }

    fn open_job(hirer_id: Uuid) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: "Perbaikan atap".to_string(),
            category: "Renovasi".to_string(),
            description: "Atap bocor di dua titik".to_string(),
            budget: 750_000,
            hirer_id,
            hirer_name: "Andi".to_string(),
            status: JobStatus::Open,
            provider_id: None,
            provider_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn audience_rules() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(notification_for(me).visible_to(me, UserRole::Penyewa));
        assert!(!notification_for(other).visible_to(me, UserRole::Penyewa));

        let message = ChangeEvent::ChatMessage(ChatMessage {
            id: Uuid::new_v4(),
            conversation_id: conversation_id(me, other),
            sender_id: other,
            recipient_id: me,
            text: "Halo".to_string(),
            created_at: Utc::now(),
        });
        assert!(message.visible_to(me, UserRole::Penyewa));
        assert!(!message.visible_to(Uuid::new_v4(), UserRole::Penyewa));

        let job = ChangeEvent::Job { job: open_job(other), bidder_ids: vec![] };
        assert!(job.visible_to(me, UserRole::Penyedia));
        assert!(!job.visible_to(me, UserRole::Penyewa));
        assert!(job.visible_to(other, UserRole::Penyewa));
    }

    #[tokio::test]
    async fn subscriber_only_sees_own_events() {
        let feed = ChangeFeed::new(16);
        let me = Uuid::new_v4();
        let stream = feed.subscribe_for(me, UserRole::Penyewa);
        tokio::pin!(stream);

        feed.publish(notification_for(Uuid::new_v4()));
        feed.publish(notification_for(me));

        match stream.next().await {
            Some(ChangeEvent::Notification(n)) => assert_eq!(n.user_id, me),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn lagged_subscriber_keeps_streaming() {
        let feed = ChangeFeed::new(2);
        let me = Uuid::new_v4();
        let stream = feed.subscribe_for(me, UserRole::Penyewa);
        tokio::pin!(stream);

        for _ in 0..5 {
            feed.publish(notification_for(me));
        }

        assert!(stream.next().await.is_some());
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let feed = ChangeFeed::default();
        feed.publish(notification_for(Uuid::new_v4()));
    }
}
