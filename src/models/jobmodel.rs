use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::notificationmodel::NewNotification;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "job_status")]
pub enum JobStatus {
    #[sqlx(rename = "OPEN")]
    #[serde(rename = "OPEN")]
    Open,
    #[sqlx(rename = "DALAM PENGERJAAN")]
    #[serde(rename = "DALAM PENGERJAAN")]
    InProgress,
    #[sqlx(rename = "MENUNGGU PEMBAYARAN")]
    #[serde(rename = "MENUNGGU PEMBAYARAN")]
    AwaitingPayment,
    #[sqlx(rename = "SELESAI")]
    #[serde(rename = "SELESAI")]
    Completed,
    #[sqlx(rename = "DIBATALKAN")]
    #[serde(rename = "DIBATALKAN")]
    Cancelled,
}

impl JobStatus {
    pub fn to_str(&self) -> &str {
        match self {
            JobStatus::Open => "OPEN",
            JobStatus::InProgress => "DALAM PENGERJAAN",
            JobStatus::AwaitingPayment => "MENUNGGU PEMBAYARAN",
            JobStatus::Completed => "SELESAI",
            JobStatus::Cancelled => "DIBATALKAN",
        }
    }

    pub fn display(&self) -> &str {
        match self {
            JobStatus::Open => "Mencari Penyedia",
            JobStatus::InProgress => "Dalam Pengerjaan",
            JobStatus::AwaitingPayment => "Menunggu Pembayaran",
            JobStatus::Completed => "Selesai",
            JobStatus::Cancelled => "Dibatalkan",
        }
    }

    /// Jobs a seeker still has running.
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::InProgress | JobStatus::AwaitingPayment)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Open, JobStatus::InProgress)
                | (JobStatus::Open, JobStatus::Cancelled)
                | (JobStatus::InProgress, JobStatus::AwaitingPayment)
                | (JobStatus::InProgress, JobStatus::Completed)
                | (JobStatus::AwaitingPayment, JobStatus::Completed)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "bid_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

impl BidStatus {
    pub fn to_str(&self) -> &str {
        match self {
            BidStatus::Pending => "PENDING",
            BidStatus::Accepted => "ACCEPTED",
            BidStatus::Rejected => "REJECTED",
        }
    }

    pub fn display(&self) -> &str {
        match self {
            BidStatus::Pending => "Menunggu Respon",
            BidStatus::Accepted => "Diterima",
            BidStatus::Rejected => "Ditolak",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub description: String,
    /// Whole rupiah.
    pub budget: i64,
    pub hirer_id: Uuid,
    pub hirer_name: String,
    pub status: JobStatus,
    pub provider_id: Option<Uuid>,
    pub provider_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Provider display fields copied onto a bid when it is placed.
///
/// The snapshot is never refreshed: a provider's later rating, avatar or
/// name changes do not reach bids already placed. Read it as "as of the
/// bid's `created_at`".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ProviderSnapshot {
    pub provider_name: String,
    pub provider_rating: f32,
    pub provider_avatar_url: Option<String>,
    pub provider_review_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub job_id: Uuid,
    pub provider_id: Uuid,
    pub status: BidStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub snapshot: ProviderSnapshot,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A bid joined with the title of the job it was placed on.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProviderBid {
    pub job_id: Uuid,
    pub job_title: String,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PortfolioItem {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Every row change that accepting one bid implies, computed before any write.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptancePlan {
    pub job_id: Uuid,
    pub job_status: JobStatus,
    pub provider_id: Uuid,
    pub provider_name: String,
    /// Every bid on the job with the status it ends up in.
    pub bid_statuses: Vec<(Uuid, BidStatus)>,
    pub notification: NewNotification,
}

impl AcceptancePlan {
    pub fn rejected(&self) -> Vec<Uuid> {
        self.bid_statuses
            .iter()
            .filter(|(_, status)| *status == BidStatus::Rejected)
            .map(|(provider_id, _)| *provider_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_status_wire_labels() {
        let json = serde_json::to_string(&JobStatus::InProgress).unwrap();
        assert_eq!(json, "\"DALAM PENGERJAAN\"");
        let status: JobStatus = serde_json::from_str("\"MENUNGGU PEMBAYARAN\"").unwrap();
        assert_eq!(status, JobStatus::AwaitingPayment);
        assert_eq!(serde_json::to_string(&BidStatus::Rejected).unwrap(), "\"REJECTED\"");
    }

    #[test]
    fn job_transitions_follow_lifecycle() {
        assert!(JobStatus::Open.can_transition_to(JobStatus::InProgress));
        assert!(JobStatus::Open.can_transition_to(JobStatus::Cancelled));
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::AwaitingPayment));
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::AwaitingPayment.can_transition_to(JobStatus::Completed));

        assert!(!JobStatus::Open.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::InProgress.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Open));
        assert!(!JobStatus::Cancelled.can_transition_to(JobStatus::InProgress));
    }

    #[test]
    fn active_and_terminal() {
        assert!(JobStatus::InProgress.is_active());
        assert!(JobStatus::AwaitingPayment.is_active());
        assert!(!JobStatus::Open.is_active());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn bid_flattens_snapshot() {
        let bid = Bid {
            job_id: Uuid::nil(),
            provider_id: Uuid::nil(),
            status: BidStatus::Pending,
            snapshot: ProviderSnapshot {
                provider_name: "Budi Perkasa".to_string(),
                provider_rating: 4.9,
                provider_avatar_url: None,
                provider_review_count: 120,
            },
            message: None,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&bid).unwrap();
        assert_eq!(value["provider_name"], "Budi Perkasa");
        assert_eq!(value["provider_review_count"], 120);
        assert_eq!(value["status"], "PENDING");
    }
}
