// service/bid_service.rs
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, jobdb::JobExt},
    models::{
        jobmodel::*,
        notificationmodel::{NewNotification, Notification},
        usermodel::User,
    },
    service::{error::ServiceError, feed::{ChangeEvent, ChangeFeed}},
};

/// Works out every write that accepting `provider_id`'s bid implies.
///
/// Fails when `hirer_id` does not own the job, when the job is no longer
/// OPEN, or when the provider has no bid on it. Nothing is written here.
pub fn plan_acceptance(
    job: &Job,
    bids: &[Bid],
    hirer_id: Uuid,
    provider_id: Uuid,
) -> Result<AcceptancePlan, ServiceError> {
    if job.hirer_id != hirer_id {
        return Err(ServiceError::UnauthorizedJobAccess(hirer_id, job.id));
    }

    if !job.status.can_transition_to(JobStatus::InProgress) {
        return Err(ServiceError::InvalidJobStatus(job.id, job.status));
    }

    let winner = bids
        .iter()
        .find(|bid| bid.provider_id == provider_id)
        .ok_or(ServiceError::BidNotFound(job.id, provider_id))?;

    let bid_statuses = bids
        .iter()
        .map(|bid| {
            let status = if bid.provider_id == provider_id {
                BidStatus::Accepted
            } else {
                BidStatus::Rejected
            };
            (bid.provider_id, status)
        })
        .collect();

    Ok(AcceptancePlan {
        job_id: job.id,
        job_status: JobStatus::InProgress,
        provider_id,
        provider_name: winner.snapshot.provider_name.clone(),
        bid_statuses,
        notification: NewNotification {
            user_id: provider_id,
            message: format!("Tawaran Anda untuk \"{}\" telah diterima oleh klien!", job.title),
            link_to: "/dashboard/penyedia/tawaran".to_string(),
        },
    })
}

fn seeker_job_link(job_id: Uuid) -> String {
    format!("/dashboard/penyewa/pekerjaan/{}", job_id)
}

fn duplicate_bid() -> ServiceError {
    ServiceError::Conflict("Anda sudah mengirimkan penawaran untuk pekerjaan ini.".to_string())
}

/// A provider may bid once, and only while the job is OPEN.
pub fn ensure_biddable(job: &Job, existing: Option<&Bid>) -> Result<(), ServiceError> {
    if job.status != JobStatus::Open {
        return Err(ServiceError::InvalidJobStatus(job.id, job.status));
    }

    if existing.is_some() {
        return Err(duplicate_bid());
    }

    Ok(())
}

/// A bid insert that lost the race on the `(job_id, provider_id)` key is
/// the same 409 as the pre-check.
pub fn map_bid_insert_error(err: sqlx::Error) -> ServiceError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => duplicate_bid(),
        other => ServiceError::Database(other),
    }
}

pub fn bid_placed_notification(job: &Job, provider_name: &str) -> NewNotification {
    NewNotification {
        user_id: job.hirer_id,
        message: format!(
            "{} mengirimkan penawaran untuk pekerjaan \"{}\".",
            provider_name, job.title
        ),
        link_to: seeker_job_link(job.id),
    }
}

#[derive(Debug, Clone)]
pub struct BidService {
    db_client: Arc<DBClient>,
    feed: ChangeFeed,
}

impl BidService {
    pub fn new(db_client: Arc<DBClient>, feed: ChangeFeed) -> Self {
        Self { db_client, feed }
    }

    async fn load_job(&self, job_id: Uuid) -> Result<Job, ServiceError> {
        self.db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))
    }

    fn publish_job(&self, job: &Job, bidder_ids: Vec<Uuid>) {
        self.feed.publish(ChangeEvent::Job {
            job: job.clone(),
            bidder_ids,
        });
    }

    pub async fn create_job(
        &self,
        hirer: &User,
        title: String,
        category: String,
        description: String,
        budget: i64,
    ) -> Result<Job, ServiceError> {
        if budget < 1 {
            return Err(ServiceError::Validation("Anggaran harus lebih dari 0".to_string()));
        }

        let job = self
            .db_client
            .create_job(hirer.id, hirer.name.clone(), title, category, description, budget)
            .await?;

        tracing::info!("Job {} opened by {}", job.id, hirer.id);
        self.publish_job(&job, vec![]);

        Ok(job)
    }

    pub async fn place_bid(
        &self,
        job_id: Uuid,
        provider: &User,
        message: Option<String>,
    ) -> Result<Bid, ServiceError> {
        let job = self.load_job(job_id).await?;
        let existing = self.db_client.get_bid(job_id, provider.id).await?;
        ensure_biddable(&job, existing.as_ref())?;

        let snapshot = ProviderSnapshot {
            provider_name: provider.name.clone(),
            provider_rating: provider.rating,
            provider_avatar_url: provider.avatar_url.clone(),
            provider_review_count: provider.review_count,
        };

        let (bid, notification) = self
            .db_client
            .create_bid(
                job_id,
                provider.id,
                &snapshot,
                message,
                &bid_placed_notification(&job, &provider.name),
            )
            .await
            .map_err(map_bid_insert_error)?;

        tracing::info!("Provider {} bid on job {}", provider.id, job_id);

        self.feed.publish(ChangeEvent::Bid {
            bid: bid.clone(),
            hirer_id: job.hirer_id,
        });
        self.feed.publish(ChangeEvent::Notification(notification));

        Ok(bid)
    }

    /// Bids on a job, for its owner only.
    pub async fn list_bids(&self, job_id: Uuid, hirer_id: Uuid) -> Result<Vec<Bid>, ServiceError> {
        let job = self.load_job(job_id).await?;

        if job.hirer_id != hirer_id {
            return Err(ServiceError::UnauthorizedJobAccess(hirer_id, job_id));
        }

        Ok(self.db_client.get_job_bids(job_id).await?)
    }

    pub async fn accept_bid(
        &self,
        job_id: Uuid,
        hirer_id: Uuid,
        provider_id: Uuid,
    ) -> Result<AcceptanceResult, ServiceError> {
        let job = self.load_job(job_id).await?;
        let bids = self.db_client.get_job_bids(job_id).await?;

        // no row lock between this check and the write below
        let plan = plan_acceptance(&job, &bids, hirer_id, provider_id)?;
        let (job, notification) = self.db_client.apply_acceptance(&plan).await?;

        tracing::info!(
            "Job {} accepted bid from {} ({} rejected)",
            job_id,
            provider_id,
            plan.rejected().len()
        );

        let bidder_ids: Vec<Uuid> = plan.bid_statuses.iter().map(|(id, _)| *id).collect();
        self.publish_job(&job, bidder_ids);
        self.feed.publish(ChangeEvent::Notification(notification.clone()));

        let bids = self.db_client.get_job_bids(job_id).await?;

        Ok(AcceptanceResult {
            job,
            bids,
            notification,
        })
    }

    /// Assigned provider asks the seeker to pay.
    pub async fn request_payment(
        &self,
        job_id: Uuid,
        provider: &User,
    ) -> Result<Job, ServiceError> {
        let job = self.load_job(job_id).await?;

        if job.provider_id != Some(provider.id) {
            return Err(ServiceError::UnauthorizedJobAccess(provider.id, job_id));
        }

        let notification = NewNotification {
            user_id: job.hirer_id,
            message: format!(
                "{} meminta pembayaran untuk pekerjaan \"{}\".",
                provider.name, job.title
            ),
            link_to: seeker_job_link(job_id),
        };

        self.transition(job, JobStatus::AwaitingPayment, Some(notification)).await
    }

    pub async fn complete(&self, job_id: Uuid, hirer_id: Uuid) -> Result<Job, ServiceError> {
        let job = self.load_job(job_id).await?;

        if job.hirer_id != hirer_id {
            return Err(ServiceError::UnauthorizedJobAccess(hirer_id, job_id));
        }

        let notification = job.provider_id.map(|provider_id| NewNotification {
            user_id: provider_id,
            message: format!("Pekerjaan \"{}\" telah ditandai selesai oleh klien.", job.title),
            link_to: "/dashboard/penyedia/tawaran".to_string(),
        });

        self.transition(job, JobStatus::Completed, notification).await
    }

    /// Withdraws an OPEN job; pending bids are rejected alongside.
    pub async fn cancel(&self, job_id: Uuid, hirer_id: Uuid) -> Result<Job, ServiceError> {
        let job = self.load_job(job_id).await?;

        if job.hirer_id != hirer_id {
            return Err(ServiceError::UnauthorizedJobAccess(hirer_id, job_id));
        }

        if !job.status.can_transition_to(JobStatus::Cancelled) {
            return Err(ServiceError::InvalidJobStatus(job_id, job.status));
        }

        let bidder_ids: Vec<Uuid> = self
            .db_client
            .get_job_bids(job_id)
            .await?
            .into_iter()
            .map(|bid| bid.provider_id)
            .collect();

        let job = self.db_client.cancel_job(job_id).await?;
        tracing::info!("Job {} cancelled by {}", job_id, hirer_id);
        self.publish_job(&job, bidder_ids);

        Ok(job)
    }

    /// Status change and its notification commit together.
    async fn transition(
        &self,
        job: Job,
        next: JobStatus,
        notification: Option<NewNotification>,
    ) -> Result<Job, ServiceError> {
        if !job.status.can_transition_to(next) {
            return Err(ServiceError::InvalidJobStatus(job.id, job.status));
        }

        let (updated, stored) = self
            .db_client
            .update_job_status(job.id, next, notification.as_ref())
            .await?;
        tracing::info!("Job {} moved {} -> {}", job.id, job.status.to_str(), next.to_str());

        self.publish_job(&updated, vec![]);
        if let Some(stored) = stored {
            self.feed.publish(ChangeEvent::Notification(stored));
        }

        Ok(updated)
    }
}

#[derive(Debug, Serialize)]
pub struct AcceptanceResult {
    pub job: Job,
    pub bids: Vec<Bid>,
    pub notification: Notification,
}
