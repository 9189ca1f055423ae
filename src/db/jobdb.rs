// db/jobdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::{db::DBClient, notificationdb::insert_notification};
use crate::models::{
    jobmodel::*,
    notificationmodel::{NewNotification, Notification},
};

#[async_trait]
pub trait JobExt {
    async fn create_job(
        &self,
        hirer_id: Uuid,
        hirer_name: String,
        title: String,
        category: String,
        description: String,
        budget: i64,
    ) -> Result<Job, Error>;

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    async fn get_jobs_by_hirer(&self, hirer_id: Uuid) -> Result<Vec<Job>, Error>;

    async fn get_open_jobs(&self) -> Result<Vec<Job>, Error>;

    /// Moves the job to `status` and stores `notification`, if any, in the
    /// same transaction.
    async fn update_job_status(
        &self,
        job_id: Uuid,
        status: JobStatus,
        notification: Option<&NewNotification>,
    ) -> Result<(Job, Option<Notification>), Error>;

    /// Sets the job to DIBATALKAN and rejects every pending bid in one transaction.
    async fn cancel_job(&self, job_id: Uuid) -> Result<Job, Error>;

    // Bids
    /// Inserts a PENDING bid together with the seeker's notification.
    async fn create_bid(
        &self,
        job_id: Uuid,
        provider_id: Uuid,
        snapshot: &ProviderSnapshot,
        message: Option<String>,
        notification: &NewNotification,
    ) -> Result<(Bid, Notification), Error>;

    async fn get_bid(
        &self,
        job_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Option<Bid>, Error>;

    async fn get_job_bids(&self, job_id: Uuid) -> Result<Vec<Bid>, Error>;

    async fn get_provider_bids(&self, provider_id: Uuid) -> Result<Vec<ProviderBid>, Error>;

    async fn count_provider_bids(
        &self,
        provider_id: Uuid,
        status: BidStatus,
    ) -> Result<i64, Error>;

    /// Writes an acceptance plan as a single transaction: job row, every bid
    /// row of the job and the winner's notification.
    async fn apply_acceptance(
        &self,
        plan: &AcceptancePlan,
    ) -> Result<(Job, Notification), Error>;
}

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(
        &self,
        hirer_id: Uuid,
        hirer_name: String,
        title: String,
        category: String,
        description: String,
        budget: i64,
    ) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (hirer_id, hirer_name, title, category, description, budget, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, category, description, budget, hirer_id, hirer_name,
                      status, provider_id, provider_name, created_at, updated_at
            "#
        )
        .bind(hirer_id)
        .bind(hirer_name)
        .bind(title)
        .bind(category)
        .bind(description)
        .bind(budget)
        .bind(JobStatus::Open)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, category, description, budget, hirer_id, hirer_name,
                   status, provider_id, provider_name, created_at, updated_at
            FROM jobs
            WHERE id = $1
            "#
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_jobs_by_hirer(&self, hirer_id: Uuid) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, category, description, budget, hirer_id, hirer_name,
                   status, provider_id, provider_name, created_at, updated_at
            FROM jobs
            WHERE hirer_id = $1
            ORDER BY created_at DESC
            "#
        )
        .bind(hirer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_open_jobs(&self) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, category, description, budget, hirer_id, hirer_name,
                   status, provider_id, provider_name, created_at, updated_at
            FROM jobs
            WHERE status = $1
            ORDER BY created_at DESC
            "#
        )
        .bind(JobStatus::Open)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_job_status(
        &self,
        job_id: Uuid,
        status: JobStatus,
        notification: Option<&NewNotification>,
    ) -> Result<(Job, Option<Notification>), Error> {
        let mut tx = self.pool.begin().await?;

        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, category, description, budget, hirer_id, hirer_name,
                      status, provider_id, provider_name, created_at, updated_at
            "#
        )
        .bind(job_id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        let stored = match notification {
            Some(notification) => Some(insert_notification(&mut *tx, notification).await?),
            None => None,
        };

        tx.commit().await?;
        Ok((job, stored))
    }

    async fn cancel_job(&self, job_id: Uuid) -> Result<Job, Error> {
        let mut tx = self.pool.begin().await?;

        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, category, description, budget, hirer_id, hirer_name,
                      status, provider_id, provider_name, created_at, updated_at
            "#
        )
        .bind(job_id)
        .bind(JobStatus::Cancelled)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE bids
            SET status = $2
            WHERE job_id = $1 AND status = $3
            "#
        )
        .bind(job_id)
        .bind(BidStatus::Rejected)
        .bind(BidStatus::Pending)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(job)
    }

    async fn create_bid(
        &self,
        job_id: Uuid,
        provider_id: Uuid,
        snapshot: &ProviderSnapshot,
        message: Option<String>,
        notification: &NewNotification,
    ) -> Result<(Bid, Notification), Error> {
        let mut tx = self.pool.begin().await?;

        let bid = sqlx::query_as::<_, Bid>(
            r#"
            INSERT INTO bids (job_id, provider_id, status, provider_name, provider_rating,
                              provider_avatar_url, provider_review_count, message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING job_id, provider_id, status, provider_name, provider_rating,
                      provider_avatar_url, provider_review_count, message, created_at
            "#
        )
        .bind(job_id)
        .bind(provider_id)
        .bind(BidStatus::Pending)
        .bind(&snapshot.provider_name)
        .bind(snapshot.provider_rating)
        .bind(&snapshot.provider_avatar_url)
        .bind(snapshot.provider_review_count)
        .bind(message)
        .fetch_one(&mut *tx)
        .await?;

        let stored = insert_notification(&mut *tx, notification).await?;

        tx.commit().await?;
        Ok((bid, stored))
    }

    async fn get_bid(
        &self,
        job_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Option<Bid>, Error> {
        sqlx::query_as::<_, Bid>(
            r#"
            SELECT job_id, provider_id, status, provider_name, provider_rating,
                   provider_avatar_url, provider_review_count, message, created_at
            FROM bids
            WHERE job_id = $1 AND provider_id = $2
            "#
        )
        .bind(job_id)
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_job_bids(&self, job_id: Uuid) -> Result<Vec<Bid>, Error> {
        sqlx::query_as::<_, Bid>(
            r#"
            SELECT job_id, provider_id, status, provider_name, provider_rating,
                   provider_avatar_url, provider_review_count, message, created_at
            FROM bids
            WHERE job_id = $1
            ORDER BY created_at DESC
            "#
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_provider_bids(&self, provider_id: Uuid) -> Result<Vec<ProviderBid>, Error> {
        sqlx::query_as::<_, ProviderBid>(
            r#"
            SELECT b.job_id, j.title AS job_title, b.status, b.created_at
            FROM bids b
            INNER JOIN jobs j ON j.id = b.job_id
            WHERE b.provider_id = $1
            ORDER BY b.created_at DESC
            "#
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_provider_bids(
        &self,
        provider_id: Uuid,
        status: BidStatus,
    ) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM bids WHERE provider_id = $1 AND status = $2"#
        )
        .bind(provider_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn apply_acceptance(
        &self,
        plan: &AcceptancePlan,
    ) -> Result<(Job, Notification), Error> {
        let mut tx = self.pool.begin().await?;

        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = $2, provider_id = $3, provider_name = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, category, description, budget, hirer_id, hirer_name,
                      status, provider_id, provider_name, created_at, updated_at
            "#
        )
        .bind(plan.job_id)
        .bind(plan.job_status)
        .bind(plan.provider_id)
        .bind(&plan.provider_name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE bids
            SET status = $3
            WHERE job_id = $1 AND provider_id = $2
            "#
        )
        .bind(plan.job_id)
        .bind(plan.provider_id)
        .bind(BidStatus::Accepted)
        .execute(&mut *tx)
        .await?;

        let rejected = plan.rejected();
        if !rejected.is_empty() {
            sqlx::query(
                r#"
                UPDATE bids
                SET status = $3
                WHERE job_id = $1 AND provider_id = ANY($2)
                "#
            )
            .bind(plan.job_id)
            .bind(&rejected)
            .bind(BidStatus::Rejected)
            .execute(&mut *tx)
            .await?;
        }

        let notification = insert_notification(&mut *tx, &plan.notification).await?;

        tx.commit().await?;
        Ok((job, notification))
    }
}
