use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    dtos::userdtos::PublicProfileDto,
    models::{
        jobmodel::{Bid, BidStatus, Job, JobStatus, PortfolioItem, ProviderBid},
        notificationmodel::Notification,
    },
    utils::{
        currency::format_rupiah,
        dates::{format_date_id, format_datetime_short_id},
    },
};

#[derive(Debug, Serialize)]
pub struct JobRowDto {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub hirer_name: String,
    pub budget: i64,
    pub budget_display: String,
    pub status: JobStatus,
    pub status_label: String,
    pub provider_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_at_display: String,
}

impl JobRowDto {
    pub fn from_job(job: &Job) -> Self {
        JobRowDto {
            id: job.id,
            title: job.title.clone(),
            category: job.category.clone(),
            hirer_name: job.hirer_name.clone(),
            budget: job.budget,
            budget_display: format_rupiah(job.budget),
            status: job.status,
            status_label: job.status.display().to_string(),
            provider_name: job.provider_name.clone(),
            created_at: job.created_at,
            created_at_display: format_date_id(&job.created_at),
        }
    }

    pub fn from_jobs(jobs: &[Job]) -> Vec<JobRowDto> {
        jobs.iter().map(JobRowDto::from_job).collect()
    }
}

/// Counters shown at the top of the seeker dashboard.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SeekerTotals {
    /// DALAM PENGERJAAN or MENUNGGU PEMBAYARAN
    pub active_jobs: usize,
    /// Budgets of SELESAI jobs.
    pub total_spending: i64,
    pub total_spending_display: String,
}

impl SeekerTotals {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let active_jobs = jobs.iter().filter(|job| job.status.is_active()).count();
        let total_spending = jobs
            .iter()
            .filter(|job| job.status == JobStatus::Completed)
            .map(|job| job.budget)
            .sum();

        SeekerTotals {
            active_jobs,
            total_spending,
            total_spending_display: format_rupiah(total_spending),
        }
    }
}

pub fn greeting(prefix: &str, name: &str, fallback: &str) -> String {
    let name = name.trim();
    format!("{}, {}!", prefix, if name.is_empty() { fallback } else { name })
}

#[derive(Debug, Serialize)]
pub struct SeekerDashboardDto {
    pub greeting: String,
    #[serde(flatten)]
    pub totals: SeekerTotals,
    pub jobs: Vec<JobRowDto>,
}

#[derive(Debug, Serialize)]
pub struct SeekerJobsDto {
    #[serde(flatten)]
    pub totals: SeekerTotals,
    pub total_jobs: usize,
    pub jobs: Vec<JobRowDto>,
}

#[derive(Debug, Serialize)]
pub struct BidderDto {
    pub provider_id: Uuid,
    pub provider_name: String,
    pub provider_rating: f32,
    pub provider_avatar_url: Option<String>,
    pub provider_review_count: i32,
    pub message: Option<String>,
    pub status: BidStatus,
    pub status_label: String,
    pub created_at: DateTime<Utc>,
    pub created_at_display: String,
}

impl BidderDto {
    pub fn from_bid(bid: &Bid) -> Self {
        BidderDto {
            provider_id: bid.provider_id,
            provider_name: bid.snapshot.provider_name.clone(),
            provider_rating: bid.snapshot.provider_rating,
            provider_avatar_url: bid.snapshot.provider_avatar_url.clone(),
            provider_review_count: bid.snapshot.provider_review_count,
            message: bid.message.clone(),
            status: bid.status,
            status_label: bid.status.display().to_string(),
            created_at: bid.created_at,
            created_at_display: format_datetime_short_id(&bid.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobDetailDto {
    #[serde(flatten)]
    pub job: JobRowDto,
    pub description: String,
    pub bidders: Vec<BidderDto>,
}

#[derive(Debug, Serialize)]
pub struct ProviderDashboardDto {
    pub greeting: String,
    pub active_bids: i64,
    pub open_jobs: Vec<JobRowDto>,
}

#[derive(Debug, Serialize)]
pub struct ProviderBidRowDto {
    pub job_id: Uuid,
    pub job_title: String,
    pub status: BidStatus,
    pub status_label: String,
    pub created_at: DateTime<Utc>,
    pub created_at_display: String,
}

impl ProviderBidRowDto {
    pub fn from_bid(bid: &ProviderBid) -> Self {
        ProviderBidRowDto {
            job_id: bid.job_id,
            job_title: bid.job_title.clone(),
            status: bid.status,
            status_label: bid.status.display().to_string(),
            created_at: bid.created_at,
            created_at_display: format_datetime_short_id(&bid.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProviderBidsDto {
    pub bids: Vec<ProviderBidRowDto>,
}

#[derive(Debug, Serialize)]
pub struct PortfolioDto {
    pub items: Vec<PortfolioItem>,
}

#[derive(Debug, Serialize)]
pub struct ProviderProfileDto {
    pub profile: PublicProfileDto,
    pub portfolio: Vec<PortfolioItem>,
}

#[derive(Debug, Serialize)]
pub struct NotificationsDto {
    pub unread_count: i64,
    pub notifications: Vec<Notification>,
}

/// Minimal descriptor for the public auth pages.
#[derive(Debug, Serialize)]
pub struct PageDto {
    pub page: &'static str,
    pub title: &'static str,
    pub submit_to: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with(status: JobStatus, budget: i64) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: "Bersih-bersih rumah".to_string(),
            category: "Kebersihan".to_string(),
            description: "Rumah dua lantai".to_string(),
            budget,
            hirer_id: Uuid::new_v4(),
            hirer_name: "Andi".to_string(),
            status,
            provider_id: None,
            provider_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn seeker_totals_count_active_and_sum_completed() {
        let jobs = vec![
            job_with(JobStatus::Open, 100_000),
            job_with(JobStatus::InProgress, 200_000),
            job_with(JobStatus::AwaitingPayment, 300_000),
            job_with(JobStatus::Completed, 500_000),
            job_with(JobStatus::Completed, 250_000),
            job_with(JobStatus::Cancelled, 900_000),
        ];

        let totals = SeekerTotals::from_jobs(&jobs);
        assert_eq!(totals.active_jobs, 2);
        assert_eq!(totals.total_spending, 750_000);
        assert_eq!(totals.total_spending_display, "Rp 750.000");
    }

    #[test]
    fn empty_dashboard_totals() {
        let totals = SeekerTotals::from_jobs(&[]);
        assert_eq!(totals.active_jobs, 0);
        assert_eq!(totals.total_spending_display, "Rp 0");
    }

    #[test]
    fn greeting_falls_back_when_name_missing() {
        assert_eq!(greeting("Selamat Datang", "Rina", "Pengguna"), "Selamat Datang, Rina!");
        assert_eq!(greeting("Halo", "  ", "Penyedia Jasa"), "Halo, Penyedia Jasa!");
    }

    #[test]
    fn job_row_uses_display_labels() {
        let row = JobRowDto::from_job(&job_with(JobStatus::Open, 1_500_000));
        assert_eq!(row.status_label, "Mencari Penyedia");
        assert_eq!(row.budget_display, "Rp 1.500.000");
    }
}
