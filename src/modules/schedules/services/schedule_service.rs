use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::schedules::models::{JobStatus, ScheduleSettings, ScheduledReportJob};
use crate::modules::schedules::repositories::ScheduleRepository;

/// Dashboard-side lifecycle of scheduled reports: create, edit, pause, resume, delete
pub struct ScheduleService {
    repo: Arc<dyn ScheduleRepository>,
}

impl ScheduleService {
    pub fn new(repo: Arc<dyn ScheduleRepository>) -> Self {
        Self { repo }
    }

    /// New jobs start Active with the first run at the next anchor time
    pub async fn create(
        &self,
        settings: ScheduleSettings,
        now: DateTime<Utc>,
    ) -> Result<ScheduledReportJob> {
        settings.validate()?;

        let job = ScheduledReportJob::new(Uuid::new_v4().to_string(), settings, now);
        self.repo.create(&job).await?;

        info!(
            job_id = %job.id,
            owner = %job.owner,
            cadence = %job.recurrence.cadence,
            next_run = %job.next_run,
            "Scheduled report created"
        );

        Ok(job)
    }

    pub async fn get(&self, id: &str) -> Result<ScheduledReportJob> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Schedule '{}' not found", id)))
    }

    pub async fn list(&self, owner: Option<&str>) -> Result<Vec<ScheduledReportJob>> {
        self.repo.list(owner).await
    }

    /// Replace the dashboard-owned settings. Run bookkeeping is left to the trigger.
    ///
    /// A monthly recurrence without an explicit day keeps the day of the pending run.
    pub async fn update(
        &self,
        id: &str,
        mut settings: ScheduleSettings,
        now: DateTime<Utc>,
    ) -> Result<ScheduledReportJob> {
        settings.validate()?;

        let current = self.get(id).await?;
        settings.recurrence = settings.recurrence.pinned_to(current.next_run);

        if !self.repo.update_settings(id, &settings, now).await? {
            return Err(AppError::not_found(format!("Schedule '{}' not found", id)));
        }

        info!(job_id = %id, "Scheduled report updated");
        self.get(id).await
    }

    pub async fn pause(&self, id: &str, now: DateTime<Utc>) -> Result<ScheduledReportJob> {
        self.transition(id, JobStatus::Active, JobStatus::Paused, now).await
    }

    pub async fn resume(&self, id: &str, now: DateTime<Utc>) -> Result<ScheduledReportJob> {
        self.transition(id, JobStatus::Paused, JobStatus::Active, now).await
    }

    async fn transition(
        &self,
        id: &str,
        from: JobStatus,
        to: JobStatus,
        now: DateTime<Utc>,
    ) -> Result<ScheduledReportJob> {
        let mut job = self.get(id).await?;
        if job.status != from {
            return Err(AppError::Conflict(format!(
                "Schedule '{}' is {}, cannot switch to {}",
                id, job.status, to
            )));
        }

        if !self.repo.set_status(id, to, now).await? {
            return Err(AppError::not_found(format!("Schedule '{}' not found", id)));
        }

        info!(job_id = %id, from = %from, to = %to, "Scheduled report status changed");

        job.status = to;
        job.updated_at = now;
        Ok(job)
    }

    /// Removes the job for good
    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found(format!("Schedule '{}' not found", id)));
        }

        info!(job_id = %id, "Scheduled report deleted");
        Ok(())
    }
}
