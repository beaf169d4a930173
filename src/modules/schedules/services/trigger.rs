use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::mailer::{ReportEmail, ReportMailer};
use crate::config::SchedulerConfig;
use crate::core::timezone::{format_generated_at, format_long_date};
use crate::core::{AppError, PipelineStage, Result};
use crate::modules::records::models::Labelled;
use crate::modules::reports::models::ReportConfiguration;
use crate::modules::reports::services::{ExportArtifact, ReportService};
use crate::modules::schedules::models::{Cadence, JobFailure, ScheduledReportJob};
use crate::modules::schedules::repositories::ScheduleRepository;

/// Outcome counts of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Jobs the repository returned as due
    pub due: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Returned as due but not active, left untouched
    pub skipped: usize,
}

/// Server-side realization of scheduled reports.
///
/// Each due job runs the report pipeline over a range relative to the firing time,
/// then mails the artifact. Whatever the outcome, `last_run` and `next_run` advance,
/// so a broken configuration fails once per period instead of on every sweep.
pub struct ScheduleTrigger {
    repo: Arc<dyn ScheduleRepository>,
    reports: Arc<ReportService>,
    mailer: Arc<dyn ReportMailer>,
    delivery_attempts: u32,
    retry_backoff: Duration,
    /// Held for a whole sweep so the runner and a manual sweep never overlap
    sweep_lock: Mutex<()>,
}

impl ScheduleTrigger {
    pub fn new(
        repo: Arc<dyn ScheduleRepository>,
        reports: Arc<ReportService>,
        mailer: Arc<dyn ReportMailer>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            repo,
            reports,
            mailer,
            delivery_attempts: config.delivery_attempts.max(1),
            retry_backoff: Duration::from_millis(config.delivery_backoff_ms),
            sweep_lock: Mutex::new(()),
        }
    }

    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepSummary> {
        let _sweeping = self.sweep_lock.lock().await;
        let due = self.repo.find_due(now).await?;
        let mut summary = SweepSummary {
            due: due.len(),
            ..Default::default()
        };

        for job in due {
            if !job.is_due(now) {
                warn!(job_id = %job.id, status = %job.status, "Skipping job that is not active");
                summary.skipped += 1;
                continue;
            }

            let failure = match self.realize(&job, now).await {
                Ok(()) => {
                    summary.delivered += 1;
                    None
                }
                Err(e) => {
                    summary.failed += 1;
                    let failure = JobFailure::from_error(&e, PipelineStage::Aggregate, now);
                    error!(
                        job_id = %job.id,
                        owner = %job.owner,
                        stage = %failure.stage,
                        error = %e,
                        "Scheduled report failed"
                    );
                    Some(failure)
                }
            };

            let next_run = job.recurrence.next_after(job.next_run, now);
            if let Err(e) = self.repo.record_run(&job.id, now, next_run, failure.as_ref()).await {
                error!(job_id = %job.id, error = %e, "Failed to record scheduled run");
            }
        }

        if summary.due > 0 {
            info!(
                due = summary.due,
                delivered = summary.delivered,
                failed = summary.failed,
                skipped = summary.skipped,
                "Schedule sweep finished"
            );
        }

        Ok(summary)
    }

    async fn realize(&self, job: &ScheduledReportJob, now: DateTime<Utc>) -> Result<()> {
        let config = job.configuration_at(now);
        info!(
            job_id = %job.id,
            start = %config.start,
            end = %config.end,
            "Running scheduled report"
        );

        let artifact = self
            .reports
            .export(&config, now, &CancellationToken::new())
            .await?;

        self.deliver(job, &config, &artifact, now).await
    }

    /// Bounded retry of the email hand-off
    async fn deliver(
        &self,
        job: &ScheduledReportJob,
        config: &ReportConfiguration,
        artifact: &ExportArtifact,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let email = ReportEmail {
            recipients: &job.recipients,
            subject: subject(job, config),
            body: body(config, now),
            artifact,
        };

        let mut last_error = AppError::delivery("no delivery attempted");
        for attempt in 1..=self.delivery_attempts {
            match self.mailer.send(&email).await {
                Ok(()) => {
                    info!(job_id = %job.id, attempt, "Scheduled report delivered");
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        job_id = %job.id,
                        attempt,
                        max_attempts = self.delivery_attempts,
                        error = %e,
                        "Report delivery attempt failed"
                    );
                    last_error = e;
                    if attempt < self.delivery_attempts && !self.retry_backoff.is_zero() {
                        tokio::time::sleep(self.retry_backoff).await;
                    }
                }
            }
        }

        Err(last_error.at_stage(PipelineStage::Email))
    }
}

fn subject(job: &ScheduledReportJob, config: &ReportConfiguration) -> String {
    let titles = config
        .unique_report_types()
        .iter()
        .map(|t| t.title())
        .collect::<Vec<_>>()
        .join(", ");
    let cadence = match job.recurrence.cadence {
        Cadence::Daily => "Daily",
        Cadence::Weekly => "Weekly",
        Cadence::Monthly => "Monthly",
    };
    format!("{} report: {}", cadence, titles)
}

fn body(config: &ReportConfiguration, now: DateTime<Utc>) -> String {
    let division = config
        .division
        .as_ref()
        .map_or_else(|| "All divisions".to_string(), |d| d.label().to_string());
    format!(
        "Period: {} to {}\nDivision: {}\nGenerated: {}\n\nThe report is attached.\n",
        format_long_date(config.start),
        format_long_date(config.end),
        division,
        format_generated_at(now)
    )
}
