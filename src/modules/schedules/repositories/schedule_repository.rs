use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, MySqlPool};

use crate::core::{AppError, Result};
use crate::modules::schedules::models::{
    JobFailure, JobStatus, Recurrence, ReportTemplate, ScheduleSettings, ScheduledReportJob,
};

/// Persistence of scheduled report jobs.
///
/// Two writers share the collection. The dashboard owns the settings and the status;
/// the trigger owns `last_run`, `next_run` and `last_failure`. Each method writes only
/// its owner's columns, so neither side overwrites the other.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, job: &ScheduledReportJob) -> Result<()>;

    async fn find(&self, id: &str) -> Result<Option<ScheduledReportJob>>;

    /// All jobs, optionally for one owner, ordered by creation
    async fn list(&self, owner: Option<&str>) -> Result<Vec<ScheduledReportJob>>;

    /// Dashboard-owned fields. Returns false when the job does not exist.
    async fn update_settings(
        &self,
        id: &str,
        settings: &ScheduleSettings,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;

    async fn set_status(
        &self,
        id: &str,
        status: JobStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;

    async fn delete(&self, id: &str) -> Result<bool>;

    /// Active jobs with `next_run <= now`, earliest first
    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledReportJob>>;

    /// Trigger-owned fields after a firing; `failure = None` clears the last failure
    async fn record_run(
        &self,
        id: &str,
        last_run: DateTime<Utc>,
        next_run: DateTime<Utc>,
        failure: Option<&JobFailure>,
    ) -> Result<()>;
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: String,
    owner: String,
    recurrence: Json<Recurrence>,
    report: Json<ReportTemplate>,
    recipients: Json<Vec<String>>,
    status: String,
    last_run: Option<DateTime<Utc>>,
    next_run: DateTime<Utc>,
    last_failure: Option<Json<JobFailure>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for ScheduledReportJob {
    type Error = AppError;

    fn try_from(row: JobRow) -> Result<Self> {
        Ok(Self {
            status: row.status.parse()?,
            id: row.id,
            owner: row.owner,
            recurrence: row.recurrence.0,
            report: row.report.0,
            recipients: row.recipients.0,
            last_run: row.last_run,
            next_run: row.next_run,
            last_failure: row.last_failure.map(|j| j.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const JOB_COLUMNS: &str = r#"
    SELECT
        id, owner, recurrence, report, recipients, status,
        last_run, next_run, last_failure, created_at, updated_at
    FROM scheduled_report_jobs
"#;

/// MySQL-backed job store; list-valued fields live in JSON columns
pub struct MySqlScheduleRepository {
    pool: MySqlPool,
}

impl MySqlScheduleRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn rows_to_jobs(rows: Vec<JobRow>) -> Result<Vec<ScheduledReportJob>> {
        rows.into_iter().map(ScheduledReportJob::try_from).collect()
    }
}

#[async_trait]
impl ScheduleRepository for MySqlScheduleRepository {
    async fn create(&self, job: &ScheduledReportJob) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scheduled_report_jobs (
                id, owner, recurrence, report, recipients, status,
                last_run, next_run, last_failure, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.owner)
        .bind(Json(&job.recurrence))
        .bind(Json(&job.report))
        .bind(Json(&job.recipients))
        .bind(job.status.to_string())
        .bind(job.last_run)
        .bind(job.next_run)
        .bind(job.last_failure.as_ref().map(Json))
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("Schedule '{}' already exists", job.id));
                }
            }
            AppError::Internal(format!("Failed to create schedule: {}", e))
        })?;

        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<ScheduledReportJob>> {
        let sql = format!("{} WHERE id = ?", JOB_COLUMNS);
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ScheduledReportJob::try_from).transpose()
    }

    async fn list(&self, owner: Option<&str>) -> Result<Vec<ScheduledReportJob>> {
        let rows = match owner {
            Some(owner) => {
                let sql = format!("{} WHERE owner = ? ORDER BY created_at, id", JOB_COLUMNS);
                sqlx::query_as::<_, JobRow>(&sql)
                    .bind(owner)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{} ORDER BY created_at, id", JOB_COLUMNS);
                sqlx::query_as::<_, JobRow>(&sql).fetch_all(&self.pool).await?
            }
        };

        Self::rows_to_jobs(rows)
    }

    async fn update_settings(
        &self,
        id: &str,
        settings: &ScheduleSettings,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE scheduled_report_jobs
            SET owner = ?, recurrence = ?, report = ?, recipients = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&settings.owner)
        .bind(Json(&settings.recurrence))
        .bind(Json(&settings.report))
        .bind(Json(&settings.recipients))
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_status(
        &self,
        id: &str,
        status: JobStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE scheduled_report_jobs SET status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(status.to_string())
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM scheduled_report_jobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledReportJob>> {
        let sql = format!(
            "{} WHERE status = ? AND next_run <= ? ORDER BY next_run, id",
            JOB_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(JobStatus::Active.to_string())
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        Self::rows_to_jobs(rows)
    }

    async fn record_run(
        &self,
        id: &str,
        last_run: DateTime<Utc>,
        next_run: DateTime<Utc>,
        failure: Option<&JobFailure>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE scheduled_report_jobs
            SET last_run = ?, next_run = ?, last_failure = ?
            WHERE id = ?
            "#,
        )
        .bind(last_run)
        .bind(next_run)
        .bind(failure.map(Json))
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
