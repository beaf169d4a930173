use chrono::{DateTime, NaiveDate, Utc};
use lettre::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::recurrence::Recurrence;
use crate::core::timezone::home_date;
use crate::core::{AppError, PipelineStage, Result};
use crate::modules::records::models::Division;
use crate::modules::reports::models::{ExportFormat, ReportConfiguration, ReportType};

/// Lifecycle state of a scheduled report. Deleted jobs are removed, not flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Paused,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Active => write!(f, "active"),
            JobStatus::Paused => write!(f, "paused"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(JobStatus::Active),
            "paused" => Ok(JobStatus::Paused),
            _ => Err(AppError::validation(format!("Invalid job status: {}", s))),
        }
    }
}

/// Why the latest firing did not deliver; shown to the owner on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFailure {
    pub stage: PipelineStage,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

impl JobFailure {
    pub fn from_error(
        error: &AppError,
        fallback: PipelineStage,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            stage: error.stage().unwrap_or(fallback),
            message: error.to_string(),
            occurred_at,
        }
    }
}

/// The report a schedule produces, minus the date range (recomputed at every firing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTemplate {
    #[serde(default)]
    pub division: Option<Division>,
    pub report_types: Vec<ReportType>,
    pub format: ExportFormat,
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
}

fn default_top_limit() -> usize {
    10
}

impl ReportTemplate {
    pub fn for_range(&self, start: NaiveDate, end: NaiveDate) -> ReportConfiguration {
        ReportConfiguration {
            start,
            end,
            division: self.division.clone(),
            report_types: self.report_types.clone(),
            format: self.format,
            top_limit: self.top_limit,
        }
    }
}

/// Fields an admin edits from the dashboard. The trigger never writes these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    pub owner: String,
    pub recurrence: Recurrence,
    pub report: ReportTemplate,
    pub recipients: Vec<String>,
}

impl ScheduleSettings {
    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            return Err(AppError::validation("owner is required"));
        }

        if self.recipients.is_empty() {
            return Err(AppError::validation("at least one recipient is required"));
        }

        for recipient in &self.recipients {
            recipient.trim().parse::<Address>().map_err(|_| {
                AppError::validation(format!("'{}' is not a valid email address", recipient))
            })?;
        }

        if self.report.report_types.is_empty() {
            return Err(AppError::invalid_config("at least one report type is required"));
        }

        if let Some(day) = self.recurrence.day_of_month {
            if !(1..=31).contains(&day) {
                return Err(AppError::invalid_config("day_of_month must be between 1 and 31"));
            }
        }

        if self.report.top_limit == 0 {
            return Err(AppError::invalid_config("top_limit must be greater than 0"));
        }

        Ok(())
    }
}

/// A persisted recurring report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledReportJob {
    pub id: String,
    pub owner: String,
    pub recurrence: Recurrence,
    pub report: ReportTemplate,
    pub recipients: Vec<String>,
    pub status: JobStatus,
    /// Written by the trigger only
    pub last_run: Option<DateTime<Utc>>,
    /// Written by the trigger only (and once at creation)
    pub next_run: DateTime<Utc>,
    /// Written by the trigger only
    pub last_failure: Option<JobFailure>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduledReportJob {
    pub fn new(id: impl Into<String>, settings: ScheduleSettings, now: DateTime<Utc>) -> Self {
        let next_run = settings.recurrence.first_run_after(now);
        Self {
            id: id.into(),
            owner: settings.owner,
            next_run,
            recurrence: settings.recurrence.pinned_to(next_run),
            report: settings.report,
            recipients: settings.recipients,
            status: JobStatus::Active,
            last_run: None,
            last_failure: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == JobStatus::Active
    }

    /// Active and scheduled at or before `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.next_run <= now
    }

    /// Report configuration for a firing at `fired_at`, range relative to that day
    pub fn configuration_at(&self, fired_at: DateTime<Utc>) -> ReportConfiguration {
        let (start, end) = self.recurrence.window(home_date(fired_at));
        self.report.for_range(start, end)
    }

    pub fn settings(&self) -> ScheduleSettings {
        ScheduleSettings {
            owner: self.owner.clone(),
            recurrence: self.recurrence,
            report: self.report.clone(),
            recipients: self.recipients.clone(),
        }
    }
}
