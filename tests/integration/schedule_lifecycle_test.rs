// Dashboard-side schedule lifecycle: create, edit, pause, resume, delete

#[path = "../helpers/mod.rs"]
mod helpers;

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use campusdesk::core::AppError;
use campusdesk::reports::{ExportFormat, ReportType};
use campusdesk::schedules::{Cadence, JobStatus, ScheduleRepository, ScheduleService};
use helpers::{settings, InMemoryScheduleRepository};

fn utc(y: i32, m: u32, day: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, day, h, min, 0).unwrap()
}

fn service() -> (ScheduleService, Arc<InMemoryScheduleRepository>) {
    let repo = Arc::new(InMemoryScheduleRepository::default());
    (ScheduleService::new(repo.clone()), repo)
}

#[tokio::test]
async fn test_create_starts_active_with_first_run_ahead() {
    let (service, _) = service();
    let now = utc(2025, 3, 10, 12, 0);

    let job = service
        .create(settings(Cadence::Daily, vec![ReportType::RevenueTrend], ExportFormat::Csv), now)
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Active);
    assert_eq!(job.next_run, utc(2025, 3, 11, 1, 30));
    assert!(job.last_run.is_none());
    assert_eq!(service.get(&job.id).await.unwrap(), job);
}

#[tokio::test]
async fn test_monthly_job_pins_creation_day() {
    let (service, _) = service();
    // 17:30 IST on 30 January, so the first run is 31 January
    let now = utc(2025, 1, 30, 12, 0);
    let job = service
        .create(settings(Cadence::Monthly, vec![ReportType::TopCourses], ExportFormat::Csv), now)
        .await
        .unwrap();

    assert_eq!(job.next_run, utc(2025, 1, 31, 1, 30));
    assert_eq!(job.recurrence.day_of_month, Some(31));

    let feb = job.recurrence.next_after(job.next_run, job.next_run);
    let mar = job.recurrence.next_after(feb, feb);
    assert_eq!(feb, utc(2025, 2, 28, 1, 30));
    assert_eq!(mar, utc(2025, 3, 31, 1, 30));

    let mut edited = job.settings();
    edited.recurrence.day_of_month = None;
    let updated = service.update(&job.id, edited, now).await.unwrap();
    assert_eq!(updated.recurrence.day_of_month, Some(31));
}

#[tokio::test]
async fn test_create_rejects_bad_settings() {
    let (service, repo) = service();
    let now = utc(2025, 3, 10, 12, 0);

    let mut no_types = settings(Cadence::Daily, vec![], ExportFormat::Csv);
    let err = service.create(no_types.clone(), now).await.unwrap_err();
    assert!(err.is_invalid_configuration());

    no_types.report.report_types = vec![ReportType::TopCourses];
    no_types.recipients = vec!["not-an-address".to_string()];
    let err = service.create(no_types, now).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut bad_day = settings(Cadence::Monthly, vec![ReportType::TopCourses], ExportFormat::Csv);
    bad_day.recurrence.day_of_month = Some(32);
    let err = service.create(bad_day, now).await.unwrap_err();
    assert!(err.is_invalid_configuration());

    assert!(repo.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pause_and_resume() {
    let (service, _) = service();
    let now = utc(2025, 3, 10, 12, 0);
    let job = service
        .create(
            settings(Cadence::Weekly, vec![ReportType::DivisionBreakdown], ExportFormat::Print),
            now,
        )
        .await
        .unwrap();

    let paused = service.pause(&job.id, now).await.unwrap();
    assert_eq!(paused.status, JobStatus::Paused);
    assert!(!paused.is_due(utc(2025, 4, 1, 0, 0)));

    let err = service.pause(&job.id, now).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let resumed = service.resume(&job.id, now).await.unwrap();
    assert_eq!(resumed.status, JobStatus::Active);

    let err = service.resume(&job.id, now).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_update_keeps_run_bookkeeping() {
    let (service, repo) = service();
    let created = utc(2025, 3, 10, 12, 0);
    let job = service
        .create(
            settings(Cadence::Weekly, vec![ReportType::RevenueTrend], ExportFormat::Csv),
            created,
        )
        .await
        .unwrap();
    let last_run = utc(2025, 3, 11, 1, 30);
    let next_run = utc(2025, 3, 18, 1, 30);
    repo.record_run(&job.id, last_run, next_run, None).await.unwrap();

    let mut edited = job.settings();
    edited.recipients = vec!["principal@center.in".to_string(), "accounts@center.in".to_string()];
    edited.report.format = ExportFormat::Spreadsheet;
    let edited_at = utc(2025, 3, 12, 9, 0);

    let updated = service.update(&job.id, edited, edited_at).await.unwrap();

    assert_eq!(updated.recipients.len(), 2);
    assert_eq!(updated.report.format, ExportFormat::Spreadsheet);
    assert_eq!(updated.last_run, Some(last_run));
    assert_eq!(updated.next_run, next_run);
    assert_eq!(updated.updated_at, edited_at);
}

#[tokio::test]
async fn test_list_filters_by_owner() {
    let (service, _) = service();
    let now = utc(2025, 3, 10, 12, 0);
    service
        .create(settings(Cadence::Daily, vec![ReportType::RevenueTrend], ExportFormat::Csv), now)
        .await
        .unwrap();
    let mut other = settings(Cadence::Monthly, vec![ReportType::TopCourses], ExportFormat::Csv);
    other.owner = "director@center.in".to_string();
    service.create(other, now).await.unwrap();

    assert_eq!(service.list(None).await.unwrap().len(), 2);
    let mine = service.list(Some("director@center.in")).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].recurrence.cadence, Cadence::Monthly);
}

#[tokio::test]
async fn test_delete_removes_job() {
    let (service, _) = service();
    let job = service
        .create(
            settings(Cadence::Daily, vec![ReportType::RevenueTrend], ExportFormat::Csv),
            utc(2025, 3, 10, 12, 0),
        )
        .await
        .unwrap();

    service.delete(&job.id).await.unwrap();

    assert!(matches!(service.get(&job.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(service.delete(&job.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_unknown_job_not_found() {
    let (service, _) = service();
    let now = utc(2025, 3, 10, 12, 0);

    assert!(matches!(service.pause("missing", now).await, Err(AppError::NotFound(_))));
    let edit = settings(Cadence::Daily, vec![ReportType::RevenueTrend], ExportFormat::Csv);
    assert!(matches!(service.update("missing", edit, now).await, Err(AppError::NotFound(_))));
}
