// Report pipeline against an in-memory record store: fetch, aggregate, export

#[path = "../helpers/mod.rs"]
mod helpers;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use campusdesk::core::{AppError, Currency, PipelineStage};
use campusdesk::records::models::StudentStatus;
use campusdesk::records::{Division, PaymentMode};
use campusdesk::reports::{
    ExportFormat, ExportSerializer, ReportConfiguration, ReportService, ReportType,
};
use helpers::{course, student, transaction, InMemoryRecordStore};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn service(store: Arc<InMemoryRecordStore>) -> ReportService {
    ReportService::new(store, ExportSerializer::new(Currency::INR, "Bright Minds Academy"))
}

fn seeded_store() -> Arc<InMemoryRecordStore> {
    Arc::new(InMemoryRecordStore::new(
        vec![
            transaction(
                "t1",
                "2025-01-05",
                dec!(1500),
                Some(Division::Tuition),
                Some(PaymentMode::Cash),
            ),
            transaction(
                "t2",
                "2025-01-12",
                dec!(2500),
                Some(Division::GamaAbacus),
                Some(PaymentMode::Upi),
            ),
            transaction(
                "t3",
                "2025-02-03",
                dec!(9000),
                Some(Division::GamaAbacus),
                Some(PaymentMode::Upi),
            ),
        ],
        vec![student("S-2", "C-1", StudentStatus::Dropped)],
        vec![course("C-1", "Abacus Level 1", &["S-1", "S-2"])],
    ))
}

fn january(report_types: Vec<ReportType>, format: ExportFormat) -> ReportConfiguration {
    ReportConfiguration::new(d(2025, 1, 1), d(2025, 1, 31), report_types, format)
}

#[tokio::test]
async fn test_generate_reads_store_and_aggregates() {
    let store = seeded_store();
    let result = service(store.clone())
        .generate(
            &january(
                vec![ReportType::RevenueTrend, ReportType::EnrollmentVsDropoff],
                ExportFormat::Print,
            ),
            Utc::now(),
        )
        .await
        .unwrap();

    assert_eq!(result.revenue_trend().unwrap().total, dec!(4000));
    let enrollment = result.enrollment_vs_dropoff().unwrap();
    assert_eq!(enrollment.rows[0].enrolled, 1);
    assert_eq!(enrollment.rows[0].dropped, 1);
}

#[tokio::test]
async fn test_legacy_dropout_statuses_count_as_dropped() {
    let store = Arc::new(
        InMemoryRecordStore::new(
            vec![],
            vec![
                student("S-1", "C-1", StudentStatus::Active),
                student("S-2", "C-1", StudentStatus::Active),
                student("S-3", "C-1", StudentStatus::Active),
            ],
            vec![course("C-1", "Abacus Level 1", &["S-1", "S-2", "S-3", "S-4"])],
        )
        .with_stored_status("S-2", "inactive")
        .with_stored_status("S-3", "Dropout"),
    );

    let result = service(store)
        .generate(&january(vec![ReportType::EnrollmentVsDropoff], ExportFormat::Csv), Utc::now())
        .await
        .unwrap();

    let row = &result.enrollment_vs_dropoff().unwrap().rows[0];
    assert_eq!(row.dropped, 2);
    assert_eq!(row.enrolled, 2);
}

#[tokio::test]
async fn test_invalid_range_never_touches_store() {
    let store = seeded_store();
    let config = ReportConfiguration::new(
        d(2025, 2, 1),
        d(2025, 1, 1),
        vec![ReportType::RevenueTrend],
        ExportFormat::Csv,
    );

    let err = service(store.clone()).generate(&config, Utc::now()).await.unwrap_err();
    assert!(err.is_invalid_configuration());

    let err = service(store.clone())
        .export(&config, Utc::now(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.is_invalid_configuration());

    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_only_needed_collections_fetched() {
    let store = seeded_store();
    service(store.clone())
        .generate(
            &january(vec![ReportType::PaymentModeDistribution], ExportFormat::Csv),
            Utc::now(),
        )
        .await
        .unwrap();

    // one short page of transactions; students and courses are not read
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn test_store_failure_attributed_to_fetch() {
    let store = Arc::new(InMemoryRecordStore::unreachable());
    let err = service(store)
        .export(
            &january(vec![ReportType::RevenueTrend], ExportFormat::Csv),
            Utc::now(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Fetch));
}

#[tokio::test]
async fn test_export_produces_named_artifact() {
    let generated_at = Utc.with_ymd_and_hms(2025, 2, 1, 4, 30, 0).unwrap();
    let artifact = service(seeded_store())
        .export(
            &january(vec![ReportType::DivisionBreakdown], ExportFormat::Spreadsheet)
                .with_division(Division::GamaAbacus),
            generated_at,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(artifact.filename, "division-breakdown_2025-01-01_2025-01-31_gama.xls");
    assert_eq!(artifact.mime_type, "application/vnd.ms-excel");
    assert!(!artifact.is_empty());
}

#[tokio::test]
async fn test_cancelled_export_returns_no_artifact() {
    let store = seeded_store();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = service(store.clone())
        .export(&january(vec![ReportType::RevenueTrend], ExportFormat::Csv), Utc::now(), &cancel)
        .await;

    assert!(matches!(result, Err(AppError::Cancelled)));
    assert_eq!(store.calls(), 0);
}
