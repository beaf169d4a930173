// HTTP contract of the reports, receipts, schedules and health endpoints.
//
// Runs the real route table against in-memory collaborators.

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{body::MessageBody, dev::ServiceResponse, http::StatusCode, test, web, App};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;

use campusdesk::config::SchedulerConfig;
use campusdesk::core::Currency;
use campusdesk::fees::ReceiptFormatter;
use campusdesk::middleware::{json_config, RequestId, REQUEST_ID_HEADER};
use campusdesk::modules;
use campusdesk::records::{Division, PaymentMode, RecordStore};
use campusdesk::reports::{ExportRegistry, ExportSerializer, ReportService};
use campusdesk::schedules::{ReportMailer, ScheduleRepository, ScheduleService, ScheduleTrigger};
use helpers::{transaction, InMemoryRecordStore, InMemoryScheduleRepository, RecordingMailer};

macro_rules! app {
    () => {{
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new(
            vec![
                transaction(
                    "t1",
                    "2025-01-05",
                    dec!(20000),
                    Some(Division::GamaAbacus),
                    Some(PaymentMode::Upi),
                ),
                transaction(
                    "t2",
                    "2025-01-20",
                    dec!(5000),
                    Some(Division::Tuition),
                    Some(PaymentMode::Cash),
                ),
            ],
            vec![],
            vec![],
        ));
        let repo: Arc<dyn ScheduleRepository> = Arc::new(InMemoryScheduleRepository::default());
        let mailer: Arc<dyn ReportMailer> = Arc::new(RecordingMailer::default());
        let reports = Arc::new(ReportService::new(
            store.clone(),
            ExportSerializer::new(Currency::INR, "Bright Minds Academy"),
        ));
        let trigger = Arc::new(ScheduleTrigger::new(
            repo.clone(),
            reports.clone(),
            mailer,
            &SchedulerConfig::default(),
        ));

        test::init_service(
            App::new()
                .wrap(RequestId)
                .app_data(json_config())
                .app_data(web::Data::from(store))
                .app_data(web::Data::from(reports))
                .app_data(web::Data::from(trigger))
                .app_data(web::Data::new(ReceiptFormatter::default()))
                .app_data(web::Data::new(ExportRegistry::new()))
                .app_data(web::Data::new(ScheduleService::new(repo)))
                .configure(modules::configure),
        )
        .await
    }};
}

async fn json_body<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    let bytes = test::read_body(resp).await;
    serde_json::from_slice(&bytes).unwrap()
}

fn report_request(format: &str) -> Value {
    json!({
        "start_date": "2025-01-01",
        "end_date": "2025-01-31",
        "division": "all",
        "report_types": ["revenue-trend", "division-breakdown"],
        "format": format
    })
}

fn schedule_request(format: &str) -> Value {
    json!({
        "owner": "admin@center.in",
        "recurrence": { "cadence": "weekly", "anchor_time": "07:00" },
        "report": {
            "report_types": ["payment_mode_distribution"],
            "format": format
        },
        "recipients": ["accounts@center.in"]
    })
}

#[actix_web::test]
async fn test_health_endpoint() {
    let app = app!();
    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "campusdesk");
}

#[actix_web::test]
async fn test_request_id_echoed() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header((REQUEST_ID_HEADER, "req-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.headers().get(REQUEST_ID_HEADER).unwrap(), "req-123");
}

#[actix_web::test]
async fn test_preview_returns_sections_and_charts() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/reports/preview")
        .set_json(report_request("pdf"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["report"]["sections"].as_array().unwrap().len(), 2);
    assert_eq!(body["report"]["sections"][0]["report_type"], "revenue_trend");
    assert!(!body["charts"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_export_returns_attachment() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/reports/export")
        .set_json(report_request("csv"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        disposition,
        "attachment; filename=\"revenue-trend+division-breakdown_2025-01-01_2025-01-31.csv\""
    );

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("20000.00"));
}

#[actix_web::test]
async fn test_export_unsupported_format_is_unprocessable() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/reports/export")
        .set_json(report_request("xml"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_inverted_range_is_unprocessable() {
    let app = app!();
    let mut request = report_request("csv");
    request["start_date"] = json!("2025-02-01");
    let req = test::TestRequest::post().uri("/reports/export").set_json(request).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_malformed_date_is_bad_request() {
    let app = app!();
    let mut request = report_request("csv");
    request["end_date"] = json!("31/01/2025");
    let req = test::TestRequest::post().uri("/reports/export").set_json(request).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_cancel_unknown_export_not_found() {
    let app = app!();
    let req = test::TestRequest::delete().uri("/reports/export/exp-404").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_receipt_rendered_for_stored_transaction() {
    let app = app!();
    let req = test::TestRequest::get().uri("/fees/t1/receipt").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("RCP-t1"));
    assert!(html.contains("₹20,000.00"));

    let req = test::TestRequest::get().uri("/fees/nope/receipt").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_schedule_lifecycle_over_http() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/schedules")
        .set_json(schedule_request("excel"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let job = json_body(resp).await;
    let id = job["id"].as_str().unwrap().to_string();
    assert_eq!(job["status"], "active");
    assert_eq!(job["report"]["format"], "excel");

    let req = test::TestRequest::post().uri(&format!("/schedules/{}/pause", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "paused");

    let req = test::TestRequest::post().uri(&format!("/schedules/{}/pause", id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get().uri("/schedules?owner=admin@center.in").to_request();
    let list = json_body(test::call_service(&app, req).await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete().uri(&format!("/schedules/{}", id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&format!("/schedules/{}", id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_schedule_with_unsupported_format_is_unprocessable() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/schedules")
        .set_json(schedule_request("xml"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_manual_sweep_with_nothing_due() {
    let app = app!();
    let req = test::TestRequest::post().uri("/schedules/sweep").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let summary = json_body(resp).await;
    assert_eq!(summary["due"], 0);
}
