use actix_web::{http::header, web, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::core::{AppError, Result};
use crate::modules::records::models::Division;
use crate::modules::reports::models::{
    ChartContext, ChartSpec, ExportFormat, ReportConfiguration, ReportResult, ReportType,
};
use crate::modules::reports::services::{ExportRegistry, ReportService};

/// Report filters as posted by the dashboard
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    /// Inclusive, YYYY-MM-DD
    pub start_date: String,
    /// Inclusive, YYYY-MM-DD
    pub end_date: String,
    /// Division code; empty or "all" means every division
    #[serde(default)]
    pub division: Option<String>,
    pub report_types: Vec<String>,
    /// pdf, csv or excel; required for exports
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub top_limit: Option<usize>,
    /// Client-chosen id, lets the dashboard cancel the export while it runs
    #[serde(default)]
    pub export_id: Option<String>,
}

impl ReportRequest {
    fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
            AppError::validation(format!(
                "Invalid {} format: '{}'. Expected YYYY-MM-DD",
                field, value
            ))
        })
    }

    pub fn to_configuration(
        &self,
        default_format: Option<ExportFormat>,
    ) -> Result<ReportConfiguration> {
        let start = Self::parse_date("start_date", &self.start_date)?;
        let end = Self::parse_date("end_date", &self.end_date)?;

        let report_types = self
            .report_types
            .iter()
            .map(|t| t.parse::<ReportType>())
            .collect::<Result<Vec<_>>>()?;

        let format = match (self.format.as_deref(), default_format) {
            (Some(raw), _) => raw.parse::<ExportFormat>()?,
            (None, Some(format)) => format,
            (None, None) => return Err(AppError::invalid_config("format is required")),
        };

        let mut config = ReportConfiguration::new(start, end, report_types, format);
        config.division = self
            .division
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("all"))
            .map(Division::from);
        if let Some(limit) = self.top_limit {
            config.top_limit = limit;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
pub struct ReportPreviewResponse {
    pub report: ReportResult,
    pub charts: Vec<ChartSpec>,
}

/// POST /reports/preview
///
/// Aggregates the filters into report sections plus chart data for the dashboard.
pub async fn preview_report(
    service: web::Data<ReportService>,
    body: web::Json<ReportRequest>,
) -> Result<HttpResponse> {
    let config = body.to_configuration(Some(ExportFormat::Print))?;
    let report = service.generate(&config, Utc::now()).await?;

    let mut charts = ChartContext::new();
    charts.render(&report);
    let charts = charts.charts().cloned().collect();

    Ok(HttpResponse::Ok().json(ReportPreviewResponse { report, charts }))
}

/// POST /reports/export
///
/// Runs the full pipeline and returns the artifact as a download.
pub async fn export_report(
    service: web::Data<ReportService>,
    registry: web::Data<ExportRegistry>,
    body: web::Json<ReportRequest>,
) -> Result<HttpResponse> {
    let config = body.to_configuration(None)?;

    let token = match body.export_id.as_deref() {
        Some(id) => registry.register(id).await,
        None => CancellationToken::new(),
    };

    let outcome = service.export(&config, Utc::now(), &token).await;
    if let Some(id) = body.export_id.as_deref() {
        registry.finish(id).await;
    }

    let artifact = outcome.map_err(|e| {
        if !matches!(e, AppError::Cancelled) {
            error!(error = %e, stage = ?e.stage(), "Report export failed");
        }
        e
    })?;

    Ok(HttpResponse::Ok()
        .content_type(artifact.mime_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.filename),
        ))
        .body(artifact.bytes))
}

/// DELETE /reports/export/{export_id}
pub async fn cancel_export(
    registry: web::Data<ExportRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let export_id = path.into_inner();
    if !registry.cancel(&export_id).await {
        return Err(AppError::not_found(format!("Export '{}' is not running", export_id)));
    }

    info!(export_id = %export_id, "Export cancellation requested");
    Ok(HttpResponse::Accepted().finish())
}

/// Configure routes for reports module
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/preview", web::post().to(preview_report))
            .route("/export", web::post().to(export_report))
            .route("/export/{export_id}", web::delete().to(cancel_export)),
    );
}
