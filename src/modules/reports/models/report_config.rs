use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{AppError, Result};
use crate::modules::records::models::Division;

/// Aggregation views the dashboard offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    #[serde(alias = "revenue-trend")]
    RevenueTrend,
    #[serde(alias = "division-breakdown")]
    DivisionBreakdown,
    #[serde(alias = "enrollment-vs-dropoff")]
    EnrollmentVsDropoff,
    #[serde(alias = "payment-mode-distribution")]
    PaymentModeDistribution,
    #[serde(alias = "top-courses")]
    TopCourses,
}

impl ReportType {
    pub const ALL: [ReportType; 5] = [
        ReportType::RevenueTrend,
        ReportType::DivisionBreakdown,
        ReportType::EnrollmentVsDropoff,
        ReportType::PaymentModeDistribution,
        ReportType::TopCourses,
    ];

    /// Stable machine name used in tabular exports
    pub fn key(&self) -> &'static str {
        match self {
            ReportType::RevenueTrend => "revenue_trend",
            ReportType::DivisionBreakdown => "division_breakdown",
            ReportType::EnrollmentVsDropoff => "enrollment_vs_dropoff",
            ReportType::PaymentModeDistribution => "payment_mode_distribution",
            ReportType::TopCourses => "top_courses",
        }
    }

    /// Filename fragment
    pub fn slug(&self) -> &'static str {
        match self {
            ReportType::RevenueTrend => "revenue-trend",
            ReportType::DivisionBreakdown => "division-breakdown",
            ReportType::EnrollmentVsDropoff => "enrollment-vs-dropoff",
            ReportType::PaymentModeDistribution => "payment-mode-distribution",
            ReportType::TopCourses => "top-courses",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportType::RevenueTrend => "Revenue Trend",
            ReportType::DivisionBreakdown => "Revenue by Division",
            ReportType::EnrollmentVsDropoff => "Enrollment vs Dropoff",
            ReportType::PaymentModeDistribution => "Payment Mode Distribution",
            ReportType::TopCourses => "Top Courses by Revenue",
        }
    }

    /// Whether the aggregation needs course catalog records
    pub fn needs_courses(&self) -> bool {
        matches!(self, ReportType::EnrollmentVsDropoff | ReportType::TopCourses)
    }

    /// Whether the aggregation needs student records
    pub fn needs_students(&self) -> bool {
        matches!(self, ReportType::EnrollmentVsDropoff)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ReportType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        ReportType::ALL
            .into_iter()
            .find(|t| t.key() == normalized)
            .ok_or_else(|| AppError::invalid_config(format!("Unknown report type '{}'", s)))
    }
}

/// Downloadable artifact formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExportFormat {
    /// Self-contained print-ready HTML, handed to the browser's print/PDF path
    Print,
    /// Comma-separated rows
    Csv,
    /// SpreadsheetML workbook that spreadsheet tools open natively
    Spreadsheet,
}

impl ExportFormat {
    pub fn code(&self) -> &'static str {
        match self {
            ExportFormat::Print => "pdf",
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "excel",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Print => "text/html; charset=utf-8",
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Spreadsheet => "application/vnd.ms-excel",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Print => "html",
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "xls",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pdf" | "print" | "html" => Ok(ExportFormat::Print),
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" | "xls" | "spreadsheet" => Ok(ExportFormat::Spreadsheet),
            other => Err(AppError::invalid_config(format!(
                "Unsupported export format '{}'; expected one of pdf, csv, excel",
                other
            ))),
        }
    }
}

impl TryFrom<String> for ExportFormat {
    type Error = AppError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ExportFormat> for String {
    fn from(format: ExportFormat) -> Self {
        format.code().to_string()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Bucket width of the revenue trend series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// ≤31 days daily, ≤180 days weekly, monthly beyond
    pub fn for_span(days: i64) -> Self {
        if days <= 31 {
            Granularity::Daily
        } else if days <= 180 {
            Granularity::Weekly
        } else {
            Granularity::Monthly
        }
    }
}

fn default_top_limit() -> usize {
    10
}

/// Parameters of one aggregation run. Built per dashboard interaction or per scheduled
/// firing; only the schedule that produces it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfiguration {
    /// Inclusive
    pub start: NaiveDate,
    /// Inclusive
    pub end: NaiveDate,
    #[serde(default)]
    pub division: Option<Division>,
    pub report_types: Vec<ReportType>,
    pub format: ExportFormat,
    /// Row cap for the top-courses ranking
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
}

impl ReportConfiguration {
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        report_types: Vec<ReportType>,
        format: ExportFormat,
    ) -> Self {
        Self {
            start,
            end,
            division: None,
            report_types,
            format,
            top_limit: default_top_limit(),
        }
    }

    pub fn with_division(mut self, division: Division) -> Self {
        self.division = Some(division);
        self
    }

    /// Same configuration over another date range
    pub fn with_range(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            ..self.clone()
        }
    }

    /// Inclusive day count of the range
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn granularity(&self) -> Granularity {
        Granularity::for_span(self.span_days())
    }

    /// Reject configurations that cannot produce a report. Runs before any record access.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(AppError::invalid_config(format!(
                "start date ({}) must be on or before end date ({})",
                self.start, self.end
            )));
        }

        if self.report_types.is_empty() {
            return Err(AppError::invalid_config("at least one report type is required"));
        }

        if self.top_limit == 0 {
            return Err(AppError::invalid_config("top_limit must be greater than 0"));
        }

        Ok(())
    }

    /// Requested report types, duplicates removed, request order kept
    pub fn unique_report_types(&self) -> Vec<ReportType> {
        let mut seen = Vec::with_capacity(self.report_types.len());
        for report_type in &self.report_types {
            if !seen.contains(report_type) {
                seen.push(*report_type);
            }
        }
        seen
    }

    pub fn needs_courses(&self) -> bool {
        self.report_types.iter().any(ReportType::needs_courses)
    }

    pub fn needs_students(&self) -> bool {
        self.report_types.iter().any(ReportType::needs_students)
    }
}
