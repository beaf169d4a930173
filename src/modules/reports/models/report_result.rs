use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::report_config::{Granularity, ReportType};
use crate::modules::records::models::{Division, PaymentMode};

/// One bucket of the revenue trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    /// First day of the bucket, clamped to the report range
    pub period_start: NaiveDate,
    /// Last day of the bucket, clamped to the report range
    pub period_end: NaiveDate,
    pub amount: Decimal,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueTrend {
    pub granularity: Granularity,
    pub points: Vec<RevenuePoint>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionRow {
    pub division: Division,
    pub label: String,
    pub amount: Decimal,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionBreakdown {
    pub rows: Vec<DivisionRow>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRow {
    pub course_id: String,
    pub course_name: String,
    /// Current enrollment (dropped students excluded)
    pub enrolled: u64,
    pub dropped: u64,
    /// Dropped share of everyone who joined, in percent (2 dp)
    pub dropoff_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentVsDropoff {
    pub rows: Vec<EnrollmentRow>,
    pub total_enrolled: u64,
    pub total_dropped: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentModeRow {
    pub payment_mode: PaymentMode,
    pub label: String,
    pub transaction_count: u64,
    /// Whole percent; rows sum to exactly 100
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentModeDistribution {
    pub rows: Vec<PaymentModeRow>,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCourseRow {
    pub rank: u32,
    /// `None` when transactions name a course missing from the catalog
    pub course_id: Option<String>,
    pub course_name: String,
    pub revenue: Decimal,
    pub enrollment: u64,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCourses {
    pub rows: Vec<TopCourseRow>,
}

/// Output of one report type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "report_type", rename_all = "snake_case")]
pub enum ReportSection {
    RevenueTrend(RevenueTrend),
    DivisionBreakdown(DivisionBreakdown),
    EnrollmentVsDropoff(EnrollmentVsDropoff),
    PaymentModeDistribution(PaymentModeDistribution),
    TopCourses(TopCourses),
}

impl ReportSection {
    pub fn report_type(&self) -> ReportType {
        match self {
            ReportSection::RevenueTrend(_) => ReportType::RevenueTrend,
            ReportSection::DivisionBreakdown(_) => ReportType::DivisionBreakdown,
            ReportSection::EnrollmentVsDropoff(_) => ReportType::EnrollmentVsDropoff,
            ReportSection::PaymentModeDistribution(_) => ReportType::PaymentModeDistribution,
            ReportSection::TopCourses(_) => ReportType::TopCourses,
        }
    }

    /// Number of entries (rows/points) in the section
    pub fn len(&self) -> usize {
        match self {
            ReportSection::RevenueTrend(s) => s.points.len(),
            ReportSection::DivisionBreakdown(s) => s.rows.len(),
            ReportSection::EnrollmentVsDropoff(s) => s.rows.len(),
            ReportSection::PaymentModeDistribution(s) => s.rows.len(),
            ReportSection::TopCourses(s) => s.rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aggregated report over one date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub division: Option<Division>,
    /// Supplied by the caller; printed on exported documents
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}

impl ReportResult {
    pub fn report_types(&self) -> Vec<ReportType> {
        self.sections.iter().map(ReportSection::report_type).collect()
    }

    pub fn section(&self, report_type: ReportType) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.report_type() == report_type)
    }

    pub fn revenue_trend(&self) -> Option<&RevenueTrend> {
        match self.section(ReportType::RevenueTrend) {
            Some(ReportSection::RevenueTrend(trend)) => Some(trend),
            _ => None,
        }
    }

    pub fn division_breakdown(&self) -> Option<&DivisionBreakdown> {
        match self.section(ReportType::DivisionBreakdown) {
            Some(ReportSection::DivisionBreakdown(breakdown)) => Some(breakdown),
            _ => None,
        }
    }

    pub fn enrollment_vs_dropoff(&self) -> Option<&EnrollmentVsDropoff> {
        match self.section(ReportType::EnrollmentVsDropoff) {
            Some(ReportSection::EnrollmentVsDropoff(rows)) => Some(rows),
            _ => None,
        }
    }

    pub fn payment_mode_distribution(&self) -> Option<&PaymentModeDistribution> {
        match self.section(ReportType::PaymentModeDistribution) {
            Some(ReportSection::PaymentModeDistribution(dist)) => Some(dist),
            _ => None,
        }
    }

    pub fn top_courses(&self) -> Option<&TopCourses> {
        match self.section(ReportType::TopCourses) {
            Some(ReportSection::TopCourses(top)) => Some(top),
            _ => None,
        }
    }

    /// True when every section is empty
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(ReportSection::is_empty)
    }
}
