use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::report_config::ReportType;
use super::report_result::{ReportResult, ReportSection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    GroupedBar,
    Doughnut,
    HorizontalBar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<Decimal>,
}

/// Data handed to the dashboard's charting library for one report type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub report_type: ReportType,
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Chart slots of one dashboard session, one per report type.
///
/// Each report view owns its context, so several views (or tests) never share chart
/// state. Rendering a result replaces the slots of the report types it contains.
#[derive(Debug, Clone, Default)]
pub struct ChartContext {
    charts: BTreeMap<ReportType, ChartSpec>,
}

impl ChartContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, result: &ReportResult) {
        for section in &result.sections {
            let spec = chart_for(section);
            self.charts.insert(spec.report_type, spec);
        }
    }

    pub fn chart(&self, report_type: ReportType) -> Option<&ChartSpec> {
        self.charts.get(&report_type)
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.charts.values()
    }

    /// Drop one slot, e.g. when the user closes a chart
    pub fn destroy(&mut self, report_type: ReportType) -> Option<ChartSpec> {
        self.charts.remove(&report_type)
    }

    pub fn clear(&mut self) {
        self.charts.clear();
    }
}

fn chart_for(section: &ReportSection) -> ChartSpec {
    let report_type = section.report_type();
    let (kind, labels, datasets) = match section {
        ReportSection::RevenueTrend(trend) => (
            ChartKind::Line,
            trend
                .points
                .iter()
                .map(|p| p.period_start.format("%Y-%m-%d").to_string())
                .collect(),
            vec![Dataset {
                label: "Revenue".to_string(),
                values: trend.points.iter().map(|p| p.amount).collect(),
            }],
        ),
        ReportSection::DivisionBreakdown(breakdown) => (
            ChartKind::Bar,
            breakdown.rows.iter().map(|r| r.label.clone()).collect(),
            vec![Dataset {
                label: "Revenue".to_string(),
                values: breakdown.rows.iter().map(|r| r.amount).collect(),
            }],
        ),
        ReportSection::EnrollmentVsDropoff(enrollment) => (
            ChartKind::GroupedBar,
            enrollment.rows.iter().map(|r| r.course_name.clone()).collect(),
            vec![
                Dataset {
                    label: "Enrolled".to_string(),
                    values: enrollment.rows.iter().map(|r| Decimal::from(r.enrolled)).collect(),
                },
                Dataset {
                    label: "Dropped".to_string(),
                    values: enrollment.rows.iter().map(|r| Decimal::from(r.dropped)).collect(),
                },
            ],
        ),
        ReportSection::PaymentModeDistribution(dist) => (
            ChartKind::Doughnut,
            dist.rows.iter().map(|r| r.label.clone()).collect(),
            vec![Dataset {
                label: "Share (%)".to_string(),
                values: dist.rows.iter().map(|r| Decimal::from(r.percentage)).collect(),
            }],
        ),
        ReportSection::TopCourses(top) => (
            ChartKind::HorizontalBar,
            top.rows.iter().map(|r| r.course_name.clone()).collect(),
            vec![Dataset {
                label: "Revenue".to_string(),
                values: top.rows.iter().map(|r| r.revenue).collect(),
            }],
        ),
    };

    ChartSpec {
        report_type,
        kind,
        title: report_type.title().to_string(),
        labels,
        datasets,
    }
}
