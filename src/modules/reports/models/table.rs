//! Tabular view of report sections.
//!
//! Every export path (CSV, spreadsheet, print) goes through [`ReportTable`], so column
//! names, cell typing and shape validation are defined once. Writers only decide how a
//! typed [`Cell`] is spelled.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::report_config::ReportType;
use super::report_result::ReportSection;
use crate::core::timezone::format_long_date;
use crate::core::{AppError, Currency, Result};
use crate::modules::records::models::Labelled;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Date,
    Amount,
    Count,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Stable header name for machine-readable exports
    pub key: &'static str,
    /// Header shown on printed documents
    pub title: &'static str,
    pub kind: ColumnKind,
}

const fn col(key: &'static str, title: &'static str, kind: ColumnKind) -> Column {
    Column { key, title, kind }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Date(NaiveDate),
    Amount(Decimal),
    Count(u64),
    Percent(Decimal),
}

impl Cell {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Cell::Text(_) => ColumnKind::Text,
            Cell::Date(_) => ColumnKind::Date,
            Cell::Amount(_) => ColumnKind::Amount,
            Cell::Count(_) => ColumnKind::Count,
            Cell::Percent(_) => ColumnKind::Percent,
        }
    }

    /// Unformatted value: plain numbers, ISO 8601 dates
    pub fn raw(&self, currency: Currency) -> String {
        match self {
            Cell::Text(value) => value.clone(),
            Cell::Date(date) => date.format("%Y-%m-%d").to_string(),
            Cell::Amount(amount) => currency.format_plain(*amount),
            Cell::Count(count) => count.to_string(),
            Cell::Percent(value) => value.normalize().to_string(),
        }
    }

    /// Human-facing value: currency strings, long dates, `%` suffix
    pub fn display(&self, currency: Currency) -> String {
        match self {
            Cell::Text(value) => value.clone(),
            Cell::Date(date) => format_long_date(*date),
            Cell::Amount(amount) => currency.format_amount(*amount),
            Cell::Count(count) => count.to_string(),
            Cell::Percent(value) => format!("{}%", value.normalize()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Amount(_) | Cell::Count(_) | Cell::Percent(_))
    }
}

/// One report section laid out as columns and typed rows
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub report_type: ReportType,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn title(&self) -> &'static str {
        self.report_type.title()
    }

    /// Every row has one cell per column, each of the column's kind
    pub fn validate(&self) -> Result<()> {
        for (index, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(AppError::internal(format!(
                    "{} row {} has {} cells, expected {}",
                    self.report_type,
                    index,
                    row.len(),
                    self.columns.len()
                )));
            }
            for (cell, column) in row.iter().zip(&self.columns) {
                if cell.kind() != column.kind {
                    return Err(AppError::internal(format!(
                        "{} row {} column '{}' holds {:?}, expected {:?}",
                        self.report_type,
                        index,
                        column.key,
                        cell.kind(),
                        column.kind
                    )));
                }
            }
        }
        Ok(())
    }
}

impl ReportSection {
    /// Lay the section out as a table
    pub fn to_table(&self) -> ReportTable {
        use ColumnKind::*;

        let (columns, rows): (Vec<Column>, Vec<Vec<Cell>>) = match self {
            ReportSection::RevenueTrend(trend) => (
                vec![
                    col("period_start", "Period Start", Date),
                    col("period_end", "Period End", Date),
                    col("amount", "Revenue", Amount),
                    col("transaction_count", "Payments", Count),
                ],
                trend
                    .points
                    .iter()
                    .map(|p| {
                        vec![
                            Cell::Date(p.period_start),
                            Cell::Date(p.period_end),
                            Cell::Amount(p.amount),
                            Cell::Count(p.transaction_count),
                        ]
                    })
                    .collect(),
            ),
            ReportSection::DivisionBreakdown(breakdown) => (
                vec![
                    col("division", "Division Code", Text),
                    col("division_label", "Division", Text),
                    col("amount", "Revenue", Amount),
                    col("transaction_count", "Payments", Count),
                ],
                breakdown
                    .rows
                    .iter()
                    .map(|r| {
                        vec![
                            Cell::Text(r.division.code().to_string()),
                            Cell::Text(r.label.clone()),
                            Cell::Amount(r.amount),
                            Cell::Count(r.transaction_count),
                        ]
                    })
                    .collect(),
            ),
            ReportSection::EnrollmentVsDropoff(enrollment) => (
                vec![
                    col("course_id", "Course ID", Text),
                    col("course_name", "Course", Text),
                    col("enrolled", "Enrolled", Count),
                    col("dropped", "Dropped", Count),
                    col("dropoff_rate", "Dropoff Rate", Percent),
                ],
                enrollment
                    .rows
                    .iter()
                    .map(|r| {
                        vec![
                            Cell::Text(r.course_id.clone()),
                            Cell::Text(r.course_name.clone()),
                            Cell::Count(r.enrolled),
                            Cell::Count(r.dropped),
                            Cell::Percent(r.dropoff_rate),
                        ]
                    })
                    .collect(),
            ),
            ReportSection::PaymentModeDistribution(dist) => (
                vec![
                    col("payment_mode", "Mode Code", Text),
                    col("payment_mode_label", "Payment Mode", Text),
                    col("transaction_count", "Payments", Count),
                    col("percentage", "Share", Percent),
                ],
                dist.rows
                    .iter()
                    .map(|r| {
                        vec![
                            Cell::Text(r.payment_mode.code().to_string()),
                            Cell::Text(r.label.clone()),
                            Cell::Count(r.transaction_count),
                            Cell::Percent(Decimal::from(r.percentage)),
                        ]
                    })
                    .collect(),
            ),
            ReportSection::TopCourses(top) => (
                vec![
                    col("rank", "Rank", Count),
                    col("course_id", "Course ID", Text),
                    col("course_name", "Course", Text),
                    col("revenue", "Revenue", Amount),
                    col("enrollment", "Enrollment", Count),
                    col("transaction_count", "Payments", Count),
                ],
                top.rows
                    .iter()
                    .map(|r| {
                        vec![
                            Cell::Count(u64::from(r.rank)),
                            Cell::Text(r.course_id.clone().unwrap_or_default()),
                            Cell::Text(r.course_name.clone()),
                            Cell::Amount(r.revenue),
                            Cell::Count(r.enrollment),
                            Cell::Count(r.transaction_count),
                        ]
                    })
                    .collect(),
            ),
        };

        ReportTable {
            report_type: self.report_type(),
            columns,
            rows,
        }
    }
}
