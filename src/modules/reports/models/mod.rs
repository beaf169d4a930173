pub mod chart;
pub mod report_config;
pub mod report_result;
pub mod table;

pub use chart::{ChartContext, ChartKind, ChartSpec, Dataset};
pub use report_config::{ExportFormat, Granularity, ReportConfiguration, ReportType};
pub use report_result::{
    DivisionBreakdown, DivisionRow, EnrollmentRow, EnrollmentVsDropoff, PaymentModeDistribution,
    PaymentModeRow, ReportResult, ReportSection, RevenuePoint, RevenueTrend, TopCourseRow,
    TopCourses,
};
pub use table::{Cell, Column, ColumnKind, ReportTable};
