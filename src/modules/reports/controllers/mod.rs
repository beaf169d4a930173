mod report_controller;

pub use report_controller::{
    cancel_export, configure, export_report, preview_report, ReportPreviewResponse, ReportRequest,
};
