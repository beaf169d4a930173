pub mod controllers;
pub mod models;
pub mod services;

pub use models::{ChartContext, ExportFormat, ReportConfiguration, ReportResult, ReportType};
pub use services::{
    ExportArtifact, ExportRegistry, ExportSerializer, ReportAggregator, ReportService,
};
