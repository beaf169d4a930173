pub mod aggregator;
pub mod export_serializer;
pub mod report_service;

pub use aggregator::{largest_remainder_percentages, ReportAggregator};
pub use export_serializer::{filename, parse_csv_records, ExportArtifact, ExportSerializer};
pub use report_service::{ExportRegistry, ReportService};
