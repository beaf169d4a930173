pub mod job;
pub mod recurrence;

pub use job::{JobFailure, JobStatus, ReportTemplate, ScheduleSettings, ScheduledReportJob};
pub use recurrence::{Cadence, Recurrence};
