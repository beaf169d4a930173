pub mod mailer;
pub mod runner;
pub mod schedule_service;
pub mod trigger;

pub use mailer::{ReportEmail, ReportMailer, SmtpReportMailer};
pub use runner::ScheduleRunner;
pub use schedule_service::ScheduleService;
pub use trigger::{ScheduleTrigger, SweepSummary};
