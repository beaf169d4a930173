pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Cadence, JobStatus, Recurrence, ScheduleSettings, ScheduledReportJob};
pub use repositories::{MySqlScheduleRepository, ScheduleRepository};
pub use services::{
    ReportMailer, ScheduleRunner, ScheduleService, ScheduleTrigger, SmtpReportMailer,
};
