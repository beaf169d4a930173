//! Fee receipts, report aggregation, report exports and scheduled report delivery for a
//! multi-division training center.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

pub use modules::fees;
pub use modules::records;
pub use modules::reports;
pub use modules::schedules;
