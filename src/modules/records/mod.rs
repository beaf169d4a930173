pub mod models;
pub mod repositories;

pub use models::{Course, Division, FeeType, Labelled, PaymentMode, Student};
pub use repositories::{MySqlRecordStore, RecordStore};
