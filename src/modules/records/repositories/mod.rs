pub mod record_store;

pub use record_store::{
    fetch_all_courses, fetch_all_students, fetch_all_transactions, CourseQuery, MySqlRecordStore,
    RecordStore, StudentQuery, TransactionQuery,
};
