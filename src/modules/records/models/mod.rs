pub mod course;
pub mod labels;
pub mod student;

pub use course::{Course, CourseStatus};
pub use labels::{Division, FeeType, Labelled, PaymentMode};
pub use student::{Student, StudentStatus};
