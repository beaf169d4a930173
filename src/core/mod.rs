pub mod currency;
pub mod document;
pub mod error;
pub mod timezone;
pub mod traits;

pub use currency::Currency;
pub use error::{AppError, PipelineStage, Result};
