pub mod receipt_formatter;

pub use receipt_formatter::{ReceiptBranding, ReceiptFormatter};
