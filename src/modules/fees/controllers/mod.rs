mod receipt_controller;

pub use receipt_controller::{configure, get_receipt, preview_receipt};
