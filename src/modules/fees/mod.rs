pub mod controllers;
pub mod models;
pub mod services;

pub use models::PaymentTransaction;
pub use services::{ReceiptBranding, ReceiptFormatter};
