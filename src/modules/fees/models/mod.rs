pub mod payment_transaction;

pub use payment_transaction::PaymentTransaction;
