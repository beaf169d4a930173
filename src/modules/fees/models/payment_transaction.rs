use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::timezone::parse_record_date;
use crate::modules::records::models::{Division, FeeType, PaymentMode};

/// One fee payment event, as stored in the `fee_transactions` collection.
///
/// `amount_paid` is the amount of this payment event, not a running total. The
/// fee-collection workflow writes `balance = total_fee - (all payments so far)` at
/// creation time; nothing here re-derives it. Records are never mutated after creation.
///
/// Every field except the ids may be missing in older documents, so they are optional
/// and consumers render placeholders instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: String,
    /// Human-readable, globally unique, immutable once issued
    pub receipt_number: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub division: Option<Division>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub total_fee: Option<Decimal>,
    #[serde(default)]
    pub amount_paid: Option<Decimal>,
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
    #[serde(default)]
    pub fee_type: Option<FeeType>,
    /// Raw stored date; see [`crate::core::timezone::parse_record_date`]
    #[serde(default)]
    pub payment_date: Option<String>,
    /// Counselor or admin who processed the payment
    #[serde(default)]
    pub processed_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// External reference (UPI id, cheque number, bank UTR)
    #[serde(default)]
    pub transaction_ref: Option<String>,
}

impl PaymentTransaction {
    /// Business date of the payment, if the stored value is readable
    pub fn payment_day(&self) -> Option<NaiveDate> {
        self.payment_date.as_deref().and_then(parse_record_date)
    }

    /// Amount of this payment event; missing amounts count as zero in aggregates
    pub fn paid(&self) -> Decimal {
        self.amount_paid.unwrap_or(Decimal::ZERO)
    }

    /// True when the recorded balance is exactly zero
    pub fn is_settled(&self) -> bool {
        self.balance.map_or(false, |b| b.is_zero())
    }

    pub fn falls_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.payment_day()
            .map_or(false, |day| day >= start && day <= end)
    }
}
