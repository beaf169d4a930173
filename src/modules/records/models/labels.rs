//! Stored enumeration codes and their display labels.
//!
//! Every enum keeps an `Unrecognized` arm holding the raw stored code, so values introduced
//! server-side before the dashboard learns about them still render (verbatim) instead of
//! disappearing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored code plus display label for a lookup-table enum
pub trait Labelled {
    /// Canonical stored code
    fn code(&self) -> &str;

    /// Display label; the raw code for unrecognized values
    fn label(&self) -> &str;
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase().replace(['-', ' '], "_")
}

/// Organizational unit of the training center
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Division {
    GamaAbacus,
    VedicMaths,
    Tuition,
    SkillDevelopment,
    Unrecognized(String),
}

impl Division {
    /// All divisions the dashboard knows about, in display order
    pub const KNOWN: [Division; 4] = [
        Division::GamaAbacus,
        Division::VedicMaths,
        Division::Tuition,
        Division::SkillDevelopment,
    ];

    pub fn is_known(&self) -> bool {
        !matches!(self, Division::Unrecognized(_))
    }
}

impl Labelled for Division {
    fn code(&self) -> &str {
        match self {
            Division::GamaAbacus => "gama",
            Division::VedicMaths => "vedic",
            Division::Tuition => "tuition",
            Division::SkillDevelopment => "skills",
            Division::Unrecognized(raw) => raw,
        }
    }

    fn label(&self) -> &str {
        match self {
            Division::GamaAbacus => "Gama Abacus",
            Division::VedicMaths => "Vedic Maths",
            Division::Tuition => "Tuition Classes",
            Division::SkillDevelopment => "Skill Development",
            Division::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for Division {
    fn from(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "gama" | "gama_abacus" => Division::GamaAbacus,
            "vedic" | "vedic_maths" => Division::VedicMaths,
            "tuition" | "tuition_classes" => Division::Tuition,
            "skills" | "skill_development" => Division::SkillDevelopment,
            _ => Division::Unrecognized(raw.to_string()),
        }
    }
}

impl From<String> for Division {
    fn from(raw: String) -> Self {
        Division::from(raw.as_str())
    }
}

impl From<Division> for String {
    fn from(division: Division) -> Self {
        division.code().to_string()
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a fee payment was made
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMode {
    Cash,
    Upi,
    Card,
    BankTransfer,
    Cheque,
    DemandDraft,
    Unrecognized(String),
}

impl PaymentMode {
    pub const KNOWN: [PaymentMode; 6] = [
        PaymentMode::Cash,
        PaymentMode::Upi,
        PaymentMode::Card,
        PaymentMode::BankTransfer,
        PaymentMode::Cheque,
        PaymentMode::DemandDraft,
    ];
}

impl Labelled for PaymentMode {
    fn code(&self) -> &str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Upi => "upi",
            PaymentMode::Card => "card",
            PaymentMode::BankTransfer => "bank_transfer",
            PaymentMode::Cheque => "cheque",
            PaymentMode::DemandDraft => "dd",
            PaymentMode::Unrecognized(raw) => raw,
        }
    }

    fn label(&self) -> &str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Upi => "UPI",
            PaymentMode::Card => "Card",
            PaymentMode::BankTransfer => "Bank Transfer",
            PaymentMode::Cheque => "Cheque",
            PaymentMode::DemandDraft => "Demand Draft",
            PaymentMode::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for PaymentMode {
    fn from(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "cash" => PaymentMode::Cash,
            "upi" => PaymentMode::Upi,
            "card" | "credit_card" | "debit_card" => PaymentMode::Card,
            "bank_transfer" | "banktransfer" | "neft" | "imps" => PaymentMode::BankTransfer,
            "cheque" | "check" => PaymentMode::Cheque,
            "dd" | "demand_draft" => PaymentMode::DemandDraft,
            _ => PaymentMode::Unrecognized(raw.to_string()),
        }
    }
}

impl From<String> for PaymentMode {
    fn from(raw: String) -> Self {
        PaymentMode::from(raw.as_str())
    }
}

impl From<PaymentMode> for String {
    fn from(mode: PaymentMode) -> Self {
        mode.code().to_string()
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a fee payment was for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeeType {
    Admission,
    Monthly,
    Installment,
    Exam,
    Certificate,
    Other,
    Unrecognized(String),
}

impl Labelled for FeeType {
    fn code(&self) -> &str {
        match self {
            FeeType::Admission => "admission",
            FeeType::Monthly => "monthly",
            FeeType::Installment => "installment",
            FeeType::Exam => "exam",
            FeeType::Certificate => "certificate",
            FeeType::Other => "other",
            FeeType::Unrecognized(raw) => raw,
        }
    }

    fn label(&self) -> &str {
        match self {
            FeeType::Admission => "Admission Fee",
            FeeType::Monthly => "Monthly Fee",
            FeeType::Installment => "Installment",
            FeeType::Exam => "Exam Fee",
            FeeType::Certificate => "Certificate Fee",
            FeeType::Other => "Other",
            FeeType::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for FeeType {
    fn from(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "admission" => FeeType::Admission,
            "monthly" => FeeType::Monthly,
            "installment" | "instalment" => FeeType::Installment,
            "exam" => FeeType::Exam,
            "certificate" => FeeType::Certificate,
            "other" => FeeType::Other,
            _ => FeeType::Unrecognized(raw.to_string()),
        }
    }
}

impl From<String> for FeeType {
    fn from(raw: String) -> Self {
        FeeType::from(raw.as_str())
    }
}

impl From<FeeType> for String {
    fn from(fee_type: FeeType) -> Self {
        fee_type.code().to_string()
    }
}
