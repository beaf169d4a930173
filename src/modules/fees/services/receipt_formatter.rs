use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::document::{el, key_value_table, styles, HtmlDocument};
use crate::core::timezone::{format_record_date, NOT_AVAILABLE};
use crate::core::Currency;
use crate::modules::fees::models::PaymentTransaction;
use crate::modules::records::models::Labelled;

/// Institute details printed on every receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptBranding {
    pub institute_name: String,
    pub address: String,
    pub contact: String,
    #[serde(default)]
    pub currency: Currency,
}

impl Default for ReceiptBranding {
    fn default() -> Self {
        Self {
            institute_name: "Training Center".to_string(),
            address: String::new(),
            contact: String::new(),
            currency: Currency::INR,
        }
    }
}

/// Renders one payment transaction as a printable, self-contained HTML receipt.
///
/// Never fails: every missing or unreadable field renders as `N/A`, because the printed
/// receipt is frequently the only audit copy of the payment. Output depends only on the
/// transaction and the branding (no clock reads).
#[derive(Debug, Clone, Default)]
pub struct ReceiptFormatter {
    branding: ReceiptBranding,
}

impl ReceiptFormatter {
    pub fn new(branding: ReceiptBranding) -> Self {
        Self { branding }
    }

    pub fn branding(&self) -> &ReceiptBranding {
        &self.branding
    }

    /// Render the receipt to an HTML string
    pub fn format(&self, tx: &PaymentTransaction) -> String {
        self.build(tx).render()
    }

    /// Build the receipt document tree
    pub fn build(&self, tx: &PaymentTransaction) -> HtmlDocument {
        let receipt_number = text_or_na(Some(tx.receipt_number.as_str()));
        let mut doc = HtmlDocument::new(format!("Fee Receipt {}", receipt_number));

        let mut header = el("div")
            .style(styles::HEADER)
            .child(el("h1").style(styles::TITLE).text(self.branding.institute_name.clone()));
        for line in [&self.branding.address, &self.branding.contact] {
            if !line.trim().is_empty() {
                header = header.child(el("p").style(styles::SUBTITLE).text(line.clone()));
            }
        }
        header = header.child(
            el("p")
                .style(styles::SECTION_TITLE)
                .text("FEE RECEIPT"),
        );

        let meta = key_value_table([
            ("Receipt No.", receipt_number),
            ("Payment Date", format_record_date(tx.payment_date.as_deref())),
        ]);

        let student = key_value_table([
            ("Student Name", text_or_na(tx.student_name.as_deref())),
            ("Student ID", text_or_na(tx.student_id.as_deref())),
            ("Division", label_or_na(tx.division.as_ref())),
            ("Course", text_or_na(tx.course_name.as_deref())),
        ]);

        let mut payment_rows = vec![
            ("Fee Type", label_or_na(tx.fee_type.as_ref())),
            ("Payment Mode", label_or_na(tx.payment_mode.as_ref())),
            ("Total Fee", self.money(tx.total_fee)),
            ("Amount Paid", self.money(tx.amount_paid)),
            ("Balance", self.money(tx.balance)),
        ];
        if let Some(reference) = non_blank(tx.transaction_ref.as_deref()) {
            payment_rows.push(("Transaction Reference", reference.to_string()));
        }
        payment_rows.push(("Processed By", text_or_na(tx.processed_by.as_deref())));

        let mut sheet = el("div")
            .style(styles::SHEET)
            .child(header)
            .child(meta)
            .child(el("h2").style(styles::SECTION_TITLE).text("Student Details"))
            .child(student)
            .child(el("h2").style(styles::SECTION_TITLE).text("Payment Details"))
            .child(key_value_table(payment_rows));

        if let Some(notes) = non_blank(tx.notes.as_deref()) {
            sheet = sheet.child(
                el("div")
                    .style(styles::NOTE)
                    .child(el("strong").text("Notes: "))
                    .text(notes.to_string()),
            );
        }

        if tx.is_settled() {
            sheet = sheet.child(el("div").style(styles::STAMP).text("PAID IN FULL"));
        }

        sheet = sheet.child(
            el("div")
                .style(styles::FOOTER)
                .child(el("p").text(
                    "This is a computer-generated receipt and does not require a signature.",
                ))
                .child(el("p").text(format!(
                    "Please retain this receipt for your records. {}",
                    self.branding.institute_name
                ))),
        );

        doc.push(sheet);
        doc
    }

    fn money(&self, amount: Option<Decimal>) -> String {
        amount
            .map(|a| self.branding.currency.format_amount(a))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn text_or_na(value: Option<&str>) -> String {
    non_blank(value)
        .map(str::to_string)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn label_or_na<L: Labelled>(value: Option<&L>) -> String {
    text_or_na(value.map(|v| v.label()))
}
