use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::tax::{GstRate, InvoiceTotals};

/// An invoice raised by a firm against a client.
///
/// The amount fields are a snapshot of `tax::InvoiceTotals` taken when the
/// invoice was last saved; `taxable_amount` keeps the data file's historical
/// `totalAmount` key. `pending_amount` starts at `grand_total` and tracks
/// `grand_total - paid_amount` across saves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub firm_id: String,
    pub client_id: String,
    pub invoice_date: NaiveDate,
    pub description: String,
    pub sac_code: Option<String>,
    pub rate: f64,
    pub quantity: f64,
    pub unit: String,
    pub gst_rate: GstRate,
    #[serde(rename = "totalAmount")]
    pub taxable_amount: f64,
    pub cgst_amount: f64,
    pub sgst_amount: f64,
    pub igst_amount: f64,
    pub grand_total: f64,
    pub payment_status: PaymentStatus,
    pub paid_amount: f64,
    pub pending_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Copy a freshly computed tax breakdown into the stored snapshot and
    /// rebalance the pending amount against what has already been paid.
    pub fn apply_totals(&mut self, totals: &InvoiceTotals) {
        self.taxable_amount = totals.taxable_amount;
        self.cgst_amount = totals.cgst_amount;
        self.sgst_amount = totals.sgst_amount;
        self.igst_amount = totals.igst_amount;
        self.grand_total = totals.grand_total;
        self.pending_amount = totals.grand_total - self.paid_amount;
    }
}

/// Payment lifecycle of an invoice. Only the label changes hands; there is
/// no payment ledger behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Partial => "Partially Paid",
            PaymentStatus::Paid => "Fully Paid",
        }
    }
}

/// Units of measure offered by the invoice form.
pub const UNITS: &[&str] = &["Hours", "Days", "Pieces", "Kg", "Meters", "Job"];
