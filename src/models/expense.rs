use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A business expense booked against a firm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub firm_id: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Categories offered by the expense form.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Fuel",
    "Maintenance",
    "Equipment",
    "Materials",
    "Labor",
    "Transport",
    "Office Supplies",
    "Professional Services",
    "Utilities",
    "Other",
];
