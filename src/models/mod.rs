mod client;
mod expense;
mod firm;
mod invoice;
mod user;

pub use client::{Client, INDIAN_STATES};
pub use expense::{Expense, EXPENSE_CATEGORIES};
pub use firm::Firm;
pub use invoice::{Invoice, PaymentStatus, UNITS};
pub use user::{Role, User};
