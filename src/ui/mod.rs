pub mod client_wizard;
pub mod clients;
pub mod components;
pub mod dashboard;
pub mod expense_wizard;
pub mod expenses;
pub mod firm_wizard;
pub mod firms;
pub mod invoice_wizard;
pub mod invoices;
pub mod login;
