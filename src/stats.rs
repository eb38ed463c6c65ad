use chrono::{Datelike, NaiveDate};

use crate::models::{Client, Expense, Firm, Invoice, PaymentStatus};

/// Headline numbers for the dashboard, computed over the records the
/// signed-in user can see.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_firms: usize,
    pub total_clients: usize,
    pub total_invoices: usize,
    pub total_revenue: f64,
    pub pending_amount: f64,
    pub this_month_revenue: f64,
    pub total_expenses: f64,
}

/// Aggregate the accessible records. `today` anchors the current-month
/// revenue window.
pub fn dashboard_stats(
    firms: &[Firm],
    clients: &[Client],
    invoices: &[Invoice],
    expenses: &[Expense],
    today: NaiveDate,
) -> DashboardStats {
    let total_revenue = invoices.iter().map(|inv| inv.grand_total).sum();

    let pending_amount = invoices
        .iter()
        .filter(|inv| inv.payment_status != PaymentStatus::Paid)
        .map(|inv| inv.pending_amount)
        .sum();

    let this_month_revenue = invoices
        .iter()
        .filter(|inv| {
            inv.invoice_date.month() == today.month() && inv.invoice_date.year() == today.year()
        })
        .map(|inv| inv.grand_total)
        .sum();

    let total_expenses = expenses.iter().map(|exp| exp.amount).sum();

    DashboardStats {
        total_firms: firms.len(),
        total_clients: clients.len(),
        total_invoices: invoices.len(),
        total_revenue,
        pending_amount,
        this_month_revenue,
        total_expenses,
    }
}

/// Most recently created invoices, newest first.
pub fn recent_invoices(invoices: &[Invoice], limit: usize) -> Vec<Invoice> {
    let mut sorted: Vec<Invoice> = invoices.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

/// Most recently created expenses, newest first.
pub fn recent_expenses(expenses: &[Expense], limit: usize) -> Vec<Expense> {
    let mut sorted: Vec<Expense> = expenses.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::GstRate;
    use chrono::{TimeZone, Utc};

    fn invoice(number: &str, date: &str, grand: f64, pending: f64, status: PaymentStatus) -> Invoice {
        let invoice_date: NaiveDate = date.parse().unwrap();
        Invoice {
            id: number.to_string(),
            invoice_number: number.to_string(),
            firm_id: "f1".to_string(),
            client_id: "c1".to_string(),
            invoice_date,
            description: "Services".to_string(),
            sac_code: None,
            rate: grand,
            quantity: 1.0,
            unit: "Job".to_string(),
            gst_rate: GstRate::Exempt,
            taxable_amount: grand,
            cgst_amount: 0.0,
            sgst_amount: 0.0,
            igst_amount: 0.0,
            grand_total: grand,
            payment_status: status,
            paid_amount: grand - pending,
            pending_amount: pending,
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 10, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 1, 2, 10, 30, 0).unwrap(),
        }
    }

    fn expense(id: &str, amount: f64, created_day: u32) -> Expense {
        Expense {
            id: id.to_string(),
            firm_id: "f1".to_string(),
            description: "Diesel".to_string(),
            amount,
            category: "Fuel".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, created_day).unwrap(),
            created_at: Utc.with_ymd_and_hms(2025, 1, created_day, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn revenue_and_pending_are_summed() {
        let invoices = vec![
            invoice("A", "2025-01-02", 209_804.0, 209_804.0, PaymentStatus::Pending),
            invoice("B", "2025-01-15", 50_000.0, 0.0, PaymentStatus::Paid),
        ];

        let stats = dashboard_stats(
            &[],
            &[],
            &invoices,
            &[],
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
        );

        assert_eq!(stats.total_invoices, 2);
        assert_eq!(stats.total_revenue, 259_804.0);
        assert_eq!(stats.pending_amount, 209_804.0);
    }

    #[test]
    fn paid_invoices_do_not_count_as_pending() {
        let invoices = vec![
            invoice("A", "2025-01-02", 1000.0, 400.0, PaymentStatus::Partial),
            invoice("B", "2025-01-03", 2000.0, 0.0, PaymentStatus::Paid),
        ];

        let stats = dashboard_stats(
            &[],
            &[],
            &invoices,
            &[],
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        );

        assert_eq!(stats.pending_amount, 400.0);
    }

    #[test]
    fn this_month_revenue_uses_invoice_date() {
        let invoices = vec![
            invoice("A", "2025-01-02", 1000.0, 1000.0, PaymentStatus::Pending),
            invoice("B", "2024-12-28", 5000.0, 5000.0, PaymentStatus::Pending),
            invoice("C", "2024-01-10", 700.0, 700.0, PaymentStatus::Pending),
        ];

        let stats = dashboard_stats(
            &[],
            &[],
            &invoices,
            &[],
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
        );

        assert_eq!(stats.this_month_revenue, 1000.0);
    }

    #[test]
    fn expenses_total_and_recents_order() {
        let expenses = vec![expense("e1", 5000.0, 5), expense("e2", 12_000.0, 10)];

        let stats = dashboard_stats(
            &[],
            &[],
            &[],
            &expenses,
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
        );
        assert_eq!(stats.total_expenses, 17_000.0);

        let recents = recent_expenses(&expenses, 5);
        assert_eq!(recents[0].id, "e2");
        assert_eq!(recents[1].id, "e1");

        let capped = recent_expenses(&expenses, 1);
        assert_eq!(capped.len(), 1);
    }
}
