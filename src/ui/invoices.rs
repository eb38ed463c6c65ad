use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Spans,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::currency::format_inr_whole;
use crate::models::{Client, Firm, Invoice, PaymentStatus};

/// Payment-status filter cycled with 'f', matching the original list's
/// status dropdown.
#[derive(Clone, Copy, PartialEq)]
pub enum StatusFilter {
    All,
    Status(PaymentStatus),
}

impl StatusFilter {
    fn next(self) -> StatusFilter {
        match self {
            StatusFilter::All => StatusFilter::Status(PaymentStatus::Pending),
            StatusFilter::Status(PaymentStatus::Pending) => {
                StatusFilter::Status(PaymentStatus::Partial)
            }
            StatusFilter::Status(PaymentStatus::Partial) => {
                StatusFilter::Status(PaymentStatus::Paid)
            }
            StatusFilter::Status(PaymentStatus::Paid) => StatusFilter::All,
        }
    }

    fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All Statuses",
            StatusFilter::Status(status) => status.label(),
        }
    }
}

// Represents the state of the invoices table screen
pub struct InvoicesState {
    invoices: Vec<Invoice>,
    firms: Vec<Firm>,
    clients: Vec<Client>,
    table_state: TableState,
    search: String,
    searching: bool,
    status_filter: StatusFilter,
    show_delete_confirmation: bool,
    notice: Option<String>,
}

impl InvoicesState {
    /// `firms` and `clients` are only used to resolve names on the rows
    /// and in the search.
    pub fn new(invoices: Vec<Invoice>, firms: Vec<Firm>, clients: Vec<Client>) -> Self {
        let mut table_state = TableState::default();
        if !invoices.is_empty() {
            table_state.select(Some(0));
        }

        Self {
            invoices,
            firms,
            clients,
            table_state,
            search: String::new(),
            searching: false,
            status_filter: StatusFilter::All,
            show_delete_confirmation: false,
            notice: None,
        }
    }

    pub fn set_notice(&mut self, message: String) {
        self.notice = Some(message);
    }

    fn firm_name(&self, firm_id: &str) -> &str {
        self.firms
            .iter()
            .find(|f| f.id == firm_id)
            .map(|f| f.name.as_str())
            .unwrap_or("Unknown Firm")
    }

    fn client_name(&self, client_id: &str) -> &str {
        self.clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.name.as_str())
            .unwrap_or("Unknown Client")
    }

    fn filtered(&self) -> Vec<&Invoice> {
        let needle = self.search.to_lowercase();
        self.invoices
            .iter()
            .filter(|inv| match self.status_filter {
                StatusFilter::All => true,
                StatusFilter::Status(status) => inv.payment_status == status,
            })
            .filter(|inv| {
                if needle.is_empty() {
                    return true;
                }
                inv.invoice_number.to_lowercase().contains(&needle)
                    || self.firm_name(&inv.firm_id).to_lowercase().contains(&needle)
                    || self
                        .client_name(&inv.client_id)
                        .to_lowercase()
                        .contains(&needle)
            })
            .collect()
    }

    pub fn next(&mut self) {
        let len = self.filtered().len();
        if len == 0 {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.filtered().len();
        if len == 0 {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_invoice_id(&self) -> Option<String> {
        self.table_state
            .selected()
            .and_then(|i| self.filtered().get(i).map(|inv| inv.id.clone()))
    }

    fn reset_selection(&mut self) {
        if self.filtered().is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(0));
        }
    }

    fn cycle_status_filter(&mut self) {
        self.status_filter = self.status_filter.next();
        self.reset_selection();
    }
}

pub enum InvoiceAction {
    Back,
    NewInvoice,
    EditInvoice(String),
    DeleteInvoice(String),
    GenerateDoc(String),
}

pub fn render_invoices<B: Backend>(frame: &mut Frame<B>, state: &mut InvoicesState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    // Search and status filter line
    let search_text = if state.searching {
        format!("Search: {}|", state.search)
    } else if state.search.is_empty() {
        "Search: (press / to search)".to_string()
    } else {
        format!("Search: {}", state.search)
    };
    let filter_line = format!("{}    Filter: {}", search_text, state.status_filter.label());
    let search = Paragraph::new(filter_line)
        .style(if state.searching {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(search, chunks[0]);

    let header_cells = ["Number", "Firm", "Client", "Date", "Status", "Total", "Pending"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let filtered = state.filtered();
    let rows = filtered.iter().map(|invoice| {
        let pending = if invoice.payment_status == PaymentStatus::Paid {
            String::new()
        } else {
            format_inr_whole(invoice.pending_amount)
        };
        let cells = vec![
            Cell::from(invoice.invoice_number.clone()),
            Cell::from(state.firm_name(&invoice.firm_id).to_string()),
            Cell::from(state.client_name(&invoice.client_id).to_string()),
            Cell::from(invoice.invoice_date.format("%Y-%m-%d").to_string()),
            Cell::from(invoice.payment_status.label()),
            Cell::from(format_inr_whole(invoice.grand_total)),
            Cell::from(pending),
        ];
        Row::new(cells).height(1)
    });

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Invoices").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Percentage(16),
            Constraint::Percentage(18),
            Constraint::Percentage(18),
            Constraint::Percentage(12),
            Constraint::Percentage(12),
            Constraint::Percentage(12),
            Constraint::Percentage(12),
        ]);

    frame.render_stateful_widget(table, chunks[1], &mut state.table_state);

    let buttons_text = if state.selected_invoice_id().is_some() {
        "<N> New | <E> Edit | <D> Delete | <G> Generate Document | <F> Filter | </> Search | <Esc> Back"
    } else {
        "<N> New Invoice | <F> Filter | </> Search | <Esc> Back"
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[2]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }

    if let Some(notice) = &state.notice {
        render_notice(frame, size, notice);
    }
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this invoice?"),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(popup, popup_area);
}

fn render_notice<B: Backend>(frame: &mut Frame<B>, size: Rect, notice: &str) {
    let popup_area = centered_rect(60, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(notice),
        Spans::from(""),
        Spans::from("Press any key to continue"),
    ])
    .block(Block::default().title("Notice").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(popup, popup_area);
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn handle_input(state: &mut InvoicesState) -> Result<Option<InvoiceAction>> {
    if let Event::Key(key) = event::read()? {
        if state.notice.is_some() {
            state.notice = None;
            return Ok(None);
        }

        if state.searching {
            match key.code {
                KeyCode::Esc => {
                    state.search.clear();
                    state.searching = false;
                    state.reset_selection();
                }
                KeyCode::Enter => {
                    state.searching = false;
                }
                KeyCode::Char(c) => {
                    state.search.push(c);
                    state.reset_selection();
                }
                KeyCode::Backspace => {
                    state.search.pop();
                    state.reset_selection();
                }
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if state.show_delete_confirmation {
                    state.show_delete_confirmation = false;
                } else {
                    return Ok(Some(InvoiceAction::Back));
                }
            }
            KeyCode::Char('/') => {
                if !state.show_delete_confirmation {
                    state.searching = true;
                }
            }
            KeyCode::Char('f') => {
                if !state.show_delete_confirmation {
                    state.cycle_status_filter();
                }
            }
            KeyCode::Char('n') => {
                if state.show_delete_confirmation {
                    state.show_delete_confirmation = false;
                } else {
                    return Ok(Some(InvoiceAction::NewInvoice));
                }
            }
            KeyCode::Char('e') => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_invoice_id() {
                        return Ok(Some(InvoiceAction::EditInvoice(id)));
                    }
                }
            }
            KeyCode::Char('g') => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_invoice_id() {
                        return Ok(Some(InvoiceAction::GenerateDoc(id)));
                    }
                }
            }
            KeyCode::Char('d') => {
                if !state.show_delete_confirmation && state.selected_invoice_id().is_some() {
                    state.show_delete_confirmation = true;
                }
            }
            KeyCode::Char('y') => {
                if state.show_delete_confirmation {
                    if let Some(id) = state.selected_invoice_id() {
                        state.show_delete_confirmation = false;
                        return Ok(Some(InvoiceAction::DeleteInvoice(id)));
                    }
                }
            }
            KeyCode::Down => {
                if !state.show_delete_confirmation {
                    state.next();
                }
            }
            KeyCode::Up => {
                if !state.show_delete_confirmation {
                    state.previous();
                }
            }
            _ => {}
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::GstRate;
    use chrono::{NaiveDate, Utc};

    fn invoice(id: &str, number: &str, firm_id: &str, status: PaymentStatus) -> Invoice {
        Invoice {
            id: id.to_string(),
            invoice_number: number.to_string(),
            firm_id: firm_id.to_string(),
            client_id: "c1".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            description: "Services".to_string(),
            sac_code: None,
            rate: 100.0,
            quantity: 1.0,
            unit: "Job".to_string(),
            gst_rate: GstRate::Exempt,
            taxable_amount: 100.0,
            cgst_amount: 0.0,
            sgst_amount: 0.0,
            igst_amount: 0.0,
            grand_total: 100.0,
            payment_status: status,
            paid_amount: 0.0,
            pending_amount: 100.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn firm(id: &str, name: &str) -> Firm {
        Firm {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            gst_number: None,
            permanent_address: String::new(),
            present_address: String::new(),
            phone: String::new(),
            proprietor: String::new(),
            account_number: None,
            ifsc_code: None,
            letterhead_type: "template".to_string(),
            letterhead_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn search_matches_number_and_firm_name() {
        let mut state = InvoicesState::new(
            vec![
                invoice("1", "KDJ/19", "f1", PaymentStatus::Pending),
                invoice("2", "JM/001", "f2", PaymentStatus::Paid),
            ],
            vec![firm("f1", "MAA DURGA"), firm("f2", "JASOBANTA")],
            vec![],
        );

        state.search = "kdj".to_string();
        assert_eq!(state.filtered().len(), 1);
        assert_eq!(state.filtered()[0].id, "1");

        state.search = "jasobanta".to_string();
        assert_eq!(state.filtered().len(), 1);
        assert_eq!(state.filtered()[0].id, "2");
    }

    #[test]
    fn status_filter_cycles_back_to_all() {
        let mut state = InvoicesState::new(
            vec![
                invoice("1", "A", "f1", PaymentStatus::Pending),
                invoice("2", "B", "f1", PaymentStatus::Paid),
            ],
            vec![],
            vec![],
        );

        state.cycle_status_filter();
        assert_eq!(state.filtered().len(), 1); // pending only
        state.cycle_status_filter();
        assert_eq!(state.filtered().len(), 0); // partial
        state.cycle_status_filter();
        assert_eq!(state.filtered().len(), 1); // paid
        state.cycle_status_filter();
        assert_eq!(state.filtered().len(), 2); // all again
    }

    #[test]
    fn unknown_references_fall_back_to_placeholder_names() {
        let state = InvoicesState::new(
            vec![invoice("1", "A", "ghost", PaymentStatus::Pending)],
            vec![],
            vec![],
        );
        assert_eq!(state.firm_name("ghost"), "Unknown Firm");
        assert_eq!(state.client_name("ghost"), "Unknown Client");
    }
}
