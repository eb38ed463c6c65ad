use anyhow::Result;
use chrono::{Local, Utc};
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::currency::format_inr;
use crate::models::{Client, Firm, Invoice, PaymentStatus, UNITS};
use crate::tax::{self, GstRate, InvoiceTotals};
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::select_input::{SelectOption, SelectState};

pub enum InvoiceWizardAction {
    Cancel,
    Save(Invoice),
}

#[derive(Clone, PartialEq, Copy)]
pub enum InvoiceField {
    InvoiceNumber,
    Firm,
    Client,
    InvoiceDate,
    Description,
    SacCode,
    Unit,
    Rate,
    Quantity,
    GstRate,
    ExtraCharges,
    ExtraDeductions,
}

pub struct InvoiceWizardState {
    existing: Option<Invoice>,
    invoice_number: String,
    firm_select: SelectState,
    client_select: SelectState,
    date_state: DateInputState,
    description: String,
    sac_code: String,
    unit_select: SelectState,
    rate_input: String,
    quantity_input: String,
    gst_select: SelectState,
    extra_charges_input: String,
    extra_deductions_input: String,
    totals: InvoiceTotals,
    pub current_field: InvoiceField,
    pub editing: bool,
    pub show_error: Option<String>,
}

fn firm_options(firms: &[Firm]) -> Vec<SelectOption> {
    firms
        .iter()
        .map(|f| SelectOption::new(f.id.clone(), f.name.clone()))
        .collect()
}

fn client_options(clients: &[Client]) -> Vec<SelectOption> {
    clients
        .iter()
        .map(|c| SelectOption::new(c.id.clone(), c.name.clone()))
        .collect()
}

fn unit_options() -> Vec<SelectOption> {
    UNITS.iter().map(|u| SelectOption::plain(*u)).collect()
}

fn gst_options() -> Vec<SelectOption> {
    GstRate::ALL
        .iter()
        .map(|r| SelectOption::new(u8::from(*r).to_string(), r.label()))
        .collect()
}

impl InvoiceWizardState {
    /// `firms` and `clients` populate the selectors; `existing` switches the
    /// wizard into edit mode.
    pub fn new(firms: &[Firm], clients: &[Client], existing: Option<Invoice>) -> Self {
        let mut state = match &existing {
            Some(invoice) => Self {
                invoice_number: invoice.invoice_number.clone(),
                firm_select: SelectState::with_value(firm_options(firms), &invoice.firm_id),
                client_select: SelectState::with_value(client_options(clients), &invoice.client_id),
                date_state: DateInputState::new(invoice.invoice_date),
                description: invoice.description.clone(),
                sac_code: invoice.sac_code.clone().unwrap_or_default(),
                unit_select: SelectState::with_value(unit_options(), &invoice.unit),
                rate_input: format!("{}", invoice.rate),
                quantity_input: format!("{}", invoice.quantity),
                gst_select: SelectState::with_value(
                    gst_options(),
                    &u8::from(invoice.gst_rate).to_string(),
                ),
                extra_charges_input: String::new(),
                extra_deductions_input: String::new(),
                totals: InvoiceTotals::default(),
                current_field: InvoiceField::InvoiceNumber,
                editing: false,
                show_error: None,
                existing,
            },
            None => Self {
                existing: None,
                invoice_number: String::new(),
                firm_select: SelectState::new(firm_options(firms)),
                client_select: SelectState::new(client_options(clients)),
                date_state: DateInputState::new(Local::now().date_naive()),
                description: String::new(),
                sac_code: String::new(),
                // The form opens on the original's defaults: Hours at 18%.
                unit_select: SelectState::with_value(unit_options(), "Hours"),
                gst_select: SelectState::with_value(gst_options(), "18"),
                rate_input: String::new(),
                quantity_input: String::new(),
                extra_charges_input: String::new(),
                extra_deductions_input: String::new(),
                totals: InvoiceTotals::default(),
                current_field: InvoiceField::InvoiceNumber,
                editing: false,
                show_error: None,
            },
        };

        state.recompute();
        state
    }

    pub fn is_edit(&self) -> bool {
        self.existing.is_some()
    }

    /// Re-derive the tax breakdown from the current inputs. Called after
    /// every keystroke that can change a numeric field, mirroring the
    /// original form's reactive recalculation.
    fn recompute(&mut self) {
        self.totals = tax::compute_totals(
            parse_or_zero(&self.rate_input),
            parse_or_zero(&self.quantity_input),
            self.gst_rate(),
            parse_or_zero(&self.extra_charges_input),
            parse_or_zero(&self.extra_deductions_input),
        );
    }

    pub fn totals(&self) -> &InvoiceTotals {
        &self.totals
    }

    fn gst_rate(&self) -> GstRate {
        self.gst_select
            .value()
            .and_then(|v| v.parse::<u8>().ok())
            .and_then(|p| GstRate::try_from(p).ok())
            .unwrap_or(GstRate::Eighteen)
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;

        match self.current_field {
            InvoiceField::Firm => self.firm_select.toggle_editing(),
            InvoiceField::Client => self.client_select.toggle_editing(),
            InvoiceField::Unit => self.unit_select.toggle_editing(),
            InvoiceField::GstRate => {
                self.gst_select.toggle_editing();
                self.recompute();
            }
            InvoiceField::InvoiceDate => self.date_state.toggle_editing(),
            _ => {}
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            InvoiceField::InvoiceNumber => InvoiceField::Firm,
            InvoiceField::Firm => InvoiceField::Client,
            InvoiceField::Client => InvoiceField::InvoiceDate,
            InvoiceField::InvoiceDate => InvoiceField::Description,
            InvoiceField::Description => InvoiceField::SacCode,
            InvoiceField::SacCode => InvoiceField::Unit,
            InvoiceField::Unit => InvoiceField::Rate,
            InvoiceField::Rate => InvoiceField::Quantity,
            InvoiceField::Quantity => InvoiceField::GstRate,
            InvoiceField::GstRate => InvoiceField::ExtraCharges,
            InvoiceField::ExtraCharges => InvoiceField::ExtraDeductions,
            InvoiceField::ExtraDeductions => InvoiceField::InvoiceNumber,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            InvoiceField::InvoiceNumber => InvoiceField::ExtraDeductions,
            InvoiceField::Firm => InvoiceField::InvoiceNumber,
            InvoiceField::Client => InvoiceField::Firm,
            InvoiceField::InvoiceDate => InvoiceField::Client,
            InvoiceField::Description => InvoiceField::InvoiceDate,
            InvoiceField::SacCode => InvoiceField::Description,
            InvoiceField::Unit => InvoiceField::SacCode,
            InvoiceField::Rate => InvoiceField::Unit,
            InvoiceField::Quantity => InvoiceField::Rate,
            InvoiceField::GstRate => InvoiceField::Quantity,
            InvoiceField::ExtraCharges => InvoiceField::GstRate,
            InvoiceField::ExtraDeductions => InvoiceField::ExtraCharges,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match self.current_field {
            InvoiceField::Firm => self.firm_select.handle_input(key),
            InvoiceField::Client => self.client_select.handle_input(key),
            InvoiceField::Unit => self.unit_select.handle_input(key),
            InvoiceField::GstRate => {
                self.gst_select.handle_input(key);
                self.recompute();
            }
            InvoiceField::InvoiceDate => self.date_state.handle_input(key),
            InvoiceField::InvoiceNumber => edit_text(&mut self.invoice_number, key),
            InvoiceField::Description => edit_text(&mut self.description, key),
            InvoiceField::SacCode => edit_text(&mut self.sac_code, key),
            InvoiceField::Rate => {
                edit_number(&mut self.rate_input, key);
                self.recompute();
            }
            InvoiceField::Quantity => {
                edit_number(&mut self.quantity_input, key);
                self.recompute();
            }
            InvoiceField::ExtraCharges => {
                edit_number(&mut self.extra_charges_input, key);
                self.recompute();
            }
            InvoiceField::ExtraDeductions => {
                edit_number(&mut self.extra_deductions_input, key);
                self.recompute();
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.invoice_number.is_empty()
            && self.firm_select.value().is_some()
            && self.client_select.value().is_some()
            && !self.description.is_empty()
            && parse_or_zero(&self.rate_input) > 0.0
            && parse_or_zero(&self.quantity_input) > 0.0
    }

    /// Snapshot the form into an invoice record. Edit mode keeps the
    /// original payment fields; create mode starts the invoice pending
    /// with the full grand total outstanding.
    pub fn to_invoice(&self) -> Invoice {
        let now = Utc::now();
        let (id, payment_status, paid_amount, created_at) = match &self.existing {
            Some(invoice) => (
                invoice.id.clone(),
                invoice.payment_status,
                invoice.paid_amount,
                invoice.created_at,
            ),
            None => (String::new(), PaymentStatus::Pending, 0.0, now),
        };

        let mut invoice = Invoice {
            id,
            invoice_number: self.invoice_number.clone(),
            firm_id: self.firm_select.value().unwrap_or_default().to_string(),
            client_id: self.client_select.value().unwrap_or_default().to_string(),
            invoice_date: self.date_state.date,
            description: self.description.clone(),
            sac_code: if self.sac_code.is_empty() {
                None
            } else {
                Some(self.sac_code.clone())
            },
            rate: parse_or_zero(&self.rate_input),
            quantity: parse_or_zero(&self.quantity_input),
            unit: self.unit_select.value().unwrap_or("Hours").to_string(),
            gst_rate: self.gst_rate(),
            taxable_amount: 0.0,
            cgst_amount: 0.0,
            sgst_amount: 0.0,
            igst_amount: 0.0,
            grand_total: 0.0,
            payment_status,
            paid_amount,
            pending_amount: 0.0,
            created_at,
            updated_at: now,
        };
        invoice.apply_totals(&self.totals);
        invoice
    }
}

fn edit_text(value: &mut String, key: KeyCode) {
    match key {
        KeyCode::Char(c) => value.push(c),
        KeyCode::Backspace => {
            value.pop();
        }
        _ => {}
    }
}

fn edit_number(value: &mut String, key: KeyCode) {
    match key {
        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => value.push(c),
        KeyCode::Backspace => {
            value.pop();
        }
        _ => {}
    }
}

/// A half-typed number counts as zero while the form is live; submission
/// still requires a positive rate and quantity.
fn parse_or_zero(input: &str) -> f64 {
    input.parse::<f64>().unwrap_or(0.0)
}

pub fn render_invoice_wizard<B: Backend>(f: &mut Frame<B>, state: &mut InvoiceWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(14),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.is_edit() {
        "Edit Invoice"
    } else {
        "Create New Invoice"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    // Form on the left, live calculation summary on the right
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(chunks[1]);

    render_form(f, state, columns[0]);
    render_summary(f, state, columns[1]);

    let help_text = match (state.editing, state.current_field) {
        (
            true,
            InvoiceField::Firm | InvoiceField::Client | InvoiceField::Unit | InvoiceField::GstRate,
        ) => "Left/Right - Change selection | Enter - Done | Esc - Cancel editing",
        (true, InvoiceField::InvoiceDate) => {
            "Left/Right - Date part | Up/Down - Adjust | Enter - Done | Esc - Cancel editing"
        }
        (true, _) => "Enter - Save field | Esc - Cancel editing",
        (false, _) => {
            "Enter - Edit field | Up/Down - Navigate fields | S - Save invoice | Esc - Cancel"
        }
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    if let Some(error) = &state.show_error {
        let error_msg = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .block(Block::default().title("Error").borders(Borders::ALL));
        f.render_widget(error_msg, chunks[2]);
    }
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut InvoiceWizardState, area: Rect) {
    let cursor = |field: InvoiceField, value: &str| -> String {
        if state.current_field == field && state.editing {
            format!("{}|", value)
        } else {
            value.to_string()
        }
    };

    let field_rows: [(&str, String); 12] = [
        (
            "Invoice Number *",
            cursor(InvoiceField::InvoiceNumber, &state.invoice_number),
        ),
        ("Firm *", state.firm_select.display_string()),
        ("Client *", state.client_select.display_string()),
        ("Invoice Date *", state.date_state.display_string()),
        (
            "Description *",
            cursor(InvoiceField::Description, &state.description),
        ),
        ("SAC Code", cursor(InvoiceField::SacCode, &state.sac_code)),
        ("Unit", state.unit_select.display_string()),
        ("Rate (₹) *", cursor(InvoiceField::Rate, &state.rate_input)),
        (
            "Quantity *",
            cursor(InvoiceField::Quantity, &state.quantity_input),
        ),
        ("GST Rate (%)", state.gst_select.display_string()),
        (
            "Extra Charges (₹)",
            cursor(InvoiceField::ExtraCharges, &state.extra_charges_input),
        ),
        (
            "Extra Deductions (₹)",
            cursor(InvoiceField::ExtraDeductions, &state.extra_deductions_input),
        ),
    ];

    let items: Vec<ListItem> = field_rows
        .iter()
        .enumerate()
        .map(|(i, (name, value))| {
            let style = if i == state.current_field as usize {
                if state.editing {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Yellow)
                }
            } else {
                Style::default()
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", name), style),
                Span::raw(value.clone()),
            ]))
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Invoice Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

/// The original form's sticky "Calculation Summary" card: base amount,
/// adjustments, taxable amount, the CGST/SGST half-split and the grand
/// total, all refreshed as the user types.
fn render_summary<B: Backend>(f: &mut Frame<B>, state: &mut InvoiceWizardState, area: Rect) {
    let totals = *state.totals();
    let extra_charges = parse_or_zero(&state.extra_charges_input);
    let extra_deductions = parse_or_zero(&state.extra_deductions_input);
    let base_amount = totals.taxable_amount - extra_charges + extra_deductions;
    let gst_percent = state.gst_rate().percent();

    let mut lines = vec![Spans::from(vec![
        Span::raw("Base Amount:      "),
        Span::raw(format_inr(base_amount)),
    ])];

    if extra_charges > 0.0 {
        lines.push(Spans::from(vec![
            Span::raw("Extra Charges:    "),
            Span::styled(
                format!("+{}", format_inr(extra_charges)),
                Style::default().fg(Color::Green),
            ),
        ]));
    }
    if extra_deductions > 0.0 {
        lines.push(Spans::from(vec![
            Span::raw("Deductions:       "),
            Span::styled(
                format!("-{}", format_inr(extra_deductions)),
                Style::default().fg(Color::Red),
            ),
        ]));
    }

    lines.push(Spans::from(vec![
        Span::raw("Taxable Amount:   "),
        Span::raw(format_inr(totals.taxable_amount)),
    ]));

    if totals.cgst_amount != 0.0 {
        lines.push(Spans::from(vec![
            Span::raw(format!("CGST ({}%):     ", gst_percent / 2.0)),
            Span::raw(format_inr(totals.cgst_amount)),
        ]));
        lines.push(Spans::from(vec![
            Span::raw(format!("SGST ({}%):     ", gst_percent / 2.0)),
            Span::raw(format_inr(totals.sgst_amount)),
        ]));
    }
    if totals.igst_amount != 0.0 {
        lines.push(Spans::from(vec![
            Span::raw(format!("IGST ({}%):     ", gst_percent)),
            Span::raw(format_inr(totals.igst_amount)),
        ]));
    }

    lines.push(Spans::from(""));
    lines.push(Spans::from(vec![
        Span::styled(
            "Total Amount:     ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format_inr(totals.grand_total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]));

    let summary = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Calculation Summary"),
    );

    f.render_widget(summary, area);
}

pub fn handle_input(state: &mut InvoiceWizardState) -> Result<Option<InvoiceWizardAction>> {
    state.show_error = None;

    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(InvoiceWizardAction::Cancel));
                }
            }
            KeyCode::Enter => {
                state.toggle_editing();
            }
            KeyCode::Up if !state.editing => {
                state.previous_field();
            }
            KeyCode::Down if !state.editing => {
                state.next_field();
            }
            KeyCode::Char('s') if !state.editing => {
                if state.is_valid() {
                    return Ok(Some(InvoiceWizardAction::Save(state.to_invoice())));
                } else {
                    state.show_error = Some(
                        "Invoice number, firm, client, description, rate and quantity are required."
                            .to_string(),
                    );
                }
            }
            _ if state.editing => {
                state.edit_current_field(key.code);
            }
            _ => {}
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn firms() -> Vec<Firm> {
        vec![Firm {
            id: "f1".to_string(),
            name: "MAA DURGA ENGINEERING".to_string(),
            description: String::new(),
            gst_number: None,
            permanent_address: String::new(),
            present_address: String::new(),
            phone: "9".to_string(),
            proprietor: "P".to_string(),
            account_number: None,
            ifsc_code: None,
            letterhead_type: "template".to_string(),
            letterhead_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }]
    }

    fn clients() -> Vec<Client> {
        vec![Client {
            id: "c1".to_string(),
            name: "U.K. ENTERPRISES".to_string(),
            address: String::new(),
            phone: "9".to_string(),
            email: "a@b.c".to_string(),
            gst_number: None,
            state: "Odisha".to_string(),
            pincode: "758034".to_string(),
            created_at: Utc::now(),
        }]
    }

    fn type_into(state: &mut InvoiceWizardState, text: &str) {
        for c in text.chars() {
            state.edit_current_field(KeyCode::Char(c));
        }
    }

    #[test]
    fn totals_follow_the_typed_inputs() {
        let mut state = InvoiceWizardState::new(&firms(), &clients(), None);

        state.editing = true;
        state.current_field = InvoiceField::Rate;
        type_into(&mut state, "2000");
        state.current_field = InvoiceField::Quantity;
        type_into(&mut state, "88.9");

        let totals = state.totals();
        assert!((totals.taxable_amount - 177_800.0).abs() < 1e-6);
        assert!((totals.grand_total - 209_804.0).abs() < 1e-6);
    }

    #[test]
    fn new_invoice_starts_pending_with_full_amount_outstanding() {
        let mut state = InvoiceWizardState::new(&firms(), &clients(), None);
        state.editing = true;
        state.current_field = InvoiceField::InvoiceNumber;
        type_into(&mut state, "T/1");
        state.current_field = InvoiceField::Description;
        type_into(&mut state, "Services");
        state.current_field = InvoiceField::Rate;
        type_into(&mut state, "50000");
        state.current_field = InvoiceField::Quantity;
        type_into(&mut state, "1");
        state.editing = false;

        // Firm and client come from the selectors.
        state.current_field = InvoiceField::Firm;
        state.toggle_editing();
        state.toggle_editing();
        state.current_field = InvoiceField::Client;
        state.toggle_editing();
        state.toggle_editing();

        assert!(state.is_valid());
        let invoice = state.to_invoice();
        assert_eq!(invoice.firm_id, "f1");
        assert_eq!(invoice.client_id, "c1");
        assert_eq!(invoice.payment_status, PaymentStatus::Pending);
        assert_eq!(invoice.paid_amount, 0.0);
        assert_eq!(invoice.pending_amount, invoice.grand_total);
    }

    #[test]
    fn editing_preserves_payment_fields_and_rebalances_pending() {
        let existing = Invoice {
            id: "i1".to_string(),
            invoice_number: "T/1".to_string(),
            firm_id: "f1".to_string(),
            client_id: "c1".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            description: "Services".to_string(),
            sac_code: None,
            rate: 1000.0,
            quantity: 1.0,
            unit: "Job".to_string(),
            gst_rate: GstRate::Exempt,
            taxable_amount: 1000.0,
            cgst_amount: 0.0,
            sgst_amount: 0.0,
            igst_amount: 0.0,
            grand_total: 1000.0,
            payment_status: PaymentStatus::Partial,
            paid_amount: 400.0,
            pending_amount: 600.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut state = InvoiceWizardState::new(&firms(), &clients(), Some(existing));
        state.editing = true;
        state.current_field = InvoiceField::Rate;
        // 1000 -> 2000
        state.edit_current_field(KeyCode::Backspace);
        state.edit_current_field(KeyCode::Backspace);
        state.edit_current_field(KeyCode::Backspace);
        state.edit_current_field(KeyCode::Backspace);
        type_into(&mut state, "2000");

        let invoice = state.to_invoice();
        assert_eq!(invoice.id, "i1");
        assert_eq!(invoice.payment_status, PaymentStatus::Partial);
        assert_eq!(invoice.paid_amount, 400.0);
        assert_eq!(invoice.grand_total, 2000.0);
        assert_eq!(invoice.pending_amount, 1600.0);
    }
}
