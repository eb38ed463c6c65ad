use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::currency::format_inr_whole;
use crate::models::{Expense, Invoice, PaymentStatus};
use crate::stats::DashboardStats;

// Represents the state of the post-login dashboard screen
pub struct DashboardState {
    user_name: String,
    stats: DashboardStats,
    recent_invoices: Vec<Invoice>,
    recent_expenses: Vec<Expense>,
}

impl DashboardState {
    pub fn new(
        user_name: String,
        stats: DashboardStats,
        recent_invoices: Vec<Invoice>,
        recent_expenses: Vec<Expense>,
    ) -> Self {
        Self {
            user_name,
            stats,
            recent_invoices,
            recent_expenses,
        }
    }
}

pub enum DashboardAction {
    Firms,
    Clients,
    Invoices,
    Expenses,
    Logout,
    Exit,
}

pub fn render_dashboard<B: Backend>(frame: &mut Frame<B>, state: &mut DashboardState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(4), // Welcome
                Constraint::Length(4), // Stat tiles
                Constraint::Min(6),    // Recent activity
                Constraint::Length(3), // Navigation
            ]
            .as_ref(),
        )
        .split(size);

    let welcome = Paragraph::new(vec![
        Spans::from(Span::styled(
            format!("Welcome back, {}", state.user_name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Spans::from(format!(
            "{} firms · {} clients · {} invoices",
            state.stats.total_firms, state.stats.total_clients, state.stats.total_invoices
        )),
    ])
    .block(Block::default().title("Dashboard").borders(Borders::ALL));
    frame.render_widget(welcome, chunks[0]);

    render_stat_tiles(frame, state, chunks[1]);
    render_recents(frame, state, chunks[2]);

    let nav = Paragraph::new(
        "<F> Firms | <C> Clients | <I> Invoices | <E> Expenses | <L> Logout | <Q> Quit",
    )
    .block(Block::default().borders(Borders::TOP))
    .style(Style::default().fg(Color::White));
    frame.render_widget(nav, chunks[3]);
}

fn render_stat_tiles<B: Backend>(frame: &mut Frame<B>, state: &mut DashboardState, area: Rect) {
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ]
            .as_ref(),
        )
        .split(area);

    let stats = &state.stats;
    let values = [
        ("Total Revenue", format_inr_whole(stats.total_revenue)),
        ("Pending Amount", format_inr_whole(stats.pending_amount)),
        ("This Month", format_inr_whole(stats.this_month_revenue)),
        ("Expenses", format_inr_whole(stats.total_expenses)),
    ];

    for (i, (title, value)) in values.iter().enumerate() {
        let tile = Paragraph::new(Spans::from(vec![Span::styled(
            value.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )]))
        .block(Block::default().title(*title).borders(Borders::ALL));
        frame.render_widget(tile, tiles[i]);
    }
}

fn render_recents<B: Backend>(frame: &mut Frame<B>, state: &mut DashboardState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    let invoice_items: Vec<ListItem> = if state.recent_invoices.is_empty() {
        vec![ListItem::new("No invoices yet")]
    } else {
        state
            .recent_invoices
            .iter()
            .map(|inv| {
                let status_style = match inv.payment_status {
                    PaymentStatus::Paid => Style::default().fg(Color::Green),
                    PaymentStatus::Partial => Style::default().fg(Color::Blue),
                    PaymentStatus::Pending => Style::default().fg(Color::Yellow),
                };
                ListItem::new(Spans::from(vec![
                    Span::raw(format!(
                        "{}  {}  ",
                        inv.invoice_number,
                        format_inr_whole(inv.grand_total)
                    )),
                    Span::styled(inv.payment_status.label(), status_style),
                ]))
            })
            .collect()
    };

    let invoices_title = format!("Recent Invoices ({} total)", state.stats.total_invoices);
    let invoices_list = List::new(invoice_items)
        .block(Block::default().title(invoices_title).borders(Borders::ALL));
    frame.render_widget(invoices_list, columns[0]);

    let expense_items: Vec<ListItem> = if state.recent_expenses.is_empty() {
        vec![ListItem::new("No expenses yet")]
    } else {
        state
            .recent_expenses
            .iter()
            .map(|exp| {
                ListItem::new(format!(
                    "{}  {}  {}",
                    exp.date.format("%d %b"),
                    exp.description,
                    format_inr_whole(exp.amount)
                ))
            })
            .collect()
    };

    let expenses_list = List::new(expense_items)
        .block(Block::default().title("Recent Expenses").borders(Borders::ALL));
    frame.render_widget(expenses_list, columns[1]);
}

pub fn handle_input(_state: &mut DashboardState) -> Result<Option<DashboardAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Char('f') => return Ok(Some(DashboardAction::Firms)),
            KeyCode::Char('c') => return Ok(Some(DashboardAction::Clients)),
            KeyCode::Char('i') => return Ok(Some(DashboardAction::Invoices)),
            KeyCode::Char('e') => return Ok(Some(DashboardAction::Expenses)),
            KeyCode::Char('l') => return Ok(Some(DashboardAction::Logout)),
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Some(DashboardAction::Exit)),
            _ => {}
        }
    }
    Ok(None)
}
