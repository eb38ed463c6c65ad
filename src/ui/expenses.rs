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
use crate::models::{Expense, Firm, EXPENSE_CATEGORIES};

// Represents the state of the expenses table screen
pub struct ExpensesState {
    expenses: Vec<Expense>,
    firms: Vec<Firm>,
    table_state: TableState,
    search: String,
    searching: bool,
    // None = all categories, otherwise an index into EXPENSE_CATEGORIES
    category_filter: Option<usize>,
    show_delete_confirmation: bool,
    notice: Option<String>,
}

impl ExpensesState {
    pub fn new(expenses: Vec<Expense>, firms: Vec<Firm>) -> Self {
        let mut table_state = TableState::default();
        if !expenses.is_empty() {
            table_state.select(Some(0));
        }

        Self {
            expenses,
            firms,
            table_state,
            search: String::new(),
            searching: false,
            category_filter: None,
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

    fn category_label(&self) -> &'static str {
        match self.category_filter {
            Some(i) => EXPENSE_CATEGORIES[i],
            None => "All Categories",
        }
    }

    fn filtered(&self) -> Vec<&Expense> {
        let needle = self.search.to_lowercase();
        self.expenses
            .iter()
            .filter(|exp| match self.category_filter {
                Some(i) => exp.category == EXPENSE_CATEGORIES[i],
                None => true,
            })
            .filter(|exp| {
                if needle.is_empty() {
                    return true;
                }
                exp.description.to_lowercase().contains(&needle)
                    || exp.category.to_lowercase().contains(&needle)
                    || self.firm_name(&exp.firm_id).to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Running total of the rows currently shown, like the original's
    /// "Total Expenses" card above the list.
    fn filtered_total(&self) -> f64 {
        self.filtered().iter().map(|exp| exp.amount).sum()
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

    pub fn selected_expense_id(&self) -> Option<String> {
        self.table_state
            .selected()
            .and_then(|i| self.filtered().get(i).map(|exp| exp.id.clone()))
    }

    fn reset_selection(&mut self) {
        if self.filtered().is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(0));
        }
    }

    fn cycle_category_filter(&mut self) {
        self.category_filter = match self.category_filter {
            None => Some(0),
            Some(i) if i + 1 < EXPENSE_CATEGORIES.len() => Some(i + 1),
            Some(_) => None,
        };
        self.reset_selection();
    }
}

pub enum ExpenseAction {
    Back,
    NewExpense,
    EditExpense(String),
    DeleteExpense(String),
}

pub fn render_expenses<B: Backend>(frame: &mut Frame<B>, state: &mut ExpensesState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    let search_text = if state.searching {
        format!("Search: {}|", state.search)
    } else if state.search.is_empty() {
        "Search: (press / to search)".to_string()
    } else {
        format!("Search: {}", state.search)
    };
    let header_line = format!(
        "{}    Category: {}    Total: {}",
        search_text,
        state.category_label(),
        format_inr_whole(state.filtered_total()),
    );
    let search = Paragraph::new(header_line)
        .style(if state.searching {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(search, chunks[0]);

    let header_cells = ["Date", "Firm", "Description", "Category", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let filtered = state.filtered();
    let rows = filtered.iter().map(|expense| {
        let cells = vec![
            Cell::from(expense.date.format("%Y-%m-%d").to_string()),
            Cell::from(state.firm_name(&expense.firm_id).to_string()),
            Cell::from(expense.description.clone()),
            Cell::from(expense.category.clone()),
            Cell::from(format_inr_whole(expense.amount)),
        ];
        Row::new(cells).height(1)
    });

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Expenses").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Percentage(14),
            Constraint::Percentage(24),
            Constraint::Percentage(30),
            Constraint::Percentage(16),
            Constraint::Percentage(16),
        ]);

    frame.render_stateful_widget(table, chunks[1], &mut state.table_state);

    let buttons_text = if state.selected_expense_id().is_some() {
        "<N> New Expense | <E> Edit Expense | <D> Delete Expense | <F> Category | </> Search | <Esc> Back"
    } else {
        "<N> New Expense | <F> Category | </> Search | <Esc> Back"
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
        Spans::from("Are you sure you want to delete this expense?"),
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

pub fn handle_input(state: &mut ExpensesState) -> Result<Option<ExpenseAction>> {
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
                    return Ok(Some(ExpenseAction::Back));
                }
            }
            KeyCode::Char('/') => {
                if !state.show_delete_confirmation {
                    state.searching = true;
                }
            }
            KeyCode::Char('f') => {
                if !state.show_delete_confirmation {
                    state.cycle_category_filter();
                }
            }
            KeyCode::Char('n') => {
                if state.show_delete_confirmation {
                    state.show_delete_confirmation = false;
                } else {
                    return Ok(Some(ExpenseAction::NewExpense));
                }
            }
            KeyCode::Char('e') => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_expense_id() {
                        return Ok(Some(ExpenseAction::EditExpense(id)));
                    }
                }
            }
            KeyCode::Char('d') => {
                if !state.show_delete_confirmation && state.selected_expense_id().is_some() {
                    state.show_delete_confirmation = true;
                }
            }
            KeyCode::Char('y') => {
                if state.show_delete_confirmation {
                    if let Some(id) = state.selected_expense_id() {
                        state.show_delete_confirmation = false;
                        return Ok(Some(ExpenseAction::DeleteExpense(id)));
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
    use chrono::{NaiveDate, Utc};

    fn expense(id: &str, category: &str, amount: f64) -> Expense {
        Expense {
            id: id.to_string(),
            firm_id: "f1".to_string(),
            description: "Diesel Payment".to_string(),
            amount,
            category: category.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn category_filter_narrows_the_total() {
        let mut state = ExpensesState::new(
            vec![expense("1", "Fuel", 5000.0), expense("2", "Maintenance", 12_000.0)],
            vec![],
        );

        assert_eq!(state.filtered_total(), 17_000.0);

        // First cycle lands on the first category, Fuel.
        state.cycle_category_filter();
        assert_eq!(state.category_label(), "Fuel");
        assert_eq!(state.filtered_total(), 5000.0);
    }

    #[test]
    fn search_matches_description() {
        let mut state = ExpensesState::new(
            vec![expense("1", "Fuel", 5000.0), expense("2", "Maintenance", 12_000.0)],
            vec![],
        );

        state.search = "diesel".to_string();
        assert_eq!(state.filtered().len(), 2);

        state.search = "nothing".to_string();
        assert!(state.filtered().is_empty());
    }
}
