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

use crate::models::{Expense, Firm, EXPENSE_CATEGORIES};
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::select_input::{SelectOption, SelectState};

pub enum ExpenseWizardAction {
    Cancel,
    Save(Expense),
}

#[derive(Clone, PartialEq, Copy)]
pub enum ExpenseField {
    Firm,
    Date,
    Description,
    Category,
    Amount,
}

pub struct ExpenseWizardState {
    existing_id: Option<String>,
    created_at: chrono::DateTime<Utc>,
    firm_select: SelectState,
    date_state: DateInputState,
    description: String,
    category_select: SelectState,
    amount_input: String,
    pub current_field: ExpenseField,
    pub editing: bool,
    pub show_error: Option<String>,
}

fn category_options() -> Vec<SelectOption> {
    EXPENSE_CATEGORIES
        .iter()
        .map(|c| SelectOption::plain(*c))
        .collect()
}

fn firm_options(firms: &[Firm]) -> Vec<SelectOption> {
    firms
        .iter()
        .map(|f| SelectOption::new(f.id.clone(), f.name.clone()))
        .collect()
}

impl ExpenseWizardState {
    /// `firms` is the list the signed-in user may book expenses against.
    pub fn new(firms: &[Firm]) -> Self {
        Self {
            existing_id: None,
            created_at: Utc::now(),
            firm_select: SelectState::new(firm_options(firms)),
            date_state: DateInputState::new(Local::now().date_naive()),
            description: String::new(),
            category_select: SelectState::new(category_options()),
            amount_input: String::new(),
            current_field: ExpenseField::Firm,
            editing: false,
            show_error: None,
        }
    }

    pub fn from_existing(firms: &[Firm], expense: Expense) -> Self {
        Self {
            existing_id: Some(expense.id.clone()),
            created_at: expense.created_at,
            firm_select: SelectState::with_value(firm_options(firms), &expense.firm_id),
            date_state: DateInputState::new(expense.date),
            description: expense.description,
            category_select: SelectState::with_value(category_options(), &expense.category),
            amount_input: format!("{}", expense.amount),
            current_field: ExpenseField::Firm,
            editing: false,
            show_error: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.existing_id.is_some()
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;

        match self.current_field {
            ExpenseField::Firm => self.firm_select.toggle_editing(),
            ExpenseField::Category => self.category_select.toggle_editing(),
            ExpenseField::Date => self.date_state.toggle_editing(),
            _ => {}
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ExpenseField::Firm => ExpenseField::Date,
            ExpenseField::Date => ExpenseField::Description,
            ExpenseField::Description => ExpenseField::Category,
            ExpenseField::Category => ExpenseField::Amount,
            ExpenseField::Amount => ExpenseField::Firm,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ExpenseField::Firm => ExpenseField::Amount,
            ExpenseField::Date => ExpenseField::Firm,
            ExpenseField::Description => ExpenseField::Date,
            ExpenseField::Category => ExpenseField::Description,
            ExpenseField::Amount => ExpenseField::Category,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match self.current_field {
            ExpenseField::Firm => self.firm_select.handle_input(key),
            ExpenseField::Category => self.category_select.handle_input(key),
            ExpenseField::Date => self.date_state.handle_input(key),
            ExpenseField::Description => match key {
                KeyCode::Char(c) => self.description.push(c),
                KeyCode::Backspace => {
                    self.description.pop();
                }
                _ => {}
            },
            ExpenseField::Amount => match key {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => self.amount_input.push(c),
                KeyCode::Backspace => {
                    self.amount_input.pop();
                }
                _ => {}
            },
        }
    }

    fn amount(&self) -> f64 {
        self.amount_input.parse::<f64>().unwrap_or(0.0)
    }

    pub fn is_valid(&self) -> bool {
        self.firm_select.value().is_some()
            && !self.description.is_empty()
            && self.category_select.value().is_some()
            && self.amount() > 0.0
    }

    pub fn to_expense(&self) -> Expense {
        Expense {
            id: self.existing_id.clone().unwrap_or_default(),
            firm_id: self.firm_select.value().unwrap_or_default().to_string(),
            description: self.description.clone(),
            amount: self.amount(),
            category: self.category_select.value().unwrap_or_default().to_string(),
            date: self.date_state.date,
            created_at: self.created_at,
        }
    }
}

pub fn render_expense_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ExpenseWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(7),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.is_edit() {
        "Edit Expense"
    } else {
        "New Expense"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = match (state.editing, state.current_field) {
        (true, ExpenseField::Firm | ExpenseField::Category) => {
            "Left/Right - Change selection | Enter - Done | Esc - Cancel editing"
        }
        (true, ExpenseField::Date) => {
            "Left/Right - Date part | Up/Down - Adjust | Enter - Done | Esc - Cancel editing"
        }
        (true, _) => "Enter - Save field | Esc - Cancel editing",
        (false, _) => "Enter - Edit field | Up/Down - Navigate fields | S - Save expense | Esc - Cancel",
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

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut ExpenseWizardState, area: Rect) {
    let amount_value = if state.current_field == ExpenseField::Amount && state.editing {
        format!("{}|", state.amount_input)
    } else {
        state.amount_input.clone()
    };
    let description_value = if state.current_field == ExpenseField::Description && state.editing {
        format!("{}|", state.description)
    } else {
        state.description.clone()
    };

    let field_rows: [(&str, String); 5] = [
        ("Firm *", state.firm_select.display_string()),
        ("Date *", state.date_state.display_string()),
        ("Description *", description_value),
        ("Category *", state.category_select.display_string()),
        ("Amount (₹) *", amount_value),
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
        .block(Block::default().borders(Borders::ALL).title("Expense Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ExpenseWizardState) -> Result<Option<ExpenseWizardAction>> {
    state.show_error = None;

    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(ExpenseWizardAction::Cancel));
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
                    return Ok(Some(ExpenseWizardAction::Save(state.to_expense())));
                } else {
                    state.show_error = Some(
                        "Firm, description, category and a positive amount are required."
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
