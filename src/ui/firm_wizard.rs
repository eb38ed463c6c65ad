use anyhow::Result;
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::Firm;

pub enum FirmWizardAction {
    Cancel,
    Save(Firm),
}

#[derive(Clone, PartialEq, Copy)]
pub enum FirmField {
    Name,
    Proprietor,
    Description,
    Phone,
    GstNumber,
    PermanentAddress,
    PresentAddress,
    AccountNumber,
    IfscCode,
}

pub struct FirmWizardState {
    pub firm: Firm,
    pub current_field: FirmField,
    pub editing: bool,
    pub show_error: Option<String>,
}

impl FirmWizardState {
    pub fn new() -> Self {
        Self {
            firm: Firm {
                id: String::new(),
                name: String::new(),
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
            },
            current_field: FirmField::Name,
            editing: false,
            show_error: None,
        }
    }

    pub fn from_existing(firm: Firm) -> Self {
        Self {
            firm,
            current_field: FirmField::Name,
            editing: false,
            show_error: None,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            FirmField::Name => FirmField::Proprietor,
            FirmField::Proprietor => FirmField::Description,
            FirmField::Description => FirmField::Phone,
            FirmField::Phone => FirmField::GstNumber,
            FirmField::GstNumber => FirmField::PermanentAddress,
            FirmField::PermanentAddress => FirmField::PresentAddress,
            FirmField::PresentAddress => FirmField::AccountNumber,
            FirmField::AccountNumber => FirmField::IfscCode,
            FirmField::IfscCode => FirmField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            FirmField::Name => FirmField::IfscCode,
            FirmField::Proprietor => FirmField::Name,
            FirmField::Description => FirmField::Proprietor,
            FirmField::Phone => FirmField::Description,
            FirmField::GstNumber => FirmField::Phone,
            FirmField::PermanentAddress => FirmField::GstNumber,
            FirmField::PresentAddress => FirmField::PermanentAddress,
            FirmField::AccountNumber => FirmField::PresentAddress,
            FirmField::IfscCode => FirmField::AccountNumber,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field_value = match self.current_field {
            FirmField::Name => &mut self.firm.name,
            FirmField::Proprietor => &mut self.firm.proprietor,
            FirmField::Description => &mut self.firm.description,
            FirmField::Phone => &mut self.firm.phone,
            FirmField::GstNumber => self.firm.gst_number.get_or_insert_with(String::new),
            FirmField::PermanentAddress => &mut self.firm.permanent_address,
            FirmField::PresentAddress => &mut self.firm.present_address,
            FirmField::AccountNumber => self.firm.account_number.get_or_insert_with(String::new),
            FirmField::IfscCode => self.firm.ifsc_code.get_or_insert_with(String::new),
        };

        match key {
            KeyCode::Char(c) => {
                field_value.push(c);
            }
            KeyCode::Backspace => {
                field_value.pop();
            }
            _ => {}
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.firm.name.is_empty() && !self.firm.proprietor.is_empty() && !self.firm.phone.is_empty()
    }

    /// The saved record keeps cleared optional fields as absent, not as
    /// empty strings.
    pub fn to_firm(&self) -> Firm {
        let mut firm = self.firm.clone();
        firm.gst_number = firm.gst_number.take().filter(|s| !s.is_empty());
        firm.account_number = firm.account_number.take().filter(|s| !s.is_empty());
        firm.ifsc_code = firm.ifsc_code.take().filter(|s| !s.is_empty());
        firm
    }
}

pub fn render_firm_wizard<B: Backend>(f: &mut Frame<B>, state: &mut FirmWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(11),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.firm.id.is_empty() {
        "New Firm"
    } else {
        "Edit Firm"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = if state.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save firm | Esc - Cancel"
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

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut FirmWizardState, area: Rect) {
    let field_names = [
        "Name *",
        "Proprietor *",
        "Description",
        "Phone *",
        "GST Number",
        "Permanent Address",
        "Present Address",
        "Account Number",
        "IFSC Code",
    ];

    let empty_string = String::new();

    let field_values = [
        &state.firm.name,
        &state.firm.proprietor,
        &state.firm.description,
        &state.firm.phone,
        state.firm.gst_number.as_ref().unwrap_or(&empty_string),
        &state.firm.permanent_address,
        &state.firm.present_address,
        state.firm.account_number.as_ref().unwrap_or(&empty_string),
        state.firm.ifsc_code.as_ref().unwrap_or(&empty_string),
    ];

    let items: Vec<ListItem> = field_names
        .iter()
        .zip(field_values.iter())
        .enumerate()
        .map(|(i, (name, value))| {
            let content = if i == state.current_field as usize && state.editing {
                Spans::from(vec![
                    Span::styled(format!("{}: ", name), Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{}|", value),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                let style = if i == state.current_field as usize {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };

                Spans::from(vec![
                    Span::styled(format!("{}: ", name), style),
                    Span::raw(value.as_str()),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Firm Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut FirmWizardState) -> Result<Option<FirmWizardAction>> {
    state.show_error = None;

    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(FirmWizardAction::Cancel));
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
                    return Ok(Some(FirmWizardAction::Save(state.to_firm())));
                } else {
                    state.show_error =
                        Some("Name, proprietor and phone are required.".to_string());
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
