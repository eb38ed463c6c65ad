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

use crate::models::{Client, INDIAN_STATES};
use crate::ui::components::select_input::{SelectOption, SelectState};

pub enum ClientWizardAction {
    Cancel,
    Save(Client),
}

#[derive(Clone, PartialEq, Copy)]
pub enum ClientField {
    Name,
    Phone,
    Email,
    Address,
    State,
    Pincode,
    GstNumber,
}

pub struct ClientWizardState {
    pub client: Client,
    pub current_field: ClientField,
    pub editing: bool,
    pub show_error: Option<String>,
    state_select: SelectState,
}

fn state_options() -> Vec<SelectOption> {
    INDIAN_STATES.iter().map(|s| SelectOption::plain(*s)).collect()
}

impl ClientWizardState {
    pub fn new() -> Self {
        Self {
            client: Client {
                id: String::new(),
                name: String::new(),
                address: String::new(),
                phone: String::new(),
                email: String::new(),
                gst_number: None,
                state: String::new(),
                pincode: String::new(),
                created_at: Utc::now(),
            },
            current_field: ClientField::Name,
            editing: false,
            show_error: None,
            state_select: SelectState::new(state_options()),
        }
    }

    pub fn from_existing(client: Client) -> Self {
        let state_select = SelectState::with_value(state_options(), &client.state);
        Self {
            client,
            current_field: ClientField::Name,
            editing: false,
            show_error: None,
            state_select,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;

        if self.current_field == ClientField::State {
            self.state_select.toggle_editing();
            if !self.editing {
                // Leaving the selector commits the highlighted state.
                if let Some(value) = self.state_select.value() {
                    self.client.state = value.to_string();
                }
            }
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ClientField::Name => ClientField::Phone,
            ClientField::Phone => ClientField::Email,
            ClientField::Email => ClientField::Address,
            ClientField::Address => ClientField::State,
            ClientField::State => ClientField::Pincode,
            ClientField::Pincode => ClientField::GstNumber,
            ClientField::GstNumber => ClientField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ClientField::Name => ClientField::GstNumber,
            ClientField::Phone => ClientField::Name,
            ClientField::Email => ClientField::Phone,
            ClientField::Address => ClientField::Email,
            ClientField::State => ClientField::Address,
            ClientField::Pincode => ClientField::State,
            ClientField::GstNumber => ClientField::Pincode,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        if self.current_field == ClientField::State {
            self.state_select.handle_input(key);
            return;
        }

        let field_value = match self.current_field {
            ClientField::Name => &mut self.client.name,
            ClientField::Phone => &mut self.client.phone,
            ClientField::Email => &mut self.client.email,
            ClientField::Address => &mut self.client.address,
            ClientField::Pincode => &mut self.client.pincode,
            ClientField::GstNumber => self.client.gst_number.get_or_insert_with(String::new),
            ClientField::State => return,
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
        !self.client.name.is_empty()
            && !self.client.phone.is_empty()
            && !self.client.email.is_empty()
            && !self.client.state.is_empty()
    }

    pub fn to_client(&self) -> Client {
        let mut client = self.client.clone();
        client.gst_number = client.gst_number.take().filter(|s| !s.is_empty());
        client
    }
}

pub fn render_client_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(9),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.client.id.is_empty() {
        "New Client"
    } else {
        "Edit Client"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = match (state.editing, state.current_field) {
        (true, ClientField::State) => "Left/Right - Change state | Enter - Done | Esc - Cancel editing",
        (true, _) => "Enter - Save field | Esc - Cancel editing",
        (false, _) => "Enter - Edit field | Up/Down - Navigate fields | S - Save client | Esc - Cancel",
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

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState, area: Rect) {
    let empty_string = String::new();

    let state_value = if state.current_field == ClientField::State && state.editing {
        state.state_select.display_string()
    } else {
        state.client.state.clone()
    };

    let field_rows: [(&str, &str); 7] = [
        ("Name *", state.client.name.as_str()),
        ("Phone *", state.client.phone.as_str()),
        ("Email *", state.client.email.as_str()),
        ("Address", state.client.address.as_str()),
        ("State *", state_value.as_str()),
        ("Pincode", state.client.pincode.as_str()),
        (
            "GST Number",
            state
                .client
                .gst_number
                .as_ref()
                .unwrap_or(&empty_string)
                .as_str(),
        ),
    ];

    let items: Vec<ListItem> = field_rows
        .iter()
        .enumerate()
        .map(|(i, (name, value))| {
            let content = if i == state.current_field as usize && state.editing {
                let cursor = if state.current_field == ClientField::State {
                    ""
                } else {
                    "|"
                };
                Spans::from(vec![
                    Span::styled(format!("{}: ", name), Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{}{}", value, cursor),
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
                    Span::raw(*value),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Client Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ClientWizardState) -> Result<Option<ClientWizardAction>> {
    state.show_error = None;

    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(ClientWizardAction::Cancel));
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
                    return Ok(Some(ClientWizardAction::Save(state.to_client())));
                } else {
                    state.show_error =
                        Some("Name, phone, email and state are required.".to_string());
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
