use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Clone, Copy, PartialEq)]
pub enum LoginField {
    Email,
    Password,
}

// Represents the state of the sign-in screen
pub struct LoginState {
    pub email: String,
    password: String,
    pub current_field: LoginField,
    pub error: Option<String>,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            current_field: LoginField::Email,
            error: None,
        }
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.password.clear();
        self.current_field = LoginField::Email;
    }

    pub fn credentials(&self) -> (&str, &str) {
        (&self.email, &self.password)
    }

    fn handle_char(&mut self, c: char) {
        match self.current_field {
            LoginField::Email => self.email.push(c),
            LoginField::Password => self.password.push(c),
        }
    }

    fn handle_backspace(&mut self) {
        match self.current_field {
            LoginField::Email => {
                self.email.pop();
            }
            LoginField::Password => {
                self.password.pop();
            }
        }
    }
}

pub enum LoginAction {
    Exit,
    Submit,
}

pub fn render_login<B: Backend>(frame: &mut Frame<B>, state: &mut LoginState) {
    let size = frame.size();
    let area = centered_rect(50, 45, size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Title
                Constraint::Length(3), // Email
                Constraint::Length(3), // Password
                Constraint::Length(2), // Error
                Constraint::Length(2), // Hint
            ]
            .as_ref(),
        )
        .split(area);

    let outer = Block::default().title("Sign In").borders(Borders::ALL);
    frame.render_widget(outer, area);

    let title = Paragraph::new("Business Manager")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(title, chunks[0]);

    let email_style = if state.current_field == LoginField::Email {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let email_cursor = if state.current_field == LoginField::Email {
        "|"
    } else {
        ""
    };
    let email = Paragraph::new(Spans::from(vec![
        Span::styled("Email: ", email_style),
        Span::raw(format!("{}{}", state.email, email_cursor)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(email, chunks[1]);

    let password_style = if state.current_field == LoginField::Password {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let password_cursor = if state.current_field == LoginField::Password {
        "|"
    } else {
        ""
    };
    let masked = "*".repeat(state.password.chars().count());
    let password = Paragraph::new(Spans::from(vec![
        Span::styled("Password: ", password_style),
        Span::raw(format!("{}{}", masked, password_cursor)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(password, chunks[2]);

    if let Some(error) = &state.error {
        let error_msg = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(error_msg, chunks[3]);
    }

    let hint = Paragraph::new("Demo: jogendra@email.com / demo123  |  Tab - Switch | Enter - Next | Esc - Quit")
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(hint, chunks[4]);
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

pub fn handle_input(state: &mut LoginState) -> Result<Option<LoginAction>> {
    state.error = None;

    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                return Ok(Some(LoginAction::Exit));
            }
            KeyCode::Tab => {
                state.current_field = match state.current_field {
                    LoginField::Email => LoginField::Password,
                    LoginField::Password => LoginField::Email,
                };
            }
            KeyCode::Enter => match state.current_field {
                // Enter walks email -> password -> submit.
                LoginField::Email => {
                    state.current_field = LoginField::Password;
                }
                LoginField::Password => {
                    return Ok(Some(LoginAction::Submit));
                }
            },
            KeyCode::Char(c) => {
                state.handle_char(c);
            }
            KeyCode::Backspace => {
                state.handle_backspace();
            }
            _ => {}
        }
    }

    Ok(None)
}
