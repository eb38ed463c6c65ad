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

use crate::models::Firm;

// Represents the state of the firms table screen
pub struct FirmsState {
    firms: Vec<Firm>,
    table_state: TableState,
    search: String,
    searching: bool,
    show_delete_confirmation: bool,
    notice: Option<String>,
}

impl FirmsState {
    pub fn new(firms: Vec<Firm>) -> Self {
        let mut table_state = TableState::default();
        if !firms.is_empty() {
            table_state.select(Some(0));
        }

        Self {
            firms,
            table_state,
            search: String::new(),
            searching: false,
            show_delete_confirmation: false,
            notice: None,
        }
    }

    /// Storage failures surface here instead of crashing the screen.
    pub fn set_notice(&mut self, message: String) {
        self.notice = Some(message);
    }

    fn filtered(&self) -> Vec<&Firm> {
        if self.search.is_empty() {
            return self.firms.iter().collect();
        }
        let needle = self.search.to_lowercase();
        self.firms
            .iter()
            .filter(|f| {
                f.name.to_lowercase().contains(&needle)
                    || f.proprietor.to_lowercase().contains(&needle)
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

    pub fn selected_firm_id(&self) -> Option<String> {
        self.table_state
            .selected()
            .and_then(|i| self.filtered().get(i).map(|f| f.id.clone()))
    }

    fn reset_selection(&mut self) {
        if self.filtered().is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(0));
        }
    }
}

pub enum FirmAction {
    Back,
    NewFirm,
    EditFirm(String),
    DeleteFirm(String),
}

pub fn render_firms<B: Backend>(frame: &mut Frame<B>, state: &mut FirmsState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    // Search bar
    let search_text = if state.searching {
        format!("Search: {}|", state.search)
    } else if state.search.is_empty() {
        "Search: (press / to search)".to_string()
    } else {
        format!("Search: {}", state.search)
    };
    let search = Paragraph::new(search_text)
        .style(if state.searching {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(search, chunks[0]);

    // Firms table
    let header_cells = ["Name", "Proprietor", "Phone", "GSTIN"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let filtered = state.filtered();
    let rows = filtered.iter().map(|firm| {
        let cells = vec![
            Cell::from(firm.name.clone()),
            Cell::from(firm.proprietor.clone()),
            Cell::from(firm.phone.clone()),
            Cell::from(firm.gst_number.clone().unwrap_or_default()),
        ];
        Row::new(cells).height(1)
    });

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Firms").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Percentage(35),
            Constraint::Percentage(30),
            Constraint::Percentage(15),
            Constraint::Percentage(20),
        ]);

    frame.render_stateful_widget(table, chunks[1], &mut state.table_state);

    // Buttons
    let buttons_text = if state.selected_firm_id().is_some() {
        "<N> New Firm | <E> Edit Firm | <D> Delete Firm | </> Search | <Esc> Back"
    } else {
        "<N> New Firm | </> Search | <Esc> Back"
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
        Spans::from("Are you sure you want to delete this firm?"),
        Spans::from(""),
        Spans::from("Its invoices and expenses will also be deleted."),
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
    .style(Style::default().fg(Color::Red).bg(Color::Black));

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

pub fn handle_input(state: &mut FirmsState) -> Result<Option<FirmAction>> {
    if let Event::Key(key) = event::read()? {
        // Any key dismisses an error notice
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
                    return Ok(Some(FirmAction::Back));
                }
            }
            KeyCode::Char('/') => {
                if !state.show_delete_confirmation {
                    state.searching = true;
                }
            }
            KeyCode::Char('n') => {
                if state.show_delete_confirmation {
                    state.show_delete_confirmation = false;
                } else {
                    return Ok(Some(FirmAction::NewFirm));
                }
            }
            KeyCode::Char('e') => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_firm_id() {
                        return Ok(Some(FirmAction::EditFirm(id)));
                    }
                }
            }
            KeyCode::Char('d') => {
                if !state.show_delete_confirmation && state.selected_firm_id().is_some() {
                    state.show_delete_confirmation = true;
                }
            }
            KeyCode::Char('y') => {
                if state.show_delete_confirmation {
                    if let Some(id) = state.selected_firm_id() {
                        state.show_delete_confirmation = false;
                        return Ok(Some(FirmAction::DeleteFirm(id)));
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
