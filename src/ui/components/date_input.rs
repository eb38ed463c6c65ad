use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Inline year-month-day editor used by the invoice and expense forms.
/// Left/Right moves between parts, Up/Down steps the active part, digits
/// overwrite it. The held date is always valid.
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    part: DatePart,
    buffer: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            part: DatePart::Year,
            buffer: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        self.part = DatePart::Year;
        self.buffer.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Left => {
                self.part = match self.part {
                    DatePart::Year => DatePart::Day,
                    DatePart::Month => DatePart::Year,
                    DatePart::Day => DatePart::Month,
                };
                self.buffer.clear();
            }
            KeyCode::Right => self.advance_part(),
            KeyCode::Up => self.step(1),
            KeyCode::Down => self.step(-1),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                let width = match self.part {
                    DatePart::Year => 4,
                    DatePart::Month | DatePart::Day => 2,
                };
                if self.buffer.len() == width {
                    self.commit_buffer();
                    self.advance_part();
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            _ => {}
        }
    }

    pub fn display_string(&self) -> String {
        if !self.editing {
            return self.date.format("%Y-%m-%d").to_string();
        }

        let render = |part: DatePart, value: String| {
            if part == self.part {
                if self.buffer.is_empty() {
                    format!("[{}]", value)
                } else {
                    format!("[{}]", self.buffer)
                }
            } else {
                value
            }
        };

        format!(
            "{}-{}-{}",
            render(DatePart::Year, format!("{:04}", self.date.year())),
            render(DatePart::Month, format!("{:02}", self.date.month())),
            render(DatePart::Day, format!("{:02}", self.date.day())),
        )
    }

    fn advance_part(&mut self) {
        self.part = match self.part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.buffer.clear();
    }

    fn commit_buffer(&mut self) {
        if let Ok(value) = self.buffer.parse::<u32>() {
            match self.part {
                DatePart::Year => {
                    let year = value as i32;
                    if (1900..=2100).contains(&year) {
                        self.set_ymd(year, self.date.month(), self.date.day());
                    }
                }
                DatePart::Month => {
                    if (1..=12).contains(&value) {
                        self.set_ymd(self.date.year(), value, self.date.day());
                    }
                }
                DatePart::Day => {
                    self.set_ymd(self.date.year(), self.date.month(), value);
                }
            }
        }
        self.buffer.clear();
    }

    fn step(&mut self, delta: i32) {
        match self.part {
            DatePart::Year => {
                self.set_ymd(self.date.year() + delta, self.date.month(), self.date.day())
            }
            DatePart::Month => {
                let month = self.date.month() as i32 - 1 + delta;
                let month = month.rem_euclid(12) as u32 + 1;
                self.set_ymd(self.date.year(), month, self.date.day());
            }
            DatePart::Day => {
                let max = days_in_month(self.date.year(), self.date.month());
                let day = self.date.day() as i32 - 1 + delta;
                let day = day.rem_euclid(max as i32) as u32 + 1;
                self.set_ymd(self.date.year(), self.date.month(), day);
            }
        }
    }

    // Day overflow (e.g. Jan 31 -> Feb) clamps to the month's last day.
    fn set_ymd(&mut self, year: i32, month: u32, day: u32) {
        let day = day.min(days_in_month(year, month));
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            self.date = date;
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(date: &str) -> DateInputState {
        let mut state = DateInputState::new(date.parse().unwrap());
        state.toggle_editing();
        state
    }

    #[test]
    fn typing_a_full_date_commits_each_part() {
        let mut input = state("2025-01-02");
        for c in "20240315".chars() {
            input.handle_input(KeyCode::Char(c));
        }
        assert_eq!(input.date, "2024-03-15".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn month_steps_wrap_and_clamp_the_day() {
        let mut input = state("2025-01-31");
        input.handle_input(KeyCode::Right); // to month
        input.handle_input(KeyCode::Up); // Jan -> Feb
        assert_eq!(input.date, "2025-02-28".parse::<NaiveDate>().unwrap());

        input.handle_input(KeyCode::Down); // back to Jan, day stays 28
        assert_eq!(input.date, "2025-01-28".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn out_of_range_input_is_ignored() {
        let mut input = state("2025-06-10");
        input.handle_input(KeyCode::Right); // month
        input.handle_input(KeyCode::Char('9'));
        input.handle_input(KeyCode::Char('9'));
        assert_eq!(input.date, "2025-06-10".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn display_marks_the_active_part_while_editing() {
        let mut input = DateInputState::new("2025-01-02".parse().unwrap());
        assert_eq!(input.display_string(), "2025-01-02");
        input.toggle_editing();
        assert_eq!(input.display_string(), "[2025]-01-02");
    }
}
