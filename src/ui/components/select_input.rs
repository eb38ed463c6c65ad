use crossterm::event::KeyCode;

/// One choice in a fixed-option field.
#[derive(Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option whose stored value and label are the same string.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// Inline selector for fixed-choice form fields (firm, client, unit, GST
/// rate, state, category). Left/Right cycles options while editing.
pub struct SelectState {
    options: Vec<SelectOption>,
    selected: Option<usize>,
    pub editing: bool,
}

impl SelectState {
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self {
            options,
            selected: None,
            editing: false,
        }
    }

    /// Preselect the option holding `value`; falls back to nothing
    /// selected when the value is not among the options.
    pub fn with_value(options: Vec<SelectOption>, value: &str) -> Self {
        let selected = options.iter().position(|opt| opt.value == value);
        Self {
            options,
            selected,
            editing: false,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        // Entering edit mode lands on the first option so cycling always
        // has a position to move from.
        if self.editing && self.selected.is_none() && !self.options.is_empty() {
            self.selected = Some(0);
        }
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing || self.options.is_empty() {
            return;
        }

        let len = self.options.len();
        let current = self.selected.unwrap_or(0);
        match key {
            KeyCode::Right | KeyCode::Up => {
                self.selected = Some((current + 1) % len);
            }
            KeyCode::Left | KeyCode::Down => {
                self.selected = Some((current + len - 1) % len);
            }
            _ => {}
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.options.get(i))
            .map(|opt| opt.value.as_str())
    }

    pub fn label(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.options.get(i))
            .map(|opt| opt.label.as_str())
    }

    pub fn display_string(&self) -> String {
        let label = self.label().unwrap_or("(select)");
        if self.editing {
            format!("< {} >", label)
        } else {
            label.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units() -> Vec<SelectOption> {
        ["Hours", "Days", "Job"]
            .iter()
            .map(|u| SelectOption::plain(*u))
            .collect()
    }

    #[test]
    fn cycling_wraps_in_both_directions() {
        let mut select = SelectState::new(units());
        select.toggle_editing();
        assert_eq!(select.value(), Some("Hours"));

        select.handle_input(KeyCode::Right);
        assert_eq!(select.value(), Some("Days"));

        select.handle_input(KeyCode::Left);
        select.handle_input(KeyCode::Left);
        assert_eq!(select.value(), Some("Job"));
    }

    #[test]
    fn with_value_preselects_matching_option() {
        let select = SelectState::with_value(units(), "Days");
        assert_eq!(select.value(), Some("Days"));

        let select = SelectState::with_value(units(), "Tonnes");
        assert_eq!(select.value(), None);
        assert_eq!(select.display_string(), "(select)");
    }

    #[test]
    fn input_is_ignored_when_not_editing() {
        let mut select = SelectState::with_value(units(), "Hours");
        select.handle_input(KeyCode::Right);
        assert_eq!(select.value(), Some("Hours"));
    }
}
