use std::path::PathBuf;

use crossterm::event::KeyCode;
use ratatui::widgets::ListState;

use crate::utils::PIN_LENGTH;

// ============================================================================
// TERMINAL UI APP STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    AddText,
    AddFile,
    Rename(usize),
    EditValue(usize),
    SetPin,
}

impl InputPurpose {
    pub fn title(self) -> &'static str {
        match self {
            InputPurpose::AddText => " Enter text to save ",
            InputPurpose::AddFile => " Path of image or audio file ",
            InputPurpose::Rename(_) => " Edit display name ",
            InputPurpose::EditValue(_) => " Edit the value to be pasted ",
            InputPurpose::SetPin => " New 4-digit PIN ",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, InputPurpose::SetPin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Input {
        purpose: InputPurpose,
        buffer: String,
    },
    ConfirmDelete(usize),
    ConfirmClear,
    PinMenu,
}

/// What the event loop should do in response to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Copy(usize),
    AddText(String),
    AddFile(PathBuf),
    Rename(usize, String),
    EditValue(usize, String),
    Delete(usize),
    Clear,
    SetPin(String),
    RemovePin,
    CycleTheme,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub message: String,
}

/// Minimal view of an entry the key handler needs.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub display_name: &'a str,
    pub text_value: Option<&'a str>,
}

pub struct AppState {
    pub list_state: ListState,
    pub mode: Mode,
    pub status: Option<Status>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new() -> Self {
        let mut state = Self {
            list_state: ListState::default(),
            mode: Mode::Browse,
            status: None,
            should_quit: false,
        };
        state.list_state.select(Some(0));
        state
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn next(&mut self, max: usize) {
        if max == 0 {
            return;
        }
        let i = self
            .list_state
            .selected()
            .map(|i| if i >= max - 1 { 0 } else { i + 1 })
            .unwrap_or(0);
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self, max: usize) {
        if max == 0 {
            return;
        }
        let i = self
            .list_state
            .selected()
            .map(|i| if i == 0 { max - 1 } else { i - 1 })
            .unwrap_or(0);
        self.list_state.select(Some(i));
    }

    /// Keep the cursor inside the list after entries were removed.
    pub fn clamp(&mut self, len: usize) {
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(Some(0)),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn set_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.status = Some(Status {
            level,
            message: message.into(),
        });
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Translate a key press into a mode change and, possibly, an action.
    /// `selection` describes the highlighted entry, if any.
    pub fn handle_key(
        &mut self,
        code: KeyCode,
        len: usize,
        selection: Option<Selection<'_>>,
    ) -> Option<Action> {
        let mode = std::mem::replace(&mut self.mode, Mode::Browse);
        match mode {
            Mode::Browse => self.handle_browse(code, len, selection),
            Mode::Input { purpose, buffer } => self.handle_input(code, purpose, buffer),
            Mode::ConfirmDelete(index) => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Delete(index)),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => None,
                _ => {
                    self.mode = Mode::ConfirmDelete(index);
                    None
                }
            },
            Mode::ConfirmClear => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Clear),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => None,
                _ => {
                    self.mode = Mode::ConfirmClear;
                    None
                }
            },
            Mode::PinMenu => match code {
                KeyCode::Char('s') | KeyCode::Char('S') => {
                    self.start_input(InputPurpose::SetPin, String::new());
                    None
                }
                KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::RemovePin),
                KeyCode::Esc | KeyCode::Char('q') => None,
                _ => {
                    self.mode = Mode::PinMenu;
                    None
                }
            },
        }
    }

    fn handle_browse(
        &mut self,
        code: KeyCode,
        len: usize,
        selection: Option<Selection<'_>>,
    ) -> Option<Action> {
        let index = self.selected().filter(|&i| i < len);
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.quit();
                Some(Action::Quit)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.next(len);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous(len);
                None
            }
            KeyCode::Enter => index.map(Action::Copy),
            KeyCode::Char('a') => {
                self.start_input(InputPurpose::AddText, String::new());
                None
            }
            KeyCode::Char('f') => {
                self.start_input(InputPurpose::AddFile, String::new());
                None
            }
            KeyCode::Char('r') => {
                if let (Some(i), Some(sel)) = (index, selection) {
                    self.start_input(InputPurpose::Rename(i), sel.display_name.to_string());
                }
                None
            }
            KeyCode::Char('e') => {
                match (index, selection.and_then(|s| s.text_value)) {
                    (Some(i), Some(value)) => {
                        self.start_input(InputPurpose::EditValue(i), value.to_string())
                    }
                    (Some(_), None) => {
                        self.set_status(StatusLevel::Warn, "Only text entries have an editable value")
                    }
                    _ => {}
                }
                None
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(i) = index {
                    self.mode = Mode::ConfirmDelete(i);
                }
                None
            }
            KeyCode::Char('C') if len > 0 => {
                self.mode = Mode::ConfirmClear;
                None
            }
            KeyCode::Char('p') => {
                self.mode = Mode::PinMenu;
                None
            }
            KeyCode::Char('t') => Some(Action::CycleTheme),
            _ => None,
        }
    }

    fn handle_input(
        &mut self,
        code: KeyCode,
        purpose: InputPurpose,
        mut buffer: String,
    ) -> Option<Action> {
        match code {
            KeyCode::Esc => return None,
            KeyCode::Enter => return submit(purpose, buffer),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if purpose.is_secret() => {
                if c.is_ascii_digit() && buffer.len() < PIN_LENGTH {
                    buffer.push(c);
                }
            }
            KeyCode::Char(c) => buffer.push(c),
            _ => {}
        }
        self.mode = Mode::Input { purpose, buffer };
        None
    }

    fn start_input(&mut self, purpose: InputPurpose, initial: String) {
        self.mode = Mode::Input {
            purpose,
            buffer: initial,
        };
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn submit(purpose: InputPurpose, buffer: String) -> Option<Action> {
    match purpose {
        InputPurpose::AddText => Some(Action::AddText(buffer)),
        InputPurpose::AddFile => {
            let path = buffer.trim().trim_matches('"');
            (!path.is_empty()).then(|| Action::AddFile(PathBuf::from(path)))
        }
        InputPurpose::Rename(i) => Some(Action::Rename(i, buffer)),
        InputPurpose::EditValue(i) => Some(Action::EditValue(i, buffer)),
        InputPurpose::SetPin => Some(Action::SetPin(buffer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_sel<'a>(name: &'a str, value: &'a str) -> Option<Selection<'a>> {
        Some(Selection {
            display_name: name,
            text_value: Some(value),
        })
    }

    fn type_str(state: &mut AppState, text: &str) {
        for c in text.chars() {
            assert_eq!(state.handle_key(KeyCode::Char(c), 1, None), None);
        }
    }

    #[test]
    fn navigation_wraps() {
        let mut state = AppState::new();
        state.previous(3);
        assert_eq!(state.selected(), Some(2));
        state.next(3);
        assert_eq!(state.selected(), Some(0));
        state.next(0);
        assert_eq!(state.selected(), Some(0));
    }

    #[test]
    fn enter_copies_selected_entry() {
        let mut state = AppState::new();
        state.next(2);
        assert_eq!(
            state.handle_key(KeyCode::Enter, 2, text_sel("b", "b")),
            Some(Action::Copy(1))
        );
        assert_eq!(state.handle_key(KeyCode::Enter, 0, None), None);
    }

    #[test]
    fn add_text_collects_input() {
        let mut state = AppState::new();
        state.handle_key(KeyCode::Char('a'), 0, None);
        type_str(&mut state, "hi!");
        state.handle_key(KeyCode::Backspace, 0, None);
        assert_eq!(
            state.handle_key(KeyCode::Enter, 0, None),
            Some(Action::AddText(String::from("hi")))
        );
        assert_eq!(state.mode, Mode::Browse);
    }

    #[test]
    fn rename_starts_from_current_name() {
        let mut state = AppState::new();
        state.handle_key(KeyCode::Char('r'), 1, text_sel("old", "value"));
        assert_eq!(
            state.mode,
            Mode::Input {
                purpose: InputPurpose::Rename(0),
                buffer: String::from("old")
            }
        );
        type_str(&mut state, "er");
        assert_eq!(
            state.handle_key(KeyCode::Enter, 1, None),
            Some(Action::Rename(0, String::from("older")))
        );
    }

    #[test]
    fn edit_value_refused_for_binary_entries() {
        let mut state = AppState::new();
        let image = Some(Selection {
            display_name: "pic",
            text_value: None,
        });
        assert_eq!(state.handle_key(KeyCode::Char('e'), 1, image), None);
        assert_eq!(state.mode, Mode::Browse);
        assert_eq!(state.status.as_ref().map(|s| s.level), Some(StatusLevel::Warn));
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut state = AppState::new();
        state.handle_key(KeyCode::Char('d'), 1, text_sel("a", "a"));
        assert_eq!(state.mode, Mode::ConfirmDelete(0));
        assert_eq!(state.handle_key(KeyCode::Char('x'), 1, None), None);
        assert_eq!(state.mode, Mode::ConfirmDelete(0));
        assert_eq!(
            state.handle_key(KeyCode::Char('y'), 1, None),
            Some(Action::Delete(0))
        );

        state.handle_key(KeyCode::Char('d'), 1, text_sel("a", "a"));
        assert_eq!(state.handle_key(KeyCode::Esc, 1, None), None);
        assert_eq!(state.mode, Mode::Browse);
    }

    #[test]
    fn pin_input_accepts_four_digits_only() {
        let mut state = AppState::new();
        state.handle_key(KeyCode::Char('p'), 0, None);
        state.handle_key(KeyCode::Char('s'), 0, None);
        type_str(&mut state, "12a3456");
        assert_eq!(
            state.handle_key(KeyCode::Enter, 0, None),
            Some(Action::SetPin(String::from("1234")))
        );
    }

    #[test]
    fn add_file_strips_quotes_and_ignores_blank() {
        let mut state = AppState::new();
        state.handle_key(KeyCode::Char('f'), 0, None);
        type_str(&mut state, "\"/tmp/a.png\"");
        assert_eq!(
            state.handle_key(KeyCode::Enter, 0, None),
            Some(Action::AddFile(PathBuf::from("/tmp/a.png")))
        );

        state.handle_key(KeyCode::Char('f'), 0, None);
        assert_eq!(state.handle_key(KeyCode::Enter, 0, None), None);
    }

    #[test]
    fn clamp_after_removal() {
        let mut state = AppState::new();
        state.list_state.select(Some(4));
        state.clamp(2);
        assert_eq!(state.selected(), Some(1));
        state.clamp(0);
        assert_eq!(state.selected(), Some(0));
    }
}
