use std::path::PathBuf;

use tracing::info;

use crate::board::SnippetBoard;
use crate::clipboard::{ClipboardBackend, CopyOutcome, copy_entry};
use crate::config::AppConfig;
use crate::crypto::PinStore;
use crate::models::ClipboardEntry;
use crate::theme::{Theme, ThemeStore};
use crate::ui::app::{Action, AppState, Selection, StatusLevel};

// ============================================================================
// PANEL
// ============================================================================

/// Everything the panel acts on: the entries, the PIN file, themes and the
/// clipboard backend.
pub struct Panel {
    pub board: SnippetBoard,
    pub pins: PinStore,
    pub themes: ThemeStore,
    pub theme: Theme,
    pub backend: ClipboardBackend,
    pub exports_dir: PathBuf,
}

impl Panel {
    pub fn new(config: &AppConfig, board: SnippetBoard, backend: ClipboardBackend) -> Self {
        let themes = ThemeStore::new(config);
        let theme = themes.selected();
        Self {
            board,
            pins: PinStore::new(config.pin_path()),
            themes,
            theme,
            backend,
            exports_dir: config.exports_dir(),
        }
    }

    pub fn selection(&self, state: &AppState) -> Option<Selection<'_>> {
        let entry = self.board.get(state.selected()?)?;
        Some(Selection {
            display_name: &entry.display_name,
            text_value: entry.text_value(),
        })
    }

    /// Carry out an action and report the result in the status line.
    pub fn apply(&mut self, state: &mut AppState, action: Action) {
        match action {
            Action::Quit => info!("application closing"),
            Action::Copy(index) => self.copy(state, index),
            Action::AddText(value) => match self.board.add_text(&value) {
                Ok(true) => {
                    state.list_state.select(Some(self.board.len() - 1));
                    state.set_status(StatusLevel::Info, "Entry added");
                }
                Ok(false) => state.set_status(StatusLevel::Warn, "Please enter text."),
                Err(err) => state.set_status(StatusLevel::Error, save_failed(&err)),
            },
            Action::AddFile(path) => match ClipboardEntry::from_file(&path) {
                Ok(entry) => match self.board.add_entry(entry) {
                    Ok(()) => {
                        state.list_state.select(Some(self.board.len() - 1));
                        state.set_status(StatusLevel::Info, "File added");
                    }
                    Err(err) => state.set_status(StatusLevel::Error, save_failed(&err)),
                },
                Err(err) => state.set_status(StatusLevel::Warn, err.to_string()),
            },
            Action::Rename(index, name) => match self.board.rename(index, &name) {
                Ok(true) => state.set_status(StatusLevel::Info, "Display name updated"),
                Ok(false) => {}
                Err(err) => state.set_status(StatusLevel::Error, save_failed(&err)),
            },
            Action::EditValue(index, value) => match self.board.edit_value(index, &value) {
                Ok(true) => state.set_status(StatusLevel::Info, "Value updated"),
                Ok(false) => {}
                Err(err) => state.set_status(StatusLevel::Error, save_failed(&err)),
            },
            Action::Delete(index) => {
                match self.board.remove(index) {
                    Ok(Some(_)) => state.set_status(StatusLevel::Info, "Entry deleted"),
                    Ok(None) => {}
                    Err(err) => state.set_status(StatusLevel::Error, save_failed(&err)),
                }
                state.clamp(self.board.len());
            }
            Action::Clear => {
                match self.board.clear() {
                    Ok(()) => state.set_status(StatusLevel::Info, "All entries deleted"),
                    Err(err) => state.set_status(StatusLevel::Error, save_failed(&err)),
                }
                state.clamp(0);
            }
            Action::SetPin(pin) => match self.pins.set(&pin) {
                Ok(()) => state.set_status(StatusLevel::Info, "PIN set."),
                Err(err) => state.set_status(StatusLevel::Warn, err.to_string()),
            },
            Action::RemovePin => {
                if !self.pins.is_set() {
                    state.set_status(StatusLevel::Info, "No PIN is set.");
                } else {
                    match self.pins.remove() {
                        Ok(()) => state.set_status(StatusLevel::Info, "PIN removed."),
                        Err(err) => state.set_status(StatusLevel::Error, err.to_string()),
                    }
                }
            }
            Action::CycleTheme => match self.themes.cycle(&self.theme.name) {
                Ok(theme) => {
                    state.set_status(StatusLevel::Info, format!("Theme: {}", theme.name));
                    self.theme = theme;
                }
                Err(err) => state.set_status(StatusLevel::Error, err.to_string()),
            },
        }
    }

    fn copy(&self, state: &mut AppState, index: usize) {
        let Some(entry) = self.board.get(index) else {
            return;
        };

        match copy_entry(entry, self.backend, &self.exports_dir) {
            Ok(CopyOutcome::ExportedPath(path)) => {
                info!("entry copied as exported file");
                state.set_status(
                    StatusLevel::Info,
                    format!("Copied file path {}", path.display()),
                );
            }
            Ok(_) => {
                info!("entry copied");
                state.set_status(StatusLevel::Info, "Copied to clipboard!");
            }
            Err(err) => {
                tracing::warn!(error = %err, "copy failed");
                state.set_status(StatusLevel::Error, err.to_string());
            }
        }
    }
}

fn save_failed(err: &crate::error::StoreError) -> String {
    format!("Changes kept for this session but not saved: {}", err)
}
