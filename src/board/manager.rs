use tracing::{error, info};

use crate::error::StoreError;
use crate::models::{ClipboardEntry, Payload};
use crate::store::{EntryStore, LoadedSession};

// ============================================================================
// SNIPPET BOARD
// ============================================================================

/// The session's ordered list of entries. Memory is updated first and the
/// whole list is then written back; a failed write is reported but the
/// in-memory change stays.
pub struct SnippetBoard {
    entries: Vec<ClipboardEntry>,
    store: EntryStore,
}

impl SnippetBoard {
    /// Load the saved entries. Returns the board plus any corruption
    /// warning the user should see.
    pub fn open(store: EntryStore) -> Result<(Self, Option<StoreError>), StoreError> {
        let LoadedSession {
            entries, warning, ..
        } = store.load_session()?;
        Ok((Self { entries, store }, warning))
    }

    #[cfg(test)]
    fn with_entries(store: EntryStore, entries: Vec<ClipboardEntry>) -> Self {
        Self { entries, store }
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ClipboardEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a text entry labelled with its own value. Blank input is ignored.
    pub fn add_text(&mut self, value: &str) -> Result<bool, StoreError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(false);
        }

        self.entries.push(ClipboardEntry::text(value, value));
        info!(total = self.entries.len(), "text entry added");
        self.save().map(|_| true)
    }

    pub fn add_entry(&mut self, entry: ClipboardEntry) -> Result<(), StoreError> {
        info!(kind = ?entry.kind(), total = self.entries.len() + 1, "entry added");
        self.entries.push(entry);
        self.save()
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        let Some(entry) = self.entries.get_mut(index) else {
            return Ok(false);
        };
        if name.is_empty() || entry.display_name == name {
            return Ok(false);
        }

        entry.display_name = name.to_string();
        info!(index, "display name edited");
        self.save().map(|_| true)
    }

    /// Replace the value of a text entry. Image and audio entries are left
    /// untouched.
    pub fn edit_value(&mut self, index: usize, value: &str) -> Result<bool, StoreError> {
        let Some(entry) = self.entries.get_mut(index) else {
            return Ok(false);
        };
        let Payload::Text(current) = &mut entry.payload else {
            return Ok(false);
        };
        if value.trim().is_empty() || current == value {
            return Ok(false);
        }

        *current = value.to_string();
        info!(index, "text value edited");
        self.save().map(|_| true)
    }

    pub fn remove(&mut self, index: usize) -> Result<Option<ClipboardEntry>, StoreError> {
        if index >= self.entries.len() {
            return Ok(None);
        }

        let removed = self.entries.remove(index);
        info!(index, total = self.entries.len(), "entry deleted");
        self.save().map(|_| Some(removed))
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        info!("all entries cleared");
        self.save()
    }

    pub fn save(&self) -> Result<(), StoreError> {
        self.store.save(&self.entries).inspect_err(|err| {
            error!(error = %err, "saving entries failed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::{AudioFormat, ImageFormat};
    use std::fs;

    fn board() -> (tempfile::TempDir, SnippetBoard) {
        let dir = tempfile::tempdir().unwrap();
        let (board, warning) = SnippetBoard::open(EntryStore::new(&AppConfig::new(dir.path()))).unwrap();
        assert!(warning.is_none());
        (dir, board)
    }

    fn reopen(dir: &tempfile::TempDir) -> SnippetBoard {
        SnippetBoard::open(EntryStore::new(&AppConfig::new(dir.path())))
            .unwrap()
            .0
    }

    #[test]
    fn add_text_trims_and_persists() {
        let (dir, mut board) = board();
        assert!(board.add_text("  hello  ").unwrap());
        assert!(!board.add_text("   ").unwrap());

        let reopened = reopen(&dir);
        assert_eq!(reopened.entries(), &[ClipboardEntry::text("hello", "hello")]);
    }

    #[test]
    fn rename_and_edit_value_are_independent() {
        let (dir, mut board) = board();
        board.add_text("ssh user@host").unwrap();

        assert!(board.rename(0, "Server").unwrap());
        assert!(board.edit_value(0, "ssh admin@host").unwrap());
        assert!(!board.rename(0, " ").unwrap());
        assert!(!board.edit_value(0, "").unwrap());

        let reopened = reopen(&dir);
        assert_eq!(
            reopened.entries(),
            &[ClipboardEntry::text("Server", "ssh admin@host")]
        );
    }

    #[test]
    fn edit_value_ignores_binary_entries() {
        let (_dir, mut board) = board();
        board
            .add_entry(ClipboardEntry::image("pic", vec![1, 2], ImageFormat::Png))
            .unwrap();
        assert!(!board.edit_value(0, "text").unwrap());
        assert!(board.get(0).unwrap().is_image());
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let (dir, mut board) = board();
        board.add_text("one").unwrap();
        board
            .add_entry(ClipboardEntry::audio("two", vec![2], AudioFormat::Ogg))
            .unwrap();
        board.add_text("three").unwrap();

        let removed = board.remove(1).unwrap().unwrap();
        assert_eq!(removed.display_name, "two");
        assert!(board.remove(10).unwrap().is_none());

        let names: Vec<_> = reopen(&dir)
            .entries()
            .iter()
            .map(|e| e.display_name.clone())
            .collect();
        assert_eq!(names, ["one", "three"]);
    }

    #[test]
    fn clear_writes_empty_list() {
        let (dir, mut board) = board();
        board.add_text("x").unwrap();
        board.clear().unwrap();
        assert!(dir.path().join("clickboard.cfg").exists());
        assert!(reopen(&dir).is_empty());
    }

    #[test]
    fn failed_save_keeps_memory_change() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::new(dir.path());
        // A directory where the blob file should be makes the rename fail.
        fs::create_dir_all(config.blob_path().join("occupied")).unwrap();

        let mut board = SnippetBoard::with_entries(EntryStore::new(&config), Vec::new());
        let err = board.add_text("kept").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(board.len(), 1);
    }
}
