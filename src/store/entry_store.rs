use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::crypto::{KeyManager, decrypt_blob, encrypt_blob};
use crate::error::{CorruptReason, StoreError};
use crate::models::ClipboardEntry;
use crate::store::codec;
use crate::utils::KEY_SIZE;

// ============================================================================
// ENTRY STORE
// ============================================================================

/// Encrypted persistence of the ordered entry list.
///
/// Every save rewrites the whole blob. Loads never create files.
pub struct EntryStore {
    keys: KeyManager,
    blob_path: PathBuf,
}

/// Result of opening the store for a session: the entries to show and,
/// when the saved state could not be read, the reason to warn about.
#[derive(Debug)]
pub struct LoadedSession {
    pub entries: Vec<ClipboardEntry>,
    pub first_run: bool,
    pub warning: Option<StoreError>,
}

impl EntryStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_paths(config.key_path(), config.blob_path())
    }

    pub fn with_paths(key_path: impl Into<PathBuf>, blob_path: impl Into<PathBuf>) -> Self {
        Self {
            keys: KeyManager::new(key_path),
            blob_path: blob_path.into(),
        }
    }

    pub fn key_manager(&self) -> &KeyManager {
        &self.keys
    }

    pub fn blob_path(&self) -> &Path {
        &self.blob_path
    }

    /// True when either the key or the blob has never been written.
    pub fn is_first_run(&self) -> bool {
        !self.keys.exists() || !self.blob_path.exists()
    }

    pub fn save(&self, entries: &[ClipboardEntry]) -> Result<(), StoreError> {
        let key = self.keys.get_or_create_key()?;
        if key.len() != KEY_SIZE {
            return Err(StoreError::InvalidKey {
                path: self.keys.path().to_path_buf(),
                len: key.len(),
            });
        }

        let plaintext = codec::encode_entries(entries).map_err(StoreError::Encode)?;
        let blob = encrypt_blob(&plaintext, &key)?;

        self.write_atomic(blob.as_bytes())
            .map_err(|source| StoreError::Io {
                path: self.blob_path.clone(),
                source,
            })?;

        debug!(count = entries.len(), "entries saved");
        Ok(())
    }

    pub fn load(&self) -> Result<Vec<ClipboardEntry>, StoreError> {
        let text = match fs::read_to_string(&self.blob_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(CorruptReason::Base64.into());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.blob_path.clone(),
                    source,
                });
            }
        };

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let key = self.keys.read_key()?.ok_or(CorruptReason::MissingKey)?;
        let plaintext = decrypt_blob(&text, &key)?;
        if plaintext.is_empty() {
            return Ok(Vec::new());
        }

        let entries = codec::decode_entries(&plaintext).map_err(CorruptReason::from)?;
        Ok(entries)
    }

    /// Load for application startup. Corruption is downgraded to an empty
    /// list plus a warning, which is dropped on a first run. Key and file
    /// access failures are returned.
    pub fn load_session(&self) -> Result<LoadedSession, StoreError> {
        let first_run = self.is_first_run();

        match self.load() {
            Ok(entries) => {
                info!(count = entries.len(), "entries loaded");
                Ok(LoadedSession {
                    entries,
                    first_run,
                    warning: None,
                })
            }
            Err(err) if err.is_corrupt() => {
                warn!(error = %err, first_run, "saved entries could not be read");
                Ok(LoadedSession {
                    entries: Vec::new(),
                    first_run,
                    warning: (!first_run).then_some(err),
                })
            }
            Err(err) => Err(err),
        }
    }

    fn write_atomic(&self, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.blob_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = tmp_path_for(&self.blob_path);
        let result = (|| {
            let mut file = File::create(&tmp_path)?;
            file.write_all(data)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.blob_path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
