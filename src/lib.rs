//! Clickboard keeps a panel of saved snippets (text, images, audio) that
//! can be put back on the clipboard with one key press.
//!
//! The entries are persisted encrypted: a random 256-bit key lives in
//! `clickboard.key` and the whole list is stored AES-256-CBC encrypted in
//! `clickboard.cfg`. See [`store::EntryStore`] and [`crypto::KeyManager`].

pub mod board;
pub mod clipboard;
pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod store;
pub mod theme;
pub mod ui;
pub mod utils;

pub use board::SnippetBoard;
pub use config::AppConfig;
pub use crypto::{KeyManager, KeyMaterial, PinStore};
pub use error::{CorruptReason, StoreError};
pub use models::{AudioFormat, ClipboardEntry, EntryKind, ImageFormat, Payload};
pub use store::{EntryStore, LoadedSession};
