pub mod codec;
pub mod entry_store;

pub use entry_store::{EntryStore, LoadedSession};
