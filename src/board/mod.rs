pub mod manager;

pub use manager::SnippetBoard;
