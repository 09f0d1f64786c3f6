pub mod app;
pub mod display;
pub mod panel;
pub mod unlock;

pub use app::AppState;
pub use display::{show_ui, unlock};
pub use panel::Panel;
