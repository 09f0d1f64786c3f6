// ============================================================================
// CONSTANTS
// ============================================================================

pub const APP_DIR_NAME: &str = "clickboard";
pub const DATA_DIR_ENV: &str = "CLICKBOARD_DATA_DIR";

pub const KEY_FILE: &str = "clickboard.key";
pub const BLOB_FILE: &str = "clickboard.cfg";
pub const PIN_FILE: &str = "clickboard.pin";
pub const LOG_FILE: &str = "clickboard.log";
pub const SELECTED_THEME_FILE: &str = "selected.theme";
pub const THEME_SUFFIX: &str = ".theme.json";
pub const EXPORTS_DIR: &str = "exports";

pub const KEY_SIZE: usize = 32;
pub const IV_SIZE: usize = 16;

pub const PIN_LENGTH: usize = 4;
pub const PIN_SALT_SIZE: usize = 16;
pub const PIN_HASH_SIZE: usize = 32;
pub const PIN_ITERATIONS: u32 = 10_000;
pub const MAX_PIN_ATTEMPTS: u32 = 3;

pub const POLL_INTERVAL_MS: u64 = 50;
pub const MAX_DISPLAY_LENGTH: usize = 60;
