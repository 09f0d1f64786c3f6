use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Context;
use tracing::{error, info};

use clickboard::board::SnippetBoard;
use clickboard::clipboard::detect_clipboard_backend;
use clickboard::config::{AppConfig, Command, USAGE, parse_args};
use clickboard::crypto::PinStore;
use clickboard::logging;
use clickboard::monitor::start_signal_listener;
use clickboard::store::EntryStore;
use clickboard::ui::{self, AppState, Panel};
use clickboard::ui::app::StatusLevel;

// ============================================================================
// MAIN
// ============================================================================

fn main() -> ExitCode {
    let data_dir = match parse_args(env::args().skip(1)) {
        Ok(Command::Run { data_dir }) => data_dir,
        Ok(Command::Help) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(usage) => {
            eprintln!("{}\n\n{}", usage.0, USAGE);
            return ExitCode::from(2);
        }
    };

    let config = AppConfig::resolve(data_dir);
    if let Err(e) = logging::init(&config) {
        eprintln!("Logging disabled: {:#}", e);
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "fatal error");
            eprintln!("Clickboard: {:#}", e);
            eprintln!("Diagnostics log: {}", logging::log_path(&config).display());
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig) -> anyhow::Result<()> {
    config
        .ensure_dir()
        .with_context(|| format!("creating data directory {}", config.data_dir().display()))?;
    info!(data_dir = %config.data_dir().display(), "application started");

    let shutdown = Arc::new(AtomicBool::new(false));
    start_signal_listener(Arc::clone(&shutdown));

    let pins = PinStore::new(config.pin_path());
    if !ui::unlock(&pins, &shutdown)? {
        info!("locked, exiting");
        return Ok(());
    }

    let store = EntryStore::new(config);
    let (board, warning) = SnippetBoard::open(store).context("loading saved entries")?;
    // Without a usable key nothing can be saved, so fail before showing the panel.
    board
        .store()
        .key_manager()
        .get_or_create_key()
        .context("preparing encryption key")?;

    let mut state = AppState::new();
    if let Some(warning) = warning {
        state.set_status(
            StatusLevel::Warn,
            format!(
                "Failed to load saved entries ({}). Starting with an empty list; see {}",
                warning,
                logging::log_path(config).display()
            ),
        );
    }

    let mut panel = Panel::new(config, board, detect_clipboard_backend());
    ui::show_ui(&mut panel, &mut state, &shutdown)?;

    info!("application closed");
    Ok(())
}
