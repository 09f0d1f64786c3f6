use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// SIGNAL LISTENER
// ============================================================================

/// Set `shutdown_trigger` when the process is asked to terminate, so the
/// UI loop can restore the terminal before exiting.
#[cfg(unix)]
pub fn start_signal_listener(shutdown_trigger: Arc<AtomicBool>) {
    use signal_hook::consts::signal::{SIGHUP, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::thread;

    match Signals::new([SIGTERM, SIGHUP]) {
        Ok(mut signals) => {
            thread::spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    tracing::info!(signal, "termination signal received");
                    shutdown_trigger.store(true, Ordering::Relaxed);
                }
            });
        }
        Err(err) => tracing::warn!(error = %err, "signal listener unavailable"),
    }
}

#[cfg(not(unix))]
pub fn start_signal_listener(_shutdown_trigger: Arc<AtomicBool>) {}

pub fn shutdown_requested(shutdown_trigger: &AtomicBool) -> bool {
    shutdown_trigger.load(Ordering::Relaxed)
}
