//! Tracing subscriber setup.
//!
//! Command-line runs log to stderr. The TUI owns the terminal, so it logs to
//! a file under the data directory instead.

use std::path::Path;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug,html5ever=warn,selectors=warn")
        } else {
            EnvFilter::new("warn")
        }
    })
}

/// Log to stderr
pub fn init_stderr(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .init();
}

/// Log to `precis.log` in `dir`, falling back to stderr when the directory
/// cannot be created
pub fn init_file(dir: &Path, verbose: bool) {
    if std::fs::create_dir_all(dir).is_err() {
        init_stderr(verbose);
        return;
    }

    let appender = tracing_appender::rolling::never(dir, "precis.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(writer)
        .with_ansi(false)
        .init();
}
