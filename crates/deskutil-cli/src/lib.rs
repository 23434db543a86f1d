//! Shared plumbing for the deskutil binaries.

use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

/// Install the compact log formatter used by every binary.
pub fn init_logging(debug: bool) {
    let log_level = if debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();
}

/// Convert a library result for `main`.
///
/// User errors (unknown name, bad input) are logged as a one-line diagnostic
/// and exit with status 1; everything else propagates with its context.
pub fn finish<T>(result: deskutil_core::Result<T>) -> anyhow::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_user_error() => {
            error!("{}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
