//! Diagnostic logging for the binary
//!
//! Reports go to the output writer; everything logged here goes to stderr.

use tracing::level_filters::LevelFilter;

/// Map `-v` occurrences to a level filter
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber; later calls are no-ops
pub fn init(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level_for(verbosity))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
