//! Tracing setup for the binary

use tracing_subscriber::EnvFilter;

/// Filter used when `--debug` is given
const DEBUG_FILTER: &str = "sand_rocket_tracker=debug,sand_rocket_cli=debug,info";

/// Install the global subscriber, writing to stderr so stdout stays JSON
pub fn init(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

fn filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new(DEBUG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}
