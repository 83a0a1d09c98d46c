#![deny(missing_docs)]
//! Logger bootstrap shared by the transmuta binaries and test suites.
//!
//! Call sites log through the `log` facade; this crate only decides where
//! those records go and at which level.

use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

/// Initializes the terminal logger for a binary.
///
/// `verbose` raises the level from Info to Debug. Returns an error string if
/// a global logger was already installed.
pub fn init_terminal(verbose: bool) -> Result<(), String> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .map_err(|err| err.to_string())
}

/// Initializes a terminal logger for unit and integration tests.
///
/// Debug level in debug builds, info in release builds. Safely no-ops when
/// another test already installed a logger.
pub fn initialize_for_tests() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
