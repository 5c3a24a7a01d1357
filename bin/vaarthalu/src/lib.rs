//! Vaarthalu CLI Library
//!
//! Operator commands for the engagement runtime: validating a
//! `vaarthalu.toml` and exporting it for the browser.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (check, export)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use vaarthalu::cmd::{self, export::Format};
//!
//! cmd::check::run(Path::new("vaarthalu.toml"), false).unwrap();
//! cmd::export::run(Path::new("vaarthalu.toml"), Some(Path::new("public/vaarthalu-config.js")), Format::Script).unwrap();
//! ```

pub mod cmd;

pub use vaarthalu_core::Config;

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
