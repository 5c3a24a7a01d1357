//! Vaarthalu CLI
//!
//! Validates and exports the configuration of the news engagement runtime.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use vaarthalu::cmd::export::Format;

/// Command-line interface for Vaarthalu.
#[derive(Parser)]
#[command(
    name = "vaarthalu",
    version,
    about = "Configuration tooling for the Telugu news engagement runtime"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "vaarthalu.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Validate the configuration
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// Write the resolved configuration for the browser runtime
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    vaarthalu::init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { strict } => {
            vaarthalu::cmd::check::run(&cli.config, strict)?;
        }
        Commands::Export { output, format } => {
            vaarthalu::cmd::export::run(&cli.config, output.as_deref(), format)?;
        }
    }

    Ok(())
}
