//! # disuware
//!
//! Runs applications composed of independently authored modules.
//!
//! ## Running
//!
//! ```bash
//! # Start every module of a configuration
//! disuware run fixtures/consoledicts/config.toml
//!
//! # Show modules in load order, with their requirements
//! disuware list --linked --dependencies fixtures/consoledicts/config.toml
//!
//! # With debug logging
//! disuware -v run fixtures/consoledicts/config.toml
//! RUST_LOG=disuware_runtime=trace disuware run fixtures/consoledicts/config.toml
//! ```
//!
//! Logs go to stderr; a successful run at the default level writes nothing there.

use anyhow::Result;
use clap::{Parser, Subcommand};
use disuware_cli::{builtin_catalog, commands, printer};
use disuware_runtime::RunConfig;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Runs applications composed of versioned modules
#[derive(Parser, Debug)]
#[command(name = "disuware")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level, overriding the configuration file and RUST_LOG
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Executes given configuration and starts the application
    Run {
        /// Path to the run configuration (TOML or JSON)
        config_file: PathBuf,
    },

    /// Lists all found modules for given config
    List {
        /// Sort the list by linking for order of execution
        #[arg(short, long)]
        linked: bool,

        /// Print the dependencies along
        #[arg(short, long)]
        dependencies: bool,

        /// Path to the run configuration (TOML or JSON)
        config_file: PathBuf,
    },
}

impl Command {
    fn config_file(&self) -> &PathBuf {
        match self {
            Command::Run { config_file } | Command::List { config_file, .. } => config_file,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RunConfig::load(cli.command.config_file())?;
    init_logging(&cli, &config);
    debug!("Loaded configuration from {}", cli.command.config_file().display());

    match cli.command {
        Command::Run { .. } => commands::run(config, builtin_catalog()).await,
        Command::List {
            linked,
            dependencies,
            ..
        } => {
            let modules = commands::list(config, linked).await?;

            let mut out = std::io::stdout().lock();
            printer::print_modules(&mut out, &modules, dependencies)?;
            out.flush()?;
            Ok(())
        }
    }
}

/// Install the stderr subscriber.
///
/// An explicit `--log-level` or `-v` wins, then `RUST_LOG`, then the
/// configuration's `log_level`, then `warn`.
fn init_logging(cli: &Cli, config: &RunConfig) {
    let explicit = cli
        .log_level
        .as_deref()
        .or(cli.verbose.then_some("debug"));

    let filter = match explicit {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))
        }),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true)
        .init();
}
