pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lumopack_core::config::{AppConfig, ConfigError, LoadOptions, LogFormat};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "lumopack",
    about = "LumoPack operator CLI",
    long_about = "Run box compression checks, price requirements records, and inspect the catalog and configuration.",
    after_help = "Examples:\n  lumopack check --length 30 --width 20 --height 15 --flute C --weight 10\n  lumopack quote --file requirements.json\n  lumopack doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Estimate stacking strength of a corrugated box and classify its safety")]
    Check(commands::check::CheckArgs),
    #[command(about = "Price a requirements record read from a file or stdin")]
    Quote {
        #[arg(long, help = "Requirements JSON file; stdin when omitted")]
        file: Option<PathBuf>,
        #[arg(long, help = "Keep full precision instead of rounding money to 2 places")]
        exact: bool,
    },
    #[command(about = "Dump every pricing table and the flute table as JSON")]
    Catalog,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog integrity, and model readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Check(args) => commands::check::run(&args),
        Command::Quote { file, exact } => commands::quote::run(file.as_deref(), exact),
        Command::Catalog => commands::catalog::run(),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Level, format and any load failure the logger should report once it is up.
#[derive(Debug, PartialEq, Eq)]
struct LoggingSetup {
    level: String,
    format: LogFormat,
    config_error: Option<String>,
}

fn logging_setup(loaded: Result<AppConfig, ConfigError>) -> LoggingSetup {
    match loaded {
        Ok(config) => LoggingSetup {
            level: config.logging.level.trim().to_ascii_lowercase(),
            format: config.logging.format,
            config_error: None,
        },
        Err(error) => LoggingSetup {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            config_error: Some(error.to_string()),
        },
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG`, when set,
/// takes precedence over `logging.level`.
fn init_logging() {
    let setup = logging_setup(AppConfig::load(LoadOptions::default()));
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&setup.level));

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let _ = match setup.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if let Some(error) = setup.config_error {
        tracing::warn!(
            event_name = "cli.logging.config_fallback",
            error = %error,
            "configuration did not load; logging at warn in compact format"
        );
    }
}
