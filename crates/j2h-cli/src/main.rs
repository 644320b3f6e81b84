//! j2h CLI - JSON-to-Hive dataset conversion tool.

use anyhow::Result;
use clap::{Parser, Subcommand};
use j2h_core::config::LogFormat;
use j2h_core::Config;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit codes for CLI operations.
///
/// Following Unix conventions:
/// - 0: Success
/// - 1-127: Application errors
#[repr(i32)]
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    /// Successful execution
    Success = 0,
    /// Configuration error (invalid config file, missing required fields)
    ConfigError = 1,
    /// Schema error (malformed records, colliding columns)
    SchemaError = 2,
    /// Write error (output destination unusable)
    WriteError = 3,
    /// Catalog error (metastore connection, registration)
    CatalogError = 4,
    /// General runtime error
    RuntimeError = 10,
}

impl ExitCode {
    /// Convert an error to an exit code by inspecting the error message.
    fn from_error(error: &anyhow::Error) -> Self {
        let error_str = error.to_string().to_lowercase();

        if error_str.contains("config") || error_str.contains("toml") {
            ExitCode::ConfigError
        } else if error_str.contains("schema") || error_str.contains("malformed") {
            ExitCode::SchemaError
        } else if error_str.contains("write") || error_str.contains("destination") {
            ExitCode::WriteError
        } else if error_str.contains("metastore")
            || error_str.contains("catalog")
            || error_str.contains("registration")
        {
            ExitCode::CatalogError
        } else {
            ExitCode::RuntimeError
        }
    }
}

mod commands;

#[derive(Parser)]
#[command(name = "j2h")]
#[command(about = "Convert JSON datasets to CSV and register Hive external tables", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the conversion pipeline
    Run {
        /// Process only the named dataset
        #[arg(long)]
        dataset: Option<String>,
    },

    /// Show a dataset's inferred schema and first rows
    Preview {
        /// Dataset name from the configuration
        dataset: String,

        /// Number of rows to show
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Preview the flattened form instead of the raw one
        #[arg(long)]
        flat: bool,
    },

    /// Print the registration DDL for configured tables
    Ddl {
        /// Limit to the named dataset
        #[arg(long)]
        dataset: Option<String>,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() {
    let exit_code = run_cli().await;
    std::process::exit(exit_code as i32);
}

/// Main CLI execution logic with proper error handling.
async fn run_cli() -> ExitCode {
    let cli = Cli::parse();

    // Try to load config for log settings (optional - falls back to JSON)
    let monitoring = cli
        .config
        .as_ref()
        .and_then(|path| std::fs::read_to_string(path).ok())
        .and_then(|content| toml::from_str::<Config>(&content).ok())
        .map(|config| config.monitoring)
        .unwrap_or_default();

    // Initialize logging
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new(monitoring.log_level.as_filter_str()),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    match monitoring.log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .init();
        }
    }

    let result = execute_command(cli).await;

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::from_error(&e)
        }
    }
}

/// Execute the CLI command.
async fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { dataset } => {
            let config = load_config(&cli.config)?;
            commands::run::run(config, dataset).await?;
        }

        Commands::Preview {
            dataset,
            limit,
            flat,
        } => {
            let config = load_config(&cli.config)?;
            commands::preview::run(config, &dataset, limit, flat)?;
        }

        Commands::Ddl { dataset } => {
            let config = load_config(&cli.config)?;
            commands::ddl::run(config, dataset)?;
        }

        Commands::Validate => {
            let config = load_config(&cli.config)?;
            config.validate()?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

fn load_config(path: &Option<PathBuf>) -> Result<Config> {
    let path = path.clone().unwrap_or_else(|| PathBuf::from("config.toml"));

    let content = std::fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}
