//! # Touchstream Configuration Validator
//!
//! Command-line tool for validating orchestrator configuration before a
//! deployment picks it up.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use touchstream_orchestrator::config::{ConfigManager, OrchestratorConfig};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate Touchstream orchestrator configuration")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment whose override file is applied (development, test, production)
    #[arg(short, long, default_value = "development")]
    environment: String,

    /// Configuration directory path (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Validate a single configuration file instead of a directory
    #[arg(short, long, conflicts_with = "config_dir")]
    file: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format (table, json)
    #[arg(long, default_value = "table")]
    format: String,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load and validate the configuration
    Validate,

    /// Print the effective configuration
    Show,

    /// Print the built-in defaults
    Defaults,
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    let result = match &cli.command {
        Some(Commands::Validate) | None => validate(&cli),
        Some(Commands::Show) => show(&cli),
        Some(Commands::Defaults) => print_config(&OrchestratorConfig::default(), &cli.format),
    };

    match result {
        Ok(()) => {
            info!("Configuration validation completed successfully");
            process::exit(0);
        }
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            process::exit(1);
        }
    }
}

fn load(cli: &Cli) -> anyhow::Result<std::sync::Arc<ConfigManager>> {
    let manager = match &cli.file {
        Some(path) => ConfigManager::load_from_file(path)?,
        None => ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), &cli.environment)?,
    };
    Ok(manager)
}

fn validate(cli: &Cli) -> anyhow::Result<()> {
    println!("🔧 Validating Touchstream Configuration");
    println!("Environment: {}", cli.environment);

    let manager = match load(cli) {
        Ok(manager) => manager,
        Err(e) => {
            println!("❌ Failed to load configuration: {e}");
            return Err(e);
        }
    };

    match manager.config_file() {
        Some(path) => println!("✅ Loaded {}", path.display()),
        None => println!("ℹ️  No configuration file found, using defaults and environment"),
    }

    let config = manager.config();
    println!(
        "   ✅ Polling: every {}s for up to {}s",
        config.polling.interval_seconds, config.polling.timeout_seconds
    );
    println!("   ✅ Failure policy: {:?}", config.failure_policy);
    println!(
        "   ✅ Manifest timeout policy: {:?}",
        config.manifests.timeout_policy
    );

    println!("\n🎉 All configuration validation checks passed!");
    Ok(())
}

fn show(cli: &Cli) -> anyhow::Result<()> {
    let manager = load(cli)?;
    print_config(manager.config(), &cli.format)
}

fn print_config(config: &OrchestratorConfig, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(config)?),
        "table" => {
            let value = serde_json::to_value(config)?;
            print_table("", &value);
        }
        other => anyhow::bail!("Unsupported output format: {other}"),
    }
    Ok(())
}

fn print_table(prefix: &str, value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                print_table(&path, child);
            }
        }
        leaf => println!("{prefix:<45} {leaf}"),
    }
}
