//! signsort CLI - file signed PDFs into an organized folder tree

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

use commands::{ConfigOverrides, cmd_config_init, cmd_config_show, cmd_preview, cmd_watch, resolve_config};

#[derive(Parser)]
#[command(name = "signsort")]
#[command(about = "Watch a directory and file signed PDFs into an organized folder tree")]
#[command(after_help = "\
QUICK START:
  signsort config init                    # Write a default signsort.toml
  signsort preview inbox/ organized/      # See what a run would do
  signsort watch inbox/ organized/        # Watch and move signed PDFs

FILENAME PATTERN:
  <document>_<client>_<date>_<status>.pdf
  e.g. contract_AcmeCorp_2024-08-15_signed.pdf")]
struct Cli {
  /// Path to a TOML config file
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Append logs to this file in addition to the console
  #[arg(long, global = true, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Watch the workplace and move signed PDFs as they stabilize
  Watch {
    /// Directory to watch (overrides the config file)
    workplace: Option<PathBuf>,
    /// Root of the organized output tree (overrides the config file)
    destination: Option<PathBuf>,
    /// Report moves without touching the filesystem
    #[arg(long)]
    dry_run: bool,
    /// Stability timeout in milliseconds
    #[arg(long, value_name = "MS")]
    stability_timeout: Option<u64>,
    /// Skip files already present in the workplace at startup
    #[arg(long)]
    no_initial_scan: bool,
    /// Status keyword that counts as signed (repeatable; replaces the
    /// config file list)
    #[arg(long = "keyword", value_name = "WORD")]
    keywords: Vec<String>,
    /// Print every lifecycle event as a JSON line
    #[arg(long)]
    json: bool,
  },
  /// Show what a watch run would do with the files currently present
  Preview {
    /// Directory to evaluate (overrides the config file)
    workplace: Option<PathBuf>,
    /// Root of the organized output tree (overrides the config file)
    destination: Option<PathBuf>,
    /// Status keyword that counts as signed (repeatable; replaces the
    /// config file list)
    #[arg(long = "keyword", value_name = "WORD")]
    keywords: Vec<String>,
    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
  },
  /// Manage configuration
  Config {
    #[command(subcommand)]
    command: ConfigCommand,
  },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
  /// Write a default config file
  Init {
    /// Output path (default: ./signsort.toml)
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
  },
  /// Show the effective configuration as TOML
  Show,
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  let _guard = logging::init_logging(cli.log_file.as_deref())?;

  match cli.command {
    Commands::Watch {
      workplace,
      destination,
      dry_run,
      stability_timeout,
      no_initial_scan,
      keywords,
      json,
    } => {
      let config = resolve_config(cli.config.as_deref(), ConfigOverrides {
        workplace,
        destination,
        dry_run,
        stability_timeout_ms: stability_timeout,
        no_initial_scan,
        keywords,
      })?;
      cmd_watch(config, json).await
    }

    Commands::Preview {
      workplace,
      destination,
      keywords,
      json,
    } => {
      let config = resolve_config(cli.config.as_deref(), ConfigOverrides {
        workplace,
        destination,
        keywords,
        ..Default::default()
      })?;
      cmd_preview(&config, json)
    }

    Commands::Config { command } => match command {
      ConfigCommand::Init { output, force } => cmd_config_init(output.as_deref(), force),
      ConfigCommand::Show => cmd_config_show(cli.config.as_deref()),
    },
  }
}
