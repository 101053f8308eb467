//! hookvault CLI
//!
//! Store files in a Discord channel through a webhook.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{CliConfig, resolve_path_from_env};

/// hookvault: chunked file storage on a chat webhook.
#[derive(Parser, Debug)]
#[command(name = "hookvault", version, about)]
struct Cli {
    /// Config file path.
    #[arg(long, env = "HOOKVAULT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Webhook URL, overriding the config file.
    #[arg(long, env = "HOOKVAULT_WEBHOOK_URL", global = true, hide_env_values = true)]
    webhook_url: Option<String>,

    /// Bot token for listing and deleting, overriding the config file.
    #[arg(long, env = "HOOKVAULT_BOT_TOKEN", global = true, hide_env_values = true)]
    bot_token: Option<String>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save the webhook URL to the config file.
    Setup(commands::setup::SetupArgs),
    /// Show the configuration and check the webhook.
    Status,
    /// Upload one or more files.
    Upload(commands::upload::UploadArgs),
    /// List stored files.
    List,
    /// Download a stored file.
    Download(commands::download::DownloadArgs),
    /// Delete a stored file.
    Delete(commands::delete::DeleteArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let path = resolve_path_from_env(cli.config.as_deref())?;
    let file_config = CliConfig::load(&path)?;

    if let Command::Setup(args) = &cli.command {
        return commands::setup::run(&path, file_config, args, &cli.format);
    }

    let config = file_config.with_overrides(cli.webhook_url, cli.bot_token);
    match cli.command {
        Command::Setup(_) => Ok(()),
        Command::Status => commands::status::run(&path, &config, &cli.format).await,
        Command::Upload(args) => commands::upload::run(&config, &args, &cli.format).await,
        Command::List => commands::list::run(&config, &cli.format).await,
        Command::Download(args) => commands::download::run(&config, &args, &cli.format).await,
        Command::Delete(args) => commands::delete::run(&config, &args, &cli.format).await,
    }
}
