use std::path::Path;

use clap::Args;

use crate::OutputFormat;
use crate::config::{CliConfig, redact_webhook_url, validate_webhook_url};

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Discord webhook URL.
    pub webhook_url: String,

    /// Bot token used to list and delete messages.
    #[arg(long)]
    pub bot_token: Option<String>,
}

pub fn run(
    path: &Path,
    mut config: CliConfig,
    args: &SetupArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let url = args.webhook_url.trim();
    validate_webhook_url(url)?;

    config.webhook_url = Some(url.to_owned());
    if let Some(token) = &args.bot_token {
        config.bot_token = Some(token.trim().to_owned());
    }
    config.save(path)?;
    tracing::info!(path = %path.display(), "config saved");

    match format {
        OutputFormat::Json => {
            super::print_json(&serde_json::json!({
                "config_path": path,
                "webhook_url": redact_webhook_url(url),
            }))?;
        }
        OutputFormat::Text => {
            println!("Webhook saved to {}", path.display());
            println!("Run `hookvault status` to check it.");
        }
    }
    Ok(())
}
