use std::path::Path;

use hookvault_discord::DiscordStore;
use serde::Serialize;

use crate::OutputFormat;
use crate::config::{CliConfig, redact_webhook_url};

#[derive(Debug, Serialize)]
struct Status {
    config_path: String,
    configured: bool,
    webhook_url: Option<String>,
    bot_token: bool,
    channel_id: Option<String>,
    webhook_name: Option<String>,
    error: Option<String>,
}

pub async fn run(path: &Path, config: &CliConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let mut status = Status {
        config_path: path.display().to_string(),
        configured: config.webhook_url.is_some(),
        webhook_url: config.webhook_url.as_deref().map(redact_webhook_url),
        bot_token: config.bot_token.is_some(),
        channel_id: None,
        webhook_name: None,
        error: None,
    };

    if status.configured {
        let checked = async {
            let store = DiscordStore::new(config.discord_config()?)?;
            anyhow::Ok(store.webhook_info().await?)
        }
        .await;
        match checked {
            Ok(info) => {
                status.channel_id = Some(info.channel_id);
                status.webhook_name = info.name;
            }
            Err(e) => status.error = Some(e.to_string()),
        }
    }

    match format {
        OutputFormat::Json => super::print_json(&status)?,
        OutputFormat::Text => {
            println!("Config:   {}", status.config_path);
            match &status.webhook_url {
                Some(url) => println!("Webhook:  {url}"),
                None => println!("Webhook:  not configured (run `hookvault setup <webhook-url>`)"),
            }
            println!(
                "Bot token: {}",
                if status.bot_token { "set" } else { "not set" }
            );
            if let Some(channel) = &status.channel_id {
                let name = status.webhook_name.as_deref().unwrap_or("-");
                println!("Channel:  {channel} (webhook {name})");
            }
        }
    }

    match status.error {
        Some(err) => Err(anyhow::anyhow!("webhook check failed: {err}")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_webhook_is_an_error() {
        let config = CliConfig {
            webhook_url: Some("http://127.0.0.1:1/api/webhooks/1/token".into()),
            max_attempts: Some(1),
            timeout_secs: Some(2),
            ..CliConfig::default()
        };
        let err = run(Path::new("config.toml"), &config, &OutputFormat::Json)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("webhook check failed"));
    }

    #[tokio::test]
    async fn unconfigured_status_succeeds() {
        let config = CliConfig::default();
        assert!(
            run(Path::new("config.toml"), &config, &OutputFormat::Text)
                .await
                .is_ok()
        );
    }
}
