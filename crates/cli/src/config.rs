//! Persisted CLI configuration.
//!
//! A small TOML file holding the webhook URL and optional tuning. The
//! webhook URL and bot token can also come from the environment, which
//! takes precedence over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hookvault_discord::{DiscordConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name inside the `hookvault` config directory.
const CONFIG_FILE: &str = "config.toml";

/// Errors from loading or saving the CLI configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No webhook URL in the file or the environment.
    #[error("no webhook URL configured; run `hookvault setup <webhook-url>` first")]
    NotConfigured,

    /// No config location could be derived from the environment.
    #[error("cannot locate a config directory; set HOOKVAULT_CONFIG or HOME")]
    NoConfigDir,

    /// The webhook URL does not look like one.
    #[error("invalid webhook URL: {0}")]
    InvalidWebhookUrl(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_limit: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field(
                "webhook_url",
                &self.webhook_url.as_deref().map(redact_webhook_url),
            )
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("username", &self.username)
            .field("message_limit", &self.message_limit)
            .field("chunk_size", &self.chunk_size)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl CliConfig {
    /// Load from `path`. A missing file is an empty configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Write to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_owned(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(io_err)
    }

    /// Let values from the environment win over the file.
    #[must_use]
    pub fn with_overrides(mut self, webhook_url: Option<String>, bot_token: Option<String>) -> Self {
        if let Some(url) = webhook_url.filter(|u| !u.trim().is_empty()) {
            self.webhook_url = Some(url);
        }
        if let Some(token) = bot_token.filter(|t| !t.trim().is_empty()) {
            self.bot_token = Some(token);
        }
        self
    }

    /// Chunk size to upload with, if configured.
    pub fn chunk_size(&self) -> Option<usize> {
        self.chunk_size.filter(|&n| n > 0)
    }

    /// Build the store configuration.
    pub fn discord_config(&self) -> Result<DiscordConfig, ConfigError> {
        let url = self
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::NotConfigured)?;
        validate_webhook_url(url)?;

        let mut config = DiscordConfig::new(url);
        if let Some(base) = &self.api_base {
            config = config.with_api_base(base.as_str());
        }
        if let Some(token) = &self.bot_token {
            config = config.with_bot_token(token.as_str());
        }
        if let Some(name) = &self.username {
            config = config.with_username(name.as_str());
        }
        if let Some(limit) = self.message_limit {
            config = config.with_message_limit(limit);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs.max(1)));
        }
        if let Some(attempts) = self.max_attempts {
            config = config.with_retry(RetryPolicy {
                max_attempts: attempts.max(1),
                ..RetryPolicy::default()
            });
        }
        Ok(config)
    }
}

/// Check that `url` is an http(s) URL pointing at a webhook.
pub fn validate_webhook_url(url: &str) -> Result<(), ConfigError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) if rest.contains("/webhooks/") => Ok(()),
        _ => Err(ConfigError::InvalidWebhookUrl(redact_webhook_url(url))),
    }
}

/// Hide the webhook token, keeping the id.
pub fn redact_webhook_url(url: &str) -> String {
    match url.find("/webhooks/") {
        Some(pos) => {
            let head = &url[..pos + "/webhooks/".len()];
            let tail = &url[head.len()..];
            let id = tail.split('/').next().unwrap_or_default();
            format!("{head}{id}/****")
        }
        None => "****".to_owned(),
    }
}

/// Resolve the config file location.
///
/// `explicit` comes from `--config` or `HOOKVAULT_CONFIG`; otherwise the file
/// lives under `$XDG_CONFIG_HOME/hookvault`, then `$HOME/.config/hookvault`.
pub fn resolve_path(
    explicit: Option<&Path>,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_owned());
    }
    let base = xdg_config_home
        .filter(|p| p.is_absolute())
        .map(Path::to_owned)
        .or_else(|| home.map(|h| h.join(".config")))
        .ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("hookvault").join(CONFIG_FILE))
}

/// [`resolve_path`] with the directories taken from the environment.
pub fn resolve_path_from_env(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let xdg = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    resolve_path(explicit, xdg.as_deref(), home.as_deref())
}
