pub mod delete;
pub mod download;
pub mod list;
pub mod setup;
pub mod status;
pub mod upload;

use std::io::Write;
use std::sync::Arc;

use hookvault_client::{Progress, ProgressFn, TransferError, VaultClient};
use hookvault_discord::DiscordStore;

use crate::OutputFormat;
use crate::config::CliConfig;

/// Build a transfer client from the configuration.
///
/// Progress goes to stderr in text mode only, so JSON output stays clean.
pub fn open_client(
    config: &CliConfig,
    format: &OutputFormat,
) -> anyhow::Result<VaultClient<DiscordStore>> {
    let store = DiscordStore::new(config.discord_config()?)?;
    let mut client = VaultClient::new(store);
    if let Some(size) = config.chunk_size() {
        client = client.with_chunk_size(size);
    }
    if matches!(format, OutputFormat::Text) {
        client = client.with_progress(progress_printer());
    }
    Ok(client)
}

fn progress_printer() -> ProgressFn {
    Arc::new(|p: Progress| {
        let mut err = std::io::stderr().lock();
        let _ = write!(
            err,
            "\r{} {}/{} ({}%)",
            p.stage,
            p.completed,
            p.total,
            p.percent()
        );
        if p.completed >= p.total {
            let _ = writeln!(err);
        }
    })
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Cleanup advice for failures that left chunks in the channel.
pub fn orphan_hint(err: &TransferError) -> Option<String> {
    err.orphaned_file().map(|id| {
        format!("chunks of {id} were left in the channel; run `hookvault delete {id}` to remove them")
    })
}
