use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::Args;
use hookvault_core::{FileId, format_size};

use crate::OutputFormat;
use crate::config::CliConfig;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Id of the file to download.
    pub file_id: FileId,

    /// Where to write the file. A directory keeps the stored name.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

pub async fn run(
    config: &CliConfig,
    args: &DownloadArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let client = super::open_client(config, format)?;
    let file = client.download(&args.file_id).await?;

    let target = output_path(args.output.as_deref(), &file.file_name);
    if !args.force && tokio::fs::try_exists(&target).await? {
        bail!(
            "{} already exists; pass --force to overwrite",
            target.display()
        );
    }
    tokio::fs::write(&target, &file.data).await?;

    match format {
        OutputFormat::Json => {
            super::print_json(&serde_json::json!({
                "file_id": file.file_id,
                "file_name": file.file_name,
                "file_type": file.file_type,
                "file_size": file.data.len(),
                "path": target,
            }))?;
        }
        OutputFormat::Text => {
            println!(
                "Saved {} ({}) to {}",
                file.file_name,
                format_size(file.data.len() as u64),
                target.display()
            );
        }
    }
    Ok(())
}

/// Pick the destination path. The stored name is reduced to its last
/// component so it can never escape the target directory.
fn output_path(output: Option<&Path>, stored_name: &str) -> PathBuf {
    let name = Path::new(stored_name)
        .file_name()
        .map_or_else(|| PathBuf::from("download.bin"), PathBuf::from);
    match output {
        Some(dir) if dir.is_dir() => dir.join(name),
        Some(path) => path.to_owned(),
        None => name,
    }
}
