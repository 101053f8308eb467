use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::Args;
use hookvault_client::{FileSummary, MessageStore, TransferError, UploadReport, VaultClient};
use hookvault_core::format_size;
use serde::Serialize;

use crate::OutputFormat;
use crate::config::CliConfig;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Files to upload.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// MIME type to record instead of guessing from the extension.
    #[arg(long = "type", value_name = "MIME")]
    pub file_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct Failure {
    path: PathBuf,
    error: String,
}

#[derive(Debug, Serialize)]
struct Output {
    uploaded: Vec<UploadReport>,
    failed: Vec<Failure>,
    files: Vec<FileSummary>,
}

pub async fn run(config: &CliConfig, args: &UploadArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let client = super::open_client(config, format)?;
    let text = matches!(format, OutputFormat::Text);

    let (uploaded, failed) = upload_all(&client, &args.paths, args.file_type.as_deref(), |path| {
        if text {
            eprintln!("Uploading {}", path.display());
        }
    })
    .await;
    let files = client.list_files().await?;

    let failures = failed.len();
    match format {
        OutputFormat::Json => super::print_json(&Output {
            uploaded,
            failed,
            files,
        })?,
        OutputFormat::Text => {
            for report in &uploaded {
                println!(
                    "{id}  {name} ({size}, {chunks} chunk{s})",
                    id = report.file_id,
                    name = report.file_name,
                    size = format_size(report.file_size),
                    chunks = report.total_chunks,
                    s = if report.total_chunks == 1 { "" } else { "s" },
                );
            }
            println!();
            print!("{}", super::list::render(&files));
        }
    }

    if failures > 0 {
        bail!("{failures} of {} uploads failed", args.paths.len());
    }
    Ok(())
}

/// Upload each path on its own. A failure is reported to stderr and the
/// remaining paths are still attempted.
async fn upload_all<S: MessageStore>(
    client: &VaultClient<S>,
    paths: &[PathBuf],
    file_type: Option<&str>,
    on_start: impl Fn(&Path),
) -> (Vec<UploadReport>, Vec<Failure>) {
    let mut uploaded = Vec::with_capacity(paths.len());
    let mut failed = Vec::new();
    for path in paths {
        on_start(path);
        match client.upload_path(path, file_type).await {
            Ok(report) => uploaded.push(report),
            Err(e) => {
                report_failure(path, &e);
                failed.push(Failure {
                    path: path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    (uploaded, failed)
}

fn report_failure(path: &Path, err: &TransferError) {
    eprintln!("error: {}: {err}", path.display());
    if let Some(hint) = super::orphan_hint(err) {
        eprintln!("hint: {hint}");
    }
}
