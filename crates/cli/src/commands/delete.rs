use clap::Args;
use hookvault_client::{DeleteReport, FileSummary};
use hookvault_core::FileId;
use serde::Serialize;

use crate::OutputFormat;
use crate::config::CliConfig;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Id of the file to delete.
    pub file_id: FileId,
}

#[derive(Debug, Serialize)]
struct Output {
    deleted: DeleteReport,
    files: Vec<FileSummary>,
}

pub async fn run(config: &CliConfig, args: &DeleteArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let client = super::open_client(config, format)?;
    let report = match client.delete(&args.file_id).await {
        Ok(report) => report,
        Err(e) => {
            if let Some(hint) = super::orphan_hint(&e) {
                eprintln!("hint: {hint}");
            }
            return Err(e.into());
        }
    };
    let files = client.list_files().await?;

    match format {
        OutputFormat::Json => super::print_json(&Output {
            deleted: report,
            files,
        })?,
        OutputFormat::Text => {
            println!(
                "Deleted {} ({} message{})",
                report.file_id,
                report.deleted,
                if report.deleted == 1 { "" } else { "s" }
            );
            println!();
            print!("{}", super::list::render(&files));
        }
    }
    Ok(())
}
