use hookvault_client::FileSummary;
use hookvault_core::format_size;

use crate::OutputFormat;
use crate::config::CliConfig;

pub async fn run(config: &CliConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let client = super::open_client(config, format)?;
    let files = client.list_files().await?;

    match format {
        OutputFormat::Json => super::print_json(&files)?,
        OutputFormat::Text => print!("{}", render(&files)),
    }
    Ok(())
}

/// Text table of stored files, one line per file.
pub fn render(files: &[FileSummary]) -> String {
    if files.is_empty() {
        return "No files stored.\n".to_owned();
    }
    let mut out = format!("Files ({}):\n", files.len());
    for file in files {
        let state = if file.complete {
            String::new()
        } else {
            format!(
                "  [incomplete {}/{}]",
                file.present_chunks, file.total_chunks
            )
        };
        let mime = if file.file_type.is_empty() {
            "-"
        } else {
            file.file_type.as_str()
        };
        out.push_str(&format!(
            "  {id}  {name}  {size}  {mime}{state}\n",
            id = file.file_id,
            name = file.file_name,
            size = format_size(file.file_size),
        ));
    }
    out
}
