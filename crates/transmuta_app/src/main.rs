//! Command-line front end for the transmuta conversion session: submit a
//! batch of files, run one conversion round, and write the results out.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use bytes::Bytes;
use clap::Parser;
use log::{error, info, warn};

use transmuta_core::{Category, ConversionStatus, IncomingFile};
use transmuta_engine::ConverterSession;

#[derive(Parser)]
#[command(name = "transmuta")]
#[command(about = "Batch file-format converter")]
struct Cli {
    /// Files to convert.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Target format applied to every compatible item (for example `jpeg`
    /// or `pdf`). Items it does not fit keep their per-category default.
    #[arg(long)]
    to: Option<String>,

    /// Directory the converted files are written to.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    transmuta_logging::init_terminal(cli.verbose).map_err(anyhow::Error::msg)?;

    let mut session = ConverterSession::new();
    let ids = session.submit_files(read_files(&cli.files)?);
    info!("Tracking {} file(s)", ids.len());

    if let Some(format) = &cli.to {
        // The same preference is offered to both categories; each item only
        // takes it when the format belongs to its own target set.
        session.apply_format_to_category(format, Category::Image);
        session.apply_format_to_category(format, Category::Ebook);
    }

    let dispatched = session.start_batch_conversion();
    info!("Converted {} file(s)", dispatched.len());

    for row in &session.snapshot().items {
        if row.status == ConversionStatus::Error {
            error!(
                "{}: {}",
                row.name,
                row.error.as_deref().unwrap_or("conversion failed")
            );
        }
    }

    fs::create_dir_all(&cli.out)
        .with_context(|| format!("creating output directory {}", cli.out.display()))?;
    let mut outputs = Vec::new();
    session.download_all_completed(|download| outputs.push(download));
    for download in &outputs {
        let path = cli.out.join(&download.filename);
        fs::write(&path, &download.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    if outputs.is_empty() {
        bail!("no file could be converted");
    }
    if outputs.len() < ids.len() {
        warn!("{} file(s) failed to convert", ids.len() - outputs.len());
    }
    Ok(())
}

fn read_files(paths: &[PathBuf]) -> anyhow::Result<Vec<IncomingFile>> {
    paths
        .iter()
        .map(|path| {
            let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(IncomingFile {
                name,
                // The filesystem declares no media type; classification
                // falls back to the extension table.
                declared_media_type: String::new(),
                bytes: Bytes::from(bytes),
            })
        })
        .collect()
}
