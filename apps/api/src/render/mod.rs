// Document Assembler: layout + .docx packaging.
// Packaging is blocking file I/O and must run inside tokio::task::spawn_blocking.

pub mod docx;
pub mod layout;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::document::{ProjectMetadata, SectionContent};

pub use docx::DOCX_MIME;
pub use layout::layout_document;

/// File name of the assembled document inside a session's output directory.
pub const OUTPUT_FILE_NAME: &str = "project_documentation.docx";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Package error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Render task failed: {0}")]
    Join(String),
}

/// Lays out and writes the document to `path`, overwriting any previous file.
/// Returns the path written.
pub fn assemble_document(
    metadata: &ProjectMetadata,
    sections: &SectionContent,
    path: &Path,
) -> Result<PathBuf, RenderError> {
    let layout = layout_document(metadata, sections);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = docx::write_package(&layout, BufWriter::new(file))?;
    writer.flush()?;

    info!(
        "Assembled document '{}' ({} headings, {} blocks, {} page breaks) at {}",
        layout.title,
        layout.headings(1).count(),
        layout.blocks.len(),
        layout.page_breaks(),
        path.display()
    );

    Ok(path.to_path_buf())
}

/// `assemble_document` on the blocking pool.
pub async fn assemble_in_background(
    metadata: ProjectMetadata,
    sections: SectionContent,
    path: PathBuf,
) -> Result<PathBuf, RenderError> {
    tokio::task::spawn_blocking(move || assemble_document(&metadata, &sections, &path))
        .await
        .map_err(|e| RenderError::Join(e.to_string()))?
}
