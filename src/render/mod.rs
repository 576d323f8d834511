//! Collaborators that turn generated text into files: markdown to PDF,
//! PDF merging and cover image conversion.

mod pdf;
mod raster;

pub use self::pdf::{
    MergeOutcome, PdfUnite, Wkhtmltopdf, delete_source_pdfs, expected_merge_inputs, merge_book,
    styled_html,
};
pub use self::raster::{CoverConverter, flatten_onto_white};

use crate::error::{BookError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, markdown: &str, output: &Path, font_size: u32) -> Result<()>;
}

#[async_trait]
pub trait PdfMerger: Send + Sync {
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;
}

#[async_trait]
pub trait ImageConverter: Send + Sync {
    async fn vector_to_raster(&self, svg: &Path, png: &Path) -> Result<()>;

    async fn raster_recompress(&self, png: &Path, jpg: &Path, size: (u32, u32)) -> Result<()>;
}

/// Runs an external tool and turns a non-zero exit into `Rendering`.
async fn run_tool(command: &mut Command, tool: &Path) -> Result<()> {
    let output = command.output().await.map_err(|e| BookError::Rendering {
        tool: tool.display().to_string(),
        detail: e.to_string(),
    })?;
    if !output.status.success() {
        return Err(BookError::Rendering {
            tool: tool.display().to_string(),
            detail: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(())
}
