//! Rasterizing the built page into a PDF.

mod browser;
mod engine;
pub mod margin;

pub use browser::{default_install_paths, BrowserSearch};
pub use engine::{ChromeEngine, PrintEngine};
pub use margin::{page_options, Length, MarginSpec, PageOptions};

use crate::bundle::{inline_stylesheet, INDEX_HTML};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Used when no document name is configured.
pub const DEFAULT_PDF_NAME: &str = "resume";

/// One PDF export of a written bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfJob<'a> {
    pub out_dir: &'a Path,
    pub name: &'a str,
    pub margin: Option<&'a MarginSpec>,
}

impl PdfJob<'_> {
    /// `<out_dir>/<name>.pdf`, or `resume.pdf` without a name.
    pub fn output_path(&self) -> PathBuf {
        let name = if self.name.is_empty() {
            DEFAULT_PDF_NAME
        } else {
            self.name
        };
        self.out_dir.join(format!("{name}.pdf"))
    }
}

/// Print `<out_dir>/index.html` to a PDF, returning the path written.
///
/// The executable is resolved before anything else so a missing browser fails
/// without touching the output directory.
pub fn render_pdf<E: PrintEngine + ?Sized>(
    engine: &E,
    search: &BrowserSearch,
    job: &PdfJob<'_>,
) -> Result<PathBuf> {
    let executable = search.resolve()?;

    let index = job.out_dir.join(INDEX_HTML);
    let html = std::fs::read_to_string(&index)
        .with_context(|| format!("Failed to read {}", index.display()))?;
    let html = inline_stylesheet(&html, job.out_dir)
        .with_context(|| "Failed to inline stylesheet")?;

    let options: PageOptions = page_options(job.output_path(), job.margin)?;
    let bytes = engine
        .print(&executable, &html, &options)
        .with_context(|| "Failed to render PDF")?;

    std::fs::write(&options.path, bytes)
        .with_context(|| format!("Failed to write {}", options.path.display()))?;
    log::info!("wrote {}", options.path.display());
    Ok(options.path)
}
