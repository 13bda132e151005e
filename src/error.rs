//! Error types for the edgequake-pdf2tex library.
//!
//! Two error types reflect two layers of the run:
//!
//! * [`ExtractError`]: one page-image extraction failed. The four kinds
//!   (missing file, bad index, render failure, clipboard failure) are kept
//!   distinct so the console can say exactly what went wrong.
//!
//! * [`Pdf2TexError`] : **Fatal** for the whole run: input discovery, document
//!   open, any extraction failure, or a clipboard/console failure mid-run.
//!   There is no partial-run recovery; the binary reports the error and exits
//!   with the code from [`Pdf2TexError::exit_code`].
//!
//! A user rejecting a page or a combination is *not* an error. It is an input
//! to the review state machines in [`crate::workflow`].

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single `extract_and_copy` call.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document path does not exist (checked before any rendering).
    #[error("PDF file not found: '{path}'")]
    NotFound { path: PathBuf },

    /// The document has no such page (or no pages at all).
    #[error("Page index {index} is out of range (document has {page_count} pages)")]
    IndexOutOfRange { index: usize, page_count: usize },

    /// pdfium could not decode the document or rasterise the page.
    #[error("Rendering failed for page {page}: {detail}")]
    RenderError { page: usize, detail: String },

    /// The platform image clipboard refused the image or its utility is missing.
    #[error("Failed to copy image to clipboard: {detail}")]
    ClipboardError { detail: String },
}

/// All fatal errors returned by the edgequake-pdf2tex library.
#[derive(Debug, Error)]
pub enum Pdf2TexError {
    // ── Input discovery ───────────────────────────────────────────────────
    /// The input directory holds no PDF.
    #[error("No PDF file found in '{dir}'.\nPut exactly one PDF there and run again.")]
    NoDocument { dir: PathBuf },

    /// The input directory holds more than one PDF.
    #[error(
        "Multiple PDFs found in '{dir}'. Please delete old PDFs so there is only one.\nFound: {}",
        display_paths(.found)
    )]
    MultipleDocuments { dir: PathBuf, found: Vec<PathBuf> },

    /// The input directory could not be created or listed.
    #[error("Cannot use input directory '{dir}': {source}")]
    InputDirUnavailable {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// The document exists but could not be opened for a page count.
    #[error("Error opening PDF file '{path}': {detail}")]
    DocumentOpen { path: PathBuf, detail: String },

    /// The file is readable but does not start with `%PDF`.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Run errors ────────────────────────────────────────────────────────
    /// A page image could not be extracted and copied.
    #[error("Could not copy image to clipboard. {0}")]
    Extraction(#[from] ExtractError),

    /// Reading or writing the text clipboard failed.
    #[error("Text clipboard error: {detail}")]
    Clipboard { detail: String },

    /// Reading a reply from the console failed (closed stdin, I/O error).
    #[error("Console I/O failed: {0}")]
    Console(#[from] std::io::Error),

    // ── Setup errors ──────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the binary or in the current directory,\n\
install it system-wide, or point --pdfium-lib at the directory holding it.\n\
Pre-built libraries: https://github.com/bblanchon/pdfium-binaries/releases"
    )]
    PdfiumBindingFailed(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Pdf2TexError {
    /// Process exit code for this error. Success is 0 and never produced here.
    pub fn exit_code(&self) -> u8 {
        match self {
            Pdf2TexError::NoDocument { .. }
            | Pdf2TexError::MultipleDocuments { .. }
            | Pdf2TexError::InputDirUnavailable { .. } => 2,
            Pdf2TexError::DocumentOpen { .. } | Pdf2TexError::NotAPdf { .. } => 3,
            Pdf2TexError::Extraction(_) => 4,
            Pdf2TexError::Clipboard { .. } => 5,
            Pdf2TexError::Console(_)
            | Pdf2TexError::PdfiumBindingFailed(_)
            | Pdf2TexError::InvalidConfig(_) => 1,
        }
    }

    /// True for the "zero or multiple documents" startup errors.
    pub fn is_input_discovery(&self) -> bool {
        matches!(
            self,
            Pdf2TexError::NoDocument { .. } | Pdf2TexError::MultipleDocuments { .. }
        )
    }
}
