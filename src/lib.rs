//! # edgequake-pdf2tex
//!
//! Walk a user through transcribing a scanned PDF into LaTeX with an external
//! chat LLM, using the system clipboard as the only channel between them.
//!
//! ## How a run goes
//!
//! The program never talks to a model. It copies a page image to the
//! clipboard, tells the user to paste it into their chat, then copies the
//! transcription request. When the user has copied the model's answer back,
//! it reads that answer from the clipboard, sends the page image again with a
//! verification request, and asks whether the answer was right. An empty
//! reply approves the page; anything else starts that page over.
//!
//! ```text
//! prelatex-pdf/*.pdf
//!  │
//!  ├─ 1. Input    exactly one PDF in the input directory
//!  ├─ 2. Snapshot save the text clipboard
//!  ├─ 3. Pages    per page: image → request → answer → image → verify → verdict
//!  ├─ 4. Combine  joined pages → merge request → merged answer → verify → verdict
//!  └─ 5. Restore  put the saved clipboard back, or keep the LaTeX ("override")
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2tex::{
//!     capture_snapshot, locate_and_bind, Document, PageImageExtractor, PdfiumRenderer,
//!     Session, StdConsole, SystemClipboard, WorkflowConfig,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WorkflowConfig::default();
//!     let clipboard = SystemClipboard::detect();
//!     let mut console = StdConsole::stdio();
//!
//!     let snapshot = capture_snapshot(&clipboard, &mut console, config.snapshot_preview_chars);
//!     let (path, renderer) = locate_and_bind(&config, PdfiumRenderer::bind)?;
//!     let document = Document::open(&path, &renderer)?;
//!
//!     let extractor = PageImageExtractor::new(&renderer, clipboard);
//!     let outcome = Session::new(&extractor, &clipboard, &mut console).run(&document, snapshot)?;
//!     eprintln!("{} pages transcribed", outcome.transcript.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2tex` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Platform utilities
//!
//! Clipboard access shells out to `osascript`/`pbcopy`/`pbpaste` on macOS,
//! `xclip` or `wl-copy`/`wl-paste` on Linux and PowerShell on Windows. Page
//! rendering needs a pdfium shared library, found next to the binary, in
//! `--pdfium-lib`, or on the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod console;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod session;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{WorkflowConfig, WorkflowConfigBuilder, DEFAULT_INPUT_DIR};
pub use console::{Console, StdConsole};
pub use error::{ExtractError, Pdf2TexError};
pub use pipeline::clipboard::{ImageClipboardWriter, SystemClipboard, TextClipboard};
pub use pipeline::extract::{PageExtractor, PageImageExtractor};
pub use pipeline::input::discover_document;
pub use pipeline::preview::{PagePreview, ViewerPreview};
pub use pipeline::render::{PageRenderer, PdfiumRenderer};
pub use session::{
    capture_snapshot, locate_and_bind, ClipboardSnapshot, Document, RunOutcome, Session,
};
pub use workflow::{Approval, RestoreChoice, Transcript};
