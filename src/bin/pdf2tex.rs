//! CLI binary for edgequake-pdf2tex.
//!
//! A thin shim over the library crate: maps CLI flags to `WorkflowConfig`,
//! wires the platform clipboard, pdfium and a terminal console into a
//! `Session`, and turns errors into exit codes.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2tex::{
    capture_snapshot, locate_and_bind, Console, Document, PageExtractor, PageImageExtractor,
    Pdf2TexError, PdfiumRenderer, RestoreChoice, Session, StdConsole, SystemClipboard,
    ViewerPreview, WorkflowConfig, DEFAULT_INPUT_DIR,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, StdinLock, Stdout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal console with an indicatif spinner ───────────────────────────────

/// Console for an interactive terminal.
///
/// Prompts are bold; `busy` shows a spinner on stderr until `idle`, so slow
/// renders and clipboard utilities do not look like a hang.
struct TerminalConsole {
    inner: StdConsole<StdinLock<'static>, Stdout>,
    spinner: Option<ProgressBar>,
    spinners_enabled: bool,
}

impl TerminalConsole {
    fn new(spinners_enabled: bool) -> Self {
        Self {
            inner: StdConsole::stdio(),
            spinner: None,
            spinners_enabled,
        }
    }
}

impl Console for TerminalConsole {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        self.idle();
        self.inner.ask(&bold(prompt))
    }

    fn say(&mut self, message: &str) {
        self.inner.say(message);
    }

    fn busy(&mut self, message: &str) {
        if !self.spinners_enabled {
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(format!("{message}…"));
        bar.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(bar);
    }

    fn idle(&mut self) {
        if let Some(bar) = self.spinner.take() {
            bar.finish_and_clear();
        }
    }
}

// ── CLI definition ───────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Transcribe the single PDF in ./prelatex-pdf
  pdf2tex

  # Use another input directory, no page previews
  pdf2tex --input-dir scans --no-preview

  # Check that page images reach the clipboard (paste into any image app)
  pdf2tex --check-clipboard notes.pdf --page 2

HOW IT WORKS:
  Each page goes through the same hand-off with your LLM chat:
    1. the page image is copied; paste it into the chat
    2. the transcription prompt is copied; paste it too
    3. copy the model's LaTeX answer and press Enter
    4. the image is copied again with a verification prompt
    5. press Enter to approve, or type anything to redo the page
  After the last page the approved pages are merged the same way. At the end
  your clipboard from before the run can be restored (type 'override' to keep
  the LaTeX instead).

CLIPBOARD UTILITIES:
  macOS     osascript, pbcopy, pbpaste (built in)
  X11       xclip
  Wayland   wl-clipboard (wl-copy, wl-paste)
  Windows   PowerShell (built in)

PDFIUM:
  Rendering needs the pdfium shared library. It is looked up in --pdfium-lib,
  then the current directory, then the system library path.

EXIT CODES:
  0 success, 2 no PDF or several PDFs in the input directory, 3 document could
  not be opened, 4 page extraction failed, 5 text clipboard failed, 1 other
"#;

/// Transcribe a scanned PDF into LaTeX through your LLM chat and the clipboard.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2tex",
    version,
    about = "Transcribe a scanned PDF into LaTeX through your LLM chat and the clipboard",
    long_about = "Walks you through transcribing every page of a scanned PDF into LaTeX. \
Page images and prompts are placed on the system clipboard for you to paste into any chat LLM; \
the model's answers are read back from the clipboard, verified page by page, and merged into \
one document at the end.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory expected to contain exactly one PDF (created if missing).
    #[arg(long, default_value = DEFAULT_INPUT_DIR)]
    input_dir: PathBuf,

    /// Only copy one page image of this PDF to the clipboard, then exit.
    #[arg(long, value_name = "PDF")]
    check_clipboard: Option<PathBuf>,

    /// Page copied by --check-clipboard (1-indexed).
    #[arg(long, default_value_t = 1, requires = "check_clipboard",
          value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,

    /// Clipboard backend.
    #[arg(long, value_enum, default_value = "auto")]
    clipboard: ClipboardArg,

    /// Do not open pages in the image viewer.
    #[arg(long)]
    no_preview: bool,

    /// Longest side of rendered page images, in pixels.
    #[arg(long, default_value_t = 2000,
          value_parser = clap::value_parser!(u32).range(100..=10000))]
    max_pixels: u32,

    /// PDF user password for encrypted documents.
    #[arg(long)]
    password: Option<String>,

    /// Directory containing the pdfium shared library.
    #[arg(long, value_name = "DIR")]
    pdfium_lib: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors and hide spinners.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ClipboardArg {
    Auto,
    Macos,
    X11,
    Wayland,
    Windows,
}

impl From<ClipboardArg> for SystemClipboard {
    fn from(v: ClipboardArg) -> Self {
        match v {
            ClipboardArg::Auto => SystemClipboard::detect(),
            ClipboardArg::Macos => SystemClipboard::MacOs,
            ClipboardArg::X11 => SystemClipboard::X11,
            ClipboardArg::Wayland => SystemClipboard::Wayland,
            ClipboardArg::Windows => SystemClipboard::Windows,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // stdout belongs to the interactive prompts, so logs go to stderr and
    // stay at warn unless asked for.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<Pdf2TexError>())
                .map(Pdf2TexError::exit_code)
                .unwrap_or(1);
            eprintln!("{} {:#}", red("✘"), err);
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = build_config(cli)?;
    let clipboard: SystemClipboard = cli.clipboard.into();
    tracing::debug!("Clipboard backend: {}", clipboard.name());

    if let Some(ref pdf) = cli.check_clipboard {
        let renderer =
            PdfiumRenderer::bind(&config).context("Failed to load the pdfium library")?;
        return check_clipboard(pdf, cli.page, &renderer, clipboard);
    }

    // Snapshot before anything else touches the clipboard, then find the
    // document before loading pdfium so directory problems are reported first.
    let mut console = TerminalConsole::new(!cli.quiet);
    let snapshot = capture_snapshot(&clipboard, &mut console, config.snapshot_preview_chars);
    let (path, renderer) = locate_and_bind(&config, PdfiumRenderer::bind)?;
    let document = Document::open(&path, &renderer)?;

    let extractor = PageImageExtractor::new(&renderer, clipboard);
    let preview = if config.show_preview {
        match ViewerPreview::new(&renderer) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("Page previews disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    let mut session = Session::new(&extractor, &clipboard, &mut console);
    if let Some(ref p) = preview {
        session = session.with_preview(p);
    }
    let outcome = session.run(&document, snapshot)?;

    if !cli.quiet {
        eprintln!(
            "{} {} pages  {}  {}",
            green("✔"),
            bold(&outcome.transcript.len().to_string()),
            dim(&format!("{} chars of LaTeX", outcome.latex.chars().count())),
            match outcome.restore {
                Some(RestoreChoice::Restore) => dim("clipboard restored"),
                Some(RestoreChoice::Override) | None => dim("LaTeX left on clipboard"),
            }
        );
    }
    Ok(())
}

/// Copy one page image to the clipboard and report, for checking the setup.
fn check_clipboard(
    pdf: &Path,
    page: u32,
    renderer: &PdfiumRenderer,
    clipboard: SystemClipboard,
) -> Result<()> {
    let extractor = PageImageExtractor::new(renderer, clipboard);
    extractor
        .extract_and_copy(pdf, page as usize - 1)
        .map_err(Pdf2TexError::from)
        .with_context(|| format!("Clipboard check failed for {}", pdf.display()))?;

    eprintln!(
        "{} {} copied to the clipboard  {}",
        green("✔"),
        bold(&format!("Page {page} of {}", pdf.display())),
        dim(&format!("({} backend)", clipboard.name())),
    );
    eprintln!("   {} paste into any image-aware app to confirm", cyan("◆"));
    Ok(())
}

/// Map CLI args to `WorkflowConfig`.
fn build_config(cli: &Cli) -> Result<WorkflowConfig> {
    let mut builder = WorkflowConfig::builder()
        .input_dir(cli.input_dir.clone())
        .max_rendered_pixels(cli.max_pixels)
        .show_preview(!cli.no_preview);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref dir) = cli.pdfium_lib {
        builder = builder.pdfium_lib_dir(dir.clone());
    }

    builder.build().context("Invalid configuration")
}
