//! The transcription run: drives the review machines against real capabilities.
//!
//! A [`Session`] owns nothing global. The extractor, text clipboard, console
//! and optional preview are handed in, and the pre-run clipboard snapshot is
//! passed explicitly from [`Session::capture_snapshot`] to [`Session::run`] /
//! [`Session::finish`]. That keeps the whole run drivable from tests with
//! fakes and a scripted console.
//!
//! ## Run order
//!
//! 1. General instructions, asked against page 1 as a preview
//! 2. Every page `0..N` through [`PageMachine`], in order, until approved
//! 3. One [`CombineMachine`] pass over the joined transcript
//! 4. Offer to restore the snapshot
//!
//! Any extraction failure aborts the run at once; there is no resume.

use crate::config::WorkflowConfig;
use crate::console::Console;
use crate::error::Pdf2TexError;
use crate::pipeline::clipboard::TextClipboard;
use crate::pipeline::extract::PageExtractor;
use crate::pipeline::input::discover_document;
use crate::pipeline::preview::PagePreview;
use crate::pipeline::render::PageRenderer;
use crate::workflow::{
    CombineMachine, Effect, Expect, Input, PageMachine, RestoreChoice, ReviewMachine, Transcript,
    GENERAL_INSTRUCTIONS_PROMPT, RESTORE_PROMPT,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The opened input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub page_count: usize,
}

impl Document {
    /// Open `path` far enough to learn its page count.
    ///
    /// A document that cannot be decoded, or that has no pages, is a
    /// [`Pdf2TexError::DocumentOpen`].
    pub fn open(path: &Path, renderer: &dyn PageRenderer) -> Result<Self, Pdf2TexError> {
        let page_count = renderer
            .page_count(path)
            .map_err(|e| Pdf2TexError::DocumentOpen {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;

        if page_count == 0 {
            return Err(Pdf2TexError::DocumentOpen {
                path: path.to_path_buf(),
                detail: "document has no pages".into(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            page_count,
        })
    }
}

/// Text clipboard contents saved before the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardSnapshot(String);

impl ClipboardSnapshot {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// First `max_chars` characters, with `...` appended when truncated.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.0.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

/// Save the current text clipboard, if it holds anything but whitespace.
///
/// The first `preview_chars` characters are echoed to the console. A
/// clipboard that cannot be read is reported and treated as empty.
pub fn capture_snapshot(
    clipboard: &dyn TextClipboard,
    console: &mut dyn Console,
    preview_chars: usize,
) -> Option<ClipboardSnapshot> {
    match clipboard.get_text() {
        Ok(text) if !text.trim().is_empty() => {
            let snapshot = ClipboardSnapshot::new(text);
            console.say(&format!(
                "Saved clipboard from before the run: \"{}\"",
                snapshot.preview(preview_chars)
            ));
            Some(snapshot)
        }
        Ok(_) => None,
        Err(e) => {
            warn!("Could not read clipboard at start: {}", e);
            console.say(&format!("Warning: could not read clipboard at start: {e}"));
            None
        }
    }
}

/// Find the input document, then bind the renderer that will read it.
///
/// Discovery runs first so a missing, empty or crowded input directory is
/// reported as such (and the directory gets created) even when the renderer
/// could not be loaded.
pub fn locate_and_bind<R>(
    config: &WorkflowConfig,
    bind: impl FnOnce(&WorkflowConfig) -> Result<R, Pdf2TexError>,
) -> Result<(PathBuf, R), Pdf2TexError> {
    let path = discover_document(&config.input_dir)?;
    let renderer = bind(config)?;
    Ok((path, renderer))
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Approved page transcriptions, one per page, in page order.
    pub transcript: Transcript,
    /// The approved combined document.
    pub latex: String,
    /// End-of-run clipboard decision, `None` when there was no snapshot.
    pub restore: Option<RestoreChoice>,
}

/// One interactive transcription run.
pub struct Session<'a> {
    extractor: &'a dyn PageExtractor,
    clipboard: &'a dyn TextClipboard,
    console: &'a mut dyn Console,
    preview: Option<&'a dyn PagePreview>,
}

impl<'a> Session<'a> {
    pub fn new(
        extractor: &'a dyn PageExtractor,
        clipboard: &'a dyn TextClipboard,
        console: &'a mut dyn Console,
    ) -> Self {
        Self {
            extractor,
            clipboard,
            console,
            preview: None,
        }
    }

    /// Show each page in a viewer before asking about it.
    pub fn with_preview(mut self, preview: &'a dyn PagePreview) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Save the current text clipboard, if it holds anything but whitespace.
    ///
    /// See [`capture_snapshot`].
    pub fn capture_snapshot(&mut self, preview_chars: usize) -> Option<ClipboardSnapshot> {
        capture_snapshot(self.clipboard, &mut *self.console, preview_chars)
    }

    /// Run the whole workflow on `document`, ending with the restore offer.
    pub fn run(
        &mut self,
        document: &Document,
        snapshot: Option<ClipboardSnapshot>,
    ) -> Result<RunOutcome, Pdf2TexError> {
        info!(
            "Transcribing {} ({} pages)",
            document.path.display(),
            document.page_count
        );
        self.console
            .say(&format!("✅ Found PDF: {}", document.path.display()));

        let general = self.collect_general_instructions(document)?;
        let transcript = self.transcribe_pages(document, &general)?;
        let latex = self.combine(document, &transcript)?;
        let restore = self.finish(snapshot.as_ref())?;

        self.console.say("✅ Program finished.");
        Ok(RunOutcome {
            transcript,
            latex,
            restore,
        })
    }

    /// Ask once for instructions that apply to every page, showing page 1.
    pub fn collect_general_instructions(
        &mut self,
        document: &Document,
    ) -> Result<String, Pdf2TexError> {
        self.apply(&Effect::ShowPage { page_index: 0 }, document)?;
        Ok(self.console.ask(GENERAL_INSTRUCTIONS_PROMPT)?)
    }

    /// Review every page in order; returns one approved entry per page.
    pub fn transcribe_pages(
        &mut self,
        document: &Document,
        general: &str,
    ) -> Result<Transcript, Pdf2TexError> {
        let mut transcript = Transcript::new();
        for page_index in 0..document.page_count {
            let machine = PageMachine::new(page_index, general);
            let latex = self.drive(&machine, document)?;
            info!("Page {} approved ({} chars)", page_index + 1, latex.len());
            transcript.push_approved(latex);
        }
        Ok(transcript)
    }

    /// Merge the transcript into one document via the combination loop.
    pub fn combine(
        &mut self,
        document: &Document,
        transcript: &Transcript,
    ) -> Result<String, Pdf2TexError> {
        let machine = CombineMachine::new(&transcript.joined());
        self.drive(&machine, document)
    }

    /// Offer to put the snapshot back. Does nothing without a snapshot.
    pub fn finish(
        &mut self,
        snapshot: Option<&ClipboardSnapshot>,
    ) -> Result<Option<RestoreChoice>, Pdf2TexError> {
        let Some(snapshot) = snapshot else {
            return Ok(None);
        };

        self.console.say("");
        let reply = self.console.ask(RESTORE_PROMPT)?;
        let choice = RestoreChoice::from_reply(&reply);
        match choice {
            RestoreChoice::Override => self.console.say(
                "Clipboard override chosen. The LaTeX stays on your clipboard instead of your prior clipboard.",
            ),
            RestoreChoice::Restore => {
                self.clipboard.set_text(snapshot.text())?;
                self.console
                    .say("Restored your clipboard from before the run.");
            }
        }
        Ok(Some(choice))
    }

    /// Run `machine` from its start state until it approves something.
    fn drive<M: ReviewMachine>(
        &mut self,
        machine: &M,
        document: &Document,
    ) -> Result<String, Pdf2TexError> {
        let mut transition = machine.start();
        loop {
            for effect in &transition.effects {
                self.apply(effect, document)?;
            }
            if let Some(text) = M::approved(&transition.state) {
                return Ok(text.to_string());
            }

            let input = match machine.expects(&transition.state) {
                Expect::Reply(prompt) => Input::Reply(self.console.ask(&prompt)?),
                Expect::ClipboardAfter(prompt) => {
                    self.console.ask(&prompt)?;
                    Input::Clipboard(self.clipboard.get_text()?)
                }
                Expect::Nothing => Input::Continue,
                // Only approved states are terminal, and those returned above.
                Expect::Done => Input::Continue,
            };
            transition = machine.step(transition.state, input);
        }
    }

    fn apply(&mut self, effect: &Effect, document: &Document) -> Result<(), Pdf2TexError> {
        match effect {
            Effect::ShowPage { page_index } => {
                let Some(preview) = self.preview else {
                    return Ok(());
                };
                self.console
                    .busy(&format!("Rendering preview of page {}", page_index + 1));
                let shown = preview.show(&document.path, *page_index);
                self.console.idle();
                if let Err(e) = shown {
                    warn!("Preview of page {} failed: {}", page_index + 1, e);
                    self.console.say(&format!(
                        "Could not display page {}: {e}",
                        page_index + 1
                    ));
                }
            }
            Effect::CopyPageImage { page_index } => {
                self.console
                    .busy(&format!("Copying page {} to the clipboard", page_index + 1));
                let copied = self.extractor.extract_and_copy(&document.path, *page_index);
                self.console.idle();
                copied?;
            }
            Effect::SetClipboard(text) => {
                debug!("Clipboard ← {} chars", text.len());
                self.clipboard.set_text(text)?;
            }
            Effect::Say(message) => self.console.say(message),
            Effect::Pause(prompt) => {
                self.console.ask(prompt)?;
            }
        }
        Ok(())
    }
}
