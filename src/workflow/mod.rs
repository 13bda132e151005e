//! Review state machines for the transcription workflow.
//!
//! Both review loops, per page ([`page`]) and final combination
//! ([`combine`]), are explicit finite-state machines. A transition is a pure
//! function of `(state, input)` returning the next state plus an ordered list
//! of [`Effect`]s. Nothing in this module touches the clipboard, the PDF or
//! the console; [`crate::session`] executes the effects and gathers the
//! input each state [`Expect`]s.
//!
//! ```text
//! page:     AwaitingInstructions ─▶ AwaitingTranscription ─▶ AwaitingVerification
//!                  ▲                                                │
//!                  └──── Retrying ◀── reject ── AwaitingApproval ◀──┘
//!                                                    │ accept
//!                                                    ▼
//!                                                 Approved
//!
//! combine:  Composing ─▶ AwaitingCombined ─▶ AwaitingApproval ─▶ Approved
//!               ▲                                   │ reject
//!               └───────────── Retrying ◀───────────┘
//! ```

pub mod combine;
pub mod page;

pub use combine::{CombineMachine, CombineState};
pub use page::{PageMachine, PageState};

use crate::prompts;

/// Prompt for instructions that apply to the whole document, shown with page 1.
pub const GENERAL_INSTRUCTIONS_PROMPT: &str = "Are there any special instructions you have for the LLM regarding your PDF as a whole?\n\
(This first page is an example to remind you. Press Enter to skip):";

/// Prompt at end of run when a clipboard snapshot exists.
pub const RESTORE_PROMPT: &str = "Once you are done with the full latex document, hit enter to retrieve your clipboard from before the run.\n\
If you wish to override your old clipboard with the latex text, enter 'override':";

/// A side effect requested by a transition, executed in order by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the page in the image viewer (skipped when previews are off).
    ShowPage { page_index: usize },
    /// Render the page onto the image clipboard. Failure aborts the run.
    CopyPageImage { page_index: usize },
    /// Replace the text clipboard.
    SetClipboard(String),
    /// Print a status message.
    Say(String),
    /// Block until the user presses Enter; the reply is ignored.
    Pause(String),
}

/// What a state needs before it can move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expect {
    /// Ask the user with this prompt and feed back [`Input::Reply`].
    Reply(String),
    /// Wait for Enter with this prompt, then read the text clipboard and feed
    /// back [`Input::Clipboard`].
    ClipboardAfter(String),
    /// No outside input needed; feed back [`Input::Continue`].
    Nothing,
    /// Terminal state.
    Done,
}

/// Input fed to a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Reply(String),
    Clipboard(String),
    Continue,
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<S> {
    pub state: S,
    pub effects: Vec<Effect>,
}

impl<S> Transition<S> {
    pub fn new(state: S, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    /// Transition that changes nothing (used for input the state does not accept).
    pub fn stay(state: S) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

/// Shared shape of the page and combination review loops.
pub trait ReviewMachine {
    type State;

    /// Initial state plus its entry effects.
    fn start(&self) -> Transition<Self::State>;

    /// What `state` needs next.
    fn expects(&self, state: &Self::State) -> Expect;

    /// Advance `state` with `input`.
    ///
    /// Input of the wrong kind for the state leaves it unchanged with no effects.
    fn step(&self, state: Self::State, input: Input) -> Transition<Self::State>;

    /// The approved text once `state` is terminal.
    fn approved(state: &Self::State) -> Option<&str>;
}

/// The user's verdict on a page or on the combined document.
///
/// Exactly the empty reply approves. Any other content, whitespace included,
/// rejects; no reason is inferred from what was typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Accept,
    Reject,
}

impl Approval {
    pub fn from_reply(reply: &str) -> Self {
        if reply.is_empty() {
            Approval::Accept
        } else {
            Approval::Reject
        }
    }
}

/// End-of-run decision about the clipboard snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreChoice {
    /// Leave the final LaTeX on the clipboard.
    Override,
    /// Put the pre-run clipboard text back.
    Restore,
}

impl RestoreChoice {
    /// `override` (trimmed, any case) keeps the LaTeX; anything else restores.
    pub fn from_reply(reply: &str) -> Self {
        if reply.trim().eq_ignore_ascii_case("override") {
            RestoreChoice::Override
        } else {
            RestoreChoice::Restore
        }
    }
}

/// Approved page transcriptions in page order (the run accumulator).
///
/// Grows by one entry per approved page and never holds a rejected attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pages: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_approved(&mut self, latex: impl Into<String>) {
        self.pages.push(latex.into());
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// All pages joined with [`prompts::PAGE_SEPARATOR`].
    pub fn joined(&self) -> String {
        prompts::join_pages(&self.pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_empty_reply_approves() {
        assert_eq!(Approval::from_reply(""), Approval::Accept);
        assert_eq!(Approval::from_reply("n"), Approval::Reject);
        assert_eq!(Approval::from_reply(" "), Approval::Reject);
        assert_eq!(Approval::from_reply("yes"), Approval::Reject);
    }

    #[test]
    fn override_is_trimmed_and_case_insensitive() {
        assert_eq!(RestoreChoice::from_reply("override"), RestoreChoice::Override);
        assert_eq!(RestoreChoice::from_reply("  OverRide \t"), RestoreChoice::Override);
        assert_eq!(RestoreChoice::from_reply(""), RestoreChoice::Restore);
        assert_eq!(RestoreChoice::from_reply("overrid"), RestoreChoice::Restore);
        assert_eq!(RestoreChoice::from_reply("override please"), RestoreChoice::Restore);
    }

    #[test]
    fn transcript_keeps_page_order() {
        let mut t = Transcript::new();
        assert!(t.is_empty());
        t.push_approved("p1");
        t.push_approved("p2");
        assert_eq!(t.len(), 2);
        assert_eq!(t.pages(), ["p1", "p2"]);
        assert_eq!(t.joined(), format!("p1{}p2", prompts::PAGE_SEPARATOR));
    }
}
