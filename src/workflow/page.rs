//! Per-page review loop.
//!
//! One page goes through: instructions → image + transcription request →
//! candidate LaTeX from the clipboard → image again + verification request →
//! the user's verdict. A rejection discards the candidate and starts the page
//! over; only an approved candidate ever leaves this machine.

use super::{Approval, Effect, Expect, Input, ReviewMachine, Transition};
use crate::prompts;

/// State of one page attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    AwaitingInstructions,
    AwaitingTranscription,
    AwaitingVerification { candidate: String },
    AwaitingApproval { candidate: String },
    Approved { latex: String },
    Retrying,
}

/// Review loop for the page at `page_index` (zero-based; shown as `page_index + 1`).
#[derive(Debug, Clone)]
pub struct PageMachine {
    page_index: usize,
    general_instructions: String,
}

impl PageMachine {
    pub fn new(page_index: usize, general_instructions: impl Into<String>) -> Self {
        Self {
            page_index,
            general_instructions: general_instructions.into(),
        }
    }

    /// One-based page number used in every message.
    pub fn page_number(&self) -> usize {
        self.page_index + 1
    }

    fn entry_effects(&self) -> Vec<Effect> {
        vec![
            Effect::ShowPage {
                page_index: self.page_index,
            },
            Effect::Say(format!(
                "\n{rule}\n◆ Page {}\n{rule}",
                self.page_number(),
                rule = "=".repeat(50)
            )),
        ]
    }

    fn on_instructions(&self, specific: &str) -> Transition<PageState> {
        let n = self.page_number();
        Transition::new(
            PageState::AwaitingTranscription,
            vec![
                Effect::CopyPageImage {
                    page_index: self.page_index,
                },
                Effect::Say(format!("\n📋 Image of Page {n} copied to clipboard.")),
                Effect::Pause("   Hit Enter once you have pasted it into the LLM...".into()),
                Effect::SetClipboard(prompts::transcription_request(
                    &self.general_instructions,
                    specific,
                )),
                Effect::Say("\n📋 Prompt copied to clipboard.".into()),
            ],
        )
    }

    fn on_candidate(&self, candidate: String) -> Transition<PageState> {
        let n = self.page_number();
        Transition::new(
            PageState::AwaitingVerification { candidate },
            vec![
                Effect::CopyPageImage {
                    page_index: self.page_index,
                },
                Effect::Say(format!(
                    "\n📋 Image of Page {n} copied to clipboard AGAIN for verification."
                )),
                Effect::Pause("   Paste it into a new chat and press Enter...".into()),
            ],
        )
    }

    fn on_verdict(&self, candidate: String, reply: &str) -> Transition<PageState> {
        let n = self.page_number();
        match Approval::from_reply(reply) {
            Approval::Accept => Transition::new(
                PageState::Approved { latex: candidate },
                vec![Effect::Say(format!("✅ Page {n} approved!"))],
            ),
            Approval::Reject => Transition::new(
                PageState::Retrying,
                vec![Effect::Say(format!("🔄 Retrying Page {n}..."))],
            ),
        }
    }
}

impl ReviewMachine for PageMachine {
    type State = PageState;

    fn start(&self) -> Transition<PageState> {
        Transition::new(PageState::AwaitingInstructions, self.entry_effects())
    }

    fn expects(&self, state: &PageState) -> Expect {
        match state {
            PageState::AwaitingInstructions => Expect::Reply(format!(
                "Are there any special instructions for this specific image (Page {})?\n(Press Enter to skip):",
                self.page_number()
            )),
            PageState::AwaitingTranscription => Expect::ClipboardAfter(
                "   Paste it into the LLM, wait for a response, then copy the FULL LaTeX response \
to your clipboard and hit Enter here..."
                    .into(),
            ),
            PageState::AwaitingVerification { .. } | PageState::Retrying => Expect::Nothing,
            PageState::AwaitingApproval { .. } => Expect::Reply(
                "   --> If there were NO significant deviations, just hit Enter.\n   \
--> If something went wrong, enter ANY character and then hit Enter to retry this page:"
                    .into(),
            ),
            PageState::Approved { .. } => Expect::Done,
        }
    }

    fn step(&self, state: PageState, input: Input) -> Transition<PageState> {
        match (state, input) {
            (PageState::AwaitingInstructions, Input::Reply(specific)) => {
                self.on_instructions(&specific)
            }
            (PageState::AwaitingTranscription, Input::Clipboard(candidate)) => {
                self.on_candidate(candidate)
            }
            (PageState::AwaitingVerification { candidate }, Input::Continue) => Transition::new(
                PageState::AwaitingApproval { candidate },
                vec![
                    Effect::SetClipboard(prompts::PAGE_VERIFICATION_REQUEST.into()),
                    Effect::Say(
                        "\n📋 Verification prompt copied to clipboard.\n   \
Paste this prompt into the LLM and review its answer."
                            .into(),
                    ),
                ],
            ),
            (PageState::AwaitingApproval { candidate }, Input::Reply(reply)) => {
                self.on_verdict(candidate, &reply)
            }
            (PageState::Retrying, Input::Continue) => self.start(),
            (state, _) => Transition::stay(state),
        }
    }

    fn approved(state: &PageState) -> Option<&str> {
        match state {
            PageState::Approved { latex } => Some(latex),
            _ => None,
        }
    }
}
