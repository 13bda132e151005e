//! Final combination loop.
//!
//! The approved pages are joined once; every attempt reuses that same joined
//! text, so a rejected merge never feeds back into the next request.

use super::{Approval, Effect, Expect, Input, ReviewMachine, Transition};
use crate::prompts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombineState {
    Composing,
    AwaitingCombined,
    AwaitingApproval { combined: String },
    Approved { latex: String },
    Retrying,
}

/// Review loop merging all approved pages into one document.
#[derive(Debug, Clone)]
pub struct CombineMachine {
    request: String,
}

impl CombineMachine {
    /// Build the loop over the already joined page transcriptions.
    pub fn new(joined: &str) -> Self {
        Self {
            request: prompts::combination_request(joined),
        }
    }

    /// The combination request sent on every attempt.
    pub fn request(&self) -> &str {
        &self.request
    }
}

impl ReviewMachine for CombineMachine {
    type State = CombineState;

    fn start(&self) -> Transition<CombineState> {
        Transition::new(
            CombineState::Composing,
            vec![Effect::Say(
                "\n\n🎉 All pages have been processed! Now for the final combination step.".into(),
            )],
        )
    }

    fn expects(&self, state: &CombineState) -> Expect {
        match state {
            CombineState::Composing | CombineState::Retrying => Expect::Nothing,
            CombineState::AwaitingCombined => Expect::ClipboardAfter(
                "   Paste it into the LLM, copy the full response, and then press Enter...".into(),
            ),
            CombineState::AwaitingApproval { .. } => Expect::Reply(
                "   --> If the combined document is correct, just hit Enter.\n   \
--> If the LLM changed things, enter ANY character and then hit Enter to retry the combination:"
                    .into(),
            ),
            CombineState::Approved { .. } => Expect::Done,
        }
    }

    fn step(&self, state: CombineState, input: Input) -> Transition<CombineState> {
        match (state, input) {
            (CombineState::Composing, Input::Continue) => Transition::new(
                CombineState::AwaitingCombined,
                vec![
                    Effect::SetClipboard(self.request.clone()),
                    Effect::Say("\n📋 Final combination prompt copied to clipboard.".into()),
                ],
            ),
            (CombineState::AwaitingCombined, Input::Clipboard(combined)) => {
                let verification =
                    prompts::combination_verification_request(&self.request, &combined);
                Transition::new(
                    CombineState::AwaitingApproval { combined },
                    vec![
                        Effect::SetClipboard(verification),
                        Effect::Say(
                            "\n📋 Final verification prompt copied to clipboard.\n   \
Paste this into the LLM to double-check for unwanted changes."
                                .into(),
                        ),
                    ],
                )
            }
            (CombineState::AwaitingApproval { combined }, Input::Reply(reply)) => {
                match Approval::from_reply(&reply) {
                    Approval::Accept => Transition::new(
                        CombineState::Approved {
                            latex: combined.clone(),
                        },
                        vec![
                            Effect::SetClipboard(combined),
                            Effect::Say(
                                "\n\n✨ Success! The final combined LaTeX has been copied to your clipboard."
                                    .into(),
                            ),
                        ],
                    ),
                    Approval::Reject => Transition::new(
                        CombineState::Retrying,
                        vec![Effect::Say("🔄 Retrying final combination step...".into())],
                    ),
                }
            }
            (CombineState::Retrying, Input::Continue) => Transition::stay(CombineState::Composing),
            (state, _) => Transition::stay(state),
        }
    }

    fn approved(state: &CombineState) -> Option<&str> {
        match state {
            CombineState::Approved { latex } => Some(latex),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_texts(t: &Transition<CombineState>) -> Vec<String> {
        t.effects
            .iter()
            .filter_map(|e| match e {
                Effect::SetClipboard(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn composing_places_combination_request() {
        let m = CombineMachine::new("A\n```\nnext page\n```\nB");
        let t = m.step(CombineState::Composing, Input::Continue);
        assert_eq!(t.state, CombineState::AwaitingCombined);
        assert_eq!(set_texts(&t), vec![m.request().to_string()]);
        assert!(m.request().contains("A\n```\nnext page\n```\nB"));
    }

    #[test]
    fn combined_result_goes_into_verification() {
        let m = CombineMachine::new("joined");
        let t = m.step(
            CombineState::AwaitingCombined,
            Input::Clipboard("MERGED".into()),
        );
        assert_eq!(
            t.state,
            CombineState::AwaitingApproval {
                combined: "MERGED".into()
            }
        );
        let texts = set_texts(&t);
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("joined"));
        assert!(texts[0].contains("MERGED"));
    }

    #[test]
    fn accept_puts_combined_on_clipboard() {
        let m = CombineMachine::new("joined");
        let t = m.step(
            CombineState::AwaitingApproval {
                combined: "FINAL".into(),
            },
            Input::Reply(String::new()),
        );
        assert_eq!(CombineMachine::approved(&t.state), Some("FINAL"));
        assert_eq!(set_texts(&t), vec!["FINAL".to_string()]);
        assert_eq!(m.expects(&t.state), Expect::Done);
    }

    #[test]
    fn reject_reuses_the_same_request() {
        let m = CombineMachine::new("joined");
        let t = m.step(
            CombineState::AwaitingApproval {
                combined: "bad merge".into(),
            },
            Input::Reply("no".into()),
        );
        assert_eq!(t.state, CombineState::Retrying);
        assert!(set_texts(&t).is_empty());

        let back = m.step(t.state, Input::Continue);
        assert_eq!(back.state, CombineState::Composing);
        let again = m.step(back.state, Input::Continue);
        assert_eq!(set_texts(&again), vec![m.request().to_string()]);
        assert!(!m.request().contains("bad merge"));
    }

    #[test]
    fn start_needs_no_input() {
        let m = CombineMachine::new("x");
        let t = m.start();
        assert_eq!(t.state, CombineState::Composing);
        assert_eq!(m.expects(&t.state), Expect::Nothing);
    }
}
