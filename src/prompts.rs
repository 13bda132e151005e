//! Request texts handed to the external chat LLM.
//!
//! Every fixed request lives here, together with the pure functions that
//! combine them with the user's instructions and the collected LaTeX. Tests
//! import them directly so wording regressions are caught without a terminal.

/// Literal placed between consecutive page transcriptions before combination.
pub const PAGE_SEPARATOR: &str = "\n```\nnext page\n```\n";

/// Fixed request sent with every page image.
pub const TRANSCRIPTION_REQUEST: &str = "Look over the math problem in this picture and more importantly the work to solve that problem. \
If you see any glaring issues, tell the user that and don’t do anything else. Just so they know there is a mistake. \
Otherwise, don’t tell the user anything and just output the entire problem and solution converted into LaTeX. \
It is imperative that you copy the text EXACTLY AS THE USER WROTE IT, \
inferring from context what they meant when necessary but never making big leaps or fixing anything more complicated than a misspelling of a word \
(anything worse should cause you to not output latex and instead tell the user what’s wrong)";

/// Fixed request sent with the second copy of the page image.
pub const PAGE_VERIFICATION_REQUEST: &str = "are there any significant wording changes from the original image that I wrote and the latex text? \
I don’t want my original wording to be lost, but it’s fine if something very small like a typo was replaced";

const COMBINATION_PREAMBLE: &str = "I got all of these latex outputs from an LLM, can you combine them into one cohesive document, \
but without changing any of the actual text, just lumping them together so it will render on overleaf\n\n";

/// Build the per-page transcription request.
///
/// General instructions are collected once (against the first page) and may
/// not apply to every page, so they are labelled as such. Empty instruction
/// strings add nothing.
pub fn transcription_request(general: &str, specific: &str) -> String {
    let mut request = String::from(TRANSCRIPTION_REQUEST);
    if !general.is_empty() {
        request.push_str(
            "\n\nGeneral instructions from the user that may not apply to this image, but likely do:\n",
        );
        request.push_str(general);
    }
    if !specific.is_empty() {
        request.push_str("\n\nSpecific instructions from the user about this particular image:\n");
        request.push_str(specific);
    }
    request
}

/// Join approved page transcriptions, marking every page boundary.
pub fn join_pages(pages: &[String]) -> String {
    pages.join(PAGE_SEPARATOR)
}

/// Build the request asking the LLM to merge the joined pages into one document.
pub fn combination_request(joined: &str) -> String {
    format!("{COMBINATION_PREAMBLE}first page:\n```\n{joined}\n```")
}

/// Build the request asking the LLM to diff the individual blocks against the merge.
pub fn combination_verification_request(individual: &str, combined: &str) -> String {
    format!(
        "Were there any changes between the 'INDIVIDUAL' blocks and the 'COMBINED' document below?\n\n\
--- INDIVIDUAL ---\n\"\"\"\n{individual}\n\"\"\"\n\n\
--- COMBINED ---\n```\n{combined}\n```"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_without_instructions_is_the_fixed_text() {
        assert_eq!(transcription_request("", ""), TRANSCRIPTION_REQUEST);
    }

    #[test]
    fn general_precedes_specific() {
        let r = transcription_request("use align*", "skip the doodle");
        let g = r.find("use align*").unwrap();
        let s = r.find("skip the doodle").unwrap();
        assert!(g < s);
        assert!(r.starts_with(TRANSCRIPTION_REQUEST));
        assert!(r.contains("General instructions from the user"));
        assert!(r.contains("Specific instructions from the user"));
    }

    #[test]
    fn only_specific_instructions() {
        let r = transcription_request("", "page has two problems");
        assert!(!r.contains("General instructions"));
        assert!(r.ends_with("page has two problems"));
    }

    #[test]
    fn join_marks_each_boundary() {
        let pages = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let joined = join_pages(&pages);
        assert_eq!(joined.matches("next page").count(), 2);
        assert!(joined.starts_with('a'));
        assert!(joined.ends_with('c'));
    }

    #[test]
    fn join_single_page_has_no_separator() {
        assert_eq!(join_pages(&["only".to_string()]), "only");
    }

    #[test]
    fn combination_request_fences_joined_text() {
        let r = combination_request("x\n```\nnext page\n```\ny");
        assert!(r.contains("overleaf"));
        assert!(r.contains("first page:\n```\nx"));
        assert!(r.ends_with("y\n```"));
    }

    #[test]
    fn verification_embeds_both_sides() {
        let r = combination_verification_request("INDIV-TEXT", "COMBINED-TEXT");
        let i = r.find("INDIV-TEXT").unwrap();
        let c = r.find("COMBINED-TEXT").unwrap();
        assert!(i < c);
        assert!(r.contains("--- INDIVIDUAL ---"));
        assert!(r.contains("--- COMBINED ---"));
    }
}
