//! Console capability: line prompts and status messages.
//!
//! The workflow never touches stdin/stdout directly. It talks to a
//! [`Console`], which lets the CLI render coloured output and spinners while
//! tests drive the whole run from a script of replies.
//!
//! Every reply is one line with its terminator stripped. An empty reply is the
//! universal "accept / skip" signal; anything else is "reject / provide value".

use std::io::{self, BufRead, Write};

/// Line-based interaction with the user.
///
/// `busy`/`idle` bracket long blocking work (rendering, clipboard utilities)
/// and default to no-ops so simple consoles only implement `ask` and `say`.
pub trait Console {
    /// Print `prompt` and block until the user enters a line.
    ///
    /// Returns the line without its trailing `\n` / `\r\n`.
    fn ask(&mut self, prompt: &str) -> io::Result<String>;

    /// Print a status message.
    fn say(&mut self, message: &str);

    /// Long-running work started.
    fn busy(&mut self, message: &str) {
        let _ = message;
    }

    /// Long-running work finished.
    fn idle(&mut self) {}
}

/// Strip exactly one trailing line terminator, leaving other whitespace intact.
pub fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
}

/// Plain console over any reader/writer pair.
///
/// [`StdConsole::stdio`] wires it to the process's stdin/stdout.
pub struct StdConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StdConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the console, returning the writer (useful for inspecting output).
    pub fn into_output(self) -> W {
        self.output
    }
}

impl StdConsole<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console for StdConsole<R, W> {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for a reply",
            ));
        }
        Ok(strip_line_ending(&line).to_string())
    }

    fn say(&mut self, message: &str) {
        // A closed stdout must not abort the run; the next `ask` reports it.
        let _ = writeln!(self.output, "{message}");
    }
}
