//! System clipboard access through the platform's own utilities.
//!
//! Two capabilities are exposed:
//!
//! * [`ImageClipboardWriter`]: load a PNG file onto the image clipboard.
//! * [`TextClipboard`]: read and replace the text clipboard.
//!
//! [`SystemClipboard`] implements both by shelling out to the utility each
//! platform ships or commonly installs:
//!
//! | Backend  | Image set                         | Text set / get            |
//! |----------|-----------------------------------|---------------------------|
//! | macOS    | `osascript` (`«class PNGf»`)      | `pbcopy` / `pbpaste`      |
//! | X11      | `xclip -t image/png`              | `xclip` / `xclip -o`      |
//! | Wayland  | `wl-copy --type image/png`        | `wl-copy` / `wl-paste`    |
//! | Windows  | PowerShell `Clipboard::SetImage`  | PowerShell `Set/Get-Clipboard` |
//!
//! The workflow depends only on the traits, so a new platform is one more
//! backend here and nothing else changes.

use crate::error::{ExtractError, Pdf2TexError};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Place an image file onto the system image clipboard.
pub trait ImageClipboardWriter {
    /// Replace the clipboard contents with the PNG at `png_path`.
    ///
    /// The file only needs to exist for the duration of the call.
    fn set_image_png(&self, png_path: &Path) -> Result<(), ExtractError>;
}

/// Read and replace the system text clipboard.
pub trait TextClipboard {
    fn get_text(&self) -> Result<String, Pdf2TexError>;
    fn set_text(&self, text: &str) -> Result<(), Pdf2TexError>;
}

impl<C: ImageClipboardWriter + ?Sized> ImageClipboardWriter for &C {
    fn set_image_png(&self, png_path: &Path) -> Result<(), ExtractError> {
        (**self).set_image_png(png_path)
    }
}

impl<C: TextClipboard + ?Sized> TextClipboard for &C {
    fn get_text(&self) -> Result<String, Pdf2TexError> {
        (**self).get_text()
    }

    fn set_text(&self, text: &str) -> Result<(), Pdf2TexError> {
        (**self).set_text(text)
    }
}

/// Clipboard backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemClipboard {
    MacOs,
    X11,
    Wayland,
    Windows,
}

impl SystemClipboard {
    /// Pick the backend for the running platform.
    ///
    /// On Linux and the BSDs a set `WAYLAND_DISPLAY` selects Wayland, X11 otherwise.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            SystemClipboard::MacOs
        } else if cfg!(target_os = "windows") {
            SystemClipboard::Windows
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some_and(|v| !v.is_empty()) {
            SystemClipboard::Wayland
        } else {
            SystemClipboard::X11
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SystemClipboard::MacOs => "macos",
            SystemClipboard::X11 => "x11",
            SystemClipboard::Wayland => "wayland",
            SystemClipboard::Windows => "windows",
        }
    }

    /// xclip and wl-copy fork a process that serves the selection and
    /// inherits our pipes; capturing its stderr would block until it exits.
    fn setter_stderr(&self) -> Stdio {
        match self {
            SystemClipboard::X11 | SystemClipboard::Wayland => Stdio::null(),
            SystemClipboard::MacOs | SystemClipboard::Windows => Stdio::piped(),
        }
    }

    fn image_command(&self, png_path: &Path) -> Result<Command, ExtractError> {
        let path = png_path.to_string_lossy();
        let cmd = match self {
            SystemClipboard::MacOs => {
                let mut c = Command::new("osascript");
                c.arg("-e").arg(applescript_set_png(&path));
                c
            }
            SystemClipboard::X11 => {
                let mut c = Command::new("xclip");
                c.args(["-selection", "clipboard", "-t", "image/png", "-i"])
                    .arg(png_path);
                c
            }
            SystemClipboard::Wayland => {
                let file = File::open(png_path).map_err(|e| ExtractError::ClipboardError {
                    detail: format!("cannot reopen {}: {e}", png_path.display()),
                })?;
                let mut c = Command::new("wl-copy");
                c.args(["--type", "image/png"]).stdin(Stdio::from(file));
                c
            }
            SystemClipboard::Windows => {
                let script = format!(
                    "Add-Type -AssemblyName System.Windows.Forms; Add-Type -AssemblyName System.Drawing; \
                     $img = [System.Drawing.Image]::FromFile('{}'); \
                     [System.Windows.Forms.Clipboard]::SetImage($img); $img.Dispose()",
                    powershell_quote(&path)
                );
                powershell(&script)
            }
        };
        Ok(cmd)
    }

    fn set_text_command(&self) -> Command {
        match self {
            SystemClipboard::MacOs => Command::new("pbcopy"),
            SystemClipboard::X11 => {
                let mut c = Command::new("xclip");
                c.args(["-selection", "clipboard", "-i"]);
                c
            }
            SystemClipboard::Wayland => Command::new("wl-copy"),
            SystemClipboard::Windows => {
                powershell(
                    "[Console]::InputEncoding = [System.Text.Encoding]::UTF8; \
                     Set-Clipboard -Value ([Console]::In.ReadToEnd())",
                )
            }
        }
    }

    /// True when a failed read only means the clipboard holds no text.
    ///
    /// `wl-paste` reports "No selection" (older) or "Nothing is copied"
    /// (newer); `xclip -o` reports that the requested target is not available.
    fn is_empty_selection(&self, stderr: &str) -> bool {
        let stderr = stderr.to_ascii_lowercase();
        match self {
            SystemClipboard::Wayland => {
                stderr.contains("no selection") || stderr.contains("nothing is copied")
            }
            SystemClipboard::X11 => stderr.contains("target") && stderr.contains("not available"),
            SystemClipboard::MacOs | SystemClipboard::Windows => false,
        }
    }

    fn get_text_command(&self) -> Command {
        match self {
            SystemClipboard::MacOs => Command::new("pbpaste"),
            SystemClipboard::X11 => {
                let mut c = Command::new("xclip");
                c.args(["-selection", "clipboard", "-o"]);
                c
            }
            SystemClipboard::Wayland => {
                let mut c = Command::new("wl-paste");
                c.arg("--no-newline");
                c
            }
            SystemClipboard::Windows => powershell(
                "[Console]::OutputEncoding = [System.Text.Encoding]::UTF8; Get-Clipboard -Raw",
            ),
        }
    }
}

impl ImageClipboardWriter for SystemClipboard {
    fn set_image_png(&self, png_path: &Path) -> Result<(), ExtractError> {
        let mut cmd = self.image_command(png_path)?;
        debug!("Image clipboard via {:?}", cmd.get_program());

        let output = cmd
            .stdout(Stdio::null())
            .stderr(self.setter_stderr())
            .output()
            .map_err(|e| ExtractError::ClipboardError {
                detail: spawn_failure(&cmd, &e),
            })?;

        check_status(&cmd, &output).map_err(|detail| ExtractError::ClipboardError { detail })
    }
}

impl TextClipboard for SystemClipboard {
    fn get_text(&self) -> Result<String, Pdf2TexError> {
        let mut cmd = self.get_text_command();
        let output = cmd
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Pdf2TexError::Clipboard {
                detail: spawn_failure(&cmd, &e),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() && self.is_empty_selection(&stderr) {
            debug!("{:?}: clipboard holds no text", cmd.get_program());
            return Ok(String::new());
        }
        check_status(&cmd, &output).map_err(|detail| Pdf2TexError::Clipboard { detail })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if *self == SystemClipboard::Windows && text.ends_with("\r\n") {
            text.truncate(text.len() - 2);
        }
        Ok(text)
    }

    fn set_text(&self, text: &str) -> Result<(), Pdf2TexError> {
        let mut cmd = self.set_text_command();
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(self.setter_stderr())
            .spawn()
            .map_err(|e| Pdf2TexError::Clipboard {
                detail: spawn_failure(&cmd, &e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| Pdf2TexError::Clipboard {
                    detail: format!("writing to {:?}: {e}", cmd.get_program()),
                })?;
        }

        let output = child.wait_with_output().map_err(|e| Pdf2TexError::Clipboard {
            detail: format!("waiting for {:?}: {e}", cmd.get_program()),
        })?;
        check_status(&cmd, &output).map_err(|detail| Pdf2TexError::Clipboard { detail })
    }
}

fn powershell(script: &str) -> Command {
    let mut c = Command::new("powershell");
    c.args(["-NoProfile", "-NonInteractive", "-STA", "-Command", script]);
    c
}

/// AppleScript that loads a PNG file and sets it as the clipboard image.
fn applescript_set_png(path: &str) -> String {
    let escaped = path.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "set the_image to (read (POSIX file \"{escaped}\") as «class PNGf»)\nset the clipboard to the_image"
    )
}

/// Escape a value for a single-quoted PowerShell string.
fn powershell_quote(s: &str) -> String {
    s.replace('\'', "''")
}

fn spawn_failure(cmd: &Command, e: &io::Error) -> String {
    if e.kind() == io::ErrorKind::NotFound {
        format!(
            "clipboard utility {:?} not found; install it or pick another --clipboard backend",
            cmd.get_program()
        )
    } else {
        format!("failed to run {:?}: {e}", cmd.get_program())
    }
}

fn check_status(cmd: &Command, output: &Output) -> Result<(), String> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(format!(
        "{:?} exited with {}: {}",
        cmd.get_program(),
        output.status,
        stderr.trim()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_set_text_reads_stdin_as_utf8() {
        let cmd = SystemClipboard::Windows.set_text_command();
        assert_eq!(cmd.get_program(), "powershell");
        let script = cmd.get_args().last().unwrap().to_string_lossy().into_owned();
        let encoding = script
            .find("[Console]::InputEncoding = [System.Text.Encoding]::UTF8")
            .expect("input encoding set");
        let read = script.find("[Console]::In.ReadToEnd()").unwrap();
        assert!(encoding < read, "got: {script}");
    }

    #[test]
    fn only_known_empty_messages_count_as_empty() {
        assert!(SystemClipboard::Wayland.is_empty_selection("No selection\n"));
        assert!(SystemClipboard::Wayland.is_empty_selection("Nothing is copied\n"));
        assert!(!SystemClipboard::Wayland
            .is_empty_selection("Failed to connect to a Wayland server: No such file or directory"));
        assert!(!SystemClipboard::Wayland.is_empty_selection(""));

        assert!(SystemClipboard::X11.is_empty_selection("Error: target STRING not available\n"));
        assert!(!SystemClipboard::X11.is_empty_selection("Error: Can't open display: (null)"));

        assert!(!SystemClipboard::MacOs.is_empty_selection("No selection"));
        assert!(!SystemClipboard::Windows.is_empty_selection("No selection"));
    }

    #[test]
    #[cfg(target_os = "macos")]
    fn detect_on_macos() {
        assert_eq!(SystemClipboard::detect(), SystemClipboard::MacOs);
    }

    #[test]
    fn applescript_escapes_quotes() {
        let s = applescript_set_png(r#"/tmp/a "b"\c.png"#);
        assert!(s.contains(r#"POSIX file "/tmp/a \"b\"\\c.png""#), "got: {s}");
        assert!(s.contains("«class PNGf»"));
        assert!(s.ends_with("set the clipboard to the_image"));
    }

    #[test]
    fn powershell_doubles_single_quotes() {
        assert_eq!(powershell_quote(r"C:\it's.png"), r"C:\it''s.png");
    }

    #[test]
    fn x11_image_command_targets_png() {
        let cmd = SystemClipboard::X11
            .image_command(Path::new("/tmp/page.png"))
            .unwrap();
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "xclip");
        assert_eq!(
            args,
            ["-selection", "clipboard", "-t", "image/png", "-i", "/tmp/page.png"]
        );
    }

    #[test]
    fn wayland_image_command_needs_the_file() {
        let err = SystemClipboard::Wayland
            .image_command(Path::new("/definitely/not/here.png"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::ClipboardError { .. }));
    }

    #[test]
    fn missing_utility_is_reported_by_name() {
        let cmd = Command::new("pdf2tex-no-such-clipboard-tool");
        let e = io::Error::new(io::ErrorKind::NotFound, "nope");
        let msg = spawn_failure(&cmd, &e);
        assert!(msg.contains("pdf2tex-no-such-clipboard-tool"));
        assert!(msg.contains("not found"));
    }
}
