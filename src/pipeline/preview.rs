//! Page preview: show a page in the OS image viewer before asking about it.
//!
//! The viewer runs as a separate process and reads the file whenever it gets
//! round to it, so preview images cannot be deleted at the end of the call the
//! way the extractor's clipboard PNG is. They live in a run-scoped
//! [`TempDir`] instead and disappear when the [`ViewerPreview`] is dropped.

use crate::error::ExtractError;
use crate::pipeline::render::PageRenderer;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use tempfile::TempDir;
use tracing::debug;

/// Show page `page_index` of `document` to the user.
pub trait PagePreview {
    fn show(&self, document: &Path, page_index: usize) -> Result<(), ExtractError>;
}

/// Renders pages into a private temp directory and opens them with the
/// platform's default image viewer.
pub struct ViewerPreview<R> {
    renderer: R,
    dir: TempDir,
}

impl<R: PageRenderer> ViewerPreview<R> {
    pub fn new(renderer: R) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("pdf2tex-preview-").tempdir()?;
        Ok(Self { renderer, dir })
    }

    /// Directory holding this run's preview images.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    fn preview_path(&self, page_index: usize) -> PathBuf {
        self.dir.path().join(format!("page-{}.png", page_index + 1))
    }
}

impl<R: PageRenderer> PagePreview for ViewerPreview<R> {
    fn show(&self, document: &Path, page_index: usize) -> Result<(), ExtractError> {
        let image = self.renderer.render_page(document, page_index)?;
        let path = self.preview_path(page_index);
        image.save(&path).map_err(|e| ExtractError::RenderError {
            page: page_index + 1,
            detail: format!("cannot save preview: {e}"),
        })?;
        debug!("Preview of page {} at {}", page_index + 1, path.display());

        let cmd = opener_command(&path);
        let program = cmd.get_program().to_os_string();
        launch(cmd).map(|_| ()).map_err(|e| ExtractError::RenderError {
            page: page_index + 1,
            detail: format!("cannot launch image viewer {program:?}: {e}"),
        })
    }
}

/// Start `cmd` without waiting for it, and reap it from a background thread.
///
/// Openers usually hand the file to a running viewer and exit at once, but
/// some (`xdg-open` falling back to a direct handler) stay until the viewer
/// closes.
fn launch(mut cmd: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(thread::spawn(move || {
        let status = child.wait();
        if let Ok(ref s) = status {
            if !s.success() {
                debug!("Image viewer exited with {}", s);
            }
        }
        status
    }))
}

/// Command that opens `path` in the default viewer without blocking.
fn opener_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(path);
        c
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(path);
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage};

    struct BlankRenderer;

    impl PageRenderer for BlankRenderer {
        fn page_count(&self, _document: &Path) -> Result<usize, ExtractError> {
            Ok(1)
        }

        fn render_page(&self, _document: &Path, index: usize) -> Result<DynamicImage, ExtractError> {
            if index > 0 {
                return Err(ExtractError::IndexOutOfRange {
                    index,
                    page_count: 1,
                });
            }
            Ok(DynamicImage::ImageLuma8(GrayImage::new(2, 2)))
        }
    }

    #[test]
    fn preview_files_are_numbered_from_one() {
        let p = ViewerPreview::new(BlankRenderer).unwrap();
        assert_eq!(p.preview_path(0).file_name().unwrap(), "page-1.png");
    }

    #[test]
    fn preview_dir_is_removed_on_drop() {
        let p = ViewerPreview::new(BlankRenderer).unwrap();
        let dir = p.dir().to_path_buf();
        assert!(dir.is_dir());
        drop(p);
        assert!(!dir.exists());
    }

    #[test]
    fn out_of_range_preview_fails_without_launching() {
        let p = ViewerPreview::new(BlankRenderer).unwrap();
        let err = p.show(Path::new("quiz.pdf"), 4).unwrap_err();
        assert!(matches!(err, ExtractError::IndexOutOfRange { .. }));
        assert!(!p.preview_path(4).exists());
    }

    #[test]
    #[cfg(unix)]
    fn launched_opener_is_reaped() {
        let status = launch(Command::new("true")).unwrap().join().unwrap().unwrap();
        assert!(status.success());
    }

    #[test]
    fn missing_opener_fails_to_launch() {
        let err = launch(Command::new("pdf2tex-no-such-viewer")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn opener_passes_the_path() {
        let cmd = opener_command(Path::new("/tmp/page-1.png"));
        assert!(cmd.get_args().any(|a| a == "/tmp/page-1.png"));
    }
}
