//! Configuration for a transcription run.
//!
//! All run behaviour is controlled through [`WorkflowConfig`], built via its
//! [`WorkflowConfigBuilder`]. There is no config file and no environment
//! lookup: the CLI maps its flags onto the builder and nothing else feeds it.

use crate::error::Pdf2TexError;
use std::path::PathBuf;

/// Directory scanned for the single input PDF when none is given.
pub const DEFAULT_INPUT_DIR: &str = "prelatex-pdf";

/// Configuration for a transcription run.
///
/// # Example
/// ```rust
/// use edgequake_pdf2tex::WorkflowConfig;
///
/// let config = WorkflowConfig::builder()
///     .input_dir("scans")
///     .max_rendered_pixels(1600)
///     .show_preview(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_rendered_pixels, 1600);
/// ```
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Directory expected to contain exactly one PDF. Default: `prelatex-pdf`.
    pub input_dir: PathBuf,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 2000.
    ///
    /// Chat interfaces downscale pasted images anyway; 2000 px keeps
    /// handwriting legible without producing multi-megabyte clipboard images.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Open each page in the OS image viewer before asking for instructions. Default: true.
    pub show_preview: bool,

    /// How many characters of the saved clipboard to echo at start. Default: 300.
    pub snapshot_preview_chars: usize,

    /// Directory holding libpdfium. If None, the current directory and then
    /// the system library path are tried.
    pub pdfium_lib_dir: Option<PathBuf>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            max_rendered_pixels: 2000,
            password: None,
            show_preview: true,
            snapshot_preview_chars: 300,
            pdfium_lib_dir: None,
        }
    }
}

impl WorkflowConfig {
    /// Create a new builder for `WorkflowConfig`.
    pub fn builder() -> WorkflowConfigBuilder {
        WorkflowConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`WorkflowConfig`].
#[derive(Debug)]
pub struct WorkflowConfigBuilder {
    config: WorkflowConfig,
}

impl WorkflowConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn show_preview(mut self, v: bool) -> Self {
        self.config.show_preview = v;
        self
    }

    pub fn snapshot_preview_chars(mut self, n: usize) -> Self {
        self.config.snapshot_preview_chars = n;
        self
    }

    pub fn pdfium_lib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_dir = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<WorkflowConfig, Pdf2TexError> {
        let c = &self.config;
        if c.input_dir.as_os_str().is_empty() {
            return Err(Pdf2TexError::InvalidConfig(
                "input directory must not be empty".into(),
            ));
        }
        if c.snapshot_preview_chars == 0 {
            return Err(Pdf2TexError::InvalidConfig(
                "snapshot preview length must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = WorkflowConfig::default();
        assert_eq!(c.input_dir, PathBuf::from("prelatex-pdf"));
        assert_eq!(c.max_rendered_pixels, 2000);
        assert_eq!(c.snapshot_preview_chars, 300);
        assert!(c.show_preview);
        assert!(c.password.is_none());
    }

    #[test]
    fn max_pixels_is_clamped() {
        let c = WorkflowConfig::builder()
            .max_rendered_pixels(10)
            .build()
            .unwrap();
        assert_eq!(c.max_rendered_pixels, 100);
    }

    #[test]
    fn empty_input_dir_is_rejected() {
        let err = WorkflowConfig::builder().input_dir("").build().unwrap_err();
        assert!(matches!(err, Pdf2TexError::InvalidConfig(_)));
    }

    #[test]
    fn zero_snapshot_preview_is_rejected() {
        let err = WorkflowConfig::builder()
            .snapshot_preview_chars(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("snapshot"));
    }
}
