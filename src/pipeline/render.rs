//! PDF rasterisation: render one page to a `DynamicImage` via pdfium.
//!
//! Rendering sits behind the [`PageRenderer`] capability so the extractor,
//! the preview and the workflow can be exercised with an in-memory renderer.
//! [`PdfiumRenderer`] is the production implementation.
//!
//! ## Why cap pixels, not DPI?
//!
//! Scanned pages come at wildly different physical sizes. Capping the longest
//! edge keeps clipboard images a predictable size regardless of the scanner's
//! page dimensions.

use crate::config::WorkflowConfig;
use crate::error::{ExtractError, Pdf2TexError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// "Render page N of document D to a raster image."
pub trait PageRenderer {
    /// Number of pages in the document.
    fn page_count(&self, document: &Path) -> Result<usize, ExtractError>;

    /// Rasterise the page at zero-based `index`.
    ///
    /// Fails with [`ExtractError::IndexOutOfRange`] when `index` is not in
    /// `[0, page_count)` and [`ExtractError::RenderError`] when the document
    /// cannot be decoded or the page cannot be rasterised.
    fn render_page(&self, document: &Path, index: usize) -> Result<DynamicImage, ExtractError>;
}

impl<R: PageRenderer + ?Sized> PageRenderer for &R {
    fn page_count(&self, document: &Path) -> Result<usize, ExtractError> {
        (**self).page_count(document)
    }

    fn render_page(&self, document: &Path, index: usize) -> Result<DynamicImage, ExtractError> {
        (**self).render_page(document, index)
    }
}

/// Renderer backed by a bound pdfium library.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
    max_pixels: u32,
    password: Option<String>,
}

impl PdfiumRenderer {
    /// Bind pdfium according to `config` and build a renderer.
    ///
    /// Lookup order: `config.pdfium_lib_dir` if set, otherwise the current
    /// directory followed by the system library path.
    pub fn bind(config: &WorkflowConfig) -> Result<Self, Pdf2TexError> {
        let bindings = match config.pdfium_lib_dir {
            Some(ref dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                &PathBuf::from("./"),
            ))
            .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| Pdf2TexError::PdfiumBindingFailed(format!("{:?}", e)))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
            max_pixels: config.max_rendered_pixels,
            password: config.password.clone(),
        })
    }

    fn open<'a>(&'a self, document: &Path, page: usize) -> Result<PdfDocument<'a>, ExtractError> {
        self.pdfium
            .load_pdf_from_file(document, self.password.as_deref())
            .map_err(|e| ExtractError::RenderError {
                page,
                detail: format!("could not open document: {:?}", e),
            })
    }
}

impl PageRenderer for PdfiumRenderer {
    fn page_count(&self, document: &Path) -> Result<usize, ExtractError> {
        let doc = self.open(document, 0)?;
        let count = doc.pages().len() as usize;
        info!("PDF loaded: {} pages", count);
        Ok(count)
    }

    fn render_page(&self, document: &Path, index: usize) -> Result<DynamicImage, ExtractError> {
        let doc = self.open(document, index + 1)?;
        let pages = doc.pages();
        let page_count = pages.len() as usize;

        if index >= page_count {
            return Err(ExtractError::IndexOutOfRange { index, page_count });
        }

        let render_config = PdfRenderConfig::new()
            .set_target_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32);

        let page = pages
            .get(index as u16)
            .map_err(|e| ExtractError::RenderError {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| ExtractError::RenderError {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}
