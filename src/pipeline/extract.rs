//! Page image extraction: render a page and put it on the image clipboard.
//!
//! The platform clipboard utilities read images from disk, so the rendered
//! page travels through a temporary PNG. The file is a
//! [`tempfile::TempPath`]: it is deleted when the call returns, on the
//! success path and on every error path alike.
//!
//! PNG is used because it is lossless; JPEG artefacts on handwriting make the
//! chat model misread strokes.

use crate::error::ExtractError;
use crate::pipeline::clipboard::ImageClipboardWriter;
use crate::pipeline::render::PageRenderer;
use image::DynamicImage;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::TempPath;
use tracing::debug;

/// "Copy page N of document D to the image clipboard."
///
/// This is the single capability the workflow uses to hand a page to the
/// user; alternate renderers or clipboard backends are swapped in behind it.
pub trait PageExtractor {
    /// Render page `page_index` (zero-based) of `document` onto the image clipboard.
    ///
    /// On success the clipboard holds exactly that page's image, replacing
    /// whatever it held before (image or text).
    fn extract_and_copy(&self, document: &Path, page_index: usize) -> Result<(), ExtractError>;
}

/// Production extractor: a [`PageRenderer`] feeding an [`ImageClipboardWriter`].
pub struct PageImageExtractor<R, W> {
    renderer: R,
    writer: W,
}

impl<R: PageRenderer, W: ImageClipboardWriter> PageImageExtractor<R, W> {
    pub fn new(renderer: R, writer: W) -> Self {
        Self { renderer, writer }
    }
}

impl<R: PageRenderer, W: ImageClipboardWriter> PageExtractor for PageImageExtractor<R, W> {
    fn extract_and_copy(&self, document: &Path, page_index: usize) -> Result<(), ExtractError> {
        if !document.is_file() {
            return Err(ExtractError::NotFound {
                path: document.to_path_buf(),
            });
        }

        let image = self.renderer.render_page(document, page_index)?;
        let png = write_temp_png(&image, page_index)?;
        debug!("Page {} staged at {}", page_index + 1, png.display());

        // `png` drops at the end of this scope whatever the writer returns.
        self.writer.set_image_png(&png)
    }
}

/// Encode `image` as PNG into a fresh temporary file and close it.
///
/// The returned path deletes the file when dropped.
pub fn write_temp_png(image: &DynamicImage, page_index: usize) -> Result<TempPath, ExtractError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("pdf2tex-page-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| ExtractError::ClipboardError {
            detail: format!("cannot create temporary image file: {e}"),
        })?;

    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        image
            .write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| ExtractError::RenderError {
                page: page_index + 1,
                detail: format!("PNG encoding failed: {e}"),
            })?;
        out.flush().map_err(|e| ExtractError::ClipboardError {
            detail: format!("cannot write temporary image file: {e}"),
        })?;
    }

    // Close the handle so clipboard utilities on every platform can open it.
    Ok(tmp.into_temp_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    /// Renders page `i` as a 4x4 image filled with grey level `i * 40`.
    struct FakeRenderer {
        pages: usize,
        fail_render: bool,
    }

    impl FakeRenderer {
        fn page_image(index: usize) -> DynamicImage {
            let v = (index * 40) as u8;
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([v, v, v, 255])))
        }
    }

    impl PageRenderer for FakeRenderer {
        fn page_count(&self, _document: &Path) -> Result<usize, ExtractError> {
            Ok(self.pages)
        }

        fn render_page(&self, _document: &Path, index: usize) -> Result<DynamicImage, ExtractError> {
            if self.fail_render {
                return Err(ExtractError::RenderError {
                    page: index + 1,
                    detail: "corrupt xref".into(),
                });
            }
            if index >= self.pages {
                return Err(ExtractError::IndexOutOfRange {
                    index,
                    page_count: self.pages,
                });
            }
            Ok(Self::page_image(index))
        }
    }

    /// Decodes whatever it is handed, like the OS would.
    #[derive(Default)]
    struct FakeImageClipboard {
        held: RefCell<Option<DynamicImage>>,
        seen_paths: RefCell<Vec<PathBuf>>,
        reject: bool,
    }

    impl ImageClipboardWriter for FakeImageClipboard {
        fn set_image_png(&self, png_path: &Path) -> Result<(), ExtractError> {
            self.seen_paths.borrow_mut().push(png_path.to_path_buf());
            assert!(png_path.exists(), "temp PNG must exist during the call");
            if self.reject {
                return Err(ExtractError::ClipboardError {
                    detail: "osascript exited with 1".into(),
                });
            }
            let img = image::open(png_path).expect("valid PNG");
            *self.held.borrow_mut() = Some(img);
            Ok(())
        }
    }

    fn document() -> NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        f.write_all(b"%PDF-1.7\n").unwrap();
        f
    }

    fn extractor(pages: usize) -> PageImageExtractor<FakeRenderer, FakeImageClipboard> {
        PageImageExtractor::new(
            FakeRenderer {
                pages,
                fail_render: false,
            },
            FakeImageClipboard::default(),
        )
    }

    #[test]
    fn valid_page_lands_on_clipboard_and_temp_file_is_gone() {
        let doc = document();
        let ex = extractor(3);
        ex.extract_and_copy(doc.path(), 2).unwrap();

        let held = ex.writer.held.borrow().clone().unwrap();
        assert_eq!(held.to_rgba8(), FakeRenderer::page_image(2).to_rgba8());

        let paths = ex.writer.seen_paths.borrow();
        assert_eq!(paths.len(), 1);
        assert!(!paths[0].exists(), "temp PNG must be deleted after success");
        assert_eq!(paths[0].extension().unwrap(), "png");
    }

    #[test]
    fn out_of_range_leaves_clipboard_untouched() {
        let doc = document();
        let ex = extractor(2);
        let err = ex.extract_and_copy(doc.path(), 2).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::IndexOutOfRange {
                index: 2,
                page_count: 2
            }
        ));
        assert!(ex.writer.seen_paths.borrow().is_empty());
        assert!(ex.writer.held.borrow().is_none());
    }

    #[test]
    fn zero_page_document_is_out_of_range() {
        let doc = document();
        let err = extractor(0).extract_and_copy(doc.path(), 0).unwrap_err();
        assert!(matches!(err, ExtractError::IndexOutOfRange { page_count: 0, .. }));
    }

    #[test]
    fn missing_document_is_not_found_before_rendering() {
        let ex = PageImageExtractor::new(
            FakeRenderer {
                pages: 1,
                fail_render: true,
            },
            FakeImageClipboard::default(),
        );
        let err = ex
            .extract_and_copy(Path::new("/no/such/quiz.pdf"), 0)
            .unwrap_err();
        // A render attempt would have produced RenderError instead.
        assert!(matches!(err, ExtractError::NotFound { .. }));
    }

    #[test]
    fn render_failure_is_wrapped() {
        let doc = document();
        let ex = PageImageExtractor::new(
            FakeRenderer {
                pages: 1,
                fail_render: true,
            },
            FakeImageClipboard::default(),
        );
        let err = ex.extract_and_copy(doc.path(), 0).unwrap_err();
        assert!(err.to_string().contains("corrupt xref"));
    }

    #[test]
    fn clipboard_failure_still_removes_temp_file() {
        let doc = document();
        let ex = PageImageExtractor::new(
            FakeRenderer {
                pages: 1,
                fail_render: false,
            },
            FakeImageClipboard {
                reject: true,
                ..Default::default()
            },
        );
        let err = ex.extract_and_copy(doc.path(), 0).unwrap_err();
        assert!(matches!(err, ExtractError::ClipboardError { .. }));
        let paths = ex.writer.seen_paths.borrow();
        assert!(!paths[0].exists(), "temp PNG must be deleted after failure");
    }

    #[test]
    fn repeated_extraction_yields_identical_image() {
        let doc = document();
        let ex = extractor(2);
        ex.extract_and_copy(doc.path(), 1).unwrap();
        let first = ex.writer.held.borrow().clone().unwrap();
        ex.extract_and_copy(doc.path(), 1).unwrap();
        let second = ex.writer.held.borrow().clone().unwrap();
        assert_eq!(first.to_rgba8(), second.to_rgba8());
        assert_eq!(first.color(), second.color());
    }

    #[test]
    fn temp_png_decodes_to_same_pixels() {
        let img = FakeRenderer::page_image(5);
        let path = write_temp_png(&img, 5).unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.to_rgba8(), img.to_rgba8());
        let p = path.to_path_buf();
        drop(path);
        assert!(!p.exists());
    }
}
