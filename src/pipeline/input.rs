//! Input discovery: find the one PDF the run works on.
//!
//! The user drops a single PDF into the input directory. Zero or several
//! matches are reported as input-discovery errors before any file is opened,
//! so the user can tidy the directory and rerun. The chosen file must also
//! start with the `%PDF` magic bytes; anything else would only surface later
//! as an opaque pdfium failure.

use crate::error::Pdf2TexError;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// True if `path` has a `.pdf` extension (any case).
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Return the single PDF in `dir`, creating `dir` first if it is missing.
///
/// # Errors
/// - [`Pdf2TexError::NoDocument`] when the directory holds no PDF
/// - [`Pdf2TexError::MultipleDocuments`] when it holds more than one
/// - [`Pdf2TexError::InputDirUnavailable`] when it cannot be created or listed
/// - [`Pdf2TexError::NotAPdf`] / [`Pdf2TexError::DocumentOpen`] when the one
///   match is unreadable or not a PDF
pub fn discover_document(dir: &Path) -> Result<PathBuf, Pdf2TexError> {
    fs::create_dir_all(dir).map_err(|source| Pdf2TexError::InputDirUnavailable {
        dir: dir.to_path_buf(),
        source,
    })?;

    let entries = fs::read_dir(dir).map_err(|source| Pdf2TexError::InputDirUnavailable {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut found: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_pdf_path(p))
        .collect();
    found.sort();
    debug!("{} PDF candidate(s) in {}", found.len(), dir.display());

    match found.len() {
        0 => Err(Pdf2TexError::NoDocument {
            dir: dir.to_path_buf(),
        }),
        1 => {
            let path = found.remove(0);
            check_pdf_magic(&path)?;
            info!("Found PDF: {}", path.display());
            Ok(path)
        }
        _ => Err(Pdf2TexError::MultipleDocuments {
            dir: dir.to_path_buf(),
            found,
        }),
    }
}

/// Verify the file opens and begins with `%PDF`.
pub fn check_pdf_magic(path: &Path) -> Result<(), Pdf2TexError> {
    let mut file = fs::File::open(path).map_err(|e| Pdf2TexError::DocumentOpen {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
        return Err(Pdf2TexError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_pdf(dir: &Path, name: &str) -> PathBuf {
        let p = dir.join(name);
        fs::write(&p, b"%PDF-1.7\n%stub\n").unwrap();
        p
    }

    #[test]
    fn single_pdf_is_found() {
        let tmp = TempDir::new().unwrap();
        let pdf = write_pdf(tmp.path(), "quiz.pdf");
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();
        assert_eq!(discover_document(tmp.path()).unwrap(), pdf);
    }

    #[test]
    fn uppercase_extension_counts() {
        let tmp = TempDir::new().unwrap();
        let pdf = write_pdf(tmp.path(), "SCAN.PDF");
        assert_eq!(discover_document(tmp.path()).unwrap(), pdf);
    }

    #[test]
    fn empty_directory_is_no_document() {
        let tmp = TempDir::new().unwrap();
        let err = discover_document(tmp.path()).unwrap_err();
        assert!(matches!(err, Pdf2TexError::NoDocument { .. }));
    }

    #[test]
    fn missing_directory_is_created() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("prelatex-pdf");
        let err = discover_document(&dir).unwrap_err();
        assert!(dir.is_dir());
        assert!(err.is_input_discovery());
    }

    #[test]
    fn two_pdfs_are_ambiguous() {
        let tmp = TempDir::new().unwrap();
        write_pdf(tmp.path(), "a.pdf");
        write_pdf(tmp.path(), "b.pdf");
        match discover_document(tmp.path()).unwrap_err() {
            Pdf2TexError::MultipleDocuments { found, .. } => assert_eq!(found.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn directory_named_like_pdf_is_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("old.pdf")).unwrap();
        let pdf = write_pdf(tmp.path(), "new.pdf");
        assert_eq!(discover_document(tmp.path()).unwrap(), pdf);
    }

    #[test]
    fn wrong_magic_is_not_a_pdf() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("fake.pdf"), b"PK\x03\x04zip").unwrap();
        let err = discover_document(tmp.path()).unwrap_err();
        assert!(matches!(err, Pdf2TexError::NotAPdf { magic, .. } if &magic == b"PK\x03\x04"));
    }
}
