//! Input validation: make sure a user-supplied path names a readable PDF.
//!
//! ## Why validate before opening?
//!
//! pdfium reports every problem with a file as an opaque load error. Checking
//! existence, the `.pdf` extension and the `%PDF` magic bytes up front lets us
//! return [`Pdf2MdError::FileNotFound`] or [`Pdf2MdError::InvalidFormat`]
//! before any extraction work starts, and keeps "corrupt PDF" reserved for
//! files that really are PDFs.

use crate::error::Pdf2MdError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate `path` and return it as an owned path.
///
/// Checks, in order: the file exists, the extension is `.pdf`
/// (case-insensitive), the file is readable, and it starts with `%PDF`.
pub fn validate_input(path: &Path) -> Result<PathBuf, Pdf2MdError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(Pdf2MdError::FileNotFound { path });
    }

    if !has_pdf_extension(&path) {
        return Err(Pdf2MdError::InvalidFormat {
            path,
            reason: "expected .pdf extension".into(),
        });
    }

    if path.is_dir() {
        return Err(Pdf2MdError::InvalidFormat {
            path,
            reason: "path is a directory".into(),
        });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2MdError::InvalidFormat {
                    path,
                    reason: format!("missing %PDF header (found {:?})", magic),
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2MdError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2MdError::FileNotFound { path });
        }
    }

    debug!("Validated PDF input: {}", path.display());
    Ok(path)
}

/// `true` when the path ends in `.pdf`, ignoring case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
