//! PDF text-layer extraction via PDFium.
//!
//! Pages are read in order and joined with a single space. A page whose
//! text cannot be read is skipped. Documents that refuse to open without a
//! password are retried once with the empty password, which is how most
//! "protected" contract exports are locked.

use super::ExtractError;
use crate::pdfium::bind_pdfium;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extract the text layer of a PDF. Returns an empty string on any failure.
pub async fn extract_pdf_text(bytes: &[u8], pdfium_library: Option<&Path>) -> String {
    let bytes = bytes.to_vec();
    let lib: Option<PathBuf> = pdfium_library.map(Path::to_path_buf);

    let result = tokio::task::spawn_blocking(move || extract_blocking(&bytes, lib.as_deref()))
        .await
        .map_err(ExtractError::from)
        .and_then(|r| r);

    match result {
        Ok(text) => text,
        Err(e) => {
            warn!("PDF extraction failed: {}", e);
            String::new()
        }
    }
}

fn extract_blocking(bytes: &[u8], pdfium_library: Option<&Path>) -> Result<String, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::Empty);
    }
    if !has_pdf_header(bytes) {
        return Err(ExtractError::NotPdf);
    }

    let pdfium = bind_pdfium(pdfium_library).map_err(|e| ExtractError::Pdfium(e.to_string()))?;

    let document = match pdfium.load_pdf_from_byte_slice(bytes, None) {
        Ok(doc) => doc,
        Err(e) if is_password_error(&e) => {
            debug!("PDF is encrypted, retrying with empty password");
            pdfium
                .load_pdf_from_byte_slice(bytes, Some(""))
                .map_err(|_| ExtractError::Encrypted)?
        }
        Err(e) => return Err(ExtractError::Pdfium(format!("{:?}", e))),
    };

    let pages = document.pages();
    debug!("PDF loaded: {} pages", pages.len());

    let mut parts: Vec<String> = Vec::with_capacity(pages.len() as usize);
    for (index, page) in pages.iter().enumerate() {
        match page.text() {
            Ok(text) => {
                let text = text.all();
                let text = text.trim();
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
            Err(e) => warn!("Skipping page {}: {:?}", index + 1, e),
        }
    }

    Ok(parts.join(" ").trim().to_string())
}

/// The `%PDF` marker may be preceded by up to 1 KiB of junk.
fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(1024)];
    window.windows(4).any(|w| w == b"%PDF")
}

fn is_password_error(e: &PdfiumError) -> bool {
    matches!(
        e,
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError)
    )
}
