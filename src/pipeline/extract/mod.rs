//! Text extractors: raw source bytes → plain UTF-8 text.
//!
//! Three independent strategies, chosen only by the resolved
//! [`DocumentFormat`]:
//!
//! | Format          | Extractor                        |
//! |-----------------|----------------------------------|
//! | `pdf`           | [`pdf::extract_pdf_text`] (PDFium) |
//! | `docx`, `doc`   | [`word::extract_word_text`] (docx-rs) |
//! | `image`         | [`ocr::extract_image_text`] (tesseract, two tiers) |
//!
//! No extractor returns an error. Internal failures are logged and the
//! extractor yields an empty string; the caller decides what empty means.
//! Native libraries and the OCR subprocess run under `spawn_blocking`.

pub mod ocr;
pub mod pdf;
pub mod word;

use crate::config::AnalysisConfig;
use crate::output::DocumentFormat;
use crate::pipeline::input::SourceDocument;
use ocr::{OcrEngine, TesseractCli};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Failures inside an extractor. Never crosses the extractor boundary.
#[derive(Debug, Error)]
pub(crate) enum ExtractError {
    #[error("empty input")]
    Empty,

    #[error("no %PDF header")]
    NotPdf,

    #[error("pdfium: {0}")]
    Pdfium(String),

    #[error("encrypted and the empty password was rejected")]
    Encrypted,

    #[error("legacy binary Word format is not readable")]
    LegacyWord,

    #[error("docx: {0}")]
    Docx(String),

    #[error("image decode: {0}")]
    Image(#[from] image::ImageError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Extract text from a fetched source, dispatching on its format.
pub async fn extract_text(doc: &SourceDocument, config: &AnalysisConfig) -> String {
    let text = match doc.format {
        DocumentFormat::Pdf => {
            pdf::extract_pdf_text(&doc.bytes, config.pdfium_library_path.as_deref()).await
        }
        DocumentFormat::Docx | DocumentFormat::Doc => word::extract_word_text(&doc.bytes).await,
        DocumentFormat::Image => {
            let engine = ocr_engine(config);
            ocr::extract_image_text(
                &doc.bytes,
                engine,
                &config.ocr_languages,
                &config.ocr_fallback_language,
            )
            .await
        }
        DocumentFormat::Unsupported => {
            warn!("No extractor for unsupported source '{}'", doc.source_ref);
            String::new()
        }
    };

    info!(
        "Extracted {} chars from {} source '{}'",
        text.chars().count(),
        doc.format,
        doc.source_ref
    );
    text
}

fn ocr_engine(config: &AnalysisConfig) -> Arc<dyn OcrEngine> {
    match config.ocr_engine {
        Some(ref engine) => Arc::clone(engine),
        None => Arc::new(TesseractCli::new(config.tesseract_command.clone())),
    }
}
