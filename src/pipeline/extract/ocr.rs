//! Image OCR with a multilingual first pass and a single-script fallback.
//!
//! The image is decoded and re-encoded as PNG into a temporary file so the
//! OCR engine always sees a format it reads. The primary pass asks for all
//! supported scripts at once (`ara+eng+fra` by default). If that pass fails
//! or recognises nothing, one more pass runs with the fallback language.
//! Nothing above this module retries.

use super::ExtractError;
use image::ImageFormat;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An OCR engine that reads text from an image file.
///
/// `languages` uses tesseract's `-l` syntax (`eng`, `ara+eng+fra`). Calls
/// are blocking; the extractor runs them under `spawn_blocking`.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &Path, languages: &str) -> Result<String, String>;
}

/// Shells out to the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: String,
}

impl TesseractCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &Path, languages: &str) -> Result<String, String> {
        let output = Command::new(&self.command)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(languages)
            .output()
            .map_err(|e| format!("failed to run '{}': {}", self.command, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// OCR an image. Returns an empty string only when both passes fail.
pub async fn extract_image_text(
    bytes: &[u8],
    engine: Arc<dyn OcrEngine>,
    primary_languages: &str,
    fallback_language: &str,
) -> String {
    let bytes = bytes.to_vec();
    let primary = primary_languages.to_string();
    let fallback = fallback_language.to_string();

    let result = tokio::task::spawn_blocking(move || {
        ocr_blocking(&bytes, engine.as_ref(), &primary, &fallback)
    })
    .await
    .map_err(ExtractError::from)
    .and_then(|r| r);

    match result {
        Ok(text) => text,
        Err(e) => {
            warn!("Image OCR failed: {}", e);
            String::new()
        }
    }
}

fn ocr_blocking(
    bytes: &[u8],
    engine: &dyn OcrEngine,
    primary: &str,
    fallback: &str,
) -> Result<String, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::Empty);
    }

    let image = image::load_from_memory(bytes)?;
    debug!("Decoded image {}x{}", image.width(), image.height());

    let file = tempfile::Builder::new()
        .prefix("clausecheck-ocr-")
        .suffix(".png")
        .tempfile()?;
    image.save_with_format(file.path(), ImageFormat::Png)?;

    if let Some(text) = attempt(engine, file.path(), primary) {
        return Ok(text);
    }
    info!("Falling back to single-script OCR ({})", fallback);
    Ok(attempt(engine, file.path(), fallback).unwrap_or_default())
}

/// One OCR pass; `None` when the engine errors or sees no text.
fn attempt(engine: &dyn OcrEngine, image: &Path, languages: &str) -> Option<String> {
    match engine.recognize(image, languages) {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                warn!("OCR ({}) recognised no text", languages);
                None
            } else {
                debug!("OCR ({}) recognised {} chars", languages, text.chars().count());
                Some(text.to_string())
            }
        }
        Err(e) => {
            warn!("OCR ({}) failed: {}", languages, e);
            None
        }
    }
}
