//! Error types for the clausecheck library.
//!
//! [`AnalysisError`] covers every condition that prevents the pipeline from
//! producing a result. Conditions the pipeline can absorb (a single PDF page
//! without a text layer, one failed OCR tier, an inconclusive language guess,
//! a missing font or logo) never appear here; they are logged with `tracing`
//! and resolved to a safe default at the component boundary.
//!
//! Variants are grouped the same way callers need to react to them, and
//! [`AnalysisError::category`] exposes that grouping so an outer HTTP layer
//! can map errors to status codes without matching on message text.

use crate::output::DocumentFormat;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the clausecheck library.
#[derive(Debug, Error)]
pub enum AnalysisError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Neither a document URL nor an image URL was supplied.
    #[error("No URL provided: set exactly one of pdf_url or image_url")]
    NoInput,

    /// Both a document URL and an image URL were supplied.
    #[error("Ambiguous input: pdf_url and image_url are mutually exclusive")]
    AmbiguousInput,

    /// A local source path does not exist or is unreadable.
    #[error("Source file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The declared content type is missing or not one we can extract.
    #[error("Unsupported document format for '{source_ref}' (content type: {})", content_type.as_deref().unwrap_or("<none>"))]
    UnsupportedFormat {
        source_ref: String,
        content_type: Option<String>,
    },

    /// The source could not be downloaded.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// The download exceeded the configured ceiling.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The source body is larger than the configured maximum.
    #[error("Source '{source_ref}' is {size} bytes, above the {limit}-byte limit")]
    SourceTooLarge {
        source_ref: String,
        size: usize,
        limit: usize,
    },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Every extraction strategy for the format produced empty text.
    #[error("Failed to extract text from {format} source '{source_ref}'")]
    ExtractionFailed {
        source_ref: String,
        format: DocumentFormat,
    },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The completion call failed at the transport or API level.
    #[error("LLM API error: {message}")]
    ModelCallFailed { message: String },

    /// The completion call did not return within `api_timeout_secs`.
    #[error("LLM call timed out after {secs}s")]
    ModelTimeout { secs: u64 },

    // ── Render errors ─────────────────────────────────────────────────────
    /// No PDFium shared library could be bound.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumUnavailable(String),

    /// The review document could not be produced.
    #[error("Failed to render review PDF: {detail}")]
    RenderFailed { detail: String },

    /// The rendered artifact could not be persisted.
    #[error("Failed to write artifact '{path}': {source}")]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse grouping of [`AnalysisError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The caller's request cannot be served as given.
    Input,
    /// The source was fetched but yielded no text.
    Extraction,
    /// The language model call failed.
    Model,
    /// The review artifact could not be produced or stored.
    Render,
    /// The library was configured incorrectly.
    Config,
    /// Anything else.
    Internal,
}

impl AnalysisError {
    /// Which group this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::NoInput
            | AnalysisError::AmbiguousInput
            | AnalysisError::FileNotFound { .. }
            | AnalysisError::UnsupportedFormat { .. }
            | AnalysisError::DownloadFailed { .. }
            | AnalysisError::DownloadTimeout { .. }
            | AnalysisError::SourceTooLarge { .. } => ErrorCategory::Input,
            AnalysisError::ExtractionFailed { .. } => ErrorCategory::Extraction,
            AnalysisError::ProviderNotConfigured { .. }
            | AnalysisError::ModelCallFailed { .. }
            | AnalysisError::ModelTimeout { .. } => ErrorCategory::Model,
            AnalysisError::PdfiumUnavailable(_)
            | AnalysisError::RenderFailed { .. }
            | AnalysisError::ArtifactWriteFailed { .. } => ErrorCategory::Render,
            AnalysisError::InvalidConfig(_) => ErrorCategory::Config,
            AnalysisError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// True when the request itself was at fault (a 4xx in HTTP terms).
    ///
    /// Extraction failures count as client errors: the document the caller
    /// pointed at has no readable text.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Input | ErrorCategory::Extraction
        )
    }
}
