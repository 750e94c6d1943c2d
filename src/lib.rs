//! # clausecheck
//!
//! Review contracts with a language model and deliver the review as a
//! localized PDF.
//!
//! A request names one source, a document (PDF or Word) or a scanned
//! image, by URL or local path. The text is extracted, its language
//! detected, and the model asked to assess it against a three-part rubric
//! (missing clauses, problem description, recommendation) in that language.
//! The answer is parsed into typed lines and rendered as an English, French
//! or Arabic (right-to-left) review.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL / path
//!  │
//!  ├─ 1. Resolve  declared content type → pdf | docx | doc | image
//!  ├─ 2. Fetch    download (bounded) or read the bytes
//!  ├─ 3. Extract  PDFium text layer | docx-rs | tesseract (multilingual, then fallback)
//!  ├─ 4. Detect   whatlang → en | fr | ar (default on doubt)
//!  ├─ 5. Analyze  one completion call with the locale's rubric
//!  ├─ 6. Parse    header / bullet / plain items, or "not a contract"
//!  └─ 7. Render   shaped, paginated review PDF → artifact reference
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clausecheck::{analyze, AnalysisConfig, AnalysisRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = AnalysisConfig::builder()
//!         .public_base_url("https://reviews.example.org/static/pdfs")
//!         .build()?;
//!     let request = AnalysisRequest::document("https://example.org/lease.pdf");
//!     let result = analyze(&request, &config).await?;
//!     match result.pdf_url {
//!         Some(url) => println!("review: {url}"),
//!         None => println!("{}", result.text),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `clausecheck` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Runtime requirements
//!
//! PDF reading and writing need the PDFium shared library (see
//! [`pdfium`]); image sources need the `tesseract` executable with the
//! `ara`, `eng` and `fra` language data. Both can be replaced through
//! [`ReportWriter`] and [`OcrEngine`] implementations.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod locale;
pub mod output;
pub mod pdfium;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_sync, analyze_text};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ArtifactNaming};
pub use error::{AnalysisError, ErrorCategory};
pub use locale::{Locale, LocaleCatalog, LocaleProfile, SectionKey, SectionVocabulary, TextDirection};
pub use output::{AnalysisResult, AnalysisStats, ContentItem, ContentKind, DocumentFormat};
pub use pipeline::extract::ocr::{OcrEngine, TesseractCli};
pub use pipeline::input::AnalysisRequest;
pub use pipeline::llm::{Completion, CompletionBackend, CompletionSettings, ProviderBackend};
pub use pipeline::parse::{items_to_text, parse_response, ParseOutcome};
pub use pipeline::render::{PdfiumWriter, ReportWriter, StoredArtifact};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
