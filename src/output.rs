//! Result types produced by the analysis pipeline.

use crate::locale::Locale;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source format as classified from the declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Legacy binary Word document.
    Doc,
    Image,
    Unsupported,
}

impl DocumentFormat {
    /// Whether an extractor exists for this format.
    pub fn is_supported(self) -> bool {
        !matches!(self, DocumentFormat::Unsupported)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Doc => "doc",
            DocumentFormat::Image => "image",
            DocumentFormat::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// Kind of a parsed line of model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A rubric section marker; the text is the canonical section label.
    Header,
    /// A line that started with `-`, `•` or `*`; the marker is stripped.
    Bullet,
    /// Any other line inside a section, kept verbatim.
    Plain,
}

/// One item of the structured analysis, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    pub text: String,
}

impl ContentItem {
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Header,
            text: text.into(),
        }
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Bullet,
            text: text.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Plain,
            text: text.into(),
        }
    }
}

/// Timing and size figures for one analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Characters of text handed to the model.
    pub extracted_chars: usize,
    pub input_tokens: usize,
    pub output_tokens: usize,
    /// Zero when the text was supplied directly.
    pub extraction_duration_ms: u64,
    pub llm_duration_ms: u64,
    /// Zero when nothing was rendered.
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The outcome of a successful analysis.
///
/// `pdf_url` is `None` when the model judged the input not to be a contract;
/// `text` then holds the sentinel answer verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Reference to the rendered review artifact.
    pub pdf_url: Option<String>,
    /// Raw model answer, unmodified.
    pub text: String,
    /// Parsed sections, empty for the sentinel outcome.
    pub items: Vec<ContentItem>,
    pub locale: Locale,
    /// `None` when the text was supplied directly rather than extracted.
    pub format: Option<DocumentFormat>,
    pub stats: AnalysisStats,
}

impl AnalysisResult {
    /// True when the model returned a "not a contract" sentinel.
    pub fn is_not_a_contract(&self) -> bool {
        self.pdf_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_display_is_lowercase() {
        assert_eq!(DocumentFormat::Docx.to_string(), "docx");
        assert_eq!(DocumentFormat::Unsupported.to_string(), "unsupported");
        assert!(!DocumentFormat::Unsupported.is_supported());
        assert!(DocumentFormat::Doc.is_supported());
    }

    #[test]
    fn content_item_serialises_with_lowercase_kind() {
        let json = serde_json::to_string(&ContentItem::bullet("Add indemnity clause")).unwrap();
        assert_eq!(json, r#"{"kind":"bullet","text":"Add indemnity clause"}"#);
    }
}
