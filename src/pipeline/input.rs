//! Input resolution: validate the request, classify the source, fetch its bytes.
//!
//! The format is decided from the *declared* content type alone: a metadata
//! probe (`HEAD`) for URLs, the file extension for local paths. A missing,
//! unparseable or unknown content type classifies as
//! [`DocumentFormat::Unsupported`]; that is an ordinary outcome the caller
//! turns into an input error, not a crash. The body is downloaded only after
//! the format is known to be extractable.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::output::DocumentFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The inbound "analyze document" request.
///
/// Exactly one of the two fields must be populated; empty strings count as
/// absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Document (PDF / Word) URL or local path.
    pub pdf_url: Option<String>,
    /// Image URL or local path.
    pub image_url: Option<String>,
}

impl AnalysisRequest {
    pub fn document(url: impl Into<String>) -> Self {
        Self {
            pdf_url: Some(url.into()),
            image_url: None,
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            pdf_url: None,
            image_url: Some(url.into()),
        }
    }

    /// The single populated source reference.
    pub fn source(&self) -> Result<&str, AnalysisError> {
        fn pick(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }
        match (pick(&self.pdf_url), pick(&self.image_url)) {
            (Some(url), None) | (None, Some(url)) => Ok(url),
            (None, None) => Err(AnalysisError::NoInput),
            (Some(_), Some(_)) => Err(AnalysisError::AmbiguousInput),
        }
    }
}

/// Raw bytes of a fetched source plus what we know about its type.
///
/// Owned by exactly one extraction call and dropped afterwards.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub source_ref: String,
    pub bytes: Vec<u8>,
    pub declared_mime: Option<String>,
    pub format: DocumentFormat,
}

/// Outcome of the metadata probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResolution {
    pub format: DocumentFormat,
    pub content_type: Option<String>,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Classify a declared MIME type by substring match against known tokens.
pub fn classify_content_type(content_type: Option<&str>) -> DocumentFormat {
    let Some(ct) = content_type else {
        return DocumentFormat::Unsupported;
    };
    let ct = ct.trim().to_ascii_lowercase();

    if ct.contains("application/pdf") || ct.contains("application/x-pdf") {
        DocumentFormat::Pdf
    } else if ct.contains("wordprocessingml.document") {
        DocumentFormat::Docx
    } else if ct.contains("application/msword") {
        DocumentFormat::Doc
    } else if ct.contains("image/") {
        DocumentFormat::Image
    } else {
        DocumentFormat::Unsupported
    }
}

/// Determine the source format without downloading the body.
///
/// URLs never produce an error here: a failed probe is reported as
/// `Unsupported`. Local paths that do not exist are a
/// [`AnalysisError::FileNotFound`].
pub async fn resolve_format(
    source: &str,
    config: &AnalysisConfig,
) -> Result<FormatResolution, AnalysisError> {
    if is_url(source) {
        Ok(probe_url(source, config.download_timeout_secs).await)
    } else {
        resolve_local(source)
    }
}

fn resolve_local(path_str: &str) -> Result<FormatResolution, AnalysisError> {
    let path = PathBuf::from(path_str);
    if !path.is_file() {
        return Err(AnalysisError::FileNotFound { path });
    }
    let content_type = mime_guess::from_path(&path)
        .first()
        .map(|m| m.essence_str().to_string());
    let format = classify_content_type(content_type.as_deref());
    debug!(
        "Resolved local source {} as {} ({:?})",
        path.display(),
        format,
        content_type
    );
    Ok(FormatResolution {
        format,
        content_type,
    })
}

async fn probe_url(url: &str, timeout_secs: u64) -> FormatResolution {
    let unsupported = FormatResolution {
        format: DocumentFormat::Unsupported,
        content_type: None,
    };

    let client = match http_client(timeout_secs) {
        Ok(c) => c,
        Err(e) => {
            warn!("Cannot build HTTP client for probe: {}", e);
            return unsupported;
        }
    };

    let response = match client.head(url).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!("HEAD {} failed: {}", url, e);
            return unsupported;
        }
    };

    if !response.status().is_success() {
        warn!("HEAD {} returned HTTP {}", url, response.status());
        return unsupported;
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let format = classify_content_type(content_type.as_deref());
    info!("Resolved {} as {} ({:?})", url, format, content_type);
    FormatResolution {
        format,
        content_type,
    }
}

/// Fetch the source bytes for an already-resolved format.
pub async fn fetch_source(
    source: &str,
    resolution: &FormatResolution,
    config: &AnalysisConfig,
) -> Result<SourceDocument, AnalysisError> {
    let bytes = if is_url(source) {
        download_url(source, config).await?
    } else {
        read_local(source, config).await?
    };

    Ok(SourceDocument {
        source_ref: source.to_string(),
        bytes,
        declared_mime: resolution.content_type.clone(),
        format: resolution.format,
    })
}

async fn read_local(path_str: &str, config: &AnalysisConfig) -> Result<Vec<u8>, AnalysisError> {
    let bytes = tokio::fs::read(path_str)
        .await
        .map_err(|_| AnalysisError::FileNotFound {
            path: PathBuf::from(path_str),
        })?;
    check_size(path_str, bytes.len(), config.max_source_bytes)?;
    debug!("Read {} bytes from {}", bytes.len(), path_str);
    Ok(bytes)
}

async fn download_url(url: &str, config: &AnalysisConfig) -> Result<Vec<u8>, AnalysisError> {
    let timeout_secs = config.download_timeout_secs;
    let limit = config.max_source_bytes;
    info!("Downloading source from: {}", url);

    let client = http_client(timeout_secs)?;
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| download_error(url, timeout_secs, e))?;

    if !response.status().is_success() {
        return Err(AnalysisError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    if let Some(len) = response.content_length() {
        check_size(url, len as usize, limit)?;
    }

    // The declared length may be absent (chunked) or wrong; count as we go.
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| download_error(url, timeout_secs, e))?
    {
        check_size(url, body.len() + chunk.len(), limit)?;
        body.extend_from_slice(&chunk);
    }

    info!("Downloaded {} bytes", body.len());
    Ok(body)
}

fn download_error(url: &str, timeout_secs: u64, e: reqwest::Error) -> AnalysisError {
    if e.is_timeout() {
        AnalysisError::DownloadTimeout {
            url: url.to_string(),
            secs: timeout_secs,
        }
    } else {
        AnalysisError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

fn check_size(source_ref: &str, size: usize, limit: usize) -> Result<(), AnalysisError> {
    if size > limit {
        return Err(AnalysisError::SourceTooLarge {
            source_ref: source_ref.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

/// HTTP client with a whole-request timeout.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, AnalysisError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AnalysisError::Internal(format!("HTTP client: {e}")))
}
