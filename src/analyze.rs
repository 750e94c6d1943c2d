//! Pipeline entry points.
//!
//! [`analyze`] runs one request end to end:
//! resolve → fetch → extract → detect language → analyze → parse → render.
//! Each stage is awaited in turn; nothing inside a request runs in parallel.
//! [`analyze_text`] starts at language detection for callers that already
//! hold the document text.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::output::{AnalysisResult, AnalysisStats, DocumentFormat};
use crate::pipeline::input::{self, AnalysisRequest};
use crate::pipeline::parse::{self, ParseOutcome};
use crate::pipeline::{detect, extract, llm, render};
use crate::progress::{AnalysisProgressCallback, Stage};
use std::time::Instant;
use tracing::{debug, info};

/// Analyze the document or image named by `request`.
///
/// # Errors
/// Input errors (no source, both sources, unsupported or unreachable
/// source) are returned before any extraction or model work happens.
/// Empty extraction is [`AnalysisError::ExtractionFailed`]. Model and render
/// failures propagate with their cause.
///
/// A "not a contract" answer is **not** an error: the result has
/// `pdf_url == None` and `text` set to the model's answer.
pub async fn analyze(
    request: &AnalysisRequest,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let started = Instant::now();
    let source = request.source()?;
    info!("Starting analysis: {}", source);

    // ── Step 1: Resolve format ───────────────────────────────────────────
    emit(config, |cb| cb.on_stage_start(Stage::Resolve));
    let resolution = staged(config, Stage::Resolve, input::resolve_format(source, config).await)?;
    if !resolution.format.is_supported() {
        return staged(
            config,
            Stage::Resolve,
            Err(AnalysisError::UnsupportedFormat {
                source_ref: source.to_string(),
                content_type: resolution.content_type,
            }),
        );
    }
    let format = resolution.format;
    emit(config, |cb| cb.on_stage_complete(Stage::Resolve, &format.to_string()));

    // ── Step 2: Fetch bytes ──────────────────────────────────────────────
    emit(config, |cb| cb.on_stage_start(Stage::Fetch));
    let document = staged(
        config,
        Stage::Fetch,
        input::fetch_source(source, &resolution, config).await,
    )?;
    let fetched = format!("{} bytes", document.bytes.len());
    emit(config, |cb| cb.on_stage_complete(Stage::Fetch, &fetched));

    // ── Step 3: Extract text ─────────────────────────────────────────────
    emit(config, |cb| cb.on_stage_start(Stage::Extract));
    let extract_start = Instant::now();
    let text = extract::extract_text(&document, config).await;
    drop(document);
    let extraction_duration_ms = extract_start.elapsed().as_millis() as u64;

    if text.trim().is_empty() {
        return staged(
            config,
            Stage::Extract,
            Err(AnalysisError::ExtractionFailed {
                source_ref: source.to_string(),
                format,
            }),
        );
    }
    let extracted_chars = text.chars().count();
    emit(config, |cb| {
        cb.on_stage_complete(Stage::Extract, &format!("{} chars", extracted_chars))
    });

    let stats = AnalysisStats {
        extracted_chars,
        extraction_duration_ms,
        ..Default::default()
    };
    analyze_extracted(text, Some(format), stats, started, config).await
}

/// Analyze text that is already extracted.
///
/// Blank text is rejected with [`AnalysisError::NoInput`].
pub async fn analyze_text(
    text: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let started = Instant::now();
    let text = text.as_ref();
    if text.trim().is_empty() {
        return Err(AnalysisError::NoInput);
    }
    let stats = AnalysisStats {
        extracted_chars: text.chars().count(),
        ..Default::default()
    };
    analyze_extracted(text.to_string(), None, stats, started, config).await
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    request: &AnalysisRequest,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AnalysisError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze(request, config))
}

async fn analyze_extracted(
    text: String,
    format: Option<DocumentFormat>,
    mut stats: AnalysisStats,
    started: Instant,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    // ── Step 4: Detect language ──────────────────────────────────────────
    emit(config, |cb| cb.on_stage_start(Stage::DetectLanguage));
    let locale = detect::detect_catalog_locale(&text, &config.locales);
    let profile = config.locales.profile(locale);
    emit(config, |cb| cb.on_stage_complete(Stage::DetectLanguage, locale.code()));

    // ── Step 5: Model call ───────────────────────────────────────────────
    emit(config, |cb| cb.on_stage_start(Stage::Analyze));
    let llm_start = Instant::now();
    let backend = staged(config, Stage::Analyze, llm::resolve_backend(config))?;
    let completion = staged(
        config,
        Stage::Analyze,
        llm::invoke_with_backend(backend.as_ref(), &text, profile, config).await,
    )?;
    drop(text);
    stats.llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    stats.input_tokens = completion.input_tokens;
    stats.output_tokens = completion.output_tokens;
    let tokens = format!("{} tokens", completion.input_tokens + completion.output_tokens);
    emit(config, |cb| cb.on_stage_complete(Stage::Analyze, &tokens));

    // ── Step 6: Parse ────────────────────────────────────────────────────
    let outcome = parse::parse_response(&completion.content, profile, &config.locales);

    let items = match outcome {
        ParseOutcome::NotAContract => {
            info!("Model judged the document not to be a contract");
            stats.total_duration_ms = started.elapsed().as_millis() as u64;
            return Ok(AnalysisResult {
                pdf_url: None,
                text: completion.content,
                items: Vec::new(),
                locale,
                format,
                stats,
            });
        }
        ParseOutcome::Items(items) => items,
    };
    debug!("Parsed {} items", items.len());

    // ── Step 7: Render + store ───────────────────────────────────────────
    emit(config, |cb| cb.on_stage_start(Stage::Render));
    let render_start = Instant::now();
    let artifact = staged(
        config,
        Stage::Render,
        render::render_report(&items, profile, config).await,
    )?;
    stats.render_duration_ms = render_start.elapsed().as_millis() as u64;
    emit(config, |cb| cb.on_stage_complete(Stage::Render, &artifact.reference));

    stats.total_duration_ms = started.elapsed().as_millis() as u64;
    info!(
        "Analysis complete: {} items, {} → {}, {}ms total",
        items.len(),
        locale,
        artifact.reference,
        stats.total_duration_ms
    );

    Ok(AnalysisResult {
        pdf_url: Some(artifact.reference),
        text: completion.content,
        items,
        locale,
        format,
        stats,
    })
}

fn emit(config: &AnalysisConfig, f: impl FnOnce(&dyn AnalysisProgressCallback)) {
    if let Some(ref cb) = config.progress_callback {
        f(cb.as_ref());
    }
}

/// Pass `result` through, telling the callback when it is an error.
fn staged<T>(
    config: &AnalysisConfig,
    stage: Stage,
    result: Result<T, AnalysisError>,
) -> Result<T, AnalysisError> {
    if let Err(ref e) = result {
        emit(config, |cb| cb.on_stage_error(stage, &e.to_string()));
    }
    result
}
