//! Configuration types for contract analysis.
//!
//! All pipeline behaviour is controlled through [`AnalysisConfig`], built via
//! its [`AnalysisConfigBuilder`]. Locale data travels inside the config as an
//! immutable [`LocaleCatalog`] so no component reads ambient global state.
//!
//! The three external seams (completion backend, OCR engine, report writer)
//! can be injected here; when left unset the pipeline uses `edgequake-llm`,
//! the `tesseract` CLI and PDFium respectively.

use crate::error::AnalysisError;
use crate::locale::{Locale, LocaleCatalog};
use crate::pipeline::extract::ocr::OcrEngine;
use crate::pipeline::llm::CompletionBackend;
use crate::pipeline::render::ReportWriter;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default Arabic-script font, fetched only when rendering right-to-left.
pub const DEFAULT_RTL_FONT_URL: &str =
    "https://raw.githubusercontent.com/frappe/fonts/master/usr_share_fonts/noto/NotoNaskhArabic-Regular.ttf";

/// Configuration for one or many analysis runs.
///
/// # Example
/// ```rust
/// use clausecheck::{AnalysisConfig, ArtifactNaming};
///
/// let config = AnalysisConfig::builder()
///     .model("gpt-4.1-mini")
///     .artifact_dir("/var/lib/clausecheck/pdfs")
///     .public_base_url("https://reviews.example.org/pdfs")
///     .artifact_naming(ArtifactNaming::Timestamped)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// LLM model identifier. If None, uses `gpt-4.1-mini`.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "azure", "anthropic").
    pub provider_name: Option<String>,

    /// Pre-constructed `edgequake-llm` provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed completion backend. Takes precedence over `provider`.
    pub backend: Option<Arc<dyn CompletionBackend>>,

    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 1000.
    pub max_tokens: usize,

    /// Ceiling for the metadata probe and the body download, in seconds. Default: 30.
    pub download_timeout_secs: u64,

    /// Ceiling for the completion call, in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Largest accepted source body in bytes. Default: 16 MiB.
    pub max_source_bytes: usize,

    /// Directory rendered reviews are written to. Default: `static/pdfs`.
    pub artifact_dir: PathBuf,

    /// Base URL under which `artifact_dir` is served. When unset the
    /// artifact reference is the file path.
    pub public_base_url: Option<String>,

    /// How rendered reviews are named. Default: [`ArtifactNaming::Timestamped`].
    pub artifact_naming: ArtifactNaming,

    /// Logo drawn at the foot of the review when the file exists. Default: `logo.png`.
    pub logo_path: Option<PathBuf>,

    /// Local Arabic-script TrueType font. Checked before `rtl_font_url`.
    pub rtl_font_path: Option<PathBuf>,

    /// Where to fetch the Arabic-script font when no local copy is configured.
    pub rtl_font_url: Option<String>,

    /// Ceiling for the font fetch, in seconds. Default: 15.
    pub font_timeout_secs: u64,

    /// Explicit path to the PDFium shared library.
    pub pdfium_library_path: Option<PathBuf>,

    /// Tesseract executable. Default: `tesseract`.
    pub tesseract_command: String,

    /// Primary OCR language set (tesseract `-l`). Default: `ara+eng+fra`.
    pub ocr_languages: String,

    /// Single-script OCR fallback. Default: `eng`.
    pub ocr_fallback_language: String,

    /// Pre-constructed OCR engine. When unset, tesseract is used.
    pub ocr_engine: Option<Arc<dyn OcrEngine>>,

    /// Pre-constructed report writer. When unset, PDFium is used.
    pub report_writer: Option<Arc<dyn ReportWriter>>,

    /// Locale profiles and the fallback locale.
    pub locales: Arc<LocaleCatalog>,

    /// Optional stage-progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            backend: None,
            temperature: 0.7,
            max_tokens: 1000,
            download_timeout_secs: 30,
            api_timeout_secs: 60,
            max_source_bytes: 16 * 1024 * 1024,
            artifact_dir: PathBuf::from("static/pdfs"),
            public_base_url: None,
            artifact_naming: ArtifactNaming::default(),
            logo_path: Some(PathBuf::from("logo.png")),
            rtl_font_path: None,
            rtl_font_url: Some(DEFAULT_RTL_FONT_URL.to_string()),
            font_timeout_secs: 15,
            pdfium_library_path: None,
            tesseract_command: "tesseract".to_string(),
            ocr_languages: "ara+eng+fra".to_string(),
            ocr_fallback_language: "eng".to_string(),
            ocr_engine: None,
            report_writer: None,
            locales: Arc::new(LocaleCatalog::builtin()),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("backend", &self.backend.as_ref().map(|_| "<dyn CompletionBackend>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_source_bytes", &self.max_source_bytes)
            .field("artifact_dir", &self.artifact_dir)
            .field("public_base_url", &self.public_base_url)
            .field("artifact_naming", &self.artifact_naming)
            .field("logo_path", &self.logo_path)
            .field("rtl_font_path", &self.rtl_font_path)
            .field("rtl_font_url", &self.rtl_font_url)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("tesseract_command", &self.tesseract_command)
            .field("ocr_languages", &self.ocr_languages)
            .field("ocr_fallback_language", &self.ocr_fallback_language)
            .field("default_locale", &self.locales.default_locale())
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl fmt::Debug for AnalysisConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl AnalysisConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_source_bytes(mut self, n: usize) -> Self {
        self.config.max_source_bytes = n;
        self
    }

    pub fn artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.artifact_dir = dir.into();
        self
    }

    pub fn public_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.public_base_url = Some(url.into());
        self
    }

    pub fn artifact_naming(mut self, naming: ArtifactNaming) -> Self {
        self.config.artifact_naming = naming;
        self
    }

    /// Set or clear the logo path.
    pub fn logo_path(mut self, path: Option<PathBuf>) -> Self {
        self.config.logo_path = path;
        self
    }

    pub fn rtl_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.rtl_font_path = Some(path.into());
        self
    }

    /// Set or clear the font URL. `None` disables the network fetch.
    pub fn rtl_font_url(mut self, url: Option<String>) -> Self {
        self.config.rtl_font_url = url;
        self
    }

    pub fn font_timeout_secs(mut self, secs: u64) -> Self {
        self.config.font_timeout_secs = secs;
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn tesseract_command(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_command = cmd.into();
        self
    }

    pub fn ocr_languages(mut self, langs: impl Into<String>) -> Self {
        self.config.ocr_languages = langs.into();
        self
    }

    pub fn ocr_fallback_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_fallback_language = lang.into();
        self
    }

    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr_engine = Some(engine);
        self
    }

    pub fn report_writer(mut self, writer: Arc<dyn ReportWriter>) -> Self {
        self.config.report_writer = Some(writer);
        self
    }

    pub fn locales(mut self, catalog: LocaleCatalog) -> Self {
        self.config.locales = Arc::new(catalog);
        self
    }

    /// Shortcut for replacing the catalog's fallback locale.
    pub fn default_locale(mut self, locale: Locale) -> Self {
        let catalog = (*self.config.locales).clone().with_default_locale(locale);
        self.config.locales = Arc::new(catalog);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, AnalysisError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.download_timeout_secs == 0 || c.api_timeout_secs == 0 {
            return Err(AnalysisError::InvalidConfig(
                "timeouts must be ≥ 1 second".into(),
            ));
        }
        if c.max_source_bytes == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_source_bytes must be ≥ 1".into(),
            ));
        }
        if c.ocr_languages.trim().is_empty() || c.ocr_fallback_language.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "OCR language sets must not be empty".into(),
            ));
        }
        if let ArtifactNaming::Fixed(ref name) = c.artifact_naming {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                return Err(AnalysisError::InvalidConfig(format!(
                    "fixed artifact name must be a bare file name, got '{name}'"
                )));
            }
        }
        c.locales.validate().map_err(AnalysisError::InvalidConfig)?;
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How rendered review files are named inside `artifact_dir`.
///
/// `Timestamped` names embed a per-request UUID, so concurrent requests can
/// never overwrite or read back each other's artifact. `Fixed` reuses one
/// name and is only safe when requests are serialised.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArtifactNaming {
    /// `recommendation-<UTC timestamp>-<uuid>.pdf` (default).
    #[default]
    Timestamped,
    /// The same file name on every request.
    Fixed(String),
}
