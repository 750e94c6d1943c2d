//! CLI binary for clausecheck.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalysisConfig`, runs one analysis, and prints the outcome.

use anyhow::{Context, Result};
use clap::Parser;
use clausecheck::{
    analyze, analyze_text, items_to_text, AnalysisConfig, AnalysisProgressCallback,
    AnalysisRequest, AnalysisResult, ArtifactNaming, Locale, ProgressCallback, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that names the running stage and logs each finished one.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message("…");
    }

    fn on_stage_complete(&self, stage: Stage, detail: &str) {
        self.bar
            .println(format!("  {} {:<16} {}", green("✓"), stage, dim(detail)));
        if stage == Stage::Render {
            self.bar.finish_and_clear();
        }
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {:<16} {}", red("✗"), stage, red(&msg)));
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Review a PDF contract
  clausecheck --pdf-url https://example.org/lease.pdf

  # Review a Word document, serve the review from a public URL
  clausecheck --pdf-url ./lease.docx --public-base-url https://reviews.example.org/pdfs

  # Review a scanned contract
  clausecheck --image-url https://example.org/scan.jpg

  # Already-extracted text, JSON output
  clausecheck --text-file contract.txt --json

SOURCES:
  --pdf-url accepts PDF and Word documents, --image-url accepts images.
  Both take an HTTP(S) URL or a local path. Exactly one must be given.
  The format is taken from the declared content type (HEAD request for
  URLs, file extension for paths).

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY            OpenAI API key
  ANTHROPIC_API_KEY         Anthropic API key
  AZURE_OPENAI_API_KEY      Azure OpenAI key (with endpoint / deployment vars)
  CLAUSECHECK_LLM_PROVIDER  Provider used when --provider is not given
  CLAUSECHECK_MODEL         Model ID (default gpt-4.1-mini)
  PDFIUM_LIB_PATH           Path to libpdfium (file or directory)
  RUST_LOG                  Log filter, overrides --verbose / --quiet

RUNTIME:
  PDF sources and the rendered review need the PDFium shared library.
  Image sources need tesseract with the ara, eng and fra language data.
"#;

/// Review contracts with an LLM and render a localized PDF.
#[derive(Parser, Debug)]
#[command(
    name = "clausecheck",
    version,
    about = "Review contracts with an LLM and render a localized PDF",
    long_about = "Extract the text of a contract (PDF, Word, or scanned image), have a language \
model assess it for missing clauses, problems and recommendations in the contract's own language \
(English, French or Arabic), and render the review as a PDF.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document (PDF / Word) URL or path.
    #[arg(long, env = "CLAUSECHECK_PDF_URL")]
    pdf_url: Option<String>,

    /// Image URL or path.
    #[arg(long, env = "CLAUSECHECK_IMAGE_URL")]
    image_url: Option<String>,

    /// Analyze the text in this file instead of extracting a source.
    #[arg(long, conflicts_with_all = ["pdf_url", "image_url"])]
    text_file: Option<PathBuf>,

    /// Directory rendered reviews are written to.
    #[arg(short, long, env = "CLAUSECHECK_OUTPUT_DIR", default_value = "static/pdfs")]
    output_dir: PathBuf,

    /// Base URL the output directory is served under.
    #[arg(long, env = "CLAUSECHECK_PUBLIC_BASE_URL")]
    public_base_url: Option<String>,

    /// Reuse this file name for every review instead of a unique one.
    #[arg(long, env = "CLAUSECHECK_FIXED_NAME")]
    fixed_name: Option<String>,

    /// LLM model ID (default gpt-4.1-mini).
    #[arg(long, env = "CLAUSECHECK_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, azure, anthropic, gemini, ollama.
    #[arg(long, env = "CLAUSECHECK_PROVIDER")]
    provider: Option<String>,

    /// Max LLM output tokens.
    #[arg(long, env = "CLAUSECHECK_MAX_TOKENS", default_value_t = 1000)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "CLAUSECHECK_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Locale used when detection is inconclusive: en, fr, ar.
    #[arg(long, env = "CLAUSECHECK_DEFAULT_LOCALE", default_value = "en")]
    default_locale: String,

    /// Logo drawn at the end of the review.
    #[arg(long, env = "CLAUSECHECK_LOGO", default_value = "logo.png")]
    logo: PathBuf,

    /// Local Arabic-script TrueType font.
    #[arg(long, env = "CLAUSECHECK_RTL_FONT")]
    font: Option<PathBuf>,

    /// URL to fetch the Arabic-script font from.
    #[arg(long, env = "CLAUSECHECK_RTL_FONT_URL")]
    font_url: Option<String>,

    /// Path to the PDFium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Tesseract executable.
    #[arg(long, env = "CLAUSECHECK_TESSERACT", default_value = "tesseract")]
    tesseract: String,

    /// Source download timeout in seconds.
    #[arg(long, env = "CLAUSECHECK_DOWNLOAD_TIMEOUT", default_value_t = 30)]
    download_timeout: u64,

    /// LLM call timeout in seconds.
    #[arg(long, env = "CLAUSECHECK_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Output the full result as JSON.
    #[arg(long, env = "CLAUSECHECK_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "CLAUSECHECK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CLAUSECHECK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, env = "CLAUSECHECK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner reports progress; library INFO logs would tear it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn AnalysisProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run analysis ─────────────────────────────────────────────────────
    let result = match cli.text_file {
        Some(ref path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            analyze_text(&text, &config).await
        }
        None => {
            let request = AnalysisRequest {
                pdf_url: cli.pdf_url.clone(),
                image_url: cli.image_url.clone(),
            };
            analyze(&request, &config).await
        }
    }
    .context("Analysis failed")?;

    print_result(&cli, &result)?;
    Ok(())
}

fn print_result(cli: &Cli, result: &AnalysisResult) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(result).context("Failed to serialise result")?;
        println!("{json}");
        return Ok(());
    }

    match result.pdf_url {
        Some(ref url) => {
            println!("{}", items_to_text(&result.items));
            if !cli.quiet {
                eprintln!("{} review ({}) → {}", green("✔"), result.locale, bold(url));
            }
        }
        None => {
            println!("{}", result.text.trim());
            if !cli.quiet {
                eprintln!("{} no review rendered", dim("•"));
            }
        }
    }

    if !cli.quiet {
        eprintln!(
            "   {} chars  /  {} tokens in  /  {} tokens out  —  {}ms total",
            dim(&result.stats.extracted_chars.to_string()),
            dim(&result.stats.input_tokens.to_string()),
            dim(&result.stats.output_tokens.to_string()),
            result.stats.total_duration_ms,
        );
    }
    Ok(())
}

/// Map CLI args to `AnalysisConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AnalysisConfig> {
    let default_locale = Locale::from_code(&cli.default_locale)
        .with_context(|| format!("Unsupported locale '{}' (expected en, fr or ar)", cli.default_locale))?;

    let naming = match cli.fixed_name {
        Some(ref name) => ArtifactNaming::Fixed(name.clone()),
        None => ArtifactNaming::Timestamped,
    };

    let mut builder = AnalysisConfig::builder()
        .artifact_dir(&cli.output_dir)
        .artifact_naming(naming)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout)
        .default_locale(default_locale)
        .logo_path(Some(cli.logo.clone()))
        .tesseract_command(&cli.tesseract);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref url) = cli.public_base_url {
        builder = builder.public_base_url(url);
    }
    if let Some(ref font) = cli.font {
        builder = builder.rtl_font_path(font);
    }
    if let Some(ref url) = cli.font_url {
        builder = builder.rtl_font_url(Some(url.clone()));
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
