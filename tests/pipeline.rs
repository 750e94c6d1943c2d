//! End-to-end pipeline tests with in-process model, OCR and writer stubs.
//!
//! Nothing here touches the network, PDFium or tesseract: sources are local
//! files, and the three external seams are replaced through the config.

use async_trait::async_trait;
use clausecheck::pipeline::render::layout::RenderPlan;
use clausecheck::prompts::{SENTINEL_EN, SENTINEL_FR};
use clausecheck::{
    analyze, analyze_text, AnalysisConfig, AnalysisError, AnalysisProgressCallback,
    AnalysisRequest, ArtifactNaming, Completion, CompletionBackend, CompletionSettings,
    ContentItem, DocumentFormat, Locale, OcrEngine, ReportWriter, Stage, TextDirection,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const ENGLISH_CONTRACT: &str = "This lease agreement is made between the landlord and the tenant. \
The tenant agrees to pay the monthly rent on the first day of each month and to keep the \
premises in good condition for the whole term of the lease.";

const FRENCH_CONTRACT: &str = "Le présent contrat de bail est conclu entre le bailleur et le \
locataire. Le locataire s'engage à payer le loyer mensuel le premier jour de chaque mois et à \
maintenir les lieux en bon état pendant toute la durée du bail.";

const ARABIC_CONTRACT: &str = "هذا العقد مبرم بين المؤجر والمستأجر لتأجير الشقة الواقعة في المدينة \
لمدة سنة كاملة ويلتزم المستأجر بدفع الإيجار في بداية كل شهر والمحافظة على العين المؤجرة.";

// ── Stubs ────────────────────────────────────────────────────────────────────

/// Returns a fixed answer and records the prompts it was given.
struct Scripted {
    answer: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl Scripted {
    fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CompletionBackend for Scripted {
    async fn complete(
        &self,
        system_prompt: &str,
        _user_text: &str,
        _settings: &CompletionSettings,
    ) -> Result<Completion, String> {
        self.prompts.lock().unwrap().push(system_prompt.to_string());
        self.answer.clone().map(|content| Completion {
            content,
            input_tokens: 120,
            output_tokens: 30,
        })
    }
}

struct Unreachable;

#[async_trait]
impl CompletionBackend for Unreachable {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_text: &str,
        _settings: &CompletionSettings,
    ) -> Result<Completion, String> {
        panic!("model must not be called");
    }
}

/// Records what it was asked to paint and returns a placeholder document.
#[derive(Default)]
struct RecordingWriter {
    plans: Mutex<Vec<(TextDirection, String, Vec<String>)>>,
}

impl ReportWriter for RecordingWriter {
    fn write(&self, plan: &RenderPlan, _rtl_font: Option<&[u8]>) -> Result<Vec<u8>, AnalysisError> {
        self.plans.lock().unwrap().push((
            plan.direction,
            plan.title.clone(),
            plan.texts().map(str::to_string).collect(),
        ));
        Ok(b"%PDF-stub".to_vec())
    }
}

struct StubOcr {
    text: String,
    calls: AtomicUsize,
}

impl OcrEngine for StubOcr {
    fn recognize(&self, image: &Path, _languages: &str) -> Result<String, String> {
        assert!(image.exists());
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

#[derive(Default)]
struct StageLog {
    events: Mutex<Vec<String>>,
}

impl AnalysisProgressCallback for StageLog {
    fn on_stage_start(&self, stage: Stage) {
        self.events.lock().unwrap().push(format!("start:{stage}"));
    }

    fn on_stage_complete(&self, stage: Stage, _detail: &str) {
        self.events.lock().unwrap().push(format!("done:{stage}"));
    }

    fn on_stage_error(&self, stage: Stage, _error: &str) {
        self.events.lock().unwrap().push(format!("error:{stage}"));
    }
}

fn config_with(
    dir: &Path,
    backend: Arc<dyn CompletionBackend>,
    writer: Arc<RecordingWriter>,
) -> AnalysisConfig {
    AnalysisConfig::builder()
        .artifact_dir(dir)
        .public_base_url("https://reviews.example.org/static/pdfs")
        .logo_path(None)
        .rtl_font_url(None)
        .backend(backend)
        .report_writer(writer)
        .build()
        .unwrap()
}

fn write_docx(path: &Path, paragraphs: &[&str]) {
    use docx_rs::{Docx, Paragraph, Run};

    let mut docx = Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
    }
    let file = std::fs::File::create(path).unwrap();
    docx.build().pack(file).unwrap();
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn english_contract_is_rendered_and_referenced() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Scripted::answering(
        "Missing Articles/Clauses: none\nRecommendation:\n• Add indemnity clause",
    );
    let writer = Arc::new(RecordingWriter::default());
    let config = config_with(dir.path(), backend.clone(), writer.clone());

    let result = analyze_text(ENGLISH_CONTRACT, &config).await.unwrap();

    assert_eq!(result.locale, Locale::En);
    assert_eq!(
        result.items,
        vec![
            ContentItem::header("Missing Articles/Clauses"),
            ContentItem::plain("none"),
            ContentItem::header("Recommendation"),
            ContentItem::bullet("Add indemnity clause"),
        ]
    );

    let url = result.pdf_url.expect("review should be rendered");
    assert!(url.starts_with("https://reviews.example.org/static/pdfs/recommendation-"));
    assert!(url.ends_with(".pdf"));

    let file_name = url.rsplit('/').next().unwrap();
    assert_eq!(std::fs::read(dir.path().join(file_name)).unwrap(), b"%PDF-stub");

    let plans = writer.plans.lock().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].0, TextDirection::LeftToRight);
    assert_eq!(plans[0].1, "Contract Analysis");
    assert!(plans[0].2.iter().any(|t| t.contains("Add indemnity clause")));

    assert!(backend.prompts.lock().unwrap()[0].ends_with(SENTINEL_EN));
    assert_eq!(result.stats.input_tokens, 120);
    assert_eq!(result.stats.output_tokens, 30);
}

#[tokio::test]
async fn french_sentinel_skips_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let config = config_with(dir.path(), Scripted::answering(SENTINEL_FR), writer.clone());

    let result = analyze_text(FRENCH_CONTRACT, &config).await.unwrap();

    assert_eq!(result.locale, Locale::Fr);
    assert!(result.pdf_url.is_none());
    assert!(result.is_not_a_contract());
    assert_eq!(result.text, SENTINEL_FR);
    assert!(result.items.is_empty());
    assert!(writer.plans.lock().unwrap().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
}

#[tokio::test]
async fn sentinel_in_another_language_is_still_recognised() {
    let dir = tempfile::tempdir().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let answer = format!("  {}\n", SENTINEL_EN);
    let config = config_with(dir.path(), Scripted::answering(&answer), writer.clone());

    let result = analyze_text(FRENCH_CONTRACT, &config).await.unwrap();

    assert!(result.pdf_url.is_none());
    assert_eq!(result.text, answer);
}

#[tokio::test]
async fn empty_request_fails_before_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with(
        dir.path(),
        Arc::new(Unreachable),
        Arc::new(RecordingWriter::default()),
    );

    let err = analyze(&AnalysisRequest::default(), &config).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NoInput));
    assert!(err.is_client_error());

    let both = AnalysisRequest {
        pdf_url: Some("a.pdf".into()),
        image_url: Some("b.png".into()),
    };
    let err = analyze(&both, &config).await.unwrap_err();
    assert!(matches!(err, AnalysisError::AmbiguousInput));
}

#[tokio::test]
async fn missing_local_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with(
        dir.path(),
        Arc::new(Unreachable),
        Arc::new(RecordingWriter::default()),
    );
    let request = AnalysisRequest::document(dir.path().join("nope.pdf").display().to_string());

    let err = analyze(&request, &config).await.unwrap_err();
    assert!(matches!(err, AnalysisError::FileNotFound { .. }));
}

#[tokio::test]
async fn unsupported_content_type_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, ENGLISH_CONTRACT).unwrap();
    let config = config_with(
        dir.path(),
        Arc::new(Unreachable),
        Arc::new(RecordingWriter::default()),
    );

    let err = analyze(&AnalysisRequest::document(path.display().to_string()), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::UnsupportedFormat { .. }));
}

#[tokio::test]
async fn model_failure_is_surfaced() {
    let dir = tempfile::tempdir().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let config = config_with(dir.path(), Scripted::failing("rate limited"), writer.clone());

    let err = analyze_text(ENGLISH_CONTRACT, &config).await.unwrap_err();
    match err {
        AnalysisError::ModelCallFailed { message } => assert!(message.contains("rate limited")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(writer.plans.lock().unwrap().is_empty());
}

#[tokio::test]
async fn word_document_is_extracted_and_analyzed() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("lease.docx");
    write_docx(&source, &[ENGLISH_CONTRACT, "Signed by both parties."]);

    let out = dir.path().join("out");
    let backend = Scripted::answering("Problem Description:\n- The deposit amount is missing");
    let writer = Arc::new(RecordingWriter::default());
    let config = config_with(&out, backend, writer);

    let result = analyze(&AnalysisRequest::document(source.display().to_string()), &config)
        .await
        .unwrap();

    assert_eq!(result.format, Some(DocumentFormat::Docx));
    assert_eq!(result.locale, Locale::En);
    assert!(result.stats.extracted_chars >= ENGLISH_CONTRACT.chars().count());
    assert_eq!(
        result.items,
        vec![
            ContentItem::header("Problem Description"),
            ContentItem::bullet("The deposit amount is missing"),
        ]
    );
    assert!(result.pdf_url.is_some());
}

#[tokio::test]
async fn image_source_goes_through_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("scan.png");
    image::RgbImage::new(8, 8).save(&source).unwrap();

    let ocr = Arc::new(StubOcr {
        text: FRENCH_CONTRACT.to_string(),
        calls: AtomicUsize::new(0),
    });
    let writer = Arc::new(RecordingWriter::default());
    let config = AnalysisConfig::builder()
        .artifact_dir(dir.path().join("out"))
        .logo_path(None)
        .rtl_font_url(None)
        .backend(Scripted::answering("Recommandation:\n* Ajouter une clause de résiliation"))
        .report_writer(writer.clone())
        .ocr_engine(ocr.clone())
        .build()
        .unwrap();

    let result = analyze(&AnalysisRequest::image(source.display().to_string()), &config)
        .await
        .unwrap();

    assert_eq!(ocr.calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.format, Some(DocumentFormat::Image));
    assert_eq!(result.locale, Locale::Fr);
    assert_eq!(writer.plans.lock().unwrap()[0].1, "Analyse du Contrat");
    // No public base URL: the reference is the artifact path.
    let reference = result.pdf_url.unwrap();
    assert!(Path::new(&reference).exists());
}

#[tokio::test]
async fn blank_ocr_result_is_an_extraction_failure() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("blank.png");
    image::RgbImage::new(8, 8).save(&source).unwrap();

    let ocr = Arc::new(StubOcr {
        text: "  \n ".to_string(),
        calls: AtomicUsize::new(0),
    });
    let config = AnalysisConfig::builder()
        .artifact_dir(dir.path().join("out"))
        .backend(Arc::new(Unreachable))
        .report_writer(Arc::new(RecordingWriter::default()))
        .ocr_engine(ocr.clone())
        .build()
        .unwrap();

    let err = analyze(&AnalysisRequest::image(source.display().to_string()), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::ExtractionFailed { .. }));
    // Primary pass then the fallback pass.
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn arabic_review_is_laid_out_right_to_left() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Scripted::answering("التوصية:\n- إضافة بند التعويض");
    let writer = Arc::new(RecordingWriter::default());
    let config = config_with(dir.path(), backend.clone(), writer.clone());

    let result = analyze_text(ARABIC_CONTRACT, &config).await.unwrap();

    assert_eq!(result.locale, Locale::Ar);
    assert_eq!(result.items[0], ContentItem::header("التوصية"));
    assert_eq!(result.items[1], ContentItem::bullet("إضافة بند التعويض"));

    let plans = writer.plans.lock().unwrap();
    assert_eq!(plans[0].0, TextDirection::RightToLeft);
    // Painted text is shaped into presentation forms, never the raw letters.
    assert!(plans[0].2.iter().all(|t| !t.contains("التوصية")));
}

#[tokio::test]
async fn timestamped_names_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with(
        dir.path(),
        Scripted::answering("Recommendation:\n- Add a term clause"),
        Arc::new(RecordingWriter::default()),
    );

    let first = analyze_text(ENGLISH_CONTRACT, &config).await.unwrap();
    let second = analyze_text(ENGLISH_CONTRACT, &config).await.unwrap();

    assert_ne!(first.pdf_url, second.pdf_url);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn fixed_name_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalysisConfig::builder()
        .artifact_dir(dir.path())
        .artifact_naming(ArtifactNaming::Fixed("recommendation.pdf".into()))
        .logo_path(None)
        .backend(Scripted::answering("Recommendation:\n- Add a term clause"))
        .report_writer(Arc::new(RecordingWriter::default()))
        .build()
        .unwrap();

    let first = analyze_text(ENGLISH_CONTRACT, &config).await.unwrap();
    let second = analyze_text(ENGLISH_CONTRACT, &config).await.unwrap();

    assert_eq!(first.pdf_url, second.pdf_url);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn progress_callback_sees_every_stage_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("lease.docx");
    write_docx(&source, &[ENGLISH_CONTRACT]);

    let log = Arc::new(StageLog::default());
    let config = AnalysisConfig::builder()
        .artifact_dir(dir.path().join("out"))
        .logo_path(None)
        .backend(Scripted::answering("Recommendation:\n- Add a term clause"))
        .report_writer(Arc::new(RecordingWriter::default()))
        .progress_callback(log.clone())
        .build()
        .unwrap();

    analyze(&AnalysisRequest::document(source.display().to_string()), &config)
        .await
        .unwrap();

    let expected: Vec<String> = [
        Stage::Resolve,
        Stage::Fetch,
        Stage::Extract,
        Stage::DetectLanguage,
        Stage::Analyze,
        Stage::Render,
    ]
    .iter()
    .flat_map(|s| [format!("start:{s}"), format!("done:{s}")])
    .collect();
    assert_eq!(*log.events.lock().unwrap(), expected);
}
