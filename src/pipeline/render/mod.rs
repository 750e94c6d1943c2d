//! Localized renderer: parsed items → review PDF → stored artifact.
//!
//! ```text
//! items ──▶ layout (shape + wrap + reorder) ──▶ writer (PDFium) ──▶ store
//!              ▲                                   ▲
//!            logo (optional)                 RTL font (optional)
//! ```
//!
//! Missing optional assets never fail a render: a logo that is absent or
//! undecodable is left out, and a missing Arabic-script font falls back to
//! the writer's built-in font.

pub mod fonts;
pub mod layout;
pub mod shaping;
pub mod store;
pub mod writer;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::locale::LocaleProfile;
use crate::output::ContentItem;
use image::DynamicImage;
use layout::{layout_report, RenderPlan};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use store::StoredArtifact;
pub use writer::PdfiumWriter;

/// Turns a laid-out plan into document bytes.
///
/// Blocking; called under `spawn_blocking`. `rtl_font` is TrueType data
/// for right-to-left plans, when one could be provisioned.
pub trait ReportWriter: Send + Sync {
    fn write(&self, plan: &RenderPlan, rtl_font: Option<&[u8]>) -> Result<Vec<u8>, AnalysisError>;
}

/// Render `items` under `profile` and persist the result.
pub async fn render_report(
    items: &[ContentItem],
    profile: &LocaleProfile,
    config: &AnalysisConfig,
) -> Result<StoredArtifact, AnalysisError> {
    let logo = match config.logo_path {
        Some(ref path) => load_logo(path).await,
        None => None,
    };

    let plan = layout_report(items, profile, logo);
    debug!(
        "Laid out {} items on {} page(s), direction {:?}",
        items.len(),
        plan.pages.len(),
        plan.direction
    );

    let font = if plan.direction.is_rtl() {
        fonts::provision_rtl_font(config).await
    } else {
        None
    };

    let writer: Arc<dyn ReportWriter> = match config.report_writer {
        Some(ref w) => Arc::clone(w),
        None => Arc::new(PdfiumWriter::new(config.pdfium_library_path.clone())),
    };

    let bytes = tokio::task::spawn_blocking(move || writer.write(&plan, font.as_deref()))
        .await
        .map_err(|e| AnalysisError::Internal(format!("Render task panicked: {}", e)))??;

    let artifact = store::store_artifact(&bytes, config).await?;
    info!("Rendered {} review → {}", profile.locale, artifact.reference);
    Ok(artifact)
}

async fn load_logo(path: &Path) -> Option<DynamicImage> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) => {
            debug!("No logo at {}: {}", path.display(), e);
            return None;
        }
    };
    match image::load_from_memory(&bytes) {
        Ok(img) => Some(img),
        Err(e) => {
            warn!("Logo {} could not be decoded, omitting it: {}", path.display(), e);
            None
        }
    }
}
