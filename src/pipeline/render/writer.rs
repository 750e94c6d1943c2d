//! Paints a [`RenderPlan`] into PDF bytes with PDFium.

use super::layout::{DrawOp, FontRole, RenderPlan, Rgb};
use super::shaping::contains_arabic;
use super::ReportWriter;
use crate::error::AnalysisError;
use crate::pdfium::bind_pdfium;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, warn};

/// [`ReportWriter`] backed by a runtime-bound PDFium library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumWriter {
    library_path: Option<PathBuf>,
}

impl PdfiumWriter {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }
}

fn render_err(e: PdfiumError) -> AnalysisError {
    AnalysisError::RenderFailed {
        detail: format!("{:?}", e),
    }
}

fn color(c: Rgb) -> PdfColor {
    PdfColor::new(c.0, c.1, c.2, 255)
}

impl ReportWriter for PdfiumWriter {
    fn write(&self, plan: &RenderPlan, rtl_font: Option<&[u8]>) -> Result<Vec<u8>, AnalysisError> {
        let pdfium = bind_pdfium(self.library_path.as_deref())?;
        let mut document = pdfium.create_new_pdf().map_err(render_err)?;

        let helvetica = document.fonts_mut().helvetica();
        let helvetica_bold = document.fonts_mut().helvetica_bold();

        // Lines with Arabic script use the loaded font in both roles; it has
        // no bold face. Latin-only lines keep Helvetica.
        let arabic_font = match (plan.direction.is_rtl(), rtl_font) {
            (true, Some(bytes)) => match document.fonts_mut().load_true_type_from_bytes(bytes, true) {
                Ok(font) => Some(font),
                Err(e) => {
                    warn!("Cannot load RTL font, using Helvetica: {:?}", e);
                    None
                }
            },
            (true, None) => {
                warn!("No RTL font available, using Helvetica");
                None
            }
            (false, _) => None,
        };

        for (index, page_plan) in plan.pages.iter().enumerate() {
            let mut page = document
                .pages_mut()
                .create_page_at_end(PdfPagePaperSize::Custom(
                    PdfPoints::new(plan.width),
                    PdfPoints::new(plan.height),
                ))
                .map_err(render_err)?;

            for op in &page_plan.ops {
                match op {
                    DrawOp::Rect {
                        left,
                        bottom,
                        width,
                        height,
                        fill,
                        stroke,
                    } => {
                        page.objects_mut()
                            .create_path_object_rect(
                                PdfRect::new_from_values(*bottom, *left, bottom + height, left + width),
                                stroke.map(color),
                                stroke.map(|_| PdfPoints::new(1.0)),
                                fill.map(color),
                            )
                            .map_err(render_err)?;
                    }
                    DrawOp::Text {
                        x,
                        y,
                        text,
                        size,
                        role,
                        color: rgb,
                    } => {
                        let font = match (arabic_font, role) {
                            (Some(font), _) if contains_arabic(text) => font,
                            (_, FontRole::Body) => helvetica,
                            (_, FontRole::Heading) => helvetica_bold,
                        };
                        let mut object = page
                            .objects_mut()
                            .create_text_object(
                                PdfPoints::new(*x),
                                PdfPoints::new(*y),
                                text,
                                font,
                                PdfPoints::new(*size),
                            )
                            .map_err(render_err)?;
                        object.set_fill_color(color(*rgb)).map_err(render_err)?;
                    }
                    DrawOp::Logo {
                        x,
                        y,
                        width,
                        height,
                    } => {
                        if let Some(ref image) = plan.logo {
                            page.objects_mut()
                                .create_image_object(
                                    PdfPoints::new(*x),
                                    PdfPoints::new(*y),
                                    image,
                                    Some(PdfPoints::new(*width)),
                                    Some(PdfPoints::new(*height)),
                                )
                                .map_err(render_err)?;
                        }
                    }
                }
            }
            debug!("Painted page {} ({} ops)", index + 1, page_plan.ops.len());
        }

        document.save_to_bytes().map_err(render_err)
    }
}
