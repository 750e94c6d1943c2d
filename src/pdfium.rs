//! Binding to the PDFium shared library.
//!
//! PDFium is loaded at runtime, not linked. Search order:
//!
//! 1. the explicit path from [`AnalysisConfig::pdfium_library_path`]
//! 2. `PDFIUM_LIB_PATH` (a file, or a directory holding the platform library)
//! 3. the current directory
//! 4. the system library paths
//!
//! Every call returns a fresh [`Pdfium`] handle; callers use it inside
//! `spawn_blocking` and drop it when done.
//!
//! [`AnalysisConfig::pdfium_library_path`]: crate::config::AnalysisConfig::pdfium_library_path

use crate::error::AnalysisError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bind PDFium, trying each location in turn.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, AnalysisError> {
    let mut attempts: Vec<String> = Vec::new();

    for candidate in candidates(explicit) {
        match Pdfium::bind_to_library(&candidate) {
            Ok(bindings) => {
                debug!("Bound PDFium from {}", candidate.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => attempts.push(format!("{}: {:?}", candidate.display(), e)),
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound system PDFium");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            attempts.push(format!("system: {:?}", e));
            Err(AnalysisError::PdfiumUnavailable(attempts.join("; ")))
        }
    }
}

fn candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Some(p) = explicit {
        out.push(library_file(p));
    }
    if let Ok(env_path) = std::env::var("PDFIUM_LIB_PATH") {
        if !env_path.is_empty() {
            out.push(library_file(Path::new(&env_path)));
        }
    }
    out.push(Pdfium::pdfium_platform_library_name_at_path("./"));
    out
}

/// A directory is expanded to the platform library file inside it.
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}
