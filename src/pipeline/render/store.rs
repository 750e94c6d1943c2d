//! Artifact store: persists the rendered review and hands back a reference.
//!
//! Writes go to a uniquely named temporary file in the target directory and
//! are renamed into place, so a reader never sees a partial PDF even with
//! [`ArtifactNaming::Fixed`].

use crate::config::{AnalysisConfig, ArtifactNaming};
use crate::error::AnalysisError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// A persisted review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredArtifact {
    pub path: PathBuf,
    /// What the caller gets back: a URL under `public_base_url`, else the path.
    pub reference: String,
}

/// File name for the next artifact under `naming`.
pub fn artifact_file_name(naming: &ArtifactNaming) -> String {
    match naming {
        ArtifactNaming::Fixed(name) => name.clone(),
        ArtifactNaming::Timestamped => format!(
            "recommendation-{}-{}.pdf",
            chrono::Utc::now().format("%Y%m%dT%H%M%S%3f"),
            Uuid::new_v4().simple()
        ),
    }
}

/// Write `bytes` into the artifact directory.
pub async fn store_artifact(
    bytes: &[u8],
    config: &AnalysisConfig,
) -> Result<StoredArtifact, AnalysisError> {
    let dir = &config.artifact_dir;
    let name = artifact_file_name(&config.artifact_naming);
    let path = dir.join(&name);

    let write_err = |source: std::io::Error| AnalysisError::ArtifactWriteFailed {
        path: path.clone(),
        source,
    };

    tokio::fs::create_dir_all(dir).await.map_err(write_err)?;

    let tmp_path = dir.join(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()));
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    let reference = reference_for(&path, &name, config.public_base_url.as_deref());
    info!("Stored review ({} bytes) at {}", bytes.len(), path.display());
    Ok(StoredArtifact { path, reference })
}

fn reference_for(path: &Path, name: &str, base_url: Option<&str>) -> String {
    match base_url {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), name),
        None => path.display().to_string(),
    }
}
