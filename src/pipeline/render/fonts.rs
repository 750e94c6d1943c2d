//! Best-effort provisioning of the Arabic-script font.
//!
//! Only the right-to-left path asks for it. A local file wins over the
//! network; any failure is logged and yields `None`, and the writer falls
//! back to its built-in font.

use crate::config::AnalysisConfig;
use crate::pipeline::input::http_client;
use tracing::{debug, info, warn};

/// Load the configured RTL font bytes, or `None` if none can be had.
pub async fn provision_rtl_font(config: &AnalysisConfig) -> Option<Vec<u8>> {
    if let Some(ref path) = config.rtl_font_path {
        match tokio::fs::read(path).await {
            Ok(bytes) if !bytes.is_empty() => {
                debug!("Loaded RTL font from {}", path.display());
                return Some(bytes);
            }
            Ok(_) => warn!("RTL font {} is empty", path.display()),
            Err(e) => warn!("Cannot read RTL font {}: {}", path.display(), e),
        }
    }

    let url = config.rtl_font_url.as_deref()?;
    match fetch_font(url, config.font_timeout_secs).await {
        Ok(bytes) => {
            info!("Fetched RTL font ({} bytes) from {}", bytes.len(), url);
            Some(bytes)
        }
        Err(reason) => {
            warn!("RTL font unavailable, using default font: {}", reason);
            None
        }
    }
}

async fn fetch_font(url: &str, timeout_secs: u64) -> Result<Vec<u8>, String> {
    let client = http_client(timeout_secs).map_err(|e| e.to_string())?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("GET {url}: {e}"))?;
    if !response.status().is_success() {
        return Err(format!("GET {url}: HTTP {}", response.status()));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| format!("GET {url}: {e}"))?;
    if bytes.is_empty() {
        return Err(format!("GET {url}: empty body"));
    }
    Ok(bytes.to_vec())
}
