//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Warn when the static asset directory is missing and create the parent
/// directory of the data file, if any.
pub async fn ensure_env(static_dir: Option<&Path>, data_file: Option<&Path>) -> anyhow::Result<()> {
    if let Some(dir) = static_dir {
        if tokio::fs::metadata(dir).await.is_err() {
            warn!(static_dir = %dir.display(), "static assets directory not found; frontend requests may 404");
        }
    }
    if let Some(parent) = data_file.and_then(Path::parent).filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    }
    Ok(())
}
