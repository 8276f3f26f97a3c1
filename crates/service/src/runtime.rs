//! Runtime environment helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;
use tracing::warn;

/// Ensure the directory holding the profile file exists; warn when the UI assets are missing.
pub async fn ensure_env(web_dir: &str, profiles_path: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(web_dir).await.is_err() {
        warn!(%web_dir, "web assets directory not found; /web/ requests will 404");
    }
    if let Some(data_dir) = Path::new(profiles_path).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_data_dir_for_profiles_file() -> Result<(), anyhow::Error> {
        let root = std::env::temp_dir().join(format!("svc_runtime_{}", uuid::Uuid::new_v4()));
        let profiles = root.join("data").join("profiles.json");
        let profiles = profiles.to_string_lossy().into_owned();

        ensure_env("/nonexistent-web-dir", &profiles).await?;
        assert!(root.join("data").is_dir());
        assert!(!root.join("data").join("profiles.json").exists());

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
