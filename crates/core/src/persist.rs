//! JSON file persistence shared by the file-backed stores

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::{Error, Result};

/// Load every record from `path`, or nothing if the file does not exist yet
pub(crate) async fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content)
        .map_err(|e| Error::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Overwrite `path` with the given records
pub(crate) async fn write_records<T: Serialize>(path: &Path, records: &[&T]) -> Result<()> {
    let content = serde_json::to_string_pretty(records)?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(path, content).await?;
    Ok(())
}
