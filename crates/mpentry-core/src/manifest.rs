//! Keeps the app manifest's page list in step with the page config.

use std::path::Path;

use serde_json::Value;

use crate::error::GenerateError;
use crate::page::load_pages;
use crate::store::Store;

/// Overwrite the manifest's `pages` array with the current page paths.
///
/// Both files are read fresh. Every other manifest field is written back
/// unchanged and in its original order.
pub async fn resync_manifest<S: Store>(
    store: &S,
    manifest_path: &Path,
    pages_path: &Path,
) -> Result<(), GenerateError> {
    if !store.exists(manifest_path) {
        return Err(GenerateError::MissingFile(manifest_path.to_path_buf()));
    }

    let source = store
        .read(manifest_path)
        .map_err(|source| GenerateError::Read {
            path: manifest_path.to_path_buf(),
            source,
        })?;
    let mut manifest: Value =
        serde_json::from_str(&source).map_err(|e| GenerateError::parse(manifest_path, e))?;

    let pages = load_pages(store, pages_path)?;
    let paths = pages
        .iter()
        .map(|page| Value::String(page.stripped_path().to_string()))
        .collect();

    manifest
        .as_object_mut()
        .ok_or_else(|| GenerateError::InvalidManifest(manifest_path.to_path_buf()))?
        .insert("pages".to_string(), Value::Array(paths));

    let json = serde_json::to_string_pretty(&manifest).map_err(|e| GenerateError::Serialize {
        what: "manifest",
        message: e.to_string(),
    })?;

    store
        .write(manifest_path, json)
        .await
        .map_err(|source| GenerateError::Write {
            path: manifest_path.to_path_buf(),
            source,
        })?;

    tracing::debug!(
        "Resynced {} with {} pages",
        manifest_path.display(),
        pages.len()
    );

    Ok(())
}
