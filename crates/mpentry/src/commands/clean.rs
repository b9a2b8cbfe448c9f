//! Cache and generated entry cleanup.

use std::path::Path;

use anyhow::{Context, Result};
use mpentry_core::{EntryConfig, FsStore, Store};
use walkdir::WalkDir;

use crate::config::load_config;

/// Run the clean command.
pub async fn run(config_path: &Path, entries: bool) -> Result<()> {
    let settings = load_config(config_path)?;
    let removed = clean(&FsStore::new(), &settings.entry, entries)?;

    tracing::info!("Removed {} files", removed);

    Ok(())
}

/// Remove backups, and generated `.js` entries when `entries` is set.
fn clean<S: Store>(store: &S, config: &EntryConfig, entries: bool) -> Result<usize> {
    let mut removed = 0;

    for path in [&config.bak_pages, &config.bak_template] {
        if store.exists(path) {
            store
                .remove(path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            tracing::debug!("Removed {}", path.display());
            removed += 1;
        }
    }

    if entries && config.entry.is_dir() {
        for entry in WalkDir::new(&config.entry)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !entry.file_type().is_file() || ext != "js" {
                continue;
            }

            store
                .remove(path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            tracing::debug!("Removed {}", path.display());
            removed += 1;
        }
    }

    Ok(removed)
}
