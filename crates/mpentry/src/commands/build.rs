//! One-shot entry generation command.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use mpentry_core::{CommitOutcome, Generator, PassReport};

use crate::config::load_config;

/// Run the build command.
pub async fn run(config_path: &Path, emit: Option<PathBuf>, no_cache: bool) -> Result<()> {
    tracing::info!("Generating entries...");

    let mut settings = load_config(config_path)?;
    if no_cache {
        settings.entry.cache = false;
    }

    let start = Instant::now();
    let report = Generator::new(settings.entry).generate().await?;
    log_report(&report, start.elapsed());

    if let Some(path) = emit {
        fs::write(&path, report.entries.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Entry map: {}", path.display());
    }

    ensure_succeeded(&report)?;

    Ok(())
}

/// Fail when an entry write or the commit step failed.
pub fn ensure_succeeded(report: &PassReport) -> Result<()> {
    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!("{} entry writes failed", failed);
    }
    if let Some(e) = &report.commit_error {
        anyhow::bail!("Entries generated but commit failed: {}", e);
    }
    Ok(())
}

/// Log the outcome of a generation pass.
pub fn log_report(report: &PassReport, elapsed: Duration) {
    tracing::info!(
        "Wrote {} of {} entries in {}ms",
        report.written(),
        report.results.len(),
        elapsed.as_millis()
    );

    if report.removed > 0 {
        tracing::info!("{} pages removed since the last build", report.removed);
    }

    for (key, err) in report.failures() {
        tracing::error!("Failed to write entry for {}: {}", key, err);
    }

    match report.commit {
        CommitOutcome::Disabled => tracing::debug!("Cache disabled; backups skipped"),
        CommitOutcome::Resynced => tracing::info!("Entries up to date; manifest pages resynced"),
        CommitOutcome::Committed => tracing::debug!("Backups updated"),
        CommitOutcome::Blocked { failed } => {
            tracing::warn!("{} writes failed; backups left as they were", failed)
        }
        CommitOutcome::ResyncFailed | CommitOutcome::BackupFailed => {
            if let Some(e) = &report.commit_error {
                tracing::error!("{}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init;
    use tempfile::tempdir;

    #[tokio::test]
    async fn builds_scaffolded_project_and_emits_entry_map() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("mpentry.toml");
        let emit = temp.path().join("entry.json");
        init::run(&config, false).await.unwrap();

        run(&config, Some(emit.clone()), false).await.unwrap();

        let entry = fs::read_to_string(temp.path().join("build/entry/pagesIndexMain.js")).unwrap();
        assert!(entry.contains("import App from '@/pages/index/main'"));
        assert!(entry.contains("\"navigationBarTitleText\": \"Home\""));

        let map: serde_json::Value = serde_json::from_str(&fs::read_to_string(&emit).unwrap()).unwrap();
        assert!(map["app"].as_str().unwrap().ends_with("main.js"));
        assert!(map["pages/logs/main"]
            .as_str()
            .unwrap()
            .ends_with("pagesLogsMain.js"));
    }

    #[tokio::test]
    async fn second_build_resyncs_manifest() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("mpentry.toml");
        init::run(&config, false).await.unwrap();

        run(&config, None, false).await.unwrap();
        run(&config, None, false).await.unwrap();

        let manifest: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(temp.path().join("dist/app.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            manifest["pages"],
            serde_json::json!(["pages/index/main", "pages/logs/main"])
        );
    }

    #[tokio::test]
    async fn missing_manifest_fails_build_but_emits_entry_map() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("mpentry.toml");
        let emit = temp.path().join("entry.json");
        init::run(&config, false).await.unwrap();
        run(&config, None, false).await.unwrap();

        fs::remove_file(temp.path().join("dist/app.json")).unwrap();
        let result = run(&config, Some(emit.clone()), false).await;

        assert!(result.is_err());
        assert!(fs::read_to_string(&emit).unwrap().contains("pages/index/main"));
    }

    #[tokio::test]
    async fn no_cache_build_fails_on_unwritable_entry() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("mpentry.toml");
        init::run(&config, false).await.unwrap();

        // A directory where the entry file should go makes the write fail
        fs::create_dir_all(temp.path().join("build/entry/pagesIndexMain.js")).unwrap();

        assert!(run(&config, None, true).await.is_err());
        assert!(temp.path().join("build/entry/pagesLogsMain.js").is_file());
    }

    #[tokio::test]
    async fn no_cache_build_leaves_no_backups() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("mpentry.toml");
        init::run(&config, false).await.unwrap();

        run(&config, None, true).await.unwrap();

        assert!(temp.path().join("build/entry/pagesLogsMain.js").exists());
        assert!(!temp.path().join(".mpentry/pages.json").exists());
    }
}
