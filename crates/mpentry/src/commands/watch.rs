//! Watch mode command.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use mpentry_core::Generator;
use mpentry_watch::FileWatcher;

use crate::commands::build::log_report;
use crate::config::load_config;

/// Run the watch command.
///
/// Passes run one at a time: a change arriving mid-pass is handled after the
/// current pass, including its backup commit, has finished.
pub async fn run(config_path: &Path, no_cache: bool) -> Result<()> {
    let mut settings = load_config(config_path)?;
    if no_cache {
        settings.entry.cache = false;
    }

    let generator = Generator::new(settings.entry);

    let start = Instant::now();
    let report = generator.generate().await?;
    log_report(&report, start.elapsed());

    let files = [
        generator.config().pages.clone(),
        generator.config().template.clone(),
    ];
    let (_watcher, mut changes) = FileWatcher::new(&files, settings.debounce)?;

    tracing::info!(
        "Watching {} and {} for changes",
        files[0].display(),
        files[1].display()
    );

    loop {
        tokio::select! {
            changed = changes.recv() => {
                let Some(path) = changed else {
                    tracing::warn!("File watcher stopped");
                    break;
                };
                tracing::info!("{} changed, regenerating...", path.display());
                run_pass(&generator).await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watch");
                break;
            }
        }
    }

    Ok(())
}

/// Run a pass, logging rather than propagating failures.
async fn run_pass(generator: &Generator) {
    let start = Instant::now();
    match generator.generate().await {
        Ok(report) => log_report(&report, start.elapsed()),
        Err(e) => tracing::error!("Generation failed: {}", e),
    }
}
