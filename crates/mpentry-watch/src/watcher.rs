//! File watching for watch mode.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::debounce::Debouncer;

/// Errors that can occur while setting up a watch.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Watched file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to start file watcher: {0}")]
    Init(String),

    #[error("Failed to watch {}: {message}", path.display())]
    Watch { path: PathBuf, message: String },
}

/// Watches individual files and reports each one after it settles.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    forward: JoinHandle<()>,
}

impl FileWatcher {
    /// Watch `files`, debouncing each with its own `window` timer.
    ///
    /// Returns the watcher and a channel yielding the (canonical) path of a
    /// file once it has been quiet for `window`. Parent directories are
    /// watched so files replaced by rename keep being tracked. Must be called
    /// inside a tokio runtime.
    pub fn new(
        files: &[PathBuf],
        window: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PathBuf>), WatchError> {
        let watched = files
            .iter()
            .map(|file| {
                file.canonicalize()
                    .map_err(|_| WatchError::MissingFile(file.clone()))
            })
            .collect::<Result<HashSet<_>, _>>()?;

        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<notify::Event>();
        let (mut debouncer, changes) = Debouncer::new(window);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    let _ = raw_tx.send(event);
                }
                Err(e) => tracing::warn!("File watch error: {}", e),
            }
        })
        .map_err(|e| WatchError::Init(e.to_string()))?;

        let mut dirs = HashSet::new();
        for file in &watched {
            let dir = file.parent().unwrap_or(Path::new("/")).to_path_buf();
            if dirs.insert(dir.clone()) {
                watcher
                    .watch(&dir, RecursiveMode::NonRecursive)
                    .map_err(|e| WatchError::Watch {
                        path: dir,
                        message: e.to_string(),
                    })?;
            }
        }

        let forward = tokio::spawn(async move {
            while let Some(event) = raw_rx.recv().await {
                if !is_change(&event.kind) {
                    continue;
                }
                for path in event.paths {
                    if watched.contains(&path) {
                        tracing::debug!("Change detected: {}", path.display());
                        debouncer.touch(path);
                    }
                }
            }
        });

        Ok((
            Self {
                _watcher: watcher,
                forward,
            },
            changes,
        ))
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.forward.abort();
    }
}

/// Content or existence changes; access events are ignored.
fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
