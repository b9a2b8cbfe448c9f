//! Storage backends for page lists, templates, backups and generated entries.

use std::fs;
use std::future::Future;
use std::io;
use std::path::Path;

/// Narrow file interface used by the generator.
///
/// Reads are blocking since inputs are loaded before any entry is written.
/// Writes are async so a pass can issue every entry write at once.
pub trait Store: Send + Sync {
    /// Read a whole file as UTF-8.
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Whether a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Write `contents` to `path`, creating parent directories as needed.
    fn write(&self, path: &Path, contents: String) -> impl Future<Output = io::Result<()>> + Send;

    /// Delete the file at `path`.
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Store backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

impl Store for FsStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    async fn write(&self, path: &Path, contents: String) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, contents).await
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryStore;

#[cfg(any(test, feature = "testing"))]
mod memory {
    use std::collections::{HashMap, HashSet};
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, MutexGuard};

    use super::Store;

    #[derive(Debug, Default)]
    struct MemoryState {
        files: HashMap<PathBuf, String>,
        writes: HashMap<PathBuf, usize>,
        failing: HashSet<PathBuf>,
    }

    /// In-memory store that counts writes and can reject writes to chosen paths.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        state: Mutex<MemoryState>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        fn state(&self) -> MutexGuard<'_, MemoryState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        /// Seed a file without counting it as a write.
        pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
            self.state().files.insert(path.into(), contents.into());
        }

        /// Current contents of a file.
        pub fn get(&self, path: &Path) -> Option<String> {
            self.state().files.get(path).cloned()
        }

        /// Number of completed writes to `path`.
        pub fn write_count(&self, path: &Path) -> usize {
            self.state().writes.get(path).copied().unwrap_or(0)
        }

        /// Number of completed writes across all paths.
        pub fn total_writes(&self) -> usize {
            self.state().writes.values().sum()
        }

        /// Forget recorded write counts, keeping file contents.
        pub fn reset_counts(&self) {
            self.state().writes.clear();
        }

        /// Make every later write to `path` fail.
        pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
            self.state().failing.insert(path.into());
        }
    }

    impl Store for MemoryStore {
        fn read(&self, path: &Path) -> io::Result<String> {
            self.state().files.get(path).cloned().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display()))
            })
        }

        fn exists(&self, path: &Path) -> bool {
            self.state().files.contains_key(path)
        }

        async fn write(&self, path: &Path, contents: String) -> io::Result<()> {
            let mut state = self.state();
            if state.failing.contains(path) {
                return Err(io::Error::other(format!(
                    "write rejected: {}",
                    path.display()
                )));
            }
            state.files.insert(path.to_path_buf(), contents);
            *state.writes.entry(path.to_path_buf()).or_default() += 1;
            Ok(())
        }

        fn remove(&self, path: &Path) -> io::Result<()> {
            self.state()
                .files
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display())))
        }
    }
}
