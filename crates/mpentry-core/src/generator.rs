//! Generation pass: change detection, entry writes and backup commit.

use std::io;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use indexmap::IndexMap;
use serde::Serialize;

use crate::detect::is_changed;
use crate::error::GenerateError;
use crate::manifest::resync_manifest;
use crate::page::{load_pages, Page};
use crate::store::{FsStore, Store};
use crate::synth::synthesize;
use crate::template::{load_backup_template, load_template};

/// Manifest file name inside the dist directory.
pub const MANIFEST_FILE: &str = "app.json";

/// Paths and switches for a generation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryConfig {
    /// Read and write backups, skipping entries that are up to date
    pub cache: bool,

    /// Shared bootstrap template
    pub template: PathBuf,

    /// Current page list
    pub pages: PathBuf,

    /// Page list backup from the last pass that wrote entries
    pub bak_pages: PathBuf,

    /// Normalized template backup from the last pass that wrote entries
    pub bak_template: PathBuf,

    /// Directory receiving generated entries
    pub entry: PathBuf,

    /// Build output directory holding `app.json`
    pub dist: PathBuf,

    /// Import alias for the source root
    pub alias: String,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            cache: true,
            template: PathBuf::from("src/main.js"),
            pages: PathBuf::from("src/pages.json"),
            bak_pages: PathBuf::from(".mpentry/pages.json"),
            bak_template: PathBuf::from(".mpentry/main.js"),
            entry: PathBuf::from("build/entry"),
            dist: PathBuf::from("dist"),
            alias: "@".to_string(),
        }
    }
}

impl EntryConfig {
    /// Location of the app manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.dist.join(MANIFEST_FILE)
    }

    /// Location of a page's generated entry.
    pub fn entry_path(&self, page: &Page) -> PathBuf {
        self.entry.join(format!("{}.js", page.file_name()))
    }
}

/// Bundler entries: `app` first, then one entry per page in page order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryMap {
    app: PathBuf,

    #[serde(flatten)]
    pages: IndexMap<String, PathBuf>,
}

impl EntryMap {
    fn new(app: PathBuf) -> Self {
        Self {
            app,
            pages: IndexMap::new(),
        }
    }

    /// Path under the `app` key: the template unless a page is keyed `app`.
    pub fn app(&self) -> &Path {
        &self.app
    }

    /// Add a page entry. A page keyed `app` takes over the template's slot.
    fn insert(&mut self, key: String, entry_path: PathBuf) {
        if key == "app" {
            tracing::warn!(
                "Page `app` replaces the template under the `app` entry key"
            );
            self.app = entry_path;
            return;
        }
        self.pages.insert(key, entry_path);
    }

    /// Entry path for a stripped page path, or the `app` entry.
    pub fn get(&self, key: &str) -> Option<&Path> {
        if key == "app" {
            return Some(&self.app);
        }
        self.pages.get(key).map(PathBuf::as_path)
    }

    /// Page entries in page order.
    pub fn pages(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.pages.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    /// Number of distinct keys including `app`.
    pub fn len(&self) -> usize {
        self.pages.len() + 1
    }

    /// Always false: `app` is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// JSON object suitable for bundler configuration.
    pub fn to_json(&self) -> Result<String, GenerateError> {
        serde_json::to_string_pretty(self).map_err(|e| GenerateError::Serialize {
            what: "entry map",
            message: e.to_string(),
        })
    }
}

/// What happened to one page's entry during a pass.
#[derive(Debug)]
pub enum EntryOutcome {
    /// Entry was regenerated and the write completed
    Written,

    /// Entry was up to date and left alone
    Unchanged,

    /// Entry needed regeneration but the write failed
    Failed(io::Error),
}

/// Outcome for one page.
#[derive(Debug)]
pub struct PageResult {
    /// Stripped page path (entry map key)
    pub key: String,

    /// Generated entry location
    pub entry_path: PathBuf,

    pub outcome: EntryOutcome,
}

/// What the pass did with the manifest and backups after all writes settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Caching is off; nothing was read or written
    Disabled,

    /// No entry changed; the manifest's page list was rewritten
    Resynced,

    /// Entries changed; page list and template were backed up
    Committed,

    /// Some entry writes failed; neither manifest nor backups were touched
    Blocked { failed: usize },

    /// No entry changed but the manifest could not be resynced
    ResyncFailed,

    /// Entries changed but the backups could not be written
    BackupFailed,
}

/// Result of a generation pass.
#[derive(Debug)]
pub struct PassReport {
    pub entries: EntryMap,

    /// Per-page outcomes in page order
    pub results: Vec<PageResult>,

    /// Normalized template differed from its backup
    pub template_changed: bool,

    /// Backup records with no matching page (pages removed since last pass)
    pub removed: usize,

    pub commit: CommitOutcome,

    /// Error behind `ResyncFailed` or `BackupFailed`
    pub commit_error: Option<GenerateError>,
}

impl PassReport {
    /// Number of entries regenerated and written.
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Written))
    }

    /// Number of entries left untouched.
    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Unchanged))
    }

    /// Pages whose entry write failed, with the error.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &io::Error)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            EntryOutcome::Failed(e) => Some((r.key.as_str(), e)),
            _ => None,
        })
    }

    /// Whether failed writes kept the pass from committing.
    pub fn is_blocked(&self) -> bool {
        matches!(self.commit, CommitOutcome::Blocked { .. })
    }

    /// Whether any entry write or the commit step failed.
    pub fn is_failed(&self) -> bool {
        self.failures().next().is_some() || self.commit_error.is_some()
    }

    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Runs generation passes against a store.
pub struct Generator<S = FsStore> {
    config: EntryConfig,
    store: S,
}

impl Generator<FsStore> {
    /// Generator over the local filesystem.
    pub fn new(config: EntryConfig) -> Self {
        Self::with_store(config, FsStore::new())
    }
}

impl<S: Store> Generator<S> {
    pub fn with_store(config: EntryConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &EntryConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one pass.
    ///
    /// Entry writes are issued together and awaited jointly before the
    /// manifest or backups are touched. Load errors abort the pass; failed
    /// entry writes and commit errors are reported in the returned
    /// [`PassReport`] instead, so the entry map is never lost.
    pub async fn generate(&self) -> Result<PassReport, GenerateError> {
        let pages = load_pages(&self.store, &self.config.pages)?;
        let mut backup = self.load_backup_pages()?;

        let template = load_template(&self.store, &self.config.template)?;
        let backup_template = if self.config.cache {
            load_backup_template(&self.store, &self.config.bak_template)?
        } else {
            String::new()
        };
        let template_changed = template != backup_template;

        let mut entries = EntryMap::new(self.config.template.clone());
        let mut writes = Vec::with_capacity(pages.len());

        for page in &pages {
            let key = page.stripped_path().to_string();
            let entry_path = self.config.entry_path(page);
            entries.insert(key.clone(), entry_path.clone());

            let config_changed = is_changed(page, &mut backup);
            let source = if template_changed || config_changed {
                tracing::debug!("Regenerating entry for {}", page.path);
                Some(synthesize(&template, page, &self.config.alias)?)
            } else {
                tracing::debug!("Entry for {} is up to date", page.path);
                None
            };

            writes.push(self.write_entry(key, entry_path, source));
        }

        let results = join_all(writes).await;
        let removed = backup.len();

        let mut report = PassReport {
            entries,
            results,
            template_changed,
            removed,
            commit: CommitOutcome::Disabled,
            commit_error: None,
        };
        let commit = self.commit(&report, &pages, &template).await;
        match commit {
            Ok(commit) => report.commit = commit,
            Err((commit, e)) => {
                tracing::warn!("{}", e);
                report.commit = commit;
                report.commit_error = Some(e);
            }
        }

        Ok(report)
    }

    /// Fresh copy of the backup page list; empty when caching is off or on first run.
    fn load_backup_pages(&self) -> Result<Vec<Page>, GenerateError> {
        if !self.config.cache || !self.store.exists(&self.config.bak_pages) {
            return Ok(Vec::new());
        }
        load_pages(&self.store, &self.config.bak_pages)
    }

    async fn write_entry(&self, key: String, entry_path: PathBuf, source: Option<String>) -> PageResult {
        let outcome = match source {
            None => EntryOutcome::Unchanged,
            Some(source) => match self.store.write(&entry_path, source).await {
                Ok(()) => EntryOutcome::Written,
                Err(e) => {
                    tracing::debug!("Failed to write {}: {}", entry_path.display(), e);
                    EntryOutcome::Failed(e)
                }
            },
        };

        PageResult {
            key,
            entry_path,
            outcome,
        }
    }

    async fn commit(
        &self,
        report: &PassReport,
        pages: &[Page],
        template: &str,
    ) -> Result<CommitOutcome, (CommitOutcome, GenerateError)> {
        let failed = report.failures().count();
        if failed > 0 {
            tracing::warn!("{} entry writes failed; backups not updated", failed);
            return Ok(CommitOutcome::Blocked { failed });
        }

        if !self.config.cache {
            return Ok(CommitOutcome::Disabled);
        }

        if report.written() == 0 {
            return resync_manifest(&self.store, &self.config.manifest_path(), &self.config.pages)
                .await
                .map(|()| CommitOutcome::Resynced)
                .map_err(|e| (CommitOutcome::ResyncFailed, e));
        }

        self.write_backups(pages, template)
            .await
            .map(|()| CommitOutcome::Committed)
            .map_err(|e| (CommitOutcome::BackupFailed, e))
    }

    async fn write_backups(&self, pages: &[Page], template: &str) -> Result<(), GenerateError> {
        let json = serde_json::to_string_pretty(pages).map_err(|e| GenerateError::Serialize {
            what: "page list",
            message: e.to_string(),
        })?;

        let bak_pages = &self.config.bak_pages;
        let bak_template = &self.config.bak_template;
        let (pages_written, template_written) = futures::join!(
            self.store.write(bak_pages, json),
            self.store.write(bak_template, template.to_string()),
        );

        pages_written.map_err(|source| GenerateError::Write {
            path: bak_pages.clone(),
            source,
        })?;
        template_written.map_err(|source| GenerateError::Write {
            path: bak_template.clone(),
            source,
        })?;

        Ok(())
    }
}
