//! Configuration file loading (mpentry.toml).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use mpentry_core::EntryConfig;
use mpentry_watch::DEFAULT_WINDOW;
use serde::Deserialize;

/// Configuration file structure (mpentry.toml).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    entry: EntrySection,
    #[serde(default)]
    watch: WatchSection,
}

#[derive(Debug, Deserialize)]
struct EntrySection {
    #[serde(default = "default_cache")]
    cache: bool,
    #[serde(default = "default_template")]
    template: String,
    #[serde(default = "default_pages")]
    pages: String,
    #[serde(default = "default_bak_pages")]
    bak_pages: String,
    #[serde(default = "default_bak_template")]
    bak_template: String,
    #[serde(default = "default_entry")]
    entry: String,
    #[serde(default = "default_dist")]
    dist: String,
    #[serde(default = "default_alias")]
    alias: String,
}

impl Default for EntrySection {
    fn default() -> Self {
        Self {
            cache: default_cache(),
            template: default_template(),
            pages: default_pages(),
            bak_pages: default_bak_pages(),
            bak_template: default_bak_template(),
            entry: default_entry(),
            dist: default_dist(),
            alias: default_alias(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WatchSection {
    #[serde(default = "default_debounce_ms")]
    debounce_ms: u64,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_cache() -> bool {
    true
}
fn default_template() -> String {
    "src/main.js".to_string()
}
fn default_pages() -> String {
    "src/pages.json".to_string()
}
fn default_bak_pages() -> String {
    ".mpentry/pages.json".to_string()
}
fn default_bak_template() -> String {
    ".mpentry/main.js".to_string()
}
fn default_entry() -> String {
    "build/entry".to_string()
}
fn default_dist() -> String {
    "dist".to_string()
}
fn default_alias() -> String {
    "@".to_string()
}
fn default_debounce_ms() -> u64 {
    DEFAULT_WINDOW.as_millis() as u64
}

/// Settings resolved from the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub entry: EntryConfig,
    pub debounce: Duration,
}

/// Load configuration from `path` if it exists, defaults otherwise.
///
/// Relative paths resolve against the directory holding the config file.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<Settings> {
    let file = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        file
    } else {
        ConfigFile::default()
    };

    let base = path.parent().unwrap_or(Path::new(""));
    Ok(resolve(file, base))
}

fn resolve(file: ConfigFile, base: &Path) -> Settings {
    let at = |p: &str| -> PathBuf { base.join(p) };
    let entry = file.entry;

    Settings {
        entry: EntryConfig {
            cache: entry.cache,
            template: at(&entry.template),
            pages: at(&entry.pages),
            bak_pages: at(&entry.bak_pages),
            bak_template: at(&entry.bak_template),
            entry: at(&entry.entry),
            dist: at(&entry.dist),
            alias: entry.alias,
        },
        debounce: Duration::from_millis(file.watch.debounce_ms),
    }
}

/// Default mpentry.toml written by `mpentry init`.
pub const DEFAULT_CONFIG: &str = r#"[entry]
# Skip entries whose page config and template are unchanged since the last build
cache = true
template = "src/main.js"
pages = "src/pages.json"
entry = "build/entry"
dist = "dist"
bak_pages = ".mpentry/pages.json"
bak_template = ".mpentry/main.js"
alias = "@"

[watch]
debounce_ms = 50
"#;
