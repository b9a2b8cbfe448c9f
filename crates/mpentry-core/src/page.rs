//! Page records and page list loading.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GenerateError;
use crate::store::Store;

static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([A-Za-z0-9_])").expect("Invalid path segment regex"));

/// One route of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Route path, e.g. `/pages/index/main`
    pub path: String,

    /// Entry file name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Static config inlined into the generated entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,

    /// Fields this tool does not interpret, kept for the backup copy
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Page {
    /// Create a page with no name override and no config.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            config: None,
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = Some(config);
        self
    }

    /// Route path without its leading separator.
    pub fn stripped_path(&self) -> &str {
        self.path.strip_prefix('/').unwrap_or(&self.path)
    }

    /// File name (without extension) of the generated entry.
    ///
    /// An empty `name` counts as absent.
    pub fn file_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => derive_name(self.stripped_path()),
        }
    }

    /// Config keys and values, treating an absent config as empty.
    pub fn config_entries(&self) -> &Map<String, Value> {
        static EMPTY: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);
        self.config.as_ref().unwrap_or(&EMPTY)
    }
}

/// Fold `/x` into `X`: `foo/bar` becomes `fooBar`.
fn derive_name(path: &str) -> String {
    SEGMENT_RE
        .replace_all(path, |caps: &Captures| caps[1].to_uppercase())
        .into_owned()
}

/// Serialization format of a page list file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    Json,
    Yaml,
}

impl PageFormat {
    /// Pick the format from the file extension; anything but `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => PageFormat::Yaml,
            _ => PageFormat::Json,
        }
    }
}

/// Parse a page list from text.
pub fn parse_pages(
    source: &str,
    format: PageFormat,
    path: &Path,
) -> Result<Vec<Page>, GenerateError> {
    match format {
        PageFormat::Json => serde_json::from_str(source).map_err(|e| GenerateError::parse(path, e)),
        PageFormat::Yaml => serde_yaml::from_str(source).map_err(|e| GenerateError::parse(path, e)),
    }
}

/// Load a page list, failing if the file does not exist.
///
/// Always reads from the store, so a second call sees edits made in between.
pub fn load_pages<S: Store>(store: &S, path: &Path) -> Result<Vec<Page>, GenerateError> {
    if !store.exists(path) {
        return Err(GenerateError::MissingFile(path.to_path_buf()));
    }

    let source = store.read(path).map_err(|source| GenerateError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_pages(&source, PageFormat::from_path(path), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn strips_single_leading_separator() {
        assert_eq!(Page::new("/pages/index").stripped_path(), "pages/index");
        assert_eq!(Page::new("pages/index").stripped_path(), "pages/index");
        assert_eq!(Page::new("//odd").stripped_path(), "/odd");
    }

    #[test]
    fn derives_camel_case_file_name() {
        assert_eq!(Page::new("/foo/bar").file_name(), "fooBar");
        assert_eq!(Page::new("/pages/index/main").file_name(), "pagesIndexMain");
        assert_eq!(Page::new("/single").file_name(), "single");
        assert_eq!(Page::new("/foo/_bar/9").file_name(), "foo_bar9");
    }

    #[test]
    fn only_folds_separators_followed_by_word_chars() {
        assert_eq!(Page::new("/foo//bar").file_name(), "foo/Bar");
        assert_eq!(Page::new("/foo/-bar").file_name(), "foo/-bar");
    }

    #[test]
    fn explicit_name_wins_unless_empty() {
        assert_eq!(Page::new("/foo/bar").with_name("home").file_name(), "home");
        assert_eq!(Page::new("/foo/bar").with_name("").file_name(), "fooBar");
    }

    #[test]
    fn parses_json_page_list() {
        let pages = parse_pages(
            r#"[{"path": "/a", "config": {"title": "A"}}, {"path": "/b", "name": "bee"}]"#,
            PageFormat::Json,
            Path::new("pages.json"),
        )
        .unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].config_entries().get("title"), Some(&json!("A")));
        assert_eq!(pages[1].name.as_deref(), Some("bee"));
        assert!(pages[1].config_entries().is_empty());
    }

    #[test]
    fn parses_yaml_page_list() {
        let source = "- path: /a\n  config:\n    title: A\n    tabs: [1, 2]\n- path: /b\n";
        let pages = parse_pages(source, PageFormat::Yaml, Path::new("pages.yaml")).unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].config_entries().get("tabs"), Some(&json!([1, 2])));
        assert_eq!(pages[1].path, "/b");
    }

    #[test]
    fn picks_format_from_extension() {
        assert_eq!(PageFormat::from_path(Path::new("p.yml")), PageFormat::Yaml);
        assert_eq!(PageFormat::from_path(Path::new("p.yaml")), PageFormat::Yaml);
        assert_eq!(PageFormat::from_path(Path::new("p.json")), PageFormat::Json);
        assert_eq!(PageFormat::from_path(Path::new("pages")), PageFormat::Json);
    }

    #[test]
    fn keeps_unknown_fields() {
        let pages = parse_pages(
            r#"[{"path": "/a", "subPackage": true}]"#,
            PageFormat::Json,
            Path::new("pages.json"),
        )
        .unwrap();

        let out = serde_json::to_string(&pages).unwrap();
        assert!(out.contains("\"subPackage\":true"));
    }

    #[test]
    fn rejects_malformed_page_list() {
        let err = parse_pages("{not json", PageFormat::Json, Path::new("pages.json")).unwrap_err();
        assert!(matches!(err, GenerateError::Parse { .. }));
    }

    #[test]
    fn missing_page_list_is_fatal() {
        let store = MemoryStore::new();
        let err = load_pages(&store, Path::new("/src/pages.json")).unwrap_err();
        assert!(matches!(err, GenerateError::MissingFile(_)));
    }

    #[test]
    fn reloads_on_every_call() {
        let store = MemoryStore::new();
        let path = Path::new("/src/pages.json");
        store.insert(path, r#"[{"path": "/a"}]"#);
        assert_eq!(load_pages(&store, path).unwrap().len(), 1);

        store.insert(path, r#"[{"path": "/a"}, {"path": "/b"}]"#);
        assert_eq!(load_pages(&store, path).unwrap().len(), 2);
    }
}
