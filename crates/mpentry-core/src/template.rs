//! Shared bootstrap template loading and normalization.
//!
//! The raw template is the app's own bootstrap file. Before it can serve as a
//! per-page entry, the build-type marker line and every global mixin
//! registration (with the import that brought the mixin in) are removed.

use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::GenerateError;
use crate::store::Store;

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n*.*mpType.*\n*").expect("Invalid marker regex"));

static MIXIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n*Vue\.mixin(?:\(\s*([A-Za-z_$][A-Za-z0-9_$]*)?)?.*\n*")
        .expect("Invalid mixin regex")
});

/// Identifier used to look up a mixin's import when the call has none.
const NULL_IDENT: &str = "null";

/// Normalize a raw bootstrap template.
///
/// Every removed statement collapses into exactly two newlines.
pub fn normalize(raw: &str) -> String {
    let mut template = MARKER_RE.replace(raw, "\n\n").into_owned();

    while let Some((span, ident)) = next_mixin(&template) {
        template.replace_range(span, "\n\n");
        template = strip_import(&template, &ident);
    }

    template
}

/// Span of the first mixin registration and the mixin's identifier.
fn next_mixin(template: &str) -> Option<(Range<usize>, String)> {
    let caps = MIXIN_RE.captures(template)?;
    let span = caps.get(0)?.range();
    let ident = caps
        .get(1)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(NULL_IDENT);

    Some((span, ident.to_string()))
}

/// Drop the first import statement mentioning `ident` right after `import `.
///
/// The match is by prefix: for `a`, an earlier `import axios ...` line is
/// removed instead of `import a ...`.
fn strip_import(template: &str, ident: &str) -> String {
    let pattern = format!(r"\n*import {}.*\n*", regex::escape(ident));
    match Regex::new(&pattern) {
        Ok(re) => re.replace(template, "\n\n").into_owned(),
        Err(e) => {
            tracing::debug!("Skipping import removal for {}: {}", ident, e);
            template.to_string()
        }
    }
}

/// Load and normalize the template; it must exist.
pub fn load_template<S: Store>(store: &S, path: &Path) -> Result<String, GenerateError> {
    if !store.exists(path) {
        return Err(GenerateError::MissingFile(path.to_path_buf()));
    }

    let raw = store.read(path).map_err(|source| GenerateError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(normalize(&raw))
}

/// Load the previous run's normalized template, or an empty string.
pub fn load_backup_template<S: Store>(store: &S, path: &Path) -> Result<String, GenerateError> {
    if !store.exists(path) {
        return Ok(String::new());
    }

    store.read(path).map_err(|source| GenerateError::Read {
        path: path.to_path_buf(),
        source,
    })
}
