//! Entry source synthesis from the normalized template.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::GenerateError;
use crate::page::Page;

static APP_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"import App from .*").expect("Invalid app import regex"));

static EXPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export default ?\{(?s:.*)\}").expect("Invalid default export regex")
});

#[derive(Serialize)]
struct EntryExport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<&'a Map<String, Value>>,
}

/// Build the entry source for one page.
///
/// The `import App` line is re-pointed at `<alias>/<page path>` and the
/// default export is replaced by `{ config }`. A template missing either
/// anchor is emitted with that part untouched.
pub fn synthesize(template: &str, page: &Page, alias: &str) -> Result<String, GenerateError> {
    let import = format!("import App from '{}/{}'", alias, page.stripped_path());
    let export = format!("export default {}", export_literal(page)?);

    if !APP_IMPORT_RE.is_match(template) {
        tracing::debug!("Template has no `import App` line; {} keeps it as is", page.path);
    }
    if !EXPORT_RE.is_match(template) {
        tracing::debug!("Template has no default export; {} keeps it as is", page.path);
    }

    let source = APP_IMPORT_RE.replace(template, NoExpand(&import));
    let source = EXPORT_RE.replace(&source, NoExpand(&export));

    Ok(source.into_owned())
}

/// `{ "config": ... }` with two-space indentation, or `{}` without config.
pub fn export_literal(page: &Page) -> Result<String, GenerateError> {
    let export = EntryExport {
        config: page.config.as_ref(),
    };

    serde_json::to_string_pretty(&export).map_err(|e| GenerateError::Serialize {
        what: "page config",
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const TEMPLATE: &str = "import Vue from 'vue'\n\
import App from './App'\n\
\n\
const app = new Vue(App)\n\
app.$mount()\n\
\n\
export default {\n  config: {\n    pages: ['^pages/index/main']\n  }\n}\n";

    fn config(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("config must be an object"),
        }
    }

    #[test]
    fn rewrites_import_and_export() {
        let page = Page::new("/pages/logs/main")
            .with_config(config(json!({"navigationBarTitleText": "Logs"})));

        let expected = "import Vue from 'vue'\n\
import App from '@/pages/logs/main'\n\
\n\
const app = new Vue(App)\n\
app.$mount()\n\
\n\
export default {\n  \"config\": {\n    \"navigationBarTitleText\": \"Logs\"\n  }\n}\n";

        assert_eq!(synthesize(TEMPLATE, &page, "@").unwrap(), expected);
    }

    #[test]
    fn page_without_config_exports_empty_object() {
        let out = synthesize(TEMPLATE, &Page::new("/a"), "@").unwrap();
        assert!(out.ends_with("export default {}\n"));
    }

    #[test]
    fn empty_config_is_kept() {
        let page = Page::new("/a").with_config(Map::new());
        assert_eq!(export_literal(&page).unwrap(), "{\n  \"config\": {}\n}");
    }

    #[test]
    fn uses_configured_alias() {
        let out = synthesize(TEMPLATE, &Page::new("/a/b"), "~src").unwrap();
        assert!(out.contains("import App from '~src/a/b'"));
    }

    #[test]
    fn export_match_runs_to_last_brace() {
        let template = "import App from './App'\nexport default { a: 1 }\nfoo({ b: 2 })\n";
        let out = synthesize(template, &Page::new("/a"), "@").unwrap();
        assert_eq!(out, "import App from '@/a'\nexport default {})\n");
    }

    #[test]
    fn replacement_text_is_literal() {
        let page = Page::new("/a").with_config(config(json!({"title": "$1 and ${0}"})));
        let out = synthesize(TEMPLATE, &page, "@").unwrap();
        assert!(out.contains("\"title\": \"$1 and ${0}\""));
    }

    #[test]
    fn missing_anchors_are_left_alone() {
        let template = "import Vue from 'vue'\nnew Vue({}).$mount()\n";
        let out = synthesize(template, &Page::new("/a"), "@").unwrap();
        assert_eq!(out, template);
    }
}
