//! Initialize entry generation in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::{load_config, DEFAULT_CONFIG};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing mpentry...");

    write_scaffold(config_path, DEFAULT_CONFIG, yes)?;

    let settings = load_config(config_path)?;
    let entry = &settings.entry;

    write_scaffold(&entry.pages, DEFAULT_PAGES, yes)?;
    write_scaffold(&entry.template, DEFAULT_TEMPLATE, yes)?;
    write_scaffold(&entry.manifest_path(), DEFAULT_MANIFEST, yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'mpentry build' to generate entries.");

    Ok(())
}

/// Write `contents` to `path` unless it exists and `overwrite` is false.
fn write_scaffold(path: &Path, contents: &str, overwrite: bool) -> Result<bool> {
    if path.exists() && !overwrite {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            path.display()
        );
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Created {}", path.display());

    Ok(true)
}

const DEFAULT_PAGES: &str = r#"[
  {
    "path": "/pages/index/main",
    "config": {
      "navigationBarTitleText": "Home"
    }
  },
  {
    "path": "/pages/logs/main",
    "config": {
      "navigationBarTitleText": "Logs"
    }
  }
]
"#;

const DEFAULT_TEMPLATE: &str = r#"import Vue from 'vue'
import App from './App'

Vue.config.productionTip = false
App.mpType = 'app'

const app = new Vue(App)
app.$mount()

export default {
  config: {
    pages: [],
    window: {
      navigationBarTitleText: 'App'
    }
  }
}
"#;

const DEFAULT_MANIFEST: &str = r#"{
  "pages": [],
  "window": {
    "navigationBarTitleText": "App"
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use mpentry_core::{normalize, parse_pages, PageFormat};
    use tempfile::tempdir;

    #[tokio::test]
    async fn scaffolds_project() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("mpentry.toml");

        run(&config, false).await.unwrap();

        assert!(config.exists());
        assert!(temp.path().join("src/pages.json").exists());
        assert!(temp.path().join("src/main.js").exists());
        assert!(temp.path().join("dist/app.json").exists());
    }

    #[test]
    fn keeps_existing_files_without_overwrite() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("pages.json");
        fs::write(&path, "[]").unwrap();

        assert!(!write_scaffold(&path, DEFAULT_PAGES, false).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");

        assert!(write_scaffold(&path, DEFAULT_PAGES, true).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_PAGES);
    }

    #[test]
    fn default_scaffold_is_usable() {
        let pages = parse_pages(DEFAULT_PAGES, PageFormat::Json, Path::new("pages.json")).unwrap();
        assert_eq!(pages.len(), 2);

        let template = normalize(DEFAULT_TEMPLATE);
        assert!(!template.contains("mpType"));
        assert!(template.contains("import App from './App'"));

        let manifest: serde_json::Value = serde_json::from_str(DEFAULT_MANIFEST).unwrap();
        assert!(manifest["pages"].is_array());
    }
}
