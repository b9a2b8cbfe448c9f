//! Per-page change detection against the previous run's page list.

use crate::page::Page;

/// Decide whether `page` needs its entry regenerated.
///
/// The backup record with the same `path` is removed from `backup`, so each
/// record is matched at most once per pass. Callers must hand in a fresh copy
/// of the backup list for every pass. Records still in `backup` once every page
/// has been checked belong to pages removed since the last run.
pub fn is_changed(page: &Page, backup: &mut Vec<Page>) -> bool {
    let Some(index) = backup.iter().position(|old| old.path == page.path) else {
        return true;
    };

    let old = backup.remove(index);
    configs_differ(page, &old)
}

/// Key count first, then per-key value equality. Values compare structurally.
fn configs_differ(page: &Page, old: &Page) -> bool {
    let config = page.config_entries();
    let old_config = old.config_entries();

    if config.len() != old_config.len() {
        return true;
    }

    config
        .iter()
        .any(|(key, value)| old_config.get(key) != Some(value))
}
