//! Incremental entry-file generation for multi-page front-end apps.
//!
//! Turns a page list and a shared bootstrap template into one entry file per
//! page, rewriting only the entries whose page config or template changed
//! since the last cached run.

pub mod detect;
pub mod error;
pub mod generator;
pub mod manifest;
pub mod page;
pub mod store;
pub mod synth;
pub mod template;

pub use detect::is_changed;
pub use error::GenerateError;
pub use generator::{
    CommitOutcome, EntryConfig, EntryMap, EntryOutcome, Generator, PageResult, PassReport,
    MANIFEST_FILE,
};
pub use manifest::resync_manifest;
pub use page::{load_pages, parse_pages, Page, PageFormat};
pub use store::{FsStore, Store};
#[cfg(any(test, feature = "testing"))]
pub use store::MemoryStore;
pub use synth::synthesize;
pub use template::normalize;
