//! Debounced file watching for mpentry watch mode.
//!
//! Each watched file has its own quiescence timer, reset on every change, so a
//! burst of writes to one file yields a single notification.

pub mod debounce;
pub mod watcher;

pub use debounce::{Debouncer, DEFAULT_WINDOW};
pub use watcher::{FileWatcher, WatchError};
