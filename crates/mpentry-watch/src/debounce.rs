//! Per-key debounce timers.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet period after the last change before a key fires.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(50);

/// Emits a key once no `touch` for it has happened for `window`.
///
/// Every `touch` cancels the key's pending timer and starts a new one, so
/// timers are reset rather than stacked. Keys are independent. Must be used
/// inside a tokio runtime.
pub struct Debouncer<K> {
    window: Duration,
    timers: HashMap<K, JoinHandle<()>>,
    tx: mpsc::UnboundedSender<K>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    /// Create a debouncer and the channel its keys fire on.
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<K>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            window,
            timers: HashMap::new(),
            tx,
        };
        (debouncer, rx)
    }

    /// Record a change for `key`, restarting its timer.
    pub fn touch(&mut self, key: K) {
        if let Some(timer) = self.timers.remove(&key) {
            timer.abort();
        }

        let tx = self.tx.clone();
        let window = self.window;
        let fired = key.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _ = tx.send(fired);
        });

        self.timers.insert(key, timer);
    }

    /// Number of keys with a timer still running.
    pub fn pending(&self) -> usize {
        self.timers.values().filter(|t| !t.is_finished()).count()
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        for timer in self.timers.values() {
            timer.abort();
        }
    }
}
