use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, Once, PoisonError};
use std::time::Duration;

use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

/// A string set that forgets its content every `ttl`.
///
/// The reset runs on a background task spawned at construction, so a set must be created
/// inside a Tokio runtime. A zero `ttl` disables the reset. After [`TtlSet::shutdown`] the
/// content is kept forever.
pub struct TtlSet {
    entries: Arc<Mutex<HashSet<String>>>,
    cancellation_token: CancellationToken,
    close: Once,
}

impl TtlSet {
    pub fn new(ttl: Duration) -> Self {
        let set = Self {
            entries: Arc::new(Mutex::new(HashSet::new())),
            cancellation_token: CancellationToken::new(),
            close: Once::new(),
        };
        if !ttl.is_zero() {
            set.start_reset(ttl);
        }
        set
    }

    /// Adds `key` to the set. Returns `false` when it was already present.
    pub fn add(&self, key: String) -> bool {
        lock(&self.entries).insert(key)
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries).contains(key)
    }

    pub fn shutdown(&self) {
        self.close.call_once(|| self.cancellation_token.cancel());
    }

    fn start_reset(&self, ttl: Duration) {
        let entries = Arc::clone(&self.entries);
        let token = self.cancellation_token.clone();

        tokio::spawn(async move {
            let mut int = interval_at(Instant::now() + ttl, ttl);
            loop {
                tokio::select! {
                    _ = int.tick() => lock(&entries).clear(),
                    _ = token.cancelled() => break
                }
            }
        });
    }
}

impl Drop for TtlSet {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock(entries: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}
