use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

#[derive(Debug)]
struct Entry<V> {
    revision: u64,
    value: Arc<V>,
}

/// Holds the last computed value together with the revision it was computed
/// for. Lookups with the same revision return the same `Arc`.
#[derive(Debug)]
pub struct RevisionCache<V> {
    inner: Mutex<Option<Entry<V>>>,
}

impl<V> RevisionCache<V> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    pub fn get_or_compute(&self, revision: u64, compute: impl FnOnce() -> V) -> Arc<V> {
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = slot.as_ref() {
            if entry.revision == revision {
                debug!(revision, "Cache HIT");
                return Arc::clone(&entry.value);
            }
        }
        debug!(revision, "Cache MISS");
        let value = Arc::new(compute());
        *slot = Some(Entry {
            revision,
            value: Arc::clone(&value),
        });
        value
    }
}

impl<V> Default for RevisionCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
