use std::any::Any;
use std::collections::HashMap;

use parking_lot::Mutex;

use super::AggregateOp;

/// Operation signature identifying one memoized value.
///
/// Column keys are kept as separate fields, so keys containing separators never alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum MemoKey {
    /// Aggregate over a sorted, de-duplicated column list.
    Aggregate(AggregateOp, Vec<String>),
    Unique(String),
    Frames(String),
    /// Per-frame join index: `(frame column, primary column)`.
    Join(String, String),
}

/// Write-once-per-key memo table private to one store instance.
///
/// Values are computed outside the lock; if two readers race on a cold key both compute, and the
/// first insert wins. The computation is deterministic so the losing value is identical.
#[derive(Default)]
pub(crate) struct MemoCache {
    entries: Mutex<HashMap<MemoKey, Box<dyn Any + Send + Sync>>>,
}

impl MemoCache {
    pub(crate) fn get_or_insert_with<T, F>(&self, key: MemoKey, compute: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.entries.lock().get(&key).and_then(|v| v.downcast_ref::<T>()) {
            return hit.clone();
        }

        let value = compute();
        tracing::debug!(?key, "memoized derived value");
        let mut entries = self.entries.lock();
        let slot = entries.entry(key).or_insert_with(|| {
            Box::new(value.clone()) as Box<dyn Any + Send + Sync>
        });
        match slot.downcast_ref::<T>() {
            Some(stored) => stored.clone(),
            None => value,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
