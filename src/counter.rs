//! Observability hook counting the fields which were extracted.
use indexmap::IndexMap;
use parking_lot::Mutex;

/// Receives one increment per accepted cluster, keyed by its stripped label.
pub trait Counter: Send + Sync {
    fn increment(&self, label: &str);
}

/// Discards all increments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCounter;

impl Counter for NoCounter {
    fn increment(&self, _label: &str) {}
}

/// Counts labels in memory, in order of first occurence.
#[derive(Debug, Default)]
pub struct LabelCounts {
    counts: Mutex<IndexMap<String, usize>>,
}

impl LabelCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> usize {
        self.counts.lock().get(label).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> IndexMap<String, usize> {
        self.counts.lock().clone()
    }
}

impl Counter for LabelCounts {
    fn increment(&self, label: &str) {
        let mut counts = self.counts.lock();
        match counts.get_mut(label) {
            Some(count) => *count += 1,
            None => {
                counts.insert(label.to_string(), 1);
            }
        }
    }
}
