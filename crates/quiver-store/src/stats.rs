//! Label statistics for cost estimation
//!
//! The planner consults per-label row counts and property histograms when
//! ordering joins. Statistics live in a process-wide cache that is read on
//! every compilation: readers take an `Arc` snapshot, refresh builds a new
//! map and swaps it in, so reads never block on a refresh in progress.

use crate::adapter::StorageAdapter;
use quiver_core::{Label, PropertyValue, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Frequency histogram for one property of one label
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyHistogram {
    /// Total values observed (one per node carrying the property)
    pub total: u64,

    /// Occurrences per canonical value rendering
    pub counts: HashMap<String, u64>,
}

impl PropertyHistogram {
    /// Record one value observation
    pub fn record(&mut self, value: &PropertyValue) {
        self.total += 1;
        *self.counts.entry(canonical(value)).or_insert(0) += 1;
    }

    /// Forget one value observation
    pub fn forget(&mut self, value: &PropertyValue) {
        let key = canonical(value);
        if let Some(count) = self.counts.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&key);
            }
            self.total = self.total.saturating_sub(1);
        }
    }

    /// Number of distinct values
    pub fn distinct(&self) -> u64 {
        self.counts.len() as u64
    }

    /// Estimated fraction of rows matching `value` exactly
    pub fn equality_selectivity(&self, value: &PropertyValue) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        match self.counts.get(&canonical(value)) {
            Some(count) => *count as f64 / self.total as f64,
            // Unseen value: assume one more distinct value would exist
            None => 1.0 / (self.distinct() + 1) as f64,
        }
    }
}

/// Canonical rendering used as a histogram bucket key. Kind-prefixed so that
/// the string "1" and the integer 1 land in different buckets.
fn canonical(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Null => "n:".to_string(),
        PropertyValue::Boolean(b) => format!("b:{b}"),
        PropertyValue::Integer(i) => format!("i:{i}"),
        PropertyValue::Float(f) => format!("f:{}", f.to_bits()),
        PropertyValue::String(s) => format!("s:{s}"),
    }
}

/// Statistics for one label
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelStatistics {
    /// Number of nodes (or edges) carrying the label
    pub count: u64,

    /// Per-property frequency histograms
    pub histograms: HashMap<String, PropertyHistogram>,
}

impl LabelStatistics {
    /// Histogram for a property, if one was collected
    pub fn histogram(&self, property: &str) -> Option<&PropertyHistogram> {
        self.histograms.get(property)
    }
}

/// Immutable snapshot of every label's statistics
pub type StatsSnapshot = Arc<HashMap<Label, LabelStatistics>>;

/// Process-wide, read-mostly statistics cache
///
/// Safe to share across concurrent query compilations. Reads clone the
/// current snapshot; `refresh` rebuilds from the adapter and swaps.
#[derive(Debug, Default)]
pub struct StatisticsCache {
    current: RwLock<StatsSnapshot>,
}

impl StatisticsCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot; never blocks on a refresh building the next one
    pub fn snapshot(&self) -> StatsSnapshot {
        self.current
            .read()
            .map(|guard| Arc::clone(&guard))
            .unwrap_or_default()
    }

    /// Rebuild the snapshot from the adapter and swap it in
    pub fn refresh(&self, adapter: &dyn StorageAdapter) -> Result<()> {
        let mut next = HashMap::new();
        for label in adapter.labels()? {
            if let Some(stats) = adapter.label_statistics(&label)? {
                next.insert(label, stats);
            }
        }
        debug!(labels = next.len(), "refreshed statistics cache");
        let next = Arc::new(next);
        if let Ok(mut guard) = self.current.write() {
            *guard = next;
        }
        Ok(())
    }
}
