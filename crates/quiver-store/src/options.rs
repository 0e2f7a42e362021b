//! Store configuration options

use std::collections::HashMap;

/// Options for configuring a store
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Outgoing-edge count per (node, label) above which adjacency entries
    /// spill into overflow pages
    pub spill_threshold: usize,

    /// Number of adjacency entries per spill page
    pub spill_page_size: usize,

    /// Store a mirrored adjacency entry at each edge's sink for O(1)
    /// reverse traversal
    pub mirror_reverse_edges: bool,

    /// Partition properties per node label, in key order
    pub partition_properties: HashMap<String, Vec<String>>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            spill_threshold: 1024,
            spill_page_size: 256,
            mirror_reverse_edges: true,
            partition_properties: HashMap::new(),
        }
    }
}

impl StoreOptions {
    /// Options with tiny spill sizes so tests cross the threshold quickly
    pub fn for_testing() -> Self {
        Self {
            spill_threshold: 4,
            spill_page_size: 2,
            ..Default::default()
        }
    }

    /// Set the partition properties for a label
    pub fn with_partition_properties<L, I, S>(mut self, label: L, properties: I) -> Self
    where
        L: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partition_properties
            .insert(label.into(), properties.into_iter().map(Into::into).collect());
        self
    }

    /// Disable reverse-edge mirrors
    pub fn without_reverse_mirrors(mut self) -> Self {
        self.mirror_reverse_edges = false;
        self
    }
}
