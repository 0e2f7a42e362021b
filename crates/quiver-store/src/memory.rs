//! In-memory reference adapter
//!
//! Keeps the whole graph in process memory using the same shape a paged
//! backend would: a per-label node index, per-(node, label) adjacency lists
//! that spill into overflow pages past a threshold, and optional reverse
//! mirrors at each edge's sink. Streams returned through the adapter trait
//! are snapshots taken under the read lock, so a running query never observes
//! a half-applied mutation.

use crate::adapter::{
    AdjacencyEntry, AdjacencyStream, NodeStream, PropertyFilter, StorageAdapter,
};
use crate::options::StoreOptions;
use crate::stats::LabelStatistics;
use quiver_core::{
    Direction, Edge, EdgeId, Error, IdGenerator, Label, Node, NodeId, PropertyMap, Result,
};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// One adjacency slot: the edge and the node it points at
#[derive(Debug, Clone, Copy, PartialEq)]
struct AdjSlot {
    edge: EdgeId,
    target: NodeId,
}

/// Adjacency list for one (node, label) pair: an inline prefix plus overflow
/// pages once the inline portion is full
#[derive(Debug, Default)]
struct AdjacencyList {
    inline: Vec<AdjSlot>,
    pages: Vec<Vec<AdjSlot>>,
}

impl AdjacencyList {
    fn push(&mut self, slot: AdjSlot, threshold: usize, page_size: usize) {
        if self.inline.len() < threshold {
            self.inline.push(slot);
            return;
        }
        match self.pages.last_mut() {
            Some(page) if page.len() < page_size => page.push(slot),
            _ => self.pages.push(vec![slot]),
        }
    }

    fn remove(&mut self, edge: EdgeId) {
        self.inline.retain(|slot| slot.edge != edge);
        for page in &mut self.pages {
            page.retain(|slot| slot.edge != edge);
        }
        self.pages.retain(|page| !page.is_empty());
    }

    /// Inline entries first, then pages, preserving insertion order
    fn iter(&self) -> impl Iterator<Item = &AdjSlot> {
        self.inline.iter().chain(self.pages.iter().flatten())
    }

    fn is_empty(&self) -> bool {
        self.inline.is_empty() && self.pages.is_empty()
    }
}

#[derive(Default)]
struct Inner {
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeId, Edge>,
    label_index: HashMap<Label, Vec<NodeId>>,
    outgoing: HashMap<(NodeId, Label), AdjacencyList>,
    /// Mirrored entries at each sink, keyed like `outgoing`; target is the
    /// edge's source. Only populated when mirrors are enabled.
    reverse: HashMap<(NodeId, Label), Vec<AdjSlot>>,
    stats: HashMap<Label, LabelStatistics>,
    edge_label_counts: HashMap<Label, u64>,
}

/// In-memory storage adapter
pub struct MemoryAdapter {
    options: StoreOptions,
    id_gen: IdGenerator,
    inner: RwLock<Inner>,
}

impl MemoryAdapter {
    /// Create an adapter with default options
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Create an adapter with the given options
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            options,
            id_gen: IdGenerator::new(),
            inner: RwLock::new(Inner::default()),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| Error::Internal("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| Error::Internal("store lock poisoned".to_string()))
    }

    fn entry_for(&self, inner: &Inner, slot: &AdjSlot, reverse: bool) -> Result<AdjacencyEntry> {
        let edge = inner
            .edges
            .get(&slot.edge)
            .ok_or_else(|| Error::Storage(format!("dangling adjacency entry {}", slot.edge)))?;
        let target = if reverse { edge.source } else { edge.sink };
        Ok(AdjacencyEntry {
            edge_id: slot.edge,
            target,
            properties: edge.properties.clone(),
        })
    }

    fn remove_edge_locked(inner: &mut Inner, edge: &Edge) {
        let out_key = (edge.source, edge.label.clone());
        if let Some(list) = inner.outgoing.get_mut(&out_key) {
            list.remove(edge.id);
            if list.is_empty() {
                inner.outgoing.remove(&out_key);
            }
        }
        let rev_key = (edge.sink, edge.label.clone());
        if let Some(mirror) = inner.reverse.get_mut(&rev_key) {
            mirror.retain(|slot| slot.edge != edge.id);
            if mirror.is_empty() {
                inner.reverse.remove(&rev_key);
            }
        }
        if let Some(count) = inner.edge_label_counts.get_mut(&edge.label) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                inner.edge_label_counts.remove(&edge.label);
            }
        }
        inner.edges.remove(&edge.id);
    }
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageAdapter for MemoryAdapter {
    fn create_node(&self, label: &Label, properties: PropertyMap) -> Result<NodeId> {
        let id = self.id_gen.next_node_id();
        let partition_props = self
            .options
            .partition_properties
            .get(label.name())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let node = Node::with_properties(id, label.clone(), properties, partition_props);

        let mut inner = self.write()?;
        let stats = inner.stats.entry(label.clone()).or_default();
        stats.count += 1;
        for (key, value) in node.properties.iter() {
            stats.histograms.entry(key.clone()).or_default().record(value);
        }
        inner.label_index.entry(label.clone()).or_default().push(id);
        inner.nodes.insert(id, node);
        debug!(%id, %label, "created node");
        Ok(id)
    }

    fn create_edge(
        &self,
        source: NodeId,
        sink: NodeId,
        label: &Label,
        properties: PropertyMap,
    ) -> Result<EdgeId> {
        let mut inner = self.write()?;
        if !inner.nodes.contains_key(&source) {
            return Err(Error::Storage(format!("missing endpoint node {source}")));
        }
        if !inner.nodes.contains_key(&sink) {
            return Err(Error::Storage(format!("missing endpoint node {sink}")));
        }

        let id = self.id_gen.next_edge_id();
        let edge = Edge::with_properties(id, label.clone(), source, sink, properties);
        let slot = AdjSlot { edge: id, target: sink };

        inner
            .outgoing
            .entry((source, label.clone()))
            .or_default()
            .push(slot, self.options.spill_threshold, self.options.spill_page_size);

        if self.options.mirror_reverse_edges {
            inner
                .reverse
                .entry((sink, label.clone()))
                .or_default()
                .push(AdjSlot { edge: id, target: source });
        }

        *inner.edge_label_counts.entry(label.clone()).or_insert(0) += 1;
        inner.edges.insert(id, edge);
        debug!(%id, %label, %source, %sink, "created edge");
        Ok(id)
    }

    fn delete_node(&self, id: NodeId) -> Result<()> {
        let mut inner = self.write()?;
        let node = inner
            .nodes
            .remove(&id)
            .ok_or_else(|| Error::Storage(format!("node not found: {id}")))?;

        // Detach every edge touching the node before dropping it
        let attached: Vec<Edge> = inner
            .edges
            .values()
            .filter(|e| e.source == id || e.sink == id)
            .cloned()
            .collect();
        for edge in &attached {
            Self::remove_edge_locked(&mut inner, edge);
        }

        // Labels stay known after their last node goes away; a query against
        // an emptied label yields zero rows rather than an unknown-label error
        if let Some(ids) = inner.label_index.get_mut(&node.label) {
            ids.retain(|n| *n != id);
        }
        if let Some(stats) = inner.stats.get_mut(&node.label) {
            stats.count = stats.count.saturating_sub(1);
            for (key, value) in node.properties.iter() {
                if let Some(hist) = stats.histograms.get_mut(key) {
                    hist.forget(value);
                }
            }
        }
        debug!(%id, edges = attached.len(), "deleted node");
        Ok(())
    }

    fn delete_edge(&self, id: EdgeId) -> Result<()> {
        let mut inner = self.write()?;
        let edge = inner
            .edges
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::Storage(format!("edge not found: {id}")))?;
        Self::remove_edge_locked(&mut inner, &edge);
        debug!(%id, "deleted edge");
        Ok(())
    }

    fn node(&self, id: NodeId) -> Result<Option<Node>> {
        Ok(self.read()?.nodes.get(&id).cloned())
    }

    fn edge(&self, id: EdgeId) -> Result<Option<Edge>> {
        Ok(self.read()?.edges.get(&id).cloned())
    }

    fn nodes_by_label(
        &self,
        label: &Label,
        filter: Option<&PropertyFilter>,
    ) -> Result<NodeStream<'_>> {
        let inner = self.read()?;
        let nodes: Vec<Node> = inner
            .label_index
            .get(label)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.nodes.get(id))
            .filter(|node| filter.map_or(true, |f| f.matches(node)))
            .cloned()
            .collect();
        Ok(Box::new(nodes.into_iter().map(Ok)))
    }

    fn adjacency(
        &self,
        node: NodeId,
        label: &Label,
        direction: Direction,
    ) -> Result<AdjacencyStream<'_>> {
        let inner = self.read()?;
        let entries: Vec<Result<AdjacencyEntry>> = match direction {
            Direction::Out => inner
                .outgoing
                .get(&(node, label.clone()))
                .map(|list| {
                    list.iter()
                        .map(|slot| self.entry_for(&inner, slot, false))
                        .collect()
                })
                .unwrap_or_default(),
            Direction::In => {
                if self.options.mirror_reverse_edges {
                    inner
                        .reverse
                        .get(&(node, label.clone()))
                        .map(|mirror| {
                            mirror
                                .iter()
                                .map(|slot| self.entry_for(&inner, slot, true))
                                .collect()
                        })
                        .unwrap_or_default()
                } else {
                    // No mirror: scan forward lists for this label, keep
                    // edges that land on the requested node
                    inner
                        .outgoing
                        .iter()
                        .filter(|((_, l), _)| l == label)
                        .flat_map(|(_, list)| list.iter())
                        .filter(|slot| slot.target == node)
                        .map(|slot| self.entry_for(&inner, slot, true))
                        .collect()
                }
            }
        };
        Ok(Box::new(entries.into_iter()))
    }

    fn labels(&self) -> Result<Vec<Label>> {
        let mut labels: Vec<Label> = self.read()?.label_index.keys().cloned().collect();
        labels.sort();
        Ok(labels)
    }

    fn edge_labels(&self) -> Result<Vec<Label>> {
        let mut labels: Vec<Label> = self.read()?.edge_label_counts.keys().cloned().collect();
        labels.sort();
        Ok(labels)
    }

    fn label_statistics(&self, label: &Label) -> Result<Option<LabelStatistics>> {
        Ok(self.read()?.stats.get(label).cloned())
    }
}
