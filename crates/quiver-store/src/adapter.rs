//! The storage-adapter boundary
//!
//! The execution engine consumes storage exclusively through this trait:
//! node/edge lifecycle, label-filtered node scans, adjacency streams, and
//! label statistics. Implementations may buffer, page, or go over the
//! network; the engine only relies on the stream contracts below.

use crate::stats::LabelStatistics;
use quiver_core::{Direction, Edge, EdgeId, Label, Node, NodeId, PropertyMap, PropertyValue, Result};

/// Lazy sequence of nodes produced by a label scan
pub type NodeStream<'a> = Box<dyn Iterator<Item = Result<Node>> + 'a>;

/// Lazy sequence of adjacency entries
pub type AdjacencyStream<'a> = Box<dyn Iterator<Item = Result<AdjacencyEntry>> + 'a>;

/// One adjacency entry: the edge and the node it leads to
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyEntry {
    pub edge_id: EdgeId,
    pub target: NodeId,
    pub properties: PropertyMap,
}

/// Equality predicate pushed down into a label scan
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter {
    pub key: String,
    pub value: PropertyValue,
}

impl PropertyFilter {
    pub fn new<K: Into<String>, V: Into<PropertyValue>>(key: K, value: V) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// True when the node carries the filter value for the filter key
    pub fn matches(&self, node: &Node) -> bool {
        node.properties.get(&self.key) == Some(&self.value)
    }
}

/// Narrow interface between the engine and a storage backend
///
/// All operations are synchronous from the engine's point of view but may
/// themselves suspend on I/O inside the adapter.
pub trait StorageAdapter: Send + Sync {
    /// Create a node; returns its identity
    fn create_node(&self, label: &Label, properties: PropertyMap) -> Result<NodeId>;

    /// Create an edge between two existing nodes; fails with a storage error
    /// when either endpoint is missing
    fn create_edge(
        &self,
        source: NodeId,
        sink: NodeId,
        label: &Label,
        properties: PropertyMap,
    ) -> Result<EdgeId>;

    /// Delete a node and every edge attached to it
    fn delete_node(&self, id: NodeId) -> Result<()>;

    /// Delete an edge
    fn delete_edge(&self, id: EdgeId) -> Result<()>;

    /// Fetch a node by id
    fn node(&self, id: NodeId) -> Result<Option<Node>>;

    /// Fetch an edge by id
    fn edge(&self, id: EdgeId) -> Result<Option<Edge>>;

    /// Stream the nodes carrying a label, optionally pre-filtered by an
    /// equality predicate the backend can evaluate cheaply
    fn nodes_by_label(&self, label: &Label, filter: Option<&PropertyFilter>)
        -> Result<NodeStream<'_>>;

    /// Stream the adjacency of a node for one edge label and direction.
    /// Inline and spilled entries arrive as one merged sequence in insertion
    /// order; reverse direction uses a stored mirror when present and falls
    /// back to scanning forward lists otherwise.
    fn adjacency(
        &self,
        node: NodeId,
        label: &Label,
        direction: Direction,
    ) -> Result<AdjacencyStream<'_>>;

    /// Every node label currently known to the store
    fn labels(&self) -> Result<Vec<Label>>;

    /// Every edge label currently known to the store
    fn edge_labels(&self) -> Result<Vec<Label>>;

    /// Statistics for a node label, when the backend collects them
    fn label_statistics(&self, label: &Label) -> Result<Option<LabelStatistics>>;
}
