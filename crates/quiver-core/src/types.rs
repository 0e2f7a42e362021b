//! Core graph types for QuiverDB
//!
//! Defines the fundamental building blocks: nodes, edges, labels, directions,
//! and result paths.

use crate::id::{EdgeId, NodeId, PartitionKey};
use crate::property::{PropertyMap, PropertyValue};
use serde::{Deserialize, Serialize};

/// A label for nodes or edge types
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label(String);

impl Label {
    /// Create a new label
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// Get the label name
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Convert to owned string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of an edge traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Follow edges from source to sink (->)
    Out,
    /// Follow edges from sink to source (<-)
    In,
}

impl Direction {
    /// Returns the opposite direction
    pub fn reverse(self) -> Self {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
        }
    }
}

/// A node in the property graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier, immutable once created
    pub id: NodeId,

    /// Type tag of this node
    pub label: Label,

    /// Properties of this node
    pub properties: PropertyMap,

    /// Partition key derived from the label's partition properties
    pub partition_key: PartitionKey,
}

impl Node {
    /// Create a node with a label; partition key derives from the id
    pub fn new<L: Into<Label>>(id: NodeId, label: L) -> Self {
        Self {
            id,
            label: label.into(),
            properties: PropertyMap::new(),
            partition_key: PartitionKey::from_node_id(id),
        }
    }

    /// Create a node with label and properties, deriving the partition key
    /// from the given partition property names (in order)
    pub fn with_properties<L: Into<Label>>(
        id: NodeId,
        label: L,
        properties: PropertyMap,
        partition_properties: &[String],
    ) -> Self {
        let partition_key = derive_partition_key(id, &properties, partition_properties);
        Self {
            id,
            label: label.into(),
            properties,
            partition_key,
        }
    }

    /// Get a property
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// Derive a partition key from the designated properties, falling back to the
/// node id when none are configured or present
pub fn derive_partition_key(
    id: NodeId,
    properties: &PropertyMap,
    partition_properties: &[String],
) -> PartitionKey {
    let values: Vec<&PropertyValue> = partition_properties
        .iter()
        .filter_map(|key| properties.get(key))
        .collect();
    if values.is_empty() {
        PartitionKey::from_node_id(id)
    } else {
        PartitionKey::from_values(values)
    }
}

/// A directed edge between two nodes
///
/// Owned by the source node's adjacency list. A reverse mirror stored at the
/// sink is an optional storage-side optimization and never a distinct edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier
    pub id: EdgeId,

    /// The edge type
    pub label: Label,

    /// Source node ID
    pub source: NodeId,

    /// Sink node ID
    pub sink: NodeId,

    /// Properties of this edge
    pub properties: PropertyMap,
}

impl Edge {
    /// Create a new edge
    pub fn new<L: Into<Label>>(id: EdgeId, label: L, source: NodeId, sink: NodeId) -> Self {
        Self {
            id,
            label: label.into(),
            source,
            sink,
            properties: PropertyMap::new(),
        }
    }

    /// Create an edge with properties
    pub fn with_properties<L: Into<Label>>(
        id: EdgeId,
        label: L,
        source: NodeId,
        sink: NodeId,
        properties: PropertyMap,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            source,
            sink,
            properties,
        }
    }

    /// The endpoint reached when traversing in the given direction
    pub fn endpoint(&self, direction: Direction) -> NodeId {
        match direction {
            Direction::Out => self.sink,
            Direction::In => self.source,
        }
    }
}

/// One hop of a path: the edge taken and the node reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub edge: Edge,
    pub node: Node,
}

/// A path through the graph: an alternating node/edge/node sequence
///
/// Paths are transient result projections and are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Node the path starts at
    pub start: Node,

    /// Hops taken after the start node
    pub segments: Vec<PathSegment>,
}

impl Path {
    /// Create a path rooted at a single node
    pub fn from_node(node: Node) -> Self {
        Self {
            start: node,
            segments: Vec::new(),
        }
    }

    /// Add an edge and its target node to the path
    pub fn extend(&mut self, edge: Edge, node: Node) {
        self.segments.push(PathSegment { edge, node });
    }

    /// Number of edges in the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the path is a single node
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the terminal node
    pub fn end(&self) -> &Node {
        self.segments.last().map(|s| &s.node).unwrap_or(&self.start)
    }

    /// Iterate over the nodes in order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        std::iter::once(&self.start).chain(self.segments.iter().map(|s| &s.node))
    }

    /// Iterate over the edges in order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.segments.iter().map(|s| &s.edge)
    }
}
