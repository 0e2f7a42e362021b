//! Result materialization
//!
//! Queries surface either as tabular rows of named JSON columns or, for
//! path projections, as ordered lists of node/edge records. Mutations
//! return a per-item bulk report instead of rows.

use serde::Serialize;
use serde_json::{json, Value};

use quiver_core::{Edge, Node, Path, PropertyValue};

use crate::eval::Binding;

/// Tabular query output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }
}

/// One entry of a path result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathRecord {
    /// "node" or "edge"
    pub kind: &'static str,
    pub id: String,
    pub label: String,
    pub attributes: Value,
}

/// Render a path as its alternating node/edge record list
pub fn path_records(path: &Path) -> Vec<PathRecord> {
    let mut out = vec![node_record(&path.start)];
    for segment in &path.segments {
        out.push(edge_record(&segment.edge));
        out.push(node_record(&segment.node));
    }
    out
}

fn node_record(node: &Node) -> PathRecord {
    PathRecord {
        kind: "node",
        id: node.id.to_string(),
        label: node.label.name().to_string(),
        attributes: properties_json(&node.properties),
    }
}

fn edge_record(edge: &Edge) -> PathRecord {
    PathRecord {
        kind: "edge",
        id: edge.id.to_string(),
        label: edge.label.name().to_string(),
        attributes: properties_json(&edge.properties),
    }
}

/// JSON rendering of a bound entity, used when a projection names a bare
/// alias
pub fn binding_json(binding: &Binding) -> Value {
    match binding {
        Binding::Node(node) => json!({
            "kind": "node",
            "id": node.id.to_string(),
            "label": node.label.name(),
            "properties": properties_json(&node.properties),
        }),
        Binding::Edge(edge) => json!({
            "kind": "edge",
            "id": edge.id.to_string(),
            "label": edge.label.name(),
            "source": edge.source.to_string(),
            "sink": edge.sink.to_string(),
            "properties": properties_json(&edge.properties),
        }),
    }
}

pub fn value_json(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Null => Value::Null,
        PropertyValue::Boolean(b) => json!(b),
        PropertyValue::Integer(i) => json!(i),
        PropertyValue::Float(f) => json!(f),
        PropertyValue::String(s) => json!(s),
    }
}

fn properties_json(properties: &quiver_core::PropertyMap) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in properties.iter() {
        map.insert(key.clone(), value_json(value));
    }
    Value::Object(map)
}

/// Aggregate outcome of a bulk mutation. Items fail individually; the
/// operation keeps going and reports every failure with its input index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkReport {
    pub attempted: usize,
    pub failures: Vec<BulkFailure>,
}

/// One failed item of a bulk mutation
#[derive(Debug, Clone, Serialize)]
pub struct BulkFailure {
    pub index: usize,
    pub message: String,
}

impl BulkReport {
    pub fn record_ok(&mut self) {
        self.attempted += 1;
    }

    pub fn record_err(&mut self, err: impl std::fmt::Display) {
        let index = self.attempted;
        self.attempted += 1;
        self.failures.push(BulkFailure {
            index,
            message: err.to_string(),
        });
    }

    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }

    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }
}
