//! Row bindings and predicate evaluation
//!
//! A row binds aliases to concrete nodes and edges and carries the path
//! walked to produce it. Predicates evaluate against a row; a comparison
//! with an absent or null property is false, `IS NULL` treats absent and
//! explicit null alike.

use std::cmp::Ordering;
use std::collections::HashMap;

use quiver_core::{Edge, Error, Node, Path, PropertyValue, Result};
use quiver_query::{BinaryOp, Expr, Literal};

/// An entity bound to an alias
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Node(Node),
    Edge(Edge),
}

impl Binding {
    pub fn properties(&self) -> &quiver_core::PropertyMap {
        match self {
            Binding::Node(node) => &node.properties,
            Binding::Edge(edge) => &edge.properties,
        }
    }

    /// Internal identity, comparable across bindings of the same kind
    fn identity(&self) -> (bool, u64) {
        match self {
            Binding::Node(node) => (false, node.id.as_internal()),
            Binding::Edge(edge) => (true, edge.id.as_internal()),
        }
    }
}

/// One in-flight result tuple
#[derive(Debug, Clone, Default)]
pub struct Row {
    bindings: HashMap<String, Binding>,
    /// The node/edge alternation walked to reach this row, rooted at the
    /// seed scan
    pub path: Option<Path>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, alias: impl Into<String>, binding: Binding) {
        self.bindings.insert(alias.into(), binding);
    }

    pub fn binding(&self, alias: &str) -> Option<&Binding> {
        self.bindings.get(alias)
    }

    /// The node bound to an alias; an edge or missing binding is an
    /// internal error since the planner checked alias references
    pub fn node(&self, alias: &str) -> Result<&Node> {
        match self.bindings.get(alias) {
            Some(Binding::Node(node)) => Ok(node),
            Some(Binding::Edge(_)) => Err(Error::Internal(format!(
                "alias '{alias}' is bound to an edge, expected a node"
            ))),
            None => Err(Error::Internal(format!("alias '{alias}' is not bound"))),
        }
    }

    pub fn aliases(&self) -> impl Iterator<Item = &String> {
        self.bindings.keys()
    }

    /// Merge another row's bindings into this one; `other` wins on clashes.
    /// The path stays this row's path.
    pub fn absorb(&mut self, other: Row) {
        self.bindings.extend(other.bindings);
    }

    fn property(&self, alias: &str, key: &str) -> Result<Option<PropertyValue>> {
        match self.bindings.get(alias) {
            Some(binding) => Ok(binding.properties().get(key).cloned()),
            None => Err(Error::Internal(format!("alias '{alias}' is not bound"))),
        }
    }
}

/// Evaluate a predicate expression against a row
pub fn eval_predicate(expr: &Expr, row: &Row) -> Result<bool> {
    match expr {
        Expr::Literal(Literal::Boolean(b)) => Ok(*b),
        Expr::Literal(other) => Err(Error::Internal(format!(
            "literal {other:?} used as a predicate"
        ))),
        Expr::Property { .. } | Expr::Alias(_) => Err(Error::Internal(
            "bare reference used as a predicate".to_string(),
        )),
        Expr::Not(inner) => Ok(!eval_predicate(inner, row)?),
        Expr::IsNull { expr, negated } => {
            let null = match expr.as_ref() {
                Expr::Property { alias, key } => row
                    .property(alias, key)?
                    .map(|v| v.is_null())
                    .unwrap_or(true),
                Expr::Literal(literal) => literal.to_value().is_null(),
                other => {
                    return Err(Error::Internal(format!(
                        "IS NULL applied to {other:?}"
                    )))
                }
            };
            Ok(null != *negated)
        }
        Expr::Binary { left, op, right } => match op {
            BinaryOp::And => Ok(eval_predicate(left, row)? && eval_predicate(right, row)?),
            BinaryOp::Or => Ok(eval_predicate(left, row)? || eval_predicate(right, row)?),
            _ => eval_comparison(left, *op, right, row),
        },
    }
}

fn eval_comparison(left: &Expr, op: BinaryOp, right: &Expr, row: &Row) -> Result<bool> {
    // Bare aliases compare by entity identity
    if let (Expr::Alias(a), Expr::Alias(b)) = (left, right) {
        let left = row
            .binding(a)
            .ok_or_else(|| Error::Internal(format!("alias '{a}' is not bound")))?;
        let right = row
            .binding(b)
            .ok_or_else(|| Error::Internal(format!("alias '{b}' is not bound")))?;
        let same = left.identity() == right.identity();
        return match op {
            BinaryOp::Eq => Ok(same),
            BinaryOp::Ne => Ok(!same),
            _ => Err(Error::Internal(
                "entities only support = and != comparisons".to_string(),
            )),
        };
    }

    let left = scalar_operand(left, row)?;
    let right = scalar_operand(right, row)?;
    // Absent or null on either side fails every comparison
    let (left, right) = match (left, right) {
        (Some(l), Some(r)) if !l.is_null() && !r.is_null() => (l, r),
        _ => return Ok(false),
    };

    let ordering = left.compare(&right);
    let equal = left == right;
    Ok(match op {
        BinaryOp::Eq => equal,
        BinaryOp::Ne => !equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        BinaryOp::And | BinaryOp::Or => {
            return Err(Error::Internal("logical operator in comparison".to_string()))
        }
    })
}

fn scalar_operand(expr: &Expr, row: &Row) -> Result<Option<PropertyValue>> {
    match expr {
        Expr::Literal(literal) => Ok(Some(literal.to_value())),
        Expr::Property { alias, key } => row.property(alias, key),
        other => Err(Error::Internal(format!(
            "{other:?} is not a scalar operand"
        ))),
    }
}

/// Evaluate an edge-view arm predicate against one edge. The arm's label
/// name doubles as the alias its predicate references.
pub fn edge_arm_matches(predicate: &Expr, label: &str, edge: &Edge) -> Result<bool> {
    let mut row = Row::new();
    row.bind(label, Binding::Edge(edge.clone()));
    eval_predicate(predicate, &row)
}
