//! Abstract syntax tree for QuiverDB statements
//!
//! Both the text parser and the fluent traversal builder converge on these
//! shapes; label references may still name views until the resolver runs.

use quiver_core::{Error, PropertyValue, Result};
use serde::{Deserialize, Serialize};

/// A parsed top-level statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// SELECT ... FROM ... [MATCH ...] [WHERE ...]
    Select(SelectStmt),
    /// INSERT INTO label (cols) VALUES (vals), ...
    InsertNode(InsertNodeStmt),
    /// INSERT EDGE INTO src.edge SELECT a, b [, props] FROM ... WHERE ...
    InsertEdge(InsertEdgeStmt),
    /// DELETE FROM label [WHERE ...]
    DeleteNodes(DeleteNodesStmt),
    /// DELETE EDGE a-[label]->b FROM ... [WHERE ...]
    DeleteEdge(DeleteEdgeStmt),
    /// CREATE NODE VIEW name AS select UNION ALL select ...
    CreateNodeView(CreateViewStmt),
    /// CREATE EDGE VIEW owner.name AS select UNION ALL select ...
    CreateEdgeView(CreateViewStmt),
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStmt {
    pub projection: Projection,
    pub from: Vec<SourceDecl>,
    pub matches: Vec<MatchEdge>,
    pub predicate: Option<Expr>,
}

/// What a SELECT emits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Named columns
    Columns(Vec<SelectItem>),
    /// The full node/edge/node sequence traversed per result
    Path,
}

/// One projected column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

/// A FROM entry: a label or view name plus the alias it binds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDecl {
    /// Label or view name; `None` is the global node view (`FROM *`)
    pub label: Option<String>,
    pub alias: String,
}

/// One MATCH arrow: `src-[label[*min..max] [AS bound]]->sink`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEdge {
    pub source_alias: String,
    pub label: String,
    pub repetition: Repetition,
    pub bound: Option<String>,
    pub sink_alias: String,
}

/// Repetition bound on an edge variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repetition {
    pub min: u32,
    /// `None` means unbounded
    pub max: Option<u32>,
}

impl Repetition {
    /// Exactly one hop
    pub fn single() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// A bounded range
    pub fn range(min: u32, max: u32) -> Self {
        Self { min, max: Some(max) }
    }

    /// At least `min` hops, no upper bound
    pub fn at_least(min: u32) -> Self {
        Self { min, max: None }
    }

    pub fn is_single(&self) -> bool {
        self.min == 1 && self.max == Some(1)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    /// Check `min <= max` when both ends are given
    pub fn validate(&self) -> Result<()> {
        if let Some(max) = self.max {
            if self.min > max {
                return Err(Error::Pattern(format!(
                    "invalid repetition range [{}..{}]: min exceeds max",
                    self.min, max
                )));
            }
        }
        Ok(())
    }
}

impl Default for Repetition {
    fn default() -> Self {
        Self::single()
    }
}

/// INSERT INTO statement; `values` may hold several rows (bulk insert)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertNodeStmt {
    pub label: String,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Literal>>,
}

/// INSERT EDGE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertEdgeStmt {
    pub source_label: String,
    pub edge_label: String,
    pub source_alias: String,
    pub sink_alias: String,
    /// Literal edge properties from the SELECT list
    pub properties: Vec<(String, Literal)>,
    pub from: Vec<SourceDecl>,
    pub predicate: Option<Expr>,
}

/// DELETE FROM statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteNodesStmt {
    pub label: String,
    pub predicate: Option<Expr>,
}

/// DELETE EDGE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteEdgeStmt {
    pub edge: MatchEdge,
    pub from: Vec<SourceDecl>,
    pub predicate: Option<Expr>,
}

/// CREATE NODE VIEW / CREATE EDGE VIEW statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateViewStmt {
    pub name: String,
    /// Owner label, edge views only
    pub owner: Option<String>,
    pub arms: Vec<ViewArm>,
}

/// One UNION ALL arm of a view definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewArm {
    pub label: String,
    pub predicate: Option<Expr>,
}

/// A predicate or scalar expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal value
    Literal(Literal),
    /// `alias.key` property access
    Property { alias: String, key: String },
    /// Bare alias, referring to the bound entity
    Alias(String),
    /// Binary operation
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Logical negation
    Not(Box<Expr>),
    /// `expr IS [NOT] NULL`
    IsNull { expr: Box<Expr>, negated: bool },
}

impl Expr {
    /// Property-equality shorthand used throughout the planner tests
    pub fn property_eq(alias: &str, key: &str, value: impl Into<PropertyValue>) -> Self {
        Expr::Binary {
            left: Box::new(Expr::Property {
                alias: alias.to_string(),
                key: key.to_string(),
            }),
            op: BinaryOp::Eq,
            right: Box::new(Expr::Literal(Literal::from_value(value.into()))),
        }
    }

    /// Split a conjunction into its top-level conjuncts
    pub fn conjuncts(&self) -> Vec<&Expr> {
        match self {
            Expr::Binary {
                left,
                op: BinaryOp::And,
                right,
            } => {
                let mut out = left.conjuncts();
                out.extend(right.conjuncts());
                out
            }
            other => vec![other],
        }
    }

    /// Rebuild a conjunction from conjuncts; `None` when empty
    pub fn conjoin(parts: Vec<Expr>) -> Option<Expr> {
        parts.into_iter().reduce(|acc, next| Expr::Binary {
            left: Box::new(acc),
            op: BinaryOp::And,
            right: Box::new(next),
        })
    }

    /// Collect every alias the expression references
    pub fn referenced_aliases(&self, out: &mut Vec<String>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Property { alias, .. } | Expr::Alias(alias) => {
                if !out.contains(alias) {
                    out.push(alias.clone());
                }
            }
            Expr::Binary { left, right, .. } => {
                left.referenced_aliases(out);
                right.referenced_aliases(out);
            }
            Expr::Not(inner) | Expr::IsNull { expr: inner, .. } => {
                inner.referenced_aliases(out)
            }
        }
    }

    /// True when the expression touches no alias other than `alias`
    pub fn only_references(&self, alias: &str) -> bool {
        let mut refs = Vec::new();
        self.referenced_aliases(&mut refs);
        refs.iter().all(|a| a == alias)
    }

    /// Rewrite every reference to `from` so it refers to `to`
    pub fn rename_alias(&mut self, from: &str, to: &str) {
        match self {
            Expr::Literal(_) => {}
            Expr::Property { alias, .. } | Expr::Alias(alias) => {
                if alias == from {
                    *alias = to.to_string();
                }
            }
            Expr::Binary { left, right, .. } => {
                left.rename_alias(from, to);
                right.rename_alias(from, to);
            }
            Expr::Not(inner) | Expr::IsNull { expr: inner, .. } => {
                inner.rename_alias(from, to)
            }
        }
    }

    /// Equality comparisons `alias.key = literal` (either side) for one alias
    pub fn equality_keys(&self, alias: &str) -> Vec<(String, PropertyValue)> {
        let mut out = Vec::new();
        for conjunct in self.conjuncts() {
            if let Expr::Binary {
                left,
                op: BinaryOp::Eq,
                right,
            } = conjunct
            {
                let pair = match (left.as_ref(), right.as_ref()) {
                    (Expr::Property { alias: a, key }, Expr::Literal(lit)) if a == alias => {
                        Some((key.clone(), lit.to_value()))
                    }
                    (Expr::Literal(lit), Expr::Property { alias: a, key }) if a == alias => {
                        Some((key.clone(), lit.to_value()))
                    }
                    _ => None,
                };
                if let Some(pair) = pair {
                    out.push(pair);
                }
            }
        }
        out
    }
}

/// Literal value in a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Literal {
    /// Convert to the runtime property value
    pub fn to_value(&self) -> PropertyValue {
        match self {
            Literal::Null => PropertyValue::Null,
            Literal::Boolean(b) => PropertyValue::Boolean(*b),
            Literal::Integer(i) => PropertyValue::Integer(*i),
            Literal::Float(f) => PropertyValue::Float(*f),
            Literal::String(s) => PropertyValue::String(s.clone()),
        }
    }

    /// Build from a runtime property value
    pub fn from_value(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Null => Literal::Null,
            PropertyValue::Boolean(b) => Literal::Boolean(b),
            PropertyValue::Integer(i) => Literal::Integer(i),
            PropertyValue::Float(f) => Literal::Float(f),
            PropertyValue::String(s) => Literal::String(s),
        }
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}
