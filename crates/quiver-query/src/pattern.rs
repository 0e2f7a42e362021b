//! Pattern graph construction and validation
//!
//! A resolved MATCH clause becomes a general graph: aliases are pattern
//! nodes, edge variables are directed pattern edges. Self-joins, multi-edges
//! between the same alias pair, and cycles are all legal; validation only
//! rejects structural mistakes.

use std::collections::HashSet;

use quiver_core::{Error, Result};

use crate::ast::{Projection, Repetition};
use crate::plan::LabelArm;
use crate::view::ResolvedSelect;

/// A pattern node: one FROM alias and its base-label arms
#[derive(Debug, Clone, PartialEq)]
pub struct PatternNode {
    pub alias: String,
    pub arms: Vec<LabelArm>,
}

/// A directed pattern edge between two pattern nodes
#[derive(Debug, Clone, PartialEq)]
pub struct PatternEdge {
    /// Index of the source pattern node
    pub source: usize,
    /// Index of the sink pattern node
    pub sink: usize,
    pub arms: Vec<LabelArm>,
    pub repetition: Repetition,
    pub bound: Option<String>,
}

/// The validated pattern graph for one SELECT
#[derive(Debug, Clone, PartialEq)]
pub struct PatternGraph {
    pub nodes: Vec<PatternNode>,
    pub edges: Vec<PatternEdge>,
}

impl PatternGraph {
    /// Build and validate the pattern graph for a resolved SELECT
    pub fn build(resolved: &ResolvedSelect) -> Result<Self> {
        if resolved.sources.is_empty() {
            return Err(Error::Pattern("no FROM sources declared".to_string()));
        }

        let mut nodes: Vec<PatternNode> = Vec::new();
        for source in &resolved.sources {
            if nodes.iter().any(|n| n.alias == source.alias) {
                return Err(Error::Pattern(format!(
                    "alias '{}' declared more than once",
                    source.alias
                )));
            }
            nodes.push(PatternNode {
                alias: source.alias.clone(),
                arms: source.arms.clone(),
            });
        }

        let alias_index = |alias: &str| -> Result<usize> {
            nodes
                .iter()
                .position(|n| n.alias == alias)
                .ok_or_else(|| {
                    Error::Pattern(format!("undeclared alias '{alias}' in MATCH"))
                })
        };

        let mut bound_names: HashSet<&str> = HashSet::new();
        let mut edges = Vec::new();
        for edge in &resolved.matches {
            edge.repetition.validate()?;
            if let Some(bound) = &edge.bound {
                if nodes.iter().any(|n| &n.alias == bound) {
                    return Err(Error::Pattern(format!(
                        "bound name '{bound}' collides with an alias"
                    )));
                }
                if !bound_names.insert(bound) {
                    return Err(Error::Pattern(format!(
                        "duplicate bound name '{bound}'"
                    )));
                }
            }
            edges.push(PatternEdge {
                source: alias_index(&edge.source_alias)?,
                sink: alias_index(&edge.sink_alias)?,
                arms: edge.arms.clone(),
                repetition: edge.repetition,
                bound: edge.bound.clone(),
            });
        }

        let graph = Self { nodes, edges };
        graph.check_references(resolved)?;
        Ok(graph)
    }

    /// Every alias used in WHERE or the projection must be declared in FROM
    /// or bound by a MATCH edge
    fn check_references(&self, resolved: &ResolvedSelect) -> Result<()> {
        let mut referenced = Vec::new();
        if let Some(predicate) = &resolved.predicate {
            predicate.referenced_aliases(&mut referenced);
        }
        if let Projection::Columns(items) = &resolved.projection {
            for item in items {
                item.expr.referenced_aliases(&mut referenced);
            }
        }
        for alias in referenced {
            let declared = self.nodes.iter().any(|n| n.alias == alias)
                || self
                    .edges
                    .iter()
                    .any(|e| e.bound.as_deref() == Some(alias.as_str()));
            if !declared {
                return Err(Error::Pattern(format!(
                    "dangling alias '{alias}': not declared in FROM or MATCH"
                )));
            }
        }
        Ok(())
    }

    /// Index of the pattern node carrying `alias`
    pub fn alias_index(&self, alias: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.alias == alias)
    }

    /// Connected components over the undirected shape of the pattern,
    /// each a sorted list of node indices
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.nodes.len()];
        let mut components = Vec::new();
        for start in 0..self.nodes.len() {
            if seen[start] {
                continue;
            }
            let mut component = Vec::new();
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(node) = stack.pop() {
                component.push(node);
                for edge in &self.edges {
                    let next = if edge.source == node {
                        edge.sink
                    } else if edge.sink == node {
                        edge.source
                    } else {
                        continue;
                    };
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }
}
