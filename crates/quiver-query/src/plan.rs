//! Logical plan operators
//!
//! Both the statement planner and the traversal builder produce this tree.
//! Execution pulls rows depth-first: each operator draws from its input only
//! as far as the caller's `next()` demands.

use quiver_core::{Direction, Label};

use crate::ast::{Expr, Repetition, SelectItem};

/// One resolved (base label, optional predicate) selection.
///
/// Views expand into several arms; a plain label is a single arm with no
/// predicate. Node-arm predicates reference the consuming alias; edge-arm
/// predicates reference the arm's own label name.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelArm {
    pub label: Label,
    pub predicate: Option<Expr>,
}

impl LabelArm {
    /// An unfiltered arm over a base label
    pub fn new(label: impl Into<Label>) -> Self {
        Self {
            label: label.into(),
            predicate: None,
        }
    }

    /// An arm restricted by a predicate
    pub fn filtered(label: impl Into<Label>, predicate: Expr) -> Self {
        Self {
            label: label.into(),
            predicate: Some(predicate),
        }
    }
}

/// A node in the plan tree
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOp {
    /// Stream nodes of one or more label arms, binding them to `alias`
    Scan {
        alias: String,
        arms: Vec<LabelArm>,
        /// Pushed-down predicate referencing only `alias`
        filter: Option<Expr>,
    },
    /// Follow adjacency from a bound alias, binding (or checking) the target
    Expand {
        input: Box<PlanOp>,
        /// Already-bound alias the expansion starts from
        from_alias: String,
        /// Alias the reached node binds to
        to_alias: String,
        arms: Vec<LabelArm>,
        direction: Direction,
        repetition: Repetition,
        /// Name the traversed edge binds to, when requested
        bound: Option<String>,
        /// `to_alias` is already bound; compare identities instead of binding
        check_target: bool,
        /// Predicate every reached node must pass, including intermediate
        /// hops of a multi-hop expansion; references `to_alias`
        hop_filter: Option<Expr>,
    },
    /// Keep rows satisfying a predicate
    Filter {
        input: Box<PlanOp>,
        predicate: Expr,
    },
    /// Cartesian product of two disconnected sub-plans
    CrossJoin {
        left: Box<PlanOp>,
        right: Box<PlanOp>,
    },
    /// Emit named columns
    Project {
        input: Box<PlanOp>,
        items: Vec<SelectItem>,
    },
    /// Emit the node/edge alternation traversed to reach each row
    PathCollect { input: Box<PlanOp> },
    /// Yield the primary sub-plan's rows; if it yields none, the fallback's
    Branch {
        primary: Box<PlanOp>,
        fallback: Box<PlanOp>,
    },
}

impl PlanOp {
    /// Aliases bound by this operator and its inputs, in binding order
    pub fn bound_aliases(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_aliases(&mut out);
        out
    }

    fn collect_aliases(&self, out: &mut Vec<String>) {
        match self {
            PlanOp::Scan { alias, .. } => {
                if !out.contains(alias) {
                    out.push(alias.clone());
                }
            }
            PlanOp::Expand {
                input,
                to_alias,
                bound,
                ..
            } => {
                input.collect_aliases(out);
                if !out.contains(to_alias) {
                    out.push(to_alias.clone());
                }
                if let Some(name) = bound {
                    if !out.contains(name) {
                        out.push(name.clone());
                    }
                }
            }
            PlanOp::Filter { input, .. }
            | PlanOp::Project { input, .. }
            | PlanOp::PathCollect { input } => input.collect_aliases(out),
            PlanOp::CrossJoin { left, right } => {
                left.collect_aliases(out);
                right.collect_aliases(out);
            }
            PlanOp::Branch { primary, .. } => primary.collect_aliases(out),
        }
    }

    /// Render the plan as an indented tree, one operator per line
    pub fn explain(&self) -> String {
        let mut out = String::new();
        self.explain_into(&mut out, 0);
        out
    }

    fn explain_into(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match self {
            PlanOp::Scan { alias, arms, filter } => {
                let labels: Vec<&str> = arms.iter().map(|a| a.label.name()).collect();
                out.push_str(&format!(
                    "{pad}Scan {alias} [{}]{}\n",
                    labels.join(", "),
                    if filter.is_some() { " filtered" } else { "" }
                ));
            }
            PlanOp::Expand {
                input,
                from_alias,
                to_alias,
                arms,
                direction,
                repetition,
                check_target,
                ..
            } => {
                let labels: Vec<&str> = arms.iter().map(|a| a.label.name()).collect();
                let arrow = match direction {
                    Direction::Out => "->",
                    Direction::In => "<-",
                };
                let rep = match repetition.max {
                    Some(_) if repetition.is_single() => String::new(),
                    Some(max) => format!(" *{}..{}", repetition.min, max),
                    None => format!(" *{}..", repetition.min),
                };
                out.push_str(&format!(
                    "{pad}Expand {from_alias} {arrow} {to_alias} [{}]{rep}{}\n",
                    labels.join(", "),
                    if *check_target { " (check)" } else { "" }
                ));
                input.explain_into(out, depth + 1);
            }
            PlanOp::Filter { input, .. } => {
                out.push_str(&format!("{pad}Filter\n"));
                input.explain_into(out, depth + 1);
            }
            PlanOp::CrossJoin { left, right } => {
                out.push_str(&format!("{pad}CrossJoin\n"));
                left.explain_into(out, depth + 1);
                right.explain_into(out, depth + 1);
            }
            PlanOp::Project { input, items } => {
                out.push_str(&format!("{pad}Project ({} columns)\n", items.len()));
                input.explain_into(out, depth + 1);
            }
            PlanOp::PathCollect { input } => {
                out.push_str(&format!("{pad}PathCollect\n"));
                input.explain_into(out, depth + 1);
            }
            PlanOp::Branch { primary, fallback } => {
                out.push_str(&format!("{pad}Branch\n"));
                primary.explain_into(out, depth + 1);
                fallback.explain_into(out, depth + 1);
            }
        }
    }
}
