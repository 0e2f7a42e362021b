//! Cost-based plan construction
//!
//! Picks the seed scan with the smallest estimated candidate set, then
//! greedily attaches pattern edges, preferring edges that close a cycle
//! (both endpoints already bound) and targets narrowed by equality
//! predicates. Repetition-bounded edges compile to a single bounded
//! expansion operator; unbounded ranges take the configured safety cap.

use std::collections::HashMap;

use quiver_core::{Direction, Error, Result};
use quiver_store::StatsSnapshot;
use tracing::warn;

use crate::ast::{Expr, Projection, Repetition};
use crate::pattern::{PatternGraph, PatternNode};
use crate::plan::PlanOp;
use crate::view::ResolvedSelect;

/// Planner knobs
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Hop limit substituted for an unbounded repetition; `None` makes
    /// unbounded repetitions a planning error
    pub expansion_cap: Option<u32>,

    /// Cross-join disconnected pattern components instead of rejecting them
    pub cross_join_disconnected: bool,

    /// Exclude node revisits within one in-flight path during expansion
    pub simple_paths: bool,

    /// Cardinality assumed for a label with no collected statistics
    pub default_cardinality: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            expansion_cap: Some(64),
            cross_join_disconnected: false,
            simple_paths: false,
            default_cardinality: 1000,
        }
    }
}

/// Compiles a resolved SELECT into a plan tree
#[derive(Debug)]
pub struct Planner {
    config: PlannerConfig,
    stats: StatsSnapshot,
}

impl Planner {
    pub fn new(config: PlannerConfig, stats: StatsSnapshot) -> Self {
        Self { config, stats }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a resolved SELECT statement
    pub fn plan_select(&self, resolved: &ResolvedSelect) -> Result<PlanOp> {
        let graph = PatternGraph::build(resolved)?;

        // Split the WHERE clause: conjuncts touching exactly one node alias
        // are pushed to that alias's scan or expansion; the rest stay in a
        // residual filter above the joins.
        let mut pushed: HashMap<String, Vec<Expr>> = HashMap::new();
        let mut residual: Vec<Expr> = Vec::new();
        if let Some(predicate) = &resolved.predicate {
            for conjunct in predicate.conjuncts() {
                let mut aliases = Vec::new();
                conjunct.referenced_aliases(&mut aliases);
                match aliases.as_slice() {
                    [alias] if graph.alias_index(alias).is_some() => {
                        pushed.entry(alias.clone()).or_default().push(conjunct.clone());
                    }
                    _ => residual.push(conjunct.clone()),
                }
            }
        }

        let components = graph.components();
        if components.len() > 1 && !self.config.cross_join_disconnected {
            return Err(Error::Plan(format!(
                "pattern has {} disconnected components and cross joins are disabled",
                components.len()
            )));
        }

        let mut plan: Option<PlanOp> = None;
        for component in components {
            let sub = self.plan_component(&graph, &component, &pushed)?;
            plan = Some(match plan {
                Some(left) => PlanOp::CrossJoin {
                    left: Box::new(left),
                    right: Box::new(sub),
                },
                None => sub,
            });
        }
        let mut plan = plan.ok_or_else(|| Error::Plan("empty pattern".to_string()))?;

        if let Some(predicate) = Expr::conjoin(residual) {
            plan = PlanOp::Filter {
                input: Box::new(plan),
                predicate,
            };
        }

        plan = match &resolved.projection {
            Projection::Path => PlanOp::PathCollect {
                input: Box::new(plan),
            },
            Projection::Columns(items) => PlanOp::Project {
                input: Box::new(plan),
                items: items.clone(),
            },
        };
        Ok(plan)
    }

    /// Plan one connected component: seed scan plus greedy edge attachment
    fn plan_component(
        &self,
        graph: &PatternGraph,
        component: &[usize],
        pushed: &HashMap<String, Vec<Expr>>,
    ) -> Result<PlanOp> {
        let seed = component
            .iter()
            .copied()
            .min_by(|a, b| {
                let ea = self.estimate_node(&graph.nodes[*a], pushed);
                let eb = self.estimate_node(&graph.nodes[*b], pushed);
                ea.total_cmp(&eb)
            })
            .ok_or_else(|| Error::Plan("empty pattern component".to_string()))?;

        let seed_node = &graph.nodes[seed];
        let mut plan = PlanOp::Scan {
            alias: seed_node.alias.clone(),
            arms: seed_node.arms.clone(),
            filter: self.pushed_filter(&seed_node.alias, pushed),
        };
        let mut bound = vec![seed];

        let mut remaining: Vec<usize> = (0..graph.edges.len())
            .filter(|i| component.contains(&graph.edges[*i].source))
            .collect();

        while !remaining.is_empty() {
            let pick = self.pick_edge(graph, &remaining, &bound, pushed)?;
            remaining.retain(|i| *i != pick);
            let edge = &graph.edges[pick];

            let source_bound = bound.contains(&edge.source);
            let sink_bound = bound.contains(&edge.sink);
            // Expand from whichever endpoint is bound; a bound source walks
            // forward, a bound sink walks the reverse direction.
            let (from, to, direction) = if source_bound {
                (edge.source, edge.sink, Direction::Out)
            } else {
                (edge.sink, edge.source, Direction::In)
            };
            let check_target = source_bound && sink_bound;
            let to_alias = graph.nodes[to].alias.clone();

            // The target's pushed predicate applies per hop; once the alias
            // is bound it has already been enforced.
            let hop_filter = if check_target {
                None
            } else {
                self.pushed_filter(&to_alias, pushed)
            };

            plan = PlanOp::Expand {
                input: Box::new(plan),
                from_alias: graph.nodes[from].alias.clone(),
                to_alias,
                arms: edge.arms.clone(),
                direction,
                repetition: self.cap_repetition(edge.repetition)?,
                bound: edge.bound.clone(),
                check_target,
                hop_filter,
            };
            if !bound.contains(&to) {
                bound.push(to);
            }
        }

        // Isolated aliases in a connected component only happen when the
        // component is a single edge-less node, handled by the seed scan.
        Ok(plan)
    }

    /// Choose the next pattern edge to attach: an edge with both endpoints
    /// bound closes a cycle cheaply; otherwise prefer the target most
    /// narrowed by equality predicates, then the smallest estimate.
    fn pick_edge(
        &self,
        graph: &PatternGraph,
        remaining: &[usize],
        bound: &[usize],
        pushed: &HashMap<String, Vec<Expr>>,
    ) -> Result<usize> {
        let mut best: Option<(usize, (bool, usize, f64))> = None;
        for &idx in remaining {
            let edge = &graph.edges[idx];
            let source_bound = bound.contains(&edge.source);
            let sink_bound = bound.contains(&edge.sink);
            if !source_bound && !sink_bound {
                continue;
            }
            let target = if source_bound { edge.sink } else { edge.source };
            let target_node = &graph.nodes[target];
            let equalities = pushed
                .get(&target_node.alias)
                .map(|conjuncts| {
                    conjuncts
                        .iter()
                        .map(|c| c.equality_keys(&target_node.alias).len())
                        .sum()
                })
                .unwrap_or(0usize);
            // Sort key: cycle-closing first, more equalities next, then the
            // smaller estimated target set.
            let key = (
                !(source_bound && sink_bound),
                usize::MAX - equalities,
                self.estimate_node(target_node, pushed),
            );
            let better = match &best {
                Some((_, best_key)) => {
                    (key.0, key.1).cmp(&(best_key.0, best_key.1)).then_with(|| {
                        key.2.total_cmp(&best_key.2)
                    }) == std::cmp::Ordering::Less
                }
                None => true,
            };
            if better {
                best = Some((idx, key));
            }
        }
        best.map(|(idx, _)| idx).ok_or_else(|| {
            Error::Plan("no joinable pattern edge; pattern is disconnected".to_string())
        })
    }

    /// Estimated candidate count for an alias: per-arm label cardinality
    /// scaled by equality-predicate selectivities
    fn estimate_node(&self, node: &PatternNode, pushed: &HashMap<String, Vec<Expr>>) -> f64 {
        let mut equalities: Vec<(String, quiver_core::PropertyValue)> = Vec::new();
        if let Some(conjuncts) = pushed.get(&node.alias) {
            for conjunct in conjuncts {
                equalities.extend(conjunct.equality_keys(&node.alias));
            }
        }

        let mut total = 0.0;
        for arm in &node.arms {
            let stats = self.stats.get(&arm.label);
            let mut estimate = match stats {
                Some(stats) => stats.count as f64,
                None => {
                    warn!(label = %arm.label, "no statistics for label, assuming default cardinality");
                    self.default_cardinality()
                }
            };
            let mut arm_equalities = equalities.clone();
            if let Some(predicate) = &arm.predicate {
                arm_equalities.extend(predicate.equality_keys(&node.alias));
            }
            for (key, value) in &arm_equalities {
                let selectivity = stats
                    .and_then(|s| s.histogram(key))
                    .map(|h| h.equality_selectivity(value))
                    // Conservative default when nothing was collected
                    .unwrap_or(0.1);
                estimate *= selectivity;
            }
            total += estimate;
        }
        total
    }

    fn default_cardinality(&self) -> f64 {
        self.config.default_cardinality as f64
    }

    /// Substitute the safety cap for an unbounded repetition
    fn cap_repetition(&self, repetition: Repetition) -> Result<Repetition> {
        match repetition.max {
            Some(_) => Ok(repetition),
            None => match self.config.expansion_cap {
                Some(cap) => Ok(Repetition {
                    min: repetition.min,
                    max: Some(cap.max(repetition.min)),
                }),
                None => Err(Error::UnboundedExpansion(
                    "configure an expansion cap or give the repetition an upper bound"
                        .to_string(),
                )),
            },
        }
    }

    fn pushed_filter(
        &self,
        alias: &str,
        pushed: &HashMap<String, Vec<Expr>>,
    ) -> Option<Expr> {
        pushed
            .get(alias)
            .and_then(|conjuncts| Expr::conjoin(conjuncts.clone()))
    }
}
