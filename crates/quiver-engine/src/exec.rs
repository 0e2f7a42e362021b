//! Pull-based plan execution
//!
//! `execute_plan` turns a plan tree into a lazy row stream. Every `next()`
//! on the outer stream drives exactly the upstream pulls it needs, storage
//! reads happen on demand, and re-executing a plan re-issues them. The
//! cancel token is checked once per produced tuple.

use std::collections::HashSet;

use quiver_core::{Direction, Edge, Error, Node, Path, Result};
use quiver_query::{Expr, LabelArm, PlanOp, Repetition};
use quiver_store::{PropertyFilter, StorageAdapter};

use crate::cancel::CancelToken;
use crate::eval::{edge_arm_matches, eval_predicate, Binding, Row};

/// Lazy sequence of result rows
pub type RowStream<'a> = Box<dyn Iterator<Item = Result<Row>> + 'a>;

/// Everything an executing plan needs besides the plan itself
#[derive(Clone)]
pub struct ExecContext<'a> {
    pub adapter: &'a dyn StorageAdapter,
    pub cancel: CancelToken,
    /// Exclude node revisits within one in-flight expansion path
    pub simple_paths: bool,
}

impl<'a> ExecContext<'a> {
    pub fn new(adapter: &'a dyn StorageAdapter) -> Self {
        Self {
            adapter,
            cancel: CancelToken::new(),
            simple_paths: false,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Execute a plan, yielding rows lazily. Errors come through the stream;
/// a cancelled token surfaces as `Error::Cancelled` on the next pull.
pub fn execute_plan<'a>(plan: &'a PlanOp, ctx: ExecContext<'a>) -> RowStream<'a> {
    let cancel = ctx.cancel.clone();
    let inner = op_rows(plan, ctx);
    Box::new(inner.map(move |item| cancel.check().and(item)))
}

fn op_rows<'a>(plan: &'a PlanOp, ctx: ExecContext<'a>) -> RowStream<'a> {
    match plan {
        PlanOp::Scan { alias, arms, filter } => scan_rows(alias, arms, filter.as_ref(), ctx),
        PlanOp::Expand {
            input,
            from_alias,
            to_alias,
            arms,
            direction,
            repetition,
            bound,
            check_target,
            hop_filter,
        } => {
            let spec = ExpandSpec {
                from_alias,
                to_alias,
                arms,
                direction: *direction,
                repetition: *repetition,
                bound: bound.as_ref(),
                check_target: *check_target,
                hop_filter: hop_filter.as_ref(),
            };
            expand_rows(input, spec, ctx)
        }
        PlanOp::Filter { input, predicate } => {
            let inner = op_rows(input, ctx);
            Box::new(inner.filter_map(move |item| match item {
                Ok(row) => match eval_predicate(predicate, &row) {
                    Ok(true) => Some(Ok(row)),
                    Ok(false) => None,
                    Err(err) => Some(Err(err)),
                },
                Err(err) => Some(Err(err)),
            }))
        }
        PlanOp::CrossJoin { left, right } => cross_join_rows(left, right, ctx),
        // Projection shapes the materialized output, not the row stream
        PlanOp::Project { input, .. } | PlanOp::PathCollect { input } => op_rows(input, ctx),
        PlanOp::Branch { primary, fallback } => branch_rows(primary, fallback, ctx),
    }
}

// ========== Scan ==========

fn scan_rows<'a>(
    alias: &'a str,
    arms: &'a [LabelArm],
    filter: Option<&'a Expr>,
    ctx: ExecContext<'a>,
) -> RowStream<'a> {
    Box::new(arms.iter().flat_map(move |arm| {
        // Hand one equality to the backend; the rest evaluates here
        let pushed = filter.and_then(|f| first_equality(f, alias));
        let stream = match ctx.adapter.nodes_by_label(&arm.label, pushed.as_ref()) {
            Ok(stream) => stream,
            Err(err) => Box::new(std::iter::once(Err(err))) as _,
        };
        stream.filter_map(move |item| match item {
            Err(err) => Some(Err(err)),
            Ok(node) => {
                let mut row = Row::new();
                row.path = Some(Path::from_node(node.clone()));
                row.bind(alias, Binding::Node(node));
                match row_passes(&row, arm.predicate.as_ref(), filter) {
                    Ok(true) => Some(Ok(row)),
                    Ok(false) => None,
                    Err(err) => Some(Err(err)),
                }
            }
        })
    }))
}

fn row_passes(row: &Row, arm_predicate: Option<&Expr>, filter: Option<&Expr>) -> Result<bool> {
    if let Some(predicate) = arm_predicate {
        if !eval_predicate(predicate, row)? {
            return Ok(false);
        }
    }
    if let Some(predicate) = filter {
        if !eval_predicate(predicate, row)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn first_equality(filter: &Expr, alias: &str) -> Option<PropertyFilter> {
    filter
        .equality_keys(alias)
        .into_iter()
        .next()
        .map(|(key, value)| PropertyFilter::new(key, value))
}

// ========== Expand ==========

#[derive(Clone, Copy)]
struct ExpandSpec<'a> {
    from_alias: &'a str,
    to_alias: &'a str,
    arms: &'a [LabelArm],
    direction: Direction,
    repetition: Repetition,
    bound: Option<&'a String>,
    check_target: bool,
    hop_filter: Option<&'a Expr>,
}

fn expand_rows<'a>(input: &'a PlanOp, spec: ExpandSpec<'a>, ctx: ExecContext<'a>) -> RowStream<'a> {
    let inner = op_rows(input, ctx.clone());
    Box::new(inner.flat_map(move |item| match item {
        Err(err) => vec![Err(err)],
        Ok(row) => match expand_row(&row, spec, &ctx) {
            Ok(rows) => rows.into_iter().map(Ok).collect(),
            Err(err) => vec![Err(err)],
        },
    }))
}

/// One reached terminal: the node, the edge that got there, the hop count,
/// and the full segment trail from the expansion start
type Reached = (Node, Option<Edge>, u32, Vec<(Edge, Node)>);

/// Bounded iterative expansion from one row's bound start node.
///
/// Emits one result per distinct (terminal node, hop count). A hop filter
/// prunes the walk at the first failing node, so no path continues through
/// a node the filter rejects. With `simple_paths` a per-path visited set
/// excludes revisits; otherwise revisits are allowed and a visited
/// (node, hops) expansion set keeps cyclic data from looping forever.
fn expand_row(row: &Row, spec: ExpandSpec<'_>, ctx: &ExecContext<'_>) -> Result<Vec<Row>> {
    let start = row.node(spec.from_alias)?.clone();
    let min = spec.repetition.min;
    let max = spec
        .repetition
        .max
        .ok_or_else(|| Error::Internal("expansion without an upper bound".to_string()))?;

    let mut emitted: HashSet<(u64, u32)> = HashSet::new();
    let mut expanded: HashSet<(u64, u32)> = HashSet::new();
    let mut reached: Vec<Reached> = Vec::new();

    if min == 0 && emitted.insert((start.id.as_internal(), 0)) {
        reached.push((start.clone(), None, 0, Vec::new()));
    }

    let initial_visited = ctx
        .simple_paths
        .then(|| HashSet::from([start.id.as_internal()]));
    let mut stack: Vec<(Node, u32, Vec<(Edge, Node)>, Option<HashSet<u64>>)> =
        vec![(start, 0, Vec::new(), initial_visited)];

    while let Some((node, hops, segments, visited)) = stack.pop() {
        if hops >= max {
            continue;
        }
        // Re-expanding the same (node, hops) state cannot reach anything
        // new; skipping it bounds the walk on cyclic data. Simple-path
        // states differ by their visited sets and are not deduplicated.
        if visited.is_none() && !expanded.insert((node.id.as_internal(), hops)) {
            continue;
        }
        for arm in spec.arms {
            let entries = ctx.adapter.adjacency(node.id, &arm.label, spec.direction)?;
            for entry in entries {
                let entry = entry?;
                if let Some(visited) = &visited {
                    if visited.contains(&entry.target.as_internal()) {
                        continue;
                    }
                }
                let edge = match spec.direction {
                    Direction::Out => Edge::with_properties(
                        entry.edge_id,
                        arm.label.clone(),
                        node.id,
                        entry.target,
                        entry.properties.clone(),
                    ),
                    Direction::In => Edge::with_properties(
                        entry.edge_id,
                        arm.label.clone(),
                        entry.target,
                        node.id,
                        entry.properties.clone(),
                    ),
                };
                if let Some(predicate) = &arm.predicate {
                    if !edge_arm_matches(predicate, arm.label.name(), &edge)? {
                        continue;
                    }
                }
                let target = ctx.adapter.node(entry.target)?.ok_or_else(|| {
                    Error::Storage(format!(
                        "adjacency references missing node {}",
                        entry.target
                    ))
                })?;
                if let Some(filter) = spec.hop_filter {
                    let mut trial = row.clone();
                    trial.bind(spec.to_alias, Binding::Node(target.clone()));
                    if !eval_predicate(filter, &trial)? {
                        continue;
                    }
                }
                let next_hops = hops + 1;
                let mut next_segments = segments.clone();
                next_segments.push((edge.clone(), target.clone()));
                if next_hops >= min && emitted.insert((target.id.as_internal(), next_hops)) {
                    reached.push((target.clone(), Some(edge), next_hops, next_segments.clone()));
                }
                if next_hops < max {
                    let next_visited = visited.clone().map(|mut set| {
                        set.insert(target.id.as_internal());
                        set
                    });
                    stack.push((target, next_hops, next_segments, next_visited));
                }
            }
        }
    }

    let mut out = Vec::new();
    for (terminal, last_edge, _hops, segments) in reached {
        if spec.check_target && row.node(spec.to_alias)?.id != terminal.id {
            continue;
        }
        let mut out_row = row.clone();
        if !spec.check_target {
            out_row.bind(spec.to_alias, Binding::Node(terminal));
        }
        if let (Some(name), Some(edge)) = (spec.bound, last_edge) {
            out_row.bind(name.clone(), Binding::Edge(edge));
        }
        if let Some(path) = &mut out_row.path {
            for (edge, node) in segments {
                path.extend(edge, node);
            }
        }
        out.push(out_row);
    }
    Ok(out)
}

// ========== Join and branch ==========

/// The right side materializes up front; the left streams through it.
fn cross_join_rows<'a>(left: &'a PlanOp, right: &'a PlanOp, ctx: ExecContext<'a>) -> RowStream<'a> {
    let right_rows: Result<Vec<Row>> = op_rows(right, ctx.clone()).collect();
    let right_rows = match right_rows {
        Ok(rows) => rows,
        Err(err) => return Box::new(std::iter::once(Err(err))),
    };
    let inner = op_rows(left, ctx);
    Box::new(inner.flat_map(move |item| match item {
        Ok(row) => right_rows
            .iter()
            .map(|right| {
                let mut combined = row.clone();
                combined.absorb(right.clone());
                Ok(combined)
            })
            .collect::<Vec<_>>(),
        Err(err) => vec![Err(err)],
    }))
}

/// Pull one row ahead: a non-empty primary wins outright, otherwise the
/// fallback runs
fn branch_rows<'a>(primary: &'a PlanOp, fallback: &'a PlanOp, ctx: ExecContext<'a>) -> RowStream<'a> {
    let mut first = op_rows(primary, ctx.clone());
    match first.next() {
        Some(item) => Box::new(std::iter::once(item).chain(first)),
        None => op_rows(fallback, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_core::{Label, NodeId, PropertyMap};
    use quiver_store::MemoryAdapter;

    fn node(adapter: &MemoryAdapter, label: &str, name: &str, system: &str) -> NodeId {
        let mut props = PropertyMap::new();
        props.set("name", name);
        props.set("system", system);
        adapter.create_node(&Label::new(label), props).unwrap()
    }

    fn chain_fixture() -> (MemoryAdapter, Vec<NodeId>) {
        // A -> B -> C -> D along "develop"; D sits in another system
        let adapter = MemoryAdapter::new();
        let a = node(&adapter, "App", "A", "S1");
        let b = node(&adapter, "App", "B", "S1");
        let c = node(&adapter, "App", "C", "S1");
        let d = node(&adapter, "App", "D", "S2");
        let develop = Label::new("develop");
        for (src, dst) in [(a, b), (b, c), (c, d)] {
            adapter
                .create_edge(src, dst, &develop, PropertyMap::new())
                .unwrap();
        }
        (adapter, vec![a, b, c, d])
    }

    fn scan(alias: &str, label: &str, filter: Option<Expr>) -> PlanOp {
        PlanOp::Scan {
            alias: alias.to_string(),
            arms: vec![LabelArm::new(label)],
            filter,
        }
    }

    fn expand(input: PlanOp, from: &str, to: &str, repetition: Repetition, hop_filter: Option<Expr>) -> PlanOp {
        PlanOp::Expand {
            input: Box::new(input),
            from_alias: from.to_string(),
            to_alias: to.to_string(),
            arms: vec![LabelArm::new("develop")],
            direction: Direction::Out,
            repetition,
            bound: None,
            check_target: false,
            hop_filter,
        }
    }

    fn collect(plan: &PlanOp, adapter: &MemoryAdapter) -> Vec<Row> {
        execute_plan(plan, ExecContext::new(adapter))
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    fn names(rows: &[Row], alias: &str) -> Vec<String> {
        let mut out: Vec<String> = rows
            .iter()
            .map(|row| {
                row.node(alias)
                    .unwrap()
                    .get_property("name")
                    .and_then(|v| v.as_str())
                    .unwrap()
                    .to_string()
            })
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_scan_with_filter() {
        let (adapter, _) = chain_fixture();
        let plan = scan("n", "App", Some(Expr::property_eq("n", "system", "S1")));
        let rows = collect(&plan, &adapter);
        assert_eq!(names(&rows, "n"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_single_hop_expand() {
        let (adapter, _) = chain_fixture();
        let plan = expand(
            scan("a", "App", Some(Expr::property_eq("a", "name", "A"))),
            "a",
            "b",
            Repetition::single(),
            None,
        );
        let rows = collect(&plan, &adapter);
        assert_eq!(names(&rows, "b"), vec!["B"]);
    }

    #[test]
    fn test_bounded_expansion_hop_range() {
        let (adapter, _) = chain_fixture();
        let plan = expand(
            scan("a", "App", Some(Expr::property_eq("a", "name", "A"))),
            "a",
            "t",
            Repetition::range(2, 3),
            None,
        );
        let rows = collect(&plan, &adapter);
        assert_eq!(names(&rows, "t"), vec!["C", "D"]);
    }

    #[test]
    fn test_hop_filter_prunes_the_walk() {
        let (adapter, _) = chain_fixture();
        let plan = expand(
            scan("a", "App", Some(Expr::property_eq("a", "name", "A"))),
            "a",
            "t",
            Repetition::range(1, 10),
            Some(Expr::property_eq("t", "system", "S1")),
        );
        let rows = collect(&plan, &adapter);
        // D fails the filter and nothing beyond it is reachable
        assert_eq!(names(&rows, "t"), vec!["B", "C"]);
    }

    #[test]
    fn test_expansion_terminates_on_cycles() {
        let adapter = MemoryAdapter::new();
        let a = node(&adapter, "App", "A", "S1");
        let b = node(&adapter, "App", "B", "S1");
        let develop = Label::new("develop");
        adapter.create_edge(a, b, &develop, PropertyMap::new()).unwrap();
        adapter.create_edge(b, a, &develop, PropertyMap::new()).unwrap();

        let plan = expand(
            scan("a", "App", Some(Expr::property_eq("a", "name", "A"))),
            "a",
            "t",
            Repetition::range(1, 50),
            None,
        );
        let rows = collect(&plan, &adapter);
        // One row per distinct (terminal, hop count): A at even hops,
        // B at odd hops, within the bound
        assert_eq!(rows.len(), 50);
    }

    #[test]
    fn test_simple_paths_exclude_revisits() {
        let adapter = MemoryAdapter::new();
        let a = node(&adapter, "App", "A", "S1");
        let b = node(&adapter, "App", "B", "S1");
        let develop = Label::new("develop");
        adapter.create_edge(a, b, &develop, PropertyMap::new()).unwrap();
        adapter.create_edge(b, a, &develop, PropertyMap::new()).unwrap();

        let plan = expand(
            scan("a", "App", Some(Expr::property_eq("a", "name", "A"))),
            "a",
            "t",
            Repetition::range(1, 50),
            None,
        );
        let mut ctx = ExecContext::new(&adapter);
        ctx.simple_paths = true;
        let rows: Vec<Row> = execute_plan(&plan, ctx).collect::<Result<Vec<_>>>().unwrap();
        // Only A -> B survives; returning to A would revisit the start
        assert_eq!(names(&rows, "t"), vec!["B"]);
    }

    #[test]
    fn test_expand_collects_path() {
        let (adapter, _) = chain_fixture();
        let plan = expand(
            scan("a", "App", Some(Expr::property_eq("a", "name", "A"))),
            "a",
            "t",
            Repetition::range(2, 2),
            None,
        );
        let rows = collect(&plan, &adapter);
        assert_eq!(rows.len(), 1);
        let path = rows[0].path.as_ref().unwrap();
        let names: Vec<&str> = path
            .nodes()
            .map(|n| n.get_property("name").and_then(|v| v.as_str()).unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_check_target_closes_cycle() {
        let (adapter, ids) = chain_fixture();
        // b is already bound; a second expand must agree with it
        let inner = expand(
            scan("a", "App", Some(Expr::property_eq("a", "name", "A"))),
            "a",
            "b",
            Repetition::single(),
            None,
        );
        let plan = PlanOp::Expand {
            input: Box::new(inner),
            from_alias: "a".to_string(),
            to_alias: "b".to_string(),
            arms: vec![LabelArm::new("develop")],
            direction: Direction::Out,
            repetition: Repetition::single(),
            bound: None,
            check_target: true,
            hop_filter: None,
        };
        let rows = collect(&plan, &adapter);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].node("b").unwrap().id, ids[1]);
    }

    #[test]
    fn test_reverse_expansion() {
        let (adapter, ids) = chain_fixture();
        let plan = PlanOp::Expand {
            input: Box::new(scan("b", "App", Some(Expr::property_eq("b", "name", "B")))),
            from_alias: "b".to_string(),
            to_alias: "a".to_string(),
            arms: vec![LabelArm::new("develop")],
            direction: Direction::In,
            repetition: Repetition::single(),
            bound: None,
            check_target: false,
            hop_filter: None,
        };
        let rows = collect(&plan, &adapter);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].node("a").unwrap().id, ids[0]);
    }

    #[test]
    fn test_cross_join_combines_bindings() {
        let (adapter, _) = chain_fixture();
        let plan = PlanOp::CrossJoin {
            left: Box::new(scan("x", "App", Some(Expr::property_eq("x", "system", "S1")))),
            right: Box::new(scan("y", "App", Some(Expr::property_eq("y", "system", "S2")))),
        };
        let rows = collect(&plan, &adapter);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.binding("y").is_some()));
    }

    #[test]
    fn test_branch_prefers_primary() {
        let (adapter, _) = chain_fixture();
        let primary = scan("n", "App", Some(Expr::property_eq("n", "system", "S2")));
        let fallback = scan("n", "App", Some(Expr::property_eq("n", "system", "S1")));
        let plan = PlanOp::Branch {
            primary: Box::new(primary),
            fallback: Box::new(fallback),
        };
        let rows = collect(&plan, &adapter);
        assert_eq!(names(&rows, "n"), vec!["D"]);
    }

    #[test]
    fn test_branch_falls_back_when_empty() {
        let (adapter, _) = chain_fixture();
        let primary = scan("n", "App", Some(Expr::property_eq("n", "system", "S9")));
        let fallback = scan("n", "App", Some(Expr::property_eq("n", "name", "A")));
        let plan = PlanOp::Branch {
            primary: Box::new(primary),
            fallback: Box::new(fallback),
        };
        let rows = collect(&plan, &adapter);
        assert_eq!(names(&rows, "n"), vec!["A"]);
    }

    #[test]
    fn test_cancellation_aborts_next_pull() {
        let (adapter, _) = chain_fixture();
        let plan = scan("n", "App", None);
        let token = CancelToken::new();
        let ctx = ExecContext::new(&adapter).with_cancel(token.clone());
        let mut stream = execute_plan(&plan, ctx);

        assert!(stream.next().unwrap().is_ok());
        token.cancel();
        match stream.next() {
            Some(Err(Error::Cancelled)) => {}
            other => panic!("expected cancellation, got {other:?}"),
        }
    }

    #[test]
    fn test_restartable_execution() {
        let (adapter, _) = chain_fixture();
        let plan = scan("n", "App", None);
        let first: usize = execute_plan(&plan, ExecContext::new(&adapter)).count();
        let second: usize = execute_plan(&plan, ExecContext::new(&adapter)).count();
        assert_eq!(first, 4);
        assert_eq!(first, second);
    }
}
