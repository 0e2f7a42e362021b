//! Statement and traversal entry point
//!
//! A session owns the view catalog, the statistics cache, and the planner
//! configuration for one adapter. Both front ends meet here: query text is
//! parsed, resolved, planned, and executed; a fluent traversal is compiled
//! and executed against the same machinery. Mutations refresh the
//! statistics cache once they finish.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};

use quiver_core::{EdgeId, Error, Label, NodeId, PropertyMap, Result};
use quiver_query::{
    parse, parse_statement, Expr, Planner, PlannerConfig, Projection, SelectItem, SelectStmt,
    SourceDecl, Statement, ViewCatalog,
};
use quiver_store::{StatisticsCache, StorageAdapter};

use crate::cancel::CancelToken;
use crate::eval::{Binding, Row};
use crate::exec::{execute_plan, ExecContext};
use crate::result::{binding_json, path_records, value_json, BulkReport, PathRecord, ResultSet};
use crate::traversal::{CompiledEdgeTarget, CompiledTraversal, Traversal, TraversalOutput};

/// Bound name synthesized for DELETE EDGE statements that do not name the
/// edge themselves
const DELETE_EDGE_BOUND: &str = "__edge";

/// What one executed statement or traversal produced
#[derive(Debug)]
pub enum Output {
    /// SELECT with a column projection
    Rows(ResultSet),
    /// SELECT PATH, one record list per result
    Paths(Vec<Vec<PathRecord>>),
    /// INSERT or DELETE, with per-item failures
    Mutation(BulkReport),
    /// CREATE VIEW, carrying the view's name
    ViewCreated(String),
}

/// One adapter plus the state queries against it share
pub struct Session {
    adapter: Arc<dyn StorageAdapter>,
    catalog: ViewCatalog,
    stats: StatisticsCache,
    config: PlannerConfig,
}

impl Session {
    pub fn new(adapter: Arc<dyn StorageAdapter>) -> Self {
        Self::with_config(adapter, PlannerConfig::default())
    }

    pub fn with_config(adapter: Arc<dyn StorageAdapter>, config: PlannerConfig) -> Self {
        Self {
            adapter,
            catalog: ViewCatalog::new(),
            stats: StatisticsCache::new(),
            config,
        }
    }

    pub fn catalog(&self) -> &ViewCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Execute one statement of query text
    pub fn execute(&self, text: &str) -> Result<Output> {
        self.execute_cancellable(text, CancelToken::new())
    }

    /// Execute one statement, abortable through the token
    pub fn execute_cancellable(&self, text: &str, cancel: CancelToken) -> Result<Output> {
        let statement = parse_statement(text)?;
        self.run_statement(&statement, cancel)
    }

    /// Execute a semicolon-separated script, stopping at the first failure
    pub fn execute_script(&self, text: &str) -> Result<Vec<Output>> {
        let statements = parse(text)?;
        let mut outputs = Vec::with_capacity(statements.len());
        for statement in &statements {
            outputs.push(self.run_statement(statement, CancelToken::new())?);
        }
        Ok(outputs)
    }

    /// Plan a SELECT and render the operator tree without executing it
    pub fn explain(&self, text: &str) -> Result<String> {
        match parse_statement(text)? {
            Statement::Select(stmt) => {
                let resolved = self.catalog.resolve_select(&stmt, self.adapter.as_ref())?;
                let plan = self.planner(self.config.clone()).plan_select(&resolved)?;
                Ok(plan.explain())
            }
            _ => Err(Error::Plan(
                "only SELECT statements can be explained".to_string(),
            )),
        }
    }

    /// Execute a fluent traversal
    pub fn traverse(&self, traversal: &Traversal) -> Result<Output> {
        self.traverse_cancellable(traversal, CancelToken::new())
    }

    /// Execute a fluent traversal, abortable through the token
    pub fn traverse_cancellable(
        &self,
        traversal: &Traversal,
        cancel: CancelToken,
    ) -> Result<Output> {
        let compiled = traversal.compile(&self.catalog, self.adapter.as_ref(), &self.config)?;
        match compiled {
            CompiledTraversal::CreateNode { label, properties } => {
                let mut report = BulkReport::default();
                match self.adapter.create_node(&label, properties) {
                    Ok(id) => {
                        debug!(%id, %label, "traversal created node");
                        report.record_ok();
                    }
                    Err(err) => report.record_err(err),
                }
                self.refresh_statistics()?;
                Ok(Output::Mutation(report))
            }
            CompiledTraversal::Query { plan, output } => {
                self.run_traversal_query(&plan, &output, cancel)
            }
        }
    }

    /// Rebuild the statistics snapshot from the adapter
    pub fn refresh_statistics(&self) -> Result<()> {
        self.stats.refresh(self.adapter.as_ref())
    }

    fn planner(&self, config: PlannerConfig) -> Planner {
        Planner::new(config, self.stats.snapshot())
    }

    fn exec_context(&self, cancel: CancelToken) -> ExecContext<'_> {
        ExecContext {
            adapter: self.adapter.as_ref(),
            cancel,
            simple_paths: self.config.simple_paths,
        }
    }

    fn run_statement(&self, statement: &Statement, cancel: CancelToken) -> Result<Output> {
        match statement {
            Statement::Select(stmt) => self.run_select(stmt, cancel),
            Statement::InsertNode(stmt) => {
                let label = Label::new(stmt.label.clone());
                let mut report = BulkReport::default();
                for row in &stmt.values {
                    let properties: PropertyMap = stmt
                        .columns
                        .iter()
                        .zip(row)
                        .map(|(key, literal)| (key.clone(), literal.to_value()))
                        .collect();
                    match self.adapter.create_node(&label, properties) {
                        Ok(_) => report.record_ok(),
                        Err(err) => report.record_err(err),
                    }
                }
                info!(label = %label, inserted = report.succeeded(), "insert nodes");
                self.refresh_statistics()?;
                Ok(Output::Mutation(report))
            }
            Statement::InsertEdge(stmt) => {
                // The two endpoint sources carry no MATCH between them, so
                // their cross product is the intended candidate set.
                let select = SelectStmt {
                    projection: Projection::Columns(vec![
                        alias_item(&stmt.source_alias),
                        alias_item(&stmt.sink_alias),
                    ]),
                    from: stmt.from.clone(),
                    matches: vec![],
                    predicate: stmt.predicate.clone(),
                };
                let rows = self.match_rows(&select, cancel, true)?;

                let label = Label::new(stmt.edge_label.clone());
                let properties: PropertyMap = stmt
                    .properties
                    .iter()
                    .map(|(key, literal)| (key.clone(), literal.to_value()))
                    .collect();
                let mut report = BulkReport::default();
                for row in &rows {
                    let endpoints = row
                        .node(&stmt.source_alias)
                        .map(|n| n.id)
                        .and_then(|src| row.node(&stmt.sink_alias).map(|snk| (src, snk.id)));
                    match endpoints.and_then(|(src, snk)| {
                        self.adapter.create_edge(src, snk, &label, properties.clone())
                    }) {
                        Ok(_) => report.record_ok(),
                        Err(err) => report.record_err(err),
                    }
                }
                info!(label = %label, inserted = report.succeeded(), "insert edges");
                self.refresh_statistics()?;
                Ok(Output::Mutation(report))
            }
            Statement::DeleteNodes(stmt) => {
                // The label name doubles as the alias WHERE refers to
                let select = SelectStmt {
                    projection: Projection::Columns(vec![alias_item(&stmt.label)]),
                    from: vec![SourceDecl {
                        label: Some(stmt.label.clone()),
                        alias: stmt.label.clone(),
                    }],
                    matches: vec![],
                    predicate: stmt.predicate.clone(),
                };
                let rows = self.match_rows(&select, cancel, false)?;

                let mut seen: HashSet<NodeId> = HashSet::new();
                let mut report = BulkReport::default();
                for row in &rows {
                    let id = row.node(&stmt.label)?.id;
                    if !seen.insert(id) {
                        continue;
                    }
                    match self.adapter.delete_node(id) {
                        Ok(()) => report.record_ok(),
                        Err(err) => report.record_err(err),
                    }
                }
                info!(label = %stmt.label, deleted = report.succeeded(), "delete nodes");
                self.refresh_statistics()?;
                Ok(Output::Mutation(report))
            }
            Statement::DeleteEdge(stmt) => {
                let mut edge = stmt.edge.clone();
                let bound = edge
                    .bound
                    .get_or_insert_with(|| DELETE_EDGE_BOUND.to_string())
                    .clone();
                let select = SelectStmt {
                    projection: Projection::Columns(vec![alias_item(&bound)]),
                    from: stmt.from.clone(),
                    matches: vec![edge],
                    predicate: stmt.predicate.clone(),
                };
                let rows = self.match_rows(&select, cancel, true)?;

                let mut seen: HashSet<EdgeId> = HashSet::new();
                let mut report = BulkReport::default();
                for row in &rows {
                    let id = match row.binding(&bound) {
                        Some(Binding::Edge(edge)) => edge.id,
                        _ => {
                            return Err(Error::Internal(format!(
                                "bound name '{bound}' did not bind an edge"
                            )))
                        }
                    };
                    if !seen.insert(id) {
                        continue;
                    }
                    match self.adapter.delete_edge(id) {
                        Ok(()) => report.record_ok(),
                        Err(err) => report.record_err(err),
                    }
                }
                info!(label = %stmt.edge.label, deleted = report.succeeded(), "delete edges");
                self.refresh_statistics()?;
                Ok(Output::Mutation(report))
            }
            Statement::CreateNodeView(stmt) => {
                self.catalog.define_node_view(stmt)?;
                info!(view = %stmt.name, "defined node view");
                Ok(Output::ViewCreated(stmt.name.clone()))
            }
            Statement::CreateEdgeView(stmt) => {
                self.catalog.define_edge_view(stmt)?;
                info!(view = %stmt.name, "defined edge view");
                Ok(Output::ViewCreated(stmt.name.clone()))
            }
        }
    }

    fn run_select(&self, stmt: &SelectStmt, cancel: CancelToken) -> Result<Output> {
        let resolved = self.catalog.resolve_select(stmt, self.adapter.as_ref())?;
        let plan = self.planner(self.config.clone()).plan_select(&resolved)?;
        let ctx = self.exec_context(cancel);

        match &resolved.projection {
            Projection::Path => {
                let mut paths = Vec::new();
                for item in execute_plan(&plan, ctx) {
                    let row = item?;
                    let path = row.path.as_ref().ok_or_else(|| {
                        Error::Internal("path projection produced a row without a path".to_string())
                    })?;
                    paths.push(path_records(path));
                }
                Ok(Output::Paths(paths))
            }
            Projection::Columns(items) => {
                let columns = items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| column_name(item, idx))
                    .collect();
                let mut rows = Vec::new();
                for row_item in execute_plan(&plan, ctx) {
                    let row = row_item?;
                    let mut cells = Vec::with_capacity(items.len());
                    for item in items {
                        cells.push(project_cell(&item.expr, &row)?);
                    }
                    rows.push(cells);
                }
                Ok(Output::Rows(ResultSet { columns, rows }))
            }
        }
    }

    /// Plan and execute an internal match, collecting every row before the
    /// caller mutates anything. `cross_join` lets endpoint sources stand
    /// without a connecting MATCH edge.
    fn match_rows(
        &self,
        select: &SelectStmt,
        cancel: CancelToken,
        cross_join: bool,
    ) -> Result<Vec<Row>> {
        let resolved = self.catalog.resolve_select(select, self.adapter.as_ref())?;
        let config = PlannerConfig {
            cross_join_disconnected: cross_join || self.config.cross_join_disconnected,
            ..self.config.clone()
        };
        let plan = self.planner(config).plan_select(&resolved)?;
        execute_plan(&plan, self.exec_context(cancel)).collect()
    }

    fn run_traversal_query(
        &self,
        plan: &quiver_query::PlanOp,
        output: &TraversalOutput,
        cancel: CancelToken,
    ) -> Result<Output> {
        let ctx = self.exec_context(cancel);
        match output {
            TraversalOutput::Entities { alias } => {
                let mut rows = Vec::new();
                for item in execute_plan(plan, ctx) {
                    let row = item?;
                    let binding = row.binding(alias).ok_or_else(|| {
                        Error::Internal(format!("alias '{alias}' is not bound"))
                    })?;
                    rows.push(vec![binding_json(binding)]);
                }
                Ok(Output::Rows(ResultSet {
                    columns: vec![alias.clone()],
                    rows,
                }))
            }
            TraversalOutput::Columns { aliases } => {
                let mut rows = Vec::new();
                for item in execute_plan(plan, ctx) {
                    let row = item?;
                    let mut cells = Vec::with_capacity(aliases.len());
                    for alias in aliases {
                        let binding = row.binding(alias).ok_or_else(|| {
                            Error::Internal(format!("alias '{alias}' is not bound"))
                        })?;
                        cells.push(binding_json(binding));
                    }
                    rows.push(cells);
                }
                Ok(Output::Rows(ResultSet {
                    columns: aliases.clone(),
                    rows,
                }))
            }
            TraversalOutput::Values { alias, key } => {
                let mut rows = Vec::new();
                for item in execute_plan(plan, ctx) {
                    let row = item?;
                    let binding = row.binding(alias).ok_or_else(|| {
                        Error::Internal(format!("alias '{alias}' is not bound"))
                    })?;
                    let cell = binding
                        .properties()
                        .get(key)
                        .map(value_json)
                        .unwrap_or(Value::Null);
                    rows.push(vec![cell]);
                }
                Ok(Output::Rows(ResultSet {
                    columns: vec![key.clone()],
                    rows,
                }))
            }
            TraversalOutput::Paths => {
                let mut paths = Vec::new();
                for item in execute_plan(plan, ctx) {
                    let row = item?;
                    let path = row.path.as_ref().ok_or_else(|| {
                        Error::Internal("traversal path output without a path".to_string())
                    })?;
                    paths.push(path_records(path));
                }
                Ok(Output::Paths(paths))
            }
            TraversalOutput::Drop { alias } => {
                let rows: Vec<Row> = execute_plan(plan, ctx).collect::<Result<_>>()?;
                let mut seen_nodes: HashSet<NodeId> = HashSet::new();
                let mut seen_edges: HashSet<EdgeId> = HashSet::new();
                let mut report = BulkReport::default();
                for row in &rows {
                    let outcome = match row.binding(alias) {
                        Some(Binding::Node(node)) => {
                            if !seen_nodes.insert(node.id) {
                                continue;
                            }
                            self.adapter.delete_node(node.id)
                        }
                        Some(Binding::Edge(edge)) => {
                            if !seen_edges.insert(edge.id) {
                                continue;
                            }
                            self.adapter.delete_edge(edge.id)
                        }
                        None => Err(Error::Internal(format!("alias '{alias}' is not bound"))),
                    };
                    match outcome {
                        Ok(()) => report.record_ok(),
                        Err(err) => report.record_err(err),
                    }
                }
                info!(deleted = report.succeeded(), "traversal drop");
                self.refresh_statistics()?;
                Ok(Output::Mutation(report))
            }
            TraversalOutput::AddEdge {
                source_alias,
                label,
                properties,
                target,
                direction,
            } => {
                let rows: Vec<Row> = execute_plan(plan, ctx).collect::<Result<_>>()?;
                let mut report = BulkReport::default();
                for row in &rows {
                    let outcome = self.traversal_edge(
                        row,
                        source_alias,
                        label,
                        properties,
                        target,
                        *direction,
                    );
                    match outcome {
                        Ok(()) => report.record_ok(),
                        Err(err) => report.record_err(err),
                    }
                }
                info!(label = %label, inserted = report.succeeded(), "traversal add edge");
                self.refresh_statistics()?;
                Ok(Output::Mutation(report))
            }
        }
    }

    /// Create one edge for a traversal row. A `New` target creates its node
    /// first, so the edge always has both endpoints.
    fn traversal_edge(
        &self,
        row: &Row,
        source_alias: &str,
        label: &Label,
        properties: &PropertyMap,
        target: &CompiledEdgeTarget,
        direction: quiver_core::Direction,
    ) -> Result<()> {
        let here = row.node(source_alias)?.id;
        let there = match target {
            CompiledEdgeTarget::Bound(name) => row.node(name)?.id,
            CompiledEdgeTarget::New {
                label: node_label,
                properties: node_properties,
            } => self
                .adapter
                .create_node(node_label, node_properties.clone())?,
        };
        let (src, snk) = match direction {
            quiver_core::Direction::Out => (here, there),
            quiver_core::Direction::In => (there, here),
        };
        self.adapter.create_edge(src, snk, label, properties.clone())?;
        Ok(())
    }
}

fn alias_item(alias: &str) -> SelectItem {
    SelectItem {
        expr: Expr::Alias(alias.to_string()),
        alias: None,
    }
}

/// Column heading for one projected item
fn column_name(item: &SelectItem, idx: usize) -> String {
    if let Some(alias) = &item.alias {
        return alias.clone();
    }
    match &item.expr {
        Expr::Alias(alias) => alias.clone(),
        Expr::Property { alias, key } => format!("{alias}.{key}"),
        _ => format!("column{idx}"),
    }
}

/// Materialize one projected cell
fn project_cell(expr: &Expr, row: &Row) -> Result<Value> {
    match expr {
        Expr::Alias(alias) => {
            let binding = row
                .binding(alias)
                .ok_or_else(|| Error::Internal(format!("alias '{alias}' is not bound")))?;
            Ok(binding_json(binding))
        }
        Expr::Property { alias, key } => {
            let binding = row
                .binding(alias)
                .ok_or_else(|| Error::Internal(format!("alias '{alias}' is not bound")))?;
            Ok(binding
                .properties()
                .get(key)
                .map(value_json)
                .unwrap_or(Value::Null))
        }
        Expr::Literal(literal) => Ok(value_json(&literal.to_value())),
        predicate => Ok(json!(crate::eval::eval_predicate(predicate, row)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_store::MemoryAdapter;

    fn session() -> Session {
        Session::new(Arc::new(MemoryAdapter::new()))
    }

    fn rows(output: Output) -> ResultSet {
        match output {
            Output::Rows(set) => set,
            other => panic!("expected rows, got {other:?}"),
        }
    }

    fn report(output: Output) -> BulkReport {
        match output {
            Output::Mutation(report) => report,
            other => panic!("expected a mutation report, got {other:?}"),
        }
    }

    #[test]
    fn test_insert_then_select() {
        let session = session();
        let inserted = report(
            session
                .execute("INSERT INTO App (name, system) VALUES ('A', 'S1'), ('B', 'S2')")
                .unwrap(),
        );
        assert_eq!(inserted.attempted, 2);
        assert!(inserted.all_ok());

        let set = rows(
            session
                .execute("SELECT a.name FROM App AS a WHERE a.system = 'S1'")
                .unwrap(),
        );
        assert_eq!(set.columns, vec!["a.name"]);
        assert_eq!(set.rows, vec![vec![json!("A")]]);
    }

    #[test]
    fn test_select_unknown_label_fails_before_execution() {
        let session = session();
        session
            .execute("INSERT INTO App (name) VALUES ('A')")
            .unwrap();
        let err = session.execute("SELECT p FROM Persn AS p").unwrap_err();
        assert!(matches!(err, Error::UnknownLabel(name) if name == "Persn"));
    }

    #[test]
    fn test_delete_then_requery_yields_zero_rows() {
        let session = session();
        session
            .execute("INSERT INTO App (name) VALUES ('A'), ('B')")
            .unwrap();
        let deleted = report(session.execute("DELETE FROM App").unwrap());
        assert_eq!(deleted.succeeded(), 2);

        // The label stays known; the query just matches nothing
        let set = rows(session.execute("SELECT a FROM App AS a").unwrap());
        assert!(set.is_empty());
    }

    #[test]
    fn test_insert_edge_between_matched_endpoints() {
        let session = session();
        session
            .execute_script(
                "INSERT INTO Team (name) VALUES ('core');
                 INSERT INTO App (name) VALUES ('A');",
            )
            .unwrap();
        let inserted = report(
            session
                .execute(
                    "INSERT EDGE INTO Team.develop SELECT t, a, since = 2020 \
                     FROM Team AS t, App AS a \
                     WHERE t.name = 'core' AND a.name = 'A'",
                )
                .unwrap(),
        );
        assert_eq!(inserted.attempted, 1);
        assert!(inserted.all_ok());

        let set = rows(
            session
                .execute(
                    "SELECT a.name, d.since FROM Team AS t, App AS a \
                     MATCH t-[develop AS d]->a",
                )
                .unwrap(),
        );
        assert_eq!(set.rows, vec![vec![json!("A"), json!(2020)]]);
    }

    #[test]
    fn test_delete_edge_then_match_is_empty() {
        let session = session();
        session
            .execute_script(
                "INSERT INTO App (name) VALUES ('A'), ('B');
                 INSERT EDGE INTO App.develop SELECT a, b FROM App AS a, App AS b \
                 WHERE a.name = 'A' AND b.name = 'B';",
            )
            .unwrap();

        let deleted = report(
            session
                .execute("DELETE EDGE a-[develop]->b FROM App AS a, App AS b")
                .unwrap(),
        );
        assert_eq!(deleted.succeeded(), 1);

        let set = rows(
            session
                .execute("SELECT b FROM App AS a, App AS b MATCH a-[develop]->b")
                .unwrap(),
        );
        assert!(set.is_empty());
    }

    #[test]
    fn test_node_view_unions_labels() {
        let session = session();
        session
            .execute_script(
                "INSERT INTO App (name, active) VALUES ('A', true), ('Old', false);
                 INSERT INTO Service (name) VALUES ('S');",
            )
            .unwrap();
        let created = session
            .execute(
                "CREATE NODE VIEW Software AS \
                 SELECT * FROM App a WHERE a.active = true \
                 UNION ALL SELECT * FROM Service",
            )
            .unwrap();
        assert!(matches!(created, Output::ViewCreated(name) if name == "Software"));

        let set = rows(
            session
                .execute("SELECT s.name FROM Software AS s")
                .unwrap(),
        );
        let mut names: Vec<&Value> = set.column("s.name").unwrap();
        names.sort_by_key(|v| v.as_str().map(str::to_string));
        assert_eq!(names, vec![&json!("A"), &json!("S")]);
    }

    #[test]
    fn test_path_projection() {
        let session = session();
        session
            .execute_script(
                "INSERT INTO App (name) VALUES ('A'), ('B');
                 INSERT EDGE INTO App.develop SELECT a, b FROM App AS a, App AS b \
                 WHERE a.name = 'A' AND b.name = 'B';",
            )
            .unwrap();

        let Output::Paths(paths) = session
            .execute("SELECT PATH FROM App AS a, App AS b MATCH a-[develop]->b")
            .unwrap()
        else {
            panic!("expected paths");
        };
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 3);
        assert_eq!(paths[0][1].kind, "edge");
    }

    #[test]
    fn test_explain_renders_plan() {
        let session = session();
        session
            .execute("INSERT INTO App (name) VALUES ('A')")
            .unwrap();
        let text = session
            .explain("SELECT a FROM App AS a WHERE a.name = 'A'")
            .unwrap();
        assert!(text.contains("Scan a [App]"));

        let err = session.explain("DELETE FROM App").unwrap_err();
        assert!(matches!(err, Error::Plan(_)));
    }

    #[test]
    fn test_traversal_values() {
        let session = session();
        session
            .execute_script(
                "INSERT INTO Team (name) VALUES ('core');
                 INSERT INTO App (name) VALUES ('A');
                 INSERT EDGE INTO Team.develop SELECT t, a FROM Team AS t, App AS a;",
            )
            .unwrap();

        let traversal = Traversal::source("Team").out("develop").values("name");
        let set = rows(session.traverse(&traversal).unwrap());
        assert_eq!(set.columns, vec!["name"]);
        assert_eq!(set.rows, vec![vec![json!("A")]]);
    }

    #[test]
    fn test_traversal_add_edge_to_new_node() {
        let session = session();
        session
            .execute("INSERT INTO App (name) VALUES ('A')")
            .unwrap();

        let traversal = Traversal::source("App")
            .has("name", "A")
            .add_edge("audits", PropertyMap::new())
            .to_new("Audit", PropertyMap::with("year", 2026i64));
        let added = report(session.traverse(&traversal).unwrap());
        assert!(added.all_ok());

        let set = rows(
            session
                .execute(
                    "SELECT x.year FROM App AS a, Audit AS x MATCH a-[audits]->x",
                )
                .unwrap(),
        );
        assert_eq!(set.rows, vec![vec![json!(2026)]]);
    }

    #[test]
    fn test_traversal_drop_nodes() {
        let session = session();
        session
            .execute("INSERT INTO App (name) VALUES ('A'), ('B')")
            .unwrap();

        let traversal = Traversal::source("App").has("name", "A").drop_();
        let dropped = report(session.traverse(&traversal).unwrap());
        assert_eq!(dropped.succeeded(), 1);

        let set = rows(session.execute("SELECT a.name FROM App AS a").unwrap());
        assert_eq!(set.rows, vec![vec![json!("B")]]);
    }

    #[test]
    fn test_script_stops_on_error() {
        let session = session();
        let err = session
            .execute_script(
                "INSERT INTO App (name) VALUES ('A');
                 SELECT x FROM Ghost AS x;
                 INSERT INTO App (name) VALUES ('B');",
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnknownLabel(_)));

        let set = rows(session.execute("SELECT a FROM App AS a").unwrap());
        assert_eq!(set.len(), 1);
    }
}
