//! Fluent traversal builder
//!
//! The imperative front end: an ordered chain of step descriptors compiled
//! into the same plan operators the statement planner emits. One builder
//! covers the whole capability set (filter, expand, bind, recall, repeat,
//! branch, collect) instead of parallel traversal flavors, and every
//! compiled plan runs against an explicit storage context.

use quiver_core::{Direction, Error, Label, PropertyMap, PropertyValue, Result};
use quiver_query::{
    BinaryOp, Expr, Literal, MatchEdge, PlanOp, PlannerConfig, Repetition, SourceDecl,
    ViewCatalog,
};
use quiver_store::StorageAdapter;

/// One step descriptor
#[derive(Debug, Clone)]
enum Step {
    /// Start from a label or view; `None` is the global node view
    Source(Option<String>),
    /// Property comparison on the current position
    Has {
        key: String,
        op: BinaryOp,
        value: PropertyValue,
    },
    Out(String),
    In(String),
    /// Bind the current position to a name
    As(String),
    /// Recall bound positions as result columns
    Select(Vec<String>),
    /// Emit one property of the current position
    Values(String),
    /// Emit the walked path
    Path,
    /// Repeat a sub-chain with a hop bound
    Repeat {
        sub: Vec<Step>,
        repetition: Repetition,
    },
    /// Try the primary sub-chain; fall back when it matches nothing
    Coalesce {
        primary: Vec<Step>,
        fallback: Vec<Step>,
    },
    /// Apply a sub-chain, then restore the current position
    Local(Vec<Step>),
    /// Create one node (standalone chain)
    AddNode {
        label: String,
        properties: PropertyMap,
    },
    /// Create an edge from the current position to a bound or new node
    AddEdge {
        label: String,
        properties: PropertyMap,
        target: EdgeTarget,
        direction: Direction,
    },
    /// Delete everything at the current position
    Drop,
}

#[derive(Debug, Clone)]
enum EdgeTarget {
    /// A previously bound alias
    Bound(String),
    /// A node created per matched row, before the edge that needs it
    New {
        label: String,
        properties: PropertyMap,
    },
}

/// A fluent traversal under construction
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    steps: Vec<Step>,
}

/// Pending `add_edge` awaiting its endpoint
#[derive(Debug)]
pub struct EdgeInsert {
    traversal: Traversal,
    label: String,
    properties: PropertyMap,
}

impl Traversal {
    /// Start from the nodes of a label or view
    pub fn source(label: impl Into<String>) -> Self {
        Self {
            steps: vec![Step::Source(Some(label.into()))],
        }
    }

    /// Start from every node regardless of label
    pub fn global() -> Self {
        Self {
            steps: vec![Step::Source(None)],
        }
    }

    /// A standalone chain that creates one node
    pub fn add_node(label: impl Into<String>, properties: PropertyMap) -> Self {
        Self {
            steps: vec![Step::AddNode {
                label: label.into(),
                properties,
            }],
        }
    }

    fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Keep positions whose property equals a value
    pub fn has(self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.has_cmp(key, BinaryOp::Eq, value)
    }

    /// Keep positions whose property satisfies a comparison
    pub fn has_cmp(
        self,
        key: impl Into<String>,
        op: BinaryOp,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.push(Step::Has {
            key: key.into(),
            op,
            value: value.into(),
        })
    }

    /// Expand along outgoing edges of a label or edge view
    pub fn out(self, label: impl Into<String>) -> Self {
        self.push(Step::Out(label.into()))
    }

    /// Expand along incoming edges of a label or edge view
    pub fn in_(self, label: impl Into<String>) -> Self {
        self.push(Step::In(label.into()))
    }

    /// Bind the current position to a name for later recall
    pub fn as_(self, name: impl Into<String>) -> Self {
        self.push(Step::As(name.into()))
    }

    /// Recall bound positions as the result columns
    pub fn select<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Step::Select(names.into_iter().map(Into::into).collect()))
    }

    /// Emit one property of the current position per result
    pub fn values(self, key: impl Into<String>) -> Self {
        self.push(Step::Values(key.into()))
    }

    /// Emit the walked path per result
    pub fn path(self) -> Self {
        self.push(Step::Path)
    }

    /// Repeat a sub-chain within a hop bound. The sub-chain must be one
    /// expansion step, optionally followed by filters applied at each hop.
    pub fn repeat(self, repetition: Repetition, build: impl FnOnce(Traversal) -> Traversal) -> Self {
        let sub = build(Traversal::default()).steps;
        self.push(Step::Repeat { sub, repetition })
    }

    /// Try the primary sub-chain; when it yields nothing, run the fallback
    pub fn coalesce(
        self,
        primary: impl FnOnce(Traversal) -> Traversal,
        fallback: impl FnOnce(Traversal) -> Traversal,
    ) -> Self {
        let primary = primary(Traversal::default()).steps;
        let fallback = fallback(Traversal::default()).steps;
        self.push(Step::Coalesce { primary, fallback })
    }

    /// Apply a sub-chain and restore the current position afterwards
    pub fn local(self, build: impl FnOnce(Traversal) -> Traversal) -> Self {
        let sub = build(Traversal::default()).steps;
        self.push(Step::Local(sub))
    }

    /// Create an edge per result; finish with `.to(name)` or `.from(name)`
    pub fn add_edge(self, label: impl Into<String>, properties: PropertyMap) -> EdgeInsert {
        EdgeInsert {
            traversal: self,
            label: label.into(),
            properties,
        }
    }

    /// Delete every node or edge at the current position
    pub fn drop_(self) -> Self {
        self.push(Step::Drop)
    }

    /// Compile the chain against a catalog and storage context
    pub fn compile(
        &self,
        catalog: &ViewCatalog,
        adapter: &dyn StorageAdapter,
        config: &PlannerConfig,
    ) -> Result<CompiledTraversal> {
        Compiler {
            catalog,
            adapter,
            config,
            counter: 0,
        }
        .compile(&self.steps)
    }
}

impl EdgeInsert {
    /// Point the new edge at a bound position
    pub fn to(self, name: impl Into<String>) -> Traversal {
        self.finish(EdgeTarget::Bound(name.into()), Direction::Out)
    }

    /// Point the new edge from a bound position to here
    pub fn from(self, name: impl Into<String>) -> Traversal {
        self.finish(EdgeTarget::Bound(name.into()), Direction::In)
    }

    /// Create the sink node together with the edge; the node creation is
    /// a prerequisite step of the same logical operation
    pub fn to_new(self, label: impl Into<String>, properties: PropertyMap) -> Traversal {
        self.finish(
            EdgeTarget::New {
                label: label.into(),
                properties,
            },
            Direction::Out,
        )
    }

    fn finish(self, target: EdgeTarget, direction: Direction) -> Traversal {
        let Self {
            traversal,
            label,
            properties,
        } = self;
        traversal.push(Step::AddEdge {
            label,
            properties,
            target,
            direction,
        })
    }
}

/// What a compiled traversal produces
#[derive(Debug, Clone)]
pub enum TraversalOutput {
    /// The entity at the final position
    Entities { alias: String },
    /// Recalled bound positions
    Columns { aliases: Vec<String> },
    /// One property of the final position
    Values { alias: String, key: String },
    /// The walked path
    Paths,
    /// Delete the entities at the final position
    Drop { alias: String },
    /// Create an edge per row
    AddEdge {
        source_alias: String,
        label: Label,
        properties: PropertyMap,
        target: CompiledEdgeTarget,
        direction: Direction,
    },
}

#[derive(Debug, Clone)]
pub enum CompiledEdgeTarget {
    Bound(String),
    New {
        label: Label,
        properties: PropertyMap,
    },
}

/// A traversal lowered to a plan, or a standalone node creation
#[derive(Debug, Clone)]
pub enum CompiledTraversal {
    Query {
        plan: PlanOp,
        output: TraversalOutput,
    },
    CreateNode {
        label: Label,
        properties: PropertyMap,
    },
}

struct Compiler<'a> {
    catalog: &'a ViewCatalog,
    adapter: &'a dyn StorageAdapter,
    config: &'a PlannerConfig,
    counter: u32,
}

impl Compiler<'_> {
    fn fresh(&mut self) -> String {
        let alias = format!("v{}", self.counter);
        self.counter += 1;
        alias
    }

    fn compile(mut self, steps: &[Step]) -> Result<CompiledTraversal> {
        if let [Step::AddNode { label, properties }] = steps {
            return Ok(CompiledTraversal::CreateNode {
                label: Label::new(label.clone()),
                properties: properties.clone(),
            });
        }

        let mut plan: Option<PlanOp> = None;
        let mut current: Option<String> = None;
        let mut output: Option<TraversalOutput> = None;

        let mut i = 0;
        while i < steps.len() {
            if output.is_some() {
                return Err(Error::Pattern(
                    "traversal continues after a terminal step".to_string(),
                ));
            }
            match &steps[i] {
                Step::Source(label) => {
                    if plan.is_some() {
                        return Err(Error::Pattern(
                            "source() must start the traversal".to_string(),
                        ));
                    }
                    let alias = self.take_alias(steps, &mut i);
                    let resolved = self.catalog.resolve_sources(
                        &[SourceDecl {
                            label: label.clone(),
                            alias: alias.clone(),
                        }],
                        self.adapter,
                    )?;
                    plan = Some(PlanOp::Scan {
                        alias: alias.clone(),
                        arms: resolved.into_iter().next().map(|s| s.arms).unwrap_or_default(),
                        filter: None,
                    });
                    current = Some(alias);
                }
                Step::Has { key, op, value } => {
                    let (input, alias) = self.positioned(plan.take(), &current)?;
                    plan = Some(PlanOp::Filter {
                        input: Box::new(input),
                        predicate: comparison(&alias, key, *op, value),
                    });
                }
                Step::Out(label) | Step::In(label) => {
                    let direction = match &steps[i] {
                        Step::Out(_) => Direction::Out,
                        _ => Direction::In,
                    };
                    let (input, from) = self.positioned(plan.take(), &current)?;
                    let alias = self.take_alias(steps, &mut i);
                    let next = self.expand(
                        input,
                        &from,
                        alias.clone(),
                        label,
                        direction,
                        Repetition::single(),
                        None,
                    )?;
                    plan = Some(next);
                    current = Some(alias);
                }
                Step::Repeat { sub, repetition } => {
                    let (input, from) = self.positioned(plan.take(), &current)?;
                    let alias = self.take_alias(steps, &mut i);
                    let (label, direction, hop_filter) =
                        self.repeat_body(sub, &alias)?;
                    let capped = self.capped(*repetition)?;
                    let next = self.expand(
                        input,
                        &from,
                        alias.clone(),
                        &label,
                        direction,
                        capped,
                        hop_filter,
                    )?;
                    plan = Some(next);
                    current = Some(alias);
                }
                Step::Coalesce { primary, fallback } => {
                    let (input, from) = self.positioned(plan.take(), &current)?;
                    let alias = self.take_alias(steps, &mut i);
                    let left = self.chain(input.clone(), from.clone(), primary, &alias)?;
                    let right = self.chain(input, from, fallback, &alias)?;
                    plan = Some(PlanOp::Branch {
                        primary: Box::new(left),
                        fallback: Box::new(right),
                    });
                    current = Some(alias);
                }
                Step::Local(sub) => {
                    let (input, from) = self.positioned(plan.take(), &current)?;
                    let alias = self.fresh();
                    let inner = self.chain(input, from.clone(), sub, &alias)?;
                    plan = Some(inner);
                    // position restored; the sub-chain's bindings remain
                    current = Some(from);
                }
                Step::As(_) => {
                    return Err(Error::Pattern(
                        "as() must follow a position step".to_string(),
                    ));
                }
                Step::Select(names) => {
                    let (input, _) = self.positioned(plan.take(), &current)?;
                    let bound = input.bound_aliases();
                    for name in names {
                        if !bound.contains(name) {
                            return Err(Error::Pattern(format!(
                                "select() recalls unbound name '{name}'"
                            )));
                        }
                    }
                    plan = Some(input);
                    output = Some(TraversalOutput::Columns {
                        aliases: names.clone(),
                    });
                }
                Step::Values(key) => {
                    let (input, alias) = self.positioned(plan.take(), &current)?;
                    plan = Some(input);
                    output = Some(TraversalOutput::Values {
                        alias,
                        key: key.clone(),
                    });
                }
                Step::Path => {
                    let (input, _) = self.positioned(plan.take(), &current)?;
                    plan = Some(input);
                    output = Some(TraversalOutput::Paths);
                }
                Step::Drop => {
                    let (input, alias) = self.positioned(plan.take(), &current)?;
                    plan = Some(input);
                    output = Some(TraversalOutput::Drop { alias });
                }
                Step::AddEdge {
                    label,
                    properties,
                    target,
                    direction,
                } => {
                    let (input, alias) = self.positioned(plan.take(), &current)?;
                    let target = match target {
                        EdgeTarget::Bound(name) => {
                            if !input.bound_aliases().contains(name) {
                                return Err(Error::Pattern(format!(
                                    "add_edge() targets unbound name '{name}'"
                                )));
                            }
                            CompiledEdgeTarget::Bound(name.clone())
                        }
                        EdgeTarget::New { label, properties } => CompiledEdgeTarget::New {
                            label: Label::new(label.clone()),
                            properties: properties.clone(),
                        },
                    };
                    plan = Some(input);
                    output = Some(TraversalOutput::AddEdge {
                        source_alias: alias,
                        label: Label::new(label.clone()),
                        properties: properties.clone(),
                        target,
                        direction: *direction,
                    });
                }
                Step::AddNode { .. } => {
                    return Err(Error::Pattern(
                        "add_node() is a standalone chain".to_string(),
                    ));
                }
            }
            i += 1;
        }

        let plan = plan.ok_or_else(|| Error::Pattern("empty traversal".to_string()))?;
        let output = output.unwrap_or(TraversalOutput::Entities {
            alias: current.ok_or_else(|| Error::Pattern("traversal has no position".to_string()))?,
        });
        Ok(CompiledTraversal::Query { plan, output })
    }

    /// The alias the upcoming position binds to: an immediately following
    /// `as()` names it, otherwise one is generated
    fn take_alias(&mut self, steps: &[Step], i: &mut usize) -> String {
        if let Some(Step::As(name)) = steps.get(*i + 1) {
            *i += 1;
            name.clone()
        } else {
            self.fresh()
        }
    }

    fn positioned(
        &self,
        plan: Option<PlanOp>,
        current: &Option<String>,
    ) -> Result<(PlanOp, String)> {
        match (plan, current) {
            (Some(plan), Some(alias)) => Ok((plan, alias.clone())),
            _ => Err(Error::Pattern(
                "traversal needs a source() before this step".to_string(),
            )),
        }
    }

    /// One expansion operator. A target alias that is already bound turns
    /// the expansion into an identity check, closing a cycle.
    #[allow(clippy::too_many_arguments)]
    fn expand(
        &mut self,
        input: PlanOp,
        from: &str,
        to: String,
        label: &str,
        direction: Direction,
        repetition: Repetition,
        hop_filter: Option<Expr>,
    ) -> Result<PlanOp> {
        repetition.validate()?;
        let resolved = self.catalog.resolve_match_edge(&MatchEdge {
            source_alias: from.to_string(),
            label: label.to_string(),
            repetition,
            bound: None,
            sink_alias: to.clone(),
        })?;
        let check_target = input.bound_aliases().contains(&to);
        Ok(PlanOp::Expand {
            input: Box::new(input),
            from_alias: from.to_string(),
            to_alias: to,
            arms: resolved.arms,
            direction,
            repetition,
            bound: None,
            check_target,
            hop_filter,
        })
    }

    /// Validate a repeat body: one expansion step, then only filters.
    /// Returns the edge label, direction, and per-hop filter.
    fn repeat_body(&self, sub: &[Step], alias: &str) -> Result<(String, Direction, Option<Expr>)> {
        let (label, direction) = match sub.first() {
            Some(Step::Out(label)) => (label.clone(), Direction::Out),
            Some(Step::In(label)) => (label.clone(), Direction::In),
            _ => {
                return Err(Error::Pattern(
                    "repeat() body must start with out() or in()".to_string(),
                ))
            }
        };
        let mut filters = Vec::new();
        for step in &sub[1..] {
            match step {
                Step::Has { key, op, value } => {
                    filters.push(comparison(alias, key, *op, value));
                }
                _ => {
                    return Err(Error::Pattern(
                        "repeat() body supports one expansion plus filters".to_string(),
                    ))
                }
            }
        }
        Ok((label, direction, Expr::conjoin(filters)))
    }

    /// Compile a branch sub-chain of expand/filter steps, forcing its final
    /// position to bind `final_alias` so both branches line up
    fn chain(
        &mut self,
        input: PlanOp,
        from: String,
        sub: &[Step],
        final_alias: &str,
    ) -> Result<PlanOp> {
        let last_move = sub
            .iter()
            .rposition(|s| matches!(s, Step::Out(_) | Step::In(_)))
            .ok_or_else(|| {
                Error::Pattern("branch sub-chain needs at least one expansion".to_string())
            })?;

        let mut plan = input;
        let mut current = from;
        for (idx, step) in sub.iter().enumerate() {
            match step {
                Step::Out(label) | Step::In(label) => {
                    let direction = match step {
                        Step::Out(_) => Direction::Out,
                        _ => Direction::In,
                    };
                    let to = if idx == last_move {
                        final_alias.to_string()
                    } else {
                        self.fresh()
                    };
                    plan = self.expand(
                        plan,
                        &current,
                        to.clone(),
                        label,
                        direction,
                        Repetition::single(),
                        None,
                    )?;
                    current = to;
                }
                Step::Has { key, op, value } => {
                    plan = PlanOp::Filter {
                        input: Box::new(plan),
                        predicate: comparison(&current, key, *op, value),
                    };
                }
                _ => {
                    return Err(Error::Pattern(
                        "sub-chain supports only out(), in(), and has()".to_string(),
                    ))
                }
            }
        }
        Ok(plan)
    }

    fn capped(&self, repetition: Repetition) -> Result<Repetition> {
        match repetition.max {
            Some(_) => Ok(repetition),
            None => match self.config.expansion_cap {
                Some(cap) => Ok(Repetition {
                    min: repetition.min,
                    max: Some(cap.max(repetition.min)),
                }),
                None => Err(Error::UnboundedExpansion(
                    "configure an expansion cap or bound the repeat".to_string(),
                )),
            },
        }
    }
}

fn comparison(alias: &str, key: &str, op: BinaryOp, value: &PropertyValue) -> Expr {
    Expr::Binary {
        left: Box::new(Expr::Property {
            alias: alias.to_string(),
            key: key.to_string(),
        }),
        op,
        right: Box::new(Expr::Literal(Literal::from_value(value.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_core::NodeId;
    use quiver_store::MemoryAdapter;

    fn fixture() -> (MemoryAdapter, ViewCatalog, PlannerConfig) {
        let adapter = MemoryAdapter::new();
        let mut props = PropertyMap::new();
        props.set("name", "A");
        adapter.create_node(&Label::new("App"), props).unwrap();
        (adapter, ViewCatalog::new(), PlannerConfig::default())
    }

    fn node(adapter: &MemoryAdapter, label: &str, name: &str) -> NodeId {
        let mut props = PropertyMap::new();
        props.set("name", name);
        adapter.create_node(&Label::new(label), props).unwrap()
    }

    fn compile(
        traversal: &Traversal,
        adapter: &MemoryAdapter,
        catalog: &ViewCatalog,
        config: &PlannerConfig,
    ) -> CompiledTraversal {
        traversal.compile(catalog, adapter, config).unwrap()
    }

    fn plan_of(compiled: CompiledTraversal) -> PlanOp {
        match compiled {
            CompiledTraversal::Query { plan, .. } => plan,
            other => panic!("expected a query traversal, got {other:?}"),
        }
    }

    #[test]
    fn test_source_has_out_chain() {
        let (adapter, catalog, config) = fixture();
        node(&adapter, "App", "B");

        let traversal = Traversal::source("App")
            .as_("a")
            .has("name", "A")
            .out("develop")
            .as_("b");
        let plan = plan_of(compile(&traversal, &adapter, &catalog, &config));

        let text = plan.explain();
        assert!(text.contains("Scan a [App]"));
        assert!(text.contains("Expand a -> b [develop]"));
        assert_eq!(plan.bound_aliases(), vec!["a", "b"]);
    }

    #[test]
    fn test_generated_aliases_without_as() {
        let (adapter, catalog, config) = fixture();
        let traversal = Traversal::source("App").out("develop");
        let plan = plan_of(compile(&traversal, &adapter, &catalog, &config));
        assert_eq!(plan.bound_aliases(), vec!["v0", "v1"]);
    }

    #[test]
    fn test_recall_closes_cycle() {
        let (adapter, catalog, config) = fixture();
        let traversal = Traversal::source("App")
            .as_("a")
            .out("develop")
            .out("Clients")
            .as_("a");
        let plan = plan_of(compile(&traversal, &adapter, &catalog, &config));
        assert!(plan.explain().contains("(check)"));
    }

    #[test]
    fn test_repeat_compiles_to_bounded_expand() {
        let (adapter, catalog, config) = fixture();
        let traversal = Traversal::source("App")
            .repeat(Repetition::range(1, 3), |sub| {
                sub.out("develop").has("system", "S1")
            })
            .as_("t");
        let plan = plan_of(compile(&traversal, &adapter, &catalog, &config));

        let text = plan.explain();
        assert!(text.contains("*1..3"));
        let PlanOp::Expand { hop_filter, .. } = &plan else {
            panic!("expected expand on top");
        };
        assert!(hop_filter.is_some());
    }

    #[test]
    fn test_unbounded_repeat_takes_cap() {
        let (adapter, catalog, _) = fixture();
        let config = PlannerConfig {
            expansion_cap: Some(5),
            ..PlannerConfig::default()
        };
        let traversal =
            Traversal::source("App").repeat(Repetition::at_least(1), |sub| sub.out("develop"));
        let plan = plan_of(compile(&traversal, &adapter, &catalog, &config));
        assert!(plan.explain().contains("*1..5"));
    }

    #[test]
    fn test_repeat_rejects_complex_body() {
        let (adapter, catalog, config) = fixture();
        let traversal = Traversal::source("App")
            .repeat(Repetition::range(1, 2), |sub| {
                sub.out("develop").out("Clients")
            });
        let err = traversal.compile(&catalog, &adapter, &config).unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
    }

    #[test]
    fn test_coalesce_builds_branch() {
        let (adapter, catalog, config) = fixture();
        let traversal = Traversal::source("App")
            .coalesce(|t| t.out("develop"), |t| t.out("Clients"))
            .values("name");
        let compiled = compile(&traversal, &adapter, &catalog, &config);
        let CompiledTraversal::Query { plan, output } = compiled else {
            panic!("expected query");
        };
        assert!(plan.explain().contains("Branch"));
        assert!(matches!(output, TraversalOutput::Values { .. }));
    }

    #[test]
    fn test_select_requires_bound_names() {
        let (adapter, catalog, config) = fixture();
        let traversal = Traversal::source("App").as_("a").select(["ghost"]);
        let err = traversal.compile(&catalog, &adapter, &config).unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
    }

    #[test]
    fn test_local_restores_position() {
        let (adapter, catalog, config) = fixture();
        let traversal = Traversal::source("App")
            .as_("a")
            .local(|t| t.out("develop").has("name", "B"))
            .values("name");
        let compiled = compile(&traversal, &adapter, &catalog, &config);
        let CompiledTraversal::Query { output, .. } = compiled else {
            panic!("expected query");
        };
        // values() reads the pre-local position
        let TraversalOutput::Values { alias, .. } = output else {
            panic!("expected values output");
        };
        assert_eq!(alias, "a");
    }

    #[test]
    fn test_add_node_standalone() {
        let (adapter, catalog, config) = fixture();
        let traversal = Traversal::add_node("App", PropertyMap::with("name", "Z"));
        let compiled = compile(&traversal, &adapter, &catalog, &config);
        assert!(matches!(compiled, CompiledTraversal::CreateNode { .. }));
    }

    #[test]
    fn test_add_edge_to_bound_target() {
        let (adapter, catalog, config) = fixture();
        node(&adapter, "Team", "T");
        let traversal = Traversal::source("Team")
            .as_("t")
            .out("develop")
            .as_("b")
            .add_edge("audits", PropertyMap::new())
            .to("t");
        let compiled = compile(&traversal, &adapter, &catalog, &config);
        let CompiledTraversal::Query { output, .. } = compiled else {
            panic!("expected query");
        };
        let TraversalOutput::AddEdge {
            source_alias,
            target,
            direction,
            ..
        } = output
        else {
            panic!("expected add-edge output");
        };
        assert_eq!(source_alias, "b");
        assert!(matches!(target, CompiledEdgeTarget::Bound(name) if name == "t"));
        assert_eq!(direction, Direction::Out);
    }

    #[test]
    fn test_drop_terminal() {
        let (adapter, catalog, config) = fixture();
        let traversal = Traversal::source("App").has("name", "A").drop_();
        let compiled = compile(&traversal, &adapter, &catalog, &config);
        let CompiledTraversal::Query { output, .. } = compiled else {
            panic!("expected query");
        };
        assert!(matches!(output, TraversalOutput::Drop { .. }));
    }

    #[test]
    fn test_steps_after_terminal_rejected() {
        let (adapter, catalog, config) = fixture();
        let traversal = Traversal::source("App").drop_().values("name");
        let err = traversal.compile(&catalog, &adapter, &config).unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
    }
}
