//! View catalog and resolution
//!
//! Views are resolution-time macros: a named union of (base label, optional
//! predicate) arms with no storage of their own. Resolution rewrites every
//! label reference in a statement into its base-label arms, so later stages
//! only ever see base labels. The global node view (`FROM *`) expands to
//! every label the adapter currently knows.

use std::collections::HashMap;
use std::sync::RwLock;

use quiver_core::{Error, Label, Result};
use quiver_store::StorageAdapter;

use crate::ast::{
    CreateViewStmt, Expr, MatchEdge, Projection, Repetition, SelectStmt, SourceDecl,
};
use crate::plan::LabelArm;

/// A stored view definition
#[derive(Debug, Clone, PartialEq)]
pub struct ViewDefinition {
    pub name: String,
    /// Owner label, present on edge views defined as `owner.name`
    pub owner: Option<String>,
    /// Flattened base-label arms; nested view references were expanded when
    /// the view was defined
    pub arms: Vec<LabelArm>,
}

/// A FROM source with its view reference expanded to base-label arms.
/// Arm predicates reference the source's alias.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSource {
    pub alias: String,
    pub arms: Vec<LabelArm>,
}

/// A MATCH edge with its label expanded to base edge-label arms.
/// Arm predicates reference the arm's own label name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMatchEdge {
    pub source_alias: String,
    pub arms: Vec<LabelArm>,
    pub repetition: Repetition,
    pub bound: Option<String>,
    pub sink_alias: String,
}

/// A SELECT statement after view resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSelect {
    pub projection: Projection,
    pub sources: Vec<ResolvedSource>,
    pub matches: Vec<ResolvedMatchEdge>,
    pub predicate: Option<Expr>,
}

/// Process-wide catalog of node and edge views.
///
/// Read-mostly; definitions take a write lock, resolution takes read locks.
/// View names shadow base labels on lookup.
#[derive(Debug, Default)]
pub struct ViewCatalog {
    node_views: RwLock<HashMap<String, ViewDefinition>>,
    edge_views: RwLock<HashMap<String, ViewDefinition>>,
}

impl ViewCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Definition ==========

    /// Register a node view, flattening arms that reference other node views
    pub fn define_node_view(&self, stmt: &CreateViewStmt) -> Result<()> {
        let arms = self.flatten_arms(stmt, &self.node_views)?;
        let mut views = self
            .node_views
            .write()
            .map_err(|_| Error::Internal("view catalog lock poisoned".to_string()))?;
        views.insert(
            stmt.name.clone(),
            ViewDefinition {
                name: stmt.name.clone(),
                owner: None,
                arms,
            },
        );
        Ok(())
    }

    /// Register an edge view, flattening arms that reference other edge views
    pub fn define_edge_view(&self, stmt: &CreateViewStmt) -> Result<()> {
        let arms = self.flatten_arms(stmt, &self.edge_views)?;
        let mut views = self
            .edge_views
            .write()
            .map_err(|_| Error::Internal("view catalog lock poisoned".to_string()))?;
        views.insert(
            stmt.name.clone(),
            ViewDefinition {
                name: stmt.name.clone(),
                owner: stmt.owner.clone(),
                arms,
            },
        );
        Ok(())
    }

    /// Expand a definition's arms against existing views of the same kind.
    /// An arm naming a view splices that view's arms, conjoining predicates;
    /// flattening at definition time keeps later resolution a single lookup.
    fn flatten_arms(
        &self,
        stmt: &CreateViewStmt,
        views: &RwLock<HashMap<String, ViewDefinition>>,
    ) -> Result<Vec<LabelArm>> {
        if stmt.arms.is_empty() {
            return Err(Error::Plan(format!(
                "view '{}' has no arms",
                stmt.name
            )));
        }
        let views = views
            .read()
            .map_err(|_| Error::Internal("view catalog lock poisoned".to_string()))?;
        let mut out = Vec::new();
        for arm in &stmt.arms {
            if arm.label == stmt.name {
                return Err(Error::Plan(format!(
                    "view '{}' references itself",
                    stmt.name
                )));
            }
            match views.get(&arm.label) {
                Some(nested) => {
                    for base in &nested.arms {
                        let mut predicate = base.predicate.clone();
                        if let Some(outer) = &arm.predicate {
                            let mut outer = outer.clone();
                            outer.rename_alias(&arm.label, base.label.name());
                            predicate = match predicate {
                                Some(inner) => Expr::conjoin(vec![inner, outer]),
                                None => Some(outer),
                            };
                        }
                        out.push(LabelArm {
                            label: base.label.clone(),
                            predicate,
                        });
                    }
                }
                None => out.push(LabelArm {
                    label: Label::new(arm.label.clone()),
                    predicate: arm.predicate.clone(),
                }),
            }
        }
        Ok(out)
    }

    // ========== Resolution ==========

    /// Resolve a SELECT statement's sources and MATCH edges to base labels
    pub fn resolve_select(
        &self,
        stmt: &SelectStmt,
        adapter: &dyn StorageAdapter,
    ) -> Result<ResolvedSelect> {
        Ok(ResolvedSelect {
            projection: stmt.projection.clone(),
            sources: self.resolve_sources(&stmt.from, adapter)?,
            matches: stmt
                .matches
                .iter()
                .map(|edge| self.resolve_match_edge(edge))
                .collect::<Result<Vec<_>>>()?,
            predicate: stmt.predicate.clone(),
        })
    }

    /// Resolve FROM sources; arm predicates are rewritten to reference the
    /// consuming alias
    pub fn resolve_sources(
        &self,
        sources: &[SourceDecl],
        adapter: &dyn StorageAdapter,
    ) -> Result<Vec<ResolvedSource>> {
        sources
            .iter()
            .map(|source| self.resolve_source(source, adapter))
            .collect()
    }

    fn resolve_source(
        &self,
        source: &SourceDecl,
        adapter: &dyn StorageAdapter,
    ) -> Result<ResolvedSource> {
        let arms = match &source.label {
            None => {
                // Global node view: every label known right now. Empty labels
                // yield zero rows; only a storage with no labels at all is an
                // error.
                let labels = adapter.labels()?;
                if labels.is_empty() {
                    return Err(Error::UnknownLabel(
                        "* (no node labels exist)".to_string(),
                    ));
                }
                labels.into_iter().map(LabelArm::new).collect()
            }
            Some(name) => self.node_arms(name, &source.alias, adapter)?,
        };
        Ok(ResolvedSource {
            alias: source.alias.clone(),
            arms,
        })
    }

    /// Arms for a node label or view name, predicates renamed to `alias`
    fn node_arms(
        &self,
        name: &str,
        alias: &str,
        adapter: &dyn StorageAdapter,
    ) -> Result<Vec<LabelArm>> {
        let views = self
            .node_views
            .read()
            .map_err(|_| Error::Internal("view catalog lock poisoned".to_string()))?;
        if let Some(view) = views.get(name) {
            let mut arms = view.arms.clone();
            for arm in &mut arms {
                if let Some(predicate) = &mut arm.predicate {
                    predicate.rename_alias(arm.label.name(), alias);
                }
            }
            return Ok(arms);
        }
        drop(views);

        let label = Label::new(name);
        if !adapter.labels()?.contains(&label) {
            return Err(Error::UnknownLabel(name.to_string()));
        }
        Ok(vec![LabelArm::new(label)])
    }

    /// Resolve a MATCH edge's label, which may name an edge view. Base edge
    /// labels pass through unchecked; an edge label with no edges simply
    /// matches nothing.
    pub fn resolve_match_edge(&self, edge: &MatchEdge) -> Result<ResolvedMatchEdge> {
        let views = self
            .edge_views
            .read()
            .map_err(|_| Error::Internal("view catalog lock poisoned".to_string()))?;
        let arms = match views.get(&edge.label) {
            Some(view) => view.arms.clone(),
            None => vec![LabelArm::new(edge.label.clone())],
        };
        Ok(ResolvedMatchEdge {
            source_alias: edge.source_alias.clone(),
            arms,
            repetition: edge.repetition,
            bound: edge.bound.clone(),
            sink_alias: edge.sink_alias.clone(),
        })
    }

    /// Look up a node view by name
    pub fn node_view(&self, name: &str) -> Option<ViewDefinition> {
        self.node_views.read().ok()?.get(name).cloned()
    }

    /// Look up an edge view by name
    pub fn edge_view(&self, name: &str) -> Option<ViewDefinition> {
        self.edge_views.read().ok()?.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ViewArm;
    use proptest::prelude::*;
    use quiver_core::PropertyMap;
    use quiver_store::MemoryAdapter;

    fn adapter_with_labels(labels: &[&str]) -> MemoryAdapter {
        let adapter = MemoryAdapter::new();
        for label in labels {
            adapter
                .create_node(&Label::new(*label), PropertyMap::new())
                .unwrap();
        }
        adapter
    }

    fn view_stmt(name: &str, arms: Vec<ViewArm>) -> CreateViewStmt {
        CreateViewStmt {
            name: name.to_string(),
            owner: None,
            arms,
        }
    }

    fn source(label: Option<&str>, alias: &str) -> SourceDecl {
        SourceDecl {
            label: label.map(str::to_string),
            alias: alias.to_string(),
        }
    }

    #[test]
    fn test_plain_label_resolves_to_single_arm() {
        let adapter = adapter_with_labels(&["App"]);
        let catalog = ViewCatalog::new();

        let resolved = catalog
            .resolve_sources(&[source(Some("App"), "a")], &adapter)
            .unwrap();
        assert_eq!(resolved[0].arms, vec![LabelArm::new("App")]);
    }

    #[test]
    fn test_unknown_label_rejected() {
        let adapter = adapter_with_labels(&["App"]);
        let catalog = ViewCatalog::new();

        let err = catalog
            .resolve_sources(&[source(Some("Persn"), "p")], &adapter)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownLabel(name) if name == "Persn"));
    }

    #[test]
    fn test_view_expands_with_alias_rename() {
        let adapter = adapter_with_labels(&["App", "Service"]);
        let catalog = ViewCatalog::new();
        catalog
            .define_node_view(&view_stmt(
                "Software",
                vec![
                    ViewArm {
                        label: "App".to_string(),
                        predicate: Some(Expr::property_eq("App", "active", true)),
                    },
                    ViewArm {
                        label: "Service".to_string(),
                        predicate: None,
                    },
                ],
            ))
            .unwrap();

        let resolved = catalog
            .resolve_sources(&[source(Some("Software"), "s")], &adapter)
            .unwrap();
        let arms = &resolved[0].arms;
        assert_eq!(arms.len(), 2);
        assert_eq!(arms[0].label, Label::new("App"));
        // Arm predicate now references the consuming alias
        assert_eq!(
            arms[0].predicate,
            Some(Expr::property_eq("s", "active", true))
        );
        assert_eq!(arms[1].predicate, None);
    }

    #[test]
    fn test_nested_view_flattens_at_definition() {
        let adapter = adapter_with_labels(&["App", "Service"]);
        let catalog = ViewCatalog::new();
        catalog
            .define_node_view(&view_stmt(
                "Active",
                vec![ViewArm {
                    label: "App".to_string(),
                    predicate: Some(Expr::property_eq("App", "active", true)),
                }],
            ))
            .unwrap();
        catalog
            .define_node_view(&view_stmt(
                "Everything",
                vec![
                    ViewArm {
                        label: "Active".to_string(),
                        predicate: None,
                    },
                    ViewArm {
                        label: "Service".to_string(),
                        predicate: None,
                    },
                ],
            ))
            .unwrap();

        let view = catalog.node_view("Everything").unwrap();
        assert_eq!(view.arms.len(), 2);
        assert_eq!(view.arms[0].label, Label::new("App"));
        assert!(view.arms[0].predicate.is_some());

        let resolved = catalog
            .resolve_sources(&[source(Some("Everything"), "e")], &adapter)
            .unwrap();
        assert_eq!(resolved[0].arms.len(), 2);
    }

    #[test]
    fn test_self_referencing_view_rejected() {
        let catalog = ViewCatalog::new();
        let err = catalog
            .define_node_view(&view_stmt(
                "Loop",
                vec![ViewArm {
                    label: "Loop".to_string(),
                    predicate: None,
                }],
            ))
            .unwrap_err();
        assert!(matches!(err, Error::Plan(_)));
    }

    #[test]
    fn test_global_view_enumerates_labels() {
        let adapter = adapter_with_labels(&["App", "Service"]);
        let catalog = ViewCatalog::new();

        let resolved = catalog
            .resolve_sources(&[source(None, "n")], &adapter)
            .unwrap();
        let mut labels: Vec<&str> =
            resolved[0].arms.iter().map(|a| a.label.name()).collect();
        labels.sort_unstable();
        assert_eq!(labels, vec!["App", "Service"]);
    }

    #[test]
    fn test_global_view_fails_only_without_labels() {
        let adapter = MemoryAdapter::new();
        let catalog = ViewCatalog::new();

        let err = catalog
            .resolve_sources(&[source(None, "n")], &adapter)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownLabel(_)));
    }

    #[test]
    fn test_edge_view_resolution() {
        let catalog = ViewCatalog::new();
        catalog
            .define_edge_view(&CreateViewStmt {
                name: "relies".to_string(),
                owner: Some("App".to_string()),
                arms: vec![
                    ViewArm {
                        label: "develop".to_string(),
                        predicate: None,
                    },
                    ViewArm {
                        label: "Clients".to_string(),
                        predicate: None,
                    },
                ],
            })
            .unwrap();

        let resolved = catalog
            .resolve_match_edge(&MatchEdge {
                source_alias: "a".to_string(),
                label: "relies".to_string(),
                repetition: Repetition::single(),
                bound: None,
                sink_alias: "b".to_string(),
            })
            .unwrap();
        assert_eq!(resolved.arms.len(), 2);

        // Unknown edge labels pass through as a single base arm
        let resolved = catalog
            .resolve_match_edge(&MatchEdge {
                source_alias: "a".to_string(),
                label: "unseen".to_string(),
                repetition: Repetition::single(),
                bound: None,
                sink_alias: "b".to_string(),
            })
            .unwrap();
        assert_eq!(resolved.arms, vec![LabelArm::new("unseen")]);
    }

    #[test]
    fn test_redefinition_replaces() {
        let catalog = ViewCatalog::new();
        catalog
            .define_node_view(&view_stmt(
                "V",
                vec![ViewArm {
                    label: "App".to_string(),
                    predicate: None,
                }],
            ))
            .unwrap();
        catalog
            .define_node_view(&view_stmt(
                "V",
                vec![ViewArm {
                    label: "Service".to_string(),
                    predicate: None,
                }],
            ))
            .unwrap();
        assert_eq!(
            catalog.node_view("V").unwrap().arms,
            vec![LabelArm::new("Service")]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Resolution is idempotent: a resolved arm names a base label, and
        /// resolving that base label again changes nothing
        #[test]
        fn prop_resolution_is_idempotent(picks in prop::collection::vec(0usize..4, 1..4)) {
            let labels = ["App", "Service", "Team", "Audit"];
            let adapter = adapter_with_labels(&labels);
            let catalog = ViewCatalog::new();
            catalog
                .define_node_view(&view_stmt(
                    "V",
                    picks
                        .iter()
                        .map(|i| ViewArm {
                            label: labels[*i].to_string(),
                            predicate: None,
                        })
                        .collect(),
                ))
                .unwrap();

            let first = catalog
                .resolve_sources(&[source(Some("V"), "v")], &adapter)
                .unwrap();
            for arm in &first[0].arms {
                let again = catalog
                    .resolve_sources(&[source(Some(arm.label.name()), "v")], &adapter)
                    .unwrap();
                prop_assert_eq!(&again[0].arms, &vec![arm.clone()]);
            }
            let second = catalog
                .resolve_sources(&[source(Some("V"), "v")], &adapter)
                .unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
