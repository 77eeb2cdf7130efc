//! Dependency graph construction
//!
//! Resolves every module's declared dependency names against the registry
//! and produces the typed edge multigraph. Name resolution failures,
//! self-dependencies, and external-capability violations are hard errors;
//! a name listed under conflicting visibilities narrows to the strictest
//! one with a warning, mirroring how real declaration sets accrete
//! mistakes that should not block a build.

use crate::error::{ResolveError, ResolveResult, Warning};
use crate::registry::ModuleRegistry;
use anvil_decl::ModuleKind;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

/// Edge visibility
///
/// Ordering is strictness: `Dynamic < Public < Private`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Link-time-optional; no compile-time ordering constraint
    Dynamic,
    /// Compile surface re-exports to dependents
    Public,
    /// Compile surface consumed locally only
    Private,
}

impl Visibility {
    /// Whether this edge implies compile-time visibility (and ordering)
    pub fn is_compile_time(&self) -> bool {
        matches!(self, Self::Public | Self::Private)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dynamic => write!(f, "dynamic"),
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// A typed dependency edge, by registry node id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub to: usize,
    pub visibility: Visibility,
}

/// Directed dependency graph over one target's active module set
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Outgoing edges per node, in declaration order
    edges: Vec<Vec<Edge>>,
}

impl DependencyGraph {
    /// Build the graph for the given registry
    pub fn build(registry: &ModuleRegistry) -> ResolveResult<(Self, Vec<Warning>)> {
        let mut edges = Vec::with_capacity(registry.len());
        let mut warnings = Vec::new();

        for (from, module) in registry.modules().iter().enumerate() {
            let rules = &module.rules;
            // Strictest visibility seen per name; `order` keeps first-seen order
            let mut seen: HashMap<&str, Visibility> = HashMap::new();
            let mut order: Vec<&str> = Vec::new();

            let lists = [
                (&rules.public_deps, Visibility::Public),
                (&rules.private_deps, Visibility::Private),
                (&rules.dynamic_deps, Visibility::Dynamic),
            ];
            for (list, visibility) in lists {
                for name in list.iter() {
                    match seen.entry(name.as_str()) {
                        Entry::Vacant(entry) => {
                            entry.insert(visibility);
                            order.push(name.as_str());
                        }
                        // Repeats within one list dedupe silently; a repeat
                        // across lists narrows to the strictest and warns.
                        Entry::Occupied(mut entry) => {
                            let kept = entry.get_mut();
                            if visibility != *kept {
                                let narrowed = (*kept).max(visibility);
                                *kept = narrowed;
                                warnings.push(Warning::VisibilityConflict {
                                    module: rules.name.clone(),
                                    dependency: name.clone(),
                                    kept: narrowed,
                                });
                            }
                        }
                    }
                }
            }

            let mut node_edges = Vec::with_capacity(order.len());
            for name in order {
                let visibility = seen[name];
                let to = registry.id_of(name).ok_or_else(|| ResolveError::UnknownModule {
                    module: rules.name.clone(),
                    referenced: name.to_string(),
                })?;
                if to == from {
                    return Err(ResolveError::SelfDependency {
                        module: rules.name.clone(),
                    });
                }
                let dep = &registry.module(to).rules;
                if rules.kind == ModuleKind::External
                    && dep.kind == ModuleKind::Internal
                    && !dep.foundational
                {
                    return Err(ResolveError::ExternalDependencyViolation {
                        module: rules.name.clone(),
                        referenced: name.to_string(),
                    });
                }
                node_edges.push(Edge { to, visibility });
            }
            edges.push(node_edges);
        }

        Ok((Self { edges }, warnings))
    }

    /// Outgoing edges of a node, in declaration order
    pub fn edges(&self, from: usize) -> &[Edge] {
        &self.edges[from]
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Outgoing compile-time (public + private) neighbors of a node
    pub fn compile_time_deps(&self, from: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges[from]
            .iter()
            .filter(|e| e.visibility.is_compile_time())
            .map(|e| e.to)
    }

    /// Outgoing public neighbors of a node
    pub fn public_deps(&self, from: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges[from]
            .iter()
            .filter(|e| e.visibility == Visibility::Public)
            .map(|e| e.to)
    }

    /// Outgoing private neighbors of a node
    pub fn private_deps(&self, from: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges[from]
            .iter()
            .filter(|e| e.visibility == Visibility::Private)
            .map(|e| e.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::filter_active;
    use anvil_decl::{
        BuildContext, BuildEnvironment, DeclarationSet, ModuleDeclaration, Platform, TargetKind,
    };
    use pretty_assertions::assert_eq;

    fn build(decls: DeclarationSet) -> ResolveResult<(ModuleRegistry, DependencyGraph, Vec<Warning>)> {
        let ctx = BuildContext::new(Platform::Linux, TargetKind::Game, BuildEnvironment::Shared);
        let registry = ModuleRegistry::from_active(filter_active(&decls, &ctx))?;
        let (graph, warnings) = DependencyGraph::build(&registry)?;
        Ok((registry, graph, warnings))
    }

    #[test]
    fn test_edges_typed_by_source_list() {
        let decls = DeclarationSet::new()
            .with_module(ModuleDeclaration::new("Core"))
            .with_module(ModuleDeclaration::new("Json"))
            .with_module(ModuleDeclaration::new("Plugin"))
            .with_module(
                ModuleDeclaration::new("Engine")
                    .with_public_deps(vec!["Core".to_string()])
                    .with_private_deps(vec!["Json".to_string()])
                    .with_dynamic_deps(vec!["Plugin".to_string()]),
            );

        let (registry, graph, warnings) = build(decls).unwrap();
        assert!(warnings.is_empty());
        let engine = registry.id_of("Engine").unwrap();
        let visibilities: Vec<Visibility> =
            graph.edges(engine).iter().map(|e| e.visibility).collect();
        assert_eq!(
            visibilities,
            vec![Visibility::Public, Visibility::Private, Visibility::Dynamic]
        );
    }

    #[test]
    fn test_unknown_dependency() {
        let decls = DeclarationSet::new().with_module(
            ModuleDeclaration::new("Engine").with_public_deps(vec!["Missing".to_string()]),
        );
        let err = build(decls).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownModule {
                module: "Engine".to_string(),
                referenced: "Missing".to_string(),
            }
        );
    }

    #[test]
    fn test_self_dependency_rejected() {
        let decls = DeclarationSet::new().with_module(
            ModuleDeclaration::new("Engine").with_private_deps(vec!["Engine".to_string()]),
        );
        let err = build(decls).unwrap_err();
        assert_eq!(
            err,
            ResolveError::SelfDependency {
                module: "Engine".to_string()
            }
        );
    }

    #[test]
    fn test_conflicting_visibility_narrows_to_private() {
        let decls = DeclarationSet::new()
            .with_module(ModuleDeclaration::new("Core"))
            .with_module(
                ModuleDeclaration::new("Engine")
                    .with_public_deps(vec!["Core".to_string()])
                    .with_private_deps(vec!["Core".to_string()]),
            );

        let (registry, graph, warnings) = build(decls).unwrap();
        let engine = registry.id_of("Engine").unwrap();
        assert_eq!(graph.edges(engine).len(), 1);
        assert_eq!(graph.edges(engine)[0].visibility, Visibility::Private);
        assert_eq!(
            warnings,
            vec![Warning::VisibilityConflict {
                module: "Engine".to_string(),
                dependency: "Core".to_string(),
                kept: Visibility::Private,
            }]
        );
    }

    #[test]
    fn test_dynamic_duplicate_keeps_stricter_visibility() {
        let decls = DeclarationSet::new()
            .with_module(ModuleDeclaration::new("Core"))
            .with_module(
                ModuleDeclaration::new("Engine")
                    .with_public_deps(vec!["Core".to_string()])
                    .with_dynamic_deps(vec!["Core".to_string()]),
            );

        let (registry, graph, warnings) = build(decls).unwrap();
        let engine = registry.id_of("Engine").unwrap();
        assert_eq!(graph.edges(engine)[0].visibility, Visibility::Public);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_external_may_depend_on_external_and_foundational() {
        let decls = DeclarationSet::new()
            .with_module(ModuleDeclaration::new("BuildSettings").foundational())
            .with_module(ModuleDeclaration::external("zlib"))
            .with_module(
                ModuleDeclaration::external("libpng")
                    .with_public_deps(vec!["zlib".to_string(), "BuildSettings".to_string()]),
            );
        assert!(build(decls).is_ok());
    }

    #[test]
    fn test_external_capability_violation() {
        let decls = DeclarationSet::new()
            .with_module(ModuleDeclaration::new("Engine"))
            .with_module(
                ModuleDeclaration::external("libpng")
                    .with_public_deps(vec!["Engine".to_string()]),
            );
        let err = build(decls).unwrap_err();
        assert_eq!(
            err,
            ResolveError::ExternalDependencyViolation {
                module: "libpng".to_string(),
                referenced: "Engine".to_string(),
            }
        );
    }
}
