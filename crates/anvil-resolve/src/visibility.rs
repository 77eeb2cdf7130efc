//! Visibility propagation
//!
//! Computes each module's public closure and effective compile surface.
//!
//! `PublicClosure(m) = OwnPublic(m) ∪ ⋃ PublicClosure(d)` over m's public
//! dependencies. A private dependency's public closure is absorbed into the
//! consuming module's own compile surface but never re-exported: a private
//! edge seals propagation for everything beyond it.
//!
//! Closures are computed once per module, walking the graph in dependency
//! order, so total work is O(V+E) set unions. Surfaces are ordered sets, so
//! results are independent of declaration order.

use crate::cache::ClosureCache;
use crate::graph::DependencyGraph;
use crate::registry::ModuleRegistry;
use anvil_decl::{BuildContext, ResolvedRules};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A propagated compile surface: include paths, definitions, link inputs
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PublicSurface {
    pub includes: BTreeSet<String>,
    pub defines: BTreeSet<String>,
    pub libs: BTreeSet<String>,
}

impl PublicSurface {
    /// The module's own public surface
    pub fn own_public(rules: &ResolvedRules) -> Self {
        Self {
            includes: rules.public_includes.iter().cloned().collect(),
            defines: rules.public_defines.iter().cloned().collect(),
            libs: rules.public_libs.iter().cloned().collect(),
        }
    }

    /// Union another surface into this one
    pub fn absorb(&mut self, other: &PublicSurface) {
        self.includes.extend(other.includes.iter().cloned());
        self.defines.extend(other.defines.iter().cloned());
        self.libs.extend(other.libs.iter().cloned());
    }
}

/// Per-module propagation results for one resolution run
#[derive(Debug, Clone)]
pub struct VisibilityMap {
    closures: Vec<Arc<PublicSurface>>,
    compile: Vec<PublicSurface>,
}

impl VisibilityMap {
    /// The public closure of a node: what it re-exports to dependents
    pub fn closure(&self, id: usize) -> &PublicSurface {
        &self.closures[id]
    }

    /// The effective compile surface of a node: what its own sources see
    pub fn compile_surface(&self, id: usize) -> &PublicSurface {
        &self.compile[id]
    }
}

/// Propagate visibility over the graph
///
/// `order` must list every node with dependencies before dependents (the
/// synthesizer's topological order satisfies this). When a shared cache is
/// supplied, closures are reused across targets with the same context and
/// computed at most once per `(module, context)` key.
pub fn propagate(
    registry: &ModuleRegistry,
    graph: &DependencyGraph,
    order: &[usize],
    ctx: &BuildContext,
    cache: Option<&ClosureCache>,
) -> VisibilityMap {
    let n = registry.len();
    let mut closures: Vec<Option<Arc<PublicSurface>>> = vec![None; n];
    let mut compile: Vec<Option<PublicSurface>> = vec![None; n];

    for &v in order {
        let rules = &registry.module(v).rules;

        let compute = || {
            let mut surface = PublicSurface::own_public(rules);
            for dep in graph.public_deps(v) {
                let dep_closure = closures[dep]
                    .as_ref()
                    .expect("dependency closure computed before dependent");
                surface.absorb(dep_closure);
            }
            Arc::new(surface)
        };
        let closure = match cache {
            Some(cache) => cache.get_or_compute(&rules.name, ctx, compute),
            None => compute(),
        };

        // Effective compile surface: the closure plus the module's own
        // private surface plus the public closures of private dependencies.
        let mut own = PublicSurface::clone(&closure);
        own.includes.extend(rules.private_includes.iter().cloned());
        own.defines.extend(rules.private_defines.iter().cloned());
        own.libs.extend(rules.private_libs.iter().cloned());
        for dep in graph.private_deps(v) {
            let dep_closure = closures[dep]
                .as_ref()
                .expect("dependency closure computed before dependent");
            own.absorb(dep_closure);
        }

        closures[v] = Some(closure);
        compile[v] = Some(own);
    }

    VisibilityMap {
        closures: closures
            .into_iter()
            .map(|c| c.expect("order covers every node"))
            .collect(),
        compile: compile
            .into_iter()
            .map(|c| c.expect("order covers every node"))
            .collect(),
    }
}
