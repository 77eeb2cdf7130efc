//! Per-target resolution driver
//!
//! Runs the pipeline stages in order for one target, or for many targets in
//! parallel. Each target resolution is independent: declarations are
//! read-only inputs, every derived structure is rebuilt per target, and one
//! target's failure never affects another's result. The only shared state
//! is the optional closure cache, which is compute-once-per-key.

use crate::cache::ClosureCache;
use crate::context::filter_active;
use crate::cycles::check_acyclic;
use crate::error::{ResolveError, ResolveResult, Warning};
use crate::graph::DependencyGraph;
use crate::plan::{synthesize, topo_order, BuildPlan};
use crate::registry::ModuleRegistry;
use crate::visibility::propagate;
use anvil_decl::{DeclarationSet, Platform, TargetDeclaration};
use rayon::prelude::*;
use std::sync::Arc;

/// A completed target resolution: the plan plus soft findings
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub plan: BuildPlan,
    pub warnings: Vec<Warning>,
}

/// Resolves targets against one declaration set
pub struct Resolver<'a> {
    decls: &'a DeclarationSet,
    cache: Option<Arc<ClosureCache>>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over the given declarations
    pub fn new(decls: &'a DeclarationSet) -> Self {
        Self { decls, cache: None }
    }

    /// Share a closure cache across targets resolved by this resolver
    pub fn with_cache(mut self, cache: Arc<ClosureCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolve a declared target by name for the given platform
    pub fn resolve(&self, target_name: &str, platform: Platform) -> ResolveResult<Resolution> {
        let target = self
            .decls
            .target(target_name)
            .ok_or_else(|| ResolveError::UnknownTarget {
                name: target_name.to_string(),
            })?;
        self.resolve_target(target, platform)
    }

    /// Resolve an explicit target declaration for the given platform
    pub fn resolve_target(
        &self,
        target: &TargetDeclaration,
        platform: Platform,
    ) -> ResolveResult<Resolution> {
        let ctx = target.context_for(platform);
        let active = filter_active(self.decls, &ctx);

        for extra in &target.extra_modules {
            if !active.iter().any(|m| m.name() == extra) {
                return Err(ResolveError::InactiveExtraModule {
                    target: target.name.clone(),
                    module: extra.clone(),
                });
            }
        }

        let registry = ModuleRegistry::from_active(active)?;
        let (graph, warnings) = DependencyGraph::build(&registry)?;
        check_acyclic(&registry, &graph)?;
        let order = topo_order(&registry, &graph);
        let visibility = propagate(&registry, &graph, &order, &ctx, self.cache.as_deref());
        let plan = synthesize(target, platform, &registry, &graph, &order, &visibility);

        Ok(Resolution { plan, warnings })
    }

    /// Resolve many targets in parallel
    ///
    /// Results come back in request order. A failing target yields its own
    /// error; other targets are unaffected.
    pub fn resolve_many(
        &self,
        requests: &[(String, Platform)],
    ) -> Vec<ResolveResult<Resolution>> {
        requests
            .par_iter()
            .map(|(target, platform)| self.resolve(target, *platform))
            .collect()
    }
}
