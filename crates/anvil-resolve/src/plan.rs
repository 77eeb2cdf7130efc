//! Build plan synthesis
//!
//! Final stage: a deterministic topological ordering of the visibility
//! subgraph, each module carrying its fully resolved compile and link
//! configuration, plus precompiled-header sharing groups. Repeated runs
//! over unchanged input produce byte-identical plans.

use crate::graph::DependencyGraph;
use crate::registry::ModuleRegistry;
use crate::visibility::VisibilityMap;
use anvil_decl::{BuildEnvironment, ModuleKind, PchMode, Platform, TargetDeclaration};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

/// Deterministic topological order of the compile-time subgraph
///
/// Every module appears after all of its public/private dependencies. Ties
/// break by declaration order (node ids follow declaration order), so the
/// result is stable across runs. Must only be called on an acyclic graph.
pub fn topo_order(registry: &ModuleRegistry, graph: &DependencyGraph) -> Vec<usize> {
    let n = registry.len();
    let mut dep_count = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for v in 0..n {
        for w in graph.compile_time_deps(v) {
            dep_count[v] += 1;
            dependents[w].push(v);
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&v| dep_count[v] == 0)
        .map(Reverse)
        .collect();
    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(v)) = ready.pop() {
        order.push(v);
        for &dependent in &dependents[v] {
            dep_count[dependent] -= 1;
            if dep_count[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }
    debug_assert_eq!(order.len(), n, "cycle check must run before ordering");
    order
}

/// One fully resolved module in the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModule {
    pub name: String,
    pub kind: ModuleKind,
    /// Effective include paths: own surface plus consumed public closures
    pub include_paths: Vec<String>,
    /// Effective preprocessor definitions
    pub defines: Vec<String>,
    /// Aggregated link inputs; these outrun compile-time visibility because
    /// a private dependency's libraries must still reach the final binary
    pub link_inputs: Vec<String>,
    /// Precompiled-header group, when the module participates in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pch_group: Option<u32>,
    /// Position in the topological build order
    pub order: usize,
}

/// The synthesized, dependency-ordered plan for one target resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    pub target: String,
    pub platform: Platform,
    pub build_env: BuildEnvironment,
    /// Modules in build order, each with resolved configuration
    pub modules: Vec<ResolvedModule>,
    /// Module names in build order (convenience view for drivers)
    pub order: Vec<String>,
    /// PCH group id -> member module names
    pub pch_groups: BTreeMap<u32, Vec<String>>,
}

impl BuildPlan {
    /// Serialize to JSON
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// SHA-256 hex digest of the canonical JSON form
    ///
    /// Cheap identity check for "did anything change" comparisons between
    /// runs; equal digests imply byte-identical plans.
    pub fn digest(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        let hash = Sha256::digest(&json);
        hash.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Assemble the plan from the finished pipeline stages
pub fn synthesize(
    target: &TargetDeclaration,
    platform: Platform,
    registry: &ModuleRegistry,
    graph: &DependencyGraph,
    order: &[usize],
    visibility: &VisibilityMap,
) -> BuildPlan {
    let n = registry.len();

    // Link inputs aggregate bottom-up over public and private edges.
    let mut link_inputs: Vec<BTreeSet<String>> = vec![BTreeSet::new(); n];
    for &v in order {
        let rules = &registry.module(v).rules;
        let mut libs: BTreeSet<String> = rules.public_libs.iter().cloned().collect();
        libs.extend(rules.private_libs.iter().cloned());
        for dep in graph.compile_time_deps(v) {
            libs.extend(link_inputs[dep].iter().cloned());
        }
        link_inputs[v] = libs;
    }

    let (group_of, pch_groups) = pch_groups(registry, graph, target.build_env);

    let mut modules = Vec::with_capacity(n);
    let mut order_names = Vec::with_capacity(n);
    for (position, &v) in order.iter().enumerate() {
        let rules = &registry.module(v).rules;
        let surface = visibility.compile_surface(v);
        order_names.push(rules.name.clone());
        modules.push(ResolvedModule {
            name: rules.name.clone(),
            kind: rules.kind,
            include_paths: surface.includes.iter().cloned().collect(),
            defines: surface.defines.iter().cloned().collect(),
            link_inputs: link_inputs[v].iter().cloned().collect(),
            pch_group: group_of[v],
            order: position,
        });
    }

    BuildPlan {
        target: target.name.clone(),
        platform,
        build_env: target.build_env,
        modules,
        order: order_names,
        pch_groups,
    }
}

/// Compute PCH sharing groups
///
/// Under `Shared`, internal shared-mode modules that are mutually reachable
/// through visibility edges whose endpoints are both shared-mode internal
/// modules coalesce into one group; a module using `Own`/`None` breaks the
/// chain. `Own` always yields a singleton group. Under `Unique`, sharing is
/// disabled and `Shared` degrades to a singleton group per module. External
/// modules are never compiled and never grouped.
fn pch_groups(
    registry: &ModuleRegistry,
    graph: &DependencyGraph,
    build_env: BuildEnvironment,
) -> (Vec<Option<u32>>, BTreeMap<u32, Vec<String>>) {
    let n = registry.len();
    let eligible = |v: usize| {
        let rules = &registry.module(v).rules;
        rules.kind == ModuleKind::Internal && rules.pch == PchMode::Shared
    };

    // Undirected adjacency between mutually eligible endpoints.
    let mut adjacent: Vec<Vec<usize>> = vec![Vec::new(); n];
    if build_env == BuildEnvironment::Shared {
        for v in 0..n {
            if !eligible(v) {
                continue;
            }
            for w in graph.compile_time_deps(v) {
                if eligible(w) {
                    adjacent[v].push(w);
                    adjacent[w].push(v);
                }
            }
        }
    }

    let mut group_of: Vec<Option<u32>> = vec![None; n];
    let mut groups: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    let mut next_id: u32 = 0;

    for v in 0..n {
        if group_of[v].is_some() {
            continue;
        }
        let rules = &registry.module(v).rules;
        if rules.kind != ModuleKind::Internal || rules.pch == PchMode::None {
            continue;
        }
        let id = next_id;
        next_id += 1;

        if build_env == BuildEnvironment::Shared && rules.pch == PchMode::Shared {
            // Flood the connected component of eligible modules.
            let mut pending = vec![v];
            group_of[v] = Some(id);
            while let Some(u) = pending.pop() {
                groups.entry(id).or_default().push(registry.module(u).name().to_string());
                for &w in &adjacent[u] {
                    if group_of[w].is_none() {
                        group_of[w] = Some(id);
                        pending.push(w);
                    }
                }
            }
            if let Some(members) = groups.get_mut(&id) {
                members.sort();
            }
        } else {
            // Own mode, or Shared under a unique build environment.
            group_of[v] = Some(id);
            groups.insert(id, vec![registry.module(v).name().to_string()]);
        }
    }

    (group_of, groups)
}
