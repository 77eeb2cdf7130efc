//! Anvil module dependency resolution
//!
//! Turns a set of module/target declarations into a deterministic,
//! dependency-ordered build plan for one concrete build context:
//! - Active-set filtering against platform/target/environment predicates
//! - Typed dependency graph construction with visibility narrowing
//! - Cycle detection over the compile-time subgraph (Tarjan SCC)
//! - Public/private visibility propagation with memoized closures
//! - Build plan synthesis with deterministic ordering and PCH grouping
//!
//! The pipeline is a strict forward data flow; no stage mutates an earlier
//! stage's output. Multiple targets resolve in parallel over the same
//! immutable declarations, optionally sharing a compute-once closure cache.

pub mod cache;
pub mod context;
pub mod cycles;
pub mod error;
pub mod graph;
pub mod plan;
pub mod registry;
pub mod resolver;
pub mod visibility;

// Re-export main types
pub use cache::ClosureCache;
pub use context::{filter_active, ActiveModule};
pub use error::{ResolveError, ResolveResult, Warning};
pub use graph::{DependencyGraph, Edge, Visibility};
pub use plan::{synthesize, topo_order, BuildPlan, ResolvedModule};
pub use registry::ModuleRegistry;
pub use resolver::{Resolution, Resolver};
pub use visibility::{propagate, PublicSurface, VisibilityMap};

// Re-export declaration types for convenience
pub use anvil_decl::{
    BuildContext, BuildEnvironment, DeclarationSet, ModuleDeclaration, ModuleKind, PchMode,
    Platform, Predicate, TargetDeclaration, TargetKind,
};
