//! Anvil declaration model
//!
//! In-memory representation of per-module and per-target build rule
//! declarations:
//! - Module and target declaration records with visibility-split rule lists
//! - Typed applicability predicates over an enumerated context vocabulary
//! - Conditional override fragments with layered precedence
//! - TOML/JSON loading and static validation
//!
//! Declarations are immutable once parsed. Everything derived from them
//! (graphs, closures, build plans) lives in `anvil-resolve`.

pub mod context;
pub mod error;
pub mod fragment;
pub mod module;
pub mod predicate;
pub mod set;
pub mod target;

// Re-export main types
pub use context::{BuildContext, BuildEnvironment, Platform, TargetKind};
pub use error::{DeclError, DeclResult};
pub use fragment::{OverrideLayer, RuleFragment};
pub use module::{ModuleDeclaration, ModuleKind, PchMode, ResolvedRules};
pub use predicate::Predicate;
pub use set::DeclarationSet;
pub use target::TargetDeclaration;
