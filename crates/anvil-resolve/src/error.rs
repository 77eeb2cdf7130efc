//! Resolution error and warning types

use anvil_decl::DeclError;
use std::fmt;
use thiserror::Error;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Hard resolution failures; each aborts resolution for its target only
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Unknown target: {name}")]
    UnknownTarget { name: String },

    #[error("Duplicate module declaration: '{name}'")]
    DuplicateModule { name: String },

    #[error("Module '{module}' depends on unknown module '{referenced}'")]
    UnknownModule { module: String, referenced: String },

    #[error("Module '{module}' depends on itself")]
    SelfDependency { module: String },

    #[error("Cyclic dependency: {}", chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    #[error("External module '{module}' may not depend on non-foundational internal module '{referenced}'")]
    ExternalDependencyViolation { module: String, referenced: String },

    #[error("Target '{target}' requires module '{module}', which is not active for this context")]
    InactiveExtraModule { target: String, module: String },

    #[error(transparent)]
    Decl(#[from] DeclError),
}

/// Soft findings; resolution continues and callers decide presentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A dependency name appeared in more than one visibility list of the
    /// same module; the strictest visibility was kept.
    VisibilityConflict {
        module: String,
        dependency: String,
        kept: crate::graph::Visibility,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VisibilityConflict {
                module,
                dependency,
                kept,
            } => write!(
                f,
                "module '{}' lists dependency '{}' with conflicting visibility; narrowed to {}",
                module, dependency, kept
            ),
        }
    }
}
