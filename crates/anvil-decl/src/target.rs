//! Target declarations

use crate::context::{BuildContext, BuildEnvironment, Platform, TargetKind};
use serde::{Deserialize, Serialize};

/// A named build configuration selecting a module universe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDeclaration {
    /// Target name
    pub name: String,
    /// Target kind
    pub kind: TargetKind,
    /// Build environment mode
    #[serde(default = "default_build_env")]
    pub build_env: BuildEnvironment,
    /// Extra modules appended to the dependency-derived set
    #[serde(default)]
    pub extra_modules: Vec<String>,
}

fn default_build_env() -> BuildEnvironment {
    BuildEnvironment::Shared
}

impl TargetDeclaration {
    /// Create a new target declaration
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            name: name.into(),
            kind,
            build_env: BuildEnvironment::Shared,
            extra_modules: Vec::new(),
        }
    }

    /// Set the build environment mode
    pub fn with_build_env(mut self, build_env: BuildEnvironment) -> Self {
        self.build_env = build_env;
        self
    }

    /// Add extra modules beyond the dependency-derived set
    pub fn with_extra_modules(mut self, modules: Vec<String>) -> Self {
        self.extra_modules = modules;
        self
    }

    /// The build context this target produces for the given platform
    pub fn context_for(&self, platform: Platform) -> BuildContext {
        BuildContext::new(platform, self.kind, self.build_env)
    }
}
