//! Module declarations
//!
//! A [`ModuleDeclaration`] is one component's build rules: its dependency
//! lists by visibility, its public/private compile surface, its precompiled
//! header policy, and the contexts it applies to. Declarations are immutable
//! once parsed; the resolver only ever reads them.

use crate::context::BuildContext;
use crate::fragment::RuleFragment;
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Built from source as part of this project
    #[default]
    Internal,
    /// Precompiled / third-party; exposes include paths and link inputs only
    External,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::External => write!(f, "external"),
        }
    }
}

/// Precompiled-header policy for a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PchMode {
    /// No precompiled header
    #[default]
    None,
    /// Module builds and uses its own private PCH
    Own,
    /// Module may share a PCH with adjacent shared-mode modules
    Shared,
}

impl fmt::Display for PchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Own => write!(f, "own"),
            Self::Shared => write!(f, "shared"),
        }
    }
}

/// One module's build rule declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDeclaration {
    /// Module name, unique within a target's module universe
    pub name: String,
    #[serde(default)]
    pub kind: ModuleKind,
    /// Internal modules marked foundational may be depended on by External
    /// modules (generated-code layering rule)
    #[serde(default)]
    pub foundational: bool,
    /// Dependencies whose public surface re-exports to this module's dependents
    #[serde(default)]
    pub public_deps: Vec<String>,
    /// Dependencies consumed locally, never re-exported
    #[serde(default)]
    pub private_deps: Vec<String>,
    /// Link-time-optional dependencies; impose no compile-time ordering
    #[serde(default)]
    pub dynamic_deps: Vec<String>,
    #[serde(default)]
    pub public_includes: Vec<String>,
    #[serde(default)]
    pub private_includes: Vec<String>,
    #[serde(default)]
    pub public_defines: Vec<String>,
    #[serde(default)]
    pub private_defines: Vec<String>,
    /// External libraries exposed to dependents
    #[serde(default)]
    pub public_libs: Vec<String>,
    /// External libraries consumed by this module only
    #[serde(default)]
    pub private_libs: Vec<String>,
    #[serde(default)]
    pub pch: PchMode,
    /// Applicability predicate; `always` unless declared otherwise
    #[serde(default)]
    pub applies: Predicate,
    /// Conditional override fragments, applied in layer precedence order
    #[serde(default)]
    pub overrides: Vec<RuleFragment>,
}

impl ModuleDeclaration {
    /// Create a new internal module declaration with empty rule lists
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ModuleKind::Internal,
            foundational: false,
            public_deps: Vec::new(),
            private_deps: Vec::new(),
            dynamic_deps: Vec::new(),
            public_includes: Vec::new(),
            private_includes: Vec::new(),
            public_defines: Vec::new(),
            private_defines: Vec::new(),
            public_libs: Vec::new(),
            private_libs: Vec::new(),
            pch: PchMode::None,
            applies: Predicate::Always,
            overrides: Vec::new(),
        }
    }

    /// Create a new external module declaration
    pub fn external(name: impl Into<String>) -> Self {
        Self {
            kind: ModuleKind::External,
            ..Self::new(name)
        }
    }

    /// Mark this module as foundational
    pub fn foundational(mut self) -> Self {
        self.foundational = true;
        self
    }

    /// Set public dependencies
    pub fn with_public_deps(mut self, deps: Vec<String>) -> Self {
        self.public_deps = deps;
        self
    }

    /// Set private dependencies
    pub fn with_private_deps(mut self, deps: Vec<String>) -> Self {
        self.private_deps = deps;
        self
    }

    /// Set dynamic dependencies
    pub fn with_dynamic_deps(mut self, deps: Vec<String>) -> Self {
        self.dynamic_deps = deps;
        self
    }

    /// Set public include paths
    pub fn with_public_includes(mut self, includes: Vec<String>) -> Self {
        self.public_includes = includes;
        self
    }

    /// Set private include paths
    pub fn with_private_includes(mut self, includes: Vec<String>) -> Self {
        self.private_includes = includes;
        self
    }

    /// Set public preprocessor definitions
    pub fn with_public_defines(mut self, defines: Vec<String>) -> Self {
        self.public_defines = defines;
        self
    }

    /// Set private preprocessor definitions
    pub fn with_private_defines(mut self, defines: Vec<String>) -> Self {
        self.private_defines = defines;
        self
    }

    /// Set public external library references
    pub fn with_public_libs(mut self, libs: Vec<String>) -> Self {
        self.public_libs = libs;
        self
    }

    /// Set private external library references
    pub fn with_private_libs(mut self, libs: Vec<String>) -> Self {
        self.private_libs = libs;
        self
    }

    /// Set the precompiled-header mode
    pub fn with_pch(mut self, pch: PchMode) -> Self {
        self.pch = pch;
        self
    }

    /// Set the applicability predicate
    pub fn with_applies(mut self, applies: Predicate) -> Self {
        self.applies = applies;
        self
    }

    /// Add a conditional override fragment
    pub fn with_override(mut self, fragment: RuleFragment) -> Self {
        self.overrides.push(fragment);
        self
    }

    /// Flatten this declaration for a concrete context
    ///
    /// Returns `None` when the applicability predicate excludes the context;
    /// otherwise returns the base rules with every matching override fragment
    /// merged in precedence order (see [`RuleFragment`]).
    pub fn resolve_for(&self, ctx: &BuildContext) -> Option<ResolvedRules> {
        if !self.applies.evaluate(ctx) {
            return None;
        }
        let mut rules = ResolvedRules {
            name: self.name.clone(),
            kind: self.kind,
            foundational: self.foundational,
            public_deps: self.public_deps.clone(),
            private_deps: self.private_deps.clone(),
            dynamic_deps: self.dynamic_deps.clone(),
            public_includes: self.public_includes.clone(),
            private_includes: self.private_includes.clone(),
            public_defines: self.public_defines.clone(),
            private_defines: self.private_defines.clone(),
            public_libs: self.public_libs.clone(),
            private_libs: self.private_libs.clone(),
            pch: self.pch,
        };
        let mut matching: Vec<&RuleFragment> = self
            .overrides
            .iter()
            .filter(|f| f.applies.evaluate(ctx))
            .collect();
        // Stable sort keeps declaration order within a layer, so later
        // fragments at equal precedence override earlier ones.
        matching.sort_by_key(|f| f.layer);
        for fragment in matching {
            fragment.merge_into(&mut rules);
        }
        Some(rules)
    }
}

/// A module declaration flattened for one concrete build context
///
/// All conditional fragments are already merged; the resolver pipeline only
/// ever sees this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRules {
    pub name: String,
    pub kind: ModuleKind,
    pub foundational: bool,
    pub public_deps: Vec<String>,
    pub private_deps: Vec<String>,
    pub dynamic_deps: Vec<String>,
    pub public_includes: Vec<String>,
    pub private_includes: Vec<String>,
    pub public_defines: Vec<String>,
    pub private_defines: Vec<String>,
    pub public_libs: Vec<String>,
    pub private_libs: Vec<String>,
    pub pch: PchMode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuildEnvironment, Platform, TargetKind};
    use pretty_assertions::assert_eq;

    fn ctx(platform: Platform) -> BuildContext {
        BuildContext::new(platform, TargetKind::Game, BuildEnvironment::Shared)
    }

    #[test]
    fn test_new_module_defaults() {
        let module = ModuleDeclaration::new("Core");
        assert_eq!(module.kind, ModuleKind::Internal);
        assert_eq!(module.pch, PchMode::None);
        assert_eq!(module.applies, Predicate::Always);
        assert!(!module.foundational);
    }

    #[test]
    fn test_external_constructor() {
        let module = ModuleDeclaration::external("zlib");
        assert_eq!(module.kind, ModuleKind::External);
    }

    #[test]
    fn test_resolve_for_inapplicable_context() {
        let module = ModuleDeclaration::new("D3D12RHI")
            .with_applies(Predicate::Platform(Platform::Win64));
        assert!(module.resolve_for(&ctx(Platform::Linux)).is_none());
        assert!(module.resolve_for(&ctx(Platform::Win64)).is_some());
    }

    #[test]
    fn test_resolve_for_copies_base_rules() {
        let module = ModuleDeclaration::new("Core")
            .with_public_includes(vec!["Core/Public".to_string()])
            .with_private_defines(vec!["CORE_IMPL=1".to_string()])
            .with_pch(PchMode::Shared);
        let rules = module.resolve_for(&ctx(Platform::Linux)).unwrap();
        assert_eq!(rules.public_includes, vec!["Core/Public"]);
        assert_eq!(rules.private_defines, vec!["CORE_IMPL=1"]);
        assert_eq!(rules.pch, PchMode::Shared);
    }

    #[test]
    fn test_serde_defaults_for_omitted_lists() {
        let json = r#"{"name": "Core"}"#;
        let module: ModuleDeclaration = serde_json::from_str(json).unwrap();
        assert_eq!(module.name, "Core");
        assert!(module.public_deps.is_empty());
        assert_eq!(module.applies, Predicate::Always);
    }
}
