//! Conditional override fragments
//!
//! A fragment is a partial rule set gated behind its own predicate. When a
//! module is flattened for a context, matching fragments merge into the base
//! rules in layer precedence order: target-kind layer over platform layer
//! over default layer, later fragments winning within a layer. List fields
//! append; scalar fields replace when the fragment sets them.

use crate::module::{PchMode, ResolvedRules};
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};

/// Precedence layer of an override fragment
///
/// Ordering is precedence: `Default < Platform < TargetKind`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum OverrideLayer {
    #[default]
    Default,
    Platform,
    #[serde(rename = "target")]
    TargetKind,
}

/// A conditional partial rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RuleFragment {
    #[serde(default)]
    pub layer: OverrideLayer,
    #[serde(default)]
    pub applies: Predicate,
    #[serde(default)]
    pub public_deps: Vec<String>,
    #[serde(default)]
    pub private_deps: Vec<String>,
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
    #[serde(default)]
    pub public_libs: Vec<String>,
    #[serde(default)]
    pub private_libs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pch: Option<PchMode>,
}

impl RuleFragment {
    /// Create an empty fragment for the given layer and predicate
    pub fn new(layer: OverrideLayer, applies: Predicate) -> Self {
        Self {
            layer,
            applies,
            ..Self::default()
        }
    }

    /// A fragment whose layer matches the axes its predicate mentions
    ///
    /// Target-kind mentions take the target layer, platform mentions the
    /// platform layer, anything else the default layer.
    pub fn for_predicate(applies: Predicate) -> Self {
        let layer = if applies.mentions_target_kind() {
            OverrideLayer::TargetKind
        } else if applies.mentions_platform() {
            OverrideLayer::Platform
        } else {
            OverrideLayer::Default
        };
        Self::new(layer, applies)
    }

    /// Set public dependencies added by this fragment
    pub fn with_public_deps(mut self, deps: Vec<String>) -> Self {
        self.public_deps = deps;
        self
    }

    /// Set private dependencies added by this fragment
    pub fn with_private_deps(mut self, deps: Vec<String>) -> Self {
        self.private_deps = deps;
        self
    }

    /// Set dynamic dependencies added by this fragment
    pub fn with_dynamic_deps(mut self, deps: Vec<String>) -> Self {
        self.dynamic_deps = deps;
        self
    }

    /// Set public include paths added by this fragment
    pub fn with_public_includes(mut self, includes: Vec<String>) -> Self {
        self.public_includes = includes;
        self
    }

    /// Set private include paths added by this fragment
    pub fn with_private_includes(mut self, includes: Vec<String>) -> Self {
        self.private_includes = includes;
        self
    }

    /// Set public defines added by this fragment
    pub fn with_public_defines(mut self, defines: Vec<String>) -> Self {
        self.public_defines = defines;
        self
    }

    /// Set private defines added by this fragment
    pub fn with_private_defines(mut self, defines: Vec<String>) -> Self {
        self.private_defines = defines;
        self
    }

    /// Set public libraries added by this fragment
    pub fn with_public_libs(mut self, libs: Vec<String>) -> Self {
        self.public_libs = libs;
        self
    }

    /// Set private libraries added by this fragment
    pub fn with_private_libs(mut self, libs: Vec<String>) -> Self {
        self.private_libs = libs;
        self
    }

    /// Replace the PCH mode when this fragment applies
    pub fn with_pch(mut self, pch: PchMode) -> Self {
        self.pch = Some(pch);
        self
    }

    /// Merge this fragment into flattened rules
    pub(crate) fn merge_into(&self, rules: &mut ResolvedRules) {
        rules.public_deps.extend(self.public_deps.iter().cloned());
        rules.private_deps.extend(self.private_deps.iter().cloned());
        rules.dynamic_deps.extend(self.dynamic_deps.iter().cloned());
        rules
            .public_includes
            .extend(self.public_includes.iter().cloned());
        rules
            .private_includes
            .extend(self.private_includes.iter().cloned());
        rules
            .public_defines
            .extend(self.public_defines.iter().cloned());
        rules
            .private_defines
            .extend(self.private_defines.iter().cloned());
        rules.public_libs.extend(self.public_libs.iter().cloned());
        rules.private_libs.extend(self.private_libs.iter().cloned());
        if let Some(pch) = self.pch {
            rules.pch = pch;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuildContext, BuildEnvironment, Platform, TargetKind};
    use crate::module::ModuleDeclaration;
    use pretty_assertions::assert_eq;

    fn ctx(platform: Platform, kind: TargetKind) -> BuildContext {
        BuildContext::new(platform, kind, BuildEnvironment::Shared)
    }

    #[test]
    fn test_layer_ordering() {
        assert!(OverrideLayer::Default < OverrideLayer::Platform);
        assert!(OverrideLayer::Platform < OverrideLayer::TargetKind);
    }

    #[test]
    fn test_for_predicate_infers_layer() {
        let platform = RuleFragment::for_predicate(
            Predicate::parse("platform == win64").unwrap(),
        );
        assert_eq!(platform.layer, OverrideLayer::Platform);

        let target = RuleFragment::for_predicate(
            Predicate::parse("target == editor and platform == mac").unwrap(),
        );
        assert_eq!(target.layer, OverrideLayer::TargetKind);

        let default = RuleFragment::for_predicate(Predicate::Always);
        assert_eq!(default.layer, OverrideLayer::Default);
    }

    #[test]
    fn test_lists_append_in_layer_order() {
        let module = ModuleDeclaration::new("Engine")
            .with_public_defines(vec!["BASE=1".to_string()])
            .with_override(
                RuleFragment::for_predicate(Predicate::parse("target == editor").unwrap())
                    .with_public_defines(vec!["WITH_EDITOR=1".to_string()]),
            )
            .with_override(
                RuleFragment::for_predicate(Predicate::parse("platform == win64").unwrap())
                    .with_public_defines(vec!["PLATFORM_WINDOWS=1".to_string()]),
            );

        let rules = module
            .resolve_for(&ctx(Platform::Win64, TargetKind::Editor))
            .unwrap();
        // Platform layer applies before the target-kind layer even though it
        // was declared after it.
        assert_eq!(
            rules.public_defines,
            vec!["BASE=1", "PLATFORM_WINDOWS=1", "WITH_EDITOR=1"]
        );
    }

    #[test]
    fn test_scalar_replace_highest_layer_wins() {
        let module = ModuleDeclaration::new("Engine")
            .with_pch(PchMode::Shared)
            .with_override(
                RuleFragment::for_predicate(Predicate::parse("platform == android").unwrap())
                    .with_pch(PchMode::None),
            )
            .with_override(
                RuleFragment::for_predicate(Predicate::parse("target == program").unwrap())
                    .with_pch(PchMode::Own),
            );

        let rules = module
            .resolve_for(&ctx(Platform::Android, TargetKind::Program))
            .unwrap();
        assert_eq!(rules.pch, PchMode::Own);

        let rules = module
            .resolve_for(&ctx(Platform::Android, TargetKind::Game))
            .unwrap();
        assert_eq!(rules.pch, PchMode::None);
    }

    #[test]
    fn test_later_fragment_wins_within_layer() {
        let module = ModuleDeclaration::new("Engine")
            .with_override(
                RuleFragment::for_predicate(Predicate::parse("platform == linux").unwrap())
                    .with_pch(PchMode::Own),
            )
            .with_override(
                RuleFragment::for_predicate(Predicate::parse("platform != win64").unwrap())
                    .with_pch(PchMode::None),
            );

        let rules = module
            .resolve_for(&ctx(Platform::Linux, TargetKind::Game))
            .unwrap();
        assert_eq!(rules.pch, PchMode::None);
    }

    #[test]
    fn test_non_matching_fragment_ignored() {
        let module = ModuleDeclaration::new("Engine").with_override(
            RuleFragment::for_predicate(Predicate::parse("platform == ios").unwrap())
                .with_public_libs(vec!["Metal.framework".to_string()]),
        );

        let rules = module
            .resolve_for(&ctx(Platform::Linux, TargetKind::Game))
            .unwrap();
        assert!(rules.public_libs.is_empty());
    }

    #[test]
    fn test_fragment_adds_conditional_dependency() {
        let module = ModuleDeclaration::new("Renderer")
            .with_public_deps(vec!["Core".to_string()])
            .with_override(
                RuleFragment::for_predicate(Predicate::parse("platform == win64").unwrap())
                    .with_private_deps(vec!["D3D12RHI".to_string()]),
            );

        let rules = module
            .resolve_for(&ctx(Platform::Win64, TargetKind::Game))
            .unwrap();
        assert_eq!(rules.private_deps, vec!["D3D12RHI"]);

        let rules = module
            .resolve_for(&ctx(Platform::Linux, TargetKind::Game))
            .unwrap();
        assert!(rules.private_deps.is_empty());
    }
}
