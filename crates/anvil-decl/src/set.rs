//! Declaration set loading and static validation
//!
//! A [`DeclarationSet`] holds every module and target declaration for one
//! project. It can be parsed from TOML or JSON, or assembled
//! programmatically; either way it is immutable input to the resolver.
//! Duplicate module names are deliberately *kept* here: collapsing them at
//! parse time would hide the error, and the resolver reports them per
//! target instead.

use crate::error::{DeclError, DeclResult};
use crate::module::ModuleDeclaration;
use crate::target::TargetDeclaration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// All declarations for one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeclarationSet {
    #[serde(default)]
    pub modules: Vec<ModuleDeclaration>,
    #[serde(default)]
    pub targets: Vec<TargetDeclaration>,
}

impl DeclarationSet {
    /// Create an empty declaration set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a declaration set from TOML
    pub fn from_toml_str(content: &str) -> DeclResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a declaration set from JSON
    pub fn from_json_str(content: &str) -> DeclResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a file, picking the format by extension (`.json` or TOML)
    pub fn from_file(path: &Path) -> DeclResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DeclError::Parse(e.to_string()))?;
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Add a module declaration
    pub fn with_module(mut self, module: ModuleDeclaration) -> Self {
        self.modules.push(module);
        self
    }

    /// Add a target declaration
    pub fn with_target(mut self, target: TargetDeclaration) -> Self {
        self.targets.push(target);
        self
    }

    /// Look up a target declaration by name
    pub fn target(&self, name: &str) -> Option<&TargetDeclaration> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Static well-formedness checks, collecting every violation
    ///
    /// This is a cheap pass over names only. Context-dependent failures
    /// (duplicates in an active set, unknown dependency references) remain
    /// the resolver's job because they depend on which modules survive
    /// platform filtering.
    pub fn validate(&self) -> Result<(), Vec<DeclError>> {
        let mut errors = Vec::new();

        let known: HashSet<&str> = self.modules.iter().map(|m| m.name.as_str()).collect();

        for module in &self.modules {
            if let Err(e) = validate_name(&module.name) {
                errors.push(DeclError::InvalidModuleName(e));
            }
        }
        for target in &self.targets {
            if let Err(e) = validate_name(&target.name) {
                errors.push(DeclError::InvalidTargetName(e));
            }
            for extra in &target.extra_modules {
                if !known.contains(extra.as_str()) {
                    errors.push(DeclError::UnknownExtraModule {
                        target: target.name.clone(),
                        module: extra.clone(),
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(format!(
            "'{}' contains invalid characters (only alphanumerics, -, _ allowed)",
            name
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TargetKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_minimal_toml() {
        let toml = r#"
            [[modules]]
            name = "Core"
            public_includes = ["Core/Public"]

            [[modules]]
            name = "Engine"
            public_deps = ["Core"]

            [[targets]]
            name = "MyGame"
            kind = "game"
        "#;
        let set = DeclarationSet::from_toml_str(toml).unwrap();
        assert_eq!(set.modules.len(), 2);
        assert_eq!(set.targets.len(), 1);
        assert_eq!(set.modules[1].public_deps, vec!["Core"]);
    }

    #[test]
    fn test_parse_module_with_predicate_and_override() {
        let toml = r#"
            [[modules]]
            name = "D3D12RHI"
            applies = "platform == win64"

            [[modules]]
            name = "Renderer"
            public_deps = ["Core"]

            [[modules.overrides]]
            layer = "platform"
            applies = "platform == win64"
            private_deps = ["D3D12RHI"]
        "#;
        let set = DeclarationSet::from_toml_str(toml).unwrap();
        assert_eq!(set.modules[1].overrides.len(), 1);
        assert_eq!(set.modules[1].overrides[0].private_deps, vec!["D3D12RHI"]);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "modules": [{"name": "Core", "pch": "shared"}],
            "targets": [{"name": "MyEditor", "kind": "editor", "build_env": "unique"}]
        }"#;
        let set = DeclarationSet::from_json_str(json).unwrap();
        assert_eq!(set.modules.len(), 1);
        assert_eq!(set.targets[0].name, "MyEditor");
    }

    #[test]
    fn test_unknown_predicate_token_fails_parse() {
        let toml = r#"
            [[modules]]
            name = "Foo"
            applies = "platform == amiga"
        "#;
        assert!(DeclarationSet::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_validate_extra_module_reference() {
        let set = DeclarationSet::new()
            .with_module(ModuleDeclaration::new("Core"))
            .with_target(
                TargetDeclaration::new("MyGame", TargetKind::Game)
                    .with_extra_modules(vec!["Missing".to_string()]),
            );
        let errors = set.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![DeclError::UnknownExtraModule {
                target: "MyGame".to_string(),
                module: "Missing".to_string(),
            }]
        );
    }

    #[test]
    fn test_validate_bad_names() {
        let set = DeclarationSet::new()
            .with_module(ModuleDeclaration::new("My Module"))
            .with_target(TargetDeclaration::new("", TargetKind::Game));
        let errors = set.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_duplicates_survive_parsing() {
        // Duplicate detection is the resolver's job; parsing must not collapse.
        let toml = r#"
            [[modules]]
            name = "Foo"

            [[modules]]
            name = "Foo"
        "#;
        let set = DeclarationSet::from_toml_str(toml).unwrap();
        assert_eq!(set.modules.len(), 2);
    }

    #[test]
    fn test_target_lookup() {
        let set = DeclarationSet::new()
            .with_target(TargetDeclaration::new("MyGame", TargetKind::Game));
        assert!(set.target("MyGame").is_some());
        assert!(set.target("Other").is_none());
    }
}
