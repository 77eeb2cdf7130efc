//! Per-run module registry
//!
//! An explicit value passed into every later stage (no global state), scoped
//! to one resolution run. Insertion enforces name uniqueness within the
//! target's module universe.

use crate::context::ActiveModule;
use crate::error::{ResolveError, ResolveResult};
use std::collections::HashMap;

/// Name-indexed registry over the active module set
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    modules: Vec<ActiveModule>,
    by_name: HashMap<String, usize>,
}

impl ModuleRegistry {
    /// Build a registry from the active set, rejecting duplicate names
    pub fn from_active(active: Vec<ActiveModule>) -> ResolveResult<Self> {
        let mut registry = Self {
            modules: Vec::with_capacity(active.len()),
            by_name: HashMap::with_capacity(active.len()),
        };
        for module in active {
            registry.insert(module)?;
        }
        Ok(registry)
    }

    fn insert(&mut self, module: ActiveModule) -> ResolveResult<()> {
        let name = module.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(ResolveError::DuplicateModule { name });
        }
        self.by_name.insert(name, self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    /// Node id for a module name
    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Module by node id
    pub fn module(&self, id: usize) -> &ActiveModule {
        &self.modules[id]
    }

    /// All modules in declaration order
    pub fn modules(&self) -> &[ActiveModule] {
        &self.modules
    }

    /// Number of registered modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_decl::{BuildContext, BuildEnvironment, ModuleDeclaration, Platform, TargetKind};

    fn active(name: &str, decl_index: usize) -> ActiveModule {
        let ctx = BuildContext::new(Platform::Linux, TargetKind::Game, BuildEnvironment::Shared);
        ActiveModule {
            rules: ModuleDeclaration::new(name).resolve_for(&ctx).unwrap(),
            decl_index,
        }
    }

    #[test]
    fn test_registry_lookup() {
        let registry =
            ModuleRegistry::from_active(vec![active("Core", 0), active("Engine", 1)]).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.id_of("Engine"), Some(1));
        assert_eq!(registry.module(0).name(), "Core");
        assert_eq!(registry.id_of("Missing"), None);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = ModuleRegistry::from_active(vec![active("Foo", 0), active("Foo", 1)])
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::DuplicateModule {
                name: "Foo".to_string()
            }
        );
    }
}
