//! Active-set filtering
//!
//! First resolver stage: evaluate every module declaration's applicability
//! predicate against the concrete build context and flatten the survivors'
//! conditional fragments. Later stages only ever see [`ActiveModule`]s.

use anvil_decl::{BuildContext, DeclarationSet, ResolvedRules};

/// One module flattened for a concrete build context
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveModule {
    /// Flattened rules (fragments already merged)
    pub rules: ResolvedRules,
    /// Position in the declaration set; the deterministic tie-break key
    pub decl_index: usize,
}

impl ActiveModule {
    /// Module name shorthand
    pub fn name(&self) -> &str {
        &self.rules.name
    }
}

/// Filter a declaration set down to the modules active for `ctx`
///
/// Every declaration is either included (flattened) or excluded; there is no
/// partial match. Declaration order is preserved.
pub fn filter_active(decls: &DeclarationSet, ctx: &BuildContext) -> Vec<ActiveModule> {
    decls
        .modules
        .iter()
        .enumerate()
        .filter_map(|(decl_index, module)| {
            module
                .resolve_for(ctx)
                .map(|rules| ActiveModule { rules, decl_index })
        })
        .collect()
}
