pub mod check;
pub mod resolve;
pub mod targets;

use anvil_decl::DeclarationSet;
use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

/// Load and validate a declarations file
pub fn load_declarations(path: &Path) -> Result<DeclarationSet> {
    let decls = DeclarationSet::from_file(path)
        .with_context(|| format!("Failed to load declarations from {}", path.display()))?;

    if let Err(errors) = decls.validate() {
        for error in &errors {
            eprintln!("{}: {}", "error".red().bold(), error);
        }
        anyhow::bail!(
            "{} has {} invalid declaration(s)",
            path.display(),
            errors.len()
        );
    }

    Ok(decls)
}

/// Print resolution warnings to stderr
pub fn print_warnings(warnings: &[anvil_resolve::Warning]) {
    for warning in warnings {
        eprintln!("{}: {}", "warning".yellow().bold(), warning);
    }
}
