//! Targets command - list declared targets

use anyhow::Result;
use colored::*;
use serde_json::json;
use std::path::Path;

/// List each declared target with its kind and build environment
pub fn run(rules: &Path, json_output: bool) -> Result<()> {
    let decls = super::load_declarations(rules)?;

    if json_output {
        let targets: Vec<_> = decls
            .targets
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "kind": t.kind.to_string(),
                    "buildEnv": t.build_env.to_string(),
                    "extraModules": t.extra_modules,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    if decls.targets.is_empty() {
        println!("{} declares no targets", rules.display());
        return Ok(());
    }

    for target in &decls.targets {
        let extras = if target.extra_modules.is_empty() {
            String::new()
        } else {
            format!(" (+{} extra)", target.extra_modules.len())
        };
        println!(
            "{}  {}/{}{}",
            target.name.bold(),
            target.kind,
            target.build_env,
            extras.dimmed()
        );
    }

    Ok(())
}
