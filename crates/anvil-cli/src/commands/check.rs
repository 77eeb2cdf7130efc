//! Check command - validate every target on every platform

use anvil_decl::Platform;
use anvil_resolve::{ClosureCache, Resolver};
use anyhow::Result;
use colored::*;
use std::path::Path;
use std::sync::Arc;

/// Resolve every declared target on every platform, stopping at the first
/// hard error. Warnings are printed but do not fail the check.
pub fn run(rules: &Path) -> Result<()> {
    let decls = super::load_declarations(rules)?;

    if decls.targets.is_empty() {
        println!("{} declares no targets; nothing to check", rules.display());
        return Ok(());
    }

    let requests: Vec<(String, Platform)> = decls
        .targets
        .iter()
        .flat_map(|target| {
            Platform::ALL
                .iter()
                .map(|platform| (target.name.clone(), *platform))
        })
        .collect();

    let cache = Arc::new(ClosureCache::new());
    let resolver = Resolver::new(&decls).with_cache(cache);
    let results = resolver.resolve_many(&requests);

    let mut warning_count = 0;
    for ((target, platform), result) in requests.iter().zip(results) {
        match result {
            Ok(resolution) => {
                for warning in &resolution.warnings {
                    eprintln!(
                        "{}: {} [{} on {}]",
                        "warning".yellow().bold(),
                        warning,
                        target,
                        platform
                    );
                }
                warning_count += resolution.warnings.len();
            }
            Err(error) => {
                eprintln!(
                    "{}: {} [{} on {}]",
                    "error".red().bold(),
                    error,
                    target,
                    platform
                );
                anyhow::bail!("check failed for target '{}' on {}", target, platform);
            }
        }
    }

    let checked = format!(
        "{} target(s) across {} platform(s)",
        decls.targets.len(),
        Platform::ALL.len()
    );
    if warning_count > 0 {
        println!(
            "{} {} ({} warning(s))",
            "ok:".green().bold(),
            checked,
            warning_count
        );
    } else {
        println!("{} {}", "ok:".green().bold(), checked);
    }

    Ok(())
}
