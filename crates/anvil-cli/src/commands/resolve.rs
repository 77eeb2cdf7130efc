//! Resolve command - turn declarations into build plans

use anvil_decl::Platform;
use anvil_resolve::{BuildPlan, ClosureCache, Resolver};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the resolve command
pub struct ResolveArgs {
    /// Path to the declarations file
    pub rules: PathBuf,
    /// Targets to resolve
    pub targets: Vec<String>,
    /// Platform to resolve for
    pub platform: Platform,
    /// Write plan JSON here instead of stdout
    pub out: Option<PathBuf>,
    /// Pretty-print the JSON
    pub pretty: bool,
    /// Print content digests to stderr
    pub digest: bool,
}

/// Run the resolve command
pub fn run(args: ResolveArgs) -> Result<()> {
    let decls = super::load_declarations(&args.rules)?;

    // All targets share one closure cache; overlapping module subgraphs
    // are only walked once per build context.
    let cache = Arc::new(ClosureCache::new());
    let resolver = Resolver::new(&decls).with_cache(cache);

    let requests: Vec<(String, Platform)> = args
        .targets
        .iter()
        .map(|t| (t.clone(), args.platform))
        .collect();

    let mut plans = Vec::with_capacity(requests.len());
    for ((target, _), result) in requests.iter().zip(resolver.resolve_many(&requests)) {
        let resolution = result
            .with_context(|| format!("Failed to resolve target '{}'", target))?;
        super::print_warnings(&resolution.warnings);
        if args.digest {
            eprintln!("{}  {}", resolution.plan.digest(), target);
        }
        plans.push(resolution.plan);
    }

    let json = render(&plans, args.pretty)?;
    match &args.out {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write plan to {}", path.display()))?,
        None => println!("{}", json),
    }

    Ok(())
}

/// A single plan serializes as an object, several as an array
fn render(plans: &[BuildPlan], pretty: bool) -> Result<String> {
    let json = match (plans, pretty) {
        ([plan], pretty) => plan.to_json(pretty)?,
        (plans, true) => serde_json::to_string_pretty(plans)?,
        (plans, false) => serde_json::to_string(plans)?,
    };
    Ok(json)
}
