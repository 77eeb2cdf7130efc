use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Anvil module dependency resolver and build planner.
///
/// Anvil reads module and target declarations (TOML or JSON), resolves the
/// dependency graph for a concrete platform, and emits a deterministic,
/// dependency-ordered build plan.
///
/// EXAMPLES:
///     anvil resolve --rules build.toml --target MyGame --platform linux
///     anvil check --rules build.toml          Validate all targets
///     anvil targets --rules build.toml        List declared targets
///
/// ENVIRONMENT VARIABLES:
///     ANVIL_JSON    Set to '1' for JSON output by default
///     NO_COLOR      Set to disable colored output
#[derive(Parser)]
#[command(name = "anvil")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve targets into build plans
    ///
    /// Loads declarations, resolves each requested target for the given
    /// platform, and emits the plan JSON. Multiple --target flags resolve
    /// in parallel over a shared closure cache. Warnings go to stderr;
    /// the plan goes to stdout or to --out.
    ///
    /// EXAMPLES:
    ///     anvil resolve --rules build.toml --target MyGame --platform linux
    ///     anvil resolve --rules build.toml -t MyGame -t MyEditor -p win64
    ///     anvil resolve --rules build.toml -t MyGame -p mac --out plan.json
    #[command(visible_alias = "r")]
    Resolve {
        /// Path to the declarations file (.toml or .json)
        #[arg(long, short = 'r')]
        rules: PathBuf,
        /// Target name to resolve (repeatable)
        #[arg(long, short = 't', required = true)]
        target: Vec<String>,
        /// Platform to resolve for (win64, mac, linux, android, ios)
        #[arg(long, short = 'p')]
        platform: anvil_decl::Platform,
        /// Write the plan JSON to a file instead of stdout
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
        /// Pretty-print the plan JSON
        #[arg(long)]
        pretty: bool,
        /// Print each plan's content digest to stderr
        #[arg(long)]
        digest: bool,
    },

    /// Validate all declared targets
    ///
    /// Resolves every declared target on every platform and reports the
    /// first hard error as a structured diagnostic. Warnings are printed
    /// but do not fail the check.
    ///
    /// EXAMPLES:
    ///     anvil check --rules build.toml
    ///     anvil check --rules build.json
    #[command(visible_alias = "c")]
    Check {
        /// Path to the declarations file (.toml or .json)
        #[arg(long, short = 'r')]
        rules: PathBuf,
    },

    /// List declared targets
    ///
    /// Prints each target with its kind and build environment.
    ///
    /// EXAMPLES:
    ///     anvil targets --rules build.toml
    ///     anvil targets --rules build.toml --json
    Targets {
        /// Path to the declarations file (.toml or .json)
        #[arg(long, short = 'r')]
        rules: PathBuf,
        /// Output as JSON
        #[arg(long, env = "ANVIL_JSON")]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            rules,
            target,
            platform,
            out,
            pretty,
            digest,
        } => {
            let args = commands::resolve::ResolveArgs {
                rules,
                targets: target,
                platform,
                out,
                pretty,
                digest,
            };
            commands::resolve::run(args)?;
        }
        Commands::Check { rules } => {
            commands::check::run(&rules)?;
        }
        Commands::Targets { rules, json } => {
            commands::targets::run(&rules, json)?;
        }
    }

    Ok(())
}
