mod config;
mod walk;

use std::path::PathBuf;

use clap::Parser;

use flagprune_common::FlagConfig;

#[derive(Parser)]
#[command(
    name = "flagprune",
    version,
    about = "Remove resolved feature flags from source code"
)]
struct Cli {
    /// Path to the flag configuration file (TOML or JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// File or directory to transform
    #[arg(short, long)]
    target: PathBuf,

    /// Report what would change without writing any files
    #[arg(short, long)]
    dry_run: bool,

    /// Emit debug-level diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Comma-separated glob patterns of paths to skip
    #[arg(short, long, default_value = "")]
    exclude: String,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(false)
        .init();
}

/// Run one file through the engine, print its summary line, and write the
/// result back unless `dry_run`. Returns `true` if the file had changes.
fn process_file(
    path: &std::path::Path,
    config: &FlagConfig,
    dry_run: bool,
) -> anyhow::Result<bool> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;

    let result = flagprune_core::transform(&source, config);

    for warning in &result.warnings {
        tracing::warn!(file = %path.display(), "{warning}");
    }

    if !result.has_changes() {
        tracing::debug!(file = %path.display(), "no changes");
        return Ok(false);
    }

    let prefix = if dry_run { "Would modify" } else { "Modified" };
    println!("{prefix} {}: {}", path.display(), result.summary());

    if !dry_run {
        std::fs::write(path, &result.transformed_source)
            .map_err(|e| anyhow::anyhow!("writing {}: {e}", path.display()))?;
    }

    Ok(true)
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let (config, warnings) = match config::load_config(&cli.config) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("[flagprune] {err}");
            return Ok(1);
        }
    };
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    let excludes = walk::build_exclude_set(&cli.exclude)?;
    let files = walk::discover_files(&cli.target, &excludes);

    if files.is_empty() {
        tracing::debug!(target = %cli.target.display(), "no files found");
    }

    let mut changed = 0usize;
    for path in &files {
        match process_file(path, &config, cli.dry_run) {
            Ok(true) => changed += 1,
            Ok(false) => {}
            Err(err) => {
                eprintln!("[flagprune] {err}");
            }
        }
    }

    tracing::debug!(files = files.len(), changed, "run complete");
    Ok(0)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = run(&cli).unwrap_or_else(|e| {
        eprintln!("[flagprune] error: {e:#}");
        1
    });
    std::process::exit(exit_code);
}
