use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use desk_config::PROJECT_DIR_NAME;

mod bootstrap;
mod cli;
mod commands;
mod context;
mod output;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("desk error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let serving = matches!(cli.command, cli::Commands::Serve(_));
    init_tracing(cli.quiet, cli.verbose, serving)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    match &cli.command {
        cli::Commands::Init(args) => {
            let root = explicit_or_current_dir(flags.project.as_deref())?;
            return commands::init::handle(args, &root, &flags).await;
        }
        cli::Commands::Serve(args) => {
            let root = resolve_project_root(flags.project.as_deref())?;
            return commands::serve::handle(args, &root).await;
        }
        _ => {}
    }

    let project_root = resolve_project_root(flags.project.as_deref())?;
    let config = bootstrap::load_config(&project_root)?;
    context::warn_unconfigured(&config);

    let ctx = context::AppContext::init(&project_root, config)
        .await
        .context("failed to initialize shopdesk application context")?;

    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool, serving: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else if serving {
        "info"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SHOPDESK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// `--project` as given (accepting the `.shopdesk` dir itself), else the
/// current directory. Used by `init`, which runs before the project exists.
fn explicit_or_current_dir(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    match project_override {
        Some(path) => Ok(strip_project_dir(Path::new(path))),
        None => std::env::current_dir().context("failed to read current directory"),
    }
}

fn resolve_project_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    if let Some(path) = project_override {
        let explicit = strip_project_dir(Path::new(path));
        if explicit.is_dir() {
            return Ok(explicit);
        }
        anyhow::bail!(
            "invalid --project '{}': directory does not exist",
            explicit.display()
        );
    }

    let start = std::env::current_dir().context("failed to read current directory")?;
    context::find_project_root(&start)
        .context("not a shopdesk project (no .shopdesk directory found). Run 'desk init' first.")
}

fn strip_project_dir(path: &Path) -> PathBuf {
    let is_project_dir = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == PROJECT_DIR_NAME);
    match path.parent() {
        Some(parent) if is_project_dir => parent.to_path_buf(),
        _ => path.to_path_buf(),
    }
}
