//! # kbt CLI Entry Point
//!
//! Parses the command line, loads the workspace, resolves the module graph
//! and writes `<root>/<intermediate>/ProjectFiles/CMakeLists.txt`.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use kbt::cmake;
use kbt::config::{Workspace, WorkspaceConfig};
use kbt::layout::ProjectLayout;
use kbt::tree;
use kbt::ui;

#[derive(Parser)]
#[command(name = "kbt")]
#[command(about = "Generates a CMake project from module descriptors", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Root directory of the project
    #[arg(long)]
    root: PathBuf,

    /// Editor build (includes editor-only modules and dependencies)
    #[arg(long)]
    editor: bool,

    /// Executables are console applications
    #[arg(long)]
    console: bool,

    /// Treat target name collisions and dependency cycles as errors
    #[arg(long)]
    strict: bool,

    /// Print the generated CMake to stdout instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Print the resolved dependency tree
    #[arg(long)]
    tree: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "kbt=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "x".red(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let start = Instant::now();

    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("Workspace root {} not found", cli.root.display()))?;
    let config = WorkspaceConfig::load(&root).context("Failed to load workspace config")?;

    let mut workspace = Workspace::new(&root);
    workspace.editor = cli.editor;
    workspace.console_only = cli.console;
    workspace.strict = cli.strict || config.workspace.strict;

    let graph = kbt::build_graph(&workspace, &config, !cli.dry_run)
        .context("Failed to resolve module graph")?;

    // Collisions and cycles are already reported through tracing on stderr.
    if cli.tree {
        if cli.dry_run {
            // stdout carries only the CMake text.
            eprint!("{}", tree::render_tree(&graph));
        } else {
            tree::print_tree(&graph);
        }
    }

    let text = cmake::generate_project(&graph, &workspace);
    if cli.dry_run {
        print!("{}", text);
        return Ok(());
    }

    let layout = ProjectLayout::new(&root, graph.toolchain_settings());
    let links = layout
        .link_modules(&graph)
        .context("Failed to link module directories")?;
    let output = layout.write(&text).context("Failed to write CMake project")?;

    ui::module_summary(&graph, &workspace.root).print();
    if links > 0 {
        println!("{} Linked {} module directories", "+".green(), links);
    }
    println!(
        "{} Generated {} ({} modules) in {:.2?}",
        "✓".green(),
        output.display().to_string().bold(),
        graph.active_modules().count(),
        start.elapsed()
    );
    Ok(())
}
