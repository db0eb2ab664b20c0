//! # kbt - Module-graph CMake generator
//!
//! kbt discovers declarative module descriptors (`*.module.toml`) across a
//! source tree, resolves their dependencies into a single graph and emits one
//! `CMakeLists.txt` honoring public/private propagation, per-module settings
//! and platform constraints.
//!
//! ## Quick Start
//!
//! ```bash
//! kbt --root ~/Projects/KE1
//! kbt --root . --editor --tree
//! ```
//!
//! ## Module Organization
//!
//! - [`descriptor`] - Descriptor file schema and the kind registry
//! - [`discovery`] - Workspace scan and parallel loading
//! - [`graph`] - Dependency resolution and toolchain selection
//! - [`cmake`] - CMake text generation
//! - [`layout`] - The generated `ProjectFiles/` directory

/// CMake text generation.
pub mod cmake;

/// Workspace settings and `kbt.toml`.
pub mod config;

/// Descriptor file schema and module kind registry.
pub mod descriptor;

/// Descriptor discovery and loading.
pub mod discovery;

/// Error types.
pub mod error;

/// Module dependency graph.
pub mod graph;

/// Output directory and module symlinks.
pub mod layout;

/// Module descriptor model.
pub mod module;

/// Dependency tree printing.
pub mod tree;

/// Terminal tables.
pub mod ui;

use config::{Workspace, WorkspaceConfig};
use descriptor::KindRegistry;
use discovery::Discovery;
use error::GenResult;
use graph::{GraphBuilder, ModuleGraph};

/// Discovers every descriptor under the workspace root and resolves them
/// into a graph.
pub fn build_graph(
    workspace: &Workspace,
    config: &WorkspaceConfig,
    show_progress: bool,
) -> GenResult<ModuleGraph> {
    let registry = KindRegistry::default();
    let modules = Discovery::new(workspace.root_path(), &registry, workspace.build_context())
        .ignore(&config.workspace.ignore)
        .show_progress(show_progress)
        .load()?;

    let mut builder = GraphBuilder::new().strict(workspace.strict);
    builder.register_system_libraries(config.workspace.system_libraries.iter().cloned());
    builder.build(modules)
}
