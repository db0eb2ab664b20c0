//! CMake text generation.
//!
//! [`generate_project`] writes the project header followed by one directive
//! block per non-excluded module, in discovery order.

mod filter;
mod generator;
mod helpers;

pub use filter::module_filter;
pub use generator::ModuleGenerator;

use crate::config::Workspace;
use crate::graph::ModuleGraph;

pub const OUTPUT_FILE: &str = "CMakeLists.txt";

pub fn generate_project(graph: &ModuleGraph, workspace: &Workspace) -> String {
    let mut out = String::new();
    helpers::write_header(&mut out, graph.toolchain_settings(), &workspace.root);

    let generator = ModuleGenerator::new(graph, workspace);
    for (id, _) in graph.active_modules() {
        out.push_str(&generator.generate(id));
        out.push('\n');
    }
    out
}
