//! Dependency tree visualization.
//!
//! Prints the resolved module graph in a hierarchical, ASCII tree format.
//! Modules no other module depends on are the roots.
//!
//! ## Example Output
//!
//! ```text
//! Kepler.Editor (executable)
//! ├── Kepler.Engine (static)
//! │   ├── Kepler.Core (static)
//! │   └── d3d12 (system)
//! └── Kepler.Core (static) (*)
//! ```

use crate::graph::{GraphEntry, ModuleGraph, ModuleId};
use colored::*;
use std::collections::{BTreeSet, HashSet};

enum Child<'a> {
    Module(ModuleId),
    System(&'a str),
}

pub fn print_tree(graph: &ModuleGraph) {
    println!("{}", "Module dependency tree".bold().cyan());
    print!("{}", render_tree(graph));
}

pub fn render_tree(graph: &ModuleGraph) -> String {
    let depended: BTreeSet<ModuleId> = graph
        .entries()
        .values()
        .flat_map(|e| e.dependencies.iter().copied())
        .collect();

    let nodes: Vec<ModuleId> = graph
        .entries()
        .values()
        .filter_map(|e| e.module)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let roots = nodes.iter().copied().filter(|id| !depended.contains(id));

    let mut out = String::new();
    let mut expanded = HashSet::new();
    // Modules only reachable through a cycle become roots of their own.
    for root in roots.chain(nodes.iter().copied()) {
        if !expanded.insert(root) {
            continue;
        }
        out.push_str(&label(graph, root));
        out.push('\n');
        let mut path = vec![root];
        render_children(graph, root, "", &mut expanded, &mut path, &mut out);
    }
    out
}

fn label(graph: &ModuleGraph, id: ModuleId) -> String {
    let module = graph.module(id);
    format!("{} ({})", module.target_name(), module.kind)
}

fn entry_of(graph: &ModuleGraph, id: ModuleId) -> Option<&GraphEntry> {
    graph
        .entry(&graph.module(id).target_name())
        .filter(|e| e.module == Some(id))
}

fn render_children(
    graph: &ModuleGraph,
    id: ModuleId,
    prefix: &str,
    expanded: &mut HashSet<ModuleId>,
    path: &mut Vec<ModuleId>,
    out: &mut String,
) {
    let Some(entry) = entry_of(graph, id) else {
        return;
    };

    let mut children: Vec<Child> = entry.dependencies.iter().copied().map(Child::Module).collect();
    let mut seen = HashSet::new();
    for name in graph.module(id).dependencies.iter() {
        if graph.entry(name).is_some_and(|e| e.is_system_library) && seen.insert(name.as_str()) {
            children.push(Child::System(name));
        }
    }

    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };

        match child {
            Child::System(name) => {
                out.push_str(&format!("{}{}{} (system)\n", prefix, branch, name));
            }
            Child::Module(dep) => {
                let dep = *dep;
                if path.contains(&dep) {
                    out.push_str(&format!("{}{}{} (cycle)\n", prefix, branch, label(graph, dep)));
                    continue;
                }

                let has_children = entry_of(graph, dep).is_some_and(|e| !e.dependencies.is_empty())
                    || graph.module(dep).dependencies.iter().any(|n| {
                        graph.entry(n).is_some_and(|e| e.is_system_library)
                    });
                if !expanded.insert(dep) && has_children {
                    out.push_str(&format!("{}{}{} (*)\n", prefix, branch, label(graph, dep)));
                    continue;
                }

                out.push_str(&format!("{}{}{}\n", prefix, branch, label(graph, dep)));
                let next = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
                path.push(dep);
                render_children(graph, dep, &next, expanded, path, out);
                path.pop();
            }
        }
    }
}
