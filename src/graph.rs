//! Module dependency graph.
//!
//! [`GraphBuilder`] turns the flat, discovery-ordered list of descriptors
//! into a [`ModuleGraph`]: every non-excluded module gets one [`GraphEntry`]
//! keyed by its target name, dependency names are resolved to module ids or
//! to system-library placeholders, and exactly one toolchain module is
//! selected. The graph is never mutated once built.

use crate::error::{GenError, GenResult};
use crate::module::{ModuleDescriptor, ToolchainSettings};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

/// Index of a descriptor in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(usize);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphEntry {
    /// `None` for system-library placeholders.
    pub module: Option<ModuleId>,
    pub dependencies: BTreeSet<ModuleId>,
    pub is_system_library: bool,
}

impl GraphEntry {
    fn system_library() -> Self {
        Self {
            module: None,
            dependencies: BTreeSet::new(),
            is_system_library: true,
        }
    }
}

#[derive(Debug)]
pub struct ModuleGraph {
    modules: Vec<ModuleDescriptor>,
    entries: BTreeMap<String, GraphEntry>,
    toolchain: ModuleId,
    toolchain_settings: ToolchainSettings,
    collisions: Vec<String>,
    cycles: Vec<String>,
}

#[derive(Debug, Default)]
pub struct GraphBuilder {
    system_libraries: HashSet<String>,
    strict: bool,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names that resolve without a descriptor and expand no further.
    pub fn register_system_libraries<I, S>(&mut self, libraries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.system_libraries
            .extend(libraries.into_iter().map(Into::into));
    }

    /// Treat target-name collisions and dependency cycles as errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(mut self, modules: Vec<ModuleDescriptor>) -> GenResult<ModuleGraph> {
        for module in &modules {
            self.register_system_libraries(module.system_libraries.iter().cloned());
        }

        let mut entries: BTreeMap<String, GraphEntry> = BTreeMap::new();
        let mut toolchain: Option<ModuleId> = None;
        let mut collisions = Vec::new();

        for (index, module) in modules.iter().enumerate() {
            let target = module.target_name();
            if module.is_excluded() {
                debug!("Module '{}' is excluded from build", target);
                continue;
            }

            let id = ModuleId(index);
            if module.is_toolchain() {
                toolchain = select_toolchain(&modules, toolchain, id);
            }

            let mut entry = GraphEntry {
                module: Some(id),
                ..Default::default()
            };

            for dependency in module.dependencies.iter() {
                if let Some(found) = find_module(&modules, dependency) {
                    if found != id {
                        entry.dependencies.insert(found);
                    }
                    continue;
                }

                if self.system_libraries.contains(dependency) {
                    entries
                        .entry(dependency.clone())
                        .or_insert_with(GraphEntry::system_library);
                    continue;
                }

                if modules
                    .iter()
                    .any(|m| m.is_excluded() && m.answers_to(dependency))
                {
                    debug!(
                        "Dependency '{}' of '{}' is excluded from build, no edge added",
                        dependency, target
                    );
                    continue;
                }

                return Err(GenError::unresolved(dependency, target));
            }

            debug!(
                "Module '{}' resolved {} dependencies",
                target,
                entry.dependencies.len()
            );

            let previous = entries.insert(target.clone(), entry);
            if previous.is_some_and(|p| p.module.is_some()) {
                if self.strict {
                    return Err(GenError::TargetCollision { target });
                }
                warn!(
                    "Target name '{}' is declared by more than one module, keeping the last one",
                    target
                );
                collisions.push(target);
            }
        }

        let toolchain = toolchain.ok_or(GenError::NoToolchain)?;
        let toolchain_settings = modules[toolchain.0]
            .toolchain
            .clone()
            .ok_or(GenError::NoToolchain)?;

        let mut graph = ModuleGraph {
            modules,
            entries,
            toolchain,
            toolchain_settings,
            collisions,
            cycles: Vec::new(),
        };

        let cycles = graph.find_cycles();
        if let Some(first) = cycles.first()
            && self.strict
        {
            return Err(GenError::DependencyCycle(first.clone()));
        }
        for cycle in &cycles {
            warn!("Dependency cycle: {}", cycle);
        }
        graph.cycles = cycles;

        Ok(graph)
    }
}

/// First-found wins at equal priority; a strictly higher priority replaces it.
fn select_toolchain(
    modules: &[ModuleDescriptor],
    current: Option<ModuleId>,
    candidate: ModuleId,
) -> Option<ModuleId> {
    let new = &modules[candidate.0];
    info!("Found toolchain module '{}'", new.target_name());

    let Some(current) = current else {
        return Some(candidate);
    };

    let (Some(new_settings), Some(cur_settings)) = (&new.toolchain, &modules[current.0].toolchain)
    else {
        return Some(current);
    };

    if new_settings.priority > cur_settings.priority {
        Some(candidate)
    } else {
        if new_settings.priority == cur_settings.priority {
            warn!(
                "{:?} toolchain '{}' already exists. Skipping '{}'",
                cur_settings.priority,
                modules[current.0].target_name(),
                new.target_name()
            );
        }
        Some(current)
    }
}

fn find_module(modules: &[ModuleDescriptor], name: &str) -> Option<ModuleId> {
    modules
        .iter()
        .position(|m| !m.is_excluded() && m.answers_to(name))
        .map(ModuleId)
}

impl ModuleGraph {
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    pub fn module(&self, id: ModuleId) -> &ModuleDescriptor {
        &self.modules[id.0]
    }

    /// Every loaded module, excluded ones included.
    pub fn all_modules(&self) -> impl Iterator<Item = (ModuleId, &ModuleDescriptor)> {
        self.modules.iter().enumerate().map(|(i, m)| (ModuleId(i), m))
    }

    /// Non-excluded modules, in discovery order.
    pub fn active_modules(&self) -> impl Iterator<Item = (ModuleId, &ModuleDescriptor)> {
        self.modules
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_excluded())
            .map(|(i, m)| (ModuleId(i), m))
    }

    pub fn entry(&self, name: &str) -> Option<&GraphEntry> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> &BTreeMap<String, GraphEntry> {
        &self.entries
    }

    pub fn id_of(&self, name: &str) -> Option<ModuleId> {
        self.entries.get(name).and_then(|e| e.module)
    }

    pub fn toolchain_id(&self) -> ModuleId {
        self.toolchain
    }

    pub fn toolchain(&self) -> &ModuleDescriptor {
        &self.modules[self.toolchain.0]
    }

    pub fn toolchain_settings(&self) -> &ToolchainSettings {
        &self.toolchain_settings
    }

    /// Target names that more than one module declared.
    pub fn collisions(&self) -> &[String] {
        &self.collisions
    }

    /// Dependency cycles, formatted as `A -> B -> A`.
    pub fn cycles(&self) -> &[String] {
        &self.cycles
    }

    /// Every module reachable from `origin`, excluding `origin` itself.
    pub fn dependencies_of(&self, origin: ModuleId) -> BTreeSet<ModuleId> {
        let mut collected = BTreeSet::new();
        self.collect_dependencies(origin, origin, &mut collected);
        collected
    }

    fn collect_dependencies(
        &self,
        origin: ModuleId,
        current: ModuleId,
        collected: &mut BTreeSet<ModuleId>,
    ) {
        // A module that lost its name to a collision has no edges of its own.
        let Some(entry) = self
            .entries
            .get(&self.modules[current.0].target_name())
            .filter(|e| e.module == Some(current))
        else {
            return;
        };

        for &dependency in &entry.dependencies {
            if dependency == origin || collected.contains(&dependency) {
                continue;
            }
            collected.insert(dependency);
            self.collect_dependencies(origin, dependency, collected);
        }
    }

    fn find_cycles(&self) -> Vec<String> {
        let nodes: HashMap<ModuleId, &GraphEntry> = self
            .entries
            .values()
            .filter_map(|e| e.module.map(|id| (id, e)))
            .collect();

        let mut ids: Vec<ModuleId> = nodes.keys().copied().collect();
        ids.sort();

        let mut visited = HashSet::new();
        let mut stack = Vec::new();
        let mut cycles = Vec::new();
        for id in ids {
            self.visit_for_cycles(id, &nodes, &mut visited, &mut stack, &mut cycles);
        }
        cycles
    }

    fn visit_for_cycles(
        &self,
        id: ModuleId,
        nodes: &HashMap<ModuleId, &GraphEntry>,
        visited: &mut HashSet<ModuleId>,
        stack: &mut Vec<ModuleId>,
        cycles: &mut Vec<String>,
    ) {
        if let Some(start) = stack.iter().position(|s| *s == id) {
            let mut path: Vec<String> = stack[start..]
                .iter()
                .map(|s| self.modules[s.0].target_name())
                .collect();
            path.push(self.modules[id.0].target_name());
            cycles.push(path.join(" -> "));
            return;
        }
        if !visited.insert(id) {
            return;
        }

        stack.push(id);
        if let Some(entry) = nodes.get(&id) {
            for &dependency in &entry.dependencies {
                self.visit_for_cycles(dependency, nodes, visited, stack, cycles);
            }
        }
        stack.pop();
    }
}
