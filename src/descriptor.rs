//! Declarative module descriptor files (`*.module.toml`) and the registry of
//! module kinds that turns them into [`ModuleDescriptor`]s.
//!
//! ## Example
//!
//! ```toml
//! namespace = "Kepler.ThirdParty"
//!
//! [[module]]
//! name = "GLFW"
//! kind = "native"
//! custom_name = "glfw"
//! use_namespace_as_filter = true
//! subdirectory = "glfw"
//! exported_targets = ["glfw", "update_mappings", "uninstall"]
//! linkable_exported_targets = ["glfw"]
//!
//! [module.options]
//! GLFW_BUILD_TESTS = false
//! ```

use crate::error::{GenError, GenResult};
use crate::module::{
    BuildContext, BuildOs, CachedOption, ModuleAttributes, ModuleDescriptor, ModuleKind,
    ToolchainPriority, ToolchainSettings,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub const DESCRIPTOR_SUFFIX: &str = ".module.toml";

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct DescriptorFile {
    /// Namespace shared by every module declared in the file.
    pub namespace: Option<String>,
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleDecl>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleDecl {
    pub name: String,
    pub kind: String,
    pub namespace: Option<String>,

    pub custom_name: Option<String>,
    pub custom_filter: Option<String>,
    pub use_namespace_as_filter: bool,
    pub force_interface: bool,
    pub editor_only: bool,

    /// Platforms the module is built on; empty means all of them.
    pub platforms: Vec<String>,
    pub exclude_from_build: bool,

    pub public_dependencies: Vec<String>,
    pub private_dependencies: Vec<String>,
    pub public_definitions: Vec<String>,
    pub private_definitions: Vec<String>,
    pub public_include_directories: Vec<String>,
    pub private_include_directories: Vec<String>,
    pub public_precompiled_headers: Vec<String>,
    pub private_precompiled_headers: Vec<String>,
    pub public_link_directories: Vec<String>,
    pub private_link_directories: Vec<String>,

    /// Public dependencies added only for editor builds.
    pub editor_dependencies: Vec<String>,
    /// Public definitions added only for editor builds.
    pub editor_definitions: Vec<String>,
    /// Public definitions keyed by platform name.
    pub platform_definitions: BTreeMap<String, Vec<String>>,
    /// Public dependencies keyed by platform name.
    pub platform_dependencies: BTreeMap<String, Vec<String>>,

    pub sources: Vec<String>,
    pub source_extensions: Vec<String>,

    pub exported_targets: Vec<String>,
    pub linkable_exported_targets: Vec<String>,
    pub exports_shared_libraries: bool,
    pub exported_shared_libraries: Vec<String>,
    pub system_libraries: Vec<String>,
    pub command_line_arguments: Vec<String>,

    pub subdirectory: Option<String>,
    pub options: toml::Table,
    pub toolchain: Option<ToolchainDecl>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainDecl {
    pub solution_name: Option<String>,
    pub intermediate_path: Option<String>,
    pub binary_path: Option<String>,
    pub predefined_targets_folder: Option<String>,
    pub priority: ToolchainPriority,
}

/// Kind-specific construction step, run before the declared lists are applied.
pub type ModuleSetup = fn(&mut ModuleDescriptor, &ModuleDecl) -> GenResult<()>;

#[derive(Clone, Copy)]
pub struct KindEntry {
    pub kind: ModuleKind,
    pub setup: ModuleSetup,
}

/// Maps descriptor `kind` names to the module kind and its construction step.
pub struct KindRegistry {
    entries: HashMap<String, KindEntry>,
}

impl Default for KindRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("static-library", ModuleKind::StaticLibrary, setup_compiled);
        registry.register("custom-library", ModuleKind::StaticLibrary, setup_plain);
        registry.register("shared-library", ModuleKind::SharedLibrary, setup_shared);
        registry.register("interface", ModuleKind::InterfaceLibrary, setup_plain);
        registry.register("native", ModuleKind::NativeImportedLibrary, setup_native);
        registry.register("executable", ModuleKind::Executable, setup_compiled);
        registry.register("custom-rules", ModuleKind::CustomRules, setup_plain);
        registry.register("toolchain", ModuleKind::InterfaceLibrary, setup_toolchain);
        registry
    }
}

impl KindRegistry {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, kind: ModuleKind, setup: ModuleSetup) {
        self.entries.insert(name.to_string(), KindEntry { kind, setup });
    }

    pub fn get(&self, name: &str) -> Option<KindEntry> {
        self.entries.get(name).copied()
    }

    pub fn kind_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    /// Builds the descriptor for one `[[module]]` table.
    pub fn instantiate(
        &self,
        decl: &ModuleDecl,
        file_namespace: Option<&str>,
        config_file: &Path,
        ctx: &BuildContext,
    ) -> GenResult<ModuleDescriptor> {
        if decl.name.trim().is_empty() {
            return Err(GenError::descriptor(config_file, "module is missing `name`"));
        }

        let entry = self.get(&decl.kind).ok_or_else(|| GenError::UnknownModuleKind {
            kind: decl.kind.clone(),
            module: decl.name.clone(),
        })?;

        let attributes = ModuleAttributes {
            custom_name: decl.custom_name.clone(),
            custom_filter: decl.custom_filter.clone(),
            use_namespace_as_filter: decl.use_namespace_as_filter,
            force_interface: decl.force_interface,
            editor_only: decl.editor_only,
        };

        let mut module =
            ModuleDescriptor::new(decl.name.clone(), entry.kind, config_file, attributes, ctx)?;
        if let Some(ns) = decl.namespace.as_deref().or(file_namespace) {
            module = module.with_namespace(ns);
        }

        (entry.setup)(&mut module, decl)?;
        apply_declared_lists(&mut module, decl, ctx, config_file)?;

        if decl.exclude_from_build || !platform_allowed(&decl.platforms, ctx.build_os, config_file)? {
            module.exclude();
        }

        Ok(module)
    }
}

/// Parses one descriptor file into its modules, in declaration order.
pub fn parse_descriptor(
    source: &str,
    config_file: &Path,
    registry: &KindRegistry,
    ctx: &BuildContext,
) -> GenResult<Vec<ModuleDescriptor>> {
    let file: DescriptorFile =
        toml::from_str(source).map_err(|e| GenError::descriptor(config_file, e.message()))?;

    file.modules
        .iter()
        .map(|decl| registry.instantiate(decl, file.namespace.as_deref(), config_file, ctx))
        .collect()
}

fn setup_plain(_module: &mut ModuleDescriptor, _decl: &ModuleDecl) -> GenResult<()> {
    Ok(())
}

// Static libraries and executables see their own directory.
fn setup_compiled(module: &mut ModuleDescriptor, _decl: &ModuleDecl) -> GenResult<()> {
    module.scan_sources = module.kind.traits().scans_sources;
    let own_dir = module.config_dir.clone();
    module.include_directories.public.push(own_dir);
    Ok(())
}

fn setup_shared(module: &mut ModuleDescriptor, _decl: &ModuleDecl) -> GenResult<()> {
    module.scan_sources = module.kind.traits().scans_sources;
    module.add_shared_api_macro();
    Ok(())
}

fn setup_native(module: &mut ModuleDescriptor, decl: &ModuleDecl) -> GenResult<()> {
    let Some(folder) = decl.subdirectory.as_deref().filter(|f| !f.is_empty()) else {
        return Err(GenError::descriptor(
            &module.config_file,
            format!("native module '{}' requires `subdirectory`", decl.name),
        ));
    };
    module.subdirectory = Some(folder.to_string());

    for (name, value) in &decl.options {
        let option = match value {
            toml::Value::String(s) => CachedOption::string(name, s),
            toml::Value::Boolean(b) => CachedOption::bool(name, *b),
            other => {
                return Err(GenError::UnsupportedOptionType {
                    option: name.clone(),
                    module: decl.name.clone(),
                    found: other.type_str().to_string(),
                });
            }
        };
        module.cached_options.push(option);
    }
    Ok(())
}

fn setup_toolchain(module: &mut ModuleDescriptor, decl: &ModuleDecl) -> GenResult<()> {
    let mut settings = ToolchainSettings::default();
    if let Some(tc) = &decl.toolchain {
        if let Some(v) = &tc.solution_name {
            settings.solution_name = v.clone();
        }
        if let Some(v) = &tc.intermediate_path {
            settings.intermediate_path = v.clone();
        }
        if let Some(v) = &tc.binary_path {
            settings.binary_path = v.clone();
        }
        if let Some(v) = &tc.predefined_targets_folder {
            settings.predefined_targets_folder = v.clone();
        }
        settings.priority = tc.priority;
    }
    module.toolchain = Some(settings);
    Ok(())
}

fn apply_declared_lists(
    module: &mut ModuleDescriptor,
    decl: &ModuleDecl,
    ctx: &BuildContext,
    config_file: &Path,
) -> GenResult<()> {
    let m = module;
    m.dependencies.public.extend(decl.public_dependencies.iter().cloned());
    m.dependencies.private.extend(decl.private_dependencies.iter().cloned());
    m.definitions.public.extend(decl.public_definitions.iter().cloned());
    m.definitions.private.extend(decl.private_definitions.iter().cloned());
    m.include_directories
        .public
        .extend(decl.public_include_directories.iter().cloned());
    m.include_directories
        .private
        .extend(decl.private_include_directories.iter().cloned());
    m.precompiled_headers
        .public
        .extend(decl.public_precompiled_headers.iter().cloned());
    m.precompiled_headers
        .private
        .extend(decl.private_precompiled_headers.iter().cloned());
    m.link_directories
        .public
        .extend(decl.public_link_directories.iter().cloned());
    m.link_directories
        .private
        .extend(decl.private_link_directories.iter().cloned());

    if ctx.editor {
        m.dependencies.public.extend(decl.editor_dependencies.iter().cloned());
        m.definitions.public.extend(decl.editor_definitions.iter().cloned());
    }

    for (platform, defs) in &decl.platform_definitions {
        if parse_platform(platform, config_file)? == ctx.build_os {
            m.definitions.public.extend(defs.iter().cloned());
        }
    }
    for (platform, deps) in &decl.platform_dependencies {
        if parse_platform(platform, config_file)? == ctx.build_os {
            m.dependencies.public.extend(deps.iter().cloned());
        }
    }

    m.sources.extend(decl.sources.iter().cloned());
    m.source_extensions.extend(decl.source_extensions.iter().cloned());
    m.exported_targets.extend(decl.exported_targets.iter().cloned());
    m.linkable_exported_targets
        .extend(decl.linkable_exported_targets.iter().cloned());
    m.exports_shared_libraries = decl.exports_shared_libraries;
    m.exported_shared_libraries
        .extend(decl.exported_shared_libraries.iter().cloned());
    m.system_libraries.extend(decl.system_libraries.iter().cloned());
    m.command_line_arguments
        .extend(decl.command_line_arguments.iter().cloned());
    Ok(())
}

fn parse_platform(name: &str, config_file: &Path) -> GenResult<BuildOs> {
    BuildOs::parse(name)
        .ok_or_else(|| GenError::descriptor(config_file, format!("unknown platform '{}'", name)))
}

fn platform_allowed(platforms: &[String], build_os: BuildOs, config_file: &Path) -> GenResult<bool> {
    if platforms.is_empty() {
        return Ok(true);
    }
    for platform in platforms {
        if parse_platform(platform, config_file)? == build_os {
            return Ok(true);
        }
    }
    Ok(false)
}
