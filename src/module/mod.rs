//! In-memory model of a buildable module.
//!
//! A [`ModuleDescriptor`] is produced once per declared module by the
//! descriptor registry and is read-only afterwards, except for source
//! collection which fills [`ModuleDescriptor::sources`] and the precompiled
//! header lists right before generation.

mod kind;
mod sources;

pub use kind::{BuildOs, KindTraits, ModuleKind};
pub use sources::{PRIVATE_PCH_SUFFIX, PUBLIC_PCH_SUFFIX, collect_sources};

use crate::error::{GenError, GenResult};
use serde::Deserialize;
use std::path::Path;

/// Build-wide switches every descriptor is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildContext {
    pub editor: bool,
    pub build_os: BuildOs,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self {
            editor: false,
            build_os: BuildOs::current(),
        }
    }
}

/// Per-module metadata that controls naming, grouping and exclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleAttributes {
    pub custom_name: Option<String>,
    /// Dot separated, e.g. `Kepler.Toolchain`.
    pub custom_filter: Option<String>,
    pub use_namespace_as_filter: bool,
    pub force_interface: bool,
    pub editor_only: bool,
}

/// A public/private pair of values attached to a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessLists {
    pub public: Vec<String>,
    pub private: Vec<String>,
}

impl AccessLists {
    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.private.is_empty()
    }

    /// Public values first, then private ones.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.public.iter().chain(self.private.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    String,
    Bool,
}

impl OptionType {
    pub fn as_cmake(&self) -> &'static str {
        match self {
            OptionType::String => "STRING",
            OptionType::Bool => "BOOL",
        }
    }
}

/// A `set(NAME VALUE CACHE TYPE "")` entry for native sub-projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedOption {
    pub name: String,
    pub value: String,
    pub option_type: OptionType,
}

impl CachedOption {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            option_type: OptionType::String,
        }
    }

    pub fn bool(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value: if value { "ON" } else { "OFF" }.to_string(),
            option_type: OptionType::Bool,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainPriority {
    #[default]
    Secondary,
    Primary,
}

/// Solution-wide settings carried by the toolchain module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainSettings {
    pub solution_name: String,
    pub intermediate_path: String,
    pub binary_path: String,
    pub predefined_targets_folder: String,
    pub priority: ToolchainPriority,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        Self {
            solution_name: "KBTProject".to_string(),
            intermediate_path: "Intermediate".to_string(),
            binary_path: "Binaries".to_string(),
            predefined_targets_folder: "KBT/ThirdParty/CMake".to_string(),
            priority: ToolchainPriority::Secondary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Declared module name, without namespace.
    pub type_name: String,
    pub namespace: Option<String>,
    pub attributes: ModuleAttributes,
    pub kind: ModuleKind,
    pub build_os: BuildOs,
    /// Directory containing the descriptor file, forward slashes.
    pub config_dir: String,
    pub config_file: String,

    pub dependencies: AccessLists,
    pub definitions: AccessLists,
    pub include_directories: AccessLists,
    pub precompiled_headers: AccessLists,
    pub link_directories: AccessLists,

    pub sources: Vec<String>,
    /// Extensions scanned for custom-rules modules (e.g. `hlsl`).
    pub source_extensions: Vec<String>,
    /// Scan `config_dir` for C/C++ sources before generation.
    pub scan_sources: bool,

    pub exported_targets: Vec<String>,
    pub linkable_exported_targets: Vec<String>,
    pub exports_shared_libraries: bool,
    pub exported_shared_libraries: Vec<String>,
    /// Names this module registers as system libraries.
    pub system_libraries: Vec<String>,

    pub command_line_arguments: Vec<String>,
    pub cached_options: Vec<CachedOption>,
    /// Folder passed to `add_subdirectory` for native modules.
    pub subdirectory: Option<String>,
    pub toolchain: Option<ToolchainSettings>,

    exclude_from_build: bool,
}

impl ModuleDescriptor {
    pub fn new(
        type_name: impl Into<String>,
        kind: ModuleKind,
        config_file: impl AsRef<Path>,
        attributes: ModuleAttributes,
        ctx: &BuildContext,
    ) -> GenResult<Self> {
        let config_file = config_file.as_ref();
        let config_dir = config_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| GenError::InvalidDescriptorPath {
                path: config_file.to_path_buf(),
            })?;

        let exclude_from_build = attributes.editor_only && !ctx.editor;

        Ok(Self {
            type_name: type_name.into(),
            namespace: None,
            attributes,
            kind,
            build_os: ctx.build_os,
            config_dir: normalize_slashes(&config_dir.to_string_lossy()),
            config_file: normalize_slashes(&config_file.to_string_lossy()),
            dependencies: AccessLists::default(),
            definitions: AccessLists::default(),
            include_directories: AccessLists::default(),
            precompiled_headers: AccessLists::default(),
            link_directories: AccessLists::default(),
            sources: Vec::new(),
            source_extensions: Vec::new(),
            scan_sources: false,
            exported_targets: Vec::new(),
            linkable_exported_targets: Vec::new(),
            exports_shared_libraries: false,
            exported_shared_libraries: Vec::new(),
            system_libraries: Vec::new(),
            command_line_arguments: Vec::new(),
            cached_options: Vec::new(),
            subdirectory: None,
            toolchain: None,
            exclude_from_build,
        })
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// `custom_name`, else `namespace.type_name`, else `type_name`.
    pub fn target_name(&self) -> String {
        if let Some(name) = &self.attributes.custom_name {
            return name.clone();
        }
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{}.{}", ns, self.type_name),
            _ => self.type_name.clone(),
        }
    }

    pub fn is_excluded(&self) -> bool {
        self.exclude_from_build
    }

    /// Removes the module from the build. There is no way back.
    pub fn exclude(&mut self) {
        self.exclude_from_build = true;
    }

    pub fn is_interface_like(&self) -> bool {
        self.kind == ModuleKind::InterfaceLibrary || self.attributes.force_interface
    }

    pub fn is_toolchain(&self) -> bool {
        self.toolchain.is_some()
    }

    /// Does `name` refer to this module, either directly or through a
    /// linkable exported target?
    pub fn answers_to(&self, name: &str) -> bool {
        self.target_name() == name || self.linkable_exported_targets.iter().any(|t| t == name)
    }

    /// Filter requested through attributes, before any directory fallback.
    pub fn declared_filter(&self) -> Option<String> {
        if self.attributes.use_namespace_as_filter {
            if let Some(ns) = &self.namespace {
                return Some(ns.replace('.', "/"));
            }
        } else if let Some(filter) = &self.attributes.custom_filter
            && !filter.is_empty()
        {
            return Some(filter.replace('.', "/"));
        }
        None
    }

    pub fn add_definition(&mut self, definition: impl Into<String>) {
        self.definitions.public.push(definition.into());
    }

    /// Adds the `<NAME>_API` export macro shared libraries rely on.
    pub fn add_shared_api_macro(&mut self) {
        let macro_name = self.target_name().replace('.', "_").trim().to_uppercase();
        match self.build_os {
            BuildOs::Windows => {
                self.definitions
                    .public
                    .push(format!("\"{}_API=__declspec(dllimport)\"", macro_name));
                self.definitions
                    .private
                    .push(format!("\"{}_API=__declspec(dllexport)\"", macro_name));
            }
            BuildOs::Unix => {
                self.definitions.public.push(format!("{}_API=", macro_name));
                self.definitions.private.push(format!("{}_API=", macro_name));
            }
            _ => {}
        }
    }
}

pub(crate) fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}
