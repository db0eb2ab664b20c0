use crate::error::{GenError, GenResult};
use crate::module::{BuildContext, BuildOs, normalize_slashes};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "kbt.toml";

/// Optional `kbt.toml` at the workspace root.
#[derive(Deserialize, Debug, Default)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub workspace: WorkspaceSection,
}

#[derive(Deserialize, Debug)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceSection {
    /// Dependency names that resolve to the platform toolchain.
    pub system_libraries: Vec<String>,
    /// Directory names skipped while looking for descriptors.
    pub ignore: Vec<String>,
    pub strict: bool,
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self {
            system_libraries: Vec::new(),
            ignore: default_ignore(),
            strict: false,
        }
    }
}

fn default_ignore() -> Vec<String> {
    vec![".git".to_string(), "Intermediate".to_string(), "Binaries".to_string()]
}

impl WorkspaceConfig {
    /// Reads `<root>/kbt.toml`, falling back to defaults when it is absent.
    pub fn load(root: &Path) -> GenResult<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| GenError::io(&path, e))?;
        toml::from_str(&content).map_err(|e| GenError::descriptor(&path, e.message()))
    }
}

/// Settings for one generation run.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Forward slashes, always ending in `/`.
    pub root: String,
    pub editor: bool,
    pub console_only: bool,
    pub build_os: BuildOs,
    pub strict: bool,
}

impl Workspace {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: normalize_root(root.as_ref()),
            editor: false,
            console_only: false,
            build_os: BuildOs::current(),
            strict: false,
        }
    }

    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }

    pub fn build_context(&self) -> BuildContext {
        BuildContext {
            editor: self.editor,
            build_os: self.build_os,
        }
    }
}

pub fn normalize_root(root: &Path) -> String {
    let mut root = normalize_slashes(&root.to_string_lossy());
    // Verbatim prefix from canonicalize on Windows.
    if let Some(rest) = root.strip_prefix("//?/") {
        root = rest.to_string();
    }
    if !root.ends_with('/') {
        root.push('/');
    }
    root
}
