//! The generated `ProjectFiles/` directory.
//!
//! Besides `CMakeLists.txt` it holds symlinks to the sources of native and
//! interface modules so that relative `add_subdirectory` folders and header
//! trees resolve from the generated project.

use crate::cmake::OUTPUT_FILE;
use crate::error::{GenError, GenResult};
use crate::graph::ModuleGraph;
use crate::module::{ModuleKind, ToolchainSettings};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const PROJECT_FILES_DIR: &str = "ProjectFiles";

/// A symlink `link` → `target` inside the project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLink {
    pub link: PathBuf,
    pub target: PathBuf,
}

pub struct ProjectLayout {
    dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: &Path, toolchain: &ToolchainSettings) -> Self {
        Self {
            dir: root.join(&toolchain.intermediate_path).join(PROJECT_FILES_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn output_file(&self) -> PathBuf {
        self.dir.join(OUTPUT_FILE)
    }

    /// Links wanted for the non-excluded native and interface modules.
    pub fn planned_links(&self, graph: &ModuleGraph) -> Vec<ModuleLink> {
        graph
            .active_modules()
            .filter_map(|(_, module)| {
                let name = match module.kind {
                    ModuleKind::NativeImportedLibrary => module.subdirectory.clone()?,
                    ModuleKind::InterfaceLibrary => module.target_name(),
                    _ => return None,
                };
                Some(ModuleLink {
                    link: self.dir.join(&name),
                    target: Path::new(&module.config_dir).join(&name),
                })
            })
            .collect()
    }

    /// Creates missing links whose target exists. Returns how many were made.
    pub fn link_modules(&self, graph: &ModuleGraph) -> GenResult<usize> {
        self.ensure_dir()?;

        let mut created = 0;
        for ModuleLink { link, target } in self.planned_links(graph) {
            if fs::symlink_metadata(&link).is_ok() {
                debug!("{} already exists", link.display());
                continue;
            }
            if !target.exists() {
                debug!("Nothing to link at {}", target.display());
                continue;
            }
            match symlink_dir(&target, &link) {
                Ok(()) => created += 1,
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    warn!("Cannot create symlink {}: {}", link.display(), e);
                }
                Err(e) => return Err(GenError::io(&link, e)),
            }
        }
        Ok(created)
    }

    pub fn write(&self, text: &str) -> GenResult<PathBuf> {
        self.ensure_dir()?;
        let path = self.output_file();
        fs::write(&path, text).map_err(|e| GenError::io(&path, e))?;
        Ok(path)
    }

    fn ensure_dir(&self) -> GenResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| GenError::io(&self.dir, e))
    }
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink_dir(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "symlinks are not supported"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::module::{BuildContext, ModuleAttributes, ModuleDescriptor};
    use tempfile::tempdir;

    fn module(root: &Path, name: &str, kind: ModuleKind) -> ModuleDescriptor {
        ModuleDescriptor::new(
            name,
            kind,
            root.join(format!("ThirdParty/{name}/{name}.module.toml")),
            ModuleAttributes::default(),
            &BuildContext::default(),
        )
        .unwrap()
    }

    fn graph(root: &Path) -> ModuleGraph {
        let mut toolchain = module(root, "Toolchain", ModuleKind::StaticLibrary);
        toolchain.toolchain = Some(ToolchainSettings::default());

        let mut glfw = module(root, "GLFW", ModuleKind::NativeImportedLibrary);
        glfw.subdirectory = Some("glfw".into());
        let dxc = module(root, "Dxc", ModuleKind::InterfaceLibrary);
        let mut missing = module(root, "Missing", ModuleKind::NativeImportedLibrary);
        missing.subdirectory = Some("missing".into());
        let mut excluded = module(root, "Old", ModuleKind::InterfaceLibrary);
        excluded.exclude();

        GraphBuilder::new()
            .build(vec![toolchain, glfw, dxc, missing, excluded])
            .unwrap()
    }

    #[test]
    fn test_planned_links() {
        let dir = tempdir().unwrap();
        let graph = graph(dir.path());
        let layout = ProjectLayout::new(dir.path(), graph.toolchain_settings());

        let links = layout.planned_links(&graph);
        let project = dir.path().join("Intermediate").join(PROJECT_FILES_DIR);
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].link, project.join("glfw"));
        assert_eq!(links[0].target, dir.path().join("ThirdParty/GLFW").join("glfw"));
        assert_eq!(links[1].link, project.join("Dxc"));
    }

    #[cfg(unix)]
    #[test]
    fn test_links_created_once_and_only_for_existing_targets() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ThirdParty/GLFW/glfw")).unwrap();
        fs::create_dir_all(dir.path().join("ThirdParty/Dxc/Dxc")).unwrap();
        let graph = graph(dir.path());
        let layout = ProjectLayout::new(dir.path(), graph.toolchain_settings());

        assert_eq!(layout.link_modules(&graph).unwrap(), 2);
        assert!(layout.dir().join("glfw").is_dir());
        assert!(!layout.dir().join("missing").exists());
        assert_eq!(layout.link_modules(&graph).unwrap(), 0);
    }

    #[test]
    fn test_write_creates_project_dir() {
        let dir = tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path(), &ToolchainSettings::default());
        let path = layout.write("project(X)\n").unwrap();
        assert_eq!(path, dir.path().join("Intermediate/ProjectFiles/CMakeLists.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), "project(X)\n");
    }
}
