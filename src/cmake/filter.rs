//! IDE folder (filter) a module is grouped under.

use crate::module::{ModuleDescriptor, normalize_slashes};
use std::path::Path;

/// Resolves the folder for `module`, in order of precedence:
/// namespace (when requested), custom filter, then the parent of the module
/// directory, relative to `root` when it lives inside the workspace.
pub fn module_filter(module: &ModuleDescriptor, root: &str) -> Option<String> {
    if let Some(filter) = module.declared_filter() {
        return Some(filter);
    }

    let parent = Path::new(&module.config_dir).parent()?;
    let full = normalize_slashes(&parent.to_string_lossy());
    if full.is_empty() {
        return None;
    }

    let root = root.trim_end_matches('/');
    if let Some(rest) = full.strip_prefix(root)
        && (rest.is_empty() || rest.starts_with('/'))
    {
        let rest = rest.trim_start_matches('/');
        if !rest.is_empty() {
            return Some(rest.to_string());
        }
    }

    let name = parent.file_name()?.to_string_lossy().to_string();
    Some(match &module.namespace {
        Some(ns) => format!("{}/{}", ns, name),
        None => name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{BuildContext, ModuleAttributes, ModuleKind};

    fn module_at(file: &str) -> ModuleDescriptor {
        ModuleDescriptor::new(
            "Core",
            ModuleKind::StaticLibrary,
            file,
            ModuleAttributes::default(),
            &BuildContext::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_namespace_filter_first() {
        let mut m = module_at("/ws/ThirdParty/glfw/Glfw.module.toml").with_namespace("Kepler.ThirdParty");
        m.attributes.use_namespace_as_filter = true;
        m.attributes.custom_filter = Some("Ignored".into());
        assert_eq!(module_filter(&m, "/ws/").as_deref(), Some("Kepler/ThirdParty"));
    }

    #[test]
    fn test_custom_filter_second() {
        let mut m = module_at("/ws/Engine/Toolchain/Toolchain.module.toml");
        m.attributes.custom_filter = Some("Kepler.Toolchain".into());
        assert_eq!(module_filter(&m, "/ws/").as_deref(), Some("Kepler/Toolchain"));
    }

    #[test]
    fn test_workspace_relative_parent() {
        let m = module_at("/ws/Engine/Runtime/Core/Core.module.toml");
        assert_eq!(module_filter(&m, "/ws/").as_deref(), Some("Engine/Runtime"));
        assert_eq!(module_filter(&m, "/ws").as_deref(), Some("Engine/Runtime"));
    }

    #[test]
    fn test_outside_workspace_uses_namespace_and_folder() {
        let m = module_at("/sdk/Plugins/Audio/Audio.module.toml").with_namespace("Kepler");
        assert_eq!(module_filter(&m, "/ws/").as_deref(), Some("Kepler/Plugins"));

        let m = module_at("/sdk/Plugins/Audio/Audio.module.toml");
        assert_eq!(module_filter(&m, "/ws/").as_deref(), Some("Plugins"));
    }

    #[test]
    fn test_similar_prefix_is_not_inside_workspace() {
        let m = module_at("/wsx/Tools/Core/Core.module.toml");
        assert_eq!(module_filter(&m, "/ws/").as_deref(), Some("Tools"));
    }

    #[test]
    fn test_module_at_workspace_root_falls_back_to_folder_name() {
        let m = module_at("/ws/Core/Core.module.toml").with_namespace("Kepler");
        assert_eq!(module_filter(&m, "/ws/").as_deref(), Some("Kepler/ws"));
    }

    #[test]
    fn test_no_parent_yields_none() {
        let m = module_at("/Core.module.toml");
        assert_eq!(module_filter(&m, "/ws/"), None);
    }
}
