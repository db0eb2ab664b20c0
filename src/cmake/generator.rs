//! Per-module CMake directives.

use super::filter::module_filter;
use super::helpers::{Access, access_list, combine_access_lists, combine_sources, line, qualify};
use crate::config::Workspace;
use crate::graph::{ModuleGraph, ModuleId};
use crate::module::{AccessLists, BuildOs, ModuleDescriptor, ModuleKind};

/// Turns graph modules into CMake text. Reads the graph only.
pub struct ModuleGenerator<'a> {
    graph: &'a ModuleGraph,
    workspace: &'a Workspace,
}

impl<'a> ModuleGenerator<'a> {
    pub fn new(graph: &'a ModuleGraph, workspace: &'a Workspace) -> Self {
        Self { graph, workspace }
    }

    /// Directive block for one module, empty when the module is excluded.
    pub fn generate(&self, id: ModuleId) -> String {
        let module = self.graph.module(id);
        let mut out = String::new();
        if module.is_excluded() {
            return out;
        }

        let name = module.target_name();
        let sources = combine_sources(&module.sources, &module.config_dir);

        let mut dependencies = module.dependencies.clone();
        if id != self.graph.toolchain_id() && module.kind.traits().produces_target {
            dependencies.public.push(self.graph.toolchain().target_name());
        }

        write_cached_options(&mut out, module);
        self.write_declaration(&mut out, module, &name, &sources);
        write_source_group(&mut out, module, &sources);
        self.write_properties(&mut out, module, &name);

        write_scoped(&mut out, module, &name, "target_link_libraries", &dependencies, false);
        if module.kind == ModuleKind::Executable {
            self.write_shared_library_copies(&mut out, id, &name);
        }

        write_scoped(&mut out, module, &name, "target_compile_definitions", &module.definitions, false);
        write_scoped(
            &mut out,
            module,
            &name,
            "target_include_directories",
            &module.include_directories,
            true,
        );
        if !module.is_interface_like() && module.kind.traits().language_standard {
            line(&mut out, format!("target_compile_features({} PUBLIC cxx_std_20)", name));
        }
        write_scoped(
            &mut out,
            module,
            &name,
            "target_precompile_headers",
            &module.precompiled_headers,
            true,
        );
        write_scoped(
            &mut out,
            module,
            &name,
            "target_link_directories",
            &module.link_directories,
            true,
        );

        out
    }

    fn write_declaration(&self, out: &mut String, module: &ModuleDescriptor, name: &str, sources: &str) {
        match module.kind {
            ModuleKind::StaticLibrary | ModuleKind::SharedLibrary => {
                if !sources.is_empty() {
                    let shape = if module.kind == ModuleKind::SharedLibrary {
                        "SHARED"
                    } else {
                        "STATIC"
                    };
                    line(out, format!("add_library({} {} {})", name, shape, sources));
                }
            }
            ModuleKind::InterfaceLibrary => {
                line(out, format!("add_library({} INTERFACE)", name));
            }
            ModuleKind::NativeImportedLibrary => {
                if let Some(folder) = &module.subdirectory {
                    line(out, format!("add_subdirectory({})", folder));
                }
            }
            ModuleKind::Executable => {
                let mut args = vec![name];
                if module.build_os == BuildOs::Windows && !self.workspace.console_only {
                    args.push("WIN32");
                }
                if !sources.is_empty() {
                    args.push(sources);
                }
                line(out, format!("add_executable({})", args.join(" ")));
            }
            ModuleKind::CustomRules => {
                line(out, format!("add_custom_target({} SOURCES {})", name, sources).trim_end());
            }
        }

        if module.is_interface_like() {
            line(
                out,
                format!("add_custom_target({}Config SOURCES {})", name, module.config_file),
            );
        }
    }

    fn write_properties(&self, out: &mut String, module: &ModuleDescriptor, name: &str) {
        let Some(folder) = module_filter(module, &self.workspace.root) else {
            return;
        };

        line(
            out,
            format!(
                "set_target_properties({} PROPERTIES FOLDER {} VS_DEBUGGER_WORKING_DIRECTORY {})",
                name, folder, self.workspace.root
            ),
        );
        if module.is_interface_like() {
            line(out, format!("set_target_properties({}Config PROPERTIES FOLDER {})", name, folder));
        }
        for target in &module.exported_targets {
            line(out, format!("set_target_properties({} PROPERTIES FOLDER {})", target, folder));
        }

        let arguments: Vec<&str> = module
            .command_line_arguments
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();
        if !arguments.is_empty() {
            line(
                out,
                format!(
                    "set_target_properties({} PROPERTIES VS_DEBUGGER_COMMAND_ARGUMENTS {})",
                    name,
                    arguments.join(" ")
                ),
            );
        }
    }

    /// Copies runtime libraries exported anywhere below an executable next
    /// to its binary.
    fn write_shared_library_copies(&self, out: &mut String, id: ModuleId, name: &str) {
        for dependency in self.graph.dependencies_of(id) {
            let dependency = self.graph.module(dependency);
            if !dependency.exports_shared_libraries {
                continue;
            }
            for export in &dependency.exported_shared_libraries {
                let file_name = export.rsplit(['/', '\\']).next().unwrap_or(export);
                let location = qualify(export, &dependency.config_dir);
                line(
                    out,
                    format!(
                        "add_custom_command(TARGET {name} POST_BUILD COMMAND ${{CMAKE_COMMAND}} -E copy_if_different \"{location}\" \"$<TARGET_FILE_DIR:{name}>/{file_name}\")"
                    ),
                );
            }
        }
    }
}

fn write_cached_options(out: &mut String, module: &ModuleDescriptor) {
    if module.kind != ModuleKind::NativeImportedLibrary {
        return;
    }
    for option in &module.cached_options {
        line(
            out,
            format!(
                "set({} {} CACHE {} \"\")",
                option.name,
                option.value,
                option.option_type.as_cmake()
            ),
        );
    }
}

fn write_source_group(out: &mut String, module: &ModuleDescriptor, sources: &str) {
    if sources.is_empty() {
        return;
    }

    if module.build_os == BuildOs::Windows {
        line(
            out,
            format!(
                "source_group(TREE {} PREFIX Code FILES {})",
                module.config_dir.replace('/', "\\\\"),
                sources.replace('/', "\\\\")
            ),
        );
    } else {
        line(
            out,
            format!("source_group(TREE {} PREFIX Code FILES {})", module.config_dir, sources),
        );
    }
}

/// `directive(N INTERFACE ...)` for interface-like modules, otherwise
/// `directive(N PUBLIC ... PRIVATE ...)` for kinds that take scoped values.
fn write_scoped(
    out: &mut String,
    module: &ModuleDescriptor,
    name: &str,
    directive: &str,
    values: &AccessLists,
    qualify_paths: bool,
) {
    let dir = qualify_paths.then_some(module.config_dir.as_str());

    let args = if module.is_interface_like() {
        access_list(Access::Interface, &values.public, dir)
    } else if module.kind.traits().scoped_properties {
        let combined = combine_access_lists(&[
            access_list(Access::Public, &values.public, dir),
            access_list(Access::Private, &values.private, dir),
        ]);
        (!combined.is_empty()).then_some(combined)
    } else {
        None
    };

    if let Some(args) = args {
        line(out, format!("{}({} {})", directive, name, args));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::module::{BuildContext, CachedOption, ModuleAttributes, ToolchainSettings};
    use pretty_assertions::assert_eq;

    fn workspace(build_os: BuildOs) -> Workspace {
        let mut ws = Workspace::new("/ws");
        ws.build_os = build_os;
        ws
    }

    fn module(name: &str, kind: ModuleKind, build_os: BuildOs) -> ModuleDescriptor {
        ModuleDescriptor::new(
            name,
            kind,
            format!("/ws/Engine/{name}/{name}.module.toml"),
            ModuleAttributes::default(),
            &BuildContext {
                editor: false,
                build_os,
            },
        )
        .unwrap()
    }

    fn toolchain(build_os: BuildOs) -> ModuleDescriptor {
        let mut m = module("Toolchain", ModuleKind::InterfaceLibrary, build_os);
        m.toolchain = Some(ToolchainSettings::default());
        m
    }

    fn library(name: &str, build_os: BuildOs) -> ModuleDescriptor {
        let mut m = module(name, ModuleKind::StaticLibrary, build_os);
        m.sources = vec![format!("/ws/Engine/{name}/{name}.cpp")];
        m.include_directories.public.push(m.config_dir.clone());
        m
    }

    fn generate(modules: Vec<ModuleDescriptor>, ws: &Workspace, name: &str) -> String {
        let graph = GraphBuilder::new().build(modules).unwrap();
        let id = graph.id_of(name).unwrap();
        ModuleGenerator::new(&graph, ws).generate(id)
    }

    #[test]
    fn test_static_library_block() {
        let ws = workspace(BuildOs::Unix);
        let text = generate(vec![toolchain(BuildOs::Unix), library("Core", BuildOs::Unix)], &ws, "Core");
        assert_eq!(
            text,
            "add_library(Core STATIC /ws/Engine/Core/Core.cpp;)\n\
             source_group(TREE /ws/Engine/Core PREFIX Code FILES /ws/Engine/Core/Core.cpp;)\n\
             set_target_properties(Core PROPERTIES FOLDER Engine VS_DEBUGGER_WORKING_DIRECTORY /ws/)\n\
             target_link_libraries(Core PUBLIC Toolchain;)\n\
             target_include_directories(Core PUBLIC /ws/Engine/Core;)\n\
             target_compile_features(Core PUBLIC cxx_std_20)\n"
        );
    }

    #[test]
    fn test_executable_links_dependencies_then_toolchain() {
        let ws = workspace(BuildOs::Unix);
        let mut app = module("App", ModuleKind::Executable, BuildOs::Unix);
        app.dependencies.public.push("Core".into());
        app.sources = vec!["/ws/Engine/App/Main.cpp".into()];

        let text = generate(
            vec![toolchain(BuildOs::Unix), library("Core", BuildOs::Unix), app],
            &ws,
            "App",
        );
        assert!(text.contains("add_executable(App /ws/Engine/App/Main.cpp;)\n"));
        assert!(text.contains("target_link_libraries(App PUBLIC Core;Toolchain;)\n"));
    }

    #[test]
    fn test_library_without_sources_has_no_declaration() {
        let ws = workspace(BuildOs::Unix);
        let mut empty = library("Empty", BuildOs::Unix);
        empty.sources.clear();

        let text = generate(vec![toolchain(BuildOs::Unix), empty], &ws, "Empty");
        assert!(!text.contains("add_library"));
        assert!(!text.contains("source_group"));
        assert!(text.contains("target_link_libraries(Empty PUBLIC Toolchain;)"));
    }

    #[test]
    fn test_shared_library_is_copied_once() {
        let ws = workspace(BuildOs::Windows);
        let mut dxc = module("Dxc", ModuleKind::InterfaceLibrary, BuildOs::Windows);
        dxc.exports_shared_libraries = true;
        dxc.exported_shared_libraries = vec!["bin/x64/foo.dll".into(), "C:/SDK/bar.dll".into()];

        let mut renderer = library("Renderer", BuildOs::Windows);
        renderer.dependencies.public.push("Dxc".into());
        let mut tools = library("Tools", BuildOs::Windows);
        tools.dependencies.private.push("Dxc".into());

        let mut app = module("App", ModuleKind::Executable, BuildOs::Windows);
        app.dependencies.public = vec!["Renderer".into(), "Tools".into()];

        let text = generate(vec![toolchain(BuildOs::Windows), dxc, renderer, tools, app], &ws, "App");
        let copy = "add_custom_command(TARGET App POST_BUILD COMMAND ${CMAKE_COMMAND} -E copy_if_different \
                    \"/ws/Engine/Dxc/bin/x64/foo.dll\" \"$<TARGET_FILE_DIR:App>/foo.dll\")\n";
        assert_eq!(text.matches(copy).count(), 1);
        assert!(text.contains("\"C:/SDK/bar.dll\" \"$<TARGET_FILE_DIR:App>/bar.dll\""));
        assert!(text.contains("add_executable(App WIN32)\n"));
    }

    #[test]
    fn test_library_does_not_copy_shared_libraries() {
        let ws = workspace(BuildOs::Unix);
        let mut dxc = module("Dxc", ModuleKind::InterfaceLibrary, BuildOs::Unix);
        dxc.exports_shared_libraries = true;
        dxc.exported_shared_libraries = vec!["lib/libdxc.so".into()];
        let mut renderer = library("Renderer", BuildOs::Unix);
        renderer.dependencies.public.push("Dxc".into());

        let text = generate(vec![toolchain(BuildOs::Unix), dxc, renderer], &ws, "Renderer");
        assert!(!text.contains("add_custom_command"));
    }

    #[test]
    fn test_console_only_drops_win32() {
        let mut ws = workspace(BuildOs::Windows);
        ws.console_only = true;
        let mut app = module("App", ModuleKind::Executable, BuildOs::Windows);
        app.sources = vec!["/ws/Engine/App/Main.cpp".into()];

        let text = generate(vec![toolchain(BuildOs::Windows), app], &ws, "App");
        assert!(text.contains("add_executable(App /ws/Engine/App/Main.cpp;)"));
        assert!(text.contains(
            "source_group(TREE \\\\ws\\\\Engine\\\\App PREFIX Code FILES \\\\ws\\\\Engine\\\\App\\\\Main.cpp;)"
        ));
    }

    #[test]
    fn test_interface_module_block() {
        let ws = workspace(BuildOs::Unix);
        let mut math = module("Math", ModuleKind::InterfaceLibrary, BuildOs::Unix);
        math.dependencies.public.push("Core".into());
        math.dependencies.private.push("Hidden".into());
        math.include_directories.public.push("include".into());
        math.system_libraries.push("Hidden".into());

        let text = generate(
            vec![toolchain(BuildOs::Unix), library("Core", BuildOs::Unix), math],
            &ws,
            "Math",
        );
        assert_eq!(
            text,
            "add_library(Math INTERFACE)\n\
             add_custom_target(MathConfig SOURCES /ws/Engine/Math/Math.module.toml)\n\
             set_target_properties(Math PROPERTIES FOLDER Engine VS_DEBUGGER_WORKING_DIRECTORY /ws/)\n\
             set_target_properties(MathConfig PROPERTIES FOLDER Engine)\n\
             target_link_libraries(Math INTERFACE Core;)\n\
             target_include_directories(Math INTERFACE /ws/Engine/Math/include;)\n"
        );
    }

    #[test]
    fn test_native_module_block() {
        let ws = workspace(BuildOs::Unix);
        let mut glfw = module("GLFW", ModuleKind::NativeImportedLibrary, BuildOs::Unix)
            .with_namespace("Kepler.ThirdParty");
        glfw.attributes.custom_name = Some("glfw".into());
        glfw.attributes.use_namespace_as_filter = true;
        glfw.subdirectory = Some("glfw".into());
        glfw.exported_targets = vec!["update_mappings".into()];
        glfw.cached_options = vec![
            CachedOption::bool("GLFW_BUILD_DOCS", false),
            CachedOption::string("GLFW_LIBRARY_TYPE", "STATIC"),
        ];

        let text = generate(vec![toolchain(BuildOs::Unix), glfw], &ws, "glfw");
        assert_eq!(
            text,
            "set(GLFW_BUILD_DOCS OFF CACHE BOOL \"\")\n\
             set(GLFW_LIBRARY_TYPE STATIC CACHE STRING \"\")\n\
             add_subdirectory(glfw)\n\
             set_target_properties(glfw PROPERTIES FOLDER Kepler/ThirdParty VS_DEBUGGER_WORKING_DIRECTORY /ws/)\n\
             set_target_properties(update_mappings PROPERTIES FOLDER Kepler/ThirdParty)\n\
             target_compile_features(glfw PUBLIC cxx_std_20)\n"
        );
    }

    #[test]
    fn test_custom_rules_emit_no_link_or_features() {
        let ws = workspace(BuildOs::Unix);
        let mut shaders = module("Shaders", ModuleKind::CustomRules, BuildOs::Unix);
        shaders.sources = vec!["/ws/Engine/Shaders/Lit.hlsl".into()];
        shaders.dependencies.public.push("Core".into());
        shaders.definitions.public.push("SHADER_MODEL=6".into());

        let text = generate(
            vec![toolchain(BuildOs::Unix), library("Core", BuildOs::Unix), shaders],
            &ws,
            "Shaders",
        );
        assert!(text.starts_with("add_custom_target(Shaders SOURCES /ws/Engine/Shaders/Lit.hlsl;)\n"));
        assert!(!text.contains("target_link_libraries"));
        assert!(!text.contains("target_compile_definitions"));
        assert!(!text.contains("target_compile_features"));
    }

    #[test]
    fn test_force_interface_uses_interface_scope() {
        let ws = workspace(BuildOs::Unix);
        let mut entt = module("EnTT", ModuleKind::NativeImportedLibrary, BuildOs::Unix);
        entt.attributes.force_interface = true;
        entt.subdirectory = Some("entt".into());
        entt.definitions.public.push("ENTT_NOEXCEPTION".into());
        entt.definitions.private.push("IGNORED".into());

        let text = generate(vec![toolchain(BuildOs::Unix), entt], &ws, "EnTT");
        assert!(text.contains("add_subdirectory(entt)\nadd_custom_target(EnTTConfig SOURCES"));
        assert!(text.contains("target_compile_definitions(EnTT INTERFACE ENTT_NOEXCEPTION;)"));
        assert!(!text.contains("IGNORED"));
        assert!(!text.contains("cxx_std_20"));
    }

    #[test]
    fn test_debugger_arguments_are_joined() {
        let ws = workspace(BuildOs::Windows);
        let mut editor = module("Editor", ModuleKind::Executable, BuildOs::Windows);
        editor.command_line_arguments = vec!["-project".into(), " ".into(), "Game.kproj ".into()];

        let text = generate(vec![toolchain(BuildOs::Windows), editor], &ws, "Editor");
        assert!(text.contains(
            "set_target_properties(Editor PROPERTIES VS_DEBUGGER_COMMAND_ARGUMENTS -project Game.kproj)\n"
        ));
    }

    #[test]
    fn test_private_pch_and_link_dirs_are_qualified() {
        let ws = workspace(BuildOs::Unix);
        let mut core = library("Core", BuildOs::Unix);
        core.precompiled_headers.private.push("/ws/Engine/Core/Core.Pch.h".into());
        core.link_directories.public.push("lib".into());
        core.definitions.private.push("CORE_INTERNAL".into());

        let text = generate(vec![toolchain(BuildOs::Unix), core], &ws, "Core");
        assert!(text.contains("target_compile_definitions(Core PRIVATE CORE_INTERNAL;)"));
        assert!(text.contains("target_precompile_headers(Core PRIVATE /ws/Engine/Core/Core.Pch.h;)"));
        assert!(text.contains("target_link_directories(Core PUBLIC /ws/Engine/Core/lib;)"));
    }

    #[test]
    fn test_toolchain_does_not_link_itself() {
        let ws = workspace(BuildOs::Unix);
        let mut tc = module("Toolchain", ModuleKind::StaticLibrary, BuildOs::Unix);
        tc.toolchain = Some(ToolchainSettings::default());
        tc.sources = vec!["/ws/Engine/Toolchain/Toolchain.cpp".into()];

        let text = generate(vec![tc], &ws, "Toolchain");
        assert!(!text.contains("target_link_libraries"));
    }

    #[test]
    fn test_excluded_module_generates_nothing() {
        let ws = workspace(BuildOs::Unix);
        let mut editor = module("Editor", ModuleKind::Executable, BuildOs::Unix);
        editor.sources = vec!["/ws/Engine/Editor/Main.cpp".into()];
        editor.exclude();

        let graph = GraphBuilder::new()
            .build(vec![toolchain(BuildOs::Unix), editor])
            .unwrap();
        let (id, _) = graph.all_modules().find(|(_, m)| m.is_excluded()).unwrap();
        assert_eq!(ModuleGenerator::new(&graph, &ws).generate(id), "");
    }
}
