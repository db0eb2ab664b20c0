use std::fmt;

/// What a module turns into in the generated project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    StaticLibrary,
    SharedLibrary,
    /// Header-only target, linked by propagation only.
    InterfaceLibrary,
    /// Third-party CMake project pulled in with `add_subdirectory`.
    NativeImportedLibrary,
    Executable,
    /// Source-only aggregate (shaders, assets) with no compile step.
    CustomRules,
}

/// Per-kind behaviour consulted by source collection and generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindTraits {
    /// Compiles into a real target that links against the toolchain.
    pub produces_target: bool,
    /// Scans its directory for C/C++ sources.
    pub scans_sources: bool,
    /// Gets `target_compile_features(... cxx_std_20)`.
    pub language_standard: bool,
    /// Emits PUBLIC/PRIVATE `target_*` directives when not interface-like.
    pub scoped_properties: bool,
}

const COMPILED: KindTraits = KindTraits {
    produces_target: true,
    scans_sources: true,
    language_standard: true,
    scoped_properties: true,
};

const NATIVE: KindTraits = KindTraits {
    produces_target: false,
    scans_sources: false,
    language_standard: true,
    scoped_properties: true,
};

const INTERFACE: KindTraits = KindTraits {
    produces_target: false,
    scans_sources: false,
    language_standard: false,
    scoped_properties: true,
};

const CUSTOM_RULES: KindTraits = KindTraits {
    produces_target: false,
    scans_sources: false,
    language_standard: false,
    scoped_properties: false,
};

impl ModuleKind {
    pub fn traits(&self) -> &'static KindTraits {
        match self {
            ModuleKind::StaticLibrary | ModuleKind::SharedLibrary | ModuleKind::Executable => {
                &COMPILED
            }
            ModuleKind::NativeImportedLibrary => &NATIVE,
            ModuleKind::InterfaceLibrary => &INTERFACE,
            ModuleKind::CustomRules => &CUSTOM_RULES,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModuleKind::StaticLibrary => "static",
            ModuleKind::SharedLibrary => "shared",
            ModuleKind::InterfaceLibrary => "interface",
            ModuleKind::NativeImportedLibrary => "native",
            ModuleKind::Executable => "executable",
            ModuleKind::CustomRules => "custom-rules",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Operating system the project is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildOs {
    Windows,
    Unix,
    Mac,
    Other,
}

impl BuildOs {
    pub const ALL: [BuildOs; 4] = [BuildOs::Windows, BuildOs::Unix, BuildOs::Mac, BuildOs::Other];

    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            BuildOs::Windows
        } else if cfg!(target_os = "macos") {
            BuildOs::Mac
        } else if cfg!(unix) {
            BuildOs::Unix
        } else {
            BuildOs::Other
        }
    }

    /// Accepts the spellings used in descriptor `platforms` lists.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "windows" | "win32" | "win64" => Some(BuildOs::Windows),
            "unix" | "linux" => Some(BuildOs::Unix),
            "mac" | "macos" | "osx" => Some(BuildOs::Mac),
            "other" => Some(BuildOs::Other),
            _ => None,
        }
    }

    /// Name used for platform-specific source folders (`_Windows/`, `_Unix/`...).
    pub fn folder_name(&self) -> &'static str {
        match self {
            BuildOs::Windows => "Windows",
            BuildOs::Unix => "Unix",
            BuildOs::Mac => "Mac",
            BuildOs::Other => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_platform_aliases() {
        assert_eq!(BuildOs::parse("Windows"), Some(BuildOs::Windows));
        assert_eq!(BuildOs::parse("linux"), Some(BuildOs::Unix));
        assert_eq!(BuildOs::parse("macos"), Some(BuildOs::Mac));
        assert_eq!(BuildOs::parse("amiga"), None);
    }

    #[test]
    fn test_only_compiled_kinds_produce_targets() {
        assert!(ModuleKind::Executable.traits().produces_target);
        assert!(ModuleKind::SharedLibrary.traits().produces_target);
        assert!(!ModuleKind::InterfaceLibrary.traits().produces_target);
        assert!(!ModuleKind::NativeImportedLibrary.traits().produces_target);
        assert!(!ModuleKind::CustomRules.traits().produces_target);
    }

    #[test]
    fn test_custom_rules_never_link() {
        assert!(!ModuleKind::CustomRules.traits().scoped_properties);
        assert!(!ModuleKind::CustomRules.traits().language_standard);
        assert!(ModuleKind::NativeImportedLibrary.traits().language_standard);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ModuleKind::NativeImportedLibrary.to_string(), "native");
        assert_eq!(ModuleKind::CustomRules.label(), "custom-rules");
    }
}
