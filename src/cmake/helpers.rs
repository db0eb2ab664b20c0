//! Small text builders shared by the header and per-module generation.

use crate::module::ToolchainSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Private,
    Interface,
}

impl Access {
    pub fn keyword(&self) -> &'static str {
        match self {
            Access::Public => "PUBLIC",
            Access::Private => "PRIVATE",
            Access::Interface => "INTERFACE",
        }
    }
}

pub(crate) fn line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}

/// Absolute on any host: `/x`, `\\x` or a drive letter like `C:/x`.
pub fn is_rooted(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || path.starts_with('\\')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

/// Resolves `path` against `dir` unless it is already absolute.
pub fn qualify(path: &str, dir: &str) -> String {
    if is_rooted(path) {
        path.to_string()
    } else {
        format!("{}/{}", dir, path)
    }
}

/// `a;b;c;`: every item is terminated with `;`.
pub fn make_cmake_array<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for item in items {
        out.push_str(item.as_ref());
        out.push(';');
    }
    out
}

/// `PUBLIC a;b;`, or `None` when there is nothing to emit. Values are
/// resolved against `qualify_dir` when one is given.
pub fn access_list(access: Access, values: &[String], qualify_dir: Option<&str>) -> Option<String> {
    if values.is_empty() {
        return None;
    }

    let array = match qualify_dir {
        Some(dir) => make_cmake_array(values.iter().map(|v| qualify(v, dir))),
        None => make_cmake_array(values),
    };
    Some(format!("{} {}", access.keyword(), array))
}

pub fn combine_access_lists(lists: &[Option<String>]) -> String {
    lists
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Source list with paths qualified against the module directory and
/// forward slashes only.
pub fn combine_sources(sources: &[String], dir: &str) -> String {
    make_cmake_array(sources.iter().map(|s| qualify(s, dir))).replace('\\', "/")
}

/// Project preamble: minimum version, project name, folders and output dirs.
pub fn write_header(out: &mut String, toolchain: &ToolchainSettings, root: &str) {
    line(out, "cmake_minimum_required(VERSION 3.20)");
    line(out, format!("project({})", toolchain.solution_name));
    line(out, "set_property(GLOBAL PROPERTY USE_FOLDERS ON)");
    line(out, "if(MSVC)");
    line(out, "\tadd_compile_options(/MP)");
    line(out, "endif()");
    line(
        out,
        format!(
            "set_property(GLOBAL PROPERTY PREDEFINED_TARGETS_FOLDER {})",
            toolchain.predefined_targets_folder
        ),
    );
    for (variable, folder) in [("RUNTIME", "Bin"), ("LIBRARY", "Lib"), ("ARCHIVE", "Arch")] {
        line(
            out,
            format!(
                "set(CMAKE_{}_OUTPUT_DIRECTORY {}{}/{} CACHE STRING \"\")",
                variable, root, toolchain.binary_path, folder
            ),
        );
    }
    out.push('\n');
}
