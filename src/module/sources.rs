//! Source and precompiled-header collection for a module directory.

use super::{BuildOs, ModuleDescriptor, normalize_slashes};
use crate::descriptor::DESCRIPTOR_SUFFIX;
use walkdir::WalkDir;

/// Default C/C++ inputs picked up for compiled modules.
const SOURCE_EXTENSIONS: [&str; 5] = ["cpp", "h", "inl", "ixx", "cppm"];

pub const PUBLIC_PCH_SUFFIX: &str = ".PublicPch.h";
pub const PRIVATE_PCH_SUFFIX: &str = ".Pch.h";

/// Fills in scanned sources and precompiled headers for `module`.
///
/// Compiled modules pick up every C/C++ file under their directory,
/// custom-rules modules only their declared extensions. Files living under a
/// `_<Os>/` folder for another platform are dropped.
pub fn collect_sources(module: &mut ModuleDescriptor) {
    let files = walk_files(&module.config_dir);

    let extensions: Vec<&str> = if module.scan_sources {
        SOURCE_EXTENSIONS.to_vec()
    } else {
        module.source_extensions.iter().map(String::as_str).collect()
    };

    if !extensions.is_empty() {
        let mut scanned: Vec<String> = files
            .iter()
            .filter(|f| f.ends_with(DESCRIPTOR_SUFFIX) || has_extension(f, &extensions))
            .cloned()
            .collect();
        exclude_foreign_platforms(&mut scanned, module.build_os);

        for file in scanned {
            if !module.sources.contains(&file) {
                module.sources.push(file);
            }
        }
    }

    for file in &files {
        if file.ends_with(PUBLIC_PCH_SUFFIX) {
            push_unique(&mut module.precompiled_headers.public, file);
        } else if file.ends_with(PRIVATE_PCH_SUFFIX) {
            push_unique(&mut module.precompiled_headers.private, file);
        }
    }
}

fn walk_files(dir: &str) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| normalize_slashes(&e.path().to_string_lossy()))
        .collect();
    files.sort();
    files
}

fn has_extension(file: &str, extensions: &[&str]) -> bool {
    match file.rsplit_once('.') {
        Some((_, ext)) => extensions.iter().any(|e| e.trim_start_matches('.') == ext),
        None => false,
    }
}

fn exclude_foreign_platforms(sources: &mut Vec<String>, build_os: BuildOs) {
    let restricted: Vec<String> = BuildOs::ALL
        .iter()
        .filter(|os| **os != build_os)
        .map(|os| format!("/_{}/", os.folder_name()))
        .collect();

    sources.retain(|source| {
        let source = normalize_slashes(source);
        !restricted.iter().any(|r| source.contains(r.as_str()))
    });
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}
