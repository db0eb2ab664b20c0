//! Finds and loads every module descriptor below the workspace root.

use crate::descriptor::{DESCRIPTOR_SUFFIX, KindRegistry, parse_descriptor};
use crate::error::{GenError, GenResult};
use crate::module::{BuildContext, ModuleDescriptor, collect_sources};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct Discovery<'a> {
    root: PathBuf,
    ignore: Vec<String>,
    registry: &'a KindRegistry,
    ctx: BuildContext,
    progress: bool,
}

impl<'a> Discovery<'a> {
    pub fn new(root: impl Into<PathBuf>, registry: &'a KindRegistry, ctx: BuildContext) -> Self {
        Self {
            root: root.into(),
            ignore: Vec::new(),
            registry,
            ctx,
            progress: false,
        }
    }

    /// Directory names that are never descended into.
    pub fn ignore(mut self, names: &[String]) -> Self {
        self.ignore.extend(names.iter().cloned());
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.progress = show;
        self
    }

    /// Every declared module, ordered by descriptor path and then by
    /// declaration order inside a file. Sources are collected for modules
    /// that take part in the build.
    pub fn load(&self) -> GenResult<Vec<ModuleDescriptor>> {
        let files = find_descriptor_files(&self.root, &self.ignore);
        info!("Found {} module descriptors", files.len());

        let pb = if self.progress {
            ProgressBar::new(files.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {bar:30.cyan/blue} {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Loading modules...");

        let parsed = files
            .par_iter()
            .map(|path| -> GenResult<Vec<ModuleDescriptor>> {
                let source = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
                let modules = parse_descriptor(&source, path, self.registry, &self.ctx)?;
                debug!("{}: {} module(s)", path.display(), modules.len());
                pb.inc(1);
                Ok(modules)
            })
            .collect::<GenResult<Vec<_>>>();
        pb.finish_and_clear();

        let mut modules: Vec<ModuleDescriptor> = parsed?.into_iter().flatten().collect();
        modules
            .par_iter_mut()
            .filter(|m| !m.is_excluded())
            .for_each(collect_sources);

        Ok(modules)
    }
}

/// `*.module.toml` files below `root`, sorted by path.
pub fn find_descriptor_files(root: &Path, ignore: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !ignore.iter().any(|i| e.file_name().to_string_lossy() == i.as_str())
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(DESCRIPTOR_SUFFIX))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}
